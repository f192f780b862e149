use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::BracketTable;

/// Tax year used when none is given (Buddhist era; 2568 = 2025).
pub const DEFAULT_TAX_YEAR: i32 = 2568;

/// Tax years with a built-in rule set.
pub const SUPPORTED_TAX_YEARS: [i32; 2] = [2567, 2568];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxYearError {
    #[error("no rule set for tax year {0}; supported years: 2567, 2568")]
    Unsupported(i32),
}

/// How dependent children are allowed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChildAllowanceRule {
    /// Same amount for every child.
    Flat { per_child: Decimal },
    /// The first child gets `first_child`; later children born in 2018 or
    /// after get `later_child_from_2018`; children born before 2018 get
    /// `child_before_2018`.
    Tiered {
        first_child: Decimal,
        child_before_2018: Decimal,
        later_child_from_2018: Decimal,
    },
}

impl ChildAllowanceRule {
    /// Total child allowance for the given head counts.
    ///
    /// Children born before 2018 are necessarily older than those born
    /// after, so when any exist the first child is one of them and every
    /// 2018+ child is a "later" child.
    pub fn allowance(
        &self,
        children_before_2018: u32,
        children_from_2018: u32,
    ) -> Decimal {
        match self {
            Self::Flat { per_child } => {
                *per_child * Decimal::from(children_before_2018.saturating_add(children_from_2018))
            }
            Self::Tiered {
                first_child,
                child_before_2018,
                later_child_from_2018,
            } => {
                if children_before_2018 > 0 {
                    *child_before_2018 * Decimal::from(children_before_2018)
                        + *later_child_from_2018 * Decimal::from(children_from_2018)
                } else if children_from_2018 > 0 {
                    *first_child
                        + *later_child_from_2018 * Decimal::from(children_from_2018 - 1)
                } else {
                    Decimal::ZERO
                }
            }
        }
    }
}

/// Fixed allowances that make up the basic deduction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceSchedule {
    pub personal: Decimal,
    pub spouse: Decimal,
    pub parent_each: Decimal,
    /// Per side (applicant's parents, spouse's parents).
    pub max_parents_per_side: u32,
    pub parent_health_insurance_cap: Decimal,
    pub social_security_cap: Decimal,
    pub child: ChildAllowanceRule,
}

impl AllowanceSchedule {
    fn base(child: ChildAllowanceRule) -> Self {
        Self {
            personal: dec!(60000),
            spouse: dec!(60000),
            parent_each: dec!(30000),
            max_parents_per_side: 2,
            parent_health_insurance_cap: dec!(15000),
            social_security_cap: dec!(10000),
            child,
        }
    }
}

/// Everything that changes between tax years, selected by year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearRules {
    pub tax_year: i32,
    pub brackets: BracketTable,
    pub allowances: AllowanceSchedule,
}

impl TaxYearRules {
    /// Built-in rules for a Buddhist-era tax year.
    ///
    /// # Errors
    ///
    /// [`TaxYearError::Unsupported`] for years without a rule set.
    pub fn for_year(tax_year: i32) -> Result<Self, TaxYearError> {
        let child = match tax_year {
            2567 => ChildAllowanceRule::Flat {
                per_child: dec!(30000),
            },
            2568 => ChildAllowanceRule::Tiered {
                first_child: dec!(30000),
                child_before_2018: dec!(30000),
                later_child_from_2018: dec!(60000),
            },
            other => return Err(TaxYearError::Unsupported(other)),
        };

        Ok(Self {
            tax_year,
            brackets: BracketTable::thai_standard(),
            allowances: AllowanceSchedule::base(child),
        })
    }

    /// Replaces the bracket table, e.g. with one loaded from CSV.
    pub fn with_brackets(
        mut self,
        brackets: BracketTable,
    ) -> Self {
        self.brackets = brackets;
        self
    }
}

impl Default for TaxYearRules {
    fn default() -> Self {
        Self {
            tax_year: DEFAULT_TAX_YEAR,
            brackets: BracketTable::thai_standard(),
            allowances: AllowanceSchedule::base(ChildAllowanceRule::Tiered {
                first_child: dec!(30000),
                child_before_2018: dec!(30000),
                later_child_from_2018: dec!(60000),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn tiered() -> ChildAllowanceRule {
        TaxYearRules::for_year(2568).unwrap().allowances.child
    }

    #[test]
    fn default_matches_current_year() {
        assert_eq!(TaxYearRules::default(), TaxYearRules::for_year(DEFAULT_TAX_YEAR).unwrap());
    }

    #[test]
    fn unsupported_year_is_an_error() {
        assert_eq!(
            TaxYearRules::for_year(2550),
            Err(TaxYearError::Unsupported(2550))
        );
    }

    #[test]
    fn flat_rule_counts_every_child_the_same() {
        let rule = TaxYearRules::for_year(2567).unwrap().allowances.child;

        assert_eq!(rule.allowance(1, 2), dec!(90000));
    }

    #[test]
    fn tiered_first_child_from_2018_gets_base_amount() {
        assert_eq!(tiered().allowance(0, 1), dec!(30000));
        assert_eq!(tiered().allowance(0, 3), dec!(150000));
    }

    #[test]
    fn tiered_older_child_makes_every_younger_child_a_later_child() {
        assert_eq!(tiered().allowance(1, 1), dec!(90000));
        assert_eq!(tiered().allowance(2, 0), dec!(60000));
    }

    #[test]
    fn tiered_no_children_is_zero() {
        assert_eq!(tiered().allowance(0, 0), Decimal::ZERO);
    }

    #[test]
    fn huge_child_counts_do_not_overflow() {
        let flat = TaxYearRules::for_year(2567).unwrap().allowances.child;

        assert_eq!(
            flat.allowance(u32::MAX, u32::MAX),
            dec!(30000) * Decimal::from(u32::MAX)
        );
        assert_eq!(
            tiered().allowance(u32::MAX, u32::MAX),
            dec!(30000) * Decimal::from(u32::MAX) + dec!(60000) * Decimal::from(u32::MAX)
        );
    }
}
