use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{bounded_amount, min};

/// Ceiling on the 50% employment-income expense deduction.
pub const EXPENSE_DEDUCTION_CAP: Decimal = dec!(100000);

/// Share of total income allowed as the standard expense deduction.
pub const EXPENSE_DEDUCTION_RATE: Decimal = dec!(0.5);

/// Salary and bonus as entered. Everything else is derived on demand so it
/// can never drift from these two fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeProfile {
    pub monthly_salary: Decimal,
    pub annual_bonus: Decimal,
}

impl IncomeProfile {
    pub fn new(
        monthly_salary: Decimal,
        annual_bonus: Decimal,
    ) -> Self {
        Self {
            monthly_salary,
            annual_bonus,
        }
    }

    /// `salary × 12 + bonus`, with each input read through
    /// [`bounded_amount`].
    pub fn total_income(&self) -> Decimal {
        bounded_amount(self.monthly_salary) * Decimal::from(12) + bounded_amount(self.annual_bonus)
    }

    /// `min(total × 50%, 100,000)`.
    pub fn standard_expense_deduction(&self) -> Decimal {
        min(
            self.total_income() * EXPENSE_DEDUCTION_RATE,
            EXPENSE_DEDUCTION_CAP,
        )
    }

    pub fn net_income(&self) -> Decimal {
        self.total_income() - self.standard_expense_deduction()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn derives_income_figures() {
        let income = IncomeProfile::new(dec!(45000), dec!(90000));

        assert_eq!(income.total_income(), dec!(630000));
        assert_eq!(income.standard_expense_deduction(), dec!(100000));
        assert_eq!(income.net_income(), dec!(530000));
    }

    #[test]
    fn expense_deduction_is_half_below_cap() {
        let income = IncomeProfile::new(dec!(15000), dec!(0));

        assert_eq!(income.total_income(), dec!(180000));
        assert_eq!(income.standard_expense_deduction(), dec!(90000.0));
        assert_eq!(income.net_income(), dec!(90000));
    }

    #[test]
    fn negative_inputs_read_as_zero() {
        let income = IncomeProfile::new(dec!(-1), dec!(-100));

        assert_eq!(income.total_income(), Decimal::ZERO);
        assert_eq!(income.net_income(), Decimal::ZERO);
    }

    #[test]
    fn oversized_inputs_stop_at_the_ceiling() {
        use crate::calculations::common::AMOUNT_CEILING;

        let income = IncomeProfile::new(Decimal::MAX, Decimal::MAX);

        assert_eq!(income.total_income(), AMOUNT_CEILING * dec!(13));
        assert_eq!(income.net_income(), AMOUNT_CEILING * dec!(13) - EXPENSE_DEDUCTION_CAP);
    }
}
