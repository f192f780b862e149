use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One progressive tier of the statutory schedule.
///
/// `rate_percent` is a whole percentage (`5` means 5%), matching how the
/// Revenue Department publishes the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min_income: Decimal,
    /// `None` for the open-ended top bracket.
    pub max_income: Option<Decimal>,
    pub rate_percent: Decimal,
}

impl TaxBracket {
    pub fn new(
        min_income: Decimal,
        max_income: Option<Decimal>,
        rate_percent: Decimal,
    ) -> Self {
        Self {
            min_income,
            max_income,
            rate_percent,
        }
    }
}

/// Errors raised when a bracket table breaks the schedule invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketTableError {
    #[error("bracket table is empty")]
    Empty,

    #[error("first bracket must start at 0, starts at {0}")]
    DoesNotStartAtZero(Decimal),

    #[error("bracket {index} starts at {found}, expected {expected}")]
    Gap {
        index: usize,
        expected: Decimal,
        found: Decimal,
    },

    #[error("bracket {index} has max {max} not above its min {min}")]
    EmptyRange {
        index: usize,
        min: Decimal,
        max: Decimal,
    },

    #[error("bracket {0} is unbounded but is not the last bracket")]
    UnboundedBeforeEnd(usize),

    #[error("last bracket must be unbounded")]
    BoundedTop,

    #[error("bracket {index} has rate {rate}% outside 0..=100")]
    InvalidRate { index: usize, rate: Decimal },
}

/// An ordered, contiguous set of brackets covering `[0, ∞)`.
///
/// Construction validates the invariants once so the engine can walk the
/// table without re-checking it on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketTable {
    brackets: Vec<TaxBracket>,
}

impl BracketTable {
    /// Builds a table, checking that brackets are contiguous, ascending,
    /// non-overlapping and end with an unbounded tier.
    ///
    /// # Errors
    ///
    /// Returns the first [`BracketTableError`] encountered while walking the
    /// brackets in order.
    pub fn new(brackets: Vec<TaxBracket>) -> Result<Self, BracketTableError> {
        let first = brackets.first().ok_or(BracketTableError::Empty)?;
        if first.min_income != Decimal::ZERO {
            return Err(BracketTableError::DoesNotStartAtZero(first.min_income));
        }

        let last_index = brackets.len() - 1;
        let mut expected_min = Decimal::ZERO;

        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.min_income != expected_min {
                return Err(BracketTableError::Gap {
                    index,
                    expected: expected_min,
                    found: bracket.min_income,
                });
            }
            if bracket.rate_percent < Decimal::ZERO || bracket.rate_percent > Decimal::ONE_HUNDRED {
                return Err(BracketTableError::InvalidRate {
                    index,
                    rate: bracket.rate_percent,
                });
            }
            match bracket.max_income {
                Some(max) if max <= bracket.min_income => {
                    return Err(BracketTableError::EmptyRange {
                        index,
                        min: bracket.min_income,
                        max,
                    });
                }
                Some(max) => expected_min = max,
                None if index != last_index => {
                    return Err(BracketTableError::UnboundedBeforeEnd(index));
                }
                None => {}
            }
        }

        if brackets[last_index].max_income.is_some() {
            return Err(BracketTableError::BoundedTop);
        }

        Ok(Self { brackets })
    }

    /// The Thai personal income tax schedule: 0/5/10/15/20/25/30/35% over
    /// 150k/300k/500k/750k/1M/2M/5M.
    pub fn thai_standard() -> Self {
        let rows = [
            (dec!(0), Some(dec!(150000)), dec!(0)),
            (dec!(150000), Some(dec!(300000)), dec!(5)),
            (dec!(300000), Some(dec!(500000)), dec!(10)),
            (dec!(500000), Some(dec!(750000)), dec!(15)),
            (dec!(750000), Some(dec!(1000000)), dec!(20)),
            (dec!(1000000), Some(dec!(2000000)), dec!(25)),
            (dec!(2000000), Some(dec!(5000000)), dec!(30)),
            (dec!(5000000), None, dec!(35)),
        ];
        Self {
            brackets: rows
                .into_iter()
                .map(|(min, max, rate)| TaxBracket::new(min, max, rate))
                .collect(),
        }
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    pub fn len(&self) -> usize {
        self.brackets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brackets.is_empty()
    }
}

impl<'de> Deserialize<'de> for BracketTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            brackets: Vec<TaxBracket>,
        }

        let raw = Raw::deserialize(deserializer)?;
        BracketTable::new(raw.brackets).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn thai_standard_is_valid() {
        let table = BracketTable::thai_standard();

        assert_eq!(table.len(), 8);
        assert_eq!(BracketTable::new(table.brackets().to_vec()), Ok(table));
    }

    #[test]
    fn rejects_empty_table() {
        assert_eq!(BracketTable::new(vec![]), Err(BracketTableError::Empty));
    }

    #[test]
    fn rejects_table_not_starting_at_zero() {
        let result = BracketTable::new(vec![TaxBracket::new(dec!(100), None, dec!(5))]);

        assert_eq!(result, Err(BracketTableError::DoesNotStartAtZero(dec!(100))));
    }

    #[test]
    fn rejects_gap_between_brackets() {
        let result = BracketTable::new(vec![
            TaxBracket::new(dec!(0), Some(dec!(150000)), dec!(0)),
            TaxBracket::new(dec!(160000), None, dec!(5)),
        ]);

        assert_eq!(
            result,
            Err(BracketTableError::Gap {
                index: 1,
                expected: dec!(150000),
                found: dec!(160000),
            })
        );
    }

    #[test]
    fn rejects_bounded_top_bracket() {
        let result = BracketTable::new(vec![TaxBracket::new(
            dec!(0),
            Some(dec!(150000)),
            dec!(0),
        )]);

        assert_eq!(result, Err(BracketTableError::BoundedTop));
    }

    #[test]
    fn rejects_unbounded_middle_bracket() {
        let result = BracketTable::new(vec![
            TaxBracket::new(dec!(0), None, dec!(0)),
            TaxBracket::new(dec!(150000), None, dec!(5)),
        ]);

        assert_eq!(result, Err(BracketTableError::UnboundedBeforeEnd(0)));
    }

    #[test]
    fn rejects_rate_above_hundred() {
        let result = BracketTable::new(vec![TaxBracket::new(dec!(0), None, dec!(101))]);

        assert_eq!(
            result,
            Err(BracketTableError::InvalidRate {
                index: 0,
                rate: dec!(101),
            })
        );
    }

    #[test]
    fn deserialize_validates_table() {
        let json = r#"{"brackets":[{"min_income":"0","max_income":"100","rate_percent":"0"}]}"#;

        let result: Result<BracketTable, _> = serde_json::from_str(json);

        assert!(result.is_err());
    }
}
