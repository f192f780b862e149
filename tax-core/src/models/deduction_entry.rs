use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DeductionItemId;
use crate::calculations::common::bounded_amount;

/// One row of a plan: an item, whether it is ticked, and the amount entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionEntry {
    pub item_id: DeductionItemId,
    pub enabled: bool,
    pub raw_amount: Decimal,
}

impl DeductionEntry {
    pub fn enabled(
        item_id: DeductionItemId,
        raw_amount: Decimal,
    ) -> Self {
        Self {
            item_id,
            enabled: true,
            raw_amount,
        }
    }

    pub fn disabled(
        item_id: DeductionItemId,
        raw_amount: Decimal,
    ) -> Self {
        Self {
            item_id,
            enabled: false,
            raw_amount,
        }
    }

    /// The amount the allocator should consider: zero when unticked,
    /// otherwise the raw amount through [`bounded_amount`].
    pub fn effective_amount(&self) -> Decimal {
        if self.enabled {
            bounded_amount(self.raw_amount)
        } else {
            Decimal::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::common::AMOUNT_CEILING;

    #[test]
    fn effective_amount_ignores_unticked_and_negative_rows() {
        assert_eq!(
            DeductionEntry::disabled(DeductionItemId::Rmf, dec!(5000)).effective_amount(),
            Decimal::ZERO
        );
        assert_eq!(
            DeductionEntry::enabled(DeductionItemId::Rmf, dec!(-5000)).effective_amount(),
            Decimal::ZERO
        );
    }

    #[test]
    fn effective_amount_stops_at_the_ceiling() {
        let entry = DeductionEntry::enabled(DeductionItemId::HomeLoan, Decimal::MAX);

        assert_eq!(entry.effective_amount(), AMOUNT_CEILING);
    }
}
