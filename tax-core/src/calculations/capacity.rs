//! How much room is left in each capped group.
//!
//! These figures are informational. They drive limit bars and the
//! "set to max" action but never feed back into the tax computation, which
//! always goes through [`DeductionPoolAllocator::allocate`].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::calculations::DeductionPoolAllocator;
use crate::calculations::common::{min, non_negative};
use crate::{DeductionEntry, DeductionGroup, DeductionItemId, GroupUsage, LimitStatus};

/// Usage above this share of the cap is reported as [`LimitStatus::NearLimit`].
const NEAR_LIMIT_RATIO: Decimal = dec!(0.9);

impl DeductionPoolAllocator {
    /// One [`GroupUsage`] per catalog group, in catalog order.
    pub fn group_usage(
        &self,
        entries: &[DeductionEntry],
        net_income: Decimal,
    ) -> Vec<GroupUsage> {
        let allocation = self.allocate(entries, net_income);
        let raw = self.effective_amounts(entries);

        self.catalog()
            .groups
            .iter()
            .map(|group_spec| {
                let raw_total: Decimal = self
                    .catalog()
                    .members(group_spec.group)
                    .filter_map(|spec| raw.get(&spec.id))
                    .copied()
                    .sum();

                GroupUsage {
                    group: group_spec.group,
                    raw_total,
                    allowed_total: allocation.group_total(group_spec.group),
                    cap: group_spec.cap,
                    remaining: non_negative(group_spec.cap - raw_total),
                    status: limit_status(raw_total, group_spec.cap),
                }
            })
            .collect()
    }

    /// `max(cap - raw amounts of the other members, 0)`.
    ///
    /// Returns `None` for a group the catalog does not define.
    pub fn available_in_group(
        &self,
        entries: &[DeductionEntry],
        group: DeductionGroup,
        except_item: Option<DeductionItemId>,
    ) -> Option<Decimal> {
        let group_spec = self.catalog().group(group)?;
        let raw = self.effective_amounts(entries);

        let used: Decimal = self
            .catalog()
            .members(group)
            .filter(|spec| Some(spec.id) != except_item)
            .filter_map(|spec| raw.get(&spec.id))
            .copied()
            .sum();

        Some(non_negative(group_spec.cap - used))
    }

    /// The largest raw amount for `item` that still counts in full.
    ///
    /// Limited by the item's own cap (divided by its multiplier, since the cap
    /// applies after doubling) and by what the other members of its group
    /// leave free. Rounded down to a whole baht.
    pub fn max_allowed(
        &self,
        item: DeductionItemId,
        entries: &[DeductionEntry],
        net_income: Decimal,
    ) -> Decimal {
        let Some(spec) = self.catalog().item(item) else {
            return Decimal::ZERO;
        };

        let own = spec
            .individual_cap(net_income)
            .map(|cap| cap.checked_div(spec.multiplier).unwrap_or(cap));
        let group_room = spec
            .group
            .and_then(|group| self.available_in_group(entries, group, Some(item)));

        let limit = match (own, group_room) {
            (Some(own), Some(room)) => min(own, room),
            (Some(own), None) => own,
            (None, Some(room)) => room,
            (None, None) => Decimal::ZERO,
        };

        non_negative(limit).floor()
    }
}

fn limit_status(
    raw_total: Decimal,
    cap: Decimal,
) -> LimitStatus {
    if raw_total <= Decimal::ZERO {
        LimitStatus::Empty
    } else if raw_total > cap {
        LimitStatus::OverLimit
    } else if raw_total > cap * NEAR_LIMIT_RATIO {
        LimitStatus::NearLimit
    } else {
        LimitStatus::Normal
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use DeductionItemId::*;

    fn on(
        item: DeductionItemId,
        amount: Decimal,
    ) -> DeductionEntry {
        DeductionEntry::enabled(item, amount)
    }

    #[test]
    fn usage_reports_raw_and_allowed_totals() {
        let allocator = DeductionPoolAllocator::standard();
        let entries = vec![on(LifeInsurance, dec!(90000)), on(HealthInsurance, dec!(30000))];

        let usage = allocator.group_usage(&entries, dec!(530000));
        let insurance = &usage[0];

        assert_eq!(insurance.group, DeductionGroup::Insurance);
        assert_eq!(insurance.raw_total, dec!(120000));
        assert_eq!(insurance.allowed_total, dec!(100000));
        assert_eq!(insurance.remaining, Decimal::ZERO);
        assert_eq!(insurance.status, LimitStatus::OverLimit);
    }

    #[test]
    fn usage_statuses() {
        assert_eq!(limit_status(Decimal::ZERO, dec!(100000)), LimitStatus::Empty);
        assert_eq!(limit_status(dec!(50000), dec!(100000)), LimitStatus::Normal);
        assert_eq!(limit_status(dec!(90000), dec!(100000)), LimitStatus::Normal);
        assert_eq!(limit_status(dec!(95000), dec!(100000)), LimitStatus::NearLimit);
        assert_eq!(limit_status(dec!(100000), dec!(100000)), LimitStatus::NearLimit);
        assert_eq!(limit_status(dec!(100001), dec!(100000)), LimitStatus::OverLimit);
    }

    #[test]
    fn disabled_entries_do_not_use_capacity() {
        let allocator = DeductionPoolAllocator::standard();
        let entries = vec![DeductionEntry::disabled(Pvd, dec!(400000))];

        let room = allocator.available_in_group(&entries, DeductionGroup::Retirement, None);

        assert_eq!(room, Some(dec!(500000)));
    }

    #[test]
    fn available_excludes_the_item_itself() {
        let allocator = DeductionPoolAllocator::standard();
        let entries = vec![on(Pvd, dec!(300000)), on(Rmf, dec!(100000))];

        let room = allocator.available_in_group(&entries, DeductionGroup::Retirement, Some(Rmf));

        assert_eq!(room, Some(dec!(200000)));
    }

    #[test]
    fn max_allowed_is_limited_by_own_cap() {
        let allocator = DeductionPoolAllocator::standard();

        // 30% of 530,000
        assert_eq!(allocator.max_allowed(Rmf, &[], dec!(530000)), dec!(159000));
        assert_eq!(allocator.max_allowed(HomeLoan, &[], dec!(530000)), dec!(100000));
    }

    #[test]
    fn max_allowed_is_limited_by_group_room() {
        let allocator = DeductionPoolAllocator::standard();
        let entries = vec![on(Pvd, dec!(450000))];

        assert_eq!(allocator.max_allowed(Rmf, &entries, dec!(5000000)), dec!(50000));
    }

    #[test]
    fn max_allowed_accounts_for_multiplier() {
        let allocator = DeductionPoolAllocator::standard();

        // 10% of 530,000 = 53,000 after doubling, so 26,500 raw
        assert_eq!(allocator.max_allowed(DonationDouble, &[], dec!(530000)), dec!(26500));
    }

    #[test]
    fn max_allowed_rounds_down() {
        let allocator = DeductionPoolAllocator::standard();

        // 15% of 333,333 = 49,999.95
        assert_eq!(
            allocator.max_allowed(PensionInsurance, &[], dec!(333333)),
            dec!(49999)
        );
    }

    #[test]
    fn max_allowed_never_clamps_when_applied() {
        let allocator = DeductionPoolAllocator::standard();
        let net = dec!(780000);
        let mut entries = vec![on(LifeInsurance, dec!(40000)), on(Pvd, dec!(200000))];

        for item in [HealthInsurance, Rmf, PensionInsurance, DonationDouble] {
            let amount = allocator.max_allowed(item, &entries, net);
            entries.push(on(item, amount));
        }

        let allocation = allocator.allocate(&entries, net);
        for entry in &entries {
            let counted = allocation.amount(entry.item_id);
            let expected = match entry.item_id {
                DonationDouble => entry.raw_amount * dec!(2),
                _ => entry.raw_amount,
            };
            assert_eq!(counted, expected, "{} was clamped", entry.item_id);
        }
    }
}
