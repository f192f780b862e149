//! Deduction pool allocation.
//!
//! Turns a plan's raw entries into the amounts that actually count, in a
//! fixed order:
//!
//! | Step | Rule |
//! |------|------|
//! | 1    | Per-item caps (absolute and percent of net income, multiplier first) |
//! | 2    | Insurance group over 100,000: every member scaled by `cap / sum` |
//! | 3    | Retirement group over 500,000: cut RMF, then PVD, then pension insurance |
//! | 4    | Standalone items keep their step 1 value |
//!
//! The two groups deliberately use different policies; a proportional
//! haircut for insurance and an ordered cut for retirement savings.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::DeductionPoolAllocator;
//! use tax_core::{DeductionEntry, DeductionGroup, DeductionItemId};
//!
//! let allocator = DeductionPoolAllocator::standard();
//! let entries = vec![
//!     DeductionEntry::enabled(DeductionItemId::LifeInsurance, dec!(90000)),
//!     DeductionEntry::enabled(DeductionItemId::HealthInsurance, dec!(30000)),
//! ];
//!
//! let allocation = allocator.allocate(&entries, dec!(530000));
//!
//! assert_eq!(allocation.group_total(DeductionGroup::Insurance), dec!(100000));
//! assert_eq!(allocation.amount(DeductionItemId::LifeInsurance), dec!(75000));
//! ```

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::{min, non_negative};
use crate::{
    DeductionCatalog, DeductionEntry, DeductionGroup, DeductionItemId, GroupSpec, ReductionPolicy,
};

/// Clamped amounts for one plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// Every item that had an entry, including those clamped to zero.
    pub per_item: BTreeMap<DeductionItemId, Decimal>,
    /// Post-clamping subtotal of each capped group.
    pub group_totals: BTreeMap<DeductionGroup, Decimal>,
}

impl Allocation {
    pub fn amount(
        &self,
        item: DeductionItemId,
    ) -> Decimal {
        self.per_item.get(&item).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn group_total(
        &self,
        group: DeductionGroup,
    ) -> Decimal {
        self.group_totals
            .get(&group)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Sum over all items.
    pub fn total(&self) -> Decimal {
        self.per_item.values().copied().sum()
    }

    /// Items that contribute something, for breakdown display.
    pub fn contributing(&self) -> BTreeMap<DeductionItemId, Decimal> {
        self.per_item
            .iter()
            .filter(|(_, amount)| **amount > Decimal::ZERO)
            .map(|(id, amount)| (*id, *amount))
            .collect()
    }
}

/// Applies a [`DeductionCatalog`] to plan entries.
///
/// Holds no state besides the immutable catalog, so calling
/// [`DeductionPoolAllocator::allocate`] repeatedly with the same input always
/// yields the same output.
#[derive(Debug, Clone, Default)]
pub struct DeductionPoolAllocator {
    catalog: DeductionCatalog,
}

impl DeductionPoolAllocator {
    pub fn new(catalog: DeductionCatalog) -> Self {
        Self { catalog }
    }

    pub fn standard() -> Self {
        Self::new(DeductionCatalog::standard())
    }

    pub fn catalog(&self) -> &DeductionCatalog {
        &self.catalog
    }

    /// Clamps `entries` at `net_income`.
    ///
    /// Disabled or negative entries count as zero. When an item appears more
    /// than once the last entry wins. Items missing from the catalog are
    /// ignored.
    pub fn allocate(
        &self,
        entries: &[DeductionEntry],
        net_income: Decimal,
    ) -> Allocation {
        let net_income = non_negative(net_income);
        let mut per_item = BTreeMap::new();

        for (item, amount) in self.effective_amounts(entries) {
            let Some(spec) = self.catalog.item(item) else {
                warn!(item = %item, "no spec for deduction item; ignoring entry");
                continue;
            };
            per_item.insert(item, spec.clamp(amount, net_income));
        }

        let mut group_totals = BTreeMap::new();
        for group_spec in &self.catalog.groups {
            let total = self.apply_group_cap(group_spec, &mut per_item);
            group_totals.insert(group_spec.group, total);
        }

        Allocation {
            per_item,
            group_totals,
        }
    }

    /// Last-wins map of item to its usable raw amount.
    pub(crate) fn effective_amounts(
        &self,
        entries: &[DeductionEntry],
    ) -> BTreeMap<DeductionItemId, Decimal> {
        entries
            .iter()
            .map(|entry| (entry.item_id, entry.effective_amount()))
            .collect()
    }

    /// Brings one group under its cap and returns the group's final total.
    fn apply_group_cap(
        &self,
        group_spec: &GroupSpec,
        per_item: &mut BTreeMap<DeductionItemId, Decimal>,
    ) -> Decimal {
        let members: Vec<DeductionItemId> = self
            .catalog
            .members(group_spec.group)
            .map(|spec| spec.id)
            .filter(|id| per_item.contains_key(id))
            .collect();

        let sum: Decimal = members.iter().map(|id| per_item[id]).sum();
        if sum <= group_spec.cap {
            return sum;
        }

        debug!(
            group = group_spec.group.as_str(),
            %sum,
            cap = %group_spec.cap,
            "group over cap; clamping"
        );

        match &group_spec.policy {
            ReductionPolicy::Proportional => {
                scale_proportionally(&members, per_item, sum, group_spec.cap)
            }
            ReductionPolicy::Ordered(order) => {
                cut_in_order(order, per_item, sum - group_spec.cap);
            }
        }

        members.iter().map(|id| per_item[id]).sum()
    }
}

/// `value *= cap / sum` for every positive member. The last positive member
/// takes `cap - others` so decimal rounding cannot push the group over.
fn scale_proportionally(
    members: &[DeductionItemId],
    per_item: &mut BTreeMap<DeductionItemId, Decimal>,
    sum: Decimal,
    cap: Decimal,
) {
    let positive: Vec<DeductionItemId> = members
        .iter()
        .copied()
        .filter(|id| per_item[id] > Decimal::ZERO)
        .collect();

    let Some((last, rest)) = positive.split_last() else {
        return;
    };

    let mut assigned = Decimal::ZERO;
    for id in rest {
        let scaled = per_item[id] * cap / sum;
        assigned += scaled;
        per_item.insert(*id, scaled);
    }
    per_item.insert(*last, non_negative(cap - assigned));
}

/// Reduces members in `order`, each by `min(value, remaining excess)`.
fn cut_in_order(
    order: &[DeductionItemId],
    per_item: &mut BTreeMap<DeductionItemId, Decimal>,
    mut excess: Decimal,
) {
    for id in order {
        if excess <= Decimal::ZERO {
            break;
        }
        let Some(value) = per_item.get_mut(id) else {
            continue;
        };
        let cut = min(*value, excess);
        *value -= cut;
        excess -= cut;
    }
}
