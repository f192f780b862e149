//! Property tests for the bracket engine and the deduction allocator.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tax_core::calculations::{DeductionPoolAllocator, TaxBracketEngine};
use tax_core::{
    BracketTable, DeductionEntry, DeductionGroup, DeductionItemId, IncomeProfile, TaxSession,
};

fn baht(max: i64) -> impl Strategy<Value = Decimal> {
    (0..=max).prop_map(Decimal::from)
}

/// Amount with satang, 0.00 ..= max.
fn amount(max: i64) -> impl Strategy<Value = Decimal> {
    (0..=max * 100).prop_map(|satang| Decimal::new(satang, 2))
}

/// Any decimal an input field can hold, including both extremes.
fn any_amount() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        Just(Decimal::MAX),
        Just(Decimal::MIN),
        (any::<i64>(), 0u32..=28).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale)),
    ]
}

fn clamped(
    allocator: &DeductionPoolAllocator,
    item: DeductionItemId,
    raw: Decimal,
    net_income: Decimal,
) -> Decimal {
    allocator
        .catalog()
        .item(item)
        .map(|spec| spec.clamp(raw, net_income))
        .unwrap_or_default()
}

proptest! {
    /// Property: nothing is owed on the first 150,000 of taxable income.
    #[test]
    fn exempt_band_owes_nothing(taxable in amount(150_000)) {
        let table = BracketTable::thai_standard();
        let engine = TaxBracketEngine::new(&table);

        prop_assert_eq!(engine.tax_on_taxable(taxable), Decimal::ZERO);
        prop_assert_eq!(engine.compute_tax(taxable, Decimal::ZERO), Decimal::ZERO);
    }

    /// Property: a larger deduction never raises the tax.
    #[test]
    fn tax_is_monotonic_in_deduction(
        net in baht(8_000_000),
        d1 in baht(3_000_000),
        extra in baht(3_000_000),
    ) {
        let table = BracketTable::thai_standard();
        let engine = TaxBracketEngine::new(&table);
        let d2 = d1 + extra;

        let smaller = engine.compute_tax(net, d2);
        let larger = engine.compute_tax(net, d1);

        prop_assert!(smaller <= larger, "tax({}, {}) = {} > tax({}, {}) = {}", net, d2, smaller, net, d1, larger);
    }

    /// Property: tax is non-decreasing in taxable income.
    #[test]
    fn tax_is_monotonic_in_income(a in amount(6_000_000), b in amount(6_000_000)) {
        let table = BracketTable::thai_standard();
        let engine = TaxBracketEngine::new(&table);
        let (low, high) = if a <= b { (a, b) } else { (b, a) };

        prop_assert!(engine.tax_on_taxable(low) <= engine.tax_on_taxable(high));
    }

    /// Property: one satang more taxable income never adds more than the
    /// top rate's share of a satang, even across a bracket boundary.
    #[test]
    fn tax_is_continuous_at_boundaries(index in 1usize..8, below in prop::bool::ANY) {
        let table = BracketTable::thai_standard();
        let engine = TaxBracketEngine::new(&table);
        let boundary = table.brackets()[index].min_income;
        let step = dec!(0.01);
        let x = if below { boundary - step } else { boundary };

        let jump = engine.tax_on_taxable(x + step) - engine.tax_on_taxable(x);

        prop_assert!(jump >= Decimal::ZERO);
        prop_assert!(jump <= step * dec!(0.35), "jump of {} at {}", jump, x);
    }

    /// Property: the insurance group never exceeds 100,000, and when it
    /// would, it lands exactly on the cap with every member scaled down.
    #[test]
    fn insurance_group_is_capped_proportionally(
        life in amount(300_000),
        health in amount(300_000),
        net in baht(5_000_000),
    ) {
        let allocator = DeductionPoolAllocator::standard();
        let entries = [
            DeductionEntry::enabled(DeductionItemId::LifeInsurance, life),
            DeductionEntry::enabled(DeductionItemId::HealthInsurance, health),
        ];

        let allocation = allocator.allocate(&entries, net);
        let total = allocation.group_total(DeductionGroup::Insurance);
        let got_life = allocation.amount(DeductionItemId::LifeInsurance);
        let got_health = allocation.amount(DeductionItemId::HealthInsurance);

        prop_assert!(total <= dec!(100000));
        prop_assert_eq!(total, got_life + got_health);
        prop_assert!(got_life <= life);
        prop_assert!(got_health <= health);
        if life + health > dec!(100000) {
            prop_assert_eq!(total, dec!(100000));
        } else {
            prop_assert_eq!((got_life, got_health), (life, health));
        }
    }

    /// Property: the retirement group never exceeds 500,000, and RMF is cut
    /// before PVD and pension insurance are touched.
    #[test]
    fn retirement_group_is_cut_in_order(
        pension in amount(300_000),
        pvd in amount(600_000),
        rmf in amount(600_000),
        net in baht(5_000_000),
    ) {
        let allocator = DeductionPoolAllocator::standard();
        let entries = [
            DeductionEntry::enabled(DeductionItemId::PensionInsurance, pension),
            DeductionEntry::enabled(DeductionItemId::Pvd, pvd),
            DeductionEntry::enabled(DeductionItemId::Rmf, rmf),
        ];

        let allocation = allocator.allocate(&entries, net);
        let total = allocation.group_total(DeductionGroup::Retirement);
        let own_pension = clamped(&allocator, DeductionItemId::PensionInsurance, pension, net);
        let own_pvd = clamped(&allocator, DeductionItemId::Pvd, pvd, net);

        prop_assert!(total <= dec!(500000));
        if own_pension + own_pvd <= dec!(500000) {
            prop_assert_eq!(allocation.amount(DeductionItemId::Pvd), own_pvd);
            prop_assert_eq!(allocation.amount(DeductionItemId::PensionInsurance), own_pension);
        } else {
            prop_assert_eq!(allocation.amount(DeductionItemId::Rmf), Decimal::ZERO);
        }
    }

    /// Property: allocating the same entries twice gives the same result and
    /// leaves the entries untouched.
    #[test]
    fn allocate_is_idempotent(
        amounts in prop::collection::vec(amount(400_000), 11),
        enabled in prop::collection::vec(prop::bool::ANY, 11),
        net in baht(5_000_000),
    ) {
        let allocator = DeductionPoolAllocator::standard();
        let entries: Vec<DeductionEntry> = DeductionItemId::ALL
            .iter()
            .zip(amounts.iter().zip(&enabled))
            .map(|(item, (raw, on))| DeductionEntry {
                item_id: *item,
                enabled: *on,
                raw_amount: *raw,
            })
            .collect();
        let before = entries.clone();

        let first = allocator.allocate(&entries, net);
        let second = allocator.allocate(&entries, net);

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(entries, before);
    }

    /// Property: any entered amounts give a comparison, and no plan owes
    /// more than the baseline.
    #[test]
    fn comparison_is_total(
        salary in any_amount(),
        bonus in any_amount(),
        social_security in any_amount(),
        raw in prop::collection::vec(any_amount(), 11),
    ) {
        let mut session = TaxSession::new(2568);
        session.income = IncomeProfile::new(salary, bonus);
        session.basic.monthly_social_security = social_security;
        session.plan1 = DeductionItemId::ALL
            .iter()
            .zip(&raw)
            .map(|(item, amount)| DeductionEntry::enabled(*item, *amount))
            .collect();

        let snapshot = session.compare().expect("2568 is supported");

        prop_assert!(snapshot.plan1.tax_owed <= snapshot.baseline.tax_owed);
        prop_assert!(snapshot.baseline.tax_owed >= Decimal::ZERO);
    }
}
