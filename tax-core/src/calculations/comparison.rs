//! Baseline versus two plans.
//!
//! The coordinator evaluates all three scenarios against the same rules and
//! derives the savings, a recommendation, the return on each plan's extra
//! deductions, and how full each plan's capped groups are.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::calculations::common::round_dp_half_up;
use crate::calculations::{DeductionPoolAllocator, ScenarioEngine};
use crate::{
    BasicDeductionProfile, ComparisonSnapshot, DeductionEntry, IncomeProfile, Recommendation,
    Scenario, ScenarioResult, TaxYearRules,
};

/// Plan 2 is only recommended when it saves more than this.
pub const PLAN2_MIN_SAVINGS: Decimal = dec!(10000);

/// Plan 1 is only recommended when it saves more than this.
pub const PLAN1_MIN_SAVINGS: Decimal = dec!(5000);

/// Runs the three scenarios and assembles a [`ComparisonSnapshot`].
#[derive(Debug, Clone)]
pub struct ComparisonCoordinator<'a> {
    engine: ScenarioEngine<'a>,
}

impl<'a> ComparisonCoordinator<'a> {
    pub fn new(rules: &'a TaxYearRules) -> Self {
        Self {
            engine: ScenarioEngine::new(rules),
        }
    }

    pub fn with_allocator(
        rules: &'a TaxYearRules,
        allocator: DeductionPoolAllocator,
    ) -> Self {
        Self {
            engine: ScenarioEngine::with_allocator(rules, allocator),
        }
    }

    pub fn engine(&self) -> &ScenarioEngine<'a> {
        &self.engine
    }

    /// Evaluates baseline, plan 1 and plan 2 one after another.
    pub fn compare(
        &self,
        income: &IncomeProfile,
        basic: &BasicDeductionProfile,
        plan1: &[DeductionEntry],
        plan2: &[DeductionEntry],
    ) -> ComparisonSnapshot {
        let baseline = self
            .engine
            .evaluate(income, basic, None, Scenario::Baseline);
        let p1 = self
            .engine
            .evaluate(income, basic, Some(plan1), Scenario::Plan1);
        let p2 = self
            .engine
            .evaluate(income, basic, Some(plan2), Scenario::Plan2);

        self.assemble(income, plan1, plan2, baseline, p1, p2)
    }

    /// Same result as [`ComparisonCoordinator::compare`], with the three
    /// evaluations forked onto the rayon pool. They share nothing writable.
    pub fn compare_parallel(
        &self,
        income: &IncomeProfile,
        basic: &BasicDeductionProfile,
        plan1: &[DeductionEntry],
        plan2: &[DeductionEntry],
    ) -> ComparisonSnapshot {
        let engine = &self.engine;

        let (baseline, (p1, p2)) = rayon::join(
            || engine.evaluate(income, basic, None, Scenario::Baseline),
            || {
                rayon::join(
                    || engine.evaluate(income, basic, Some(plan1), Scenario::Plan1),
                    || engine.evaluate(income, basic, Some(plan2), Scenario::Plan2),
                )
            },
        );

        self.assemble(income, plan1, plan2, baseline, p1, p2)
    }

    fn assemble(
        &self,
        income: &IncomeProfile,
        plan1: &[DeductionEntry],
        plan2: &[DeductionEntry],
        baseline: ScenarioResult,
        p1: ScenarioResult,
        p2: ScenarioResult,
    ) -> ComparisonSnapshot {
        let net_income = income.net_income();
        let savings_plan1 = baseline.tax_owed - p1.tax_owed;
        let savings_plan2 = baseline.tax_owed - p2.tax_owed;
        let recommendation = recommend(savings_plan1, savings_plan2);

        debug!(
            %savings_plan1,
            %savings_plan2,
            %recommendation,
            "comparison complete"
        );

        let allocator = self.engine.allocator();

        ComparisonSnapshot {
            tax_year: self.engine.rules().tax_year,
            net_income,
            roi_plan1: roi(savings_plan1, p1.plan_deduction),
            roi_plan2: roi(savings_plan2, p2.plan_deduction),
            plan1_groups: allocator.group_usage(plan1, net_income),
            plan2_groups: allocator.group_usage(plan2, net_income),
            baseline,
            plan1: p1,
            plan2: p2,
            savings_plan1,
            savings_plan2,
            recommendation,
        }
    }
}

/// Plan 2 wins if it saves strictly more than plan 1 and more than 10,000;
/// otherwise plan 1 wins if it saves strictly more than plan 2 and more than
/// 5,000; otherwise neither.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::Recommendation;
/// use tax_core::calculations::comparison::recommend;
///
/// assert_eq!(recommend(dec!(6000), dec!(4000)), Recommendation::Plan1);
/// assert_eq!(recommend(dec!(4000), dec!(4000)), Recommendation::Neither);
/// ```
pub fn recommend(
    savings_plan1: Decimal,
    savings_plan2: Decimal,
) -> Recommendation {
    if savings_plan2 > savings_plan1 && savings_plan2 > PLAN2_MIN_SAVINGS {
        Recommendation::Plan2
    } else if savings_plan1 > savings_plan2 && savings_plan1 > PLAN1_MIN_SAVINGS {
        Recommendation::Plan1
    } else {
        Recommendation::Neither
    }
}

/// `savings / plan_deduction × 100` to one decimal place, or `None` when the
/// plan deducts nothing. A ratio too large for `Decimal` saturates.
pub fn roi(
    savings: Decimal,
    plan_deduction: Decimal,
) -> Option<Decimal> {
    if plan_deduction.is_zero() {
        return None;
    }
    let ratio = savings
        .checked_div(plan_deduction)
        .unwrap_or(if savings.is_sign_negative() { Decimal::MIN } else { Decimal::MAX });
    Some(round_dp_half_up(ratio.saturating_mul(Decimal::ONE_HUNDRED), 1))
}
