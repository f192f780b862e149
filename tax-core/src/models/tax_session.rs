use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
    BasicDeductionProfile, ComparisonSnapshot, DeductionEntry, DeductionItemId, IncomeProfile,
    Scenario, TaxYearError, TaxYearRules, DEFAULT_TAX_YEAR,
};
use crate::calculations::{ComparisonCoordinator, DeductionPoolAllocator};

/// Everything the user has entered, passed explicitly into the engine.
///
/// This is also the unit a [`crate::store::SessionStore`] loads and saves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSession {
    pub tax_year: i32,
    #[serde(default)]
    pub income: IncomeProfile,
    #[serde(default)]
    pub basic: BasicDeductionProfile,
    #[serde(default)]
    pub plan1: Vec<DeductionEntry>,
    #[serde(default)]
    pub plan2: Vec<DeductionEntry>,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Default for TaxSession {
    fn default() -> Self {
        Self::new(DEFAULT_TAX_YEAR)
    }
}

impl TaxSession {
    pub fn new(tax_year: i32) -> Self {
        Self {
            tax_year,
            income: IncomeProfile::default(),
            basic: BasicDeductionProfile::default(),
            plan1: Vec::new(),
            plan2: Vec::new(),
            saved_at: None,
        }
    }

    pub fn rules(&self) -> Result<TaxYearRules, TaxYearError> {
        TaxYearRules::for_year(self.tax_year)
    }

    /// Runs the three-way comparison with this session's tax-year rules.
    pub fn compare(&self) -> Result<ComparisonSnapshot, TaxYearError> {
        let rules = self.rules()?;
        Ok(self.compare_with(&rules))
    }

    /// Same as [`TaxSession::compare`] with caller-supplied rules (for a
    /// bracket table loaded from disk).
    pub fn compare_with(
        &self,
        rules: &TaxYearRules,
    ) -> ComparisonSnapshot {
        ComparisonCoordinator::new(rules).compare(&self.income, &self.basic, &self.plan1, &self.plan2)
    }

    pub fn plan(
        &self,
        scenario: Scenario,
    ) -> Option<&[DeductionEntry]> {
        match scenario {
            Scenario::Baseline => None,
            Scenario::Plan1 => Some(&self.plan1),
            Scenario::Plan2 => Some(&self.plan2),
        }
    }

    fn plan_mut(
        &mut self,
        scenario: Scenario,
    ) -> Option<&mut Vec<DeductionEntry>> {
        match scenario {
            Scenario::Baseline => None,
            Scenario::Plan1 => Some(&mut self.plan1),
            Scenario::Plan2 => Some(&mut self.plan2),
        }
    }

    /// Sets (or overwrites) one item in a plan. Returns `false` for the
    /// baseline, which has no optional deductions.
    ///
    /// Every earlier row for the item is dropped and the new one takes the
    /// first row's place, so the plan ends up with exactly one row per item.
    pub fn set_entry(
        &mut self,
        scenario: Scenario,
        entry: DeductionEntry,
    ) -> bool {
        let Some(plan) = self.plan_mut(scenario) else {
            return false;
        };
        let position = plan.iter().position(|e| e.item_id == entry.item_id);
        plan.retain(|e| e.item_id != entry.item_id);
        match position {
            Some(index) => plan.insert(index, entry),
            None => plan.push(entry),
        }
        true
    }

    /// Ticks `item` and sets it to the most that still counts: its own cap
    /// at the current net income, limited by what is left in its group.
    pub fn set_entry_to_max(
        &mut self,
        scenario: Scenario,
        item: DeductionItemId,
        allocator: &DeductionPoolAllocator,
    ) -> Option<Decimal> {
        let entries = self.plan(scenario)?;
        let amount = allocator.max_allowed(item, entries, self.income.net_income());
        self.set_entry(scenario, DeductionEntry::enabled(item, amount));
        Some(amount)
    }

    /// Resets every entry of a plan to unticked and zero.
    pub fn clear_plan(
        &mut self,
        scenario: Scenario,
    ) {
        if let Some(plan) = self.plan_mut(scenario) {
            for entry in plan.iter_mut() {
                entry.enabled = false;
                entry.raw_amount = Decimal::ZERO;
            }
        }
    }

    /// Replaces income and, when given, the monthly social security figure;
    /// used when figures arrive from a pay-slip import.
    pub fn apply_income(
        &mut self,
        income: IncomeProfile,
        monthly_social_security: Option<Decimal>,
    ) {
        self.income = income;
        if let Some(ss) = monthly_social_security {
            self.basic.monthly_social_security = ss;
        }
    }
}
