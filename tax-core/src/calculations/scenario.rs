//! Tax for one named scenario.
//!
//! A scenario is the basic deduction plus, for a plan, whatever the
//! [`DeductionPoolAllocator`] lets through. The baseline has no plan entries.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::ScenarioEngine;
//! use tax_core::{BasicDeductionProfile, IncomeProfile, Scenario, TaxYearRules};
//!
//! let rules = TaxYearRules::default();
//! let engine = ScenarioEngine::new(&rules);
//! let income = IncomeProfile::new(dec!(45000), dec!(90000));
//!
//! let result = engine.evaluate(&income, &BasicDeductionProfile::single(), None, Scenario::Baseline);
//!
//! assert_eq!(result.tax_owed, dec!(24500));
//! assert_eq!(result.tax_per_month, dec!(2042));
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::calculations::DeductionPoolAllocator;
use crate::calculations::bracket_engine::TaxBracketEngine;
use crate::calculations::common::round_baht;
use crate::{
    BasicDeductionProfile, DeductionEntry, IncomeProfile, Scenario, ScenarioResult, TaxYearRules,
};

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Evaluates scenarios against one tax year's rules.
#[derive(Debug, Clone)]
pub struct ScenarioEngine<'a> {
    rules: &'a TaxYearRules,
    allocator: DeductionPoolAllocator,
}

impl<'a> ScenarioEngine<'a> {
    /// Uses the standard deduction catalog.
    pub fn new(rules: &'a TaxYearRules) -> Self {
        Self::with_allocator(rules, DeductionPoolAllocator::standard())
    }

    pub fn with_allocator(
        rules: &'a TaxYearRules,
        allocator: DeductionPoolAllocator,
    ) -> Self {
        Self { rules, allocator }
    }

    pub fn rules(&self) -> &'a TaxYearRules {
        self.rules
    }

    pub fn allocator(&self) -> &DeductionPoolAllocator {
        &self.allocator
    }

    /// Computes the result for `scenario`.
    ///
    /// `entries` of `None` means no optional deductions at all; the baseline
    /// is always evaluated that way, whatever is passed.
    pub fn evaluate(
        &self,
        income: &IncomeProfile,
        basic: &BasicDeductionProfile,
        entries: Option<&[DeductionEntry]>,
        scenario: Scenario,
    ) -> ScenarioResult {
        let net_income = income.net_income();
        let basic_deduction = basic.total(&self.rules.allowances);

        let entries = match scenario {
            Scenario::Baseline => None,
            _ => entries,
        };
        let deduction_breakdown = match entries {
            Some(entries) => self.allocator.allocate(entries, net_income).contributing(),
            None => Default::default(),
        };
        let plan_deduction: Decimal = deduction_breakdown.values().copied().sum();
        let total_deduction = basic_deduction + plan_deduction;

        let engine = TaxBracketEngine::new(&self.rules.brackets);
        let taxable_income = engine.taxable_income(net_income, total_deduction);
        let tax_owed = engine.compute_tax(net_income, total_deduction);

        debug!(
            scenario = scenario.as_str(),
            %net_income,
            %total_deduction,
            %tax_owed,
            "scenario evaluated"
        );

        ScenarioResult {
            scenario,
            deduction_breakdown,
            basic_deduction,
            plan_deduction,
            total_deduction,
            taxable_income,
            tax_owed,
            tax_per_month: round_baht(tax_owed / MONTHS_PER_YEAR),
        }
    }
}
