use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DeductionItemId;

/// The three scenarios kept side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Baseline,
    Plan1,
    Plan2,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Plan1 => "plan1",
            Self::Plan2 => "plan2",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "baseline" => Some(Self::Baseline),
            "plan1" | "1" => Some(Self::Plan1),
            "plan2" | "2" => Some(Self::Plan2),
            _ => None,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tax outcome of one scenario. Derived from its inputs and never edited
/// directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario: Scenario,
    /// Clamped amount per optional item; only items that contribute appear.
    pub deduction_breakdown: BTreeMap<DeductionItemId, Decimal>,
    pub basic_deduction: Decimal,
    /// Sum of the breakdown.
    pub plan_deduction: Decimal,
    /// `basic_deduction + plan_deduction`.
    pub total_deduction: Decimal,
    pub taxable_income: Decimal,
    pub tax_owed: Decimal,
    pub tax_per_month: Decimal,
}
