use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{GroupUsage, ScenarioResult};

/// Which plan, if any, is worth pursuing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Plan1,
    Plan2,
    /// Neither plan saves enough to be worth it.
    Neither,
}

impl fmt::Display for Recommendation {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let text = match self {
            Self::Plan1 => "plan 1",
            Self::Plan2 => "plan 2",
            Self::Neither => "neither plan materially helps",
        };
        f.write_str(text)
    }
}

/// Everything a presentation layer needs, computed in one pass.
///
/// Renderers and exporters read this; they never recompute tax figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonSnapshot {
    pub tax_year: i32,
    pub net_income: Decimal,
    pub baseline: ScenarioResult,
    pub plan1: ScenarioResult,
    pub plan2: ScenarioResult,
    /// `baseline.tax_owed - plan1.tax_owed`.
    pub savings_plan1: Decimal,
    pub savings_plan2: Decimal,
    pub recommendation: Recommendation,
    /// Savings as a percentage of the plan's extra deductions, `None` when
    /// the plan deducts nothing.
    pub roi_plan1: Option<Decimal>,
    pub roi_plan2: Option<Decimal>,
    pub plan1_groups: Vec<GroupUsage>,
    pub plan2_groups: Vec<GroupUsage>,
}
