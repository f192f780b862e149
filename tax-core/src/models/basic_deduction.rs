use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::AllowanceSchedule;
use crate::calculations::common::{bounded_amount, min};

/// Entitlement-based allowances, identical in every scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicDeductionProfile {
    pub has_spouse: bool,
    pub children_before_2018: u32,
    pub children_from_2018: u32,
    /// Applicant's own parents claimed (0..=2).
    pub parent_count: u32,
    /// Spouse's parents claimed (0..=2).
    pub spouse_parent_count: u32,
    /// Premiums paid for parents' health insurance.
    pub parent_health_insurance: Decimal,
    /// Monthly social security contribution as shown on the pay slip.
    pub monthly_social_security: Decimal,
}

/// The basic deduction split by line, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicDeductionBreakdown {
    pub personal: Decimal,
    pub spouse: Decimal,
    pub children: Decimal,
    pub parents: Decimal,
    pub parent_health_insurance: Decimal,
    pub social_security: Decimal,
}

impl BasicDeductionBreakdown {
    pub fn total(&self) -> Decimal {
        self.personal
            + self.spouse
            + self.children
            + self.parents
            + self.parent_health_insurance
            + self.social_security
    }
}

impl BasicDeductionProfile {
    /// A single filer with no dependents.
    pub fn single() -> Self {
        Self::default()
    }

    pub fn breakdown(
        &self,
        schedule: &AllowanceSchedule,
    ) -> BasicDeductionBreakdown {
        let parents = self.parent_count.min(schedule.max_parents_per_side)
            + self.spouse_parent_count.min(schedule.max_parents_per_side);

        BasicDeductionBreakdown {
            personal: schedule.personal,
            spouse: if self.has_spouse {
                schedule.spouse
            } else {
                Decimal::ZERO
            },
            children: schedule
                .child
                .allowance(self.children_before_2018, self.children_from_2018),
            parents: schedule.parent_each * Decimal::from(parents),
            parent_health_insurance: min(
                bounded_amount(self.parent_health_insurance),
                schedule.parent_health_insurance_cap,
            ),
            social_security: min(
                bounded_amount(self.monthly_social_security) * Decimal::from(12),
                schedule.social_security_cap,
            ),
        }
    }

    /// `basicDeductionTotal` under `schedule`.
    pub fn total(
        &self,
        schedule: &AllowanceSchedule,
    ) -> Decimal {
        self.breakdown(schedule).total()
    }
}
