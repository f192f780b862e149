use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DeductionGroup;

/// How full a capped group is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitStatus {
    Empty,
    Normal,
    /// Above 90% of the cap.
    NearLimit,
    /// Raw amounts exceed the cap; the allocator will clamp.
    OverLimit,
}

/// Capacity-bar data for one group: what was entered versus what counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupUsage {
    pub group: DeductionGroup,
    /// Sum of enabled raw amounts.
    pub raw_total: Decimal,
    /// Sum after the allocator's clamping.
    pub allowed_total: Decimal,
    pub cap: Decimal,
    /// `max(cap - raw_total, 0)`.
    pub remaining: Decimal,
    pub status: LimitStatus,
}
