mod basic_deduction;
mod comparison_snapshot;
mod deduction_entry;
mod deduction_item;
mod group_usage;
mod income_profile;
mod scenario_result;
mod tax_bracket;
mod tax_session;
mod tax_year_rules;

pub use basic_deduction::{BasicDeductionBreakdown, BasicDeductionProfile};
pub use comparison_snapshot::{ComparisonSnapshot, Recommendation};
pub use deduction_entry::DeductionEntry;
pub use deduction_item::{
    DeductionCatalog, DeductionGroup, DeductionItemId, DeductionItemSpec, GroupSpec,
    ReductionPolicy,
};
pub use group_usage::{GroupUsage, LimitStatus};
pub use income_profile::{EXPENSE_DEDUCTION_CAP, EXPENSE_DEDUCTION_RATE, IncomeProfile};
pub use scenario_result::{Scenario, ScenarioResult};
pub use tax_bracket::{BracketTable, BracketTableError, TaxBracket};
pub use tax_session::TaxSession;
pub use tax_year_rules::{
    AllowanceSchedule, ChildAllowanceRule, DEFAULT_TAX_YEAR, SUPPORTED_TAX_YEARS, TaxYearError,
    TaxYearRules,
};
