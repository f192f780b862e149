//! Boundary loaders: bracket tables, plan entries and salary slips.

pub mod bracket_csv;
pub mod fields;
pub mod plan_csv;
pub mod slips;

pub use bracket_csv::{BracketCsvError, BracketTableLoader, TaxBracketRecord};
pub use fields::{lenient_amount, lenient_flag};
pub use plan_csv::{PlanCsvError, PlanEntries, load_plan_from_file, load_plan_from_str};
pub use slips::{
    IncomeImport, SalarySlip, SlipExtraction, SlipLoadError, extract_slip_fields,
    load_slips_from_file, load_slips_from_str,
};
