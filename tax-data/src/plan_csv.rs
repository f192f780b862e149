//! CSV loader for plan entries.
//!
//! ## CSV Format
//!
//! Headers are matched by name; column order does not matter.
//!
//! | Column    | Type    | Notes                                            |
//! |-----------|---------|--------------------------------------------------|
//! | `plan`    | string  | `plan1`/`1` or `plan2`/`2`                        |
//! | `item`    | string  | Deduction item id, e.g. `rmf`, `thai_esg`         |
//! | `enabled` | flag    | `true`, `yes`, `1`, `x`; anything else is false   |
//! | `amount`  | decimal | Commas allowed; invalid values become 0           |
//!
//! ```csv
//! plan,item,enabled,amount
//! plan1,life_insurance,true,"30,000"
//! plan2,rmf,yes,100000
//! ```

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{DeductionEntry, DeductionItemId, Scenario};

use crate::fields::{deserialize_lenient_amount, deserialize_lenient_flag};

#[derive(Debug, Deserialize)]
struct CsvRow {
    plan: String,
    item: String,
    #[serde(deserialize_with = "deserialize_lenient_flag")]
    enabled: bool,
    #[serde(deserialize_with = "deserialize_lenient_amount")]
    amount: Decimal,
}

/// Errors that can occur while loading plan entries.
#[derive(Debug, thiserror::Error)]
pub enum PlanCsvError {
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// `row` is 1-based, not counting the header.
    #[error("unrecognised plan '{plan}' on row {row}")]
    UnknownPlan { plan: String, row: usize },

    #[error("unrecognised deduction item '{item}' on row {row}")]
    UnknownItem { item: String, row: usize },

    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Entries for both plans, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanEntries {
    pub plan1: Vec<DeductionEntry>,
    pub plan2: Vec<DeductionEntry>,
}

fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<(Scenario, DeductionEntry), PlanCsvError> {
    let scenario = match Scenario::parse(&row.plan) {
        Some(s @ (Scenario::Plan1 | Scenario::Plan2)) => s,
        _ => {
            return Err(PlanCsvError::UnknownPlan {
                plan: row.plan,
                row: row_number,
            });
        }
    };
    let item_id = DeductionItemId::parse(&row.item).ok_or_else(|| PlanCsvError::UnknownItem {
        item: row.item.clone(),
        row: row_number,
    })?;

    Ok((
        scenario,
        DeductionEntry {
            item_id,
            enabled: row.enabled,
            raw_amount: row.amount,
        },
    ))
}

/// Parse CSV text into entries for both plans.
///
/// # Errors
///
/// * [`PlanCsvError::Parse`] when the CSV is structurally invalid.
/// * [`PlanCsvError::UnknownPlan`] / [`PlanCsvError::UnknownItem`] with the
///   offending 1-based row.
pub fn load_plan_from_str(input: &str) -> Result<PlanEntries, PlanCsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    let mut entries = PlanEntries::default();
    for (idx, result) in reader.deserialize::<CsvRow>().enumerate() {
        let (scenario, entry) = convert_row(result?, idx + 1)?;
        match scenario {
            Scenario::Plan2 => entries.plan2.push(entry),
            _ => entries.plan1.push(entry),
        }
    }
    Ok(entries)
}

/// Read a file from disk and delegate to [`load_plan_from_str`].
pub fn load_plan_from_file(path: &Path) -> Result<PlanEntries, PlanCsvError> {
    let contents = std::fs::read_to_string(path).map_err(|source| PlanCsvError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_plan_from_str(&contents)
}
