use std::collections::BTreeMap;
use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{BracketTable, BracketTableError, TaxBracket};
use thiserror::Error;

use crate::fields::deserialize_optional_decimal;

/// Errors that can occur when loading bracket tables.
#[derive(Debug, Error)]
pub enum BracketCsvError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid bracket table for tax year {tax_year}: {source}")]
    InvalidTable {
        tax_year: i32,
        #[source]
        source: BracketTableError,
    },

    #[error("No brackets for tax year {0} in file")]
    MissingYear(i32),
}

impl From<csv::Error> for BracketCsvError {
    fn from(err: csv::Error) -> Self {
        BracketCsvError::CsvParse(err.to_string())
    }
}

/// A single record from a bracket CSV file.
///
/// - `tax_year`: Buddhist-era tax year (e.g. 2568)
/// - `min_income`: lower bound of taxable income for this bracket
/// - `max_income`: upper bound (empty for the open-ended top bracket)
/// - `rate`: whole percentage (e.g. `5` for 5%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxBracketRecord {
    pub tax_year: i32,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

/// Loader for bracket tables from CSV.
pub struct BracketTableLoader;

impl BracketTableLoader {
    /// Parse bracket records from any reader, in file order.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<TaxBracketRecord>, BracketCsvError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: TaxBracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Groups records by tax year and validates each group into a
    /// [`BracketTable`]. Rows may appear in any order within a year.
    pub fn into_tables(
        records: &[TaxBracketRecord]
    ) -> Result<BTreeMap<i32, BracketTable>, BracketCsvError> {
        let mut by_year: BTreeMap<i32, Vec<TaxBracket>> = BTreeMap::new();
        for record in records {
            by_year
                .entry(record.tax_year)
                .or_default()
                .push(TaxBracket::new(record.min_income, record.max_income, record.rate));
        }

        by_year
            .into_iter()
            .map(|(tax_year, mut brackets)| {
                brackets.sort_by(|a, b| a.min_income.cmp(&b.min_income));
                BracketTable::new(brackets)
                    .map(|table| (tax_year, table))
                    .map_err(|source| BracketCsvError::InvalidTable { tax_year, source })
            })
            .collect()
    }

    /// Parses a file's worth of CSV and returns the validated table for
    /// `tax_year`.
    pub fn load_year<R: Read>(
        reader: R,
        tax_year: i32,
    ) -> Result<BracketTable, BracketCsvError> {
        let records = Self::parse(reader)?;
        let mut tables = Self::into_tables(&records)?;
        tables
            .remove(&tax_year)
            .ok_or(BracketCsvError::MissingYear(tax_year))
    }
}
