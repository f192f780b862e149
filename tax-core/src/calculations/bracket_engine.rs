//! Progressive bracket tax.
//!
//! Tax is accumulated tier by tier: each bracket taxes only the slice of
//! taxable income that falls inside it, at that bracket's rate.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::BracketTable;
//! use tax_core::calculations::TaxBracketEngine;
//!
//! let table = BracketTable::thai_standard();
//! let engine = TaxBracketEngine::new(&table);
//!
//! // Net income 530,000 less a 60,000 personal allowance.
//! assert_eq!(engine.compute_tax(dec!(530000), dec!(60000)), dec!(24500));
//! ```

use rust_decimal::Decimal;

use crate::BracketTable;
use crate::calculations::common::{max, min, non_negative, round_baht};

/// Computes tax from a validated [`BracketTable`].
///
/// The table is borrowed, so swapping tax years means passing a different
/// table; the algorithm never changes.
#[derive(Debug, Clone, Copy)]
pub struct TaxBracketEngine<'a> {
    table: &'a BracketTable,
}

impl<'a> TaxBracketEngine<'a> {
    pub fn new(table: &'a BracketTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'a BracketTable {
        self.table
    }

    /// `max(net_income - total_deduction, 0)`, with negative inputs read as
    /// zero.
    pub fn taxable_income(
        &self,
        net_income: Decimal,
        total_deduction: Decimal,
    ) -> Decimal {
        max(
            non_negative(net_income) - non_negative(total_deduction),
            Decimal::ZERO,
        )
    }

    /// Tax owed, rounded half-up to a whole baht. Never fails.
    pub fn compute_tax(
        &self,
        net_income: Decimal,
        total_deduction: Decimal,
    ) -> Decimal {
        let taxable = self.taxable_income(net_income, total_deduction);
        round_baht(self.tax_on_taxable(taxable))
    }

    /// Unrounded tax on an already-computed taxable income.
    pub fn tax_on_taxable(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        let mut total = Decimal::ZERO;

        for bracket in self.table.brackets() {
            if taxable_income <= bracket.min_income {
                break;
            }
            let upper = match bracket.max_income {
                Some(max_income) => min(taxable_income, max_income),
                None => taxable_income,
            };
            let in_bracket = upper - bracket.min_income;
            if in_bracket > Decimal::ZERO {
                let slice_tax = in_bracket.saturating_mul(bracket.rate_percent) / Decimal::ONE_HUNDRED;
                total = total.saturating_add(slice_tax);
            }
        }

        total
    }

    /// Rate (in percent) applied to the next baht of taxable income.
    pub fn marginal_rate(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        self.table
            .brackets()
            .iter()
            .find(|b| {
                taxable_income >= b.min_income
                    && b.max_income.is_none_or(|max_income| taxable_income < max_income)
            })
            .map(|b| b.rate_percent)
            .unwrap_or(Decimal::ZERO)
    }
}
