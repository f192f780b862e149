use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tax_core::store::{MemoryStoreFactory, StoreRegistry};
use tax_core::{
    DeductionEntry, DeductionItemId, Scenario, SessionStore, TaxSession, TaxYearRules,
    calculations::DeductionPoolAllocator,
};
use tax_data::{BracketTableLoader, IncomeImport, PlanEntries, lenient_amount};
use tax_store_sqlite::SqliteStoreFactory;
use tracing::{debug, info};

/// Registry with every backend this binary knows about.
pub fn build_registry() -> StoreRegistry {
    let mut registry = StoreRegistry::new();
    registry.register(Box::new(MemoryStoreFactory));
    registry.register(Box::new(SqliteStoreFactory));
    registry
}

/// Built-in rules for `tax_year`, with the bracket table replaced by the
/// matching year from `brackets_file` when one is given.
pub fn load_rules(
    tax_year: i32,
    brackets_file: Option<&Path>,
) -> Result<TaxYearRules> {
    let rules = TaxYearRules::for_year(tax_year)?;
    let Some(path) = brackets_file else {
        return Ok(rules);
    };

    let file = File::open(path)
        .with_context(|| format!("failed to open bracket file '{}'", path.display()))?;
    let table = BracketTableLoader::load_year(file, tax_year)
        .with_context(|| format!("failed to load brackets from '{}'", path.display()))?;
    info!(
        tax_year,
        brackets = table.len(),
        path = %path.display(),
        "using bracket table from file"
    );
    Ok(rules.with_brackets(table))
}

pub fn read_session_file(path: &Path) -> Result<TaxSession> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read session file '{}'", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("invalid session JSON in '{}'", path.display()))
}

pub fn write_session_file(
    path: &Path,
    session: &TaxSession,
) -> Result<()> {
    let json = serde_json::to_string_pretty(session)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write session file '{}'", path.display()))
}

/// Loads `key` from the store, or starts a fresh session for `tax_year`.
pub async fn load_or_new(
    store: &dyn SessionStore,
    key: &str,
    tax_year: i32,
) -> Result<TaxSession> {
    match store.load(key).await? {
        Some(session) => Ok(session),
        None => {
            debug!(key, tax_year, "no stored session, starting a new one");
            Ok(TaxSession::new(tax_year))
        }
    }
}

/// Replaces each plan that has at least one row in `plans`.
pub fn apply_plans(
    session: &mut TaxSession,
    plans: PlanEntries,
) {
    if !plans.plan1.is_empty() {
        session.plan1 = plans.plan1;
    }
    if !plans.plan2.is_empty() {
        session.plan2 = plans.plan2;
    }
}

/// Copies slip-derived income into the session, including the monthly
/// social security contribution.
pub fn apply_import(
    session: &mut TaxSession,
    import: &IncomeImport,
) {
    session.apply_income(
        import.into_income_profile(),
        Some(import.monthly_social_security()),
    );
}

/// What `set-entry` should do with the item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryEdit {
    /// Tick the item with a typed amount (coerced to 0 when invalid).
    Amount(String),
    /// Tick the item at the most that still counts.
    Max,
    /// Untick the item, keeping its amount.
    Disable,
}

/// Applies one plan edit and returns the amount now entered for `item`.
pub fn edit_entry(
    session: &mut TaxSession,
    scenario: Scenario,
    item: DeductionItemId,
    edit: EntryEdit,
) -> Result<Decimal> {
    if scenario == Scenario::Baseline {
        anyhow::bail!("the baseline has no optional deductions");
    }

    match edit {
        EntryEdit::Amount(text) => {
            let amount = lenient_amount(&text);
            session.set_entry(scenario, DeductionEntry::enabled(item, amount));
            Ok(amount)
        }
        EntryEdit::Max => {
            let allocator = DeductionPoolAllocator::standard();
            session
                .set_entry_to_max(scenario, item, &allocator)
                .context("plan not found")
        }
        EntryEdit::Disable => {
            let amount = session
                .plan(scenario)
                .and_then(|plan| plan.iter().rev().find(|e| e.item_id == item))
                .map(|e| e.raw_amount)
                .unwrap_or_default();
            session.set_entry(scenario, DeductionEntry::disabled(item, amount));
            Ok(amount)
        }
    }
}
