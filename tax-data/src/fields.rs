//! Field-level parsing shared by the CSV loaders and typed CLI input.
//!
//! Amount cells are lenient: thousands separators are accepted, and an
//! unparseable value becomes zero with a warning instead of failing the row.

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

/// Trims whitespace and removes commas used as thousands separators.
fn normalize_amount(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses an amount, reading empty or invalid input as zero.
///
/// Negative amounts are kept; the engine treats them as zero itself.
pub fn lenient_amount(s: &str) -> Decimal {
    let normalized = normalize_amount(s);
    if normalized.is_empty() {
        return Decimal::ZERO;
    }
    normalized.parse().unwrap_or_else(|e| {
        warn!(input = %s, "invalid amount, using 0: {}", e);
        Decimal::ZERO
    })
}

/// `true` for `true`, `yes`, `y`, `1` and `x` (any case), `false` otherwise.
pub fn lenient_flag(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "y" | "1" | "x"
    )
}

pub(crate) fn deserialize_lenient_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.as_deref().map(lenient_amount).unwrap_or(Decimal::ZERO))
}

pub(crate) fn deserialize_lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.as_deref().is_some_and(lenient_flag))
}

/// Strict optional decimal: empty means `None`, anything else must parse.
pub(crate) fn deserialize_optional_decimal<'de, D>(
    deserializer: D,
) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => normalize_amount(&s)
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}
