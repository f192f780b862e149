//! Salary slips as an income source.
//!
//! Slips arrive either as CSV (one row per month) or as free text pulled off
//! a slip image, which [`extract_slip_fields`] mines for a salary and a
//! social security figure. Either way the months are then summed or
//! projected into an [`IncomeImport`] and handed to the engine as an
//! ordinary [`IncomeProfile`].
//!
//! ```csv
//! month,salary,bonus,social_security
//! 1,"45,000",0,750
//! 2,45000,,750
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tax_core::IncomeProfile;
use tax_core::calculations::common::{min, round_baht, round_half_up};
use thiserror::Error;
use tracing::debug;

use crate::fields::deserialize_lenient_amount;

/// One month's figures from a pay slip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalarySlip {
    /// 1..=12
    pub month: u32,
    #[serde(deserialize_with = "deserialize_lenient_amount")]
    pub salary: Decimal,
    #[serde(default, deserialize_with = "deserialize_lenient_amount")]
    pub bonus: Decimal,
    #[serde(default, deserialize_with = "deserialize_lenient_amount")]
    pub social_security: Decimal,
}

#[derive(Debug, Error)]
pub enum SlipLoadError {
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("month {month} on row {row} is outside 1..=12")]
    InvalidMonth { month: u32, row: usize },

    #[error("no month has a salary; add slip data first")]
    NoSlipData,

    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Parse slip CSV. When a month appears twice the later row wins. The result
/// is ordered by month.
pub fn load_slips_from_str(input: &str) -> Result<Vec<SalarySlip>, SlipLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(input.as_bytes());

    let mut by_month = BTreeMap::new();
    for (idx, result) in reader.deserialize::<SalarySlip>().enumerate() {
        let slip = result?;
        if !(1..=12).contains(&slip.month) {
            return Err(SlipLoadError::InvalidMonth {
                month: slip.month,
                row: idx + 1,
            });
        }
        if by_month.insert(slip.month, slip).is_some() {
            debug!(row = idx + 1, "duplicate month; later row replaces earlier");
        }
    }
    Ok(by_month.into_values().collect())
}

pub fn load_slips_from_file(path: &Path) -> Result<Vec<SalarySlip>, SlipLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| SlipLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_slips_from_str(&contents)
}

/// Annual income figures derived from slips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeImport {
    pub annual_salary: Decimal,
    pub annual_bonus: Decimal,
    pub annual_social_security: Decimal,
    /// Months with a salary that went into the figures.
    pub months_used: u32,
    /// `true` when the figures are a 12-month projection.
    pub estimated: bool,
}

struct SlipTotals {
    salary: Decimal,
    bonus: Decimal,
    social_security: Decimal,
    months: u32,
}

fn totals(slips: &[SalarySlip]) -> Result<SlipTotals, SlipLoadError> {
    let mut totals = SlipTotals {
        salary: Decimal::ZERO,
        bonus: Decimal::ZERO,
        social_security: Decimal::ZERO,
        months: 0,
    };
    for slip in slips.iter().filter(|s| s.salary > Decimal::ZERO) {
        totals.salary += slip.salary;
        totals.bonus += slip.bonus;
        totals.social_security += slip.social_security;
        totals.months += 1;
    }
    if totals.months == 0 {
        return Err(SlipLoadError::NoSlipData);
    }
    Ok(totals)
}

impl IncomeImport {
    /// Sums the months that have a salary.
    pub fn actual(slips: &[SalarySlip]) -> Result<Self, SlipLoadError> {
        let t = totals(slips)?;
        Ok(Self {
            annual_salary: t.salary,
            annual_bonus: t.bonus,
            annual_social_security: t.social_security,
            months_used: t.months,
            estimated: false,
        })
    }

    /// Averages the months that have a salary and projects them over twelve
    /// months, to two decimal places.
    pub fn estimated(slips: &[SalarySlip]) -> Result<Self, SlipLoadError> {
        let t = totals(slips)?;
        let months = Decimal::from(t.months);
        let project = |total: Decimal| round_half_up(total / months * Decimal::from(12));
        Ok(Self {
            annual_salary: project(t.salary),
            annual_bonus: project(t.bonus),
            annual_social_security: project(t.social_security),
            months_used: t.months,
            estimated: true,
        })
    }

    /// Monthly salary as annual / 12, with the bonus as entered.
    pub fn into_income_profile(&self) -> IncomeProfile {
        IncomeProfile::new(
            round_half_up(self.annual_salary / Decimal::from(12)),
            self.annual_bonus,
        )
    }

    pub fn monthly_social_security(&self) -> Decimal {
        round_half_up(self.annual_social_security / Decimal::from(12))
    }
}

// ---------------------------------------------------------------------------
// Text extraction
// ---------------------------------------------------------------------------

/// Whatever could be read off a slip's text. Always proof-read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlipExtraction {
    pub salary: Option<Decimal>,
    pub social_security: Option<Decimal>,
    /// Set when a salary was found.
    pub found: bool,
}

const SALARY_MIN: i64 = 10_000;
const SALARY_MAX: i64 = 999_999;
const SOCIAL_SECURITY_MIN: i64 = 100;
const SOCIAL_SECURITY_MAX: i64 = 1_500;
const SOCIAL_SECURITY_DEFAULT: i64 = 750;

static NET_PAY_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)(?:net\s*pay|รับสุทธิ|สุทธิ).*?(\d{1,3}(?:,\d{3})*(?:\.\d{2})?)")
            .expect("net pay pattern"),
        Regex::new(r"(?i)(?:total|รวม).*?(\d{1,3}(?:,\d{3})*(?:\.\d{2})?)")
            .expect("total pattern"),
        Regex::new(r"(\d{1,3}(?:,\d{3})+)").expect("grouped number pattern"),
    ]
});

static SOCIAL_SECURITY_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)(?:ประกันสังคม|social\s*security|\bs\.s\.|\bss\b).*?(\d{3,4})")
            .expect("labelled social security pattern"),
        Regex::new(r"(750)").expect("standard contribution pattern"),
        Regex::new(r"(?i)(\d{3})\s*(?:บาท|baht)").expect("baht amount pattern"),
    ]
});

static NUMBER_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\d,]+").expect("number run pattern"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Whole baht from a captured number, ignoring thousands separators and
/// any fractional part.
fn whole_baht(captured: &str) -> Option<i64> {
    let digits = captured.replace(',', "");
    let integer = digits.split('.').next().unwrap_or_default();
    integer.parse().ok()
}

fn first_in_range(
    patterns: &[Regex],
    text: &str,
    range: std::ops::RangeInclusive<i64>,
) -> Option<i64> {
    patterns.iter().find_map(|pattern| {
        let amount = pattern
            .captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| whole_baht(m.as_str()))?;
        range.contains(&amount).then_some(amount)
    })
}

/// Best-effort salary and social security from slip text.
///
/// Salary is the first net-pay or total figure in 10,000..=999,999, falling
/// back to any comma-grouped number in that range. Social security is the
/// first labelled figure in 100..=1,500; if a salary was found without one it
/// is estimated as `min(750, 5% of salary)`.
pub fn extract_slip_fields(text: &str) -> SlipExtraction {
    let text = WHITESPACE.replace_all(text, " ");

    let salary = first_in_range(&*NET_PAY_PATTERNS, &text, SALARY_MIN..=SALARY_MAX).or_else(|| {
        NUMBER_RUN
            .find_iter(&text)
            .filter_map(|m| whole_baht(m.as_str()))
            .find(|amount| (SALARY_MIN..=SALARY_MAX).contains(amount))
    });

    let social_security = first_in_range(
        &*SOCIAL_SECURITY_PATTERNS,
        &text,
        SOCIAL_SECURITY_MIN..=SOCIAL_SECURITY_MAX,
    )
    .map(Decimal::from)
    .or_else(|| {
        salary.map(|s| {
            let five_percent = round_baht(Decimal::from(s) * Decimal::new(5, 2));
            min(Decimal::from(SOCIAL_SECURITY_DEFAULT), five_percent)
        })
    });

    debug!(
        salary,
        ?social_security,
        "slip text extraction"
    );

    SlipExtraction {
        salary: salary.map(Decimal::from),
        social_security,
        found: salary.is_some(),
    }
}
