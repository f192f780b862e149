//! Plain-text rendering of engine output. Reads snapshots; never recomputes.

use std::io::{self, Write};

use rust_decimal::Decimal;
use tax_core::{BracketTable, ComparisonSnapshot, GroupUsage, LimitStatus, ScenarioResult};
use tax_data::IncomeImport;

use crate::utils::{format_baht, opt_percent_display};

const LABEL_WIDTH: usize = 18;
const COLUMN_WIDTH: usize = 14;

fn status_label(status: LimitStatus) -> &'static str {
    match status {
        LimitStatus::Empty => "empty",
        LimitStatus::Normal => "ok",
        LimitStatus::NearLimit => "near limit",
        LimitStatus::OverLimit => "OVER LIMIT",
    }
}

fn write_row<W: Write>(
    out: &mut W,
    label: &str,
    cells: [String; 3],
) -> io::Result<()> {
    let [a, b, c] = cells;
    writeln!(
        out,
        "{label:<LABEL_WIDTH$}{a:>COLUMN_WIDTH$}{b:>COLUMN_WIDTH$}{c:>COLUMN_WIDTH$}"
    )
}

fn amounts(
    results: [&ScenarioResult; 3],
    field: impl Fn(&ScenarioResult) -> Decimal,
) -> [String; 3] {
    results.map(|r| format_baht(field(r)))
}

fn write_plan_detail<W: Write>(
    out: &mut W,
    title: &str,
    result: &ScenarioResult,
    groups: &[GroupUsage],
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{title} deductions")?;
    if result.deduction_breakdown.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for (item, amount) in &result.deduction_breakdown {
        writeln!(
            out,
            "  {:<LABEL_WIDTH$}{:>COLUMN_WIDTH$}",
            item.label(),
            format_baht(*amount)
        )?;
    }
    for usage in groups {
        writeln!(
            out,
            "  [{}] {} of {} counted, {} left ({})",
            usage.group.as_str(),
            format_baht(usage.allowed_total),
            format_baht(usage.cap),
            format_baht(usage.remaining),
            status_label(usage.status)
        )?;
    }
    Ok(())
}

/// Side-by-side table of the three scenarios, then each plan's breakdown
/// and group usage, then the recommendation.
pub fn write_snapshot<W: Write>(
    out: &mut W,
    snapshot: &ComparisonSnapshot,
) -> io::Result<()> {
    let results = [&snapshot.baseline, &snapshot.plan1, &snapshot.plan2];

    writeln!(
        out,
        "Tax year {}, net income {}",
        snapshot.tax_year,
        format_baht(snapshot.net_income)
    )?;
    writeln!(out)?;
    write_row(
        out,
        "",
        ["Baseline".into(), "Plan 1".into(), "Plan 2".into()],
    )?;
    write_row(out, "Basic deduction", amounts(results, |r| r.basic_deduction))?;
    write_row(out, "Plan deduction", amounts(results, |r| r.plan_deduction))?;
    write_row(out, "Taxable income", amounts(results, |r| r.taxable_income))?;
    write_row(out, "Tax owed", amounts(results, |r| r.tax_owed))?;
    write_row(out, "Tax per month", amounts(results, |r| r.tax_per_month))?;
    write_row(
        out,
        "Savings",
        [
            "—".into(),
            format_baht(snapshot.savings_plan1),
            format_baht(snapshot.savings_plan2),
        ],
    )?;
    write_row(
        out,
        "ROI",
        [
            "—".into(),
            opt_percent_display(snapshot.roi_plan1),
            opt_percent_display(snapshot.roi_plan2),
        ],
    )?;

    write_plan_detail(out, "Plan 1", &snapshot.plan1, &snapshot.plan1_groups)?;
    write_plan_detail(out, "Plan 2", &snapshot.plan2, &snapshot.plan2_groups)?;

    writeln!(out)?;
    writeln!(out, "Recommendation: {}", snapshot.recommendation)
}

pub fn write_brackets<W: Write>(
    out: &mut W,
    tax_year: i32,
    table: &BracketTable,
) -> io::Result<()> {
    writeln!(out, "Tax brackets for {tax_year}")?;
    for bracket in table.brackets() {
        let upper = bracket
            .max_income
            .map(format_baht)
            .unwrap_or_else(|| "and above".to_string());
        writeln!(
            out,
            "  {:>12} - {:<12}{:>4}%",
            format_baht(bracket.min_income),
            upper,
            bracket.rate_percent.normalize()
        )?;
    }
    Ok(())
}

pub fn write_import<W: Write>(
    out: &mut W,
    import: &IncomeImport,
) -> io::Result<()> {
    let kind = if import.estimated {
        "estimated over 12 months"
    } else {
        "actual"
    };
    writeln!(out, "Slips: {} month(s) with salary, {kind}", import.months_used)?;
    writeln!(out, "  Annual salary        {}", format_baht(import.annual_salary))?;
    writeln!(out, "  Annual bonus         {}", format_baht(import.annual_bonus))?;
    writeln!(
        out,
        "  Social security      {} ({} / month)",
        format_baht(import.annual_social_security),
        format_baht(import.monthly_social_security())
    )
}
