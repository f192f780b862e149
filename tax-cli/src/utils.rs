use rust_decimal::Decimal;
use tax_core::calculations::common::round_half_up;

/// Formats an amount of baht with thousands separators.
///
/// Whole amounts print without decimals; anything else prints with two.
pub fn format_baht(amount: Decimal) -> String {
    let rounded = round_half_up(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let abs = rounded.abs();
    let whole = abs.trunc().normalize().to_string();
    let fraction = abs.fract();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if fraction.is_zero() {
        format!("{sign}{grouped}")
    } else {
        let satang = (fraction * Decimal::ONE_HUNDRED).trunc().normalize().to_string();
        format!("{sign}{grouped}.{satang:0>2}")
    }
}

/// Formats an optional percentage, using "—" when `None`.
pub fn opt_percent_display(d: Option<Decimal>) -> String {
    d.map(|v| format!("{}%", v.normalize()))
        .unwrap_or_else(|| "—".to_string())
}
