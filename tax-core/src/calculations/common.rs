//! Common utility functions for tax calculations.
//!
//! This module provides shared functionality used across the bracket engine,
//! the deduction allocator and the comparison layer, including rounding and
//! clamping.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Largest input amount the engine works with (one quadrillion baht).
///
/// Entered amounts above this are read as the ceiling, so every sum and
/// product the engine forms stays far inside `Decimal`'s range.
pub const AMOUNT_CEILING: Decimal = dec!(1000000000000000);

/// Rounds a decimal value to `dp` decimal places using half-up rounding.
///
/// Values exactly at the midpoint are rounded away from zero, which for the
/// non-negative amounts this crate works with means "up".
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_dp_half_up;
///
/// assert_eq!(round_dp_half_up(dec!(12.345), 2), dec!(12.35));
/// assert_eq!(round_dp_half_up(dec!(12.25), 1), dec!(12.3));
/// ```
pub fn round_dp_half_up(
    value: Decimal,
    dp: u32,
) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    round_dp_half_up(value, 2)
}

/// Rounds a decimal value to a whole baht using half-up rounding.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_baht;
///
/// assert_eq!(round_baht(dec!(24499.5)), dec!(24500));
/// assert_eq!(round_baht(dec!(24499.49)), dec!(24499));
/// ```
pub fn round_baht(value: Decimal) -> Decimal {
    round_dp_half_up(value, 0)
}

/// Returns the maximum of two decimal values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
/// assert_eq!(max(dec!(-100.00), dec!(-200.00)), dec!(-100.00));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Returns the minimum of two decimal values.
pub fn min(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a < b { a } else { b }
}

/// Clamps negative values to zero.
///
/// Upstream amounts come from free-text fields; anything below zero is
/// treated as if nothing was entered.
pub fn non_negative(value: Decimal) -> Decimal {
    max(value, Decimal::ZERO)
}

/// Reads an entered amount: negatives become zero and anything above
/// [`AMOUNT_CEILING`] becomes the ceiling.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::{AMOUNT_CEILING, bounded_amount};
///
/// assert_eq!(bounded_amount(dec!(-5)), Decimal::ZERO);
/// assert_eq!(bounded_amount(Decimal::MAX), AMOUNT_CEILING);
/// ```
pub fn bounded_amount(value: Decimal) -> Decimal {
    min(non_negative(value), AMOUNT_CEILING)
}
