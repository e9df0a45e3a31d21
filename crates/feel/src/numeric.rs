//! Decimal arithmetic for FEEL numbers.
//!
//! Every operation is checked: leaving `rust_decimal`'s range raises
//! [`FeelError::Overflow`] instead of panicking. No `f64` anywhere.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};

use crate::error::FeelError;

pub fn add(left: Decimal, right: Decimal) -> Result<Decimal, FeelError> {
    left.checked_add(right)
        .ok_or_else(|| FeelError::overflow(format!("{} + {}", left, right)))
}

pub fn sub(left: Decimal, right: Decimal) -> Result<Decimal, FeelError> {
    left.checked_sub(right)
        .ok_or_else(|| FeelError::overflow(format!("{} - {}", left, right)))
}

pub fn mul(left: Decimal, right: Decimal) -> Result<Decimal, FeelError> {
    left.checked_mul(right)
        .ok_or_else(|| FeelError::overflow(format!("{} * {}", left, right)))
}

/// Number division. A zero divisor is an argument error; only durations
/// divided by zero yield null.
pub fn div(left: Decimal, right: Decimal) -> Result<Decimal, FeelError> {
    if right.is_zero() {
        return Err(FeelError::invalid_argument("/", "division by zero"));
    }
    left.checked_div(right)
        .ok_or_else(|| FeelError::overflow(format!("{} / {}", left, right)))
}

/// `base ** exponent`. Whole exponents use exact repeated squaring (a
/// negative exponent inverts the result); fractional exponents go through
/// `rust_decimal`'s `powd`.
pub fn pow(base: Decimal, exponent: Decimal) -> Result<Decimal, FeelError> {
    let overflow = || FeelError::overflow(format!("{} ** {}", base, exponent));
    if exponent.fract().is_zero() {
        let whole = exponent.to_i64().ok_or_else(overflow)?;
        let mut result = Decimal::ONE;
        let mut factor = base;
        let mut remaining = whole.unsigned_abs();
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = result.checked_mul(factor).ok_or_else(overflow)?;
            }
            remaining >>= 1;
            if remaining > 0 {
                factor = factor.checked_mul(factor).ok_or_else(overflow)?;
            }
        }
        if whole < 0 {
            return div(Decimal::ONE, result);
        }
        return Ok(result);
    }
    if base.is_sign_negative() {
        return Err(FeelError::invalid_argument(
            "**",
            format!("fractional power {} of negative base {}", exponent, base),
        ));
    }
    base.checked_powd(exponent).ok_or_else(overflow)
}

pub fn sqrt(value: Decimal) -> Result<Decimal, FeelError> {
    value
        .sqrt()
        .ok_or_else(|| FeelError::invalid_argument("sqrt", format!("square root of {}", value)))
}

/// Rounds to `scale` places with banker's rounding, the crate-wide default.
pub fn round_half_even(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, RoundingStrategy::MidpointNearestEven)
}

/// Converts a whole decimal to `i64`, rejecting fractions.
pub fn to_whole(value: Decimal, function: &str) -> Result<i64, FeelError> {
    if !value.fract().is_zero() {
        return Err(FeelError::invalid_argument(
            function,
            format!("expected a whole number, got {}", value),
        ));
    }
    value
        .to_i64()
        .ok_or_else(|| FeelError::overflow(format!("{} does not fit a position", value)))
}
