//! Rounding and sign functions over numbers. `abs` also accepts durations.

use rust_decimal::{Decimal, RoundingStrategy};

use super::{arg, expect_number, propagate, Registry};
use crate::env::Env;
use crate::error::FeelError;
use crate::numeric::to_whole;
use crate::value::Value;

pub(super) fn register(registry: &mut Registry) {
    registry.add("floor", floor);
    registry.add("ceiling", ceiling);
    registry.add("ceil", ceiling);
    registry.add("abs", abs);
    registry.add("round", round);
    registry.add("decimal", decimal);
}

fn unary(
    function: &str,
    args: &[Value],
    op: impl FnOnce(Decimal) -> Decimal,
) -> Result<Value, FeelError> {
    let n = arg(args, 0);
    if let Some(v) = propagate(n) {
        return Ok(v);
    }
    Ok(Value::Number(op(expect_number(function, n)?)))
}

fn floor(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    unary("floor", args, |n| n.floor())
}

fn ceiling(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    unary("ceiling", args, |n| n.ceil())
}

/// Absolute value of a number or a duration.
fn abs(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    match arg(args, 0) {
        Value::YearMonthDuration(d) if d.total_months() < 0 => Ok(Value::YearMonthDuration(d.negate())),
        Value::YearMonthDuration(d) => Ok(Value::YearMonthDuration(*d)),
        Value::DayTimeDuration(d) if d.inner().is_negative() => Ok(Value::DayTimeDuration(d.negate())),
        Value::DayTimeDuration(d) => Ok(Value::DayTimeDuration(*d)),
        _ => unary("abs", args, |n| n.abs()),
    }
}

fn rounded(function: &str, args: &[Value], strategy: RoundingStrategy) -> Result<Value, FeelError> {
    let n = arg(args, 0);
    if let Some(v) = propagate(n) {
        return Ok(v);
    }
    let n = expect_number(function, n)?;
    let scale = match arg(args, 1) {
        Value::Absent | Value::Null => 0,
        scale => to_whole(expect_number(function, scale)?, function)?,
    };
    let scale = u32::try_from(scale).map_err(|_| {
        FeelError::invalid_argument(function, format!("scale {} is negative", scale))
    })?;
    Ok(Value::Number(n.round_dp_with_strategy(scale, strategy)))
}

/// Half away from zero.
fn round(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    rounded("round", args, RoundingStrategy::MidpointAwayFromZero)
}

/// Half to even.
fn decimal(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    rounded("decimal", args, RoundingStrategy::MidpointNearestEven)
}
