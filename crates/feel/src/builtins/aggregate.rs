//! Aggregates over a list argument or a variadic argument sequence.

use std::cmp::Ordering;

use rust_decimal::Decimal;

use super::{expect_number, operands, propagate, Registry};
use crate::ast::{ArithmeticOp, ComparisonOp};
use crate::env::Env;
use crate::error::FeelError;
use crate::numeric;
use crate::ops;
use crate::value::Value;

pub(super) fn register(registry: &mut Registry) {
    registry.add("min", min);
    registry.add("max", max);
    registry.add("sum", sum);
    registry.add("mean", mean);
    registry.add("product", product);
    registry.add("median", median);
    registry.add("mode", mode);
    registry.add("stddev", stddev);
}

/// The Null/Absent contract applies when the only argument is missing.
fn subject(args: &[Value]) -> Option<Value> {
    match args {
        [single] => propagate(single),
        _ => None,
    }
}

fn numbers(function: &str, items: &[Value]) -> Result<Vec<Decimal>, FeelError> {
    items.iter().map(|item| expect_number(function, item)).collect()
}

fn extreme(args: &[Value], keep: Ordering) -> Result<Value, FeelError> {
    if let Some(v) = subject(args) {
        return Ok(v);
    }
    let mut best: Option<&Value> = None;
    for item in operands(args) {
        best = match best {
            None => Some(item),
            Some(current) => match ops::order(ComparisonOp::Lt, item, current)? {
                None => return Ok(Value::Null),
                Some(ordering) if ordering == keep => Some(item),
                Some(_) => Some(current),
            },
        };
    }
    Ok(best.cloned().unwrap_or(Value::Absent))
}

fn min(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    extreme(args, Ordering::Less)
}

fn max(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    extreme(args, Ordering::Greater)
}

/// Sums numbers or durations; the empty sum is 0.
fn sum(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    if let Some(v) = subject(args) {
        return Ok(v);
    }
    let mut items = operands(args).iter();
    let Some(first) = items.next() else {
        return Ok(Value::from(0));
    };
    let mut total = first.clone();
    for item in items {
        total = ops::arithmetic(ArithmeticOp::Add, &total, item)?;
    }
    Ok(total)
}

fn mean(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    if let Some(v) = subject(args) {
        return Ok(v);
    }
    let values = numbers("mean", operands(args))?;
    if values.is_empty() {
        return Ok(Value::Absent);
    }
    let mut total = Decimal::ZERO;
    for v in &values {
        total = numeric::add(total, *v)?;
    }
    Ok(Value::Number(numeric::div(total, Decimal::from(values.len() as i64))?))
}

fn product(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    if let Some(v) = subject(args) {
        return Ok(v);
    }
    let mut total = Decimal::ONE;
    for v in numbers("product", operands(args))? {
        total = numeric::mul(total, v)?;
    }
    Ok(Value::Number(total))
}

fn median(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    if let Some(v) = subject(args) {
        return Ok(v);
    }
    let values = numbers("median", operands(args))?;
    match median_of(&values) {
        Some(m) => Ok(Value::Number(m?)),
        None => Ok(Value::Absent),
    }
}

/// Median by linear-time selection on a copy of `values`. Even lengths
/// average the two central order statistics.
fn median_of(values: &[Decimal]) -> Option<Result<Decimal, FeelError>> {
    if values.is_empty() {
        return None;
    }
    let mut scratch = values.to_vec();
    let n = scratch.len();
    if n % 2 == 1 {
        return Some(Ok(select(&mut scratch, n / 2)));
    }
    let low = select(&mut scratch, n / 2 - 1);
    let high = select(&mut scratch, n / 2);
    Some(numeric::add(low, high).and_then(|s| numeric::div(s, Decimal::TWO)))
}

/// The `k`-th smallest element (0-based). Pivots are chosen by median of
/// medians, so the worst case stays linear.
fn select(values: &mut [Decimal], k: usize) -> Decimal {
    if values.len() <= 5 {
        values.sort_unstable();
        return values[k];
    }
    let pivot = median_of_medians(values);
    let (less, equal) = partition(values, pivot);
    if k < less {
        select(&mut values[..less], k)
    } else if k < less + equal {
        pivot
    } else {
        select(&mut values[less + equal..], k - less - equal)
    }
}

fn median_of_medians(values: &[Decimal]) -> Decimal {
    let mut medians: Vec<Decimal> = values
        .chunks(5)
        .map(|chunk| {
            let mut group = chunk.to_vec();
            group.sort_unstable();
            group[group.len() / 2]
        })
        .collect();
    let mid = medians.len() / 2;
    select(&mut medians, mid)
}

/// Three-way partition around `pivot`; returns the sizes of the "less" and
/// "equal" runs.
fn partition(values: &mut [Decimal], pivot: Decimal) -> (usize, usize) {
    let (mut lt, mut i, mut gt) = (0, 0, values.len());
    while i < gt {
        match values[i].cmp(&pivot) {
            Ordering::Less => {
                values.swap(lt, i);
                lt += 1;
                i += 1;
            }
            Ordering::Greater => {
                gt -= 1;
                values.swap(i, gt);
            }
            Ordering::Equal => i += 1,
        }
    }
    (lt, gt - lt)
}

/// Every value tied for the highest frequency, ascending.
fn mode(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    if let Some(v) = subject(args) {
        return Ok(v);
    }
    let mut values = numbers("mode", operands(args))?;
    values.sort_unstable();
    let mut runs: Vec<(Decimal, usize)> = Vec::new();
    for v in values {
        match runs.last_mut() {
            Some((last, count)) if *last == v => *count += 1,
            _ => runs.push((v, 1)),
        }
    }
    let top = runs.iter().map(|(_, count)| *count).max().unwrap_or(0);
    Ok(Value::List(
        runs.into_iter()
            .filter(|(_, count)| *count == top)
            .map(|(v, _)| Value::Number(v))
            .collect(),
    ))
}

/// Sample standard deviation, accumulated in one pass (Welford).
fn stddev(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    if let Some(v) = subject(args) {
        return Ok(v);
    }
    let values = numbers("stddev", operands(args))?;
    if values.len() < 2 {
        return Err(FeelError::invalid_argument(
            "stddev",
            format!("needs at least 2 samples, got {}", values.len()),
        ));
    }
    let mut mean = Decimal::ZERO;
    let mut m2 = Decimal::ZERO;
    for (i, x) in values.iter().enumerate() {
        let k = Decimal::from(i as i64 + 1);
        let delta = numeric::sub(*x, mean)?;
        mean = numeric::add(mean, numeric::div(delta, k)?)?;
        m2 = numeric::add(m2, numeric::mul(delta, numeric::sub(*x, mean)?)?)?;
    }
    let variance = numeric::div(m2, Decimal::from(values.len() as i64 - 1))?;
    Ok(Value::Number(numeric::sqrt(variance)?))
}
