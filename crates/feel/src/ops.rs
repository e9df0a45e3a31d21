//! Operator dispatch over [`Value`] pairs.
//!
//! Absent is checked before anything else: any operator with an Absent
//! operand yields Absent. Null takes part in equality and ordering but not
//! in arithmetic. Incompatible kinds raise [`FeelError::TypeMismatch`].

use std::cmp::Ordering;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::ast::{ArithmeticOp, ComparisonOp};
use crate::error::FeelError;
use crate::numeric;
use crate::value::temporal::{add_months, date_components, shift_date};
use crate::value::{CompositeDuration, DateTime, DayTimeDuration, Value, YearMonthDuration};

// ──────────────────────────────────────────────
// Arithmetic
// ──────────────────────────────────────────────

pub fn arithmetic(op: ArithmeticOp, left: &Value, right: &Value) -> Result<Value, FeelError> {
    if left.is_absent() || right.is_absent() {
        return Ok(Value::Absent);
    }
    match op {
        ArithmeticOp::Add => add(left, right),
        ArithmeticOp::Sub => sub(left, right),
        ArithmeticOp::Mul => mul(left, right),
        ArithmeticOp::Div => div(left, right),
        ArithmeticOp::Pow => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(numeric::pow(*a, *b)?)),
            _ => Err(mismatch("**", left, right)),
        },
    }
}

/// Unary minus.
pub fn negate(operand: &Value) -> Result<Value, FeelError> {
    match operand {
        Value::Absent => Ok(Value::Absent),
        Value::Number(n) => Ok(Value::Number(-*n)),
        Value::YearMonthDuration(d) => Ok(Value::YearMonthDuration(d.negate())),
        Value::DayTimeDuration(d) => Ok(Value::DayTimeDuration(d.negate())),
        Value::CompositeDuration(d) => Ok(Value::CompositeDuration(d.negate())),
        other => Err(FeelError::type_mismatch("-", vec![other.type_name()])),
    }
}

fn add(left: &Value, right: &Value) -> Result<Value, FeelError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(numeric::add(*a, *b)?)),
        (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
        (Value::String(a), Value::Number(b)) => Ok(Value::String(format!("{}{}", a, b.normalize()))),
        (Value::Number(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a.normalize(), b))),
        (Value::YearMonthDuration(a), Value::YearMonthDuration(b)) => a
            .checked_add(*b)
            .map(Value::YearMonthDuration)
            .ok_or_else(|| FeelError::overflow(format!("{} + {}", a, b))),
        (Value::DayTimeDuration(a), Value::DayTimeDuration(b)) => a
            .inner()
            .checked_add(b.inner())
            .map(|d| Value::DayTimeDuration(DayTimeDuration(d)))
            .ok_or_else(|| FeelError::overflow(format!("{} + {}", a, b))),
        (Value::Date(date), Value::YearMonthDuration(d))
        | (Value::YearMonthDuration(d), Value::Date(date)) => {
            Ok(Value::Date(add_months(*date, d.total_months())?))
        }
        (Value::DateTime(dt), Value::YearMonthDuration(d))
        | (Value::YearMonthDuration(d), Value::DateTime(dt)) => shift_months(dt, d.total_months()),
        (Value::Date(date), Value::DayTimeDuration(d))
        | (Value::DayTimeDuration(d), Value::Date(date)) => {
            Ok(Value::Date(shift_date(*date, d.inner())?))
        }
        (Value::DateTime(dt), Value::DayTimeDuration(d))
        | (Value::DayTimeDuration(d), Value::DateTime(dt)) => shift_elapsed(dt, d.inner()),
        (Value::Date(date), Value::CompositeDuration(d))
        | (Value::CompositeDuration(d), Value::Date(date)) => {
            Ok(Value::Date(shift_date_by(*date, d)?))
        }
        (Value::DateTime(dt), Value::CompositeDuration(d))
        | (Value::CompositeDuration(d), Value::DateTime(dt)) => shift_by(dt, d),
        (Value::Time(t), Value::DayTimeDuration(d))
        | (Value::DayTimeDuration(d), Value::Time(t)) => {
            Ok(Value::Time(t.with_clock(t.clock + d.inner())))
        }
        _ => Err(mismatch("+", left, right)),
    }
}

fn sub(left: &Value, right: &Value) -> Result<Value, FeelError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(numeric::sub(*a, *b)?)),
        (Value::Date(_) | Value::DateTime(_), Value::Date(_) | Value::DateTime(_)) => {
            let (a, b) = (as_date_time(left), as_date_time(right));
            match (a, b) {
                (Some(a), Some(b)) => {
                    let elapsed = a.to_utc()? - b.to_utc()?;
                    Ok(Value::DayTimeDuration(DayTimeDuration(elapsed)))
                }
                _ => Err(mismatch("-", left, right)),
            }
        }
        (Value::Time(a), Value::Time(b)) => Ok(Value::DayTimeDuration(DayTimeDuration(
            a.to_utc_clock() - b.to_utc_clock(),
        ))),
        (Value::YearMonthDuration(a), Value::YearMonthDuration(b)) => a
            .checked_sub(*b)
            .map(Value::YearMonthDuration)
            .ok_or_else(|| FeelError::overflow(format!("{} - {}", a, b))),
        (Value::DayTimeDuration(a), Value::DayTimeDuration(b)) => a
            .inner()
            .checked_sub(b.inner())
            .map(|d| Value::DayTimeDuration(DayTimeDuration(d)))
            .ok_or_else(|| FeelError::overflow(format!("{} - {}", a, b))),
        (Value::Date(date), Value::YearMonthDuration(d)) => {
            Ok(Value::Date(add_months(*date, -d.total_months())?))
        }
        (Value::DateTime(dt), Value::YearMonthDuration(d)) => shift_months(dt, -d.total_months()),
        (Value::Date(date), Value::DayTimeDuration(d)) => {
            Ok(Value::Date(shift_date(*date, -d.inner())?))
        }
        (Value::DateTime(dt), Value::DayTimeDuration(d)) => shift_elapsed(dt, -d.inner()),
        (Value::Date(date), Value::CompositeDuration(d)) => {
            Ok(Value::Date(shift_date_by(*date, &d.negate())?))
        }
        (Value::DateTime(dt), Value::CompositeDuration(d)) => shift_by(dt, &d.negate()),
        (Value::Time(t), Value::DayTimeDuration(d)) => {
            Ok(Value::Time(t.with_clock(t.clock - d.inner())))
        }
        _ => Err(mismatch("-", left, right)),
    }
}

fn mul(left: &Value, right: &Value) -> Result<Value, FeelError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(numeric::mul(*a, *b)?)),
        (Value::YearMonthDuration(d), Value::Number(n))
        | (Value::Number(n), Value::YearMonthDuration(d)) => scale_months(d, *n, false),
        (Value::DayTimeDuration(d), Value::Number(n))
        | (Value::Number(n), Value::DayTimeDuration(d)) => scale_elapsed(d, *n, false),
        _ => Err(mismatch("*", left, right)),
    }
}

/// A duration divided by zero is Null. A number divided by a duration
/// divides the duration by the number.
fn div(left: &Value, right: &Value) -> Result<Value, FeelError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(numeric::div(*a, *b)?)),
        (Value::YearMonthDuration(d), Value::Number(n))
        | (Value::Number(n), Value::YearMonthDuration(d)) => {
            if n.is_zero() {
                return Ok(Value::Null);
            }
            scale_months(d, *n, true)
        }
        (Value::DayTimeDuration(d), Value::Number(n))
        | (Value::Number(n), Value::DayTimeDuration(d)) => {
            if n.is_zero() {
                return Ok(Value::Null);
            }
            scale_elapsed(d, *n, true)
        }
        _ => Err(mismatch("/", left, right)),
    }
}

fn scale_months(d: &YearMonthDuration, factor: Decimal, divide: bool) -> Result<Value, FeelError> {
    let months = Decimal::from(d.total_months());
    let scaled = if divide {
        numeric::div(months, factor)?
    } else {
        numeric::mul(months, factor)?
    };
    let whole = numeric::round_half_even(scaled, 0)
        .to_i64()
        .ok_or_else(|| FeelError::overflow(format!("{} scaled by {}", d, factor)))?;
    Ok(Value::YearMonthDuration(YearMonthDuration::from_months(whole)))
}

fn scale_elapsed(d: &DayTimeDuration, factor: Decimal, divide: bool) -> Result<Value, FeelError> {
    let overflow = || FeelError::overflow(format!("{} scaled by {}", d, factor));
    let nanos = Decimal::try_from_i128_with_scale(d.inner().whole_nanoseconds(), 0)
        .map_err(|_| overflow())?;
    let scaled = if divide {
        numeric::div(nanos, factor)?
    } else {
        numeric::mul(nanos, factor)?
    };
    let whole = numeric::round_half_even(scaled, 0)
        .to_i64()
        .ok_or_else(overflow)?;
    Ok(Value::DayTimeDuration(DayTimeDuration(
        time::Duration::nanoseconds(whole),
    )))
}

fn shift_months(dt: &DateTime, months: i64) -> Result<Value, FeelError> {
    let date = add_months(dt.date(), months)?;
    Ok(Value::DateTime(DateTime::new(
        date.with_time(dt.local.time()),
        dt.offset,
    )))
}

fn shift_elapsed(dt: &DateTime, by: time::Duration) -> Result<Value, FeelError> {
    let local = dt
        .local
        .checked_add(by)
        .ok_or_else(|| FeelError::overflow(format!("{} shifted by {}", dt, DayTimeDuration(by))))?;
    Ok(Value::DateTime(DateTime::new(local, dt.offset)))
}

/// Months first, then the elapsed part.
fn shift_date_by(date: time::Date, d: &CompositeDuration) -> Result<time::Date, FeelError> {
    shift_date(add_months(date, d.months.total_months())?, d.elapsed.inner())
}

fn shift_by(dt: &DateTime, d: &CompositeDuration) -> Result<Value, FeelError> {
    let date = add_months(dt.date(), d.months.total_months())?;
    let stepped = DateTime::new(date.with_time(dt.local.time()), dt.offset);
    shift_elapsed(&stepped, d.elapsed.inner())
}

/// A date subtracted from a date-time (or the reverse) counts as midnight.
fn as_date_time(value: &Value) -> Option<DateTime> {
    match value {
        Value::Date(d) => Some(DateTime::at_midnight(*d)),
        Value::DateTime(dt) => Some(*dt),
        _ => None,
    }
}

fn mismatch(operation: &str, left: &Value, right: &Value) -> FeelError {
    FeelError::type_mismatch(operation, vec![left.type_name(), right.type_name()])
}

// ──────────────────────────────────────────────
// Comparison
// ──────────────────────────────────────────────

/// `left ⟨op⟩ right`. Absent operands yield Absent; ordering against Null
/// yields Null.
pub fn compare(op: ComparisonOp, left: &Value, right: &Value) -> Result<Value, FeelError> {
    if left.is_absent() || right.is_absent() {
        return Ok(Value::Absent);
    }
    match op {
        ComparisonOp::Eq => Ok(Value::Bool(equals(left, right)?)),
        ComparisonOp::Ne => Ok(Value::Bool(!equals(left, right)?)),
        ComparisonOp::Lt | ComparisonOp::Le | ComparisonOp::Gt | ComparisonOp::Ge => {
            match order(op, left, right)? {
                None => Ok(Value::Null),
                Some(ordering) => Ok(Value::Bool(match op {
                    ComparisonOp::Lt => ordering == Ordering::Less,
                    ComparisonOp::Le => ordering != Ordering::Greater,
                    ComparisonOp::Gt => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                })),
            }
        }
    }
}

/// FEEL equality. Null equals only Null; lists and contexts compare deeply.
pub fn equals(left: &Value, right: &Value) -> Result<bool, FeelError> {
    match (left, right) {
        (Value::Null, Value::Null) | (Value::Absent, Value::Absent) => Ok(true),
        (Value::Null, _) | (_, Value::Null) | (Value::Absent, _) | (_, Value::Absent) => Ok(false),
        (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
        (Value::Number(a), Value::Number(b)) => Ok(a == b),
        (Value::String(a), Value::String(b)) => Ok(a == b),
        (Value::List(a), Value::List(b)) => {
            Ok(a.len() == b.len() && a.iter().zip(b).all(|(x, y)| nested_equals(x, y)))
        }
        (Value::Context(a), Value::Context(b)) => Ok(a.len() == b.len()
            && a.iter()
                .all(|(name, x)| b.get(name).is_some_and(|y| nested_equals(x, y)))),
        (Value::Date(a), Value::Date(b)) => Ok(date_components(a) == date_components(b)),
        (Value::Time(a), Value::Time(b)) => Ok(a.compare(b) == Ordering::Equal),
        (Value::DateTime(a), Value::DateTime(b)) => Ok(a.compare(b)? == Ordering::Equal),
        (Value::YearMonthDuration(a), Value::YearMonthDuration(b)) => Ok(a == b),
        (Value::DayTimeDuration(a), Value::DayTimeDuration(b)) => Ok(a == b),
        (Value::CompositeDuration(a), Value::CompositeDuration(b)) => Ok(a == b),
        (Value::Function(a), Value::Function(b)) => Ok(a.same_as(b)),
        _ => Err(mismatch("=", left, right)),
    }
}

/// Elements of lists and contexts of different kinds are simply unequal.
fn nested_equals(left: &Value, right: &Value) -> bool {
    equals(left, right).unwrap_or(false)
}

/// Orders two values; `None` when either side is Null.
pub fn order(op: ComparisonOp, left: &Value, right: &Value) -> Result<Option<Ordering>, FeelError> {
    let ordering = match (left, right) {
        (Value::Null, _) | (_, Value::Null) => return Ok(None),
        (Value::Number(a), Value::Number(b)) => a.cmp(b),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Date(a), Value::Date(b)) => date_components(a).cmp(&date_components(b)),
        (Value::Time(a), Value::Time(b)) => a.compare(b),
        (Value::DateTime(a), Value::DateTime(b)) => a.compare(b)?,
        (Value::YearMonthDuration(a), Value::YearMonthDuration(b)) => a.cmp(b),
        (Value::DayTimeDuration(a), Value::DayTimeDuration(b)) => a.cmp(b),
        _ => return Err(mismatch(op.symbol(), left, right)),
    };
    Ok(Some(ordering))
}

// ──────────────────────────────────────────────
// Three-valued logic
// ──────────────────────────────────────────────

/// true dominates, then Absent, then any other non-boolean (as Null).
pub fn or3(left: &Value, right: &Value) -> Value {
    match (left.truth(), right.truth()) {
        (Some(true), _) | (_, Some(true)) => Value::Bool(true),
        (Some(false), Some(false)) => Value::Bool(false),
        _ if left.is_absent() || right.is_absent() => Value::Absent,
        _ => Value::Null,
    }
}

/// false dominates, then Absent, then any other non-boolean (as Null).
pub fn and3(left: &Value, right: &Value) -> Value {
    match (left.truth(), right.truth()) {
        (Some(false), _) | (_, Some(false)) => Value::Bool(false),
        (Some(true), Some(true)) => Value::Bool(true),
        _ if left.is_absent() || right.is_absent() => Value::Absent,
        _ => Value::Null,
    }
}

pub fn not3(value: &Value) -> Value {
    match value {
        Value::Bool(b) => Value::Bool(!b),
        Value::Absent => Value::Absent,
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::temporal::{parse_date, parse_duration, parse_time, ParsedDuration};
    use std::str::FromStr;

    fn num(s: &str) -> Value {
        Value::Number(Decimal::from_str(s).unwrap())
    }

    fn date(s: &str) -> Value {
        Value::Date(parse_date(s).unwrap())
    }

    fn duration(s: &str) -> Value {
        match parse_duration(s).unwrap() {
            ParsedDuration::YearMonth(d) => Value::YearMonthDuration(d),
            ParsedDuration::DayTime(d) => Value::DayTimeDuration(d),
            ParsedDuration::Composite(d) => Value::CompositeDuration(d),
        }
    }

    fn date_time(s: &str) -> Value {
        Value::DateTime(crate::value::temporal::parse_date_time(s).unwrap())
    }

    #[test]
    fn absent_operands_win_over_type_checks() {
        let ops = [
            ArithmeticOp::Add,
            ArithmeticOp::Sub,
            ArithmeticOp::Mul,
            ArithmeticOp::Div,
            ArithmeticOp::Pow,
        ];
        for op in ops {
            assert_eq!(arithmetic(op, &Value::Absent, &Value::Bool(true)).unwrap(), Value::Absent);
            assert_eq!(arithmetic(op, &date("2018-01-01"), &Value::Absent).unwrap(), Value::Absent);
        }
        let comparisons = [
            ComparisonOp::Eq,
            ComparisonOp::Ne,
            ComparisonOp::Lt,
            ComparisonOp::Le,
            ComparisonOp::Gt,
            ComparisonOp::Ge,
        ];
        for op in comparisons {
            assert_eq!(compare(op, &Value::Absent, &num("1")).unwrap(), Value::Absent);
            assert_eq!(compare(op, &Value::from("x"), &Value::Absent).unwrap(), Value::Absent);
        }
    }

    #[test]
    fn null_equality() {
        assert_eq!(compare(ComparisonOp::Eq, &Value::Null, &Value::Null).unwrap(), Value::Bool(true));
        assert_eq!(compare(ComparisonOp::Eq, &Value::Null, &num("1")).unwrap(), Value::Bool(false));
        assert_eq!(compare(ComparisonOp::Ne, &Value::Null, &num("1")).unwrap(), Value::Bool(true));
        assert_eq!(compare(ComparisonOp::Lt, &Value::Null, &num("1")).unwrap(), Value::Null);
    }

    #[test]
    fn null_arithmetic_is_a_type_mismatch() {
        let err = arithmetic(ArithmeticOp::Add, &Value::Null, &num("1")).unwrap_err();
        assert!(matches!(err, FeelError::TypeMismatch { .. }));
    }

    #[test]
    fn date_plus_date_is_rejected() {
        let err = arithmetic(ArithmeticOp::Add, &date("2018-01-01"), &date("2018-01-02")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "date + date : operation unsupported for one or more operands types"
        );
    }

    #[test]
    fn cross_family_equality_is_a_type_mismatch() {
        let time = Value::Time(parse_time("10:00:00").unwrap());
        assert!(equals(&date("2018-01-01"), &time).is_err());
        assert!(equals(&num("1"), &Value::from("1")).is_err());
    }

    #[test]
    fn dates_and_date_times_do_not_compare() {
        let err = equals(&date("2018-01-01"), &date_time("2018-01-01T00:00:00")).unwrap_err();
        assert!(matches!(err, FeelError::TypeMismatch { .. }));
        let err = compare(
            ComparisonOp::Lt,
            &date_time("2018-01-01T00:00:00"),
            &date("2018-01-02"),
        )
        .unwrap_err();
        assert!(matches!(err, FeelError::TypeMismatch { .. }));
    }

    #[test]
    fn date_plus_day_time_duration_stays_a_date() {
        assert_eq!(
            arithmetic(ArithmeticOp::Add, &date("2018-06-21"), &duration("P10D")).unwrap(),
            date("2018-07-01")
        );
        assert_eq!(
            arithmetic(ArithmeticOp::Sub, &date("2018-06-21"), &duration("PT1H")).unwrap(),
            date("2018-06-20")
        );
    }

    #[test]
    fn composite_durations_step_months_then_elapsed_time() {
        let mixed = duration("P2Y1M10D");
        assert_eq!(
            arithmetic(ArithmeticOp::Add, &date("2016-05-21"), &mixed).unwrap(),
            date("2018-07-01")
        );
        assert_eq!(
            arithmetic(ArithmeticOp::Sub, &date("2018-07-10"), &mixed).unwrap(),
            date("2016-05-31")
        );
        assert_eq!(
            arithmetic(ArithmeticOp::Add, &date_time("2016-05-21T05:00:00Z"), &mixed).unwrap(),
            date_time("2018-07-01T05:00:00Z")
        );
        assert_eq!(
            arithmetic(ArithmeticOp::Sub, &date_time("2018-07-10T05:00:00Z"), &mixed).unwrap(),
            date_time("2016-05-31T05:00:00Z")
        );
    }

    #[test]
    fn calendar_rollover() {
        assert_eq!(
            arithmetic(ArithmeticOp::Add, &date("2018-07-31"), &duration("P2M")).unwrap(),
            date("2018-09-30")
        );
        assert_eq!(
            arithmetic(ArithmeticOp::Sub, &date("2018-07-31"), &duration("P3M")).unwrap(),
            date("2018-04-30")
        );
    }

    #[test]
    fn duration_scaling() {
        assert_eq!(
            arithmetic(ArithmeticOp::Mul, &duration("P1Y5M"), &num("5")).unwrap(),
            duration("P7Y1M")
        );
        assert_eq!(
            arithmetic(ArithmeticOp::Mul, &duration("P5DT12H20M40S"), &num("5")).unwrap(),
            duration("P27DT13H43M20S")
        );
        assert_eq!(
            arithmetic(ArithmeticOp::Div, &duration("P5DT12H20M40S"), &num("5")).unwrap(),
            duration("P1DT2H28M8S")
        );
        assert_eq!(
            arithmetic(ArithmeticOp::Div, &duration("P5Y5M"), &num("5")).unwrap(),
            duration("P1Y1M")
        );
    }

    #[test]
    fn duration_divided_by_zero_is_null() {
        assert_eq!(
            arithmetic(ArithmeticOp::Div, &duration("P5Y5M"), &num("0")).unwrap(),
            Value::Null
        );
        assert_eq!(
            arithmetic(ArithmeticOp::Div, &duration("P5DT12H20M40S"), &num("0")).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn date_difference_is_a_day_time_duration() {
        assert_eq!(
            arithmetic(ArithmeticOp::Sub, &date("2018-01-04"), &date("2018-01-01")).unwrap(),
            duration("P3D")
        );
    }

    #[test]
    fn dates_order_by_components() {
        assert_eq!(
            compare(ComparisonOp::Lt, &date("2017-12-31"), &date("2018-01-01")).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            compare(ComparisonOp::Ge, &date("2018-01-01"), &date("2018-01-01")).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn strings_concatenate_with_numbers() {
        assert_eq!(
            arithmetic(ArithmeticOp::Add, &Value::from("P"), &num("3")).unwrap(),
            Value::from("P3")
        );
    }

    #[test]
    fn three_valued_connectives() {
        let t = Value::Bool(true);
        let f = Value::Bool(false);
        assert_eq!(or3(&Value::Absent, &t), t);
        assert_eq!(or3(&Value::Absent, &f), Value::Absent);
        assert_eq!(and3(&Value::Absent, &f), f);
        assert_eq!(and3(&Value::Absent, &t), Value::Absent);
        assert_eq!(not3(&Value::Absent), Value::Absent);
    }
}
