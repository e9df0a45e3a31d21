//! Date, time and duration constructors.

use rust_decimal::prelude::ToPrimitive;
use time::{Month, PrimitiveDateTime, UtcOffset};

use super::{arg, expect_number, expect_string, propagate, Registry};
use crate::env::Env;
use crate::error::FeelError;
use crate::numeric::to_whole;
use crate::value::temporal::{parse_date, parse_date_time, parse_duration, parse_time};
use crate::value::{DateTime, ParsedDuration, Time, Value, YearMonthDuration};

pub(super) fn register(registry: &mut Registry) {
    registry.add("date", date);
    registry.add("time", time_of_day);
    registry.add("date and time", date_and_time);
    registry.add("duration", duration);
    registry.add("years and months duration", years_and_months_duration);
}

fn first_missing(args: &[Value]) -> Option<Value> {
    if args.iter().any(Value::is_absent) {
        return Some(Value::Absent);
    }
    args.iter().find(|a| a.is_null()).map(|_| Value::Null)
}

fn component(function: &str, value: &Value) -> Result<i64, FeelError> {
    to_whole(expect_number(function, value)?, function)
}

fn narrow<T: TryFrom<i64>>(function: &str, what: &str, n: i64) -> Result<T, FeelError> {
    T::try_from(n).map_err(|_| FeelError::invalid_argument(function, format!("{} {} out of range", what, n)))
}

/// `date("2018-01-04")`, `date(2018, 1, 4)` or the date of a date-time.
fn date(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    if let Some(v) = first_missing(args) {
        return Ok(v);
    }
    match args {
        [Value::String(s)] => Ok(Value::Date(parse_date(s)?)),
        [Value::Date(d)] => Ok(Value::Date(*d)),
        [Value::DateTime(dt)] => Ok(Value::Date(dt.date())),
        [year, month, day] => {
            let year: i32 = narrow("date", "year", component("date", year)?)?;
            let month: u8 = narrow("date", "month", component("date", month)?)?;
            let day: u8 = narrow("date", "day", component("date", day)?)?;
            let month = Month::try_from(month)
                .map_err(|e| FeelError::invalid_argument("date", e.to_string()))?;
            time::Date::from_calendar_date(year, month, day)
                .map(Value::Date)
                .map_err(|e| FeelError::invalid_argument("date", e.to_string()))
        }
        [other, ..] => Err(FeelError::type_mismatch("date", vec![other.type_name()])),
        [] => Err(FeelError::invalid_argument("date", "expected an argument")),
    }
}

/// `time("10:15:00Z")`, `time(hour, minute, second[, offset])` or the time
/// of a date-time. The optional offset is a days-and-time duration.
fn time_of_day(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    if let Some(v) = first_missing(args) {
        return Ok(v);
    }
    match args {
        [Value::String(s)] => Ok(Value::Time(parse_time(s)?)),
        [Value::Time(t)] => Ok(Value::Time(*t)),
        [Value::DateTime(dt)] => Ok(Value::Time(dt.time())),
        [hour, minute, second, rest @ ..] if rest.len() <= 1 => {
            let hour: u8 = narrow("time", "hour", component("time", hour)?)?;
            let minute: u8 = narrow("time", "minute", component("time", minute)?)?;
            let second = expect_number("time", second)?;
            let whole: u8 = narrow("time", "second", second.trunc().to_i64().unwrap_or(-1))?;
            let nanos = (second.fract() * rust_decimal::Decimal::from(1_000_000_000))
                .to_u32()
                .unwrap_or(0);
            let clock = time::Time::from_hms_nano(hour, minute, whole, nanos)
                .map_err(|e| FeelError::invalid_argument("time", e.to_string()))?;
            let offset = match rest.first() {
                None => None,
                Some(Value::DayTimeDuration(d)) => {
                    let seconds = i32::try_from(d.inner().whole_seconds()).map_err(|_| {
                        FeelError::invalid_argument("time", format!("offset {} out of range", d))
                    })?;
                    Some(
                        UtcOffset::from_whole_seconds(seconds)
                            .map_err(|e| FeelError::invalid_argument("time", e.to_string()))?,
                    )
                }
                Some(other) => return Err(FeelError::type_mismatch("time", vec![other.type_name()])),
            };
            Ok(Value::Time(Time::new(clock, offset)))
        }
        [other, ..] => Err(FeelError::type_mismatch("time", vec![other.type_name()])),
        [] => Err(FeelError::invalid_argument("time", "expected an argument")),
    }
}

/// `date and time("2018-01-04T10:00:00")` or `date and time(date, time)`.
fn date_and_time(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    if let Some(v) = first_missing(args) {
        return Ok(v);
    }
    match args {
        [Value::String(s)] => Ok(Value::DateTime(parse_date_time(s)?)),
        [Value::DateTime(dt)] => Ok(Value::DateTime(*dt)),
        [Value::Date(d)] => Ok(Value::DateTime(DateTime::at_midnight(*d))),
        [day, Value::Time(t)] => {
            let day = match day {
                Value::Date(d) => *d,
                Value::DateTime(dt) => dt.date(),
                other => {
                    return Err(FeelError::type_mismatch(
                        "date and time",
                        vec![other.type_name(), "time"],
                    ))
                }
            };
            Ok(Value::DateTime(DateTime::new(
                PrimitiveDateTime::new(day, t.clock),
                t.offset,
            )))
        }
        [first, second] => Err(FeelError::type_mismatch(
            "date and time",
            vec![first.type_name(), second.type_name()],
        )),
        [other, ..] => Err(FeelError::type_mismatch("date and time", vec![other.type_name()])),
        [] => Err(FeelError::invalid_argument("date and time", "expected an argument")),
    }
}

fn duration(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    let text = arg(args, 0);
    if let Some(v) = propagate(text) {
        return Ok(v);
    }
    Ok(match parse_duration(expect_string("duration", text)?)? {
        ParsedDuration::YearMonth(d) => Value::YearMonthDuration(d),
        ParsedDuration::DayTime(d) => Value::DayTimeDuration(d),
        ParsedDuration::Composite(d) => Value::CompositeDuration(d),
    })
}

/// Whole months from `from` to `to`; a partial month does not count.
fn years_and_months_duration(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    if let Some(v) = first_missing(&args[..args.len().min(2)]) {
        return Ok(v);
    }
    let as_date_time = |value: &Value| match value {
        Value::Date(d) => Ok(d.midnight()),
        Value::DateTime(dt) => Ok(dt.local),
        other => Err(FeelError::type_mismatch(
            "years and months duration",
            vec![other.type_name()],
        )),
    };
    let from = as_date_time(arg(args, 0))?;
    let to = as_date_time(arg(args, 1))?;
    let mut months = (i64::from(to.year()) - i64::from(from.year())) * 12
        + (i64::from(to.month() as u8) - i64::from(from.month() as u8));
    let rest = |dt: &PrimitiveDateTime| (dt.day(), dt.time());
    if months > 0 && rest(&to) < rest(&from) {
        months -= 1;
    } else if months < 0 && rest(&to) > rest(&from) {
        months += 1;
    }
    Ok(Value::YearMonthDuration(YearMonthDuration::from_months(months)))
}
