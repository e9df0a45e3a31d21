//! Operator semantics end to end, from JSON expression trees to values.
//!
//! Organized by category:
//!   A. Decimal arithmetic
//!   B. String concatenation
//!   C. Calendar arithmetic
//!   D. Duration scaling
//!   E. Type mismatches

use dmn_feel::value::temporal::{parse_date, parse_date_time, parse_time};
use dmn_feel::value::{DayTimeDuration, YearMonthDuration};
use dmn_feel::{evaluate, Context, Env, FeelError, Node, Value};
use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;

// ──────────────────────────────────────────────
// Test helpers
// ──────────────────────────────────────────────

fn number(n: &str) -> serde_json::Value {
    json!({ "type": "Literal", "value": { "kind": "number", "value": n } })
}

fn string(s: &str) -> serde_json::Value {
    json!({ "type": "Literal", "value": { "kind": "string", "value": s } })
}

fn literal(symbol: &str, text: &str) -> serde_json::Value {
    json!({ "type": "DateTimeLiteral", "symbol": symbol, "params": [string(text)] })
}

fn arith(op: &str, left: serde_json::Value, right: serde_json::Value) -> serde_json::Value {
    json!({ "type": "ArithmeticExpression", "operator": op, "left": left, "right": right })
}

fn eval(tree: serde_json::Value) -> Result<Value, FeelError> {
    let node: Node = serde_json::from_value(tree).unwrap();
    let env = Env::owned(Context::new());
    evaluate(&node, &env)
}

fn dec(s: &str) -> Value {
    Value::Number(Decimal::from_str(s).unwrap())
}

// ──────────────────────────────────────────────
// A. Decimal arithmetic
// ──────────────────────────────────────────────

#[test]
fn a01_tenths_add_exactly() {
    let result = eval(arith("+", number("0.1"), number("0.2"))).unwrap();
    assert_eq!(result, dec("0.3"));
}

#[test]
fn a02_power_with_whole_exponent() {
    assert_eq!(eval(arith("**", number("2"), number("10"))).unwrap(), dec("1024"));
}

#[test]
fn a03_repayment_factor() {
    let factor = arith("-", number("1"), arith("**", number("0.5"), number("5")));
    assert_eq!(eval(factor).unwrap(), dec("0.96875"));
}

#[test]
fn a04_division_by_zero_is_an_error() {
    let err = eval(arith("/", number("1"), number("0"))).unwrap_err();
    assert!(matches!(err, FeelError::InvalidArgument { .. }));
}

#[test]
fn a05_unary_minus_is_subtraction_from_zero() {
    let tree = json!({ "type": "ArithmeticExpression", "operator": "-", "right": number("4.5") });
    assert_eq!(eval(tree).unwrap(), dec("-4.5"));
}

// ──────────────────────────────────────────────
// B. String concatenation
// ──────────────────────────────────────────────

#[test]
fn b01_strings_concatenate() {
    assert_eq!(eval(arith("+", string("foo"), string("bar"))).unwrap(), Value::from("foobar"));
}

#[test]
fn b02_numbers_render_into_strings() {
    assert_eq!(eval(arith("+", string("rule "), number("1.50"))).unwrap(), Value::from("rule 1.5"));
    assert_eq!(eval(arith("+", number("7"), string("x"))).unwrap(), Value::from("7x"));
}

// ──────────────────────────────────────────────
// C. Calendar arithmetic
// ──────────────────────────────────────────────

#[test]
fn c01_month_addition_clamps_the_day() {
    let result = eval(arith("+", literal("date", "2018-01-31"), literal("duration", "P1M"))).unwrap();
    assert_eq!(result, Value::Date(parse_date("2018-02-28").unwrap()));
}

#[test]
fn c02_months_roll_over_the_year() {
    let result = eval(arith("+", literal("date", "2017-11-15"), literal("duration", "P3M"))).unwrap();
    assert_eq!(result, Value::Date(parse_date("2018-02-15").unwrap()));
    let back = eval(arith("-", literal("date", "2018-02-15"), literal("duration", "P3M"))).unwrap();
    assert_eq!(back, Value::Date(parse_date("2017-11-15").unwrap()));
}

#[test]
fn c03_date_plus_day_time_duration_is_a_date() {
    let result = eval(arith("+", literal("date", "2018-06-21"), literal("duration", "P10D"))).unwrap();
    assert_eq!(result, Value::Date(parse_date("2018-07-01").unwrap()));

    let result = eval(arith("+", literal("date", "2018-01-04"), literal("duration", "PT36H"))).unwrap();
    assert_eq!(result, Value::Date(parse_date("2018-01-05").unwrap()));
}

#[test]
fn c04_date_difference_is_a_day_time_duration() {
    let result = eval(arith("-", literal("date", "2018-01-04"), literal("date", "2018-01-01"))).unwrap();
    assert_eq!(result, Value::DayTimeDuration(DayTimeDuration(time::Duration::days(3))));
}

#[test]
fn c05_date_time_difference_honours_offsets() {
    let result = eval(arith(
        "-",
        literal("date and time", "2018-01-04T12:00:00+02:00"),
        literal("date and time", "2018-01-04T12:00:00Z"),
    ))
    .unwrap();
    assert_eq!(result, Value::DayTimeDuration(DayTimeDuration(time::Duration::hours(-2))));
}

#[test]
fn c06_time_wraps_around_midnight() {
    let result = eval(arith("+", literal("time", "23:00:00"), literal("duration", "PT2H"))).unwrap();
    assert_eq!(result, Value::Time(parse_time("01:00:00").unwrap()));
}

#[test]
fn c07_date_does_not_compare_with_date_time() {
    let tree = json!({
        "type": "ComparisonExpression",
        "operator": "=",
        "left": literal("date", "2018-01-04"),
        "right": literal("date and time", "2018-01-04T00:00:00")
    });
    let err = eval(tree).unwrap_err();
    assert!(matches!(err, FeelError::TypeMismatch { .. }));
}

#[test]
fn c08_dates_order_chronologically() {
    let tree = json!({
        "type": "ComparisonExpression",
        "operator": "<",
        "left": literal("date", "2017-12-31"),
        "right": literal("date", "2018-01-01")
    });
    assert_eq!(eval(tree).unwrap(), Value::Bool(true));
}

#[test]
fn c09_date_plus_mixed_duration_rolls_months_then_days() {
    let result = eval(arith("+", literal("date", "2016-05-21"), literal("duration", "P2Y1M10D"))).unwrap();
    assert_eq!(result, Value::Date(parse_date("2018-07-01").unwrap()));
}

#[test]
fn c10_date_minus_mixed_duration_rolls_months_then_days() {
    let result = eval(arith("-", literal("date", "2018-07-10"), literal("duration", "P2Y1M10D"))).unwrap();
    assert_eq!(result, Value::Date(parse_date("2016-05-31").unwrap()));
}

#[test]
fn c11_date_time_plus_mixed_duration_keeps_the_clock() {
    let result = eval(arith(
        "+",
        literal("date and time", "2016-05-21T05:00:00+00:00"),
        literal("duration", "P2Y1M10D"),
    ))
    .unwrap();
    assert_eq!(result, Value::DateTime(parse_date_time("2018-07-01T05:00:00Z").unwrap()));
}

#[test]
fn c12_date_time_minus_mixed_duration_keeps_the_clock() {
    let result = eval(arith(
        "-",
        literal("date and time", "2018-07-10T05:00:00+00:00"),
        literal("duration", "P2Y1M10D"),
    ))
    .unwrap();
    assert_eq!(result, Value::DateTime(parse_date_time("2016-05-31T05:00:00Z").unwrap()));
}

// ──────────────────────────────────────────────
// D. Duration scaling
// ──────────────────────────────────────────────

#[test]
fn d01_year_month_duration_scales_to_whole_months() {
    let result = eval(arith("*", literal("duration", "P1Y"), number("1.5"))).unwrap();
    assert_eq!(result, Value::YearMonthDuration(YearMonthDuration::from_months(18)));
}

#[test]
fn d02_durations_add_within_a_family() {
    let result = eval(arith("+", literal("duration", "P1D"), literal("duration", "PT12H"))).unwrap();
    assert_eq!(result, Value::DayTimeDuration(DayTimeDuration(time::Duration::hours(36))));
}

#[test]
fn d03_duration_divided_by_zero_is_null() {
    assert_eq!(eval(arith("/", literal("duration", "P1D"), number("0"))).unwrap(), Value::Null);
}

#[test]
fn d04_duration_divides_into_parts() {
    let result = eval(arith("/", literal("duration", "P2D"), number("4"))).unwrap();
    assert_eq!(result, Value::DayTimeDuration(DayTimeDuration(time::Duration::hours(12))));
}

// ──────────────────────────────────────────────
// E. Type mismatches
// ──────────────────────────────────────────────

#[test]
fn e01_adding_dates_is_rejected() {
    let err = eval(arith("+", literal("date", "2018-01-01"), literal("date", "2018-01-02"))).unwrap_err();
    assert_eq!(
        err.to_string(),
        "date + date : operation unsupported for one or more operands types"
    );
}

#[test]
fn e02_mixed_duration_families_do_not_add() {
    let err = eval(arith("+", literal("duration", "P1M"), literal("duration", "P1D"))).unwrap_err();
    assert!(matches!(err, FeelError::TypeMismatch { .. }));
}

#[test]
fn e03_null_does_not_take_part_in_arithmetic() {
    let null = json!({ "type": "Literal", "value": { "kind": "null" } });
    let err = eval(arith("+", null, number("1"))).unwrap_err();
    assert!(matches!(err, FeelError::TypeMismatch { .. }));
}
