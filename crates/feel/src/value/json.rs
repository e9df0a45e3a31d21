//! Conversion between plain JSON documents and runtime values.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::{Context, Value};
use crate::error::FeelError;

impl Value {
    /// Builds a value from JSON. Numbers are parsed from their textual form
    /// so `0.1` stays exactly `0.1`; strings stay strings (no date sniffing).
    pub fn from_json(json: &serde_json::Value) -> Result<Value, FeelError> {
        Ok(match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(parse_json_number(n)?),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => Value::List(
                items
                    .iter()
                    .map(Value::from_json)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            serde_json::Value::Object(entries) => {
                let mut context = Context::new();
                for (name, value) in entries {
                    context.insert(name.clone(), Value::from_json(value)?);
                }
                Value::Context(context)
            }
        })
    }

    /// Converts a JSON object into an evaluation context.
    pub fn context_from_json(json: &serde_json::Value) -> Result<Context, FeelError> {
        match Value::from_json(json)? {
            Value::Context(context) => Ok(context),
            other => Err(FeelError::invalid_argument(
                "context",
                format!("expected a JSON object, got {}", other.type_name()),
            )),
        }
    }

    /// Renders a value as JSON. Temporal values become ISO 8601 strings;
    /// Absent, functions and predicates have no JSON form and become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null | Value::Absent | Value::Function(_) | Value::Predicate(_) => {
                serde_json::Value::Null
            }
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => decimal_to_json(*n),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Context(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect(),
            ),
            Value::Date(_)
            | Value::Time(_)
            | Value::DateTime(_)
            | Value::YearMonthDuration(_)
            | Value::DayTimeDuration(_)
            | Value::CompositeDuration(_) => serde_json::Value::String(self.to_string()),
        }
    }
}

fn parse_json_number(n: &serde_json::Number) -> Result<Decimal, FeelError> {
    let text = n.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| FeelError::invalid_argument("number", format!("'{}': {}", text, e)))
}

fn decimal_to_json(n: Decimal) -> serde_json::Value {
    let n = n.normalize();
    if n.scale() == 0 {
        if let Some(i) = n.to_i64() {
            return serde_json::Value::from(i);
        }
    }
    // Only emit a JSON float when it reads back as the same decimal.
    n.to_f64()
        .and_then(serde_json::Number::from_f64)
        .filter(|number| parse_json_number(number).is_ok_and(|back| back == n))
        .map(serde_json::Value::Number)
        .unwrap_or_else(|| serde_json::Value::String(n.to_string()))
}
