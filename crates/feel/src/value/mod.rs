//! Runtime value model.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;

use crate::function::{Function, Predicate};

mod json;
pub mod temporal;

pub use temporal::{
    CompositeDuration, DateTime, DayTimeDuration, ParsedDuration, Time, YearMonthDuration,
};

/// Name→value mapping used for FEEL contexts and evaluation frames.
pub type Context = BTreeMap<String, Value>;

// ──────────────────────────────────────────────
// Runtime values
// ──────────────────────────────────────────────

/// Every value an expression can produce.
///
/// Numbers are always `rust_decimal::Decimal`, never `f64`. `Null` is an
/// explicit empty value; `Absent` marks a binding that could not be resolved
/// and propagates through every operator and built-in.
#[derive(Debug, Clone, Default)]
pub enum Value {
    Null,
    #[default]
    Absent,
    Bool(bool),
    Number(Decimal),
    String(String),
    List(Vec<Value>),
    Context(Context),
    Date(time::Date),
    Time(Time),
    DateTime(DateTime),
    YearMonthDuration(YearMonthDuration),
    DayTimeDuration(DayTimeDuration),
    CompositeDuration(CompositeDuration),
    Function(Function),
    Predicate(Predicate),
}

impl Value {
    /// Kind name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Absent => "absent",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Context(_) => "context",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "date and time",
            Value::YearMonthDuration(_) => "years and months duration",
            Value::DayTimeDuration(_) => "days and time duration",
            Value::CompositeDuration(_) => "duration",
            Value::Function(_) => "function",
            Value::Predicate(_) => "predicate",
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Three-valued reading of a test result: `Some(b)` for booleans,
    /// `None` for anything else.
    pub fn truth(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn number(n: impl Into<Decimal>) -> Value {
        Value::Number(n.into())
    }

    pub fn string(s: impl Into<String>) -> Value {
        Value::String(s.into())
    }

    /// Field lookup on a context; anything else, or a missing field, is Absent.
    pub fn field(&self, name: &str) -> Value {
        match self {
            Value::Context(entries) => entries.get(name).cloned().unwrap_or(Value::Absent),
            _ => Value::Absent,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Number(d)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Decimal::from(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(Decimal::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Context> for Value {
    fn from(entries: Context) -> Self {
        Value::Context(entries)
    }
}

impl From<Option<bool>> for Value {
    fn from(b: Option<bool>) -> Self {
        b.map(Value::Bool).unwrap_or(Value::Absent)
    }
}

/// Structural equality for data values. Functions are equal only when they
/// are the same function; predicates are never equal.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Absent, Value::Absent) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Context(a), Value::Context(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::YearMonthDuration(a), Value::YearMonthDuration(b)) => a == b,
            (Value::DayTimeDuration(a), Value::DayTimeDuration(b)) => a == b,
            (Value::CompositeDuration(a), Value::CompositeDuration(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.same_as(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Absent => f.write_str("absent"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n.normalize()),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Context(entries) => {
                f.write_str("{")?;
                for (i, (name, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                f.write_str("}")
            }
            Value::Date(d) => f.write_str(&temporal::format_date(*d)),
            Value::Time(t) => write!(f, "{}", t),
            Value::DateTime(dt) => write!(f, "{}", dt),
            Value::YearMonthDuration(d) => write!(f, "{}", d),
            Value::DayTimeDuration(d) => write!(f, "{}", d),
            Value::CompositeDuration(d) => write!(f, "{}", d),
            Value::Function(func) => write!(f, "function {}", func.name()),
            Value::Predicate(_) => f.write_str("predicate"),
        }
    }
}
