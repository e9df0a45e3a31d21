//! Built-in function library.
//!
//! Every built-in lives in one process-wide registry, built on first use and
//! never changed afterwards. The registry is the outermost scope of every
//! [`Env`](crate::env::Env).
//!
//! Shared contract: a Null primary subject yields Null, an Absent one yields
//! Absent, and an incompatible kind raises `TypeMismatch`.

use std::collections::HashMap;
use std::sync::OnceLock;

use rust_decimal::Decimal;

use crate::error::FeelError;
use crate::function::{BuiltIn, BuiltInFn};
use crate::value::Value;

mod aggregate;
mod boolean;
mod list;
mod numeric;
mod string;
mod temporal;

static ABSENT: Value = Value::Absent;

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Name → built-in map.
pub(crate) struct Registry {
    functions: HashMap<&'static str, BuiltIn>,
}

impl Registry {
    fn build() -> Registry {
        let mut registry = Registry {
            functions: HashMap::new(),
        };
        aggregate::register(&mut registry);
        boolean::register(&mut registry);
        list::register(&mut registry);
        numeric::register(&mut registry);
        string::register(&mut registry);
        temporal::register(&mut registry);
        registry
    }

    pub(crate) fn add(&mut self, name: &'static str, call: BuiltInFn) {
        self.functions.insert(
            name,
            BuiltIn {
                name,
                call,
                quiet_arguments: false,
            },
        );
    }

    /// Registers a built-in whose name arguments may resolve to Absent
    /// without a diagnostic.
    pub(crate) fn add_quiet(&mut self, name: &'static str, call: BuiltInFn) {
        self.functions.insert(
            name,
            BuiltIn {
                name,
                call,
                quiet_arguments: true,
            },
        );
    }
}

/// The built-in registered under `name`.
pub fn lookup(name: &str) -> Option<&'static BuiltIn> {
    REGISTRY.get_or_init(Registry::build).functions.get(name)
}

/// Names of every registered built-in, sorted.
pub fn names() -> Vec<&'static str> {
    let mut names: Vec<_> = REGISTRY
        .get_or_init(Registry::build)
        .functions
        .keys()
        .copied()
        .collect();
    names.sort_unstable();
    names
}

// ──────────────────────────────────────────────
// Argument helpers
// ──────────────────────────────────────────────

/// Positional argument `index`; missing arguments read as Absent.
pub(crate) fn arg(args: &[Value], index: usize) -> &Value {
    args.get(index).unwrap_or(&ABSENT)
}

/// Null/Absent short-circuit for a primary subject.
pub(crate) fn propagate(subject: &Value) -> Option<Value> {
    match subject {
        Value::Absent => Some(Value::Absent),
        Value::Null => Some(Value::Null),
        _ => None,
    }
}

pub(crate) fn expect_list<'v>(function: &str, value: &'v Value) -> Result<&'v [Value], FeelError> {
    match value {
        Value::List(items) => Ok(items),
        other => Err(FeelError::type_mismatch(
            function.to_string(),
            vec![other.type_name()],
        )),
    }
}

pub(crate) fn expect_number(function: &str, value: &Value) -> Result<Decimal, FeelError> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(FeelError::type_mismatch(
            function.to_string(),
            vec![other.type_name()],
        )),
    }
}

pub(crate) fn expect_string<'v>(function: &str, value: &'v Value) -> Result<&'v str, FeelError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(FeelError::type_mismatch(
            function.to_string(),
            vec![other.type_name()],
        )),
    }
}

/// Operands of an aggregate: a single list argument, or the arguments
/// themselves.
pub(crate) fn operands(args: &[Value]) -> &[Value] {
    match args {
        [Value::List(items)] => items,
        _ => args,
    }
}
