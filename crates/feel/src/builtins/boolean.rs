//! Boolean functions under three-valued logic. `defined` is the only one
//! that can tell Absent from Null.

use super::{arg, operands, propagate, Registry};
use crate::env::Env;
use crate::error::FeelError;
use crate::value::Value;

pub(super) fn register(registry: &mut Registry) {
    registry.add("not", not);
    registry.add_quiet("defined", defined);
    registry.add("all", all);
    registry.add("and", all);
    registry.add("any", any);
    registry.add("or", any);
}

/// Negates a boolean, or a predicate under three-valued logic.
fn not(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    match arg(args, 0) {
        Value::Bool(b) => Ok(Value::Bool(!b)),
        Value::Predicate(predicate) => Ok(Value::Predicate(predicate.clone().negate())),
        Value::Absent => Ok(Value::Absent),
        Value::Null => Ok(Value::Null),
        other => Err(FeelError::type_mismatch("not", vec![other.type_name()])),
    }
}

fn defined(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    Ok(Value::Bool(!arg(args, 0).is_absent()))
}

/// Folds booleans where `decisive` settles the result; otherwise an Absent
/// element wins over a Null one, and with neither the result is `!decisive`.
fn fold(function: &str, args: &[Value], decisive: bool) -> Result<Value, FeelError> {
    if let [single] = args {
        if let Some(v) = propagate(single) {
            return Ok(v);
        }
    }
    let mut saw_absent = false;
    let mut saw_null = false;
    for item in operands(args) {
        match item {
            Value::Bool(b) if *b == decisive => return Ok(Value::Bool(decisive)),
            Value::Bool(_) => {}
            Value::Absent => saw_absent = true,
            Value::Null => saw_null = true,
            other => return Err(FeelError::type_mismatch(function.to_string(), vec![other.type_name()])),
        }
    }
    Ok(if saw_absent {
        Value::Absent
    } else if saw_null {
        Value::Null
    } else {
        Value::Bool(!decisive)
    })
}

fn all(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    fold("all", args, false)
}

fn any(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    fold("any", args, true)
}
