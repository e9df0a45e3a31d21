//! List functions.
//!
//! `insert before`, `remove` and `index of` use 0-based positions;
//! `sublist` takes a 1-based start that counts from the end when negative.

use super::{arg, expect_list, expect_number, propagate, Registry};
use crate::env::Env;
use crate::error::FeelError;
use crate::numeric::to_whole;
use crate::ops;
use crate::value::Value;

pub(super) fn register(registry: &mut Registry) {
    registry.add("list contains", list_contains);
    registry.add("count", count);
    registry.add("append", append);
    registry.add("concatenate", concatenate);
    registry.add("insert before", insert_before);
    registry.add("remove", remove);
    registry.add("reverse", reverse);
    registry.add("index of", index_of);
    registry.add("union", union);
    registry.add("distinct values", distinct_values);
    registry.add("flatten", flatten);
    registry.add("sublist", sublist);
}

fn same(a: &Value, b: &Value) -> bool {
    ops::equals(a, b).unwrap_or(false)
}

fn position(function: &str, value: &Value) -> Result<i64, FeelError> {
    to_whole(expect_number(function, value)?, function)
}

fn list_contains(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    let list = arg(args, 0);
    if let Some(v) = propagate(list) {
        return Ok(v);
    }
    let items = expect_list("list contains", list)?;
    let element = arg(args, 1);
    if element.is_absent() || element.is_null() {
        return Ok(Value::Bool(false));
    }
    Ok(Value::Bool(items.iter().any(|item| same(item, element))))
}

fn count(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    let list = arg(args, 0);
    if let Some(v) = propagate(list) {
        return Ok(v);
    }
    let items = expect_list("count", list)?;
    Ok(Value::from(items.len() as i64))
}

/// An Absent element leaves the list as is; a list element is spliced in.
fn append(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    let list = arg(args, 0);
    if let Some(v) = propagate(list) {
        return Ok(v);
    }
    let mut items = expect_list("append", list)?.to_vec();
    match arg(args, 1) {
        Value::Absent => {}
        Value::List(more) => items.extend(more.iter().cloned()),
        element => items.push(element.clone()),
    }
    Ok(Value::List(items))
}

/// Null and Absent arguments are skipped.
fn concatenate(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    let mut items = Vec::new();
    for list in args {
        if list.is_absent() || list.is_null() {
            continue;
        }
        items.extend(expect_list("concatenate", list)?.iter().cloned());
    }
    Ok(Value::List(items))
}

fn insert_before(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    let list = arg(args, 0);
    if let Some(v) = propagate(list) {
        return Ok(v);
    }
    let at = arg(args, 1);
    if let Some(v) = propagate(at) {
        return Ok(v);
    }
    let item = arg(args, 2);
    if item.is_absent() {
        return Ok(Value::Absent);
    }
    let mut items = expect_list("insert before", list)?.to_vec();
    let at = position("insert before", at)?;
    if at < 0 || at as usize > items.len() {
        return Err(FeelError::invalid_argument(
            "insert before",
            format!("cannot insert at position {} in a list of {}", at, items.len()),
        ));
    }
    items.insert(at as usize, item.clone());
    Ok(Value::List(items))
}

fn remove(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    let list = arg(args, 0);
    if let Some(v) = propagate(list) {
        return Ok(v);
    }
    let at = arg(args, 1);
    if let Some(v) = propagate(at) {
        return Ok(v);
    }
    let mut items = expect_list("remove", list)?.to_vec();
    let at = position("remove", at)?;
    if at < 0 || at as usize >= items.len() {
        return Err(FeelError::invalid_argument(
            "remove",
            format!("cannot remove position {} from a list of {}", at, items.len()),
        ));
    }
    items.remove(at as usize);
    Ok(Value::List(items))
}

fn reverse(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    let list = arg(args, 0);
    if let Some(v) = propagate(list) {
        return Ok(v);
    }
    let mut items = expect_list("reverse", list)?.to_vec();
    items.reverse();
    Ok(Value::List(items))
}

/// Every 0-based position holding `match`; `null` matches null elements.
fn index_of(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    let list = arg(args, 0);
    if let Some(v) = propagate(list) {
        return Ok(v);
    }
    let needle = arg(args, 1);
    if needle.is_absent() {
        return Ok(Value::Absent);
    }
    let items = expect_list("index of", list)?;
    Ok(Value::List(
        items
            .iter()
            .enumerate()
            .filter(|(_, item)| same(item, needle))
            .map(|(i, _)| Value::from(i as i64))
            .collect(),
    ))
}

fn push_distinct(into: &mut Vec<Value>, item: &Value) {
    if !into.iter().any(|seen| same(seen, item)) {
        into.push(item.clone());
    }
}

/// Distinct elements of all list arguments, in first-seen order. Null and
/// Absent arguments are skipped.
fn union(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    let mut items = Vec::new();
    for list in args {
        if list.is_absent() || list.is_null() {
            continue;
        }
        for item in expect_list("union", list)? {
            push_distinct(&mut items, item);
        }
    }
    Ok(Value::List(items))
}

fn distinct_values(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    let list = arg(args, 0);
    if let Some(v) = propagate(list) {
        return Ok(v);
    }
    let mut items = Vec::new();
    for item in expect_list("distinct values", list)? {
        push_distinct(&mut items, item);
    }
    Ok(Value::List(items))
}

fn flatten_into(into: &mut Vec<Value>, value: &Value) {
    match value {
        Value::List(items) => items.iter().for_each(|item| flatten_into(into, item)),
        other => into.push(other.clone()),
    }
}

/// Deep flatten of all arguments.
fn flatten(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    if let [single] = args {
        if let Some(v) = propagate(single) {
            return Ok(v);
        }
    }
    let mut items = Vec::new();
    args.iter().for_each(|arg| flatten_into(&mut items, arg));
    Ok(Value::List(items))
}

fn sublist(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    let list = arg(args, 0);
    if let Some(v) = propagate(list) {
        return Ok(v);
    }
    let start = arg(args, 1);
    if let Some(v) = propagate(start) {
        return Ok(v);
    }
    let items = expect_list("sublist", list)?;
    let start = position("sublist", start)?;
    let length = match arg(args, 2) {
        Value::Absent | Value::Null => None,
        length => Some(position("sublist", length)?),
    };
    if length == Some(0) || items.is_empty() {
        return Ok(Value::List(Vec::new()));
    }
    let len = items.len() as i64;
    if start == 0 || start.unsigned_abs() > len as u64 {
        return Err(FeelError::invalid_argument(
            "sublist",
            format!("start position {} is outside a list of {}", start, len),
        ));
    }
    let from = if start < 0 { len + start } else { start - 1 };
    let take = match length {
        Some(n) if n < 0 => {
            return Err(FeelError::invalid_argument(
                "sublist",
                format!("negative length {}", n),
            ))
        }
        Some(n) => n.min(len - from),
        None => len - from,
    };
    Ok(Value::List(
        items[from as usize..(from + take) as usize].to_vec(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Context;

    fn call(f: fn(&[Value], &Env<'_>) -> Result<Value, FeelError>, args: Vec<Value>) -> Result<Value, FeelError> {
        let env = Env::owned(Context::new());
        f(&args, &env)
    }

    fn nums(ns: &[i64]) -> Value {
        Value::List(ns.iter().map(|n| Value::from(*n)).collect())
    }

    #[test]
    fn count_follows_the_subject_contract() {
        assert_eq!(call(count, vec![Value::Null]).unwrap(), Value::Null);
        assert_eq!(call(count, vec![Value::Absent]).unwrap(), Value::Absent);
        assert_eq!(call(count, vec![nums(&[])]).unwrap(), Value::from(0));
        assert!(matches!(
            call(count, vec![Value::from("abc")]),
            Err(FeelError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn positions_are_zero_based() {
        assert_eq!(
            call(insert_before, vec![nums(&[1, 3]), Value::from(1), Value::from(2)]).unwrap(),
            nums(&[1, 2, 3])
        );
        assert_eq!(
            call(remove, vec![nums(&[1, 2, 3]), Value::from(0)]).unwrap(),
            nums(&[2, 3])
        );
        assert!(matches!(
            call(remove, vec![nums(&[1, 2, 3]), Value::from(3)]),
            Err(FeelError::InvalidArgument { .. })
        ));
        assert_eq!(
            call(index_of, vec![nums(&[2, 1, 2, 2, 5, 2]), Value::from(2)]).unwrap(),
            nums(&[0, 2, 3, 5])
        );
    }

    #[test]
    fn index_of_null_matches_null_elements() {
        let list = Value::List(vec![Value::from(2), Value::Null, Value::from(5)]);
        assert_eq!(call(index_of, vec![list, Value::Null]).unwrap(), nums(&[1]));
    }

    #[test]
    fn append_splices_lists_and_skips_absent() {
        assert_eq!(call(append, vec![nums(&[1]), Value::Absent]).unwrap(), nums(&[1]));
        assert_eq!(call(append, vec![nums(&[1]), nums(&[2, 3])]).unwrap(), nums(&[1, 2, 3]));
        assert_eq!(call(append, vec![nums(&[1]), Value::from(2)]).unwrap(), nums(&[1, 2]));
    }

    #[test]
    fn concatenate_and_union_skip_missing_lists() {
        assert_eq!(
            call(concatenate, vec![nums(&[1, 2]), Value::Null, nums(&[2]), Value::Absent]).unwrap(),
            nums(&[1, 2, 2])
        );
        assert_eq!(
            call(union, vec![nums(&[1, 2]), Value::Null, nums(&[2, 3])]).unwrap(),
            nums(&[1, 2, 3])
        );
    }

    #[test]
    fn flatten_is_deep() {
        let nested = Value::List(vec![
            Value::from(1),
            Value::List(vec![Value::from(2), Value::List(vec![Value::from(3)])]),
        ]);
        assert_eq!(call(flatten, vec![nested]).unwrap(), nums(&[1, 2, 3]));
        assert_eq!(call(flatten, vec![Value::Null]).unwrap(), Value::Null);
    }

    #[test]
    fn list_contains_ignores_missing_elements() {
        assert_eq!(call(list_contains, vec![nums(&[1]), Value::Null]).unwrap(), Value::Bool(false));
        assert_eq!(call(list_contains, vec![nums(&[1, 2]), Value::from(2)]).unwrap(), Value::Bool(true));
    }

    #[test]
    fn sublist_positions() {
        let list = nums(&[1, 2, 3, 4, 5]);
        assert_eq!(call(sublist, vec![list.clone(), Value::from(2), Value::from(2)]).unwrap(), nums(&[2, 3]));
        assert_eq!(call(sublist, vec![list.clone(), Value::from(-2)]).unwrap(), nums(&[4, 5]));
        assert!(call(sublist, vec![list.clone(), Value::from(0)]).is_err());
        assert!(call(sublist, vec![list, Value::from(6)]).is_err());
    }

    #[test]
    fn sublist_rejects_the_most_negative_start() {
        let err = call(sublist, vec![nums(&[1]), Value::from(i64::MIN)]).unwrap_err();
        assert!(matches!(err, FeelError::InvalidArgument { .. }));
    }
}
