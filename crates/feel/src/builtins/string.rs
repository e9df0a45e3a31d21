//! String functions. Positions count characters, not bytes.

use super::{arg, expect_number, expect_string, propagate, Registry};
use crate::env::Env;
use crate::error::FeelError;
use crate::numeric::to_whole;
use crate::value::Value;

pub(super) fn register(registry: &mut Registry) {
    registry.add("starts with", starts_with);
    registry.add("ends with", ends_with);
    registry.add("contains", contains);
    registry.add("upper case", upper_case);
    registry.add("lower case", lower_case);
    registry.add("string length", string_length);
    registry.add("substring", substring);
}

/// Absent beats Null across both operands.
fn pair<'v>(
    function: &str,
    args: &'v [Value],
) -> Result<Result<(&'v str, &'v str), Value>, FeelError> {
    let (text, other) = (arg(args, 0), arg(args, 1));
    if text.is_absent() || other.is_absent() {
        return Ok(Err(Value::Absent));
    }
    if text.is_null() || other.is_null() {
        return Ok(Err(Value::Null));
    }
    Ok(Ok((expect_string(function, text)?, expect_string(function, other)?)))
}

fn starts_with(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    Ok(match pair("starts with", args)? {
        Ok((text, prefix)) => Value::Bool(text.starts_with(prefix)),
        Err(missing) => missing,
    })
}

fn ends_with(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    Ok(match pair("ends with", args)? {
        Ok((text, suffix)) => Value::Bool(text.ends_with(suffix)),
        Err(missing) => missing,
    })
}

fn contains(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    Ok(match pair("contains", args)? {
        Ok((text, needle)) => Value::Bool(text.contains(needle)),
        Err(missing) => missing,
    })
}

fn upper_case(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    let text = arg(args, 0);
    if let Some(v) = propagate(text) {
        return Ok(v);
    }
    Ok(Value::String(expect_string("upper case", text)?.to_uppercase()))
}

fn lower_case(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    let text = arg(args, 0);
    if let Some(v) = propagate(text) {
        return Ok(v);
    }
    Ok(Value::String(expect_string("lower case", text)?.to_lowercase()))
}

fn string_length(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    let text = arg(args, 0);
    if let Some(v) = propagate(text) {
        return Ok(v);
    }
    let len = expect_string("string length", text)?.chars().count();
    Ok(Value::from(len as i64))
}

/// 1-based start (negative counts from the end), optional length.
fn substring(args: &[Value], _env: &Env<'_>) -> Result<Value, FeelError> {
    let text = arg(args, 0);
    if let Some(v) = propagate(text) {
        return Ok(v);
    }
    let start = arg(args, 1);
    if let Some(v) = propagate(start) {
        return Ok(v);
    }
    let chars: Vec<char> = expect_string("substring", text)?.chars().collect();
    let start = to_whole(expect_number("substring", start)?, "substring")?;
    let len = chars.len() as i64;
    if start == 0 || start.unsigned_abs() > len as u64 {
        return Err(FeelError::invalid_argument(
            "substring",
            format!("start position {} is outside a string of {}", start, len),
        ));
    }
    let from = if start < 0 { len + start } else { start - 1 };
    let take = match arg(args, 2) {
        Value::Absent | Value::Null => len - from,
        length => {
            let n = to_whole(expect_number("substring", length)?, "substring")?;
            if n < 0 {
                return Err(FeelError::invalid_argument(
                    "substring",
                    format!("negative length {}", n),
                ));
            }
            n.min(len - from)
        }
    };
    Ok(Value::String(
        chars[from as usize..(from + take) as usize].iter().collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Context;

    fn call(f: fn(&[Value], &Env<'_>) -> Result<Value, FeelError>, args: Vec<Value>) -> Value {
        let env = Env::owned(Context::new());
        f(&args, &env).unwrap()
    }

    #[test]
    fn absent_beats_null() {
        assert_eq!(call(starts_with, vec![Value::Null, Value::Absent]), Value::Absent);
        assert_eq!(call(starts_with, vec![Value::Null, Value::from("a")]), Value::Null);
        assert_eq!(call(ends_with, vec![Value::from("abc"), Value::Null]), Value::Null);
    }

    #[test]
    fn prefix_and_suffix() {
        assert_eq!(call(starts_with, vec![Value::from("foobar"), Value::from("foo")]), Value::Bool(true));
        assert_eq!(call(ends_with, vec![Value::from("foobar"), Value::from("foo")]), Value::Bool(false));
        assert_eq!(call(contains, vec![Value::from("foobar"), Value::from("oba")]), Value::Bool(true));
    }

    #[test]
    fn case_conversion() {
        assert_eq!(call(upper_case, vec![Value::from("aBc")]), Value::from("ABC"));
        assert_eq!(call(lower_case, vec![Value::Null]), Value::Null);
    }

    #[test]
    fn substring_positions() {
        assert_eq!(call(substring, vec![Value::from("foobar"), Value::from(3)]), Value::from("obar"));
        assert_eq!(
            call(substring, vec![Value::from("foobar"), Value::from(-2), Value::from(1)]),
            Value::from("a")
        );
        assert_eq!(call(string_length, vec![Value::from("héllo")]), Value::from(5));
    }

    #[test]
    fn substring_rejects_the_most_negative_start() {
        let env = Env::owned(Context::new());
        let err = substring(&[Value::from("foo"), Value::from(i64::MIN)], &env).unwrap_err();
        assert!(matches!(err, FeelError::InvalidArgument { .. }));
    }
}
