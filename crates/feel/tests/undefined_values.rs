//! Absent propagation through every node kind.
//!
//! Absent marks a binding that could not be resolved. It never raises; it
//! flows to an Absent result or makes a test undecidable.

use dmn_feel::{evaluate, unary_test, Context, Env, Node, Value};
use serde_json::json;

// ──────────────────────────────────────────────
// Test helpers
// ──────────────────────────────────────────────

fn node(tree: serde_json::Value) -> Node {
    serde_json::from_value(tree).unwrap()
}

fn name(n: &str) -> serde_json::Value {
    json!({ "type": "Name", "name": n })
}

fn number(n: i64) -> serde_json::Value {
    json!({ "type": "Literal", "value": { "kind": "number", "value": n.to_string() } })
}

/// Both ways a name can be unresolved: unbound, or bound to Absent.
fn contexts() -> Vec<Context> {
    let mut bound = Context::new();
    bound.insert("a".into(), Value::Absent);
    vec![Context::new(), bound]
}

// ──────────────────────────────────────────────
// Expressions
// ──────────────────────────────────────────────

#[test]
fn unresolved_name_is_absent() {
    for ctx in contexts() {
        let env = Env::new(&ctx);
        assert_eq!(evaluate(&node(name("a")), &env).unwrap(), Value::Absent);
    }
}

#[test]
fn qualified_name_through_missing_fields_is_absent() {
    let tree = node(json!({ "type": "QualifiedName", "names": ["a", "b"] }));
    let mut empty_a = Context::new();
    empty_a.insert("a".into(), Value::Context(Context::new()));
    let mut absent_b = Context::new();
    let mut inner = Context::new();
    inner.insert("b".into(), Value::Absent);
    absent_b.insert("a".into(), Value::Context(inner));

    for ctx in contexts().into_iter().chain([empty_a, absent_b]) {
        let env = Env::new(&ctx);
        assert_eq!(evaluate(&tree, &env).unwrap(), Value::Absent);
    }
}

#[test]
fn arithmetic_with_absent_operand_is_absent() {
    let tree = node(json!({
        "type": "ArithmeticExpression",
        "operator": "+",
        "left": name("a"),
        "right": number(1)
    }));
    for ctx in contexts() {
        let env = Env::new(&ctx);
        assert_eq!(evaluate(&tree, &env).unwrap(), Value::Absent);
    }
}

#[test]
fn comparison_with_absent_operand_is_absent() {
    let tree = node(json!({
        "type": "ComparisonExpression",
        "operator": "!=",
        "left": number(42),
        "right": name("a")
    }));
    for ctx in contexts() {
        let env = Env::new(&ctx);
        assert_eq!(evaluate(&tree, &env).unwrap(), Value::Absent);
    }
}

#[test]
fn date_literal_with_absent_parameter_is_absent() {
    let tree = node(json!({ "type": "DateTimeLiteral", "symbol": "date", "params": [name("a")] }));
    for ctx in contexts() {
        let env = Env::new(&ctx);
        assert_eq!(evaluate(&tree, &env).unwrap(), Value::Absent);
    }
}

#[test]
fn invoking_an_unbound_function_is_absent() {
    let tree = node(json!({
        "type": "FunctionInvocation",
        "function": name("plus"),
        "params": { "params": [number(42), number(1)] }
    }));
    let env = Env::owned(Context::new());
    assert_eq!(evaluate(&tree, &env).unwrap(), Value::Absent);
}

#[test]
fn builtins_receive_absent_arguments() {
    let tree = node(json!({
        "type": "FunctionInvocation",
        "function": name("count"),
        "params": { "params": [name("a")] }
    }));
    let env = Env::owned(Context::new());
    assert_eq!(evaluate(&tree, &env).unwrap(), Value::Absent);

    let mut ctx = Context::new();
    ctx.insert("a".into(), Value::Null);
    let env = Env::new(&ctx);
    assert_eq!(evaluate(&tree, &env).unwrap(), Value::Null);
}

// ──────────────────────────────────────────────
// Unary tests
// ──────────────────────────────────────────────

#[test]
fn interval_with_absent_bound() {
    let tree = node(json!({
        "type": "Interval",
        "start_bound": "closed",
        "start": number(10),
        "end": name("a"),
        "end_bound": "open"
    }));
    for ctx in contexts() {
        let env = Env::new(&ctx);
        let test = unary_test(&tree, &env).unwrap();
        assert_eq!(test.test(&Value::from(9)).unwrap(), Value::Absent);
        assert_eq!(test.test(&Value::from(10)).unwrap(), Value::Absent);
    }
}

#[test]
fn negated_interval_with_absent_bound_does_not_match() {
    let tree = node(json!({
        "type": "SimpleUnaryTests",
        "negated": true,
        "tests": [{
            "type": "Interval",
            "start_bound": "closed",
            "start": number(10),
            "end": name("a"),
            "end_bound": "open"
        }]
    }));
    for ctx in contexts() {
        let env = Env::new(&ctx);
        let test = unary_test(&tree, &env).unwrap();
        assert_eq!(test.test(&Value::from(9)).unwrap(), Value::Absent);
        assert_eq!(test.test(&Value::from(10)).unwrap(), Value::Absent);
    }
}

#[test]
fn interval_with_absent_start_bound() {
    let tree = node(json!({
        "type": "Interval",
        "start_bound": "open",
        "start": name("a"),
        "end": number(10),
        "end_bound": "closed"
    }));
    for ctx in contexts() {
        let env = Env::new(&ctx);
        let test = unary_test(&tree, &env).unwrap();
        assert_eq!(test.test(&Value::from(11)).unwrap(), Value::Absent);
    }
}

#[test]
fn comparison_test_against_absent_bound() {
    let tree = node(json!({
        "type": "SimplePositiveUnaryTest",
        "operator": "<",
        "operand": name("a")
    }));
    for ctx in contexts() {
        let env = Env::new(&ctx);
        let test = unary_test(&tree, &env).unwrap();
        assert_eq!(test.test(&Value::from(41)).unwrap(), Value::Absent);
    }
}

#[test]
fn disjunction_with_absent_alternative() {
    let tree = node(json!({
        "type": "SimpleUnaryTests",
        "tests": [
            { "type": "SimplePositiveUnaryTest", "operand": name("a") },
            { "type": "SimplePositiveUnaryTest", "operand": number(10) }
        ]
    }));
    for ctx in contexts() {
        let env = Env::new(&ctx);
        let test = unary_test(&tree, &env).unwrap();
        assert_eq!(test.test(&Value::from(10)).unwrap(), Value::Bool(true));
        assert_eq!(test.test(&Value::from(42)).unwrap(), Value::Absent);
    }
}

#[test]
fn negated_disjunction_with_absent_alternative() {
    let tree = node(json!({
        "type": "SimpleUnaryTests",
        "negated": true,
        "tests": [
            { "type": "SimplePositiveUnaryTest", "operand": name("a") },
            { "type": "SimplePositiveUnaryTest", "operand": number(10) }
        ]
    }));
    for ctx in contexts() {
        let env = Env::new(&ctx);
        let test = unary_test(&tree, &env).unwrap();
        assert_eq!(test.test(&Value::from(10)).unwrap(), Value::Bool(false));
        assert_eq!(test.test(&Value::from(42)).unwrap(), Value::Absent);
    }
}

#[test]
fn wildcard_matches_everything() {
    let env = Env::owned(Context::new());
    let test = unary_test(&Node::any(), &env).unwrap();
    assert_eq!(test.test(&Value::Absent).unwrap(), Value::Bool(true));
    assert_eq!(test.test(&Value::from("x")).unwrap(), Value::Bool(true));
}

#[test]
fn defined_distinguishes_absent_from_null() {
    let tree = node(json!({
        "type": "FunctionInvocation",
        "function": name("defined"),
        "params": { "params": [name("a")] }
    }));
    let env = Env::owned(Context::new());
    assert_eq!(evaluate(&tree, &env).unwrap(), Value::Bool(false));

    let mut ctx = Context::new();
    ctx.insert("a".into(), Value::Null);
    let env = Env::new(&ctx);
    assert_eq!(evaluate(&tree, &env).unwrap(), Value::Bool(true));
}
