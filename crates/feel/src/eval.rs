//! Tree-walking evaluator.
//!
//! `evaluate` turns a node plus an environment into a value; unary-test
//! nodes evaluate to [`Value::Predicate`]. Unresolved names are Absent and
//! never an error.

use crate::ast::{ComparisonOp, IntervalBound, Node};
use crate::builtins;
use crate::env::Env;
use crate::error::FeelError;
use crate::function::{Function, Predicate};
use crate::ops;
use crate::value::{Context, Value};

/// Evaluate `node` against `env`.
pub fn evaluate(node: &Node, env: &Env<'_>) -> Result<Value, FeelError> {
    eval_node(node, env, false)
}

/// Evaluate `node` as a unary test. Plain values become equality tests.
pub fn unary_test(node: &Node, env: &Env<'_>) -> Result<Predicate, FeelError> {
    Ok(as_predicate(evaluate(node, env)?))
}

fn as_predicate(value: Value) -> Predicate {
    match value {
        Value::Predicate(predicate) => predicate,
        other => Predicate::compare(ComparisonOp::Eq, other),
    }
}

fn eval_node(node: &Node, env: &Env<'_>, quiet: bool) -> Result<Value, FeelError> {
    match node {
        Node::Literal { value } => Ok(value.to_value()),

        Node::Name { name } => Ok(resolve(std::slice::from_ref(name), env, quiet)),

        Node::QualifiedName { names } => Ok(resolve(names, env, quiet)),

        Node::ArithmeticExpression {
            operator,
            left,
            right,
        } => {
            let right_val = evaluate(right, env)?;
            match left {
                Some(left) => {
                    let left_val = evaluate(left, env)?;
                    ops::arithmetic(*operator, &left_val, &right_val)
                }
                None => ops::negate(&right_val),
            }
        }

        Node::ComparisonExpression {
            operator,
            left,
            right,
        } => {
            let left_val = evaluate(left, env)?;
            let right_val = evaluate(right, env)?;
            ops::compare(*operator, &left_val, &right_val)
        }

        Node::Between { value, low, high } => {
            let value = evaluate(value, env)?;
            let low = evaluate(low, env)?;
            let high = evaluate(high, env)?;
            let above = ops::compare(ComparisonOp::Ge, &value, &low)?;
            let below = ops::compare(ComparisonOp::Le, &value, &high)?;
            Ok(ops::and3(&above, &below))
        }

        Node::In { value, tests } => {
            let candidate = evaluate(value, env)?;
            let mut result = Value::Bool(false);
            for test in tests {
                let outcome = match evaluate(test, env)? {
                    Value::List(items) => Predicate::any_of(
                        items
                            .into_iter()
                            .map(|item| Predicate::compare(ComparisonOp::Eq, item))
                            .collect(),
                    )
                    .test(&candidate)?,
                    other => as_predicate(other).test(&candidate)?,
                };
                result = ops::or3(&result, &outcome);
                if result.truth() == Some(true) {
                    break;
                }
            }
            Ok(result)
        }

        Node::Interval {
            start_bound,
            start,
            end,
            end_bound,
        } => {
            let low = evaluate(start, env)?;
            let high = evaluate(end, env)?;
            let low_op = match start_bound {
                IntervalBound::Closed => ComparisonOp::Ge,
                IntervalBound::Open => ComparisonOp::Gt,
            };
            let high_op = match end_bound {
                IntervalBound::Closed => ComparisonOp::Le,
                IntervalBound::Open => ComparisonOp::Lt,
            };
            Ok(Value::Predicate(Predicate::new(move |x| {
                if low.is_absent() || high.is_absent() {
                    return Ok(Value::Absent);
                }
                let above = ops::compare(low_op, x, &low)?;
                let below = ops::compare(high_op, x, &high)?;
                if above.is_absent() || below.is_absent() {
                    return Ok(Value::Absent);
                }
                Ok(ops::and3(&above, &below))
            })))
        }

        Node::SimplePositiveUnaryTest { operator, operand } => {
            positive_unary_test(operator.unwrap_or(ComparisonOp::Eq), operand, env)
                .map(Value::Predicate)
        }

        Node::SimpleUnaryTests { tests, negated } => {
            if tests.is_empty() {
                return Ok(Value::Predicate(Predicate::constant(true)));
            }
            let predicates = tests
                .iter()
                .map(|test| unary_test(test, env))
                .collect::<Result<Vec<_>, _>>()?;
            let combined = Predicate::any_of(predicates);
            Ok(Value::Predicate(if *negated {
                combined.negate()
            } else {
                combined
            }))
        }

        Node::SimpleExpressions { expressions } => expressions
            .iter()
            .map(|expr| evaluate(expr, env))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),

        Node::DateTimeLiteral { symbol, params } => {
            let builtin = builtins::lookup(symbol).ok_or_else(|| {
                FeelError::invalid_argument(symbol.as_str(), "unknown date/time literal")
            })?;
            let args = params
                .iter()
                .map(|param| evaluate(param, env))
                .collect::<Result<Vec<_>, _>>()?;
            if args.iter().any(Value::is_absent) {
                return Ok(Value::Absent);
            }
            (builtin.call)(&args, env)
        }

        Node::FunctionInvocation { function, params } => {
            let callee = match evaluate(function, env)? {
                Value::Absent => return Ok(Value::Absent),
                Value::Function(callee) => callee,
                other => {
                    return Err(FeelError::type_mismatch(
                        "invoke",
                        vec![other.type_name()],
                    ))
                }
            };
            let quiet = callee.quiet_arguments();
            let args = params
                .params
                .iter()
                .map(|param| eval_node(param, env, quiet))
                .collect::<Result<Vec<_>, _>>()?;
            invoke(&callee, args, env)
        }

        Node::List { items } => items
            .iter()
            .map(|item| evaluate(item, env))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),

        Node::FunctionDefinition { params, body } => Ok(Value::Function(
            Function::user_defined(params.clone(), (**body).clone()),
        )),
    }
}

/// Call `function` with positional `args`.
///
/// User-defined functions bind their declared parameters by position on top
/// of the caller's environment; missing arguments are Absent.
pub fn invoke(function: &Function, args: Vec<Value>, env: &Env<'_>) -> Result<Value, FeelError> {
    match function {
        Function::BuiltIn(builtin) => (builtin.call)(&args, env),
        Function::UserDefined(user) => {
            let mut args = args.into_iter();
            let frame: Context = user
                .params
                .iter()
                .map(|param| (param.clone(), args.next().unwrap_or(Value::Absent)))
                .collect();
            let inner = env.enter_call(function.name(), frame)?;
            evaluate(&user.body, &inner)
        }
        Function::Decision(decision) => {
            let inner = env.enter_call(&decision.name, Context::new())?;
            match evaluate(&decision.body, &inner)? {
                Value::Function(body) => invoke(&body, args, &inner),
                other => Ok(other),
            }
        }
    }
}

/// Walks a dotted path; the first missing segment makes the whole path Absent.
fn resolve(names: &[String], env: &Env<'_>, quiet: bool) -> Value {
    let Some((first, rest)) = names.split_first() else {
        return Value::Absent;
    };
    let mut value = env.lookup(first).unwrap_or(Value::Absent);
    for segment in rest {
        if value.is_absent() {
            break;
        }
        value = value.field(segment);
    }
    if value.is_absent() && !quiet {
        tracing::debug!(name = %names.join("."), "name resolved to absent");
    }
    value
}

/// One input-entry test.
///
/// When the cell is a direct function call taking the column's input
/// variable as an argument, a `true` result means "compare the candidate
/// with that argument" and a `false` result fails every candidate.
fn positive_unary_test(op: ComparisonOp, operand: &Node, env: &Env<'_>) -> Result<Predicate, FeelError> {
    let result = evaluate(operand, env)?;
    if let Some(argument) = input_variable_argument(operand, env) {
        match result {
            Value::Bool(true) => return Ok(Predicate::compare(op, evaluate(argument, env)?)),
            Value::Bool(false) => return Ok(Predicate::constant(false)),
            _ => {}
        }
    }
    Ok(match result {
        Value::Predicate(predicate) => predicate,
        other => Predicate::compare(op, other),
    })
}

fn input_variable_argument<'n>(operand: &'n Node, env: &Env<'_>) -> Option<&'n Node> {
    let input_variable = env.input_variable()?;
    match operand {
        Node::FunctionInvocation { params, .. } => params
            .params
            .iter()
            .find(|param| param.qualified_text().as_deref() == Some(input_variable)),
        _ => None,
    }
}
