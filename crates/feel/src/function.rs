//! Callable values: functions and predicates.

use std::fmt;
use std::sync::Arc;

use crate::ast::{ComparisonOp, Node};
use crate::env::Env;
use crate::error::FeelError;
use crate::ops;
use crate::value::Value;

/// Signature of every built-in. Positional arguments arrive in call order;
/// the calling environment is passed separately.
pub type BuiltInFn = fn(&[Value], &Env<'_>) -> Result<Value, FeelError>;

/// An entry of the built-in registry.
#[derive(Debug)]
pub struct BuiltIn {
    pub name: &'static str,
    pub call: BuiltInFn,
    /// Name arguments that resolve to Absent are not logged (`defined`).
    pub quiet_arguments: bool,
}

/// A function defined in an expression or supplied through the context.
#[derive(Debug)]
pub struct UserFunction {
    pub params: Vec<String>,
    pub body: Node,
}

/// A decision exposed as a callable. Its body is evaluated in the caller's
/// environment; when that yields a function, the function is invoked with
/// the call's arguments.
#[derive(Debug)]
pub struct DecisionFunction {
    pub name: String,
    pub body: Node,
}

#[derive(Debug, Clone)]
pub enum Function {
    BuiltIn(&'static BuiltIn),
    UserDefined(Arc<UserFunction>),
    Decision(Arc<DecisionFunction>),
}

impl Function {
    pub fn user_defined(params: Vec<String>, body: Node) -> Function {
        Function::UserDefined(Arc::new(UserFunction { params, body }))
    }

    pub fn decision(name: impl Into<String>, body: Node) -> Function {
        Function::Decision(Arc::new(DecisionFunction {
            name: name.into(),
            body,
        }))
    }

    pub fn name(&self) -> &str {
        match self {
            Function::BuiltIn(builtin) => builtin.name,
            Function::UserDefined(_) => "anonymous",
            Function::Decision(decision) => &decision.name,
        }
    }

    /// Identity, not structural, comparison.
    pub fn same_as(&self, other: &Function) -> bool {
        match (self, other) {
            (Function::BuiltIn(a), Function::BuiltIn(b)) => std::ptr::eq(*a, *b),
            (Function::UserDefined(a), Function::UserDefined(b)) => Arc::ptr_eq(a, b),
            (Function::Decision(a), Function::Decision(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub(crate) fn quiet_arguments(&self) -> bool {
        matches!(self, Function::BuiltIn(builtin) if builtin.quiet_arguments)
    }
}

// ──────────────────────────────────────────────
// Predicates
// ──────────────────────────────────────────────

type TestFn = dyn Fn(&Value) -> Result<Value, FeelError> + Send + Sync;

/// A reusable one-argument test. Results are `Bool` when the test could be
/// decided and `Absent` (occasionally `Null`) when it could not.
#[derive(Clone)]
pub struct Predicate(Arc<TestFn>);

impl Predicate {
    pub fn new<F>(test: F) -> Predicate
    where
        F: Fn(&Value) -> Result<Value, FeelError> + Send + Sync + 'static,
    {
        Predicate(Arc::new(test))
    }

    /// `x ⟨op⟩ bound`, with the bound captured now and `x` supplied later.
    pub fn compare(op: ComparisonOp, bound: Value) -> Predicate {
        Predicate::new(move |x| ops::compare(op, x, &bound))
    }

    pub fn constant(result: bool) -> Predicate {
        Predicate::new(move |_| Ok(Value::Bool(result)))
    }

    pub fn test(&self, candidate: &Value) -> Result<Value, FeelError> {
        (self.0)(candidate)
    }

    /// Three-valued OR of `predicates`: true dominates, then Absent, then false.
    pub fn any_of(predicates: Vec<Predicate>) -> Predicate {
        Predicate::new(move |x| {
            let mut result = Value::Bool(false);
            for predicate in &predicates {
                result = ops::or3(&result, &predicate.test(x)?);
                if result.truth() == Some(true) {
                    break;
                }
            }
            Ok(result)
        })
    }

    /// Three-valued negation of this predicate.
    pub fn negate(self) -> Predicate {
        Predicate::new(move |x| Ok(ops::not3(&self.test(x)?)))
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}
