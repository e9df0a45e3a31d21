//! FEEL (Friendly Enough Expression Language) value model and evaluator.
//!
//! Pure, synchronous evaluation of pre-parsed expression trees:
//! - `value`: runtime values, including Null/Absent and the temporal types
//! - `ops`: operator dispatch with three-valued propagation
//! - `eval`: tree-walking interpreter producing values and predicates
//! - `builtins`: the process-wide built-in function registry
//!
//! Numbers are `rust_decimal::Decimal` throughout; no `f64` in evaluation.

pub mod ast;
pub mod builtins;
pub mod env;
pub mod error;
pub mod eval;
pub mod function;
pub mod numeric;
pub mod ops;
pub mod value;

pub use ast::{ArithmeticOp, ComparisonOp, IntervalBound, Literal, Node, PositionalParameters};
pub use env::{Env, DEFAULT_MAX_CALL_DEPTH};
pub use error::FeelError;
pub use eval::{evaluate, invoke, unary_test};
pub use function::{Function, Predicate};
pub use value::{Context, Value};
