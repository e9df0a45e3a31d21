//! DMN decision evaluator -- decision tables, hit policies and decision
//! requirements graphs over the FEEL evaluator in `dmn-feel`.
//!
//! A [`DecisionSet`] is built once (from Rust values or interchange JSON),
//! validated, and then shared read-only between evaluations. Each
//! evaluation owns its input context.

pub mod decision;
pub mod drg;
pub mod error;
pub mod interchange;
pub mod table;

pub use decision::{Decision, DecisionSet};
pub use drg::evaluate_decision;
pub use error::DecisionError;
pub use table::{DecisionTable, HitPolicy, InputClause, Rule};

use dmn_feel::Value;

/// Evaluate a decision from an interchange document against a JSON context.
///
/// # Arguments
/// * `document` - Interchange JSON decision set
/// * `decision_id` - Decision to evaluate
/// * `context` - JSON object of input data
///
/// # Returns
/// * The decision result as JSON. Absent outputs become `null`.
pub fn evaluate_json(
    document: &serde_json::Value,
    decision_id: &str,
    context: &serde_json::Value,
) -> Result<serde_json::Value, DecisionError> {
    let decisions = DecisionSet::from_interchange(document)?;
    let context = Value::context_from_json(context).map_err(|e| DecisionError::Interchange {
        message: e.to_string(),
    })?;
    let result = evaluate_decision(decision_id, &decisions, &context)?;
    Ok(result.to_json())
}
