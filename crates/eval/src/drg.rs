//! Decision requirements graph evaluation.
//!
//! Required decisions run before the decision that needs them, each at most
//! once per call. Their results are merged into the context the requesting
//! decision sees; every merge builds a new context.

use std::collections::HashSet;

use dmn_feel::{Context, Env, Value};

use crate::decision::{Decision, DecisionSet};
use crate::error::DecisionError;

/// Evaluate decision `id` against `context`, satisfying its requirements
/// first.
pub fn evaluate_decision(
    id: &str,
    decisions: &DecisionSet,
    context: &Context,
) -> Result<Value, DecisionError> {
    let decision = lookup(id, decisions)?;
    let mut evaluated = HashSet::new();
    let (result, _) = evaluate_in(decision, decisions, context.clone(), &mut evaluated)?;
    Ok(result)
}

fn lookup<'s>(id: &str, decisions: &'s DecisionSet) -> Result<&'s Decision, DecisionError> {
    decisions
        .get(id)
        .ok_or_else(|| DecisionError::UnknownDecision { id: id.to_string() })
}

/// Returns the decision's result together with the context it was
/// evaluated in, so callers see everything merged along the way.
fn evaluate_in(
    decision: &Decision,
    decisions: &DecisionSet,
    mut context: Context,
    evaluated: &mut HashSet<String>,
) -> Result<(Value, Context), DecisionError> {
    tracing::debug!(decision = %decision.id, "evaluating decision");
    for required_id in &decision.required_decisions {
        if evaluated.contains(required_id) {
            continue;
        }
        let required = lookup(required_id, decisions)?;
        let (result, merged) = evaluate_in(required, decisions, context, evaluated)?;
        context = merge_result(&merged, &result);
        tracing::debug!(decision = %decision.id, required = %required_id, "required decision merged");
        evaluated.insert(required_id.clone());
    }

    let result = {
        let env = Env::new(&context).with_max_call_depth(decisions.max_call_depth());
        decision.table.evaluate(&decision.id, &env)?
    };
    tracing::debug!(decision = %decision.id, result = %result, "decision evaluated");
    Ok((result, context))
}

/// Merge a decision result into `context`. A list of per-rule rows is first
/// collated so that each output name holds the list of its values.
fn merge_result(context: &Context, result: &Value) -> Context {
    match result {
        Value::Context(outputs) => merge(context, outputs),
        Value::List(rows) => merge(context, &collate(rows)),
        other => {
            tracing::debug!(result = %other, "decision result is not mergeable");
            context.clone()
        }
    }
}

/// Nested contexts merge recursively, lists concatenate, anything else in
/// `overlay` replaces the value in `base`.
pub(crate) fn merge(base: &Context, overlay: &Context) -> Context {
    let mut merged = base.clone();
    for (name, value) in overlay {
        let combined = match (merged.remove(name), value) {
            (Some(Value::Context(existing)), Value::Context(nested)) => {
                Value::Context(merge(&existing, nested))
            }
            (Some(Value::List(mut existing)), Value::List(more)) => {
                existing.extend(more.iter().cloned());
                Value::List(existing)
            }
            (_, value) => value.clone(),
        };
        merged.insert(name.clone(), combined);
    }
    merged
}

/// `[{a: 1, o: {p: x}}, {a: 2, o: {p: y}}]` becomes `{a: [1, 2], o: {p: [x, y]}}`.
pub(crate) fn collate(rows: &[Value]) -> Context {
    let mut collated = Context::new();
    for row in rows {
        if let Value::Context(row) = row {
            accumulate(&mut collated, row);
        }
    }
    collated
}

fn accumulate(into: &mut Context, row: &Context) {
    for (name, value) in row {
        match (into.get_mut(name), value) {
            (Some(Value::Context(existing)), Value::Context(nested)) => accumulate(existing, nested),
            (None, Value::Context(nested)) => {
                let mut fresh = Context::new();
                accumulate(&mut fresh, nested);
                into.insert(name.clone(), Value::Context(fresh));
            }
            (Some(Value::List(values)), value) => values.push(value.clone()),
            (_, value) => {
                into.insert(name.clone(), Value::List(vec![value.clone()]));
            }
        }
    }
}
