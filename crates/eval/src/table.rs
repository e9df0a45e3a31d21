//! Decision tables and hit-policy combinators.
//!
//! A table is validated once at construction: the hit policy is known, every
//! rule has one entry per column, and each input column's input variable is
//! derived from its expression. Evaluation then scans rules in order against
//! a fixed context.

use std::fmt;
use std::str::FromStr;

use dmn_feel::{evaluate, unary_test, Context, Env, FeelError, Node, Value};

use crate::error::DecisionError;

// ──────────────────────────────────────────────
// Hit policy
// ──────────────────────────────────────────────

/// How matching rules combine into the decision result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPolicy {
    /// The first matching rule in table order.
    First,
    /// At most one rule may match.
    Unique,
    /// Every matching rule, in table order.
    Collect,
    /// Every matching rule, in table order. Same mechanics as `Collect`.
    RuleOrder,
}

impl HitPolicy {
    /// Whether the result is a list of per-rule outputs.
    pub fn is_multiple(&self) -> bool {
        matches!(self, HitPolicy::Collect | HitPolicy::RuleOrder)
    }
}

impl FromStr for HitPolicy {
    type Err = DecisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FIRST" => Ok(HitPolicy::First),
            "UNIQUE" => Ok(HitPolicy::Unique),
            "COLLECT" => Ok(HitPolicy::Collect),
            "RULE ORDER" | "RULE_ORDER" => Ok(HitPolicy::RuleOrder),
            _ => Err(DecisionError::UnsupportedHitPolicy {
                policy: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for HitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HitPolicy::First => "FIRST",
            HitPolicy::Unique => "UNIQUE",
            HitPolicy::Collect => "COLLECT",
            HitPolicy::RuleOrder => "RULE ORDER",
        })
    }
}

// ──────────────────────────────────────────────
// Table structure
// ──────────────────────────────────────────────

/// One row: an input entry per input column and an output entry per output.
///
/// Input entries are unary-test trees (`SimpleUnaryTests`); output entries
/// are `SimpleExpressions` trees whose first expression is the output value.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub input_entries: Vec<Node>,
    pub output_entries: Vec<Node>,
}

/// An input column.
#[derive(Debug, Clone, PartialEq)]
pub struct InputClause {
    pub expression: Node,
    /// Dotted text of `expression` when it is a bare (qualified) name.
    pub input_variable: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTable {
    hit_policy: HitPolicy,
    inputs: Vec<InputClause>,
    outputs: Vec<String>,
    rules: Vec<Rule>,
}

impl DecisionTable {
    /// Build a table, checking that every rule fits the declared columns.
    ///
    /// `decision_id` only labels errors.
    pub fn new(
        decision_id: &str,
        hit_policy: HitPolicy,
        inputs: Vec<Node>,
        outputs: Vec<String>,
        rules: Vec<Rule>,
    ) -> Result<Self, DecisionError> {
        if outputs.is_empty() {
            return Err(DecisionError::invalid_table(decision_id, "no outputs declared"));
        }
        if let Some(empty) = outputs.iter().find(|name| name.split('.').any(str::is_empty)) {
            return Err(DecisionError::invalid_table(
                decision_id,
                format!("malformed output name \"{}\"", empty),
            ));
        }
        for (index, rule) in rules.iter().enumerate() {
            if rule.input_entries.len() != inputs.len()
                || rule.output_entries.len() != outputs.len()
            {
                return Err(DecisionError::invalid_table(
                    decision_id,
                    format!(
                        "rule {} has {} input and {} output entries, expected {} and {}",
                        index + 1,
                        rule.input_entries.len(),
                        rule.output_entries.len(),
                        inputs.len(),
                        outputs.len()
                    ),
                ));
            }
        }
        let inputs = inputs
            .into_iter()
            .map(|expression| InputClause {
                input_variable: expression.qualified_text(),
                expression,
            })
            .collect();
        Ok(DecisionTable {
            hit_policy,
            inputs,
            outputs,
            rules,
        })
    }

    pub fn hit_policy(&self) -> HitPolicy {
        self.hit_policy
    }

    pub fn inputs(&self) -> &[InputClause] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Evaluate the table against `env`.
    ///
    /// FIRST and UNIQUE yield one context holding every output name (Absent
    /// when no rule matched). COLLECT and RULE ORDER yield a list with one
    /// context per matching rule.
    pub fn evaluate(&self, decision_id: &str, env: &Env<'_>) -> Result<Value, DecisionError> {
        let candidates = self.resolve_inputs(decision_id, env)?;
        let mut collected = Vec::new();
        let mut chosen: Option<(usize, Context)> = None;

        for (index, rule) in self.rules.iter().enumerate() {
            let number = index + 1;
            if !self.matches(decision_id, number, rule, &candidates, env)? {
                continue;
            }
            tracing::trace!(decision = %decision_id, rule = number, "rule matched");
            match self.hit_policy {
                HitPolicy::First => {
                    chosen = Some((number, self.outputs_of(decision_id, number, rule, env)?));
                    break;
                }
                HitPolicy::Unique => {
                    if chosen.is_some() {
                        return Err(DecisionError::HitPolicyViolation {
                            decision_id: decision_id.to_string(),
                        });
                    }
                    chosen = Some((number, self.outputs_of(decision_id, number, rule, env)?));
                }
                HitPolicy::Collect | HitPolicy::RuleOrder => {
                    collected.push(Value::Context(
                        self.outputs_of(decision_id, number, rule, env)?,
                    ));
                }
            }
        }

        if self.hit_policy.is_multiple() {
            tracing::debug!(decision = %decision_id, matches = collected.len(), "rules collected");
            return Ok(Value::List(collected));
        }
        Ok(Value::Context(match chosen {
            Some((number, outputs)) => {
                tracing::debug!(decision = %decision_id, rule = number, "rule selected");
                outputs
            }
            None => {
                tracing::debug!(decision = %decision_id, "no rule matched");
                self.placeholders()
            }
        }))
    }

    /// Each input expression is evaluated once per table evaluation.
    fn resolve_inputs(&self, decision_id: &str, env: &Env<'_>) -> Result<Vec<Value>, DecisionError> {
        self.inputs
            .iter()
            .enumerate()
            .map(|(column, input)| {
                evaluate(&input.expression, env).map_err(|e| {
                    DecisionError::evaluation(decision_id, None, Some(column + 1), e)
                })
            })
            .collect()
    }

    /// A rule matches only when every input entry yields exactly `true`.
    fn matches(
        &self,
        decision_id: &str,
        number: usize,
        rule: &Rule,
        candidates: &[Value],
        env: &Env<'_>,
    ) -> Result<bool, DecisionError> {
        for (column, ((input, entry), candidate)) in self
            .inputs
            .iter()
            .zip(&rule.input_entries)
            .zip(candidates)
            .enumerate()
        {
            let column_env = env.with_input_variable(input.input_variable.clone());
            let outcome = unary_test(entry, &column_env)
                .and_then(|test| test.test(candidate))
                .map_err(|e| DecisionError::evaluation(decision_id, Some(number), Some(column + 1), e))?;
            if outcome != Value::Bool(true) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn outputs_of(
        &self,
        decision_id: &str,
        number: usize,
        rule: &Rule,
        env: &Env<'_>,
    ) -> Result<Context, DecisionError> {
        let mut outputs = self.placeholders();
        for (offset, (name, entry)) in self.outputs.iter().zip(&rule.output_entries).enumerate() {
            let column = self.inputs.len() + offset + 1;
            let value = output_value(entry, env)
                .map_err(|e| DecisionError::evaluation(decision_id, Some(number), Some(column), e))?;
            set_path(&mut outputs, name, value);
        }
        Ok(outputs)
    }

    /// Every output name bound to Absent, nested along dotted names.
    fn placeholders(&self) -> Context {
        let mut outputs = Context::new();
        for name in &self.outputs {
            set_path(&mut outputs, name, Value::Absent);
        }
        outputs
    }
}

/// First element of a `SimpleExpressions` result; any other result as is.
fn output_value(entry: &Node, env: &Env<'_>) -> Result<Value, FeelError> {
    Ok(match evaluate(entry, env)? {
        Value::List(items) if matches!(entry, Node::SimpleExpressions { .. }) => {
            items.into_iter().next().unwrap_or(Value::Absent)
        }
        other => other,
    })
}

/// Write `value` at a dotted `path`, creating (or replacing non-context
/// values with) nested contexts along the way.
pub(crate) fn set_path(target: &mut Context, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            target.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let slot = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Context(Context::new()));
            if !matches!(slot, Value::Context(_)) {
                *slot = Value::Context(Context::new());
            }
            if let Value::Context(nested) = slot {
                set_path(nested, rest, value);
            }
        }
    }
}
