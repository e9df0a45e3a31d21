//! Decisions and decision sets.

use std::collections::{HashMap, HashSet};

use dmn_feel::DEFAULT_MAX_CALL_DEPTH;

use crate::error::DecisionError;
use crate::table::DecisionTable;

/// A decision: its table plus the ids of the decisions it requires.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub id: String,
    pub table: DecisionTable,
    pub required_decisions: Vec<String>,
}

impl Decision {
    pub fn new(id: impl Into<String>, table: DecisionTable, required_decisions: Vec<String>) -> Self {
        Decision {
            id: id.into(),
            table,
            required_decisions,
        }
    }
}

/// An immutable id → decision map whose requirement graph is known to be
/// complete and acyclic.
#[derive(Debug, Clone)]
pub struct DecisionSet {
    decisions: HashMap<String, Decision>,
    max_call_depth: usize,
}

impl DecisionSet {
    /// Index `decisions` by id and validate the requirement graph.
    pub fn new(decisions: Vec<Decision>) -> Result<Self, DecisionError> {
        let mut index = HashMap::with_capacity(decisions.len());
        for decision in decisions {
            if index.contains_key(&decision.id) {
                return Err(DecisionError::invalid_table(&decision.id, "duplicate decision id"));
            }
            index.insert(decision.id.clone(), decision);
        }

        for decision in index.values() {
            for required in &decision.required_decisions {
                if !index.contains_key(required) {
                    return Err(DecisionError::UnknownDecision {
                        id: required.clone(),
                    });
                }
            }
        }

        let mut ids: Vec<&str> = index.keys().map(String::as_str).collect();
        ids.sort_unstable();
        let mut visited = HashSet::new();
        for id in ids {
            detect_cycle(id, &index, &mut visited, &mut Vec::new())?;
        }

        Ok(DecisionSet {
            decisions: index,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        })
    }

    /// Bound on nested function invocations inside every expression
    /// evaluated for this set.
    pub fn with_max_call_depth(mut self, limit: usize) -> Self {
        self.max_call_depth = limit;
        self
    }

    pub fn max_call_depth(&self) -> usize {
        self.max_call_depth
    }

    pub fn get(&self, id: &str) -> Option<&Decision> {
        self.decisions.get(id)
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// Decision ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.decisions.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

fn detect_cycle<'a>(
    id: &'a str,
    decisions: &'a HashMap<String, Decision>,
    visited: &mut HashSet<&'a str>,
    in_stack: &mut Vec<&'a str>,
) -> Result<(), DecisionError> {
    if visited.contains(id) {
        return Ok(());
    }
    if let Some(pos) = in_stack.iter().position(|&seen| seen == id) {
        let mut cycle: Vec<String> = in_stack[pos..].iter().map(|s| s.to_string()).collect();
        cycle.push(id.to_string());
        return Err(DecisionError::CyclicDependency { cycle });
    }
    let Some(decision) = decisions.get(id) else {
        return Ok(());
    };
    in_stack.push(id);
    for required in &decision.required_decisions {
        detect_cycle(required, decisions, visited, in_stack)?;
    }
    in_stack.pop();
    visited.insert(id);
    Ok(())
}
