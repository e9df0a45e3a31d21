//! Errors raised while building or evaluating decisions.

use dmn_feel::FeelError;

/// All errors produced by this crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecisionError {
    /// A requested or required decision id is not in the set.
    #[error("unknown decision \"{id}\"")]
    UnknownDecision { id: String },

    /// A UNIQUE table matched more than one rule.
    #[error("Decision \"{decision_id}\" is not unique but hit policy is UNIQUE.")]
    HitPolicyViolation { decision_id: String },

    #[error("unsupported hit policy \"{policy}\"")]
    UnsupportedHitPolicy { policy: String },

    /// The decision requirements graph loops back on itself.
    #[error("decision requirement cycle detected: {}", .cycle.join(" \u{2192} "))]
    CyclicDependency { cycle: Vec<String> },

    #[error("invalid decision table \"{decision_id}\": {message}")]
    InvalidTable { decision_id: String, message: String },

    /// An expression inside a decision failed. `rule` and `column` are
    /// 1-based; columns count inputs first, then outputs.
    #[error(
        "failed to evaluate decision \"{decision_id}\"{}: {source}",
        location(.rule, .column)
    )]
    Evaluation {
        decision_id: String,
        rule: Option<usize>,
        column: Option<usize>,
        #[source]
        source: FeelError,
    },

    /// The interchange document could not be read.
    #[error("interchange error: {message}")]
    Interchange { message: String },
}

impl DecisionError {
    pub(crate) fn evaluation(
        decision_id: &str,
        rule: Option<usize>,
        column: Option<usize>,
        source: FeelError,
    ) -> Self {
        DecisionError::Evaluation {
            decision_id: decision_id.to_string(),
            rule,
            column,
            source,
        }
    }

    pub(crate) fn invalid_table(decision_id: &str, message: impl Into<String>) -> Self {
        DecisionError::InvalidTable {
            decision_id: decision_id.to_string(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for DecisionError {
    fn from(e: serde_json::Error) -> Self {
        DecisionError::Interchange {
            message: e.to_string(),
        }
    }
}

fn location(rule: &Option<usize>, column: &Option<usize>) -> String {
    match (*rule, *column) {
        (Some(rule), Some(column)) => format!(" (rule {}, column {})", rule, column),
        (Some(rule), None) => format!(" (rule {})", rule),
        (None, Some(column)) => format!(" (column {})", column),
        (None, None) => String::new(),
    }
}
