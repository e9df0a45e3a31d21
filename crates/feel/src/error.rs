//! Errors raised while evaluating FEEL expressions.
//!
//! Absent and Null are values, not errors: nothing in this module is ever
//! produced for an unresolved name.

/// Errors that can occur during expression evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeelError {
    /// An operator or built-in was applied to operands of incompatible kinds.
    #[error(
        "{} : operation unsupported for one or more operands types",
        render_operation(.operation, .operands)
    )]
    TypeMismatch {
        operation: String,
        operands: Vec<&'static str>,
    },

    /// A built-in received an argument of the right kind but an unusable
    /// value (out-of-range position, malformed ISO string, too few samples).
    #[error("{function}: {message}")]
    InvalidArgument { function: String, message: String },

    /// Decimal arithmetic left the representable range.
    #[error("numeric overflow: {message}")]
    Overflow { message: String },

    /// Nested function invocations exceeded the environment's call-depth limit.
    #[error("maximum call depth ({limit}) exceeded while invoking '{function}'")]
    CallDepthExceeded { function: String, limit: usize },
}

impl FeelError {
    pub fn type_mismatch(operation: impl Into<String>, operands: Vec<&'static str>) -> Self {
        FeelError::TypeMismatch {
            operation: operation.into(),
            operands,
        }
    }

    pub fn invalid_argument(function: impl Into<String>, message: impl Into<String>) -> Self {
        FeelError::InvalidArgument {
            function: function.into(),
            message: message.into(),
        }
    }

    pub fn overflow(message: impl Into<String>) -> Self {
        FeelError::Overflow {
            message: message.into(),
        }
    }
}

/// Operators render infix (`date + date`), functions render as a call
/// (`count(string)`).
fn render_operation(operation: &str, operands: &[&'static str]) -> String {
    let is_operator = !operation.chars().any(|c| c.is_alphabetic());
    match operands {
        [left, right] if is_operator => format!("{} {} {}", left, operation, right),
        [operand] if is_operator => format!("{}{}", operation, operand),
        _ => format!("{}({})", operation, operands.join(", ")),
    }
}
