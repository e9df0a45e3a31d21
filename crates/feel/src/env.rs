//! Layered evaluation environments.
//!
//! An [`Env`] is a chain of immutable frames. Extending an environment
//! borrows the parent and adds a frame on top; nothing is ever written into
//! a frame after construction. The built-in registry is the outermost scope
//! of every chain.

use std::borrow::Cow;

use crate::builtins;
use crate::error::FeelError;
use crate::function::Function;
use crate::value::{Context, Value};

/// Nested user-defined and decision invocations allowed by default.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 64;

#[derive(Debug, Clone)]
pub struct Env<'a> {
    frame: Cow<'a, Context>,
    parent: Option<&'a Env<'a>>,
    input_variable: Option<String>,
    depth: usize,
    max_call_depth: usize,
}

impl<'a> Env<'a> {
    /// Root environment over a borrowed context.
    pub fn new(context: &'a Context) -> Env<'a> {
        Env {
            frame: Cow::Borrowed(context),
            parent: None,
            input_variable: None,
            depth: 0,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    /// Root environment owning its context.
    pub fn owned(context: Context) -> Env<'static> {
        Env {
            frame: Cow::Owned(context),
            parent: None,
            input_variable: None,
            depth: 0,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    pub fn with_max_call_depth(mut self, limit: usize) -> Self {
        self.max_call_depth = limit;
        self
    }

    pub fn max_call_depth(&self) -> usize {
        self.max_call_depth
    }

    /// A new scope on top of this one.
    pub fn child(&'a self, frame: Context) -> Env<'a> {
        Env {
            frame: Cow::Owned(frame),
            parent: Some(self),
            input_variable: self.input_variable.clone(),
            depth: self.depth,
            max_call_depth: self.max_call_depth,
        }
    }

    /// An empty scope that names the decision-table column being tested.
    pub fn with_input_variable(&'a self, name: Option<String>) -> Env<'a> {
        Env {
            frame: Cow::Owned(Context::new()),
            parent: Some(self),
            input_variable: name,
            depth: self.depth,
            max_call_depth: self.max_call_depth,
        }
    }

    /// A scope for the body of `function`, one call deeper.
    pub fn enter_call(&'a self, function: &str, frame: Context) -> Result<Env<'a>, FeelError> {
        if self.depth >= self.max_call_depth {
            return Err(FeelError::CallDepthExceeded {
                function: function.to_string(),
                limit: self.max_call_depth,
            });
        }
        let mut env = self.child(frame);
        env.depth = self.depth + 1;
        Ok(env)
    }

    pub fn input_variable(&self) -> Option<&str> {
        self.input_variable.as_deref()
    }

    /// Innermost binding of `name`, falling back to the built-ins.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let mut scope = Some(self);
        while let Some(env) = scope {
            if let Some(value) = env.frame.get(name) {
                return Some(value.clone());
            }
            scope = env.parent;
        }
        builtins::lookup(name).map(|builtin| Value::Function(Function::BuiltIn(builtin)))
    }
}
