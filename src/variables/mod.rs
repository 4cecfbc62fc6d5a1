//! Variable storage for Turtle BASIC
//!
//! One global, case-insensitive table of names to values. There is no
//! scoping: FOR loop counters live here too and outlive their loops.

use crate::error::{BasicError, Result};
use std::collections::HashMap;
use std::fmt;

/// Represents a BASIC value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// IEEE 754 double precision number
    Number(f64),
    /// Text string
    Text(String),
}

impl Value {
    /// Get the number inside, or a type mismatch naming the context
    pub fn as_number(&self, context: &str) -> Result<f64> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Text(_) => Err(BasicError::type_mismatch(format!(
                "{} needs a number",
                context
            ))),
        }
    }

    /// BASIC truth: any non-zero number
    pub fn is_truthy(&self) -> Result<bool> {
        Ok(self.as_number("condition")? != 0.0)
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Number(0.0)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Format a number the way PRINT shows it: integral values have no fraction
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        // Avoid printing "-0"
        return "0".to_string();
    }
    format!("{}", n)
}

/// Variable storage system
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    variables: HashMap<String, Value>,
}

impl VariableStore {
    /// Create a new variable store
    pub fn new() -> Self {
        Self {
            variables: HashMap::new(),
        }
    }

    fn key(name: &str) -> String {
        name.to_ascii_uppercase()
    }

    /// Set a variable, replacing any previous value and type
    pub fn set(&mut self, name: &str, value: Value) {
        self.variables.insert(Self::key(name), value);
    }

    /// Read a variable; undefined names read as Number 0
    pub fn get(&self, name: &str) -> Value {
        self.variables
            .get(&Self::key(name))
            .cloned()
            .unwrap_or_default()
    }

    /// Read a variable only if it has been assigned
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.variables.get(&Self::key(name))
    }

    /// Check if a variable exists
    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(&Self::key(name))
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Clear all variables
    pub fn clear(&mut self) {
        self.variables.clear();
    }
}
