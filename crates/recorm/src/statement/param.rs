//! Parameter collection with dialect-specific placeholders.

use crate::value::Value;

/// Parameter marker style of a SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placeholder {
    /// `$1, $2, ...` (PostgreSQL)
    #[default]
    Dollar,
    /// `?` (MySQL, SQLite)
    Question,
}

/// Parameters collected while rendering a statement.
///
/// Placeholder numbering is computed as values are pushed, so fragments rendered in
/// sequence (SET, then WHERE) share one numbering without any string rewriting.
#[derive(Clone, Debug, Default)]
pub struct ParamList {
    style: Placeholder,
    params: Vec<Value>,
}

impl ParamList {
    /// Create a new empty parameter list for the given dialect.
    pub fn new(style: Placeholder) -> Self {
        Self {
            style,
            params: Vec::new(),
        }
    }

    /// Add a parameter and return the marker that refers to it.
    pub fn push(&mut self, value: Value) -> String {
        self.params.push(value);
        match self.style {
            Placeholder::Dollar => format!("${}", self.params.len()),
            Placeholder::Question => "?".to_string(),
        }
    }

    pub fn style(&self) -> Placeholder {
        self.style
    }

    /// Get the current parameter count.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.params
    }
}
