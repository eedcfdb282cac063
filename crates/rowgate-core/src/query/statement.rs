//! Parameterized SQL statements.

use crate::value::Value;

/// SQL text with its positional parameters.
///
/// Values only ever travel as parameters; the text holds identifiers that
/// were checked against the catalog and quoted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    /// SQL text with `?` placeholders.
    pub sql: String,
    /// Parameters, in placeholder order.
    pub params: Vec<Value>,
}

impl Statement {
    /// Create a statement with no parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Append SQL text.
    pub fn push_sql(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Append a placeholder bound to `value`.
    pub fn push_param(&mut self, value: Value) {
        self.sql.push('?');
        self.params.push(value);
    }

    /// Append another statement fragment, keeping its parameters in order.
    pub fn append(&mut self, other: Statement) {
        self.sql.push_str(&other.sql);
        self.params.extend(other.params);
    }
}
