//! Table definitions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::column::{ColumnDef, DefaultValue};
use super::types::ColumnType;
use crate::error::{Error, Result};
use crate::value::Value;

/// A table definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDef {
    /// Table name (unique within the catalog).
    pub name: String,
    /// Column definitions, in declaration order.
    pub columns: Vec<ColumnDef>,
    /// Composite uniqueness constraints.
    #[serde(default)]
    pub unique: Vec<UniqueConstraint>,
}

/// Uniqueness across a set of columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniqueConstraint {
    /// Constraint (index) name.
    pub name: String,
    /// Columns that must be unique together.
    pub columns: Vec<String>,
}

impl TableDef {
    /// Create a new table definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            unique: Vec::new(),
        }
    }

    /// Add a column to the table.
    pub fn with_column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Add multiple columns.
    pub fn with_columns(mut self, columns: impl IntoIterator<Item = ColumnDef>) -> Self {
        self.columns.extend(columns);
        self
    }

    /// Add a composite unique constraint.
    pub fn with_unique(
        mut self,
        name: impl Into<String>,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.unique.push(UniqueConstraint {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Check if the table has a column.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Get the primary key column, if the table has one.
    pub fn primary_key(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.primary_key)
    }

    /// Check the definition is internally consistent.
    pub(crate) fn validate(&self) -> Result<()> {
        check_name("table", &self.name)?;
        if self.columns.is_empty() {
            return Err(Error::Schema(format!("table {} has no columns", self.name)));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            check_name("column", &column.name)?;
            if !seen.insert(column.name.as_str()) {
                return Err(Error::Schema(format!(
                    "table {} declares column {} more than once",
                    self.name, column.name
                )));
            }
            self.check_default(column)?;
        }

        let keys: Vec<_> = self.columns.iter().filter(|c| c.primary_key).collect();
        if keys.len() > 1 {
            return Err(Error::Schema(format!(
                "table {} declares more than one primary key",
                self.name
            )));
        }
        if let Some(key) = keys.first() {
            if !key.column_type.is_key_type() {
                return Err(Error::Schema(format!(
                    "primary key {}.{} must be int or string, got {}",
                    self.name, key.name, key.column_type
                )));
            }
        }

        for constraint in &self.unique {
            if constraint.columns.is_empty() {
                return Err(Error::Schema(format!(
                    "unique constraint {} on {} has no columns",
                    constraint.name, self.name
                )));
            }
            if let Some(missing) = constraint.columns.iter().find(|c| !self.has_column(c)) {
                return Err(Error::Schema(format!(
                    "unique constraint {} references unknown column {}.{}",
                    constraint.name, self.name, missing
                )));
            }
        }

        Ok(())
    }

    fn check_default(&self, column: &ColumnDef) -> Result<()> {
        let valid = match &column.default {
            None => true,
            Some(DefaultValue::CurrentTimestamp) => {
                matches!(column.column_type, ColumnType::Timestamp | ColumnType::Int)
            }
            Some(DefaultValue::Value(Value::List(_))) => false,
            Some(DefaultValue::Value(Value::Null)) => column.nullable,
            Some(DefaultValue::Value(value)) => column.column_type.accepts(value),
        };
        if !valid {
            return Err(Error::Schema(format!(
                "default of {}.{} does not fit a {} column",
                self.name, column.name, column.column_type
            )));
        }
        Ok(())
    }
}

/// Names take part in `alias.column` references, so they cannot contain a
/// separator or be the wildcard.
fn check_name(kind: &str, name: &str) -> Result<()> {
    if name.is_empty() || name.contains('.') || name == "*" {
        return Err(Error::Schema(format!("invalid {} name '{}'", kind, name)));
    }
    Ok(())
}
