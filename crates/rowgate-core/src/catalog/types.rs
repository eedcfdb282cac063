//! Column type definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Semantic column types supported by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// UTF-8 string.
    String,
    /// 64-bit signed integer.
    Int,
    /// 64-bit floating point.
    Float,
    /// Boolean value.
    Bool,
    /// Seconds since the Unix epoch.
    Timestamp,
}

impl ColumnType {
    /// Declared type used in generated DDL.
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::String => "TEXT",
            ColumnType::Int | ColumnType::Timestamp => "INTEGER",
            ColumnType::Float => "REAL",
            ColumnType::Bool => "BOOLEAN",
        }
    }

    /// Check whether a non-null value can be stored in a column of this type.
    ///
    /// Null handling is left to the column's nullability.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (ColumnType::String, Value::String(_)) => true,
            (ColumnType::Int | ColumnType::Timestamp, Value::Int(_)) => true,
            (ColumnType::Float, Value::Int(_) | Value::Float(_)) => true,
            (ColumnType::Bool, Value::Bool(_)) => true,
            _ => false,
        }
    }

    /// Whether primary keys of this type can be generated.
    pub fn is_key_type(&self) -> bool {
        matches!(self, ColumnType::Int | ColumnType::String)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::String => "string",
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Bool => "bool",
            ColumnType::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}
