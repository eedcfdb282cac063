//! Filter trees: parsing structured filter input and compiling it to a
//! SQL predicate.
//!
//! Input shape:
//!
//! ```text
//! {"eq": {"name": "First", "Asset.id": 2},
//!  "or": [{"lt": {"id": 3}}, {"like": {"name": "%d"}}]}
//! ```
//!
//! Sibling keys combine with AND, `or` takes a list of sub-trees, and every
//! other key must be a comparison operator mapping columns to comparands.

use super::compare::CompareOp;
use super::resolver::Resolver;
use super::statement::Statement;
use crate::error::{Error, Result};
use crate::value::Value;

/// Key introducing a disjunction of sub-trees.
pub const FILTER_OR: &str = "or";

/// A parsed filter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterTree {
    /// A single column comparison.
    Comparison {
        /// Operator.
        op: CompareOp,
        /// Column reference, `column` or `alias.column`.
        column: String,
        /// Comparand; a list for `in` / `not_in`.
        value: Value,
    },
    /// All children must match.
    And(Vec<FilterTree>),
    /// Any child must match.
    Or(Vec<FilterTree>),
}

impl FilterTree {
    /// Parse structured filter input.
    ///
    /// Shape problems are `InvalidFilters`; comparand problems are raised as
    /// `InvalidComparison` and reported as `InvalidFilters` here.
    pub fn parse(raw: &serde_json::Value) -> Result<Self> {
        let map = raw.as_object().ok_or_else(|| {
            Error::InvalidFilters(format!(
                "filters must be a mapping, got {}",
                json_type_name(raw)
            ))
        })?;

        let mut children = Vec::new();
        for (key, value) in map {
            if key == FILTER_OR {
                children.push(Self::parse_or(value)?);
                continue;
            }

            let op = CompareOp::parse(key).ok_or_else(|| {
                Error::InvalidFilters(format!("'{}' is not a valid comparison method", key))
            })?;
            let comparisons = value.as_object().ok_or_else(|| {
                Error::InvalidFilters(format!(
                    "'{}' filter requires a mapping of columns and values, got {}",
                    key,
                    json_type_name(value)
                ))
            })?;

            for (column, comparand) in comparisons {
                let value = comparand_value(op, column, comparand).map_err(|e| match e {
                    Error::InvalidComparison(message) => Error::InvalidFilters(message),
                    other => other,
                })?;
                children.push(FilterTree::Comparison {
                    op,
                    column: column.clone(),
                    value,
                });
            }
        }

        Ok(FilterTree::And(children))
    }

    fn parse_or(raw: &serde_json::Value) -> Result<Self> {
        let items = raw.as_array().ok_or_else(|| {
            Error::InvalidFilters(format!(
                "'or' filter requires a list of filters, got {}",
                json_type_name(raw)
            ))
        })?;
        if items.is_empty() {
            return Err(Error::InvalidFilters(
                "'or' filter requires at least one filter".to_string(),
            ));
        }
        Ok(FilterTree::Or(
            items.iter().map(Self::parse).collect::<Result<_>>()?,
        ))
    }

    /// Build a single comparison.
    pub fn compare(op: CompareOp, column: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterTree::Comparison {
            op,
            column: column.into(),
            value: value.into(),
        }
    }

    /// Equality comparison.
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(CompareOp::Eq, column, value)
    }

    /// Check if the tree constrains nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterTree::Comparison { .. } => false,
            FilterTree::And(children) => children.iter().all(FilterTree::is_empty),
            FilterTree::Or(_) => false,
        }
    }

    /// All column references in the tree, in order of appearance.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns = Vec::new();
        self.collect_columns(&mut columns);
        columns
    }

    fn collect_columns<'t>(&'t self, out: &mut Vec<&'t str>) {
        match self {
            FilterTree::Comparison { column, .. } => out.push(column),
            FilterTree::And(children) | FilterTree::Or(children) => {
                for child in children {
                    child.collect_columns(out);
                }
            }
        }
    }
}

/// Validate a comparand against its operator.
fn comparand_value(op: CompareOp, column: &str, raw: &serde_json::Value) -> Result<Value> {
    let mismatch = |expected: &str| {
        Error::InvalidComparison(format!(
            "comparison '{}' expects {} for column '{}', got {}",
            op,
            expected,
            column,
            json_type_name(raw)
        ))
    };

    let value = Value::from_json(raw).ok_or_else(|| mismatch("a scalar value"))?;
    match op {
        CompareOp::In | CompareOp::NotIn => match &value {
            Value::List(items) if items.iter().all(|v| !v.is_list()) => Ok(value),
            _ => Err(mismatch("a list of scalar values")),
        },
        CompareOp::Like | CompareOp::Unlike => match value {
            Value::String(_) => Ok(value),
            _ => Err(mismatch("a string pattern")),
        },
        CompareOp::Lt | CompareOp::Le | CompareOp::Gt | CompareOp::Ge => match value {
            Value::List(_) | Value::Null => Err(mismatch("a non-null scalar value")),
            _ => Ok(value),
        },
        CompareOp::Eq | CompareOp::Ne => match value {
            Value::List(_) => Err(mismatch("a scalar value")),
            _ => Ok(value),
        },
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(n) if n.is_f64() => "float",
        serde_json::Value::Number(_) => "int",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "mapping",
    }
}

/// Compiles filter trees into SQL predicates.
pub struct FilterCompiler<'r> {
    resolver: &'r Resolver<'r>,
}

impl<'r> FilterCompiler<'r> {
    /// Create a compiler resolving columns through `resolver`.
    pub fn new(resolver: &'r Resolver<'r>) -> Self {
        Self { resolver }
    }

    /// Compile a tree. Returns `None` when the tree constrains nothing.
    ///
    /// Unknown columns and undeclared aliases surface as `Schema` errors.
    pub fn compile(&self, tree: &FilterTree) -> Result<Option<Statement>> {
        if tree.is_empty() {
            return Ok(None);
        }
        let mut predicate = Statement::default();
        self.compile_node(tree, &mut predicate)?;
        Ok(Some(predicate))
    }

    fn compile_node(&self, tree: &FilterTree, out: &mut Statement) -> Result<()> {
        match tree {
            FilterTree::Comparison { op, column, value } => {
                self.compile_comparison(*op, column, value, out)
            }
            FilterTree::And(children) => {
                let children: Vec<_> = children.iter().filter(|c| !c.is_empty()).collect();
                self.compile_joined(&children, " AND ", children.len() > 1, out)
            }
            FilterTree::Or(children) => {
                let children: Vec<_> = children.iter().collect();
                // Always grouped so nesting under AND keeps its meaning.
                out.push_sql("(");
                self.compile_joined(&children, " OR ", true, out)?;
                out.push_sql(")");
                Ok(())
            }
        }
    }

    fn compile_joined(
        &self,
        children: &[&FilterTree],
        separator: &str,
        group: bool,
        out: &mut Statement,
    ) -> Result<()> {
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                out.push_sql(separator);
            }
            let wrap = group && matches!(child, FilterTree::And(_));
            if wrap {
                out.push_sql("(");
            }
            if child.is_empty() {
                // An empty branch of an `or` matches everything.
                out.push_sql("1");
            } else {
                self.compile_node(child, out)?;
            }
            if wrap {
                out.push_sql(")");
            }
        }
        Ok(())
    }

    fn compile_comparison(
        &self,
        op: CompareOp,
        column: &str,
        value: &Value,
        out: &mut Statement,
    ) -> Result<()> {
        let column = self.resolver.resolve_column(column)?;
        out.push_sql(&column.sql());
        out.push_sql(" ");
        out.push_sql(op.sql());
        out.push_sql(" ");

        match (op.takes_list(), value) {
            (true, Value::List(items)) => {
                out.push_sql("(");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_sql(", ");
                    }
                    out.push_param(item.clone());
                }
                out.push_sql(")");
            }
            (false, value) if !value.is_list() => out.push_param(value.clone()),
            _ => {
                return Err(Error::InvalidFilters(format!(
                    "comparison '{}' got unexpected type {} for column '{}'",
                    op,
                    value.type_name(),
                    column.column.name
                )))
            }
        }
        Ok(())
    }
}
