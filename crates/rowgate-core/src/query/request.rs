//! Read requests and result rows.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::join::JoinSpec;
use super::resolver::ALL_COLUMNS;
use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// Ascending.
    #[serde(alias = "Asc", alias = "ASC")]
    Asc,
    /// Descending.
    #[serde(alias = "Desc", alias = "DESC")]
    Desc,
}

impl Order {
    /// SQL keyword.
    pub fn sql(&self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

fn default_columns() -> Vec<String> {
    vec![ALL_COLUMNS.to_string()]
}

/// Arguments of a read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadRequest {
    /// Base table.
    pub tablename: String,
    /// Column references to return; `*` expands to every column.
    #[serde(default = "default_columns", alias = "colnames")]
    pub columns: Vec<String>,
    /// Filter tree in its structured form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<serde_json::Value>,
    /// Join declarations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joins: Option<JoinSpec>,
    /// Maximum number of rows; must be positive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// `(column, direction)` pairs in priority order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordering: Option<Vec<(String, Order)>>,
}

impl ReadRequest {
    /// Read every column of `tablename`.
    pub fn new(tablename: impl Into<String>) -> Self {
        Self {
            tablename: tablename.into(),
            columns: default_columns(),
            filters: None,
            joins: None,
            limit: None,
            ordering: None,
        }
    }

    /// Set the column list.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the filter tree.
    pub fn filters(mut self, filters: serde_json::Value) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Declare a join alias.
    pub fn join<I, S>(mut self, alias: impl Into<String>, steps: I) -> Self
    where
        I: IntoIterator<Item = [S; 4]>,
        S: Into<String>,
    {
        let chain = steps
            .into_iter()
            .map(|step| step.into_iter().map(Into::into).collect())
            .collect();
        self.joins
            .get_or_insert_with(JoinSpec::new)
            .insert(alias.into(), chain);
        self
    }

    /// Append an ordering term.
    pub fn order_by(mut self, column: impl Into<String>, order: Order) -> Self {
        self.ordering
            .get_or_insert_with(Vec::new)
            .push((column.into(), order));
        self
    }

    /// Bound the number of rows.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One result row: labels and values in select-list order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    /// Value under `label`.
    pub fn get(&self, label: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, value)| value)
    }

    /// Labels in order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(label, _)| label.as_str())
    }

    /// Values in order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, value)| value)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn push(&mut self, label: String, value: Value) {
        self.fields.push((label, value));
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (label, value) in &self.fields {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

/// Rows returned by a read.
///
/// Results are fetched in full before the read's transaction ends, so the
/// iterator holds no connection and is unaffected by later writes.
#[derive(Debug)]
pub struct Rows {
    inner: std::vec::IntoIter<Row>,
}

impl Rows {
    pub(crate) fn new(rows: Vec<Row>) -> Self {
        Self {
            inner: rows.into_iter(),
        }
    }
}

impl Iterator for Rows {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Rows {}
