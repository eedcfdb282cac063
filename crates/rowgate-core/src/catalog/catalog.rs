//! The immutable table registry.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::{ColumnDef, TableDef};
use crate::error::{Error, Result};

/// Registry of table definitions.
///
/// Built once through [`CatalogBuilder`] (or loaded from a JSON document)
/// and read-only afterwards, so it can be shared between threads freely.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: BTreeMap<String, TableDef>,
}

/// Builder collecting table definitions before validation.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    tables: Vec<TableDef>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogDocument {
    tables: Vec<TableDef>,
}

impl Catalog {
    /// Start building a catalog.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Load a catalog from a JSON document of the form `{"tables": [...]}`.
    pub fn from_json(document: &str) -> Result<Self> {
        let document: CatalogDocument = serde_json::from_str(document)
            .map_err(|e| Error::Config(format!("invalid schema document: {}", e)))?;
        document
            .tables
            .into_iter()
            .fold(Catalog::builder(), CatalogBuilder::table)
            .build()
    }

    /// Get a table by name, failing if it does not exist.
    pub fn table(&self, name: &str) -> Result<&TableDef> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::Schema(format!("no table exists called {}", name)))
    }

    /// Get a table by name.
    pub fn get_table(&self, name: &str) -> Option<&TableDef> {
        self.tables.get(name)
    }

    /// Check whether `table` has a column called `column`.
    pub fn has_column(&self, table: &str, column: &str) -> bool {
        self.tables
            .get(table)
            .is_some_and(|t| t.has_column(column))
    }

    /// Get the primary key of a table.
    pub fn primary_key(&self, table: &str) -> Result<Option<&ColumnDef>> {
        Ok(self.table(table)?.primary_key())
    }

    /// List all table names, sorted.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Iterate over all tables, sorted by name.
    pub fn tables(&self) -> impl Iterator<Item = &TableDef> {
        self.tables.values()
    }

    /// Number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if the catalog has no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl CatalogBuilder {
    /// Add a table definition.
    pub fn table(mut self, table: TableDef) -> Self {
        self.tables.push(table);
        self
    }

    /// Validate every table and freeze the catalog.
    pub fn build(self) -> Result<Catalog> {
        let mut tables = BTreeMap::new();
        for table in self.tables {
            table.validate()?;
            if tables.contains_key(&table.name) {
                return Err(Error::Schema(format!(
                    "table {} is defined more than once",
                    table.name
                )));
            }
            tables.insert(table.name.clone(), table);
        }

        // Index names share one namespace with tables across the database.
        let mut indexes: BTreeMap<&str, &str> = BTreeMap::new();
        for table in tables.values() {
            for constraint in &table.unique {
                if tables.contains_key(&constraint.name) {
                    return Err(Error::Schema(format!(
                        "unique constraint {} on {} has the name of a table",
                        constraint.name, table.name
                    )));
                }
                if let Some(owner) = indexes.insert(&constraint.name, &table.name) {
                    return Err(Error::Schema(format!(
                        "unique constraint {} is declared on both {} and {}",
                        constraint.name, owner, table.name
                    )));
                }
            }
        }

        Ok(Catalog { tables })
    }
}
