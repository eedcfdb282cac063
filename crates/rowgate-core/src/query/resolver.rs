//! Column and alias resolution.
//!
//! A reference is either `column` (against the base table) or
//! `alias.column`, where the alias is the base table's own name or an alias
//! declared by the request's joins.

use std::collections::BTreeMap;

use crate::catalog::{quote_ident, ColumnDef, ColumnType, TableDef};
use crate::error::{Error, Result};

/// Wildcard selecting every column of a table.
pub const ALL_COLUMNS: &str = "*";

/// Declared join aliases mapped to the table each one resolves to.
pub type AliasTables<'a> = BTreeMap<String, &'a TableDef>;

/// Resolves column references for one request.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    base: &'a TableDef,
    aliases: &'a AliasTables<'a>,
}

/// What a reference points at before wildcard expansion.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// A single column.
    Column(&'a ColumnDef),
    /// Every column of the table.
    Wildcard,
}

/// A resolved reference.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    /// Table the reference resolved to.
    pub table: &'a TableDef,
    /// Name the table goes by in the statement: the base table name or the alias.
    pub source: &'a str,
    /// Whether the reference was written as `alias.column`.
    pub qualified: bool,
    /// Column or wildcard.
    pub target: Target<'a>,
}

/// A single resolved column.
#[derive(Debug, Clone, Copy)]
pub struct ColumnRef<'a> {
    /// Table the column belongs to.
    pub table: &'a TableDef,
    /// Name the table goes by in the statement.
    pub source: &'a str,
    /// The column.
    pub column: &'a ColumnDef,
}

/// A column in a select list, with the label it is returned under.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    /// Qualified SQL expression.
    pub sql: String,
    /// Field label in result rows.
    pub label: String,
    /// Type used to decode values.
    pub column_type: ColumnType,
}

impl<'a> Resolver<'a> {
    /// Create a resolver for `base` and the given join aliases.
    pub fn new(base: &'a TableDef, aliases: &'a AliasTables<'a>) -> Self {
        Self { base, aliases }
    }

    /// The base table.
    pub fn base(&self) -> &'a TableDef {
        self.base
    }

    /// Resolve a reference, allowing the wildcard.
    pub fn resolve(&self, reference: &str) -> Result<Resolved<'a>> {
        let (qualifier, name) = match reference.split_once('.') {
            None => (None, reference),
            Some((_, rest)) if rest.contains('.') => {
                return Err(Error::Schema(format!(
                    "too many components in column '{}', format must be either \
                     'column' or 'alias.column'",
                    reference
                )));
            }
            Some((alias, rest)) => (Some(alias), rest),
        };

        let (table, source) = match qualifier {
            None => (self.base, self.base.name.as_str()),
            Some(alias) if alias == self.base.name => (self.base, self.base.name.as_str()),
            Some(alias) => self
                .aliases
                .get_key_value(alias)
                .map(|(key, table)| (*table, key.as_str()))
                .ok_or_else(|| {
                    Error::Schema(format!(
                        "column '{}' requires alias that wasn't provided: {}",
                        reference, alias
                    ))
                })?,
        };

        let target = if name == ALL_COLUMNS {
            Target::Wildcard
        } else {
            Target::Column(table.column(name).ok_or_else(|| {
                Error::Schema(format!("table {} has no column {}", table.name, name))
            })?)
        };

        Ok(Resolved {
            table,
            source,
            qualified: qualifier.is_some(),
            target,
        })
    }

    /// Resolve a reference that must name a single column.
    pub fn resolve_column(&self, reference: &str) -> Result<ColumnRef<'a>> {
        let resolved = self.resolve(reference)?;
        match resolved.target {
            Target::Column(column) => Ok(ColumnRef {
                table: resolved.table,
                source: resolved.source,
                column,
            }),
            Target::Wildcard => Err(Error::Schema(format!(
                "wildcard '{}' is only valid in a column list",
                reference
            ))),
        }
    }

    /// Resolve one entry of a column list, expanding wildcards.
    ///
    /// Qualified references keep their `alias.column` label so columns with
    /// the same name from different tables stay apart; bare references use
    /// the column name.
    pub fn select(&self, reference: &str) -> Result<Vec<SelectColumn>> {
        let resolved = self.resolve(reference)?;
        let columns = match resolved.target {
            Target::Column(column) => vec![SelectColumn {
                sql: qualified_sql(resolved.source, &column.name),
                label: reference.to_string(),
                column_type: column.column_type,
            }],
            Target::Wildcard => resolved
                .table
                .columns
                .iter()
                .map(|column| SelectColumn {
                    sql: qualified_sql(resolved.source, &column.name),
                    label: if resolved.qualified {
                        format!("{}.{}", resolved.source, column.name)
                    } else {
                        column.name.clone()
                    },
                    column_type: column.column_type,
                })
                .collect(),
        };
        Ok(columns)
    }

    /// Resolve a full column list.
    pub fn select_list(&self, references: &[String]) -> Result<Vec<SelectColumn>> {
        let mut columns = Vec::new();
        for reference in references {
            columns.extend(self.select(reference)?);
        }
        Ok(columns)
    }
}

impl ColumnRef<'_> {
    /// Qualified SQL expression for the column.
    pub fn sql(&self) -> String {
        qualified_sql(self.source, &self.column.name)
    }
}

pub(crate) fn qualified_sql(source: &str, column: &str) -> String {
    format!("{}.{}", quote_ident(source), quote_ident(column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ColumnDef;

    fn shot() -> TableDef {
        TableDef::new("Shot")
            .with_column(ColumnDef::new("id", ColumnType::Int).primary_key())
            .with_column(ColumnDef::new("name", ColumnType::String))
    }

    fn asset() -> TableDef {
        TableDef::new("Asset")
            .with_column(ColumnDef::new("id", ColumnType::Int).primary_key())
            .with_column(ColumnDef::new("name", ColumnType::String))
            .with_column(ColumnDef::new("variant", ColumnType::String))
    }

    #[test]
    fn test_bare_and_self_qualified() {
        let shot = shot();
        let aliases = AliasTables::new();
        let resolver = Resolver::new(&shot, &aliases);

        let column = resolver.resolve_column("name").unwrap();
        assert_eq!(column.sql(), "\"Shot\".\"name\"");

        let column = resolver.resolve_column("Shot.id").unwrap();
        assert_eq!(column.table.name, "Shot");
        assert_eq!(column.column.name, "id");
    }

    #[test]
    fn test_alias_resolves_to_joined_table() {
        let shot = shot();
        let asset = asset();
        let mut aliases = AliasTables::new();
        aliases.insert("Props".to_string(), &asset);
        let resolver = Resolver::new(&shot, &aliases);

        let column = resolver.resolve_column("Props.variant").unwrap();
        assert_eq!(column.table.name, "Asset");
        assert_eq!(column.sql(), "\"Props\".\"variant\"");
    }

    #[test]
    fn test_schema_errors() {
        let shot = shot();
        let aliases = AliasTables::new();
        let resolver = Resolver::new(&shot, &aliases);

        for reference in ["banana", "Asset.name", "a.b.c", "Shot.banana", ""] {
            assert!(
                matches!(resolver.resolve(reference), Err(Error::Schema(_))),
                "{reference} should fail"
            );
        }
        assert!(matches!(resolver.resolve_column("*"), Err(Error::Schema(_))));
    }

    #[test]
    fn test_select_labels() {
        let shot = shot();
        let asset = asset();
        let mut aliases = AliasTables::new();
        aliases.insert("Asset".to_string(), &asset);
        let resolver = Resolver::new(&shot, &aliases);

        let labels = |reference: &str| -> Vec<String> {
            resolver
                .select(reference)
                .unwrap()
                .into_iter()
                .map(|c| c.label)
                .collect()
        };

        assert_eq!(labels("*"), vec!["id", "name"]);
        assert_eq!(labels("name"), vec!["name"]);
        assert_eq!(labels("Shot.*"), vec!["Shot.id", "Shot.name"]);
        assert_eq!(labels("Asset.name"), vec!["Asset.name"]);
        assert_eq!(
            labels("Asset.*"),
            vec!["Asset.id", "Asset.name", "Asset.variant"]
        );
    }
}
