//! Turns requests into parameterized statements.
//!
//! Every table, column and alias is checked against the catalog here, so a
//! request that fails validation never reaches the backing store.

use tracing::trace;

use super::filter::{FilterCompiler, FilterTree};
use super::join::JoinCompiler;
use super::request::ReadRequest;
use super::resolver::{AliasTables, Resolver, SelectColumn, ALL_COLUMNS};
use super::statement::Statement;
use crate::catalog::{quote_ident, Catalog, TableDef};
use crate::error::{Error, Result};
use crate::value::{RowValues, Value};

/// A compiled read: the statement plus how to label and decode each column.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadPlan {
    /// `SELECT` statement.
    pub statement: Statement,
    /// Output columns, in statement order.
    pub columns: Vec<SelectColumn>,
}

/// Plans statements against a catalog.
pub struct QueryPlanner<'c> {
    catalog: &'c Catalog,
}

impl<'c> QueryPlanner<'c> {
    /// Create a planner over `catalog`.
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    /// Plan a read.
    pub fn plan_read(&self, request: &ReadRequest) -> Result<ReadPlan> {
        let table = self.catalog.table(&request.tablename)?;
        let limit = request.limit.map(validate_limit).transpose()?;

        let (join_plan, aliases) = match &request.joins {
            Some(joins) => JoinCompiler::new(self.catalog).compile(table, joins)?,
            None => Default::default(),
        };
        let resolver = Resolver::new(table, &aliases);

        let columns = if request.columns.is_empty() {
            resolver.select(ALL_COLUMNS)?
        } else {
            resolver.select_list(&request.columns)?
        };
        let predicate = compile_filters(&resolver, request.filters.as_ref())?;

        let mut order_terms = Vec::new();
        for (reference, order) in request.ordering.iter().flatten() {
            let column = resolver.resolve_column(reference)?;
            order_terms.push(format!("{} {}", column.sql(), order.sql()));
        }

        let select_list: Vec<&str> = columns.iter().map(|c| c.sql.as_str()).collect();
        let mut statement = Statement::new(format!(
            "SELECT {} FROM {}",
            select_list.join(", "),
            quote_ident(&table.name)
        ));
        statement.append(join_plan.to_statement());
        if let Some(predicate) = predicate {
            statement.push_sql(" WHERE ");
            statement.append(predicate);
        }
        if !order_terms.is_empty() {
            statement.push_sql(" ORDER BY ");
            statement.push_sql(&order_terms.join(", "));
        }
        if let Some(limit) = limit {
            statement.push_sql(" LIMIT ");
            statement.push_param(Value::Int(limit));
        }

        trace!(table = %table.name, joins = join_plan.steps().len(), "planned read");
        Ok(ReadPlan { statement, columns })
    }

    /// Plan the insert of one row. Values must already include any generated key.
    pub fn plan_insert(&self, table: &TableDef, row: &RowValues) -> Result<Statement> {
        check_values(table, row)?;
        if row.is_empty() {
            return Ok(Statement::new(format!(
                "INSERT INTO {} DEFAULT VALUES",
                quote_ident(&table.name)
            )));
        }

        let names: Vec<String> = row.keys().map(|name| quote_ident(name)).collect();
        let mut statement = Statement::new(format!(
            "INSERT INTO {} ({}) VALUES (",
            quote_ident(&table.name),
            names.join(", ")
        ));
        for (i, value) in row.values().enumerate() {
            if i > 0 {
                statement.push_sql(", ");
            }
            statement.push_param(value.clone());
        }
        statement.push_sql(")");
        Ok(statement)
    }

    /// Plan an update of `values` on every row matching `filters`.
    pub fn plan_update(
        &self,
        tablename: &str,
        values: &RowValues,
        filters: Option<&serde_json::Value>,
    ) -> Result<Statement> {
        let table = self.catalog.table(tablename)?;
        if values.is_empty() {
            return Err(Error::InvalidRequest(format!(
                "update on {} requires at least one value",
                table.name
            )));
        }
        check_values(table, values)?;

        let aliases = AliasTables::new();
        let predicate = compile_filters(&Resolver::new(table, &aliases), filters)?;

        let mut statement = Statement::new(format!("UPDATE {} SET ", quote_ident(&table.name)));
        for (i, (name, value)) in values.iter().enumerate() {
            if i > 0 {
                statement.push_sql(", ");
            }
            statement.push_sql(&quote_ident(name));
            statement.push_sql(" = ");
            statement.push_param(value.clone());
        }
        push_where(&mut statement, predicate);
        Ok(statement)
    }

    /// Plan a delete of every row matching `filters`.
    pub fn plan_delete(
        &self,
        tablename: &str,
        filters: Option<&serde_json::Value>,
    ) -> Result<Statement> {
        let table = self.catalog.table(tablename)?;
        let aliases = AliasTables::new();
        let predicate = compile_filters(&Resolver::new(table, &aliases), filters)?;

        let mut statement = Statement::new(format!("DELETE FROM {}", quote_ident(&table.name)));
        push_where(&mut statement, predicate);
        Ok(statement)
    }
}

fn compile_filters(
    resolver: &Resolver<'_>,
    filters: Option<&serde_json::Value>,
) -> Result<Option<Statement>> {
    match filters {
        Some(raw) => {
            let tree = FilterTree::parse(raw)?;
            FilterCompiler::new(resolver).compile(&tree)
        }
        None => Ok(None),
    }
}

fn push_where(statement: &mut Statement, predicate: Option<Statement>) {
    if let Some(predicate) = predicate {
        statement.push_sql(" WHERE ");
        statement.append(predicate);
    }
}

fn validate_limit(limit: u64) -> Result<i64> {
    match i64::try_from(limit) {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err(Error::InvalidRequest(format!(
            "limit must be a positive integer, got {}",
            limit
        ))),
    }
}

/// Check that every value names a column of `table` and fits its type.
pub(crate) fn check_values(table: &TableDef, values: &RowValues) -> Result<()> {
    for (name, value) in values {
        let column = table.column(name).ok_or_else(|| {
            Error::Schema(format!("table {} has no column {}", table.name, name))
        })?;
        if !column.column_type.accepts(value) {
            return Err(Error::Database(format!(
                "column {}.{} expects {}, got {}",
                table.name,
                name,
                column.column_type,
                value.type_name()
            )));
        }
        if value.is_null() && !column.nullable && !column.primary_key {
            return Err(Error::Database(format!(
                "column {}.{} may not be null",
                table.name, name
            )));
        }
    }
    Ok(())
}
