//! DDL generation for catalog tables.

use super::{Catalog, ColumnDef, ColumnType, DefaultValue, TableDef};
use crate::value::Value;

/// Quote an identifier for use in SQL text.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

impl Catalog {
    /// DDL statements creating every table and unique index, idempotently.
    pub fn create_statements(&self) -> Vec<String> {
        self.tables().flat_map(TableDef::create_statements).collect()
    }
}

impl TableDef {
    /// DDL statements creating this table and its composite unique indexes.
    pub fn create_statements(&self) -> Vec<String> {
        let columns: Vec<String> = self.columns.iter().map(column_sql).collect();
        let mut statements = vec![format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_ident(&self.name),
            columns.join(", ")
        )];

        for constraint in &self.unique {
            let columns: Vec<String> = constraint.columns.iter().map(|c| quote_ident(c)).collect();
            statements.push(format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ({})",
                quote_ident(&constraint.name),
                quote_ident(&self.name),
                columns.join(", ")
            ));
        }

        statements
    }
}

fn column_sql(column: &ColumnDef) -> String {
    let mut sql = format!(
        "{} {}",
        quote_ident(&column.name),
        column.column_type.sql_type()
    );

    if column.primary_key {
        sql.push_str(" PRIMARY KEY");
        // INTEGER PRIMARY KEY aliases the rowid and is assigned when omitted.
        if column.column_type != ColumnType::Int {
            sql.push_str(" NOT NULL");
        }
    } else if !column.nullable {
        sql.push_str(" NOT NULL");
    }

    if column.unique {
        sql.push_str(" UNIQUE");
    }

    if let Some(default) = &column.default {
        sql.push_str(" DEFAULT ");
        sql.push_str(&default_sql(default));
    }

    sql
}

fn default_sql(default: &DefaultValue) -> String {
    match default {
        DefaultValue::CurrentTimestamp => "(CAST(strftime('%s', 'now') AS INTEGER))".to_string(),
        DefaultValue::Value(value) => literal_sql(value),
    }
}

fn literal_sql(value: &Value) -> String {
    match value {
        Value::Null | Value::List(_) => "NULL".to_string(),
        Value::Bool(b) => i64::from(*b).to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format!("{:?}", f),
        Value::String(s) => format!("'{}'", s.replace('\'', "''")),
    }
}
