//! Output formatters for request results.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use rowgate_core::{Catalog, CommandResult, Response, Row, Value};

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter: Send + Sync {
    /// Format the response to one request.
    fn format_response(&self, response: &Response) -> String;

    /// Format an error message.
    fn format_error(&self, error: &str) -> String;

    /// Format the tables of a catalog.
    fn format_tables(&self, catalog: &Catalog) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_response(&self, response: &Response) -> String {
        match response {
            Response::Rows(rows) => format_rows_as_table(rows),
            Response::Ids(ids) => format_ids(ids),
            Response::Count(count) => format!("{} row(s) affected", count),
            Response::Batch(results) => results
                .iter()
                .enumerate()
                .map(|(i, result)| match result {
                    CommandResult::Ids(ids) => format!("[{}] {}", i, format_ids(ids)),
                    CommandResult::Count(count) => format!("[{}] {} row(s) affected", i, count),
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {}", error)
    }

    fn format_tables(&self, catalog: &Catalog) -> String {
        let mut table = Table::new();
        table.set_header(vec!["Table", "Columns", "Primary key"]);

        for def in catalog.tables() {
            let columns: Vec<String> = def
                .columns
                .iter()
                .map(|c| format!("{}: {}", c.name, c.column_type))
                .collect();
            let key = def.primary_key().map(|c| c.name.as_str()).unwrap_or("-");
            table.add_row(vec![def.name.clone(), columns.join(", "), key.to_string()]);
        }

        table.to_string()
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_response(&self, response: &Response) -> String {
        serde_json::to_string_pretty(response).unwrap_or_else(|_| "null".to_string())
    }

    fn format_error(&self, error: &str) -> String {
        serde_json::json!({ "error": error }).to_string()
    }

    fn format_tables(&self, catalog: &Catalog) -> String {
        let tables: Vec<_> = catalog.tables().collect();
        serde_json::to_string_pretty(&tables).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Format rows as a table, using the first row's labels as the header.
fn format_rows_as_table(rows: &[Row]) -> String {
    let Some(first) = rows.first() else {
        return "No results".to_string();
    };

    let mut table = Table::new();
    table.set_header(first.labels().map(Cell::new).collect::<Vec<_>>());
    for row in rows {
        table.add_row(row.values().map(Cell::new).collect::<Vec<_>>());
    }

    format!("{}\n{} row(s)", table, rows.len())
}

fn format_ids(ids: &[Value]) -> String {
    let ids: Vec<String> = ids.iter().map(Value::to_string).collect();
    format!("created {} row(s): {}", ids.len(), ids.join(", "))
}
