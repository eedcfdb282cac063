//! Backing store access: configuration, connections and transactions.

mod config;
mod transaction;

pub use config::{DatabaseConfig, IdStrategy, SQLITE_SCHEME};
pub use transaction::Transaction;

use rusqlite::Connection;
use tracing::info;

use crate::error::Result;

/// Open the connection described by `config`.
pub(crate) fn open_connection(config: &DatabaseConfig) -> Result<Connection> {
    let conn = match config.path() {
        Some(path) => Connection::open(path)?,
        None => Connection::open_in_memory()?,
    };
    if let Some(timeout) = config.busy_timeout {
        conn.busy_timeout(timeout)?;
    }
    conn.pragma_update(None, "foreign_keys", true)?;
    info!(uri = %config.uri(), "opened database");
    Ok(conn)
}
