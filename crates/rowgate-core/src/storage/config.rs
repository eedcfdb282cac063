//! Database configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// URI scheme for SQLite databases.
pub const SQLITE_SCHEME: &str = "sqlite://";

/// How primary keys are filled when a created row has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    /// Leave keys to the store.
    #[default]
    None,
    /// Random keys taken from the top `bits` bits of a v4 UUID.
    Uuid {
        /// Key width in bits, 1 to 63.
        bits: u32,
    },
    /// Increasing integers starting at `start`.
    Sequence {
        /// First key handed out.
        start: i64,
    },
}

/// Configuration for opening a [`Database`](crate::Database).
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database file. None means a private in-memory database.
    pub path: Option<PathBuf>,

    /// Key generation for created rows.
    pub id_strategy: IdStrategy,

    /// How long a connection waits on a locked database before failing.
    pub busy_timeout: Option<Duration>,

    /// Create missing tables and unique indexes when opening.
    pub create_tables: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            id_strategy: IdStrategy::None,
            busy_timeout: Some(Duration::from_secs(5)),
            create_tables: true,
        }
    }
}

impl DatabaseConfig {
    /// Configuration for a database file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Configuration for an in-memory database.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Parse `sqlite://` (in-memory) or `sqlite:///path/to/file.db`.
    pub fn from_uri(uri: &str) -> Result<Self> {
        let rest = uri.strip_prefix(SQLITE_SCHEME).ok_or_else(|| {
            Error::Config(format!(
                "unsupported database uri '{}', expected {}[/path]",
                uri, SQLITE_SCHEME
            ))
        })?;

        match rest {
            "" | "/:memory:" => Ok(Self::in_memory()),
            path if path.starts_with('/') && path.len() > 1 => Ok(Self::new(&path[1..])),
            _ => Err(Error::Config(format!(
                "database uri '{}' must be {} or {}/<path>",
                uri, SQLITE_SCHEME, SQLITE_SCHEME
            ))),
        }
    }

    /// Render the configuration back as a URI.
    pub fn uri(&self) -> String {
        match &self.path {
            Some(path) => format!("{}/{}", SQLITE_SCHEME, path.display()),
            None => SQLITE_SCHEME.to_string(),
        }
    }

    /// Database file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Set the key generation strategy.
    pub fn with_id_strategy(mut self, strategy: IdStrategy) -> Self {
        self.id_strategy = strategy;
        self
    }

    /// Set the busy timeout.
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = Some(timeout);
        self
    }

    /// Skip table creation at open time.
    pub fn without_table_creation(mut self) -> Self {
        self.create_tables = false;
        self
    }
}
