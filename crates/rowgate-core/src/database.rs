//! The query executor: create, read, update and delete against a catalog.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;
use rusqlite::Connection;
use tracing::{debug, warn};

use crate::catalog::{Catalog, TableDef};
use crate::command::{Request, Response};
use crate::error::{Error, Result};
use crate::id::{generator_for, IdGenerator};
use crate::query::{QueryPlanner, ReadRequest, Rows};
use crate::storage::{open_connection, DatabaseConfig, Transaction};
use crate::value::{RowValues, Value};

/// Attempts at generating a key that is not already used within one create.
const MAX_ID_ATTEMPTS: usize = 16;

/// A database opened against a catalog.
///
/// Every operation takes an optional transaction. With `None` the operation
/// runs in its own transaction; with `Some` it joins the given one, which is
/// how a batch shares a single transaction between its commands.
///
/// The connection is held for the duration of a transaction, so operations
/// inside [`Database::transaction`] must pass the handle they were given.
/// Opening a second transaction on the same thread fails with
/// [`Error::InvalidRequest`].
pub struct Database {
    conn: Mutex<Connection>,
    owner: Mutex<Option<ThreadId>>,
    catalog: Arc<Catalog>,
    ids: Option<Box<dyn IdGenerator>>,
    config: DatabaseConfig,
}

impl Database {
    /// Open a database, creating the catalog's tables if configured to.
    pub fn open(config: DatabaseConfig, catalog: impl Into<Arc<Catalog>>) -> Result<Self> {
        let catalog = catalog.into();
        let conn = open_connection(&config)?;

        if config.create_tables {
            let statements = catalog.create_statements();
            for sql in &statements {
                conn.execute_batch(sql)?;
            }
            debug!(tables = catalog.len(), statements = statements.len(), "created tables");
        }

        Ok(Self {
            conn: Mutex::new(conn),
            owner: Mutex::new(None),
            catalog,
            ids: generator_for(config.id_strategy)?,
            config,
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory(catalog: impl Into<Arc<Catalog>>) -> Result<Self> {
        Self::open(DatabaseConfig::in_memory(), catalog)
    }

    /// Replace the key generator.
    pub fn with_id_generator(mut self, generator: impl IdGenerator + 'static) -> Self {
        self.ids = Some(Box::new(generator));
        self
    }

    /// The catalog requests are validated against.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Configuration the database was opened with.
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Check if `table` has a column called `column`.
    pub fn has_column(&self, table: &str, column: &str) -> bool {
        self.catalog.has_column(table, column)
    }

    /// Run `f` in a new transaction.
    ///
    /// Commits when `f` returns `Ok`, rolls back when it returns `Err`.
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let current = thread::current().id();
        if *self.owner.lock() == Some(current) {
            return Err(Error::InvalidRequest(
                "a transaction is already open on this thread; pass it to nested calls"
                    .to_string(),
            ));
        }
        let mut conn = self.conn.lock();
        let _owner = OwnerGuard::claim(&self.owner, current);
        let txn = Transaction::begin(&mut *conn)?;
        match f(&txn) {
            Ok(value) => {
                txn.commit()?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = txn.rollback() {
                    warn!(error = %rollback, "rollback failed");
                }
                Err(e)
            }
        }
    }

    /// Join `txn` if given, otherwise run in a transaction of our own.
    pub(crate) fn scope<T, F>(&self, txn: Option<&Transaction<'_>>, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        match txn {
            Some(txn) => f(txn),
            None => self.transaction(f),
        }
    }

    /// Insert rows, returning each row's key in input order.
    ///
    /// Rows without a key get one from the configured generator; keys the
    /// caller supplied are kept. Without a generator, or on a table without
    /// a primary key, the store-assigned row id is returned.
    pub fn create(
        &self,
        tablename: &str,
        rows: &[RowValues],
        txn: Option<&Transaction<'_>>,
    ) -> Result<Vec<Value>> {
        let table = self.catalog.table(tablename)?;
        let planner = QueryPlanner::new(&self.catalog);
        let key = table.primary_key().map(|column| column.name.as_str());

        let mut used: HashSet<String> = HashSet::new();
        if let Some(key) = key {
            used.extend(
                rows.iter()
                    .filter_map(|row| row.get(key))
                    .filter(|value| !value.is_null())
                    .map(Value::to_string),
            );
        }

        let mut planned = Vec::with_capacity(rows.len());
        for row in rows {
            let mut row = row.clone();
            let id = match key {
                Some(key) => {
                    let supplied = row.get(key).filter(|value| !value.is_null()).cloned();
                    match (supplied, &self.ids) {
                        (Some(value), _) => Some(value),
                        (None, Some(ids)) => {
                            let id = self.generate_unique(ids.as_ref(), table, &mut used)?;
                            row.insert(key.to_string(), id.clone());
                            Some(id)
                        }
                        (None, None) => {
                            row.remove(key);
                            None
                        }
                    }
                }
                None => None,
            };
            planned.push((planner.plan_insert(table, &row)?, id));
        }

        self.scope(txn, |txn| {
            let mut ids = Vec::with_capacity(planned.len());
            for (statement, id) in planned {
                txn.execute(&statement)?;
                ids.push(id.unwrap_or_else(|| Value::Int(txn.last_insert_rowid())));
            }
            debug!(table = %table.name, rows = ids.len(), "created rows");
            Ok(ids)
        })
    }

    fn generate_unique(
        &self,
        ids: &dyn IdGenerator,
        table: &TableDef,
        used: &mut HashSet<String>,
    ) -> Result<Value> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = ids.generate(table)?;
            if used.insert(id.to_string()) {
                return Ok(id);
            }
        }
        Err(Error::Database(format!(
            "could not generate a unique key for {} after {} attempts",
            table.name, MAX_ID_ATTEMPTS
        )))
    }

    /// Read rows.
    pub fn read(&self, request: &ReadRequest, txn: Option<&Transaction<'_>>) -> Result<Rows> {
        let plan = QueryPlanner::new(&self.catalog).plan_read(request)?;
        let rows = self.scope(txn, |txn| txn.query(&plan))?;
        Ok(Rows::new(rows))
    }

    /// Set `values` on every row matching `filters`, returning the number
    /// of rows changed. Without filters every row is updated.
    pub fn update(
        &self,
        tablename: &str,
        values: &RowValues,
        filters: Option<&serde_json::Value>,
        txn: Option<&Transaction<'_>>,
    ) -> Result<usize> {
        let statement = QueryPlanner::new(&self.catalog).plan_update(tablename, values, filters)?;
        self.scope(txn, |txn| txn.execute(&statement))
    }

    /// Delete every row matching `filters`, returning the number of rows
    /// removed. Without filters every row is deleted.
    pub fn delete(
        &self,
        tablename: &str,
        filters: Option<&serde_json::Value>,
        txn: Option<&Transaction<'_>>,
    ) -> Result<usize> {
        let statement = QueryPlanner::new(&self.catalog).plan_delete(tablename, filters)?;
        self.scope(txn, |txn| txn.execute(&statement))
    }

    /// Execute any top-level request.
    pub fn execute(&self, request: &Request, txn: Option<&Transaction<'_>>) -> Result<Response> {
        match request {
            Request::Create(args) => self
                .create(&args.tablename, &args.rows, txn)
                .map(Response::Ids),
            Request::Read(args) => self
                .read(args, txn)
                .map(|rows| Response::Rows(rows.collect())),
            Request::Update(args) => self
                .update(&args.tablename, &args.values, args.filters.as_ref(), txn)
                .map(Response::Count),
            Request::Delete(args) => self
                .delete(&args.tablename, args.filters.as_ref(), txn)
                .map(Response::Count),
            Request::Batch(commands) => self.batch_json(commands, txn).map(Response::Batch),
        }
    }
}

/// Marks the thread holding the connection until dropped.
struct OwnerGuard<'a> {
    owner: &'a Mutex<Option<ThreadId>>,
}

impl<'a> OwnerGuard<'a> {
    fn claim(owner: &'a Mutex<Option<ThreadId>>, thread: ThreadId) -> Self {
        *owner.lock() = Some(thread);
        Self { owner }
    }
}

impl Drop for OwnerGuard<'_> {
    fn drop(&mut self) {
        *self.owner.lock() = None;
    }
}
