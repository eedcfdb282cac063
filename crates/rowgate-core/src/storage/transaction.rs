//! Transactions over the backing connection.

use rusqlite::{params_from_iter, Connection};
use tracing::debug;

use crate::error::Result;
use crate::query::{ReadPlan, Row, Statement};
use crate::value::Value;

/// An open transaction.
///
/// Dropping a transaction without committing rolls it back, so every exit
/// path releases it.
pub struct Transaction<'conn> {
    inner: rusqlite::Transaction<'conn>,
}

impl<'conn> Transaction<'conn> {
    /// Begin a transaction on `conn`.
    pub(crate) fn begin(conn: &'conn mut Connection) -> Result<Self> {
        let inner = conn.transaction()?;
        debug!("transaction begin");
        Ok(Self { inner })
    }

    /// Execute a statement, returning the number of affected rows.
    pub fn execute(&self, statement: &Statement) -> Result<usize> {
        debug!(sql = %statement.sql, params = statement.params.len(), "execute");
        let mut prepared = self.inner.prepare_cached(&statement.sql)?;
        Ok(prepared.execute(params_from_iter(statement.params.iter()))?)
    }

    /// Run a read plan and decode every row.
    pub fn query(&self, plan: &ReadPlan) -> Result<Vec<Row>> {
        let statement = &plan.statement;
        debug!(sql = %statement.sql, params = statement.params.len(), "query");

        let mut prepared = self.inner.prepare_cached(&statement.sql)?;
        let mut rows = prepared.query(params_from_iter(statement.params.iter()))?;
        let mut decoded = Vec::new();
        while let Some(row) = rows.next()? {
            let mut out = Row::default();
            for (i, column) in plan.columns.iter().enumerate() {
                let value = Value::from_sql(row.get_ref(i)?, column.column_type);
                out.push(column.label.clone(), value);
            }
            decoded.push(out);
        }
        Ok(decoded)
    }

    /// Row id of the most recent insert.
    pub fn last_insert_rowid(&self) -> i64 {
        self.inner.last_insert_rowid()
    }

    /// Commit.
    pub fn commit(self) -> Result<()> {
        self.inner.commit()?;
        debug!("transaction commit");
        Ok(())
    }

    /// Roll back every change made in this transaction.
    pub fn rollback(self) -> Result<()> {
        self.inner.rollback()?;
        debug!("transaction rollback");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ColumnType;
    use crate::query::SelectColumn;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, flag BOOLEAN)")
            .unwrap();
        conn
    }

    fn count_plan() -> ReadPlan {
        ReadPlan {
            statement: Statement::new("SELECT count(*) FROM t"),
            columns: vec![SelectColumn {
                sql: "count(*)".to_string(),
                label: "count".to_string(),
                column_type: ColumnType::Int,
            }],
        }
    }

    #[test]
    fn test_commit_persists() {
        let mut conn = setup();
        let txn = Transaction::begin(&mut conn).unwrap();
        let mut insert = Statement::new("INSERT INTO t (flag) VALUES (");
        insert.push_param(Value::Bool(true));
        insert.push_sql(")");
        assert_eq!(txn.execute(&insert).unwrap(), 1);
        assert_eq!(txn.last_insert_rowid(), 1);
        txn.commit().unwrap();

        let txn = Transaction::begin(&mut conn).unwrap();
        let rows = txn.query(&count_plan()).unwrap();
        assert_eq!(rows[0].get("count"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_drop_rolls_back() {
        let mut conn = setup();
        {
            let txn = Transaction::begin(&mut conn).unwrap();
            txn.execute(&Statement::new("INSERT INTO t (flag) VALUES (0)"))
                .unwrap();
        }

        let txn = Transaction::begin(&mut conn).unwrap();
        let rows = txn.query(&count_plan()).unwrap();
        assert_eq!(rows[0].get("count"), Some(&Value::Int(0)));
    }
}
