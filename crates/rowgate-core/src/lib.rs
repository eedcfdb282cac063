//! Rowgate Core - declarative CRUD over a relational schema.
//!
//! Callers describe requests as plain data: a table, a column list, a
//! filter tree, join declarations and ordering. Requests are validated
//! against a [`Catalog`], compiled into parameterized SQL and executed in a
//! transaction. Batches of create/update/delete commands run all-or-nothing.

mod batch;
pub mod catalog;
pub mod command;
pub mod database;
pub mod error;
pub mod id;
pub mod query;
pub mod storage;
pub mod value;

pub use catalog::{Catalog, CatalogBuilder, ColumnDef, ColumnType, DefaultValue, TableDef};
pub use command::{Command, CommandResult, CreateArgs, DeleteArgs, Request, Response, UpdateArgs};
pub use database::Database;
pub use error::{Error, Result};
pub use id::{IdGenerator, SequenceGenerator, UuidGenerator};
pub use query::{CompareOp, FilterTree, JoinSpec, Order, ReadRequest, Row, Rows};
pub use storage::{DatabaseConfig, IdStrategy, Transaction};
pub use value::{RowValues, Value};
