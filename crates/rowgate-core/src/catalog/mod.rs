//! Schema catalog for rowgate.
//!
//! The catalog holds the table definitions every request is validated
//! against. It is built once and never mutated afterwards.

mod catalog;
mod column;
mod ddl;
mod table;
mod types;

pub use catalog::{Catalog, CatalogBuilder};
pub use column::{ColumnDef, DefaultValue};
pub use ddl::quote_ident;
pub use table::{TableDef, UniqueConstraint};
pub use types::ColumnType;
