//! Request compilation.
//!
//! Column references, filter trees and join declarations are validated
//! against the catalog and compiled into parameterized SQL statements.

mod compare;
mod filter;
mod join;
mod planner;
mod request;
mod resolver;
mod statement;

pub use compare::CompareOp;
pub use filter::{FilterCompiler, FilterTree, FILTER_OR};
pub use join::{JoinCompiler, JoinPlan, JoinSpec, JoinStep, JOIN_STEP_PARTS};
pub use planner::{QueryPlanner, ReadPlan};
pub use request::{Order, ReadRequest, Row, Rows};
pub use resolver::{AliasTables, ColumnRef, Resolved, Resolver, SelectColumn, Target, ALL_COLUMNS};
pub use statement::Statement;

