//! Join declarations and their compilation into `JOIN` clauses.
//!
//! A declaration maps an alias to a chain of steps. Each step is
//! `[source_column, comparison, target_table, target_column]`; the first
//! step starts at the base table and every following step starts at the
//! table joined by the previous one. The alias names the last table of the
//! chain.

use std::collections::BTreeMap;

use super::compare::CompareOp;
use super::resolver::{qualified_sql, AliasTables};
use super::statement::Statement;
use crate::catalog::{quote_ident, Catalog, TableDef};
use crate::error::{Error, Result};

/// Alias to join chain, as supplied by callers.
pub type JoinSpec = BTreeMap<String, Vec<Vec<String>>>;

/// Number of parts in one join step.
pub const JOIN_STEP_PARTS: usize = 4;

/// One validated join step.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinStep {
    /// Name the joined table goes by in the statement.
    pub alias: String,
    /// Joined table.
    pub table: String,
    /// `(source, column)` on the left side of the condition.
    pub left: (String, String),
    /// Comparison between the two columns.
    pub op: CompareOp,
    /// Column of the joined table on the right side of the condition.
    pub right_column: String,
}

impl JoinStep {
    fn sql(&self) -> String {
        format!(
            " JOIN {} AS {} ON {} {} {}",
            quote_ident(&self.table),
            quote_ident(&self.alias),
            qualified_sql(&self.left.0, &self.left.1),
            self.op.sql(),
            qualified_sql(&self.alias, &self.right_column)
        )
    }
}

/// Ordered join steps for one read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinPlan {
    steps: Vec<JoinStep>,
}

impl JoinPlan {
    /// Steps in the order they are applied.
    pub fn steps(&self) -> &[JoinStep] {
        &self.steps
    }

    /// Check if the plan joins nothing.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Render the plan as `JOIN` clauses following the `FROM` table.
    pub fn to_statement(&self) -> Statement {
        let mut statement = Statement::default();
        for step in &self.steps {
            statement.push_sql(&step.sql());
        }
        statement
    }
}

/// Validates join declarations against the catalog.
pub struct JoinCompiler<'c> {
    catalog: &'c Catalog,
}

impl<'c> JoinCompiler<'c> {
    /// Create a compiler over `catalog`.
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    /// Compile every declared alias.
    ///
    /// Returns the plan and the table each alias resolves to. Malformed
    /// chains are `InvalidJoin`; unknown tables or columns are `Schema`.
    pub fn compile(
        &self,
        base: &TableDef,
        joins: &JoinSpec,
    ) -> Result<(JoinPlan, AliasTables<'c>)> {
        let mut plan = JoinPlan::default();
        let mut aliases = AliasTables::new();

        for (alias, chain) in joins {
            self.validate_alias(base, alias)?;
            if chain.is_empty() {
                return Err(Error::InvalidJoin(format!(
                    "join '{}' requires at least one step",
                    alias
                )));
            }

            let mut current_source = base.name.clone();
            let mut current_table: &TableDef = base;
            let mut last_table = None;

            for (i, step) in chain.iter().enumerate() {
                let (column, method, target, target_column) = match step.as_slice() {
                    [column, method, target, target_column] => {
                        (column, method, target, target_column)
                    }
                    _ => {
                        return Err(Error::InvalidJoin(format!(
                            "join '{}' step {} requires {} parameters, got {}",
                            alias,
                            i,
                            JOIN_STEP_PARTS,
                            step.len()
                        )))
                    }
                };

                let op = CompareOp::parse(method).ok_or_else(|| {
                    Error::InvalidJoin(format!(
                        "join '{}' step {}: '{}' is not a valid comparison method",
                        alias, i, method
                    ))
                })?;
                if op.takes_list() {
                    return Err(Error::InvalidJoin(format!(
                        "join '{}' step {}: '{}' cannot compare two columns",
                        alias, i, method
                    )));
                }

                let target_table = self.catalog.table(target)?;
                if !current_table.has_column(column) {
                    return Err(Error::Schema(format!(
                        "table {} has no column {}",
                        current_table.name, column
                    )));
                }
                if !target_table.has_column(target_column) {
                    return Err(Error::Schema(format!(
                        "table {} has no column {}",
                        target_table.name, target_column
                    )));
                }

                let step_alias = if i + 1 == chain.len() {
                    alias.clone()
                } else {
                    format!("{}#{}", alias, i)
                };
                plan.steps.push(JoinStep {
                    alias: step_alias.clone(),
                    table: target_table.name.clone(),
                    left: (current_source, column.clone()),
                    op,
                    right_column: target_column.clone(),
                });

                current_source = step_alias;
                current_table = target_table;
                last_table = Some(target_table);
            }

            if let Some(table) = last_table {
                aliases.insert(alias.clone(), table);
            }
        }

        Ok((plan, aliases))
    }

    fn validate_alias(&self, base: &TableDef, alias: &str) -> Result<()> {
        if alias.is_empty() || alias.contains('.') || alias.contains('#') {
            return Err(Error::InvalidJoin(format!(
                "'{}' is not a valid join alias",
                alias
            )));
        }
        if alias == base.name {
            return Err(Error::InvalidJoin(format!(
                "join alias '{}' collides with the base table",
                alias
            )));
        }
        Ok(())
    }
}
