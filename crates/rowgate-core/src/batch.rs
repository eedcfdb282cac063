//! All-or-nothing execution of command sequences.

use tracing::{debug, warn};

use crate::command::{Command, CommandResult};
use crate::database::Database;
use crate::error::{Error, Result};
use crate::storage::Transaction;

impl Database {
    /// Run `commands` in order inside one transaction.
    ///
    /// Results come back in command order. The first failure rolls back
    /// every command's effects and is reported as
    /// [`Error::InvalidBatchCommand`] with the failing index.
    pub fn batch(
        &self,
        commands: &[Command],
        txn: Option<&Transaction<'_>>,
    ) -> Result<Vec<CommandResult>> {
        self.scope(txn, |txn| {
            let mut results = Vec::with_capacity(commands.len());
            for (index, command) in commands.iter().enumerate() {
                let result = self.apply(command, txn).map_err(|e| fail(index, e))?;
                results.push(result);
            }
            debug!(commands = results.len(), "batch complete");
            Ok(results)
        })
    }

    /// Like [`Database::batch`], taking commands in their `{cmd, kwargs}`
    /// form. A command that does not parse fails the batch at its index.
    pub fn batch_json(
        &self,
        commands: &[serde_json::Value],
        txn: Option<&Transaction<'_>>,
    ) -> Result<Vec<CommandResult>> {
        self.scope(txn, |txn| {
            let mut results = Vec::with_capacity(commands.len());
            for (index, raw) in commands.iter().enumerate() {
                let result = Command::from_json(raw)
                    .and_then(|command| self.apply(&command, txn))
                    .map_err(|e| fail(index, e))?;
                results.push(result);
            }
            debug!(commands = results.len(), "batch complete");
            Ok(results)
        })
    }

    fn apply(&self, command: &Command, txn: &Transaction<'_>) -> Result<CommandResult> {
        match command {
            Command::Create(args) => self
                .create(&args.tablename, &args.rows, Some(txn))
                .map(CommandResult::Ids),
            Command::Update(args) => self
                .update(&args.tablename, &args.values, args.filters.as_ref(), Some(txn))
                .map(CommandResult::Count),
            Command::Delete(args) => self
                .delete(&args.tablename, args.filters.as_ref(), Some(txn))
                .map(CommandResult::Count),
        }
    }
}

fn fail(index: usize, error: Error) -> Error {
    warn!(index, error = %error, "batch command failed, rolling back");
    Error::batch(index, error)
}
