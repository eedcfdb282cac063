//! Structured commands: the `{cmd, kwargs}` envelope, its arguments and
//! results.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::query::{ReadRequest, Row};
use crate::value::{RowValues, Value};

/// Arguments of a create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateArgs {
    /// Target table.
    #[serde(alias = "entity_type")]
    pub tablename: String,
    /// Rows to insert.
    #[serde(alias = "list_of_values")]
    pub rows: Vec<RowValues>,
}

/// Arguments of an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateArgs {
    /// Target table.
    #[serde(alias = "entity_type")]
    pub tablename: String,
    /// Column values to set.
    pub values: RowValues,
    /// Rows to update; every row when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<serde_json::Value>,
}

/// Arguments of a delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteArgs {
    /// Target table.
    #[serde(alias = "entity_type")]
    pub tablename: String,
    /// Rows to delete; every row when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BatchArgs {
    #[serde(alias = "commands")]
    cmds: Vec<serde_json::Value>,
}

/// A command allowed inside a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Insert rows.
    Create(CreateArgs),
    /// Update matching rows.
    Update(UpdateArgs),
    /// Delete matching rows.
    Delete(DeleteArgs),
}

/// Any top-level request.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Insert rows.
    Create(CreateArgs),
    /// Read rows.
    Read(ReadRequest),
    /// Update matching rows.
    Update(UpdateArgs),
    /// Delete matching rows.
    Delete(DeleteArgs),
    /// Run commands in one transaction. Commands stay unparsed so a
    /// malformed one is reported with its index.
    Batch(Vec<serde_json::Value>),
}

/// Result of one batch command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandResult {
    /// Keys of created rows, in input order.
    Ids(Vec<Value>),
    /// Number of rows updated or deleted.
    Count(usize),
}

/// Result of a top-level request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    /// Keys of created rows.
    Ids(Vec<Value>),
    /// Rows read.
    Rows(Vec<Row>),
    /// Number of rows updated or deleted.
    Count(usize),
    /// Per-command batch results.
    Batch(Vec<CommandResult>),
}

impl From<CommandResult> for Response {
    fn from(result: CommandResult) -> Self {
        match result {
            CommandResult::Ids(ids) => Response::Ids(ids),
            CommandResult::Count(count) => Response::Count(count),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope {
    cmd: String,
    kwargs: serde_json::Value,
}

fn envelope(raw: &serde_json::Value) -> Result<Envelope> {
    if !raw.is_object() {
        return Err(Error::InvalidRequest(
            "command must be a mapping with 'cmd' and 'kwargs'".to_string(),
        ));
    }
    serde_json::from_value(raw.clone())
        .map_err(|e| Error::InvalidRequest(format!("malformed command: {}", e)))
}

fn kwargs<T: for<'de> Deserialize<'de>>(cmd: &str, kwargs: serde_json::Value) -> Result<T> {
    serde_json::from_value(kwargs)
        .map_err(|e| Error::InvalidRequest(format!("invalid arguments for '{}': {}", cmd, e)))
}

impl Request {
    /// Parse a `{cmd, kwargs}` envelope.
    pub fn from_json(raw: &serde_json::Value) -> Result<Self> {
        let Envelope { cmd, kwargs: args } = envelope(raw)?;
        match cmd.as_str() {
            "create" => Ok(Request::Create(kwargs(&cmd, args)?)),
            "read" => Ok(Request::Read(kwargs(&cmd, args)?)),
            "update" => Ok(Request::Update(kwargs(&cmd, args)?)),
            "delete" => Ok(Request::Delete(kwargs(&cmd, args)?)),
            "batch" => {
                let BatchArgs { cmds } = kwargs(&cmd, args)?;
                Ok(Request::Batch(cmds))
            }
            other => Err(Error::InvalidRequest(format!("unknown command '{}'", other))),
        }
    }

    /// Command name.
    pub fn name(&self) -> &'static str {
        match self {
            Request::Create(_) => "create",
            Request::Read(_) => "read",
            Request::Update(_) => "update",
            Request::Delete(_) => "delete",
            Request::Batch(_) => "batch",
        }
    }
}

impl Command {
    /// Parse a batch element. Only create, update and delete are accepted.
    pub fn from_json(raw: &serde_json::Value) -> Result<Self> {
        let Envelope { cmd, kwargs: args } = envelope(raw)?;
        match cmd.as_str() {
            "create" => Ok(Command::Create(kwargs(&cmd, args)?)),
            "update" => Ok(Command::Update(kwargs(&cmd, args)?)),
            "delete" => Ok(Command::Delete(kwargs(&cmd, args)?)),
            "read" | "batch" => Err(Error::InvalidRequest(format!(
                "'{}' is not allowed inside a batch",
                cmd
            ))),
            other => Err(Error::InvalidRequest(format!("unknown command '{}'", other))),
        }
    }

    /// Command name.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Create(_) => "create",
            Command::Update(_) => "update",
            Command::Delete(_) => "delete",
        }
    }
}
