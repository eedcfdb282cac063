//! Request execution for `rowgate exec`.

use rowgate_core::{Database, Request};
use tracing::debug;

use crate::error::CliError;
use crate::formatter::Formatter;

/// Parse input as one request or a list of requests.
pub fn parse_requests(input: &str) -> Result<Vec<Request>, CliError> {
    let raw: serde_json::Value = serde_json::from_str(input)?;
    let requests = match raw {
        serde_json::Value::Array(items) => items
            .iter()
            .map(Request::from_json)
            .collect::<Result<Vec<_>, _>>()?,
        other => vec![Request::from_json(&other)?],
    };
    Ok(requests)
}

/// Execute requests in order, each in its own transaction, returning one
/// formatted output per request. Stops at the first failure.
pub fn execute(
    db: &Database,
    input: &str,
    formatter: &dyn Formatter,
) -> Result<Vec<String>, CliError> {
    let requests = parse_requests(input)?;
    let mut outputs = Vec::with_capacity(requests.len());
    for request in &requests {
        debug!(cmd = request.name(), "executing request");
        let response = db.execute(request, None)?;
        outputs.push(formatter.format_response(&response));
    }
    Ok(outputs)
}
