//! Play command implementation: a JSON-lines transport over stdio.

use std::io::{self, BufRead, Write};

use battlenode::ErrorKind;
use battlenode::session::{GameRegistry, Request, Response};
use tracing::{debug, info};

use super::CliError;

/// Execute the play command.
///
/// Each stdin line holds one [`Request`]; each gets exactly one
/// [`Response`] line on stdout. Blank lines are skipped.
///
/// # Errors
///
/// Returns an error if stdin or stdout fails.
pub(crate) fn execute() -> Result<(), CliError> {
    let registry = GameRegistry::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    info!("serving requests on stdin");
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => {
                debug!(?request, "request");
                registry.dispatch(request)
            }
            Err(e) => Response::Error {
                kind: ErrorKind::Validation,
                message: format!("malformed request: {e}"),
            },
        };
        serde_json::to_writer(&mut stdout, &response)?;
        writeln!(stdout)?;
        stdout.flush()?;
    }
    info!(games = registry.names().len(), "input closed");

    Ok(())
}
