//! Reads request lines and dispatches them to the command handler.

use std::io::{self, BufRead, BufReader, Read};

use tracing::{debug, warn};

use super::errors::LineError;
use super::{CommandLine, SESSION_TARGET, Session, SessionOptions};
use crate::commands::CommandHandler;
use crate::transport::ConnectionStream;

pub(super) fn run(
    session: &Session,
    stream: ConnectionStream,
    commands: &dyn CommandHandler,
    options: SessionOptions,
) {
    debug!(target: SESSION_TARGET, session = %session.id(), "inbound loop started");
    let mut reader = BufReader::new(stream);
    let mut line = Vec::new();
    while session.is_running() {
        match read_line(&mut reader, &mut line, options.max_line_bytes) {
            Ok(0) => {
                if session.is_running() {
                    debug!(
                        target: SESSION_TARGET,
                        session = %session.id(),
                        "client closed the connection"
                    );
                }
                session.close();
                break;
            }
            Ok(_) => {
                if let Err(error) = handle_line(session, &line, commands) {
                    warn!(
                        target: SESSION_TARGET,
                        session = %session.id(),
                        error = %error,
                        "dropping client after bad request"
                    );
                    session.close();
                    break;
                }
            }
            Err(error) => {
                // A failure after close is the shutdown we caused ourselves.
                if session.is_running() {
                    warn!(
                        target: SESSION_TARGET,
                        session = %session.id(),
                        error = %error,
                        "read failed"
                    );
                    session.close();
                }
                break;
            }
        }
    }
    debug!(target: SESSION_TARGET, session = %session.id(), "inbound loop finished");
}

/// Reads one `\n`-terminated line into `line`, replacing its contents.
/// Returns the byte count, zero at end-of-stream. Lines longer than
/// `max_bytes` fail with [`io::ErrorKind::InvalidData`].
pub(super) fn read_line<R: BufRead>(
    reader: &mut R,
    line: &mut Vec<u8>,
    max_bytes: usize,
) -> io::Result<usize> {
    line.clear();
    let limit = u64::try_from(max_bytes)
        .unwrap_or(u64::MAX)
        .saturating_add(1);
    let read = reader.by_ref().take(limit).read_until(b'\n', line)?;
    if read > max_bytes {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("request line exceeds {max_bytes} bytes"),
        ));
    }
    Ok(read)
}

fn handle_line(
    session: &Session,
    raw: &[u8],
    commands: &dyn CommandHandler,
) -> Result<(), LineError> {
    let decoded = String::from_utf8_lossy(raw);
    let text = strip_terminator(&decoded);
    if text.is_empty() {
        return Ok(());
    }
    debug!(
        target: SESSION_TARGET,
        session = %session.id(),
        line = text,
        "request received"
    );

    let command = CommandLine::parse(text)?;
    if let Some(response) = commands.handle_command(command.name(), command.args())? {
        session.send(response);
    }
    Ok(())
}

fn strip_terminator(line: &str) -> &str {
    let without_newline = line.strip_suffix('\n').unwrap_or(line);
    without_newline
        .strip_suffix('\r')
        .unwrap_or(without_newline)
}
