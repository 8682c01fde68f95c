//! Drains the output queue to the client.

use std::io::{self, BufWriter, Write};

use tracing::{debug, warn};

use super::{SESSION_TARGET, Session};
use crate::transport::ConnectionStream;

pub(super) fn run(session: &Session, stream: ConnectionStream) {
    debug!(target: SESSION_TARGET, session = %session.id(), "outbound loop started");
    let mut writer = BufWriter::new(stream);
    while session.is_running() {
        let Some(line) = session.queue.take() else {
            // Only close interrupts the queue; this is a no-op confirmation.
            session.close();
            break;
        };
        if !session.is_running() {
            break;
        }
        if let Err(error) = write_line(&mut writer, &line) {
            if session.is_running() {
                warn!(
                    target: SESSION_TARGET,
                    session = %session.id(),
                    error = %error,
                    "write failed"
                );
                session.close();
            }
            break;
        }
    }
    debug!(target: SESSION_TARGET, session = %session.id(), "outbound loop finished");
}

/// Writes `line` and a `\n`, then flushes so the client sees it at once.
pub(super) fn write_line<W: Write>(writer: &mut W, line: &str) -> io::Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminates_and_flushes_each_line() {
        let mut buffered = BufWriter::new(Vec::new());
        write_line(&mut buffered, "pong").expect("write pong");
        assert_eq!(buffered.get_ref().as_slice(), b"pong\n");

        write_line(&mut buffered, "").expect("write empty");
        assert_eq!(buffered.get_ref().as_slice(), b"pong\n\n");
    }
}
