//! Doubles and polling helpers shared by the session test suites.

use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use mcpi_config::Config;
use ortho_config::OrthoError;

use crate::bootstrap::ConfigLoader;
use crate::commands::{CommandError, CommandHandler};
use crate::registry::SessionRegistry;
use crate::session::SessionId;

/// Command handler with a fixed response table.
///
/// `ping` answers `pong`, `noop` answers nothing, `fail` returns
/// [`CommandError::Failed`] and anything else is unknown. Every call is
/// recorded.
#[derive(Debug, Default)]
pub(crate) struct ScriptedCommands {
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl ScriptedCommands {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Commands received so far, in arrival order.
    pub(crate) fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CommandHandler for ScriptedCommands {
    fn handle_command(&self, name: &str, args: &[String]) -> Result<Option<String>, CommandError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((name.to_owned(), args.to_vec()));
        match name {
            "ping" => Ok(Some(String::from("pong"))),
            "noop" => Ok(None),
            "fail" => Err(CommandError::Failed {
                name: name.to_owned(),
                message: String::from("scripted failure"),
            }),
            _ => Err(CommandError::UnknownCommand {
                name: name.to_owned(),
            }),
        }
    }
}

/// Registry that only counts close notifications per session.
#[derive(Debug, Default)]
pub(crate) struct RecordingRegistry {
    closed: Mutex<HashMap<SessionId, usize>>,
}

impl RecordingRegistry {
    /// How many times `id` was reported closed.
    pub(crate) fn close_count(&self, id: SessionId) -> usize {
        self.closed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .copied()
            .unwrap_or(0)
    }
}

impl SessionRegistry for RecordingRegistry {
    fn close_session(&self, id: SessionId) {
        *self
            .closed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id)
            .or_default() += 1;
    }
}

/// Polls `condition` for up to two seconds.
pub(crate) fn wait_until(condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}

/// Line-oriented client end of a test connection.
pub(crate) struct TestClient {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl TestClient {
    /// Wraps `stream` with a two second read timeout.
    pub(crate) fn new(stream: TcpStream) -> Self {
        stream
            .set_read_timeout(Some(Duration::from_secs(2)))
            .expect("set client read timeout");
        let writer = stream.try_clone().expect("clone client stream");
        Self {
            reader: BufReader::new(stream),
            writer,
        }
    }

    /// Sends raw bytes to the server.
    pub(crate) fn send_raw(&mut self, bytes: &[u8]) {
        self.writer.write_all(bytes).expect("write request");
        self.writer.flush().expect("flush request");
    }

    /// Sends `line` followed by `\n`.
    pub(crate) fn send_line(&mut self, line: &str) {
        self.send_raw(format!("{line}\n").as_bytes());
    }

    /// Reads one line, including its terminator. Returns an empty string at
    /// end-of-stream.
    pub(crate) fn read_line(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).expect("read response");
        line
    }

    /// Whether the server has closed the connection. A reset counts as
    /// closed.
    pub(crate) fn sees_end_of_stream(&mut self) -> bool {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(read) => read == 0,
            Err(error) => matches!(
                error.kind(),
                io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted
            ),
        }
    }

    /// Stops writing, so the server reads end-of-stream.
    pub(crate) fn hang_up(&self) {
        let _ = self.writer.shutdown(Shutdown::Write);
    }
}

/// Loader that fails by passing an unsupported socket scheme.
pub(crate) struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load_from_iter(["mcpid", "--listen-socket", "invalid://socket"])
    }
}
