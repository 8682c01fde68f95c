//! Per-connection sessions.
//!
//! A [`Session`] owns one accepted connection and runs two threads against
//! it. The inbound loop reads `name(args)` lines, hands them to the
//! [`CommandHandler`] and queues any response. The outbound loop drains the
//! [`OutputQueue`] to the socket, one flushed line at a time, so responses
//! leave in the order they were queued no matter which thread produced them.
//!
//! Either loop closes the session when its half of the connection ends or
//! fails. Closing is a single `running` transition: it shuts the socket down
//! (unblocking the reader), interrupts the queue (unblocking the writer) and
//! tells the [`SessionRegistry`] to forget the session.

mod command;
mod errors;
mod inbound;
mod outbound;
mod queue;
#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use mcpi_config::{Config, DEFAULT_MAX_LINE_BYTES};

use crate::commands::CommandHandler;
use crate::registry::SessionRegistry;
use crate::transport::ConnectionStream;

pub use self::command::{CommandLine, CommandParseError};
pub use self::errors::SessionError;
pub use self::queue::OutputQueue;

const SESSION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::session");

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique session identifier. Identifiers increase in allocation
/// order and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(u64);

impl SessionId {
    fn next() -> Self {
        Self(NEXT_SESSION_ID.fetch_add(1, Ordering::SeqCst))
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Per-session limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Longest inbound line, terminator included, before the session is
    /// dropped as misbehaving.
    pub max_line_bytes: usize,
}

impl SessionOptions {
    /// Options derived from the server configuration.
    #[must_use]
    pub const fn from_config(config: &Config) -> Self {
        Self {
            max_line_bytes: config.max_line_bytes(),
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

/// One client connection and its two I/O loops.
pub struct Session {
    id: SessionId,
    peer: String,
    running: AtomicBool,
    socket: ConnectionStream,
    queue: OutputQueue,
    registry: Arc<dyn SessionRegistry>,
    loops: Mutex<Vec<JoinHandle<()>>>,
}

impl Session {
    /// Takes ownership of an accepted connection and starts its inbound and
    /// outbound loops.
    ///
    /// `registry` is told exactly once, from whichever thread closes the
    /// session, that the session is gone.
    pub fn start(
        stream: ConnectionStream,
        commands: Arc<dyn CommandHandler>,
        registry: Arc<dyn SessionRegistry>,
        options: SessionOptions,
    ) -> Result<Arc<Self>, SessionError> {
        let id = SessionId::next();
        let reader = stream
            .try_clone()
            .map_err(|source| SessionError::CloneStream { id, source })?;
        let writer = stream
            .try_clone()
            .map_err(|source| SessionError::CloneStream { id, source })?;

        let session = Arc::new(Self {
            id,
            peer: stream.peer_label(),
            running: AtomicBool::new(true),
            socket: stream,
            queue: OutputQueue::new(),
            registry,
            loops: Mutex::new(Vec::with_capacity(2)),
        });
        info!(
            target: SESSION_TARGET,
            session = %id,
            peer = %session.peer,
            "session opened"
        );

        let reading = Arc::clone(&session);
        session.spawn_loop("inbound", move || {
            inbound::run(&reading, reader, commands.as_ref(), options);
        })?;
        let writing = Arc::clone(&session);
        session.spawn_loop("outbound", move || outbound::run(&writing, writer))?;

        Ok(session)
    }

    /// Identifier assigned when the session started.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Remote address of the client, for logs.
    #[must_use]
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Point-in-time view of whether the session is open. The answer may be
    /// stale by the time the caller acts on it.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Queues `value`'s textual form for delivery to the client.
    ///
    /// Never blocks and never fails. Values sent while the session is
    /// closing may be dropped.
    pub fn send(&self, value: impl fmt::Display) {
        self.queue.push(value.to_string());
    }

    /// Closes the session. Only the first call has any effect; it is safe
    /// to call from either loop and from other threads concurrently.
    pub fn close(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Err(error) = self.socket.shutdown() {
            debug!(
                target: SESSION_TARGET,
                session = %self.id,
                error = %error,
                "socket shutdown failed"
            );
        }
        self.queue.interrupt();
        self.registry.close_session(self.id);
        info!(
            target: SESSION_TARGET,
            session = %self.id,
            peer = %self.peer,
            "session closed"
        );
    }

    /// Waits for both loops to exit. Call [`close`](Self::close) first, or
    /// expect to wait for the client to disconnect. A loop calling this on
    /// its own session skips joining itself.
    pub fn join(&self) -> Result<(), SessionError> {
        let handles = std::mem::take(
            &mut *self.loops.lock().unwrap_or_else(PoisonError::into_inner),
        );
        let current = thread::current().id();
        let mut panicked = false;
        for handle in handles {
            if handle.thread().id() == current {
                continue;
            }
            panicked |= handle.join().is_err();
        }
        if panicked {
            return Err(SessionError::LoopPanicked { id: self.id });
        }
        Ok(())
    }

    fn spawn_loop<F>(&self, direction: &'static str, body: F) -> Result<(), SessionError>
    where
        F: FnOnce() + Send + 'static,
    {
        let spawned = thread::Builder::new()
            .name(format!("mcpi-session-{}-{direction}", self.id))
            .spawn(body);
        match spawned {
            Ok(handle) => {
                self.loops
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(handle);
                Ok(())
            }
            Err(source) => {
                // The other loop, if already running, winds down on close.
                self.close();
                Err(SessionError::SpawnLoop {
                    id: self.id,
                    direction,
                    source,
                })
            }
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Session")
            .field("id", &self.id)
            .field("peer", &self.peer)
            .field("running", &self.is_running())
            .field("pending", &self.queue.len())
            .finish_non_exhaustive()
    }
}
