//! Error types for session start-up and line handling.

use std::io;

use thiserror::Error;

use super::SessionId;
use super::command::CommandParseError;
use crate::commands::CommandError;

/// Errors surfaced while starting or joining a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The accepted stream could not be split into read and write handles.
    #[error("session {id}: failed to clone connection stream: {source}")]
    CloneStream {
        /// Session whose stream failed to clone.
        id: SessionId,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The operating system refused to start a loop thread.
    #[error("session {id}: failed to spawn {direction} loop: {source}")]
    SpawnLoop {
        /// Session whose loop failed to start.
        id: SessionId,
        /// `inbound` or `outbound`.
        direction: &'static str,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// A loop thread panicked before it could exit cleanly.
    #[error("session {id}: a connection loop panicked")]
    LoopPanicked {
        /// Session whose loop panicked.
        id: SessionId,
    },
}

/// Failures that end a session while handling one inbound line.
#[derive(Debug, Error)]
pub(crate) enum LineError {
    #[error(transparent)]
    Parse(#[from] CommandParseError),
    #[error(transparent)]
    Dispatch(#[from] CommandError),
}
