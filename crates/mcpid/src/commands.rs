//! Command execution seam and the built-in command set.
//!
//! Sessions do not interpret commands. Every parsed request line goes to a
//! [`CommandHandler`], and whatever text it returns is sent back to the
//! client. Returning `Ok(None)` sends nothing. Returning an error ends the
//! session, because the protocol has no error response.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::registry::Sessions;

const COMMANDS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::commands");

/// Executes a named command with its argument tokens.
pub trait CommandHandler: Send + Sync {
    /// Runs `name` with `args` and returns the response line, if any.
    ///
    /// `name()` arrives as `[""]`. Trailing empty tokens are already
    /// dropped, so `name(,)` arrives with no tokens.
    fn handle_command(&self, name: &str, args: &[String]) -> Result<Option<String>, CommandError>;
}

impl<T> CommandHandler for Arc<T>
where
    T: CommandHandler + ?Sized,
{
    fn handle_command(&self, name: &str, args: &[String]) -> Result<Option<String>, CommandError> {
        (**self).handle_command(name, args)
    }
}

/// Failures reported by a [`CommandHandler`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// No command with this name exists.
    #[error("unknown command '{name}'")]
    UnknownCommand {
        /// Requested command name.
        name: String,
    },
    /// The command exists but cannot use the supplied arguments.
    #[error("invalid arguments for '{name}': {reason}")]
    InvalidArguments {
        /// Command name.
        name: String,
        /// What was wrong with the arguments.
        reason: String,
    },
    /// The command ran and failed.
    #[error("command '{name}' failed: {message}")]
    Failed {
        /// Command name.
        name: String,
        /// Failure description.
        message: String,
    },
}

/// Commands served by the stock `mcpid` binary.
///
/// | request              | response                          |
/// |----------------------|-----------------------------------|
/// | `ping()`             | `pong`                            |
/// | `echo(a,b)`          | `a,b`                             |
/// | `session.count()`    | number of open sessions           |
/// | `chat.post(message)` | none; the message is logged       |
#[derive(Debug, Clone)]
pub struct BuiltinCommands {
    sessions: Arc<Sessions>,
}

impl BuiltinCommands {
    /// Builds the command set over the server's session registry.
    #[must_use]
    pub const fn new(sessions: Arc<Sessions>) -> Self {
        Self { sessions }
    }
}

impl CommandHandler for BuiltinCommands {
    fn handle_command(&self, name: &str, args: &[String]) -> Result<Option<String>, CommandError> {
        match name {
            "ping" => Ok(Some(String::from("pong"))),
            "echo" => Ok(Some(args.join(","))),
            "session.count" => {
                expect_no_arguments(name, args)?;
                Ok(Some(self.sessions.len().to_string()))
            }
            "chat.post" => {
                // Messages may contain commas, which the request split on.
                let message = args.join(",");
                info!(target: COMMANDS_TARGET, message = %message, "chat message posted");
                Ok(None)
            }
            _ => Err(CommandError::UnknownCommand {
                name: name.to_owned(),
            }),
        }
    }
}

fn expect_no_arguments(name: &str, args: &[String]) -> Result<(), CommandError> {
    if args.len() <= 1 && args.iter().all(String::is_empty) {
        return Ok(());
    }
    Err(CommandError::InvalidArguments {
        name: name.to_owned(),
        reason: format!("expected no arguments, got {}", args.len()),
    })
}
