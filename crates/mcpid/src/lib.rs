//! Session server for a line-oriented command protocol.
//!
//! Clients connect over TCP or a Unix domain socket and exchange
//! newline-terminated text. Each request line has the form
//! `name(arg1,arg2,...)`. The server answers with zero or one line per
//! request and may push further lines at any time.
//!
//! Every accepted connection becomes a [`Session`] with its own inbound and
//! outbound thread. Sessions hand parsed requests to a [`CommandHandler`]
//! and report their own closure to a [`SessionRegistry`]. [`Sessions`] is
//! the registry used by the server, and [`BuiltinCommands`] the command set
//! served by the `mcpid` binary.
//!
//! [`run_server`] wires it all together: configuration through
//! [`mcpi_config`], structured telemetry, the socket listener, and a clean
//! shutdown on SIGTERM or SIGINT.

mod bootstrap;
mod commands;
mod process;
mod registry;
mod server;
mod session;
mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, Bootstrapped, ConfigLoader, StaticConfigLoader, SystemConfigLoader, bootstrap,
};
pub use commands::{BuiltinCommands, CommandError, CommandHandler};
pub use process::{
    LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_server, run_server_with,
};
pub use registry::{SessionRegistry, Sessions};
pub use server::{Server, ServerError, SessionAcceptor};
pub use session::{
    CommandLine, CommandParseError, OutputQueue, Session, SessionError, SessionId, SessionOptions,
};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::{
    ConnectionHandler, ConnectionStream, ListenerError, ListenerHandle, SocketListener,
};

#[cfg(test)]
mod tests;
