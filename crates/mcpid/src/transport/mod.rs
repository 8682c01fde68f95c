//! Socket transport for client connections.
//!
//! The listener binds the configured endpoint and accepts connections on a
//! background thread, handing each one to a [`ConnectionHandler`].

mod errors;
mod listener;
mod stream;
#[cfg(test)]
mod test_utils;

pub use self::errors::ListenerError;
pub use self::listener::{ListenerHandle, SocketListener};
pub use self::stream::{ConnectionHandler, ConnectionStream};
#[cfg(test)]
pub(crate) use self::test_utils::{CountingHandler, tcp_pair};

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
