//! Glue between the socket listener and the session registry.

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use mcpi_config::Config;

use crate::commands::CommandHandler;
use crate::registry::Sessions;
use crate::session::{SessionError, SessionOptions};
use crate::transport::{
    ConnectionHandler, ConnectionStream, ListenerError, ListenerHandle, SocketListener,
};

const SERVER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::server");

/// Errors raised while starting or stopping the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not bind, start or stop.
    #[error(transparent)]
    Listener(#[from] ListenerError),
    /// A session loop did not exit cleanly during shutdown.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Turns each accepted connection into a registered session.
pub struct SessionAcceptor {
    sessions: Arc<Sessions>,
    commands: Arc<dyn CommandHandler>,
    options: SessionOptions,
}

impl SessionAcceptor {
    /// Builds an acceptor that registers sessions in `sessions`.
    #[must_use]
    pub fn new(
        sessions: Arc<Sessions>,
        commands: Arc<dyn CommandHandler>,
        options: SessionOptions,
    ) -> Self {
        Self {
            sessions,
            commands,
            options,
        }
    }
}

impl ConnectionHandler for SessionAcceptor {
    fn handle(&self, stream: ConnectionStream) {
        if let Err(error) = self
            .sessions
            .open(stream, Arc::clone(&self.commands), self.options)
        {
            warn!(
                target: SERVER_TARGET,
                error = %error,
                "failed to start session"
            );
        }
    }
}

/// A listening server and the sessions it has accepted.
pub struct Server {
    listener: ListenerHandle,
    local_addr: Option<SocketAddr>,
    sessions: Arc<Sessions>,
}

impl Server {
    /// Binds the configured endpoint and starts accepting clients.
    pub fn start(
        config: &Config,
        commands: Arc<dyn CommandHandler>,
        sessions: Arc<Sessions>,
    ) -> Result<Self, ServerError> {
        let bound = SocketListener::bind(config.listen_socket())?;
        let local_addr = bound.local_addr();
        let acceptor = Arc::new(SessionAcceptor::new(
            Arc::clone(&sessions),
            commands,
            SessionOptions::from_config(config),
        ));
        let listener = bound.start(acceptor)?;
        info!(
            target: SERVER_TARGET,
            endpoint = %config.listen_socket(),
            "server accepting clients"
        );
        Ok(Self {
            listener,
            local_addr,
            sessions,
        })
    }

    /// Bound TCP address, when listening on TCP.
    #[must_use]
    pub const fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Registry of the sessions this server accepted.
    #[must_use]
    pub const fn sessions(&self) -> &Arc<Sessions> {
        &self.sessions
    }

    /// Stops accepting, then closes every session and waits for it.
    pub fn shutdown(self) -> Result<(), ServerError> {
        self.listener.shutdown();
        self.listener.join()?;
        let open = self.sessions.len();
        self.sessions.close_all()?;
        info!(
            target: SERVER_TARGET,
            closed_sessions = open,
            "server stopped"
        );
        Ok(())
    }
}
