//! Server-side bookkeeping of open sessions.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::commands::CommandHandler;
use crate::session::{Session, SessionError, SessionId, SessionOptions};
use crate::transport::ConnectionStream;

const REGISTRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::registry");

/// Receives the one notification a session sends when it closes.
pub trait SessionRegistry: Send + Sync {
    /// Forgets the session. Must tolerate ids it does not know.
    fn close_session(&self, id: SessionId);
}

/// Registry of every open session, keyed by id.
#[derive(Default)]
pub struct Sessions {
    open: Mutex<HashMap<SessionId, Arc<Session>>>,
}

impl Sessions {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session on `stream` and records it until it closes.
    pub fn open(
        self: &Arc<Self>,
        stream: ConnectionStream,
        commands: Arc<dyn CommandHandler>,
        options: SessionOptions,
    ) -> Result<Arc<Session>, SessionError> {
        let registry: Arc<dyn SessionRegistry> = Arc::<Self>::clone(self);
        let session = Session::start(stream, commands, registry, options)?;
        self.lock().insert(session.id(), Arc::clone(&session));
        // A client that hangs up at once can close the session before it was
        // inserted, in which case its close notification found nothing.
        if !session.is_running() {
            self.close_session(session.id());
        }
        Ok(session)
    }

    /// Looks up an open session.
    #[must_use]
    pub fn get(&self, id: SessionId) -> Option<Arc<Session>> {
        self.lock().get(&id).cloned()
    }

    /// Number of open sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no session is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Ids of the open sessions in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<_> = self.lock().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Queues `value` on every open session.
    pub fn broadcast(&self, value: impl fmt::Display) {
        let line = value.to_string();
        for session in self.snapshot() {
            session.send(&line);
        }
    }

    /// Closes every open session and waits for their loops to finish.
    /// Returns the first join failure after attempting all of them.
    pub fn close_all(&self) -> Result<(), SessionError> {
        let sessions = self.snapshot();
        for session in &sessions {
            session.close();
        }
        let mut outcome = Ok(());
        for session in sessions {
            if let Err(error) = session.join() {
                warn!(
                    target: REGISTRY_TARGET,
                    session = %session.id(),
                    error = %error,
                    "session loop did not exit cleanly"
                );
                if outcome.is_ok() {
                    outcome = Err(error);
                }
            }
        }
        outcome
    }

    // Callers act on the copy so session callbacks never run under the lock.
    fn snapshot(&self) -> Vec<Arc<Session>> {
        self.lock().values().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, Arc<Session>>> {
        self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionRegistry for Sessions {
    fn close_session(&self, id: SessionId) {
        let removed = self.lock().remove(&id);
        if removed.is_some() {
            debug!(
                target: REGISTRY_TARGET,
                session = %id,
                remaining = self.len(),
                "session removed"
            );
        }
    }
}

impl fmt::Debug for Sessions {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Sessions")
            .field("open", &self.ids())
            .finish()
    }
}
