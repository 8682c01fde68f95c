//! Runs the server from configuration load to shutdown.

use std::sync::Arc;

use tracing::info;

use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap};
use crate::commands::BuiltinCommands;
use crate::registry::Sessions;
use crate::server::Server;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Runs the server with the process arguments and OS signal handling.
pub fn run_server() -> Result<(), LaunchError> {
    run_server_with(&SystemConfigLoader, &SystemShutdownSignal)
}

/// Runs the server with injected collaborators.
///
/// Returns after `shutdown` fires and every session has closed. If waiting
/// for the signal fails, the server is still stopped before the error is
/// returned.
pub fn run_server_with(
    loader: &dyn ConfigLoader,
    shutdown: &dyn ShutdownSignal,
) -> Result<(), LaunchError> {
    let config = bootstrap(loader)?.into_config();
    info!(target: PROCESS_TARGET, "starting server");

    let sessions = Arc::new(Sessions::new());
    let commands = Arc::new(BuiltinCommands::new(Arc::clone(&sessions)));
    let server = Server::start(&config, commands, sessions)?;

    let waited = shutdown.wait();
    server.shutdown()?;
    waited?;
    info!(target: PROCESS_TARGET, "shutdown sequence completed");
    Ok(())
}
