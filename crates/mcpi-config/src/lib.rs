//! Shared configuration for the MCPI command server.
//!
//! Configuration is layered by [`ortho_config`]: built-in defaults, then an
//! optional `mcpi.toml`, then `MCPI_*` environment variables, then command
//! line flags. The resolved [`Config`] tells the server where to listen, how
//! to log, and how long a single command line may grow.

mod defaults;
mod logging;
mod socket;

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_MAX_LINE_BYTES, DEFAULT_TCP_HOST, DEFAULT_TCP_PORT,
    default_listen_socket, default_log_filter, default_log_filter_string, default_log_format,
    default_max_line_bytes,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use socket::{SocketEndpoint, SocketParseError, SocketPreparationError};

/// Resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "MCPI")]
pub struct Config {
    /// Endpoint the server accepts client connections on.
    #[ortho_config(default = default_listen_socket())]
    #[serde(default = "default_listen_socket")]
    pub listen_socket: SocketEndpoint,
    /// `tracing` filter expression, e.g. `info` or `mcpid::session=debug`.
    #[ortho_config(default = default_log_filter_string())]
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Log output format.
    #[ortho_config(default = default_log_format())]
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
    /// Longest command line, in bytes, a client may send.
    #[ortho_config(default = default_max_line_bytes())]
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_socket: default_listen_socket(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            max_line_bytes: default_max_line_bytes(),
        }
    }
}

impl Config {
    /// Loads configuration from every layer using the process arguments.
    pub fn load() -> Result<Self, Arc<OrthoError>> {
        Self::load_from_iter(std::env::args_os())
    }

    /// Loads configuration using the supplied argument list in place of the
    /// process arguments. The first item is the program name.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as OrthoConfig>::load_from_iter(args)
    }

    /// Endpoint the server listens on.
    #[must_use]
    pub const fn listen_socket(&self) -> &SocketEndpoint {
        &self.listen_socket
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Maximum accepted length of an inbound command line.
    #[must_use]
    pub const fn max_line_bytes(&self) -> usize {
        self.max_line_bytes
    }
}
