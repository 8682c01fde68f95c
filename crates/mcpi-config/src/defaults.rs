use crate::logging::LogFormat;
use crate::socket::SocketEndpoint;

/// Port the MCPI protocol listens on unless configured otherwise.
pub const DEFAULT_TCP_PORT: u16 = 4711;

/// Interface the server binds to by default. Clients usually connect from
/// another machine on the local network, so every interface is used.
pub const DEFAULT_TCP_HOST: &str = "0.0.0.0";

/// Default log filter expression used by the server.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Longest inbound command line accepted before a session is dropped.
pub const DEFAULT_MAX_LINE_BYTES: usize = 64 * 1024;

/// Default log filter expression used by the server.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default upper bound on a single command line.
#[must_use]
pub const fn default_max_line_bytes() -> usize {
    DEFAULT_MAX_LINE_BYTES
}

/// Computes the endpoint the server listens on when nothing is configured.
#[must_use]
pub fn default_listen_socket() -> SocketEndpoint {
    SocketEndpoint::tcp(DEFAULT_TCP_HOST, DEFAULT_TCP_PORT)
}
