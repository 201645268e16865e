//! Unified error type.

use std::net::AddrParseError;
use std::path::PathBuf;

/// The error type returned by arbor's fallible operations.
///
/// Request-level failures (no route, a handler calling
/// [`Context::fail`](crate::Context::fail), a recovered panic) are HTTP
/// responses, never `Error`s. This type covers infrastructure only: binding,
/// accepting, and loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{addr}`: {source}")]
    Addr {
        addr: String,
        #[source]
        source: AddrParseError,
    },

    #[error("failed to read config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
}
