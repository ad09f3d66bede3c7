//! Gateway error types

use thiserror::Error;

/// Gateway, transport and session errors
#[derive(Error, Debug)]
pub enum GatewayError {
    /// IO error during network operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Startup configuration problem
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Telnet/TN3270 negotiation failed
    #[error("Negotiation failed: {0}")]
    Negotiation(String),

    /// Operation timed out
    #[error("Operation timed out")]
    Timeout,

    /// Client sent a 3270 data stream we could not interpret
    #[error("Invalid data stream: {0}")]
    InvalidStream(String),

    /// Connection closed by the peer
    #[error("Connection closed")]
    ConnectionClosed,
}

/// Configuration errors, fatal at process start
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Feed list file could not be read
    #[error("cannot read feed list {path}: {source}")]
    Unreadable {
        /// Path that was attempted
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// No feed URLs were configured
    #[error("feed list is empty")]
    EmptyRegistry,

    /// A configuration value is out of range
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Feed retrieval and decoding errors
///
/// These never terminate a session: the session replaces the headline list
/// with a single diagnostic line built from the error's display text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Request exceeded the fetch timeout
    #[error("request timed out")]
    Timeout,

    /// Remote answered with a non-success status
    #[error("HTTP {status}: {body}")]
    RemoteStatus {
        /// HTTP status code
        status: u16,
        /// First bytes of the response body (at most 1024)
        body: String,
    },

    /// Document is not a well-formed feed
    #[error("decode error: {0}")]
    Decode(String),

    /// Lower-level connection failure
    #[error("network error: {0}")]
    Network(String),
}

/// Feed selection errors, surfaced on the selection screen
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// Numeric choice does not name a configured feed
    #[error("No feed #{index}, choose 0-{}", .len.saturating_sub(1))]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of configured feeds
        len: usize,
    },

    /// Choice field did not contain a number
    #[error("Not a feed number: {0}")]
    InvalidChoice(String),
}

/// Result type alias using GatewayError
pub type Result<T> = std::result::Result<T, GatewayError>;
