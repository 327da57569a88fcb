//! queuetop network - status source adapters
//!
//! A status source answers one question per poll tick: what does this
//! daemon's queue table look like right now. The engine only sees the
//! `StatusSource` trait; `TcpStatusSource` speaks the gearmand admin
//! text protocol (`status\n`, answered by lines ending with `.`).

pub mod source;
pub mod tcp;

pub use source::{fetch_all, StatusSource};
pub use tcp::{TcpSourceConfig, TcpStatusSource};

use thiserror::Error;

/// Errors raised while obtaining status from a daemon. Every variant is
/// fatal for the dashboard.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Couldn't connect to {host}: {source}")]
    Connect {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Timed out connecting to {host} after {timeout_ms}ms")]
    ConnectTimeout { host: String, timeout_ms: u128 },

    #[error("Timed out waiting for status from {host} after {timeout_ms}ms")]
    ReadTimeout { host: String, timeout_ms: u128 },

    #[error("I/O error talking to {host}: {source}")]
    Io {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Connection to {host} closed before the status listing ended")]
    Closed { host: String },
}

impl SourceError {
    /// Label of the host that failed.
    pub fn host(&self) -> &str {
        match self {
            SourceError::Connect { host, .. }
            | SourceError::ConnectTimeout { host, .. }
            | SourceError::ReadTimeout { host, .. }
            | SourceError::Io { host, .. }
            | SourceError::Closed { host } => host,
        }
    }
}
