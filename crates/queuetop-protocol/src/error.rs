use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Malformed status line: expected {expected} fields, got {got}")]
    MalformedLine { expected: usize, got: usize },

    #[error("Invalid host spec: {0}")]
    InvalidHost(String),

    #[error("Invalid port in {host}: {port}")]
    InvalidPort { host: String, port: String },

    #[error("Invalid sort index: {0} (expected 1-4)")]
    InvalidSortIndex(String),
}
