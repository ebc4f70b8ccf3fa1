//! Client error types

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Network or connection failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered but reported a failure
    #[error("Application error {code}: {message}")]
    Application { code: i64, message: String },

    /// Response section missing or malformed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Response sections do not line up with the request items
    #[error("Unexpected result: expected `{expected}` at position {position}, got `{actual}`")]
    UnexpectedResult {
        position: usize,
        expected: String,
        actual: String,
    },

    /// A deferred result was settled twice
    #[error("Deferred result already settled")]
    AlreadySettled,

    /// A deferred result was dropped before it was settled
    #[error("Deferred result dropped before it was settled")]
    Abandoned,

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CatalogError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an application error
    pub fn application(code: i64, message: impl Into<String>) -> Self {
        Self::Application {
            code,
            message: message.into(),
        }
    }

    /// Whether the failure happened before the API produced an answer
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Result type for client operations
pub type CatalogResult<T> = Result<T, CatalogError>;
