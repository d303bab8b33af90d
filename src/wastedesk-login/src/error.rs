//! Error types for session management.

use thiserror::Error;

/// Errors surfaced by transports.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server answered and refused the request.
    #[error("{message}")]
    Rejected {
        /// HTTP status, when the transport has one.
        status: Option<u16>,
        /// Human-readable reason.
        message: String,
    },

    /// The request never got a usable answer.
    #[error("network error: {0}")]
    Network(String),

    /// The answer could not be decoded.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Transport configuration is unusable.
    #[error("invalid transport configuration: {0}")]
    Config(String),
}

impl TransportError {
    /// Convenience constructor for a refusal without a status.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            status: None,
            message: message.into(),
        }
    }
}

/// Errors from the persistent key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors surfaced by [`crate::AuthSession`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// Persisted or received session data failed structural validation.
    #[error("malformed session: {0}")]
    MalformedSession(String),

    /// Fetching permissions failed.
    #[error("failed to fetch permissions: {0}")]
    PermissionFetch(#[source] TransportError),

    /// Credentials or OTP were refused.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The auth transport failed for a reason other than a refusal.
    #[error("auth transport error: {0}")]
    Transport(#[source] TransportError),

    /// Persistent storage failed.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl SessionError {
    /// Maps an auth transport failure: refusals become `Authentication`.
    pub(crate) fn from_auth(err: TransportError) -> Self {
        match err {
            TransportError::Rejected { message, .. } => Self::Authentication(message),
            other => Self::Transport(other),
        }
    }

    /// Returns the error category name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedSession(_) => "malformed_session",
            Self::PermissionFetch(_) => "permission_fetch",
            Self::Authentication(_) => "authentication",
            Self::Transport(_) => "transport",
            Self::Storage(_) => "storage",
        }
    }
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
