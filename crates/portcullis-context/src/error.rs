//! Error types for the context crate.

use thiserror::Error;

/// Result type for context operations.
pub type ContextResult<T> = Result<T, ContextError>;

/// Result type for session store operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors raised by a [`WebContext`](crate::WebContext) binding.
///
/// Absent values (missing parameter, header, cookie, attribute) are never
/// errors; they are reported as `None`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContextError {
    /// The binding did not opt in to the requested capability.
    #[error("operation not supported: {operation}")]
    UnsupportedOperation {
        /// Name of the unsupported operation.
        operation: &'static str,
    },

    /// The request body could not be exposed as text.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// The request body is larger than the accepted limit.
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge {
        /// Limit in bytes.
        limit: usize,
    },

    /// The buffered response could not be turned into a transport response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A session store call failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ContextError {
    /// Create an unsupported operation error.
    pub const fn unsupported(operation: &'static str) -> Self {
        Self::UnsupportedOperation { operation }
    }

    /// Create a payload too large error.
    pub const fn payload_too_large(limit: usize) -> Self {
        Self::PayloadTooLarge { limit }
    }

    /// Check if the request body was over the limit.
    pub const fn is_payload_too_large(&self) -> bool {
        matches!(self, Self::PayloadTooLarge { .. })
    }

    /// Check if this is an unsupported operation error.
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedOperation { .. })
    }
}

/// Errors surfaced by session store collaborators.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// The persistence backend failed.
    #[error("session backend error: {message}")]
    Backend {
        /// What the store was doing.
        message: String,
        /// Underlying backend error.
        #[source]
        source: anyhow::Error,
    },

    /// The session was destroyed or expired while the exchange still held
    /// its identifier.
    #[error("session {session_id} is no longer valid")]
    Invalidated {
        /// Identifier of the invalidated session.
        session_id: String,
    },

    /// Session data could not be (de)serialized.
    #[error("session codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// Session cookie payload is not valid base64.
    #[error("session encoding error: {0}")]
    Encoding(#[from] base64::DecodeError),
}

impl SessionError {
    /// Create a backend error.
    pub fn backend(message: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Backend {
            message: message.into(),
            source,
        }
    }

    /// Create an invalidated session error.
    pub fn invalidated(session_id: impl Into<String>) -> Self {
        Self::Invalidated {
            session_id: session_id.into(),
        }
    }

    /// Check if the session was invalidated under the exchange.
    pub const fn is_invalidated(&self) -> bool {
        matches!(self, Self::Invalidated { .. })
    }

    /// Check if this error came from the persistence backend.
    pub const fn is_backend(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }
}
