//! Error type for the Portcullis facade.

use portcullis_config::ConfigError;
use portcullis_context::{ContextError, SessionError};
use portcullis_telemetry::TelemetryError;
use thiserror::Error;

/// Result type for facade operations.
pub type PortcullisResult<T> = Result<T, PortcullisError>;

/// Errors raised by the facade.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PortcullisError {
    /// A web context call failed.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// A session store call failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Logging could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// Stored profiles could not be read back.
    #[error("stored profiles are corrupt: {0}")]
    ProfileCodec(#[source] serde_json::Error),
}

impl PortcullisError {
    /// Check if this error came from the session store.
    pub const fn is_session(&self) -> bool {
        matches!(self, Self::Session(_) | Self::Context(ContextError::Session(_)))
    }
}
