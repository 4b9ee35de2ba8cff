//! Logging setup for Portcullis.
//!
//! Portcullis crates emit `tracing` events:
//!
//! | Level | Event |
//! |-------|-------|
//! | `debug` | Session created or destroyed, grants derived, profile pipeline finished |
//! | `trace` | Each grant token added |
//! | `warn`  | Session cookie that could not be decoded |
//!
//! This crate turns those events into output. Applications that already
//! install their own subscriber do not need it.
//!
//! # Example
//!
//! ```rust,ignore
//! use portcullis_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production())?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
