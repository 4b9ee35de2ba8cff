//! Typed configuration for Portcullis.
//!
//! Supports:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! [`PortcullisConfig`] holds three sections:
//!
//! - [`AuthorizationConfig`] - Which attributes feed roles and permissions
//! - [`SessionConfig`] - Session store kind and cookie settings
//! - [`LoggingConfig`] - Log level and format
//!
//! # Configuration File Format
//!
//! ```toml
//! [authorization]
//! role_attributes = ["groups"]
//! permission_attributes = ["scopes"]
//! delimiter = ","
//! trim = "whitespace"
//! default_roles = ["user"]
//!
//! [session]
//! store = "memory"
//! cookie_name = "PORTCULLIS_SESSION"
//! max_inactive_secs = 1800
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Every value can be overridden with `PREFIX__SECTION__KEY`:
//!
//! - `PORTCULLIS__AUTHORIZATION__ROLE_ATTRIBUTES=groups,roles`
//! - `PORTCULLIS__SESSION__STORE=cookie`
//! - `PORTCULLIS__LOGGING__LEVEL=debug`

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{PortcullisConfig, PortcullisConfigBuilder};
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use schema::{AuthorizationConfig, LogFormat, LoggingConfig, SessionConfig, SessionStoreKind};
pub use portcullis_authz::TokenTrim;
