//! Configuration schema types.
//!
//! This module defines the structure of every configuration section.

use portcullis_authz::{TokenTrim, DEFAULT_DELIMITER};
use portcullis_context::{DEFAULT_DATA_COOKIE_NAME, DEFAULT_MAX_INACTIVE, DEFAULT_SESSION_COOKIE_NAME};
use serde::{Deserialize, Serialize};

/// Authorization section: how roles and permissions are derived.
///
/// # Example
///
/// ```
/// use portcullis_config::AuthorizationConfig;
///
/// let config = AuthorizationConfig {
///     role_attributes: vec!["groups".to_string()],
///     ..Default::default()
/// };
/// assert_eq!(config.delimiter, ",");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AuthorizationConfig {
    /// Profile attributes whose values list roles, in lookup order.
    #[serde(default)]
    pub role_attributes: Vec<String>,

    /// Profile attributes whose values list permissions, in lookup order.
    #[serde(default)]
    pub permission_attributes: Vec<String>,

    /// Characters separating tokens inside an attribute value.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Whitespace handling around tokens.
    #[serde(default)]
    pub trim: TokenTrim,

    /// Roles granted to every profile.
    #[serde(default)]
    pub default_roles: Vec<String>,

    /// Permissions granted to every profile.
    #[serde(default)]
    pub default_permissions: Vec<String>,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            role_attributes: Vec::new(),
            permission_attributes: Vec::new(),
            delimiter: default_delimiter(),
            trim: TokenTrim::default(),
            default_roles: Vec::new(),
            default_permissions: Vec::new(),
        }
    }
}

fn default_delimiter() -> String {
    DEFAULT_DELIMITER.to_string()
}

/// Which session store backs the web contexts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionStoreKind {
    /// Server-side, process-local sessions tracked by a cookie.
    #[default]
    Memory,
    /// Every session value kept in a client-side cookie.
    Cookie,
}

/// Session section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Store implementation.
    #[serde(default)]
    pub store: SessionStoreKind,

    /// Cookie carrying the session identifier (memory store).
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Cookie carrying the session payload (cookie store).
    #[serde(default = "default_data_cookie_name")]
    pub data_cookie_name: String,

    /// Idle seconds after which a server-side session expires.
    #[serde(default = "default_max_inactive_secs")]
    pub max_inactive_secs: u64,

    /// Path attribute of session cookies.
    #[serde(default = "default_cookie_path")]
    pub cookie_path: String,

    /// Domain attribute of session cookies.
    #[serde(default)]
    pub cookie_domain: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store: SessionStoreKind::default(),
            cookie_name: default_cookie_name(),
            data_cookie_name: default_data_cookie_name(),
            max_inactive_secs: default_max_inactive_secs(),
            cookie_path: default_cookie_path(),
            cookie_domain: None,
        }
    }
}

fn default_cookie_name() -> String {
    DEFAULT_SESSION_COOKIE_NAME.to_string()
}

fn default_data_cookie_name() -> String {
    DEFAULT_DATA_COOKIE_NAME.to_string()
}

fn default_max_inactive_secs() -> u64 {
    DEFAULT_MAX_INACTIVE.as_secs()
}

fn default_cookie_path() -> String {
    "/".to_string()
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
