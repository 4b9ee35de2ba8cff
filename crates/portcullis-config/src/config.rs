//! Main configuration types.
//!
//! This module provides the top-level [`PortcullisConfig`] struct and its builder.

use serde::{Deserialize, Serialize};

use crate::{AuthorizationConfig, ConfigError, ConfigResult, LogFormat, LoggingConfig, SessionConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Complete Portcullis configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use portcullis_config::PortcullisConfig;
///
/// let config = PortcullisConfig::default();
/// assert_eq!(config.authorization.delimiter, ",");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct PortcullisConfig {
    /// Authorization generation settings.
    #[serde(default)]
    pub authorization: AuthorizationConfig,

    /// Session store settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PortcullisConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> PortcullisConfigBuilder {
        PortcullisConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        let authz = &self.authorization;
        for (field, names) in [
            ("authorization.role_attributes", &authz.role_attributes),
            ("authorization.permission_attributes", &authz.permission_attributes),
        ] {
            if names.iter().any(String::is_empty) {
                return Err(ConfigError::invalid_value(field, "attribute names must not be empty"));
            }
        }

        let session = &self.session;
        validate_cookie_name("session.cookie_name", &session.cookie_name)?;
        validate_cookie_name("session.data_cookie_name", &session.data_cookie_name)?;

        if session.max_inactive_secs == 0 {
            return Err(ConfigError::invalid_value(
                "session.max_inactive_secs",
                "must be greater than zero",
            ));
        }

        if !session.cookie_path.starts_with('/') {
            return Err(ConfigError::invalid_value(
                "session.cookie_path",
                format!("must start with '/': {}", session.cookie_path),
            ));
        }

        if session.cookie_domain.as_deref() == Some("") {
            return Err(ConfigError::invalid_value(
                "session.cookie_domain",
                "must be omitted rather than empty",
            ));
        }

        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!("expected one of {}", LOG_LEVELS.join(", ")),
            ));
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Pretty debug logs; everything else at defaults.
    ///
    /// # Example
    ///
    /// ```
    /// use portcullis_config::PortcullisConfig;
    ///
    /// let config = PortcullisConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config
    }

    /// Create a production configuration preset.
    ///
    /// JSON logs at info level and a shorter idle timeout.
    ///
    /// # Example
    ///
    /// ```
    /// use portcullis_config::{LogFormat, PortcullisConfig};
    ///
    /// let config = PortcullisConfig::production();
    /// assert_eq!(config.logging.format, LogFormat::Json);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.session.max_inactive_secs = 15 * 60;
        config
    }
}

// Cookie names are RFC 6265 tokens.
fn validate_cookie_name(field: &str, name: &str) -> ConfigResult<()> {
    if name.is_empty() {
        return Err(ConfigError::invalid_value(field, "must not be empty"));
    }
    let invalid = name.chars().any(|c| {
        c.is_ascii_control() || c.is_whitespace() || !c.is_ascii() || "()<>@,;:\\\"/[]?={}".contains(c)
    });
    if invalid {
        return Err(ConfigError::invalid_value(
            field,
            format!("not a valid cookie name: {name}"),
        ));
    }
    Ok(())
}

/// Builder for [`PortcullisConfig`].
#[derive(Debug, Default)]
pub struct PortcullisConfigBuilder {
    authorization: Option<AuthorizationConfig>,
    session: Option<SessionConfig>,
    logging: Option<LoggingConfig>,
}

impl PortcullisConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the authorization configuration.
    #[must_use]
    pub fn authorization(mut self, authorization: AuthorizationConfig) -> Self {
        self.authorization = Some(authorization);
        self
    }

    /// Set the session configuration.
    #[must_use]
    pub fn session(mut self, session: SessionConfig) -> Self {
        self.session = Some(session);
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration. Unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> PortcullisConfig {
        PortcullisConfig {
            authorization: self.authorization.unwrap_or_default(),
            session: self.session.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> ConfigResult<PortcullisConfig> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SessionStoreKind;

    #[test]
    fn test_default_config_is_valid() {
        let config = PortcullisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.session.store, SessionStoreKind::Memory);
    }

    #[test]
    fn test_presets() {
        let dev = PortcullisConfig::development();
        assert_eq!(dev.logging.format, LogFormat::Pretty);
        assert!(dev.validate().is_ok());

        let prod = PortcullisConfig::production();
        assert_eq!(prod.session.max_inactive_secs, 900);
        assert!(prod.validate().is_ok());
    }

    #[test]
    fn test_builder_keeps_other_defaults() {
        let config = PortcullisConfig::builder()
            .session(SessionConfig {
                store: SessionStoreKind::Cookie,
                ..Default::default()
            })
            .build();
        assert_eq!(config.session.store, SessionStoreKind::Cookie);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_zero_idle_timeout_rejected() {
        let mut config = PortcullisConfig::default();
        config.session.max_inactive_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("session.max_inactive_secs"));
    }

    #[test]
    fn test_bad_cookie_names_rejected() {
        for name in ["", "a b", "a;b", "a=b", "sé"] {
            let mut config = PortcullisConfig::default();
            config.session.cookie_name = name.to_string();
            assert!(config.validate().is_err(), "{name:?} should be rejected");
        }
    }

    #[test]
    fn test_cookie_path_must_be_absolute() {
        let mut config = PortcullisConfig::default();
        config.session.cookie_path = "app".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_attribute_name_rejected() {
        let config = PortcullisConfig::builder()
            .authorization(AuthorizationConfig {
                role_attributes: vec!["groups".to_string(), String::new()],
                ..Default::default()
            })
            .build_validated();
        assert!(config.is_err());
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let mut config = PortcullisConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
        config.logging.level = "WARN".to_string();
        assert!(config.validate().is_ok());
    }
}
