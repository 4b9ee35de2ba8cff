//! Bootstrapping Portcullis from configuration.

use crate::error::PortcullisResult;
use crate::manager::ProfileManager;
use crate::pipeline::AuthorizationPipeline;
use portcullis_authz::{DefaultGrantsGenerator, FromAttributesGenerator};
use portcullis_config::{
    AuthorizationConfig, LogFormat, LoggingConfig, PortcullisConfig, SessionConfig,
    SessionStoreKind,
};
use portcullis_context::{CookieSessionStore, InMemorySessionStore, SessionStore, WebContext};
use portcullis_core::{AuthenticatedProfile, UserProfile};
use portcullis_telemetry::LogConfig;
use std::sync::Arc;
use std::time::Duration;

/// Session store and authorization pipeline shared by every exchange.
///
/// # Example
///
/// ```
/// use portcullis::{PortcullisConfig, Security};
/// use portcullis::context::MockWebContext;
/// use portcullis::core::UserProfile;
/// use serde_json::json;
///
/// # fn main() -> Result<(), portcullis::PortcullisError> {
/// let mut config = PortcullisConfig::default();
/// config.authorization.role_attributes = vec!["groups".to_string()];
/// let security = Security::from_config(&config)?;
///
/// let mut ctx = MockWebContext::new(security.session_store());
/// let profile = UserProfile::new("alice").with_attribute("groups", json!("admin"));
/// let sealed = security.login(&mut ctx, profile, false)?;
///
/// assert!(sealed.has_role("admin"));
/// assert!(security.profiles(&mut ctx).is_authenticated()?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Security {
    store: Arc<dyn SessionStore>,
    pipeline: AuthorizationPipeline,
}

impl Security {
    /// Assemble from parts.
    pub fn new(store: Arc<dyn SessionStore>, pipeline: AuthorizationPipeline) -> Self {
        Self { store, pipeline }
    }

    /// Validate `config` and build the store and pipeline it describes.
    pub fn from_config(config: &PortcullisConfig) -> PortcullisResult<Self> {
        config.validate()?;

        let store = session_store(&config.session);
        let pipeline = pipeline(&config.authorization);
        tracing::debug!(
            store = ?config.session.store,
            generators = ?pipeline.generator_names(),
            "security configured"
        );
        Ok(Self::new(store, pipeline))
    }

    /// Session store to hand to each context.
    pub fn session_store(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.store)
    }

    /// Authorization pipeline.
    pub fn pipeline(&self) -> &AuthorizationPipeline {
        &self.pipeline
    }

    /// Profile manager for one exchange.
    pub fn profiles<'a, C: WebContext>(&self, ctx: &'a mut C) -> ProfileManager<'a, C> {
        ProfileManager::new(ctx)
    }

    /// Derive grants for a freshly authenticated profile and store it in
    /// the session.
    pub fn login<C: WebContext>(
        &self,
        ctx: &mut C,
        profile: UserProfile,
        multi_profile: bool,
    ) -> PortcullisResult<AuthenticatedProfile> {
        let sealed = self.pipeline.apply(profile);
        ProfileManager::new(ctx).save(true, sealed.clone(), multi_profile)?;
        Ok(sealed)
    }
}

impl std::fmt::Debug for Security {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Security")
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

fn session_store(config: &SessionConfig) -> Arc<dyn SessionStore> {
    let max_inactive = Duration::from_secs(config.max_inactive_secs);
    match config.store {
        SessionStoreKind::Memory => {
            let mut store = InMemorySessionStore::with_max_inactive(max_inactive)
                .with_cookie_name(&config.cookie_name)
                .with_cookie_path(&config.cookie_path);
            if let Some(domain) = &config.cookie_domain {
                store = store.with_cookie_domain(domain);
            }
            Arc::new(store)
        }
        SessionStoreKind::Cookie => {
            let mut store = CookieSessionStore::new()
                .with_cookie_name(&config.data_cookie_name)
                .with_cookie_path(&config.cookie_path)
                .with_max_age(max_inactive);
            if let Some(domain) = &config.cookie_domain {
                store = store.with_cookie_domain(domain);
            }
            Arc::new(store)
        }
    }
}

fn pipeline(config: &AuthorizationConfig) -> AuthorizationPipeline {
    let mut pipeline = AuthorizationPipeline::new().with_generator(
        FromAttributesGenerator::new(
            config.role_attributes.clone(),
            config.permission_attributes.clone(),
        )
        .with_delimiter(&config.delimiter)
        .with_trim(config.trim),
    );

    let defaults = DefaultGrantsGenerator::new()
        .with_roles(config.default_roles.iter().cloned())
        .with_permissions(config.default_permissions.iter().cloned());
    if !defaults.is_empty() {
        pipeline = pipeline.with_generator(defaults);
    }
    pipeline
}

/// Translate the logging section into a subscriber configuration.
pub fn log_config(config: &LoggingConfig) -> LogConfig {
    let base = match config.format {
        LogFormat::Json => LogConfig::production(),
        LogFormat::Pretty => LogConfig::development(),
    };
    LogConfig {
        enabled: config.enabled,
        level: config.level.clone(),
        ..base
    }
}

/// Install the global subscriber described by `config.logging`.
pub fn init_logging(config: &PortcullisConfig) -> PortcullisResult<()> {
    portcullis_telemetry::init_logging(&log_config(&config.logging))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use portcullis_config::TokenTrim;
    use portcullis_context::MockWebContext;
    use serde_json::json;

    fn config() -> PortcullisConfig {
        let mut config = PortcullisConfig::default();
        config.authorization.role_attributes = vec!["groups".to_string()];
        config.authorization.permission_attributes = vec!["scopes".to_string()];
        config
    }

    #[test]
    fn test_default_pipeline_has_only_attribute_generator() {
        let security = Security::from_config(&config()).unwrap();
        assert_eq!(security.pipeline().generator_names(), ["from_attributes"]);
    }

    #[test]
    fn test_default_grants_are_appended() {
        let mut config = config();
        config.authorization.default_roles = vec!["user".to_string()];

        let security = Security::from_config(&config).unwrap();
        assert_eq!(
            security.pipeline().generator_names(),
            ["from_attributes", "default_grants"]
        );
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = config();
        config.session.max_inactive_secs = 0;
        assert!(Security::from_config(&config).is_err());
    }

    #[test]
    fn test_trim_and_delimiter_reach_generator() {
        let mut config = config();
        config.authorization.delimiter = ";".to_string();
        config.authorization.trim = TokenTrim::Whitespace;
        let security = Security::from_config(&config).unwrap();

        let profile = UserProfile::new("u-1").with_attribute("scopes", json!("read; write"));
        let sealed = security.pipeline().apply(profile);
        assert!(sealed.has_permission("read"));
        assert!(sealed.has_permission("write"));
    }

    #[test]
    fn test_memory_store_uses_configured_cookie() {
        let mut config = config();
        config.session.cookie_name = "APP_SID".to_string();
        let security = Security::from_config(&config).unwrap();

        let mut ctx = MockWebContext::new(security.session_store());
        security
            .login(&mut ctx, UserProfile::new("alice"), false)
            .unwrap();

        let cookies = ctx.response_cookies();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name(), "APP_SID");
    }

    #[test]
    fn test_cookie_store_uses_data_cookie() {
        let mut config = config();
        config.session.store = SessionStoreKind::Cookie;
        config.session.data_cookie_name = "APP_DATA".to_string();
        let security = Security::from_config(&config).unwrap();

        let mut ctx = MockWebContext::new(security.session_store());
        security
            .login(&mut ctx, UserProfile::new("alice"), false)
            .unwrap();

        let cookie = ctx
            .response_cookies()
            .iter()
            .find(|c| c.name() == "APP_DATA")
            .unwrap();
        assert_eq!(cookie.max_age(), Some(Duration::from_secs(1800)));
    }

    #[test]
    fn test_log_config_mapping() {
        let logging = LoggingConfig {
            enabled: false,
            level: "warn".to_string(),
            format: LogFormat::Pretty,
        };
        let log = log_config(&logging);
        assert!(!log.enabled);
        assert!(!log.json_format);
        assert_eq!(log.level, "warn");

        assert!(init_logging(&PortcullisConfig {
            logging,
            ..config()
        })
        .is_ok());
    }
}
