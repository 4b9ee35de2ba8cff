//! Client-side session store.

use super::SessionStore;
use crate::context::{request_cookie, WebContext};
use crate::cookie::{Cookie, SameSite};
use crate::error::SessionResult;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use portcullis_core::Value;
use serde::{Deserialize, Serialize};
use serde_json::Map;
use std::time::Duration;
use uuid::Uuid;

/// Default name of the cookie carrying the session data.
pub const DEFAULT_DATA_COOKIE_NAME: &str = "PORTCULLIS_DATA";

/// Request attribute holding the exchange's working copy of the session.
pub const SESSION_DATA_ATTRIBUTE: &str = "portcullis.session_data";

// Identifier and user values live apart so no attribute name can reach the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionData {
    id: String,
    #[serde(default)]
    values: Map<String, Value>,
}

impl SessionData {
    fn new() -> Self {
        let id = Uuid::new_v4().to_string();
        tracing::debug!(session_id = %id, "cookie session created");
        Self {
            id,
            values: Map::new(),
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        Self::deserialize(value)
            .ok()
            .filter(|data| !data.id.is_empty())
    }

    fn to_value(&self) -> SessionResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Session store keeping every value in a single client-side cookie.
///
/// The payload is JSON encoded as unpadded base64url. It is neither signed
/// nor encrypted, so only non-sensitive values belong here. Within one
/// exchange the decoded payload is kept in the [`SESSION_DATA_ATTRIBUTE`]
/// request attribute and every write re-queues the cookie.
#[derive(Debug, Clone)]
pub struct CookieSessionStore {
    cookie_name: String,
    cookie_path: String,
    cookie_domain: Option<String>,
    max_age: Option<Duration>,
}

impl Default for CookieSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieSessionStore {
    /// Create a store using [`DEFAULT_DATA_COOKIE_NAME`].
    pub fn new() -> Self {
        Self {
            cookie_name: DEFAULT_DATA_COOKIE_NAME.to_string(),
            cookie_path: "/".to_string(),
            cookie_domain: None,
            max_age: None,
        }
    }

    /// Set the cookie name.
    #[must_use]
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Set the cookie path.
    #[must_use]
    pub fn with_cookie_path(mut self, path: impl Into<String>) -> Self {
        self.cookie_path = path.into();
        self
    }

    /// Set the cookie domain.
    #[must_use]
    pub fn with_cookie_domain(mut self, domain: impl Into<String>) -> Self {
        self.cookie_domain = Some(domain.into());
        self
    }

    /// Let the cookie outlive the browser session.
    #[must_use]
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Name of the data cookie.
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    fn base_cookie(&self, value: String) -> Cookie {
        let cookie = Cookie::new(&self.cookie_name, value).with_path(&self.cookie_path);
        match self.cookie_domain {
            Some(ref domain) => cookie.with_domain(domain),
            None => cookie,
        }
    }

    fn encode(data: &SessionData) -> SessionResult<String> {
        Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(data)?))
    }

    fn decode(payload: &str) -> SessionResult<SessionData> {
        let bytes = URL_SAFE_NO_PAD.decode(payload)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    // Working copy first, then the request cookie. A payload that does not
    // decode is treated as no session.
    fn load(&self, ctx: &dyn WebContext) -> Option<SessionData> {
        match ctx.request_attribute(SESSION_DATA_ATTRIBUTE) {
            Some(Value::Null) => return None,
            Some(value) => return SessionData::from_value(value),
            None => {}
        }

        let cookie = request_cookie(ctx, &self.cookie_name)?;
        if cookie.value().is_empty() {
            return None;
        }
        match Self::decode(cookie.value()) {
            Ok(data) if !data.id.is_empty() => Some(data),
            Ok(_) => {
                tracing::warn!(cookie = %self.cookie_name, "session cookie without identifier ignored");
                None
            }
            Err(error) => {
                tracing::warn!(cookie = %self.cookie_name, %error, "undecodable session cookie ignored");
                None
            }
        }
    }

    fn save(&self, ctx: &mut dyn WebContext, data: &SessionData) -> SessionResult<()> {
        let payload = Self::encode(data)?;
        let mut cookie = self
            .base_cookie(payload)
            .with_http_only(true)
            .with_secure(ctx.is_secure())
            .with_same_site(SameSite::Lax);
        if let Some(max_age) = self.max_age {
            cookie = cookie.with_max_age(max_age);
        }
        ctx.set_request_attribute(SESSION_DATA_ATTRIBUTE, data.to_value()?);
        ctx.add_response_cookie(cookie);
        Ok(())
    }
}

impl SessionStore for CookieSessionStore {
    fn get(&self, ctx: &dyn WebContext, name: &str) -> SessionResult<Option<Value>> {
        Ok(self.load(ctx).and_then(|mut data| data.values.remove(name)))
    }

    fn set(&self, ctx: &mut dyn WebContext, name: &str, value: Value) -> SessionResult<()> {
        let existing = self.load(ctx);
        if value.is_null() && existing.is_none() {
            return Ok(());
        }

        let mut data = existing.unwrap_or_else(SessionData::new);
        if value.is_null() {
            data.values.remove(name);
        } else {
            data.values.insert(name.to_string(), value);
        }
        self.save(ctx, &data)
    }

    fn get_or_create_session_id(&self, ctx: &mut dyn WebContext) -> SessionResult<String> {
        if let Some(data) = self.load(ctx) {
            if ctx.request_attribute(SESSION_DATA_ATTRIBUTE).is_none() {
                ctx.set_request_attribute(SESSION_DATA_ATTRIBUTE, data.to_value()?);
            }
            return Ok(data.id);
        }

        let data = SessionData::new();
        self.save(ctx, &data)?;
        Ok(data.id)
    }

    fn destroy_session(&self, ctx: &mut dyn WebContext) -> SessionResult<bool> {
        if self.load(ctx).is_none() {
            return Ok(false);
        }
        ctx.set_request_attribute(SESSION_DATA_ATTRIBUTE, Value::Null);
        ctx.add_response_cookie(self.base_cookie(String::new()).with_max_age_secs(0));
        Ok(true)
    }
}
