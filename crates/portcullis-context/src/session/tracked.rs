//! Server-side session store tracked by a session cookie.

use super::memory::MemoryBackend;
use super::SessionStore;
use crate::context::{request_cookie, WebContext};
use crate::cookie::{Cookie, SameSite};
use crate::error::{SessionError, SessionResult};
use portcullis_core::Value;
use std::time::Duration;
use uuid::Uuid;

/// Default name of the cookie carrying the session identifier.
pub const DEFAULT_SESSION_COOKIE_NAME: &str = "PORTCULLIS_SESSION";

/// Request attribute remembering the session identifier within an exchange.
pub const SESSION_ID_ATTRIBUTE: &str = "portcullis.session_id";

/// Persistence seam of a [`TrackedSessionStore`].
///
/// A backend stores values by session identifier and decides when an idle
/// session expires. Calls may block; that is the backend's concern.
pub trait SessionBackend: Send + Sync {
    /// Creates an empty session.
    fn create(&self, session_id: &str) -> anyhow::Result<()>;

    /// Returns `true` if the session exists and has not expired, refreshing
    /// its idle timer.
    fn exists(&self, session_id: &str) -> anyhow::Result<bool>;

    /// Reads a value.
    fn get(&self, session_id: &str, name: &str) -> anyhow::Result<Option<Value>>;

    /// Writes a value into a live session; [`Value::Null`] removes the key.
    ///
    /// Returns `false` without writing if the session is gone or expired.
    /// Only [`create`](Self::create) may bring a session into existence.
    fn set(&self, session_id: &str, name: &str, value: Value) -> anyhow::Result<bool>;

    /// Removes the session, returning `true` if it existed.
    fn destroy(&self, session_id: &str) -> anyhow::Result<bool>;
}

/// Session store keeping values in a [`SessionBackend`] and the identifier
/// in a cookie.
///
/// The identifier is a random UUID. Once resolved or created it is also
/// kept in the [`SESSION_ID_ATTRIBUTE`] request attribute, so repeated
/// calls in the same exchange agree even before the client echoes the
/// cookie back.
///
/// # Example
///
/// ```
/// use portcullis_context::{InMemorySessionStore, MockWebContext, WebContext};
/// use std::sync::Arc;
///
/// let store = Arc::new(InMemorySessionStore::new());
/// let mut ctx = MockWebContext::new(store);
///
/// let first = ctx.session_identifier().unwrap();
/// let second = ctx.session_identifier().unwrap();
/// assert_eq!(first, second);
/// ```
#[derive(Debug)]
pub struct TrackedSessionStore<B> {
    backend: B,
    cookie_name: String,
    cookie_path: String,
    cookie_domain: Option<String>,
    same_site: SameSite,
}

/// Tracked session store backed by process memory.
pub type InMemorySessionStore = TrackedSessionStore<MemoryBackend>;

impl InMemorySessionStore {
    /// Create an in-memory store with the default idle timeout.
    pub fn new() -> Self {
        Self::with_backend(MemoryBackend::default())
    }

    /// Create an in-memory store whose sessions expire after `max_inactive`.
    pub fn with_max_inactive(max_inactive: Duration) -> Self {
        Self::with_backend(MemoryBackend::new(max_inactive))
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: SessionBackend> TrackedSessionStore<B> {
    /// Create a store over the given backend.
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            cookie_name: DEFAULT_SESSION_COOKIE_NAME.to_string(),
            cookie_path: "/".to_string(),
            cookie_domain: None,
            same_site: SameSite::Lax,
        }
    }

    /// Set the session cookie name.
    #[must_use]
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Set the session cookie path.
    #[must_use]
    pub fn with_cookie_path(mut self, path: impl Into<String>) -> Self {
        self.cookie_path = path.into();
        self
    }

    /// Set the session cookie domain.
    #[must_use]
    pub fn with_cookie_domain(mut self, domain: impl Into<String>) -> Self {
        self.cookie_domain = Some(domain.into());
        self
    }

    /// Set the session cookie `SameSite` attribute.
    #[must_use]
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Name of the session cookie.
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    fn base_cookie(&self, value: &str) -> Cookie {
        let cookie = Cookie::new(&self.cookie_name, value).with_path(&self.cookie_path);
        match self.cookie_domain {
            Some(ref domain) => cookie.with_domain(domain),
            None => cookie,
        }
    }

    fn session_cookie(&self, session_id: &str, secure: bool) -> Cookie {
        self.base_cookie(session_id)
            .with_http_only(true)
            .with_secure(secure)
            .with_same_site(self.same_site)
    }

    // Resolves the live session of the exchange without creating one.
    fn current_session_id(&self, ctx: &dyn WebContext) -> SessionResult<Option<String>> {
        if let Some(Value::String(id)) = ctx.request_attribute(SESSION_ID_ATTRIBUTE) {
            return Ok(Some(id.clone()));
        }

        let Some(cookie) = request_cookie(ctx, &self.cookie_name) else {
            return Ok(None);
        };
        let id = cookie.value();
        if id.is_empty() {
            return Ok(None);
        }

        let live = self
            .backend
            .exists(id)
            .map_err(|e| SessionError::backend("look up session", e))?;
        Ok(live.then(|| id.to_string()))
    }
}

impl<B: SessionBackend> SessionStore for TrackedSessionStore<B> {
    fn get(&self, ctx: &dyn WebContext, name: &str) -> SessionResult<Option<Value>> {
        match self.current_session_id(ctx)? {
            Some(id) => self
                .backend
                .get(&id, name)
                .map_err(|e| SessionError::backend("read session value", e)),
            None => Ok(None),
        }
    }

    fn set(&self, ctx: &mut dyn WebContext, name: &str, value: Value) -> SessionResult<()> {
        if value.is_null() && self.current_session_id(ctx)?.is_none() {
            return Ok(());
        }
        let removal = value.is_null();
        let id = self.get_or_create_session_id(ctx)?;
        let written = self
            .backend
            .set(&id, name, value)
            .map_err(|e| SessionError::backend("write session value", e))?;
        if written || removal {
            return Ok(());
        }

        // Destroyed by another exchange or expired since it was resolved.
        ctx.set_request_attribute(SESSION_ID_ATTRIBUTE, Value::Null);
        tracing::debug!(session_id = %id, "write to invalidated session rejected");
        Err(SessionError::invalidated(id))
    }

    fn get_or_create_session_id(&self, ctx: &mut dyn WebContext) -> SessionResult<String> {
        if let Some(id) = self.current_session_id(ctx)? {
            ctx.set_request_attribute(SESSION_ID_ATTRIBUTE, Value::String(id.clone()));
            return Ok(id);
        }

        let id = Uuid::new_v4().to_string();
        self.backend
            .create(&id)
            .map_err(|e| SessionError::backend("create session", e))?;

        let secure = ctx.is_secure();
        ctx.set_request_attribute(SESSION_ID_ATTRIBUTE, Value::String(id.clone()));
        ctx.add_response_cookie(self.session_cookie(&id, secure));
        tracing::debug!(session_id = %id, "session created");
        Ok(id)
    }

    fn destroy_session(&self, ctx: &mut dyn WebContext) -> SessionResult<bool> {
        let Some(id) = self.current_session_id(ctx)? else {
            return Ok(false);
        };

        let destroyed = self
            .backend
            .destroy(&id)
            .map_err(|e| SessionError::backend("destroy session", e))?;
        ctx.set_request_attribute(SESSION_ID_ATTRIBUTE, Value::Null);
        ctx.add_response_cookie(self.base_cookie("").with_max_age_secs(0));
        tracing::debug!(session_id = %id, "session destroyed");
        Ok(destroyed)
    }
}
