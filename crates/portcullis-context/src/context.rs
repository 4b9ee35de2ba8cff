//! The [`WebContext`] facade.
//!
//! A `WebContext` is a transport-agnostic view of exactly one request and the
//! response being built for it, plus delegated access to the session. One
//! instance serves one exchange: it is created by the transport binding,
//! mutated through `&mut` by a single task, and dropped when the response is
//! produced.

use crate::cookie::Cookie;
use crate::error::{ContextError, ContextResult, SessionResult};
use crate::session::SessionStore;
use indexmap::IndexMap;
use portcullis_core::Value;
use std::sync::Arc;

/// Request parameters: name to every submitted value, in arrival order.
pub type Parameters = IndexMap<String, Vec<String>>;

/// Returns `true` if `scheme` denotes an encrypted transport.
#[must_use]
pub fn is_secure_scheme(scheme: &str) -> bool {
    scheme.eq_ignore_ascii_case("https") || scheme.eq_ignore_ascii_case("wss")
}

/// Transport-agnostic view of one request/response exchange.
///
/// # Session delegation
///
/// All session state is reached through the store returned by
/// [`session_store`](Self::session_store). The provided
/// [`set_session_attribute`](Self::set_session_attribute),
/// [`session_attribute`](Self::session_attribute) and
/// [`session_identifier`](Self::session_identifier) methods only forward to
/// that store with `self` as the context; bindings must not override them.
///
/// # Request body
///
/// [`request_content`](Self::request_content) fails with
/// [`ContextError::UnsupportedOperation`] unless the binding opts in, since
/// not every transport can re-read a body once parameters were parsed from
/// it. Check [`supports_request_content`](Self::supports_request_content)
/// before relying on it.
///
/// # Example
///
/// ```
/// use portcullis_context::{InMemorySessionStore, MockWebContext, WebContext};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let store = Arc::new(InMemorySessionStore::new());
/// let mut ctx = MockWebContext::new(store).with_parameter("lang", "en");
///
/// assert_eq!(ctx.request_parameter("lang"), Some("en"));
/// ctx.set_session_attribute("theme", json!("dark")).unwrap();
/// assert_eq!(ctx.session_attribute("theme").unwrap(), Some(json!("dark")));
/// ```
pub trait WebContext {
    /// Returns the session store this exchange delegates to.
    fn session_store(&self) -> Arc<dyn SessionStore>;

    /// Replaces the session store.
    fn set_session_store(&mut self, store: Arc<dyn SessionStore>);

    /// Returns the first value of a request parameter.
    fn request_parameter(&self, name: &str) -> Option<&str> {
        self.request_parameters()
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns every request parameter.
    fn request_parameters(&self) -> &Parameters;

    /// Returns a per-request scratch attribute.
    fn request_attribute(&self, name: &str) -> Option<&Value>;

    /// Stores a per-request scratch attribute, visible for the rest of this
    /// exchange only.
    fn set_request_attribute(&mut self, name: &str, value: Value);

    /// Returns a request header (case-insensitive name).
    fn request_header(&self, name: &str) -> Option<&str>;

    /// Returns the request method, e.g. `GET`.
    fn request_method(&self) -> &str;

    /// Returns the client address if the transport knows it.
    fn remote_addr(&self) -> Option<&str>;

    /// Returns the server host name the client addressed.
    fn server_name(&self) -> &str;

    /// Returns the server port the client addressed.
    fn server_port(&self) -> u16;

    /// Returns the request scheme, e.g. `https`.
    fn scheme(&self) -> &str;

    /// Returns `true` if the exchange runs over an encrypted transport.
    ///
    /// Always derived from [`scheme`](Self::scheme).
    fn is_secure(&self) -> bool {
        is_secure_scheme(self.scheme())
    }

    /// Returns the full URL the client requested, query string included.
    fn full_request_url(&self) -> String;

    /// Returns the request path without the query string.
    fn path(&self) -> &str;

    /// Appends `content` to the response body.
    ///
    /// Repeated calls accumulate; nothing written earlier is replaced.
    fn write_response_content(&mut self, content: &str);

    /// Sets the response status code. Last write wins.
    fn set_response_status(&mut self, code: u16);

    /// Sets a response header. Last write wins.
    fn set_response_header(&mut self, name: &str, value: &str);

    /// Sets the response content type. Last write wins.
    fn set_response_content_type(&mut self, content_type: &str);

    /// Returns the cookies sent with the request.
    fn request_cookies(&self) -> &[Cookie];

    /// Queues a cookie for the response.
    ///
    /// A queued cookie with the same name, path and domain is replaced.
    fn add_response_cookie(&mut self, cookie: Cookie);

    /// Returns `true` if [`request_content`](Self::request_content) is
    /// available on this binding.
    fn supports_request_content(&self) -> bool {
        false
    }

    /// Returns the raw request body.
    fn request_content(&self) -> ContextResult<String> {
        Err(ContextError::unsupported("request_content"))
    }

    /// Stores a value in the session through the session store.
    fn set_session_attribute(&mut self, name: &str, value: Value) -> SessionResult<()>
    where
        Self: Sized,
    {
        let store = self.session_store();
        store.set(self, name, value)
    }

    /// Reads a value from the session through the session store.
    fn session_attribute(&self, name: &str) -> SessionResult<Option<Value>>
    where
        Self: Sized,
    {
        let store = self.session_store();
        store.get(self, name)
    }

    /// Returns the session identifier, creating the session if needed.
    fn session_identifier(&mut self) -> SessionResult<String>
    where
        Self: Sized,
    {
        let store = self.session_store();
        store.get_or_create_session_id(self)
    }
}

/// Looks up a cookie by name among the request cookies.
pub fn request_cookie<'a>(ctx: &'a dyn WebContext, name: &str) -> Option<&'a Cookie> {
    ctx.request_cookies().iter().find(|cookie| cookie.name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_schemes() {
        assert!(is_secure_scheme("https"));
        assert!(is_secure_scheme("HTTPS"));
        assert!(is_secure_scheme("wss"));
        assert!(!is_secure_scheme("http"));
        assert!(!is_secure_scheme("ws"));
        assert!(!is_secure_scheme(""));
    }
}
