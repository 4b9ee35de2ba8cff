//! In-memory [`WebContext`] for tests and examples.
//!
//! # Example
//!
//! ```
//! use portcullis_context::{InMemorySessionStore, MockWebContext, WebContext};
//! use std::sync::Arc;
//!
//! let mut ctx = MockWebContext::new(Arc::new(InMemorySessionStore::new()))
//!     .with_method("POST")
//!     .with_path("/login")
//!     .with_parameter("username", "alice")
//!     .with_request_content("username=alice");
//!
//! assert_eq!(ctx.request_method(), "POST");
//! assert_eq!(ctx.request_content().unwrap(), "username=alice");
//!
//! ctx.set_response_status(302);
//! assert_eq!(ctx.response().status(), Some(302));
//! ```

use crate::context::{Parameters, WebContext};
use crate::cookie::Cookie;
use crate::error::{ContextError, ContextResult};
use crate::response::ResponseBuffer;
use crate::session::SessionStore;
use indexmap::IndexMap;
use portcullis_core::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Scriptable context that never touches a transport.
pub struct MockWebContext {
    store: Arc<dyn SessionStore>,
    method: String,
    scheme: String,
    server_name: String,
    server_port: Option<u16>,
    path: String,
    remote_addr: Option<String>,
    parameters: Parameters,
    headers: IndexMap<String, String>,
    attributes: HashMap<String, Value>,
    cookies: Vec<Cookie>,
    content: Option<String>,
    response: ResponseBuffer,
}

impl MockWebContext {
    /// Create a `GET http://localhost/` exchange using `store` for sessions.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            method: "GET".to_string(),
            scheme: "http".to_string(),
            server_name: "localhost".to_string(),
            server_port: None,
            path: "/".to_string(),
            remote_addr: None,
            parameters: Parameters::new(),
            headers: IndexMap::new(),
            attributes: HashMap::new(),
            cookies: Vec::new(),
            content: None,
            response: ResponseBuffer::new(),
        }
    }

    /// Set the request method.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Set the request scheme.
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Set the server name and port.
    #[must_use]
    pub fn with_server(mut self, name: impl Into<String>, port: u16) -> Self {
        self.server_name = name.into();
        self.server_port = Some(port);
        self
    }

    /// Set the request path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the client address.
    #[must_use]
    pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = Some(addr.into());
        self
    }

    /// Add a value to a request parameter.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    /// Set a request header.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Add a request cookie.
    #[must_use]
    pub fn with_cookie(mut self, cookie: Cookie) -> Self {
        self.cookies.push(cookie);
        self
    }

    /// Opt in to [`WebContext::request_content`] with the given body.
    #[must_use]
    pub fn with_request_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// The response built so far.
    pub fn response(&self) -> &ResponseBuffer {
        &self.response
    }

    /// Cookies queued for the response.
    pub fn response_cookies(&self) -> &[Cookie] {
        self.response.cookies()
    }

    fn default_port(&self) -> u16 {
        if self.is_secure() {
            443
        } else {
            80
        }
    }
}

impl fmt::Debug for MockWebContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockWebContext")
            .field("method", &self.method)
            .field("url", &self.full_request_url())
            .field("parameters", &self.parameters)
            .field("attributes", &self.attributes)
            .field("response", &self.response)
            .finish_non_exhaustive()
    }
}

impl WebContext for MockWebContext {
    fn session_store(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.store)
    }

    fn set_session_store(&mut self, store: Arc<dyn SessionStore>) {
        self.store = store;
    }

    fn request_parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn request_attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    fn set_request_attribute(&mut self, name: &str, value: Value) {
        self.attributes.insert(name.to_string(), value);
    }

    fn request_header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    fn request_method(&self) -> &str {
        &self.method
    }

    fn remote_addr(&self) -> Option<&str> {
        self.remote_addr.as_deref()
    }

    fn server_name(&self) -> &str {
        &self.server_name
    }

    fn server_port(&self) -> u16 {
        self.server_port.unwrap_or_else(|| self.default_port())
    }

    fn scheme(&self) -> &str {
        &self.scheme
    }

    fn full_request_url(&self) -> String {
        let mut url = format!("{}://{}", self.scheme, self.server_name);
        let port = self.server_port();
        if port != self.default_port() {
            url.push_str(&format!(":{port}"));
        }
        url.push_str(&self.path);

        let pairs: Vec<(&str, &str)> = self
            .parameters
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |v| (name.as_str(), v.as_str())))
            .collect();
        if let Ok(query) = serde_urlencoded::to_string(&pairs) {
            if !query.is_empty() {
                url.push('?');
                url.push_str(&query);
            }
        }
        url
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn write_response_content(&mut self, content: &str) {
        self.response.append_body(content);
    }

    fn set_response_status(&mut self, code: u16) {
        self.response.set_status(code);
    }

    fn set_response_header(&mut self, name: &str, value: &str) {
        self.response.set_header(name, value);
    }

    fn set_response_content_type(&mut self, content_type: &str) {
        self.response.set_content_type(content_type);
    }

    fn request_cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    fn add_response_cookie(&mut self, cookie: Cookie) {
        self.response.queue_cookie(cookie);
    }

    fn supports_request_content(&self) -> bool {
        self.content.is_some()
    }

    fn request_content(&self) -> ContextResult<String> {
        self.content
            .clone()
            .ok_or_else(|| ContextError::unsupported("request_content"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::InMemorySessionStore;
    use serde_json::json;

    fn ctx() -> MockWebContext {
        MockWebContext::new(Arc::new(InMemorySessionStore::new()))
    }

    #[test]
    fn test_defaults() {
        let ctx = ctx();
        assert_eq!(ctx.request_method(), "GET");
        assert_eq!(ctx.scheme(), "http");
        assert!(!ctx.is_secure());
        assert_eq!(ctx.server_port(), 80);
        assert_eq!(ctx.full_request_url(), "http://localhost/");
        assert!(ctx.remote_addr().is_none());
    }

    #[test]
    fn test_parameters_first_value() {
        let ctx = ctx().with_parameter("tag", "a").with_parameter("tag", "b");
        assert_eq!(ctx.request_parameter("tag"), Some("a"));
        assert_eq!(ctx.request_parameters()["tag"], vec!["a", "b"]);
        assert!(ctx.request_parameter("missing").is_none());
    }

    #[test]
    fn test_full_url_with_port_and_query() {
        let ctx = ctx()
            .with_scheme("https")
            .with_server("example.com", 8443)
            .with_path("/cb")
            .with_parameter("code", "a b");
        assert!(ctx.is_secure());
        assert_eq!(ctx.full_request_url(), "https://example.com:8443/cb?code=a+b");
    }

    #[test]
    fn test_request_attributes() {
        let mut ctx = ctx();
        assert!(ctx.request_attribute("k").is_none());
        ctx.set_request_attribute("k", json!([1, 2]));
        assert_eq!(ctx.request_attribute("k"), Some(&json!([1, 2])));
    }

    #[test]
    fn test_headers_case_insensitive() {
        let ctx = ctx().with_header("X-Forwarded-For", "10.0.0.1");
        assert_eq!(ctx.request_header("x-forwarded-for"), Some("10.0.0.1"));
        assert!(ctx.request_header("accept").is_none());
    }

    #[test]
    fn test_request_content_requires_opt_in() {
        let plain = ctx();
        assert!(!plain.supports_request_content());
        assert!(plain.request_content().unwrap_err().is_unsupported());

        let with_body = ctx().with_request_content("{\"a\":1}");
        assert!(with_body.supports_request_content());
        assert_eq!(with_body.request_content().unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_response_content_appends() {
        let mut ctx = ctx();
        ctx.write_response_content("<p>");
        ctx.write_response_content("hi</p>");
        assert_eq!(ctx.response().body(), "<p>hi</p>");
    }

    #[test]
    fn test_swap_session_store() {
        let mut ctx = ctx();
        ctx.set_session_attribute("k", json!(1)).unwrap();

        ctx.set_session_store(Arc::new(InMemorySessionStore::new()));
        ctx.set_request_attribute(crate::session::SESSION_ID_ATTRIBUTE, Value::Null);
        assert_eq!(ctx.session_attribute("k").unwrap(), None);
    }
}
