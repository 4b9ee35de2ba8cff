//! [`WebContext`] binding for [`http`] requests.
//!
//! The binding buffers the whole request body up front. Parameters are read
//! from the query string and, for `application/x-www-form-urlencoded`
//! requests, from the body as well. The raw body is only handed out through
//! [`WebContext::request_content`] after
//! [`with_request_content`](HttpWebContext::with_request_content).
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use portcullis_context::{HttpWebContext, InMemorySessionStore, WebContext};
//! use std::sync::Arc;
//!
//! let request = http::Request::builder()
//!     .uri("https://app.example.com/callback?code=xyz")
//!     .body(Bytes::new())
//!     .unwrap();
//!
//! let mut ctx = HttpWebContext::new(request, Arc::new(InMemorySessionStore::new())).unwrap();
//! assert_eq!(ctx.request_parameter("code"), Some("xyz"));
//! assert!(ctx.is_secure());
//!
//! ctx.set_response_status(302);
//! ctx.set_response_header("Location", "/home");
//! let response = ctx.into_response().unwrap();
//! assert_eq!(response.status(), 302);
//! ```

use crate::context::{Parameters, WebContext};
use crate::cookie::Cookie;
use crate::error::{ContextError, ContextResult};
use crate::response::ResponseBuffer;
use crate::session::SessionStore;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, COOKIE, HOST, SET_COOKIE};
use http::{HeaderMap, Request, Response, StatusCode};
use http_body::Body;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use portcullis_core::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Largest body accepted by [`HttpWebContext::from_request`] and parsed as a
/// form (1 MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// [`WebContext`] over a buffered [`http::Request`].
pub struct HttpWebContext {
    store: Arc<dyn SessionStore>,
    method: String,
    scheme: String,
    server_name: String,
    server_port: Option<u16>,
    path: String,
    query: Option<String>,
    remote_addr: Option<String>,
    headers: HeaderMap,
    parameters: Parameters,
    attributes: HashMap<String, Value>,
    cookies: Vec<Cookie>,
    body: Bytes,
    content_enabled: bool,
    response: ResponseBuffer,
}

impl HttpWebContext {
    /// Wrap a request whose body is already buffered.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::PayloadTooLarge`] for a form body over
    /// [`DEFAULT_MAX_BODY_SIZE`].
    pub fn new(request: Request<Bytes>, store: Arc<dyn SessionStore>) -> ContextResult<Self> {
        let (parts, body) = request.into_parts();
        let uri = &parts.uri;

        let (host_name, host_port) = parts
            .headers
            .get(HOST)
            .and_then(|value| value.to_str().ok())
            .map(split_host)
            .unwrap_or_default();
        let server_name = uri
            .host()
            .map(str::to_string)
            .or(host_name)
            .unwrap_or_else(|| "localhost".to_string());
        let server_port = uri.port_u16().or(host_port);

        let mut parameters = Parameters::new();
        if let Some(query) = uri.query() {
            parse_parameters(query, &mut parameters);
        }
        if is_form(&parts.headers) {
            if body.len() > DEFAULT_MAX_BODY_SIZE {
                return Err(ContextError::payload_too_large(DEFAULT_MAX_BODY_SIZE));
            }
            match std::str::from_utf8(&body) {
                Ok(form) => parse_parameters(form, &mut parameters),
                Err(error) => tracing::warn!(%error, "form body is not UTF-8, ignoring"),
            }
        }

        let cookies = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::parse_header)
            .collect();

        Ok(Self {
            store,
            method: parts.method.as_str().to_string(),
            scheme: uri.scheme_str().unwrap_or("http").to_string(),
            server_name,
            server_port,
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            remote_addr: None,
            headers: parts.headers,
            parameters,
            attributes: HashMap::new(),
            cookies,
            body,
            content_enabled: false,
            response: ResponseBuffer::new(),
        })
    }

    /// Buffer the body of a streaming request, then wrap it.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::PayloadTooLarge`] if the body exceeds
    /// [`DEFAULT_MAX_BODY_SIZE`] and [`ContextError::InvalidBody`] if reading
    /// it fails.
    pub async fn from_request<B>(
        request: Request<B>,
        store: Arc<dyn SessionStore>,
    ) -> ContextResult<Self>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        Self::from_request_limited(request, store, DEFAULT_MAX_BODY_SIZE).await
    }

    /// Like [`from_request`](Self::from_request) with a custom body limit.
    ///
    /// # Errors
    ///
    /// Same as [`from_request`](Self::from_request), against `limit`.
    pub async fn from_request_limited<B>(
        request: Request<B>,
        store: Arc<dyn SessionStore>,
        limit: usize,
    ) -> ContextResult<Self>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = request.into_parts();
        let bytes = Limited::new(body, limit)
            .collect()
            .await
            .map_err(|e| {
                if e.downcast_ref::<LengthLimitError>().is_some() {
                    ContextError::payload_too_large(limit)
                } else {
                    ContextError::InvalidBody(e.to_string())
                }
            })?
            .to_bytes();
        Self::new(Request::from_parts(parts, bytes), store)
    }

    /// Override the scheme, e.g. when TLS terminates in front of the server.
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Set the client address.
    #[must_use]
    pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = Some(addr.into());
        self
    }

    /// Make the raw body available through [`WebContext::request_content`].
    #[must_use]
    pub fn with_request_content(mut self) -> Self {
        self.content_enabled = true;
        self
    }

    /// The response built so far.
    pub fn response(&self) -> &ResponseBuffer {
        &self.response
    }

    /// Turn the buffered response into an [`http::Response`].
    ///
    /// The status defaults to `200 OK`. Every queued cookie becomes its own
    /// `Set-Cookie` header.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::InvalidResponse`] if the status, a header or
    /// a cookie cannot be represented in HTTP.
    pub fn into_response(self) -> ContextResult<Response<Full<Bytes>>> {
        let buffer = self.response;
        let status = StatusCode::from_u16(buffer.status().unwrap_or(200))
            .map_err(|e| ContextError::InvalidResponse(e.to_string()))?;

        let mut builder = Response::builder().status(status);
        for (name, value) in buffer.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(content_type) = buffer.content_type() {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        for cookie in buffer.cookies() {
            builder = builder.header(SET_COOKIE, cookie.to_header_value());
        }

        builder
            .body(Full::new(Bytes::from(buffer.body().to_string())))
            .map_err(|e| ContextError::InvalidResponse(e.to_string()))
    }

    fn default_port(&self) -> u16 {
        if self.is_secure() {
            443
        } else {
            80
        }
    }
}

impl fmt::Debug for HttpWebContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpWebContext")
            .field("method", &self.method)
            .field("url", &self.full_request_url())
            .field("remote_addr", &self.remote_addr)
            .field("body_len", &self.body.len())
            .field("response", &self.response)
            .finish_non_exhaustive()
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|media_type| media_type.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

fn parse_parameters(encoded: &str, parameters: &mut Parameters) {
    match serde_urlencoded::from_str::<Vec<(String, String)>>(encoded) {
        Ok(pairs) => {
            for (name, value) in pairs {
                parameters.entry(name).or_default().push(value);
            }
        }
        Err(error) => tracing::warn!(%error, "malformed parameters ignored"),
    }
}

// Splits `host[:port]`, leaving bracketed IPv6 literals intact.
fn split_host(host: &str) -> (Option<String>, Option<u16>) {
    let (name, port) = match host.rfind(':') {
        Some(idx) if !host[idx..].contains(']') => (&host[..idx], host[idx + 1..].parse().ok()),
        _ => (host, None),
    };
    let name = (!name.is_empty()).then(|| name.to_string());
    (name, port)
}

impl WebContext for HttpWebContext {
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
        self.headers.get(name)?.to_str().ok()
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
        if let Some(ref query) = self.query {
            url.push('?');
            url.push_str(query);
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
        self.content_enabled
    }

    fn request_content(&self) -> ContextResult<String> {
        if !self.content_enabled {
            return Err(ContextError::unsupported("request_content"));
        }
        std::str::from_utf8(&self.body)
            .map(str::to_string)
            .map_err(|e| ContextError::InvalidBody(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::InMemorySessionStore;

    fn store() -> Arc<dyn SessionStore> {
        Arc::new(InMemorySessionStore::new())
    }

    fn request(uri: &str) -> http::request::Builder {
        Request::builder().uri(uri)
    }

    #[test]
    fn test_split_host() {
        assert_eq!(split_host("example.com"), (Some("example.com".into()), None));
        assert_eq!(split_host("example.com:8080"), (Some("example.com".into()), Some(8080)));
        assert_eq!(split_host("[::1]:9000"), (Some("[::1]".into()), Some(9000)));
        assert_eq!(split_host("[::1]"), (Some("[::1]".into()), None));
    }

    #[test]
    fn test_server_from_host_header() {
        let req = request("/login")
            .header(HOST, "app.local:8080")
            .body(Bytes::new())
            .unwrap();
        let ctx = HttpWebContext::new(req, store()).unwrap();

        assert_eq!(ctx.server_name(), "app.local");
        assert_eq!(ctx.server_port(), 8080);
        assert_eq!(ctx.scheme(), "http");
        assert_eq!(ctx.full_request_url(), "http://app.local:8080/login");
    }

    #[test]
    fn test_absolute_uri_and_default_port() {
        let req = request("https://example.com/cb?state=s1&code=c1")
            .body(Bytes::new())
            .unwrap();
        let ctx = HttpWebContext::new(req, store()).unwrap();

        assert!(ctx.is_secure());
        assert_eq!(ctx.server_port(), 443);
        assert_eq!(ctx.path(), "/cb");
        assert_eq!(ctx.request_parameter("state"), Some("s1"));
        assert_eq!(ctx.full_request_url(), "https://example.com/cb?state=s1&code=c1");
    }

    #[test]
    fn test_scheme_override() {
        let req = request("/").header(HOST, "example.com").body(Bytes::new()).unwrap();
        let ctx = HttpWebContext::new(req, store()).unwrap().with_scheme("https");
        assert!(ctx.is_secure());
        assert_eq!(ctx.server_port(), 443);
    }

    #[test]
    fn test_form_parameters_merge_with_query() {
        let req = request("/login?tag=q")
            .method("POST")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded; charset=utf-8")
            .body(Bytes::from_static(b"username=alice&tag=f&note=hello+world"))
            .unwrap();
        let ctx = HttpWebContext::new(req, store()).unwrap();

        assert_eq!(ctx.request_method(), "POST");
        assert_eq!(ctx.request_parameter("username"), Some("alice"));
        assert_eq!(ctx.request_parameter("note"), Some("hello world"));
        assert_eq!(ctx.request_parameters()["tag"], vec!["q", "f"]);
    }

    #[test]
    fn test_json_body_is_not_parsed_as_parameters() {
        let req = request("/")
            .method("POST")
            .header(CONTENT_TYPE, "application/json")
            .body(Bytes::from_static(b"a=1"))
            .unwrap();
        let ctx = HttpWebContext::new(req, store()).unwrap();
        assert!(ctx.request_parameters().is_empty());
    }

    #[test]
    fn test_request_content_opt_in() {
        let req = request("/").body(Bytes::from_static(b"{\"a\":1}")).unwrap();
        let ctx = HttpWebContext::new(req, store()).unwrap();
        assert!(ctx.request_content().unwrap_err().is_unsupported());

        let req = request("/").body(Bytes::from_static(b"{\"a\":1}")).unwrap();
        let ctx = HttpWebContext::new(req, store()).unwrap().with_request_content();
        assert!(ctx.supports_request_content());
        assert_eq!(ctx.request_content().unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_request_content_rejects_invalid_utf8() {
        let req = request("/").body(Bytes::from_static(&[0xff, 0xfe])).unwrap();
        let ctx = HttpWebContext::new(req, store()).unwrap().with_request_content();
        assert!(matches!(ctx.request_content(), Err(ContextError::InvalidBody(_))));
    }

    #[test]
    fn test_headers_and_cookies() {
        let req = request("/")
            .header("X-Request-Id", "r-1")
            .header(COOKIE, "a=1; b=2")
            .header(COOKIE, "c=3")
            .body(Bytes::new())
            .unwrap();
        let ctx = HttpWebContext::new(req, store()).unwrap();

        assert_eq!(ctx.request_header("x-request-id"), Some("r-1"));
        assert_eq!(ctx.request_cookies().len(), 3);
        assert_eq!(crate::context::request_cookie(&ctx, "c").map(Cookie::value), Some("3"));
    }

    #[test]
    fn test_into_response() {
        let req = request("/").body(Bytes::new()).unwrap();
        let mut ctx = HttpWebContext::new(req, store()).unwrap();
        ctx.set_response_status(201);
        ctx.set_response_content_type("text/plain");
        ctx.set_response_header("X-Trace", "t1");
        ctx.write_response_content("created");
        ctx.add_response_cookie(Cookie::new("a", "1"));
        ctx.add_response_cookie(Cookie::new("b", "2"));

        let response = ctx.into_response().unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(response.headers()["x-trace"], "t1");
        assert_eq!(response.headers().get_all(SET_COOKIE).iter().count(), 2);
    }

    #[test]
    fn test_into_response_rejects_bad_status() {
        let req = request("/").body(Bytes::new()).unwrap();
        let mut ctx = HttpWebContext::new(req, store()).unwrap();
        ctx.set_response_status(42);
        assert!(matches!(ctx.into_response(), Err(ContextError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_from_streaming_request() {
        let req = request("/submit")
            .method("POST")
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(Full::new(Bytes::from_static(b"x=1")))
            .unwrap();
        let ctx = HttpWebContext::from_request(req, store()).await.unwrap();
        assert_eq!(ctx.request_parameter("x"), Some("1"));
    }

    #[test]
    fn test_form_media_type_is_case_insensitive() {
        let req = request("/")
            .method("POST")
            .header(CONTENT_TYPE, "Application/X-WWW-Form-Urlencoded ; charset=UTF-8")
            .body(Bytes::from_static(b"a=1"))
            .unwrap();
        let ctx = HttpWebContext::new(req, store()).unwrap();
        assert_eq!(ctx.request_parameter("a"), Some("1"));

        let req = request("/")
            .method("POST")
            .header(CONTENT_TYPE, "application/x-www-form-urlencodedx")
            .body(Bytes::from_static(b"a=1"))
            .unwrap();
        assert!(HttpWebContext::new(req, store()).unwrap().request_parameters().is_empty());
    }

    #[test]
    fn test_oversized_form_is_rejected() {
        let body = format!("a={}", "x".repeat(DEFAULT_MAX_BODY_SIZE));
        let req = request("/")
            .method("POST")
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(Bytes::from(body))
            .unwrap();
        let err = HttpWebContext::new(req, store()).unwrap_err();
        assert!(err.is_payload_too_large());
    }

    #[tokio::test]
    async fn test_streaming_body_over_limit_is_rejected() {
        let req = request("/upload")
            .method("POST")
            .body(Full::new(Bytes::from_static(b"0123456789")))
            .unwrap();
        let err = HttpWebContext::from_request_limited(req, store(), 4)
            .await
            .unwrap_err();
        assert!(matches!(err, ContextError::PayloadTooLarge { limit: 4 }));

        let req = request("/upload")
            .method("POST")
            .body(Full::new(Bytes::from_static(b"0123")))
            .unwrap();
        let ctx = HttpWebContext::from_request_limited(req, store(), 4)
            .await
            .unwrap()
            .with_request_content();
        assert_eq!(ctx.request_content().unwrap(), "0123");
    }
}
