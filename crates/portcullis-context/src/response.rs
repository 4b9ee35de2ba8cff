//! Buffered outbound response shared by the bundled bindings.

use crate::cookie::Cookie;
use indexmap::IndexMap;

/// Response metadata and body accumulated during one exchange.
///
/// Header names are stored lower-cased, so setting `Content-Language` and
/// then `content-language` keeps only the second value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseBuffer {
    status: Option<u16>,
    headers: IndexMap<String, String>,
    content_type: Option<String>,
    body: String,
    cookies: Vec<Cookie>,
}

impl ResponseBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Status set so far, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Set the status; last write wins.
    pub fn set_status(&mut self, code: u16) {
        self.status = Some(code);
    }

    /// Header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Every header in first-set order.
    #[must_use]
    pub fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    /// Set a header; last write wins.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
    }

    /// Content type set so far, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Set the content type; last write wins.
    pub fn set_content_type(&mut self, content_type: &str) {
        self.content_type = Some(content_type.to_string());
    }

    /// Body written so far.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Append to the body.
    pub fn append_body(&mut self, content: &str) {
        self.body.push_str(content);
    }

    /// Cookies queued for the response.
    #[must_use]
    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    /// Queue a cookie, replacing one queued for the same slot.
    pub fn queue_cookie(&mut self, cookie: Cookie) {
        match self.cookies.iter_mut().find(|queued| queued.same_slot(&cookie)) {
            Some(queued) => *queued = cookie,
            None => self.cookies.push(cookie),
        }
    }
}
