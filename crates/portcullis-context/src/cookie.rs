//! Cookies exchanged through a [`WebContext`](crate::WebContext).
//!
//! Portcullis treats cookie contents as opaque. Parsing of the inbound
//! `Cookie` header and rendering of `Set-Cookie` values exist only so the
//! bundled bindings can move cookies across the transport.
//!
//! # Example
//!
//! ```rust
//! use portcullis_context::{Cookie, SameSite};
//!
//! let cookie = Cookie::new("session", "abc123")
//!     .with_http_only(true)
//!     .with_secure(true)
//!     .with_same_site(SameSite::Strict)
//!     .with_max_age_secs(3600)
//!     .with_path("/");
//!
//! let header = cookie.to_header_value();
//! assert!(header.contains("session=abc123"));
//! assert!(header.contains("HttpOnly"));
//! assert!(header.contains("SameSite=Strict"));
//! ```

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    /// Cookie is sent with cross-site requests.
    None,
    /// Cookie is sent with same-site and cross-site top-level navigations.
    #[default]
    Lax,
    /// Cookie is only sent with same-site requests.
    Strict,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Lax => write!(f, "Lax"),
            Self::Strict => write!(f, "Strict"),
        }
    }
}

/// A cookie read from a request or queued for a response.
///
/// Inbound cookies only carry a name and a value; the metadata fields are
/// meaningful for outbound cookies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    name: String,
    value: String,
    domain: Option<String>,
    path: Option<String>,
    max_age: Option<Duration>,
    expires: Option<DateTime<Utc>>,
    secure: bool,
    http_only: bool,
    same_site: Option<SameSite>,
}

impl Cookie {
    /// Create a new cookie.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
            max_age: None,
            expires: None,
            secure: false,
            http_only: false,
            same_site: None,
        }
    }

    /// Create a cookie that tells the client to drop `name` (Max-Age=0).
    #[must_use]
    pub fn removal(name: impl Into<String>) -> Self {
        Self::new(name, "").with_max_age_secs(0)
    }

    /// Parse every `name=value` pair of a `Cookie` request header.
    ///
    /// Pairs without `=` are skipped; surrounding quotes are removed.
    #[must_use]
    pub fn parse_header(header_value: &str) -> Vec<Self> {
        header_value
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some(Self::new(name, value.trim().trim_matches('"')))
            })
            .collect()
    }

    /// Set the Domain attribute.
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set the Path attribute.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the Max-Age attribute.
    #[must_use]
    pub fn with_max_age(mut self, duration: Duration) -> Self {
        self.max_age = Some(duration);
        self
    }

    /// Set the Max-Age attribute in seconds.
    #[must_use]
    pub fn with_max_age_secs(self, seconds: u64) -> Self {
        self.with_max_age(Duration::from_secs(seconds))
    }

    /// Set the Expires attribute.
    #[must_use]
    pub fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Set the Secure attribute.
    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set the `HttpOnly` attribute.
    #[must_use]
    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Set the `SameSite` attribute.
    #[must_use]
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    /// Cookie name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cookie value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Domain attribute.
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Path attribute.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Max-Age attribute.
    #[must_use]
    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    /// Expires attribute.
    #[must_use]
    pub fn expires(&self) -> Option<DateTime<Utc>> {
        self.expires
    }

    /// Secure attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// `HttpOnly` attribute.
    #[must_use]
    pub fn is_http_only(&self) -> bool {
        self.http_only
    }

    /// `SameSite` attribute.
    #[must_use]
    pub fn same_site(&self) -> Option<SameSite> {
        self.same_site
    }

    /// Returns `true` if both cookies address the same client-side slot
    /// (same name, path and domain).
    #[must_use]
    pub fn same_slot(&self, other: &Self) -> bool {
        self.name == other.name && self.path == other.path && self.domain == other.domain
    }

    /// Render as a `Set-Cookie` header value.
    #[must_use]
    pub fn to_header_value(&self) -> String {
        let mut parts = vec![format!("{}={}", self.name, self.value)];

        if let Some(ref domain) = self.domain {
            parts.push(format!("Domain={domain}"));
        }

        if let Some(ref path) = self.path {
            parts.push(format!("Path={path}"));
        }

        if let Some(max_age) = self.max_age {
            parts.push(format!("Max-Age={}", max_age.as_secs()));
        }

        if let Some(expires) = self.expires {
            parts.push(format!("Expires={}", expires.format("%a, %d %b %Y %H:%M:%S GMT")));
        }

        if self.secure {
            parts.push("Secure".to_string());
        }

        if self.http_only {
            parts.push("HttpOnly".to_string());
        }

        if let Some(same_site) = self.same_site {
            parts.push(format!("SameSite={same_site}"));
        }

        parts.join("; ")
    }
}
