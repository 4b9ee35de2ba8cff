//! # Portcullis Context
//!
//! Transport-agnostic request/response facade and session stores.
//!
//! ## Overview
//!
//! | Item | Purpose |
//! |------|---------|
//! | [`WebContext`] | One request/response exchange, independent of the transport |
//! | [`SessionStore`] | Where session reads and writes made through a context go |
//! | [`HttpWebContext`] | Binding over a buffered `http::Request` |
//! | [`MockWebContext`] | Scriptable binding for tests |
//! | [`Cookie`] | Inbound and outbound cookies |
//!
//! ## Example
//!
//! ```rust
//! use portcullis_context::{InMemorySessionStore, MockWebContext, WebContext};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemorySessionStore::new());
//! let mut ctx = MockWebContext::new(store).with_header("Accept", "text/html");
//!
//! assert_eq!(ctx.request_header("accept"), Some("text/html"));
//!
//! ctx.set_session_attribute("visits", json!(1)).unwrap();
//! let id = ctx.session_identifier().unwrap();
//! assert!(!id.is_empty());
//! ```

#![doc(html_root_url = "https://docs.rs/portcullis-context/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod cookie;
mod error;
mod http_context;
mod mock;
mod response;
pub mod session;

pub use context::{is_secure_scheme, request_cookie, Parameters, WebContext};
pub use cookie::{Cookie, SameSite};
pub use error::{ContextError, ContextResult, SessionError, SessionResult};
pub use http_context::{HttpWebContext, DEFAULT_MAX_BODY_SIZE};
pub use mock::MockWebContext;
pub use response::ResponseBuffer;
pub use session::{
    CookieSessionStore, InMemorySessionStore, MemoryBackend, SessionBackend, SessionStore,
    TrackedSessionStore, DEFAULT_DATA_COOKIE_NAME, DEFAULT_MAX_INACTIVE,
    DEFAULT_SESSION_COOKIE_NAME, SESSION_DATA_ATTRIBUTE, SESSION_ID_ATTRIBUTE,
};
