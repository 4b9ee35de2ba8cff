//! Session stores.
//!
//! Every session read or write made through a [`WebContext`] is delegated to
//! a [`SessionStore`]. The store, not the context, owns session identity:
//! it decides how the identifier travels with the client, when a session is
//! created and when it expires.
//!
//! Two store families ship with Portcullis:
//!
//! - [`TrackedSessionStore`] keeps values server-side in a
//!   [`SessionBackend`] and tracks the identifier with a cookie.
//!   [`InMemorySessionStore`] pairs it with the process-local
//!   [`MemoryBackend`]; a shared backend (Redis, a database, ...) makes it a
//!   distributed store.
//! - [`CookieSessionStore`] keeps every value client-side in one cookie.
//!
//! Stores are shared by all concurrent exchanges (`Send + Sync`) and are
//! handed to contexts as `Arc<dyn SessionStore>`.

mod cookie;
mod memory;
mod tracked;

pub use cookie::{CookieSessionStore, DEFAULT_DATA_COOKIE_NAME, SESSION_DATA_ATTRIBUTE};
pub use memory::{MemoryBackend, DEFAULT_MAX_INACTIVE};
pub use tracked::{
    InMemorySessionStore, SessionBackend, TrackedSessionStore, DEFAULT_SESSION_COOKIE_NAME,
    SESSION_ID_ATTRIBUTE,
};

use crate::context::WebContext;
use crate::error::SessionResult;
use portcullis_core::Value;

/// Key/value session storage scoped by session identity.
///
/// Implementations must keep distinct sessions isolated and must make
/// concurrent writes to the same session safe: last writer wins, but a write
/// is never partially applied.
pub trait SessionStore: Send + Sync {
    /// Reads a session value. Never creates a session.
    fn get(&self, ctx: &dyn WebContext, name: &str) -> SessionResult<Option<Value>>;

    /// Writes a session value, creating the session if needed.
    ///
    /// Writing [`Value::Null`] removes the key.
    fn set(&self, ctx: &mut dyn WebContext, name: &str, value: Value) -> SessionResult<()>;

    /// Returns the identifier of the exchange's session, creating one if
    /// none exists. Repeated calls within the same session return the same
    /// identifier.
    fn get_or_create_session_id(&self, ctx: &mut dyn WebContext) -> SessionResult<String>;

    /// Destroys the exchange's session.
    ///
    /// Returns `true` if a session existed and was destroyed. Stores that
    /// cannot destroy sessions keep this default and report `false`.
    fn destroy_session(&self, ctx: &mut dyn WebContext) -> SessionResult<bool> {
        let _ = ctx;
        Ok(false)
    }
}
