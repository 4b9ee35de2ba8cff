//! Reading and writing authenticated profiles for one exchange.

use crate::error::{PortcullisError, PortcullisResult};
use indexmap::IndexMap;
use portcullis_context::WebContext;
use portcullis_core::{AuthenticatedProfile, Value};

/// Request attribute and session key holding the profiles.
pub const PROFILES_KEY: &str = "portcullis.profiles";

/// Key used for profiles that carry no client name.
pub const DEFAULT_CLIENT_KEY: &str = "default";

type Profiles = IndexMap<String, AuthenticatedProfile>;

/// Profile access bound to a single [`WebContext`].
///
/// Profiles are kept per client name under [`PROFILES_KEY`], both as a
/// request attribute (visible for the rest of the exchange) and, when asked
/// to, in the session (visible to later exchanges). Reads merge the two with
/// session entries taking precedence. Client order is the order of saving.
///
/// # Example
///
/// ```
/// use portcullis::ProfileManager;
/// use portcullis::context::{InMemorySessionStore, MockWebContext};
/// use portcullis::core::UserProfile;
/// use std::sync::Arc;
///
/// # fn main() -> Result<(), portcullis::PortcullisError> {
/// let mut ctx = MockWebContext::new(Arc::new(InMemorySessionStore::new()));
/// let mut manager = ProfileManager::new(&mut ctx);
///
/// manager.save(true, UserProfile::new("alice").seal(), false)?;
/// assert!(manager.is_authenticated()?);
/// assert_eq!(manager.get(true)?.map(|p| p.id().to_string()).as_deref(), Some("alice"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ProfileManager<'a, C: WebContext> {
    ctx: &'a mut C,
}

impl<'a, C: WebContext> ProfileManager<'a, C> {
    /// Bind a manager to the exchange.
    pub fn new(ctx: &'a mut C) -> Self {
        Self { ctx }
    }

    /// The underlying context.
    pub fn context(&mut self) -> &mut C {
        self.ctx
    }

    /// Return the first stored profile, if any.
    pub fn get(&self, read_from_session: bool) -> PortcullisResult<Option<AuthenticatedProfile>> {
        Ok(self.retrieve(read_from_session)?.into_values().next())
    }

    /// Return every stored profile in insertion order.
    pub fn get_all(&self, read_from_session: bool) -> PortcullisResult<Vec<AuthenticatedProfile>> {
        Ok(self.retrieve(read_from_session)?.into_values().collect())
    }

    /// Store `profile` under its client name.
    ///
    /// Unless `multi_profile` is set, profiles from other clients are
    /// dropped.
    pub fn save(
        &mut self,
        save_in_session: bool,
        profile: AuthenticatedProfile,
        multi_profile: bool,
    ) -> PortcullisResult<()> {
        let mut profiles = if multi_profile {
            self.retrieve(save_in_session)?
        } else {
            Profiles::new()
        };

        let key = profile
            .client_name()
            .unwrap_or(DEFAULT_CLIENT_KEY)
            .to_string();
        tracing::debug!(
            profile_id = %profile.log_id(),
            save_in_session,
            multi_profile,
            "saving profile"
        );
        profiles.shift_remove(&key);
        profiles.insert(key, profile);

        let value = encode(&profiles)?;
        if save_in_session {
            self.ctx.set_session_attribute(PROFILES_KEY, value.clone())?;
        }
        self.ctx.set_request_attribute(PROFILES_KEY, value);
        Ok(())
    }

    /// Forget every profile of this exchange and, optionally, of the session.
    pub fn remove(&mut self, remove_from_session: bool) -> PortcullisResult<()> {
        self.ctx.set_request_attribute(PROFILES_KEY, Value::Null);
        if remove_from_session {
            self.ctx.set_session_attribute(PROFILES_KEY, Value::Null)?;
        }
        Ok(())
    }

    /// Remove every profile and destroy the session.
    ///
    /// Returns `true` if a session existed.
    pub fn logout(&mut self) -> PortcullisResult<bool> {
        self.remove(true)?;
        let store = self.ctx.session_store();
        let destroyed = store.destroy_session(&mut *self.ctx)?;
        tracing::debug!(destroyed, "logout");
        Ok(destroyed)
    }

    /// Returns `true` if a profile is stored for this exchange or session.
    pub fn is_authenticated(&self) -> PortcullisResult<bool> {
        Ok(!self.retrieve(true)?.is_empty())
    }

    fn retrieve(&self, read_from_session: bool) -> PortcullisResult<Profiles> {
        let mut profiles = decode(self.ctx.request_attribute(PROFILES_KEY).cloned())?;
        if read_from_session {
            let stored = decode(self.ctx.session_attribute(PROFILES_KEY)?)?;
            for (client, profile) in stored {
                profiles.insert(client, profile);
            }
        }
        Ok(profiles)
    }
}

// Stored as `[[client, profile], ...]`; a JSON object would not keep the
// save order.
fn encode(profiles: &Profiles) -> PortcullisResult<Value> {
    let entries: Vec<(&String, &AuthenticatedProfile)> = profiles.iter().collect();
    serde_json::to_value(entries).map_err(PortcullisError::ProfileCodec)
}

fn decode(value: Option<Value>) -> PortcullisResult<Profiles> {
    match value {
        None | Some(Value::Null) => Ok(Profiles::new()),
        Some(value) => serde_json::from_value::<Vec<(String, AuthenticatedProfile)>>(value)
            .map(|entries| entries.into_iter().collect())
            .map_err(PortcullisError::ProfileCodec),
    }
}
