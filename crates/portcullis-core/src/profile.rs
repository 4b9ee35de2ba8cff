//! Authenticated identity profiles.
//!
//! A profile moves through two phases:
//!
//! 1. [`UserProfile`] is produced by an authentication step and enriched by
//!    authorization generators through the [`Profile`] contract.
//! 2. [`UserProfile::seal`] turns it into an [`AuthenticatedProfile`], which
//!    only exposes read accessors for the rest of the request.

use crate::{GrantSet, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Mutation contract consumed by authorization generators.
///
/// Both add operations are idempotent: adding a token twice leaves the
/// profile unchanged and returns `false`.
pub trait Profile {
    /// Returns the profile identifier.
    fn id(&self) -> &str;

    /// Looks up an identity attribute by name.
    fn attribute(&self, name: &str) -> Option<&Value>;

    /// Grants a role. Returns `true` if it was not granted yet.
    fn add_role(&mut self, role: &str) -> bool;

    /// Grants a permission. Returns `true` if it was not granted yet.
    fn add_permission(&mut self, permission: &str) -> bool;
}

/// Profile under construction.
///
/// # Example
///
/// ```
/// use portcullis_core::UserProfile;
/// use serde_json::json;
///
/// let mut profile = UserProfile::new("u-42")
///     .with_attribute("email", json!("alice@example.com"))
///     .with_attribute("groups", json!("admin,editor"));
/// profile.add_role("admin");
///
/// let sealed = profile.seal();
/// assert!(sealed.has_role("admin"));
/// assert_eq!(sealed.attribute("email"), Some(&json!("alice@example.com")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_name: Option<String>,
    #[serde(default)]
    attributes: IndexMap<String, Value>,
    #[serde(default)]
    roles: GrantSet,
    #[serde(default)]
    permissions: GrantSet,
    #[serde(default)]
    remember_me: bool,
}

impl UserProfile {
    /// Creates an empty profile with the given identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Returns the profile identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the name of the client that authenticated this profile.
    #[must_use]
    pub fn client_name(&self) -> Option<&str> {
        self.client_name.as_deref()
    }

    /// Sets the authenticating client name.
    pub fn set_client_name(&mut self, client_name: impl Into<String>) {
        self.client_name = Some(client_name.into());
    }

    /// Returns a profile with the authenticating client name set.
    #[must_use]
    pub fn with_client_name(mut self, client_name: impl Into<String>) -> Self {
        self.set_client_name(client_name);
        self
    }

    /// Adds or replaces an identity attribute.
    pub fn add_attribute(&mut self, name: impl Into<String>, value: Value) {
        self.attributes.insert(name.into(), value);
    }

    /// Returns a profile with the attribute added.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.add_attribute(name, value);
        self
    }

    /// Looks up an identity attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Returns all identity attributes in insertion order.
    #[must_use]
    pub fn attributes(&self) -> &IndexMap<String, Value> {
        &self.attributes
    }

    /// Grants a role.
    pub fn add_role(&mut self, role: impl Into<String>) -> bool {
        self.roles.insert(role)
    }

    /// Grants several roles at once.
    pub fn add_roles<I, S>(&mut self, roles: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles)
    }

    /// Grants a permission.
    pub fn add_permission(&mut self, permission: impl Into<String>) -> bool {
        self.permissions.insert(permission)
    }

    /// Grants several permissions at once.
    pub fn add_permissions<I, S>(&mut self, permissions: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions.extend(permissions)
    }

    /// Roles granted so far.
    #[must_use]
    pub fn roles(&self) -> &GrantSet {
        &self.roles
    }

    /// Permissions granted so far.
    #[must_use]
    pub fn permissions(&self) -> &GrantSet {
        &self.permissions
    }

    /// Whether the profile was authenticated with "remember me".
    #[must_use]
    pub fn is_remembered(&self) -> bool {
        self.remember_me
    }

    /// Marks the profile as remembered across sessions.
    pub fn set_remember_me(&mut self, remember_me: bool) {
        self.remember_me = remember_me;
    }

    /// Ends the generation phase.
    #[must_use]
    pub fn seal(self) -> AuthenticatedProfile {
        tracing::trace!(
            profile_id = %self.id,
            roles = self.roles.len(),
            permissions = self.permissions.len(),
            "profile sealed"
        );
        AuthenticatedProfile(self)
    }
}

impl Profile for UserProfile {
    fn id(&self) -> &str {
        &self.id
    }

    fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    fn add_role(&mut self, role: &str) -> bool {
        self.roles.insert(role)
    }

    fn add_permission(&mut self, permission: &str) -> bool {
        self.permissions.insert(permission)
    }
}

/// Read-only profile produced once authorization generation has finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthenticatedProfile(UserProfile);

impl AuthenticatedProfile {
    /// Returns the profile identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.0.id
    }

    /// Returns the name of the client that authenticated this profile.
    #[must_use]
    pub fn client_name(&self) -> Option<&str> {
        self.0.client_name()
    }

    /// Looks up an identity attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.0.attribute(name)
    }

    /// Returns all identity attributes.
    #[must_use]
    pub fn attributes(&self) -> &IndexMap<String, Value> {
        self.0.attributes()
    }

    /// Granted roles.
    #[must_use]
    pub fn roles(&self) -> &GrantSet {
        &self.0.roles
    }

    /// Granted permissions.
    #[must_use]
    pub fn permissions(&self) -> &GrantSet {
        &self.0.permissions
    }

    /// Returns `true` if the role was granted.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.0.roles.contains(role)
    }

    /// Returns `true` if the permission was granted.
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.0.permissions.contains(permission)
    }

    /// Whether the profile was authenticated with "remember me".
    #[must_use]
    pub fn is_remembered(&self) -> bool {
        self.0.remember_me
    }

    /// Returns an identifier suitable for logging.
    ///
    /// Never includes attribute values.
    #[must_use]
    pub fn log_id(&self) -> String {
        match self.client_name() {
            Some(client) => format!("{client}:{}", self.id()),
            None => format!("profile:{}", self.id()),
        }
    }

    /// Re-opens the profile for another generation phase.
    #[must_use]
    pub fn unseal(self) -> UserProfile {
        self.0
    }
}
