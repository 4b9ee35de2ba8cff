//! Fixed grants added to every profile.

use crate::generator::AuthorizationGenerator;
use portcullis_core::Profile;

/// Generator granting the same roles and permissions to every profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultGrantsGenerator {
    roles: Vec<String>,
    permissions: Vec<String>,
}

impl DefaultGrantsGenerator {
    /// Create a generator that grants nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add roles to grant.
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    /// Add permissions to grant.
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions
            .extend(permissions.into_iter().map(Into::into));
        self
    }

    /// Roles granted.
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Permissions granted.
    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }

    /// Returns `true` if the generator grants nothing.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.permissions.is_empty()
    }
}

impl AuthorizationGenerator for DefaultGrantsGenerator {
    fn generate(&self, profile: &mut dyn Profile) {
        for role in &self.roles {
            profile.add_role(role);
        }
        for permission in &self.permissions {
            profile.add_permission(permission);
        }
        tracing::trace!(profile_id = profile.id(), "default grants applied");
    }

    fn name(&self) -> &str {
        "default_grants"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portcullis_core::UserProfile;

    #[test]
    fn test_grants_fixed_values() {
        let generator = DefaultGrantsGenerator::new()
            .with_roles(["user"])
            .with_permissions(["profile:read", ""]);
        let mut profile = UserProfile::new("u-1");
        generator.generate(&mut profile);

        assert!(profile.roles().contains("user"));
        assert!(profile.permissions().contains("profile:read"));
        assert_eq!(profile.permissions().len(), 1);
    }

    #[test]
    fn test_empty_generator() {
        let generator = DefaultGrantsGenerator::new();
        assert!(generator.is_empty());

        let mut profile = UserProfile::new("u-1");
        generator.generate(&mut profile);
        assert!(profile.roles().is_empty());
    }
}
