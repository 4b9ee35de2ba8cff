//! The generator seam.

use portcullis_core::Profile;

/// Derives roles and permissions for a profile.
///
/// Generators run after authentication and before the profile is sealed.
/// They may only add grants; removing one is not part of the contract.
/// A generator is shared by every concurrent request once configured, so
/// `generate` takes `&self`.
pub trait AuthorizationGenerator: Send + Sync {
    /// Adds the grants this generator derives for `profile`.
    fn generate(&self, profile: &mut dyn Profile);

    /// Short name used in logs.
    fn name(&self) -> &str;
}
