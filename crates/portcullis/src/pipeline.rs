//! Ordered chain of authorization generators.

use portcullis_authz::AuthorizationGenerator;
use portcullis_core::{AuthenticatedProfile, UserProfile};
use std::fmt;
use std::sync::Arc;

/// Runs authorization generators over freshly authenticated profiles.
///
/// Generators run in registration order against the same mutable profile,
/// which is sealed once the last one returns. Generators are shared, so one
/// pipeline serves every concurrent exchange.
///
/// # Example
///
/// ```
/// use portcullis::AuthorizationPipeline;
/// use portcullis::authz::{DefaultGrantsGenerator, FromAttributesGenerator};
/// use portcullis::core::UserProfile;
/// use serde_json::json;
///
/// let pipeline = AuthorizationPipeline::new()
///     .with_generator(FromAttributesGenerator::new(["groups"], ["scopes"]))
///     .with_generator(DefaultGrantsGenerator::new().with_roles(["user"]));
///
/// let profile = UserProfile::new("u-1").with_attribute("groups", json!("admin"));
/// let sealed = pipeline.apply(profile);
///
/// assert!(sealed.has_role("admin"));
/// assert!(sealed.has_role("user"));
/// ```
#[derive(Clone, Default)]
pub struct AuthorizationPipeline {
    generators: Vec<Arc<dyn AuthorizationGenerator>>,
}

impl AuthorizationPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a generator.
    #[must_use]
    pub fn with_generator(mut self, generator: impl AuthorizationGenerator + 'static) -> Self {
        self.generators.push(Arc::new(generator));
        self
    }

    /// Append a generator that is already shared elsewhere.
    pub fn push(&mut self, generator: Arc<dyn AuthorizationGenerator>) {
        self.generators.push(generator);
    }

    /// Number of registered generators.
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    /// Returns `true` if no generator is registered.
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// Generator names in execution order.
    pub fn generator_names(&self) -> Vec<&str> {
        self.generators.iter().map(|g| g.name()).collect()
    }

    /// Run every generator over `profile`, then seal it.
    pub fn apply(&self, mut profile: UserProfile) -> AuthenticatedProfile {
        for generator in &self.generators {
            generator.generate(&mut profile);
        }

        let sealed = profile.seal();
        tracing::debug!(
            profile_id = %sealed.log_id(),
            generators = self.generators.len(),
            roles = sealed.roles().len(),
            permissions = sealed.permissions().len(),
            "authorization pipeline finished"
        );
        sealed
    }
}

impl fmt::Debug for AuthorizationPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationPipeline")
            .field("generators", &self.generator_names())
            .finish()
    }
}
