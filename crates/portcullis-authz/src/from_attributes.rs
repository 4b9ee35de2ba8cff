//! Grants derived from delimited profile attributes.

use crate::generator::AuthorizationGenerator;
use crate::tokenizer::{tokenize, TokenTrim, DEFAULT_DELIMITER};
use portcullis_core::{Profile, Value};

#[derive(Debug, Clone, Copy)]
enum Grant {
    Role,
    Permission,
}

impl Grant {
    fn add(self, profile: &mut dyn Profile, token: &str) -> bool {
        match self {
            Self::Role => profile.add_role(token),
            Self::Permission => profile.add_permission(token),
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Role => "role",
            Self::Permission => "permission",
        }
    }
}

/// Generator reading roles and permissions out of profile attributes.
///
/// Each configured attribute is looked up in order. A string value is split
/// on the delimiter characters and every token is granted; absent and
/// non-string attributes contribute nothing.
///
/// # Example
///
/// ```
/// use portcullis_authz::{AuthorizationGenerator, FromAttributesGenerator};
/// use portcullis_core::UserProfile;
/// use serde_json::json;
///
/// let generator = FromAttributesGenerator::new(["groups"], ["scopes"]);
///
/// let mut profile = UserProfile::new("u-1")
///     .with_attribute("groups", json!("admin,editor"))
///     .with_attribute("scopes", json!("read,write"));
/// generator.generate(&mut profile);
///
/// assert!(profile.roles().contains("admin"));
/// assert!(profile.permissions().contains("write"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FromAttributesGenerator {
    role_attributes: Vec<String>,
    permission_attributes: Vec<String>,
    delimiter: String,
    trim: TokenTrim,
}

impl Default for FromAttributesGenerator {
    fn default() -> Self {
        Self::new(Vec::<String>::new(), Vec::<String>::new())
    }
}

impl FromAttributesGenerator {
    /// Create a generator over the given role and permission attributes.
    pub fn new<R, P>(role_attributes: R, permission_attributes: P) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            role_attributes: role_attributes.into_iter().map(Into::into).collect(),
            permission_attributes: permission_attributes.into_iter().map(Into::into).collect(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            trim: TokenTrim::default(),
        }
    }

    /// Set the delimiter characters.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.set_delimiter(delimiter);
        self
    }

    /// Set the token trimming policy.
    pub fn with_trim(mut self, trim: TokenTrim) -> Self {
        self.trim = trim;
        self
    }

    /// Replace the delimiter characters used by later calls to `generate`.
    ///
    /// Every character of `delimiter` separates tokens; an empty string
    /// disables splitting.
    pub fn set_delimiter(&mut self, delimiter: impl Into<String>) {
        self.delimiter = delimiter.into();
    }

    /// Replace the token trimming policy.
    pub fn set_trim(&mut self, trim: TokenTrim) {
        self.trim = trim;
    }

    /// Current delimiter characters.
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Current trimming policy.
    pub fn trim(&self) -> TokenTrim {
        self.trim
    }

    /// Attributes read for roles, in lookup order.
    pub fn role_attributes(&self) -> &[String] {
        &self.role_attributes
    }

    /// Attributes read for permissions, in lookup order.
    pub fn permission_attributes(&self) -> &[String] {
        &self.permission_attributes
    }

    fn tokens(&self, profile: &dyn Profile, attribute: &str) -> Vec<String> {
        match profile.attribute(attribute) {
            Some(Value::String(value)) => tokenize(value, &self.delimiter, self.trim)
                .map(str::to_string)
                .collect(),
            Some(_) => {
                tracing::trace!(attribute, "non-string attribute skipped");
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    fn apply(&self, profile: &mut dyn Profile, attributes: &[String], grant: Grant) -> usize {
        let mut added = 0;
        for attribute in attributes {
            for token in self.tokens(&*profile, attribute) {
                if grant.add(profile, &token) {
                    added += 1;
                    tracing::trace!(
                        profile_id = profile.id(),
                        attribute = attribute.as_str(),
                        kind = grant.as_str(),
                        token = token.as_str(),
                        "grant added"
                    );
                }
            }
        }
        added
    }
}

impl AuthorizationGenerator for FromAttributesGenerator {
    fn generate(&self, profile: &mut dyn Profile) {
        let roles = self.apply(profile, &self.role_attributes, Grant::Role);
        let permissions = self.apply(profile, &self.permission_attributes, Grant::Permission);
        tracing::debug!(
            profile_id = profile.id(),
            roles,
            permissions,
            "attribute grants derived"
        );
    }

    fn name(&self) -> &str {
        "from_attributes"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portcullis_core::UserProfile;
    use serde_json::json;

    fn profile() -> UserProfile {
        UserProfile::new("u-1")
    }

    #[test]
    fn test_defaults() {
        let generator = FromAttributesGenerator::default();
        assert_eq!(generator.delimiter(), ",");
        assert_eq!(generator.trim(), TokenTrim::Preserve);
        assert!(generator.role_attributes().is_empty());
        assert_eq!(generator.name(), "from_attributes");
    }

    #[test]
    fn test_roles_and_permissions() {
        let generator = FromAttributesGenerator::new(["roles"], ["perms"]);
        let mut profile = profile()
            .with_attribute("roles", json!("admin,editor"))
            .with_attribute("perms", json!("read, write"));
        generator.generate(&mut profile);

        let roles: Vec<_> = profile.roles().iter().collect();
        let permissions: Vec<_> = profile.permissions().iter().collect();
        assert_eq!(roles, ["admin", "editor"]);
        assert_eq!(permissions, [" write", "read"]);
    }

    #[test]
    fn test_whitespace_trim() {
        let generator =
            FromAttributesGenerator::new(["roles"], ["perms"]).with_trim(TokenTrim::Whitespace);
        let mut profile = profile().with_attribute("perms", json!("read, write"));
        generator.generate(&mut profile);

        assert!(profile.permissions().contains("read"));
        assert!(profile.permissions().contains("write"));
        assert_eq!(profile.permissions().len(), 2);
    }

    #[test]
    fn test_several_sources_in_order() {
        let generator = FromAttributesGenerator::new(["groups", "extra_groups"], Vec::<String>::new());
        let mut profile = profile()
            .with_attribute("groups", json!("a,b"))
            .with_attribute("extra_groups", json!("b,c"));
        generator.generate(&mut profile);
        assert_eq!(profile.roles().len(), 3);
    }

    #[test]
    fn test_missing_and_non_string_attributes_are_skipped() {
        let generator = FromAttributesGenerator::new(["missing", "list", "number"], ["flag"]);
        let mut profile = profile()
            .with_attribute("list", json!(["admin"]))
            .with_attribute("number", json!(7))
            .with_attribute("flag", json!(true));
        generator.generate(&mut profile);

        assert!(profile.roles().is_empty());
        assert!(profile.permissions().is_empty());
    }

    #[test]
    fn test_set_delimiter_applies_to_later_calls() {
        let mut generator = FromAttributesGenerator::new(["roles"], Vec::<String>::new());
        let mut first = profile().with_attribute("roles", json!("a;b"));
        generator.generate(&mut first);
        assert!(first.roles().contains("a;b"));

        generator.set_delimiter(";");
        let mut second = profile().with_attribute("roles", json!("a;b"));
        generator.generate(&mut second);
        assert_eq!(second.roles().len(), 2);
        assert!(!second.roles().contains("a;b"));
    }

    #[test]
    fn test_generate_is_idempotent() {
        let generator = FromAttributesGenerator::new(["roles"], Vec::<String>::new());
        let mut profile = profile().with_attribute("roles", json!("a,b"));
        generator.generate(&mut profile);
        generator.generate(&mut profile);
        assert_eq!(profile.roles().len(), 2);
    }

    #[test]
    fn test_existing_grants_are_kept() {
        let generator = FromAttributesGenerator::new(["roles"], Vec::<String>::new());
        let mut profile = profile().with_attribute("roles", json!("b"));
        profile.add_role("a");
        generator.generate(&mut profile);
        assert_eq!(profile.roles().len(), 2);
    }
}
