//! # Portcullis Authz
//!
//! Authorization generators: strategies that add roles and permissions to a
//! freshly authenticated profile before it is sealed.
//!
//! ```text
//!   authentication          generators (in order)            pipeline
//!  ┌──────────────┐    ┌──────────────────────────────┐    ┌──────────┐
//!  │ UserProfile  │───▶│ FromAttributesGenerator      │───▶│  seal()  │
//!  │ + attributes │    │ DefaultGrantsGenerator       │    └──────────┘
//!  └──────────────┘    │ (any AuthorizationGenerator) │
//!                      └──────────────────────────────┘
//! ```
//!
//! Generators only see the [`Profile`](portcullis_core::Profile) mutation
//! contract, never the request.
//!
//! # Example
//!
//! ```
//! use portcullis_authz::{AuthorizationGenerator, FromAttributesGenerator, TokenTrim};
//! use portcullis_core::UserProfile;
//! use serde_json::json;
//!
//! let generator = FromAttributesGenerator::new(["roles"], ["permissions"])
//!     .with_trim(TokenTrim::Whitespace);
//!
//! let mut profile = UserProfile::new("alice")
//!     .with_attribute("roles", json!("admin, editor"))
//!     .with_attribute("permissions", json!(["not", "a", "string"]));
//! generator.generate(&mut profile);
//!
//! let profile = profile.seal();
//! assert!(profile.has_role("editor"));
//! assert!(profile.permissions().is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod default_grants;
mod from_attributes;
mod generator;
mod tokenizer;

pub use default_grants::DefaultGrantsGenerator;
pub use from_attributes::FromAttributesGenerator;
pub use generator::AuthorizationGenerator;
pub use tokenizer::{tokenize, TokenTrim, DEFAULT_DELIMITER};
