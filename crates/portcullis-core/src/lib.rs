//! # Portcullis Core
//!
//! Core types shared by every Portcullis crate.
//!
//! - [`UserProfile`] - Authenticated identity being enriched with roles and permissions
//! - [`AuthenticatedProfile`] - Sealed, read-only profile once generation is finished
//! - [`GrantSet`] - Grow-only set of non-empty role or permission tokens
//! - [`Profile`] - Mutation contract consumed by authorization generators

#![doc(html_root_url = "https://docs.rs/portcullis-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod grants;
mod profile;

pub use grants::GrantSet;
pub use profile::{AuthenticatedProfile, Profile, UserProfile};

/// Attribute value type carried by profiles, request attributes and sessions.
pub type Value = serde_json::Value;
