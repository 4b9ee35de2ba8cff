//! # Portcullis
//!
//! Attribute-driven authorization for Rust web stacks.
//!
//! Portcullis turns the attributes an identity provider hands back
//! (`groups = "admin,editor"`, `scope = "read write"`) into roles and
//! permissions, and keeps the resulting profile in a session reached through
//! a transport-agnostic [`WebContext`](context::WebContext).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use portcullis::prelude::*;
//!
//! let config = ConfigLoader::new().with_file("portcullis.toml")?.load()?;
//! portcullis::init_logging(&config)?;
//! let security = Security::from_config(&config)?;
//!
//! // per exchange
//! let mut ctx = HttpWebContext::from_request(request, security.session_store()).await?;
//! let profile = security.login(&mut ctx, authenticated, false)?;
//! let response = ctx.into_response()?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! identity provider → UserProfile → AuthorizationPipeline → AuthenticatedProfile
//!                                     (generators in order)          │
//!                                                                    ▼
//!                         WebContext ──► SessionStore ◄── ProfileManager
//! ```
//!
//! | Crate | Contents |
//! |-------|----------|
//! | [`core`] | Profiles and grant sets |
//! | [`context`] | `WebContext`, cookies, session stores, HTTP binding |
//! | [`authz`] | Authorization generators and the tokenizer |
//! | [`config`] | Typed configuration and its loader |
//! | [`telemetry`] | Logging setup |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod manager;
mod pipeline;
mod security;

pub use portcullis_authz as authz;
pub use portcullis_config as config;
pub use portcullis_context as context;
pub use portcullis_core as core;
pub use portcullis_telemetry as telemetry;

pub use error::{PortcullisError, PortcullisResult};
pub use manager::{ProfileManager, DEFAULT_CLIENT_KEY, PROFILES_KEY};
pub use pipeline::AuthorizationPipeline;
pub use portcullis_config::{ConfigLoader, PortcullisConfig};
pub use security::{init_logging, log_config, Security};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::authz::{
        AuthorizationGenerator, DefaultGrantsGenerator, FromAttributesGenerator, TokenTrim,
    };
    pub use crate::context::{
        Cookie, HttpWebContext, InMemorySessionStore, SessionStore, WebContext,
    };
    pub use crate::core::{AuthenticatedProfile, Profile, UserProfile};
    pub use crate::{
        AuthorizationPipeline, ConfigLoader, PortcullisConfig, PortcullisError,
        PortcullisResult, ProfileManager, Security,
    };
}
