//! `appealwall-auth` — who the user is and what they may open.
//!
//! This crate is intentionally decoupled from HTTP and storage: it models the
//! principal the server reports, token grants, and the per-route access check.

pub mod authorize;
pub mod principal;
pub mod roles;
pub mod token;

pub use authorize::{AccessDecision, AuthRequirement, authorize};
pub use principal::{Authority, Principal, User, UserPrincipal};
pub use roles::Role;
pub use token::{NO_EXPIRY, ResourceTokenResponse, TokenGrant, TokenResponse, is_expired};
