//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the signed-in user from the session token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.

pub mod auth;
pub mod rbac;
