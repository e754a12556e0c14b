//! Well-known role name constants.
//!
//! Roles are carried in the signed session token; there is no other
//! channel for elevating a request to admin.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CUSTOMER: &str = "customer";
