//! Domain logic for the Atelier storefront and back-office.
//!
//! Everything here is pure: no IO, no database, no HTTP. The `db` and `api`
//! crates call into these modules for validation, state transitions and
//! view-model reconciliation.

pub mod ai_content;
pub mod comments;
pub mod contact;
pub mod error;
pub mod gems;
pub mod pagination;
pub mod pricing;
pub mod product_details;
pub mod request_status;
pub mod roles;
pub mod testimonial;
pub mod types;
pub mod upload;
