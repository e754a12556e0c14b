//! Client for the external AI product-content service.

pub mod client;
