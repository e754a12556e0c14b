//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod comment_repo;
pub mod contact_repo;
pub mod custom_design_repo;
pub mod customization_repo;
pub mod product_repo;
pub mod testimonial_repo;

pub use comment_repo::CommentRepo;
pub use contact_repo::ContactMessageRepo;
pub use custom_design_repo::CustomDesignRepo;
pub use customization_repo::CustomizationRepo;
pub use product_repo::ProductRepo;
pub use testimonial_repo::TestimonialRepo;
