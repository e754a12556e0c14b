pub mod contact;
pub mod content;
pub mod custom_designs;
pub mod customizations;
pub mod products;
pub mod requests;
pub mod testimonials;
pub mod threads;
pub mod upload;
