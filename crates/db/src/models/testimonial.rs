//! Customer testimonials.

use atelier_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `testimonials` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Testimonial {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub name: String,
    pub rating: i16,
    pub story: String,
    pub image_urls: Vec<String>,
    pub product_type: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub status: String,
    pub moderated_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Testimonial {
    pub fn is_approved(&self) -> bool {
        self.status == atelier_core::testimonial::ModerationStatus::Approved.as_str()
    }
}

/// A testimonial as returned by the API, with the derived approval flag.
#[derive(Debug, Clone, Serialize)]
pub struct TestimonialView {
    #[serde(flatten)]
    pub testimonial: Testimonial,
    pub is_approved: bool,
}

impl From<Testimonial> for TestimonialView {
    fn from(testimonial: Testimonial) -> Self {
        Self {
            is_approved: testimonial.is_approved(),
            testimonial,
        }
    }
}

/// Insert payload for a testimonial. Built from a validated submission.
#[derive(Debug, Clone)]
pub struct CreateTestimonial {
    pub user_id: Option<DbId>,
    pub name: String,
    pub rating: i16,
    pub story: String,
    pub image_urls: Vec<String>,
    pub product_type: Option<String>,
    pub purchase_date: Option<NaiveDate>,
}
