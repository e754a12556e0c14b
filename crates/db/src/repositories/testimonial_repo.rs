//! Repository for the `testimonials` table.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::testimonial::{CreateTestimonial, Testimonial};

/// Column list for testimonials queries.
const COLUMNS: &str = "id, user_id, name, rating, story, image_urls, product_type, \
    purchase_date, status, moderated_at, created_at, updated_at";

/// Provides CRUD and moderation operations for testimonials.
pub struct TestimonialRepo;

impl TestimonialRepo {
    /// Create a new testimonial in `pending` status.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTestimonial,
    ) -> Result<Testimonial, sqlx::Error> {
        let query = format!(
            "INSERT INTO testimonials
                (user_id, name, rating, story, image_urls, product_type, purchase_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Testimonial>(&query)
            .bind(input.user_id)
            .bind(&input.name)
            .bind(input.rating)
            .bind(&input.story)
            .bind(&input.image_urls)
            .bind(&input.product_type)
            .bind(input.purchase_date)
            .fetch_one(pool)
            .await
    }

    /// Find a testimonial by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Testimonial>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM testimonials WHERE id = $1");
        sqlx::query_as::<_, Testimonial>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List testimonials, newest first, optionally filtered by status.
    pub async fn list_by_status(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Testimonial>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM testimonials
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Testimonial>(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Move a testimonial from `expected` to `status` and stamp `moderated_at`.
    ///
    /// Returns `None` when the row is missing or no longer in `expected`.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        expected: &str,
        status: &str,
    ) -> Result<Option<Testimonial>, sqlx::Error> {
        let query = format!(
            "UPDATE testimonials SET status = $3, moderated_at = now()
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Testimonial>(&query)
            .bind(id)
            .bind(expected)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Delete a testimonial still in `expected`. Returns `true` if a row was
    /// removed.
    pub async fn delete(pool: &PgPool, id: DbId, expected: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM testimonials WHERE id = $1 AND status = $2")
            .bind(id)
            .bind(expected)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
