//! Repository for the `contact_messages` table.

use atelier_core::contact::ContactForm;
use sqlx::PgPool;

use crate::models::contact::ContactMessage;

/// Column list for contact_messages queries.
const COLUMNS: &str = "id, name, email, phone, subject, message, created_at";

/// Provides insert and listing for contact messages.
pub struct ContactMessageRepo;

impl ContactMessageRepo {
    /// Store a validated contact form.
    pub async fn create(pool: &PgPool, form: &ContactForm) -> Result<ContactMessage, sqlx::Error> {
        let query = format!(
            "INSERT INTO contact_messages (name, email, phone, subject, message)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContactMessage>(&query)
            .bind(&form.name)
            .bind(&form.email)
            .bind(&form.phone)
            .bind(&form.subject)
            .bind(&form.message)
            .fetch_one(pool)
            .await
    }

    /// List messages, newest first.
    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ContactMessage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contact_messages
             ORDER BY created_at DESC, id DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, ContactMessage>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
