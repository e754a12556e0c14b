//! Repository for the `request_comments` table.

use atelier_core::comments::ThreadKind;
use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::comment::{Comment, CreateComment};

/// Column list for request_comments queries.
const COLUMNS: &str =
    "id, thread_kind, request_id, author_user_id, is_admin, content, image_url, created_at";

/// Provides thread operations for request comments.
pub struct CommentRepo;

impl CommentRepo {
    /// List a request's comments in creation order.
    pub async fn list_for_thread(
        pool: &PgPool,
        kind: ThreadKind,
        request_id: DbId,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM request_comments
             WHERE thread_kind = $1 AND request_id = $2
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(kind.as_str())
            .bind(request_id)
            .fetch_all(pool)
            .await
    }

    /// Append a comment to a thread, returning the created row.
    pub async fn create(
        pool: &PgPool,
        kind: ThreadKind,
        input: &CreateComment,
    ) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "INSERT INTO request_comments
                (thread_kind, request_id, author_user_id, is_admin, content, image_url)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(kind.as_str())
            .bind(input.request_id)
            .bind(input.author_user_id)
            .bind(input.is_admin)
            .bind(&input.content)
            .bind(&input.image_url)
            .fetch_one(pool)
            .await
    }
}
