//! Request thread comments.

use atelier_core::comments::CommentAuthor;
use atelier_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `request_comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub thread_kind: String,
    pub request_id: DbId,
    pub author_user_id: DbId,
    pub is_admin: bool,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
}

impl Comment {
    pub fn author(&self) -> CommentAuthor {
        CommentAuthor::from_is_admin(self.is_admin)
    }
}

/// Insert payload for a comment. Built by the API after validation.
#[derive(Debug, Clone)]
pub struct CreateComment {
    pub request_id: DbId,
    pub author_user_id: DbId,
    pub is_admin: bool,
    pub content: Option<String>,
    pub image_url: Option<String>,
}
