//! Comment-thread plumbing shared by custom design and customization requests.

use atelier_core::comments::{normalize_content, validate_comment, CommentAuthor, ThreadKind};
use atelier_core::error::CoreError;
use atelier_core::types::DbId;
use atelier_core::upload::validate_image_upload;
use atelier_db::models::comment::{Comment, CreateComment};
use atelier_db::repositories::CommentRepo;
use axum::extract::Multipart;
use serde::Serialize;
use sqlx::PgPool;

use super::upload::{discard_image, store_image};
use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

/// A comment as rendered in a thread.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: CommentAuthor,
}

impl From<Comment> for CommentView {
    fn from(comment: Comment) -> Self {
        let author = comment.author();
        Self { comment, author }
    }
}

/// A request together with its comments in creation order.
#[derive(Debug, Clone, Serialize)]
pub struct RequestThread<R> {
    pub request: R,
    pub comments: Vec<CommentView>,
}

/// Load a request's comments in creation order.
pub async fn load_comments(
    pool: &PgPool,
    kind: ThreadKind,
    request_id: DbId,
) -> AppResult<Vec<CommentView>> {
    let comments = CommentRepo::list_for_thread(pool, kind, request_id).await?;
    Ok(comments.into_iter().map(CommentView::from).collect())
}

/// Customers may only see and comment on their own requests.
pub fn ensure_participant(user: &AuthUser, owner_id: DbId) -> AppResult<()> {
    if user.is_admin() || user.user_id == owner_id {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "You can only access your own requests".into(),
        )))
    }
}

/// An uploaded comment image held in memory until the comment is accepted.
#[derive(Debug)]
pub struct CommentImage {
    pub filename: String,
    pub data: Vec<u8>,
}

/// A comment submission read from a multipart form.
///
/// Fields: `content` (text), `image` (file) and `image_url` (text). An
/// uploaded file takes precedence over `image_url`.
#[derive(Debug, Default)]
pub struct CommentForm {
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub image: Option<CommentImage>,
}

impl CommentForm {
    /// Read the form fields; unknown fields are ignored.
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = CommentForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "content" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    form.content = normalize_content(Some(text));
                }
                "image_url" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    form.image_url = normalize_content(Some(text));
                }
                "image" => {
                    let filename = field.file_name().unwrap_or("image").to_string();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    if !data.is_empty() {
                        form.image = Some(CommentImage {
                            filename,
                            data: data.to_vec(),
                        });
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// Check the submission without touching storage.
    pub fn validate(&self) -> AppResult<()> {
        let image = self
            .image
            .as_ref()
            .map(|i| i.filename.as_str())
            .or(self.image_url.as_deref());
        validate_comment(self.content.as_deref(), image)?;
        if let Some(upload) = &self.image {
            validate_image_upload(&upload.filename, upload.data.len())?;
        }
        Ok(())
    }
}

/// Store and insert a comment on a request owned by `owner_id`.
///
/// Callers run [`CommentForm::validate`] before looking the request up, so
/// an invalid submission never reaches the database. An uploaded image is
/// removed again if the insert fails.
pub async fn add_comment(
    pool: &PgPool,
    config: &ServerConfig,
    kind: ThreadKind,
    request_id: DbId,
    owner_id: DbId,
    author: &AuthUser,
    form: CommentForm,
) -> AppResult<CommentView> {
    ensure_participant(author, owner_id)?;

    let stored = match &form.image {
        Some(upload) => Some(store_image(config, &upload.filename, &upload.data).await?),
        None => None,
    };
    let input = CreateComment {
        request_id,
        author_user_id: author.user_id,
        is_admin: author.is_admin(),
        content: form.content,
        image_url: stored.as_ref().map(|s| s.url.clone()).or(form.image_url),
    };

    let comment = match CommentRepo::create(pool, kind, &input).await {
        Ok(comment) => comment,
        Err(err) => {
            if let Some(stored) = &stored {
                discard_image(&stored.path).await;
            }
            return Err(err.into());
        }
    };

    tracing::info!(
        thread_kind = kind.as_str(),
        request_id,
        comment_id = comment.id,
        user_id = author.user_id,
        is_admin = comment.is_admin,
        "Comment added",
    );

    Ok(CommentView::from(comment))
}
