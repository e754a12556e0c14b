//! Handlers for the contact form.

use atelier_core::contact::ContactForm;
use atelier_core::pagination::{clamp_limit, clamp_offset, MAX_PAGE_SIZE};
use atelier_db::repositories::ContactMessageRepo;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/contact
///
/// Public. Validates and stores a contact message.
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(input): Json<ContactForm>,
) -> AppResult<impl IntoResponse> {
    let form = input.normalized()?;
    let message = ContactMessageRepo::create(&state.pool, &form).await?;

    tracing::info!(contact_message_id = message.id, "Contact message received");

    Ok((StatusCode::CREATED, Json(DataResponse { data: message })))
}

/// GET /api/v1/admin/contact-messages
pub async fn list_contact_messages(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, 50, MAX_PAGE_SIZE);
    let offset = clamp_offset(params.offset);
    let messages = ContactMessageRepo::list(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: messages }))
}
