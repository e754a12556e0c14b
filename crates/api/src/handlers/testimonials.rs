//! Handlers for testimonials: public listing, customer submission and
//! admin moderation.
//!
//! Every moderation call is idempotent: repeating the transition a
//! testimonial already went through succeeds without writing, and deleting a
//! testimonial that no longer exists succeeds. Each call invalidates both the
//! public list and the admin lists so the next read refetches.

use atelier_core::error::CoreError;
use atelier_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use atelier_core::testimonial::{
    moderate, ModerationAction, ModerationOutcome, ModerationStatus, TestimonialSubmission,
};
use atelier_core::types::DbId;
use atelier_db::models::testimonial::{CreateTestimonial, Testimonial, TestimonialView};
use atelier_db::repositories::TestimonialRepo;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use crate::cache::QueryKey;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::{PaginationParams, StatusListParams};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Testimonial",
        id,
    })
}

fn views(testimonials: Vec<Testimonial>) -> Vec<TestimonialView> {
    testimonials.into_iter().map(TestimonialView::from).collect()
}

// ---------------------------------------------------------------------------
// Public
// ---------------------------------------------------------------------------

/// GET /api/v1/testimonials?limit=&offset=
///
/// Approved testimonials, newest first.
pub async fn list_public(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
    let offset = clamp_offset(params.offset);

    let pool = state.pool.clone();
    let testimonials: Vec<TestimonialView> = state
        .cache
        .get_or_load(QueryKey::PublicTestimonials { limit, offset }, || async move {
            let rows = TestimonialRepo::list_by_status(
                &pool,
                Some(ModerationStatus::Approved.as_str()),
                limit,
                offset,
            )
            .await?;
            Ok(views(rows))
        })
        .await?;

    Ok(Json(DataResponse { data: testimonials }))
}

/// POST /api/v1/testimonials
///
/// Submit a testimonial. It stays hidden until an admin approves it.
pub async fn submit(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(mut input): Json<TestimonialSubmission>,
) -> AppResult<impl IntoResponse> {
    input.name = input.name.trim().to_string();
    input.story = input.story.trim().to_string();
    input.validate().map_err(CoreError::from)?;

    let create = CreateTestimonial {
        user_id: Some(auth.user_id),
        name: input.name,
        rating: input.rating,
        story: input.story,
        image_urls: input.image_urls,
        product_type: input.product_type.filter(|p| !p.trim().is_empty()),
        purchase_date: input.purchase_date,
    };
    let testimonial = TestimonialRepo::create(&state.pool, &create).await?;
    state
        .cache
        .invalidate_where(|k| matches!(k, QueryKey::AdminTestimonials { .. }))
        .await;

    tracing::info!(
        testimonial_id = testimonial.id,
        user_id = auth.user_id,
        rating = testimonial.rating,
        "Testimonial submitted",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: TestimonialView::from(testimonial),
        }),
    ))
}

// ---------------------------------------------------------------------------
// Admin moderation
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/testimonials?status=&limit=&offset=
pub async fn admin_list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<StatusListParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
    let offset = clamp_offset(params.offset);
    let status = params
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<ModerationStatus>)
        .transpose()?;
    let key = QueryKey::AdminTestimonials {
        status: status.map(|s| s.as_str().to_string()),
        limit,
        offset,
    };

    let pool = state.pool.clone();
    let testimonials: Vec<TestimonialView> = state
        .cache
        .get_or_load(key, || async move {
            let rows = TestimonialRepo::list_by_status(
                &pool,
                status.map(ModerationStatus::as_str),
                limit,
                offset,
            )
            .await?;
            Ok(views(rows))
        })
        .await?;

    Ok(Json(DataResponse { data: testimonials }))
}

/// Apply an approve or reject action to an existing testimonial.
///
/// The write only lands if the status is still the one the decision was
/// made on. When another admin got there first, the fresh row is judged
/// again: a matching outcome is returned unchanged, anything else is 409.
async fn transition(
    state: &AppState,
    admin: &AuthUser,
    id: DbId,
    action: ModerationAction,
) -> AppResult<Testimonial> {
    let current = TestimonialRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let status: ModerationStatus = current.status.parse()?;

    let testimonial = match moderate(status, action)? {
        ModerationOutcome::Transition(next) => {
            match TestimonialRepo::update_status(&state.pool, id, status.as_str(), next.as_str())
                .await?
            {
                Some(updated) => {
                    tracing::info!(
                        testimonial_id = id,
                        from = %status,
                        to = %next,
                        user_id = admin.user_id,
                        "Testimonial moderated",
                    );
                    updated
                }
                None => reconcile_lost_race(state, id, action).await?,
            }
        }
        ModerationOutcome::Unchanged => current,
        ModerationOutcome::Delete => return Err(unexpected_delete(action)),
    };

    state
        .cache
        .invalidate_where(QueryKey::is_testimonial_list)
        .await;
    Ok(testimonial)
}

/// Re-read a testimonial whose guarded update matched no row.
async fn reconcile_lost_race(
    state: &AppState,
    id: DbId,
    action: ModerationAction,
) -> AppResult<Testimonial> {
    let fresh = TestimonialRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let status: ModerationStatus = fresh.status.parse()?;

    match moderate(status, action)? {
        ModerationOutcome::Unchanged => Ok(fresh),
        ModerationOutcome::Transition(_) => Err(AppError::Core(CoreError::Conflict(
            "Testimonial was modified concurrently".to_string(),
        ))),
        ModerationOutcome::Delete => Err(unexpected_delete(action)),
    }
}

fn unexpected_delete(action: ModerationAction) -> AppError {
    AppError::InternalError(format!("Unexpected delete outcome for {action:?}"))
}

/// PUT /api/v1/admin/testimonials/{id}/approve
pub async fn approve(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let testimonial = transition(&state, &admin, id, ModerationAction::Approve).await?;
    Ok(Json(DataResponse {
        data: TestimonialView::from(testimonial),
    }))
}

/// PUT /api/v1/admin/testimonials/{id}/reject
pub async fn reject(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let testimonial = transition(&state, &admin, id, ModerationAction::Reject).await?;
    Ok(Json(DataResponse {
        data: TestimonialView::from(testimonial),
    }))
}

/// DELETE /api/v1/admin/testimonials/{id}
///
/// Only approved or rejected testimonials can be deleted. Deleting one that
/// is already gone succeeds.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if let Some(current) = TestimonialRepo::find_by_id(&state.pool, id).await? {
        let status: ModerationStatus = current.status.parse()?;
        moderate(status, ModerationAction::Delete)?;

        let removed = TestimonialRepo::delete(&state.pool, id, status.as_str()).await?;
        tracing::info!(
            testimonial_id = id,
            removed,
            user_id = admin.user_id,
            "Testimonial deleted",
        );
    }

    state
        .cache
        .invalidate_where(QueryKey::is_testimonial_list)
        .await;
    Ok(StatusCode::NO_CONTENT)
}
