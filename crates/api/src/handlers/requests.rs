//! Handlers shared by custom design and customization requests.
//!
//! Both request types have the same lifecycle and comment thread. Each
//! implements [`ServiceRequestRepo`] and the routes mount these handlers with
//! the concrete repository, e.g. `get(get_request::<CustomDesignRepo>)`.
//! Comment and status writes invalidate the request's cached thread and the
//! owner's cached list.

use std::future::Future;

use atelier_core::comments::ThreadKind;
use atelier_core::error::CoreError;
use atelier_core::pagination::{clamp_limit, clamp_offset, MAX_PAGE_SIZE};
use atelier_core::request_status::{validate_transition, RequestStatus};
use atelier_core::types::DbId;
use atelier_db::models::request::UpdateRequestStatus;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use sqlx::PgPool;

use super::threads::{add_comment, ensure_participant, load_comments, CommentForm, RequestThread};
use crate::cache::QueryKey;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::StatusListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Storage and cache keys for one kind of service request.
pub trait ServiceRequestRepo: Send + Sync + 'static {
    type Row: Serialize + Clone + Send + Sync + 'static;

    const KIND: ThreadKind;

    /// Cache key for one request with its thread.
    fn thread_key(id: DbId) -> QueryKey;

    /// Cache key for a customer's list of requests.
    fn owner_key(user_id: DbId) -> QueryKey;

    fn owner_id(row: &Self::Row) -> DbId;

    fn status(row: &Self::Row) -> &str;

    fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> impl Future<Output = Result<Option<Self::Row>, sqlx::Error>> + Send;

    fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> impl Future<Output = Result<Vec<Self::Row>, sqlx::Error>> + Send;

    fn list_all(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> impl Future<Output = Result<Vec<Self::Row>, sqlx::Error>> + Send;

    /// Compare-and-set status write; `None` when the row is not in `expected`.
    fn update_status(
        pool: &PgPool,
        id: DbId,
        expected: &str,
        status: &str,
        quoted_price: Option<f64>,
        cad_image_url: Option<&str>,
    ) -> impl Future<Output = Result<Option<Self::Row>, sqlx::Error>> + Send;
}

fn not_found<R: ServiceRequestRepo>(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: R::KIND.entity_name(),
        id,
    })
}

async fn invalidate_request<R: ServiceRequestRepo>(state: &AppState, id: DbId, owner_id: DbId) {
    state.cache.invalidate(&R::thread_key(id)).await;
    state.cache.invalidate(&R::owner_key(owner_id)).await;
}

// ---------------------------------------------------------------------------
// Customer endpoints
// ---------------------------------------------------------------------------

/// GET /api/v1/{custom-designs,customizations}
///
/// The caller's own requests, newest first.
pub async fn list_my_requests<R: ServiceRequestRepo>(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let pool = state.pool.clone();
    let user_id = auth.user_id;
    let requests: Vec<R::Row> = state
        .cache
        .get_or_load(R::owner_key(user_id), || async move {
            Ok(R::list_for_user(&pool, user_id).await?)
        })
        .await?;

    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/{custom-designs,customizations}/{id}
///
/// The request with its comment thread. Customers may only view their own.
pub async fn get_request<R: ServiceRequestRepo>(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let pool = state.pool.clone();
    let thread: RequestThread<R::Row> = state
        .cache
        .get_or_load(R::thread_key(id), || async move {
            let request = R::find_by_id(&pool, id)
                .await?
                .ok_or_else(|| not_found::<R>(id))?;
            let comments = load_comments(&pool, R::KIND, id).await?;
            Ok(RequestThread { request, comments })
        })
        .await?;

    ensure_participant(&auth, R::owner_id(&thread.request))?;

    Ok(Json(DataResponse { data: thread }))
}

/// POST /api/v1/{custom-designs,customizations}/{id}/comments
///
/// Multipart form with `content` and/or an `image` file or `image_url`.
pub async fn post_comment<R: ServiceRequestRepo>(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let form = CommentForm::read(multipart).await?;
    form.validate()?;

    let request = R::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found::<R>(id))?;
    let owner_id = R::owner_id(&request);

    let comment = add_comment(
        &state.pool,
        &state.config,
        R::KIND,
        id,
        owner_id,
        &auth,
        form,
    )
    .await?;
    invalidate_request::<R>(&state, id, owner_id).await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}

// ---------------------------------------------------------------------------
// Admin endpoints
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/{custom-designs,customizations}?status=&limit=&offset=
pub async fn admin_list_requests<R: ServiceRequestRepo>(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<StatusListParams>,
) -> AppResult<impl IntoResponse> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<RequestStatus>)
        .transpose()?;
    let limit = clamp_limit(params.limit, 50, MAX_PAGE_SIZE);
    let offset = clamp_offset(params.offset);

    let requests =
        R::list_all(&state.pool, status.map(RequestStatus::as_str), limit, offset).await?;

    Ok(Json(DataResponse { data: requests }))
}

/// PUT /api/v1/admin/{custom-designs,customizations}/{id}/status
///
/// Move a request along its lifecycle. A `quoted` status needs a positive
/// `quoted_price`. The write only lands if the request is still in the
/// status the transition was checked against; otherwise 409.
pub async fn update_request_status<R: ServiceRequestRepo>(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRequestStatus>,
) -> AppResult<impl IntoResponse> {
    let next: RequestStatus = input.status.parse()?;

    let current = R::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found::<R>(id))?;
    let current_status: RequestStatus = R::status(&current).parse()?;
    validate_transition(current_status, next, input.quoted_price)?;

    let quoted_price = input
        .quoted_price
        .filter(|_| next == RequestStatus::Quoted);
    let updated = R::update_status(
        &state.pool,
        id,
        current_status.as_str(),
        next.as_str(),
        quoted_price,
        input.cad_image_url.as_deref(),
    )
    .await?;

    let Some(updated) = updated else {
        let fresh = R::find_by_id(&state.pool, id)
            .await?
            .ok_or_else(|| not_found::<R>(id))?;
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Request moved from '{current_status}' to '{}' while this update was in flight",
            R::status(&fresh)
        ))));
    };
    invalidate_request::<R>(&state, id, R::owner_id(&updated)).await;

    tracing::info!(
        thread_kind = R::KIND.as_str(),
        request_id = id,
        from = %current_status,
        to = %next,
        user_id = admin.user_id,
        "Request status updated",
    );

    Ok(Json(DataResponse { data: updated }))
}
