//! Customization requests: changes to an existing catalog product. Listing,
//! threads and status changes go through [`super::requests`].

use std::future::Future;

use atelier_core::comments::ThreadKind;
use atelier_core::error::CoreError;
use atelier_core::request_status::validate_request_fields;
use atelier_core::types::DbId;
use atelier_db::models::request::{CreateCustomizationRequest, CustomizationRequest};
use atelier_db::repositories::{CustomizationRepo, ProductRepo};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use sqlx::PgPool;

use super::requests::ServiceRequestRepo;
use crate::cache::QueryKey;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

impl ServiceRequestRepo for CustomizationRepo {
    type Row = CustomizationRequest;

    const KIND: ThreadKind = ThreadKind::Customization;

    fn thread_key(id: DbId) -> QueryKey {
        QueryKey::Customization(id)
    }

    fn owner_key(user_id: DbId) -> QueryKey {
        QueryKey::UserCustomizations(user_id)
    }

    fn owner_id(row: &CustomizationRequest) -> DbId {
        row.user_id
    }

    fn status(row: &CustomizationRequest) -> &str {
        &row.status
    }

    fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> impl Future<Output = Result<Option<CustomizationRequest>, sqlx::Error>> + Send {
        CustomizationRepo::find_by_id(pool, id)
    }

    fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> impl Future<Output = Result<Vec<CustomizationRequest>, sqlx::Error>> + Send {
        CustomizationRepo::list_for_user(pool, user_id)
    }

    fn list_all(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> impl Future<Output = Result<Vec<CustomizationRequest>, sqlx::Error>> + Send {
        CustomizationRepo::list_all(pool, status, limit, offset)
    }

    fn update_status(
        pool: &PgPool,
        id: DbId,
        expected: &str,
        status: &str,
        quoted_price: Option<f64>,
        cad_image_url: Option<&str>,
    ) -> impl Future<Output = Result<Option<CustomizationRequest>, sqlx::Error>> + Send {
        CustomizationRepo::update_status(pool, id, expected, status, quoted_price, cad_image_url)
    }
}

/// POST /api/v1/customizations
///
/// The product being customized must exist.
pub async fn create_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCustomizationRequest>,
) -> AppResult<impl IntoResponse> {
    validate_request_fields(&input.description, input.stone_preferences.as_deref(), &[])?;

    if ProductRepo::find_by_id(&state.pool, input.product_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Product",
            id: input.product_id,
        }));
    }

    let request = CustomizationRepo::create(&state.pool, auth.user_id, &input).await?;
    state
        .cache
        .invalidate(&QueryKey::UserCustomizations(auth.user_id))
        .await;

    tracing::info!(
        request_id = request.id,
        product_id = request.product_id,
        user_id = auth.user_id,
        "Customization request submitted",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}
