//! Custom design requests: a customer describes a piece to be made from
//! scratch. Listing, threads and status changes go through
//! [`super::requests`].

use std::future::Future;

use atelier_core::comments::ThreadKind;
use atelier_core::error::CoreError;
use atelier_core::request_status::validate_request_fields;
use atelier_core::types::DbId;
use atelier_db::models::request::{CreateCustomDesignRequest, CustomDesignRequest};
use atelier_db::repositories::CustomDesignRepo;
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

impl ServiceRequestRepo for CustomDesignRepo {
    type Row = CustomDesignRequest;

    const KIND: ThreadKind = ThreadKind::CustomDesign;

    fn thread_key(id: DbId) -> QueryKey {
        QueryKey::CustomDesign(id)
    }

    fn owner_key(user_id: DbId) -> QueryKey {
        QueryKey::UserCustomDesigns(user_id)
    }

    fn owner_id(row: &CustomDesignRequest) -> DbId {
        row.user_id
    }

    fn status(row: &CustomDesignRequest) -> &str {
        &row.status
    }

    fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> impl Future<Output = Result<Option<CustomDesignRequest>, sqlx::Error>> + Send {
        CustomDesignRepo::find_by_id(pool, id)
    }

    fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> impl Future<Output = Result<Vec<CustomDesignRequest>, sqlx::Error>> + Send {
        CustomDesignRepo::list_for_user(pool, user_id)
    }

    fn list_all(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> impl Future<Output = Result<Vec<CustomDesignRequest>, sqlx::Error>> + Send {
        CustomDesignRepo::list_all(pool, status, limit, offset)
    }

    fn update_status(
        pool: &PgPool,
        id: DbId,
        expected: &str,
        status: &str,
        quoted_price: Option<f64>,
        cad_image_url: Option<&str>,
    ) -> impl Future<Output = Result<Option<CustomDesignRequest>, sqlx::Error>> + Send {
        CustomDesignRepo::update_status(pool, id, expected, status, quoted_price, cad_image_url)
    }
}

/// POST /api/v1/custom-designs
pub async fn create_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCustomDesignRequest>,
) -> AppResult<impl IntoResponse> {
    validate_request_fields(
        &input.description,
        input.stone_preferences.as_deref(),
        &input.image_urls,
    )?;
    if let Some(budget) = input.budget {
        if !budget.is_finite() || budget <= 0.0 {
            return Err(AppError::Core(CoreError::Validation(
                "Budget must be a positive amount".into(),
            )));
        }
    }

    let request = CustomDesignRepo::create(&state.pool, auth.user_id, &input).await?;
    state
        .cache
        .invalidate(&QueryKey::UserCustomDesigns(auth.user_id))
        .await;

    tracing::info!(
        request_id = request.id,
        user_id = auth.user_id,
        "Custom design request submitted",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}
