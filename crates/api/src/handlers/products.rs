//! Handlers for the product catalog.
//!
//! Storefront reads return reconciled [`ProductView`]s and are served
//! through the query cache. Admin writes invalidate every cached product
//! read once the database write has succeeded.

use atelier_core::error::CoreError;
use atelier_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use atelier_core::product_details::{build_product_view, validate_catalog_fields, ProductView};
use atelier_core::types::DbId;
use atelier_db::models::product::{CreateProduct, Product, UpdateProduct};
use atelier_db::repositories::ProductRepo;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::background::price_refresh;
use crate::cache::QueryKey;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::ProductListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Number of related products shown on a product page.
const RELATED_PRODUCTS_LIMIT: i64 = 4;

fn to_view(product: &Product) -> ProductView {
    build_product_view(&product.as_record())
}

fn product_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Product",
        id,
    })
}

// ---------------------------------------------------------------------------
// Storefront
// ---------------------------------------------------------------------------

/// GET /api/v1/products
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
    let offset = clamp_offset(params.offset);
    let category = params.category.filter(|c| !c.trim().is_empty());

    let key = QueryKey::ProductList {
        category: category.clone(),
        limit,
        offset,
    };
    let pool = state.pool.clone();
    let views: Vec<ProductView> = state
        .cache
        .get_or_load(key, || async move {
            let products = ProductRepo::list(&pool, category.as_deref(), limit, offset).await?;
            Ok(products.iter().map(to_view).collect())
        })
        .await?;

    Ok(Json(DataResponse { data: views }))
}

/// GET /api/v1/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let pool = state.pool.clone();
    let view: ProductView = state
        .cache
        .get_or_load(QueryKey::Product(id), || async move {
            let product = ProductRepo::find_by_id(&pool, id)
                .await?
                .ok_or_else(|| product_not_found(id))?;
            Ok(to_view(&product))
        })
        .await?;

    Ok(Json(DataResponse { data: view }))
}

/// GET /api/v1/products/{id}/related
///
/// Other products in the same category, newest first.
pub async fn list_related(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let pool = state.pool.clone();
    let views: Vec<ProductView> = state
        .cache
        .get_or_load(QueryKey::RelatedProducts(id), || async move {
            if ProductRepo::find_by_id(&pool, id).await?.is_none() {
                return Err(product_not_found(id));
            }
            let related = ProductRepo::list_related(&pool, id, RELATED_PRODUCTS_LIMIT).await?;
            Ok(related.iter().map(to_view).collect())
        })
        .await?;

    Ok(Json(DataResponse { data: views }))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/products
pub async fn create_product(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateProduct>,
) -> AppResult<impl IntoResponse> {
    validate_catalog_fields(Some(&input.name), Some(input.base_price))?;

    let product = ProductRepo::create(&state.pool, &input).await?;
    state.cache.invalidate_where(QueryKey::is_product_data).await;

    tracing::info!(product_id = product.id, user_id = admin.user_id, "Product created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: to_view(&product),
        }),
    ))
}

/// PUT /api/v1/admin/products/{id}
pub async fn update_product(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProduct>,
) -> AppResult<impl IntoResponse> {
    validate_catalog_fields(input.name.as_deref(), input.base_price)?;

    let product = ProductRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| product_not_found(id))?;
    state.cache.invalidate_where(QueryKey::is_product_data).await;

    tracing::info!(product_id = id, user_id = admin.user_id, "Product updated");

    Ok(Json(DataResponse {
        data: to_view(&product),
    }))
}

/// POST /api/v1/admin/products/refresh-prices
///
/// Runs the scheduled price refresh immediately.
pub async fn refresh_prices(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let summary = price_refresh::refresh_and_invalidate(&state).await?;

    tracing::info!(
        user_id = admin.user_id,
        updated = summary.updated,
        skipped = summary.skipped,
        "On-demand price refresh complete"
    );

    Ok(Json(DataResponse { data: summary }))
}
