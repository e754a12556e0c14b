//! Route definitions for the `/products` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{content, products};
use crate::state::AppState;

/// Routes mounted at `/products`.
///
/// ```text
/// GET    /                             -> list_products (?category=&limit=&offset=)
/// GET    /{id}                         -> get_product
/// GET    /{id}/related                 -> list_related
/// POST   /{id}/regenerate-content      -> regenerate_product_content (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list_products))
        .route("/{id}", get(products::get_product))
        .route("/{id}/related", get(products::list_related))
        .route(
            "/{id}/regenerate-content",
            post(content::regenerate_product_content),
        )
}
