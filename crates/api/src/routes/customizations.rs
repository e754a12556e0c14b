//! Route definitions for the `/customizations` resource.

use atelier_db::repositories::CustomizationRepo;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{customizations, requests};
use crate::state::AppState;

/// Routes mounted at `/customizations`.
///
/// ```text
/// GET    /                  -> list_my_requests
/// POST   /                  -> create_request
/// GET    /{id}              -> get_request
/// POST   /{id}/comments     -> post_comment (multipart)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(requests::list_my_requests::<CustomizationRepo>)
                .post(customizations::create_request),
        )
        .route("/{id}", get(requests::get_request::<CustomizationRepo>))
        .route("/{id}/comments", post(requests::post_comment::<CustomizationRepo>))
}
