//! Route definitions for the `/custom-designs` resource.

use atelier_db::repositories::CustomDesignRepo;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{custom_designs, requests};
use crate::state::AppState;

/// Routes mounted at `/custom-designs`.
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
            get(requests::list_my_requests::<CustomDesignRepo>)
                .post(custom_designs::create_request),
        )
        .route("/{id}", get(requests::get_request::<CustomDesignRepo>))
        .route("/{id}/comments", post(requests::post_comment::<CustomDesignRepo>))
}
