//! Route definitions for the `/testimonials` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::testimonials;
use crate::state::AppState;

/// Routes mounted at `/testimonials`.
///
/// ```text
/// GET    /      -> list_public (?limit=&offset=)
/// POST   /      -> submit (auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(testimonials::list_public).post(testimonials::submit))
}
