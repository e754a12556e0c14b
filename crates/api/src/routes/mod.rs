pub mod admin;
pub mod custom_designs;
pub mod customizations;
pub mod health;
pub mod products;
pub mod testimonials;

use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /products                                  list (public)
/// /products/{id}                             get (public)
/// /products/{id}/related                     related products (public)
/// /products/{id}/regenerate-content          regenerate AI content (admin, POST)
///
/// /custom-designs                            own list, create (auth)
/// /custom-designs/{id}                       request + comments (owner or admin)
/// /custom-designs/{id}/comments              add comment (multipart)
///
/// /customizations                            own list, create (auth)
/// /customizations/{id}                       request + comments (owner or admin)
/// /customizations/{id}/comments              add comment (multipart)
///
/// /testimonials                              approved list (public), submit (auth)
///
/// /contact                                   submit contact form (public, POST)
/// /upload                                    upload an image (auth, POST multipart)
///
/// /admin/products                            create (POST)
/// /admin/products/{id}                       update (PUT)
/// /admin/products/refresh-prices             on-demand price refresh (POST)
/// /admin/content/generate                    generate content (POST, JSON or multipart)
/// /admin/custom-designs                      list (?status=)
/// /admin/custom-designs/{id}/status          status transition (PUT)
/// /admin/customizations                      list (?status=)
/// /admin/customizations/{id}/status          status transition (PUT)
/// /admin/testimonials                        list (?status=)
/// /admin/testimonials/{id}/approve           approve (PUT)
/// /admin/testimonials/{id}/reject            reject (PUT)
/// /admin/testimonials/{id}                   delete (DELETE)
/// /admin/contact-messages                    list
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/custom-designs", custom_designs::router())
        .nest("/customizations", customizations::router())
        .nest("/testimonials", testimonials::router())
        .nest("/admin", admin::router())
        .route("/contact", post(handlers::contact::submit_contact))
        .route("/upload", post(handlers::upload::upload_image))
}
