//! Route definitions for the `/admin` back-office.
//!
//! Every handler here takes the `RequireAdmin` extractor.

use atelier_db::repositories::{CustomDesignRepo, CustomizationRepo};
use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{contact, content, products, requests, testimonials};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// POST   /products                        -> create_product
/// PUT    /products/{id}                   -> update_product
/// POST   /products/refresh-prices         -> refresh_prices
/// POST   /content/generate                -> generate_content
/// GET    /custom-designs                  -> admin_list_requests (?status=&limit=&offset=)
/// PUT    /custom-designs/{id}/status      -> update_request_status
/// GET    /customizations                  -> admin_list_requests (?status=&limit=&offset=)
/// PUT    /customizations/{id}/status      -> update_request_status
/// GET    /testimonials                    -> admin_list (?status=&limit=&offset=)
/// PUT    /testimonials/{id}/approve       -> approve
/// PUT    /testimonials/{id}/reject        -> reject
/// DELETE /testimonials/{id}               -> delete
/// GET    /contact-messages                -> list_contact_messages
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/products", post(products::create_product))
        .route("/products/{id}", put(products::update_product))
        .route("/products/refresh-prices", post(products::refresh_prices))
        .route("/content/generate", post(content::generate_content))
        // Requests
        .route(
            "/custom-designs",
            get(requests::admin_list_requests::<CustomDesignRepo>),
        )
        .route(
            "/custom-designs/{id}/status",
            put(requests::update_request_status::<CustomDesignRepo>),
        )
        .route(
            "/customizations",
            get(requests::admin_list_requests::<CustomizationRepo>),
        )
        .route(
            "/customizations/{id}/status",
            put(requests::update_request_status::<CustomizationRepo>),
        )
        // Testimonials
        .route("/testimonials", get(testimonials::admin_list))
        .route("/testimonials/{id}/approve", put(testimonials::approve))
        .route("/testimonials/{id}/reject", put(testimonials::reject))
        .route("/testimonials/{id}", delete(testimonials::delete))
        // Contact
        .route("/contact-messages", get(contact::list_contact_messages))
}
