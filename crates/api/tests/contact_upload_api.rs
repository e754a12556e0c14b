//! HTTP-level tests for the contact form and image uploads.

mod common;

use axum::http::StatusCode;
use common::{
    build_test_app, expect_status, get_auth, post_json, post_multipart_auth, Part,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn contact_message_is_stored_and_listed_for_admins(pool: PgPool) {
    let test = build_test_app(pool).await;

    let json = expect_status(
        post_json(
            test.app(),
            "/api/v1/contact",
            json!({
                "name": " Asha ",
                "email": "Asha@Example.com",
                "subject": "Resizing",
                "message": "Do you resize rings?"
            }),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(json["data"]["name"], "Asha");
    assert_eq!(json["data"]["email"], "asha@example.com");

    let json = expect_status(
        get_auth(test.app(), "/api/v1/admin/contact-messages", Some(&test.admin_token())).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    expect_status(
        get_auth(test.app(), "/api/v1/admin/contact-messages", Some(&test.customer_token())).await,
        StatusCode::FORBIDDEN,
    )
    .await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_contact_message_is_rejected(pool: PgPool) {
    let test = build_test_app(pool).await;

    let json = expect_status(
        post_json(
            test.app(),
            "/api/v1/contact",
            json!({ "name": "Asha", "email": "not-an-email", "message": "Hi" }),
        )
        .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(json["code"], "VALIDATION_ERROR");

    expect_status(
        post_json(
            test.app(),
            "/api/v1/contact",
            json!({ "name": "Asha", "email": "asha@example.com", "message": "   " }),
        )
        .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn upload_stores_image_and_serves_it(pool: PgPool) {
    let test = build_test_app(pool).await;

    let json = expect_status(
        post_multipart_auth(
            test.app(),
            "/api/v1/upload",
            &[Part::file("file", "ring.jpg", b"fake-jpeg-bytes")],
            &test.customer_token(),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let url = json["data"]["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/"));
    assert!(url.ends_with(".jpg"));

    let response = get_auth(test.app(), &url, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn upload_rejects_unsupported_extension(pool: PgPool) {
    let test = build_test_app(pool).await;

    let json = expect_status(
        post_multipart_auth(
            test.app(),
            "/api/v1/upload",
            &[Part::file("file", "notes.pdf", b"%PDF")],
            &test.customer_token(),
        )
        .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn upload_requires_file_field(pool: PgPool) {
    let test = build_test_app(pool).await;

    let json = expect_status(
        post_multipart_auth(
            test.app(),
            "/api/v1/upload",
            &[Part::text("caption", "no file here")],
            &test.customer_token(),
        )
        .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(json["code"], "BAD_REQUEST");
}
