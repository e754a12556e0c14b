//! HTTP-level tests for the product catalog and admin catalog writes.

mod common;

use atelier_db::models::product::CreateProduct;
use atelier_db::repositories::ProductRepo;
use axum::http::StatusCode;
use common::{
    build_test_app, expect_status, get, post_json, post_json_auth, put_json_auth,
};
use serde_json::json;
use sqlx::PgPool;

async fn seed(pool: &PgPool, name: &str, category: &str, base_price: f64, details: Option<&str>) -> i64 {
    let input = CreateProduct {
        name: name.to_string(),
        category: Some(category.to_string()),
        base_price,
        details: details.map(str::to_string),
        ..Default::default()
    };
    ProductRepo::create(pool, &input).await.unwrap().id
}

// ---------------------------------------------------------------------------
// Storefront reads
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn product_without_calculated_price_falls_back_to_base(pool: PgPool) {
    let id = seed(&pool, "Solitaire", "rings", 41_500.0, None).await;
    let test = build_test_app(pool).await;

    let json = expect_status(get(test.app(), &format!("/api/v1/products/{id}")).await, StatusCode::OK).await;
    let price = &json["data"]["price"];
    assert_eq!(price["usd"], 500.0);
    assert_eq!(price["inr"], 41_500.0);
    assert_eq!(price["source"], "base_price_fallback");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn calculated_prices_win_over_base(pool: PgPool) {
    let id = seed(&pool, "Halo", "rings", 41_500.0, None).await;
    ProductRepo::update_calculated_prices(&pool, id, 640.0, 53_120.0, chrono::Utc::now())
        .await
        .unwrap();
    let test = build_test_app(pool).await;

    let json = expect_status(get(test.app(), &format!("/api/v1/products/{id}")).await, StatusCode::OK).await;
    assert_eq!(json["data"]["price"]["usd"], 640.0);
    assert_eq!(json["data"]["price"]["inr"], 53_120.0);
    assert_eq!(json["data"]["price"]["source"], "calculated");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn details_blob_is_reconciled_into_the_view(pool: PgPool) {
    let details = json!({
        "tagline": "Light, caught.",
        "aiInputs": { "metalType": "18k gold", "primaryGems": [{ "name": "Diamond", "carats": 1.5 }] },
        "additionalData": { "metalType": "silver", "otherStoneType": "Onyx" }
    })
    .to_string();
    let id = seed(&pool, "Aurora", "rings", 83_000.0, Some(&details)).await;
    let test = build_test_app(pool).await;

    let json = expect_status(get(test.app(), &format!("/api/v1/products/{id}")).await, StatusCode::OK).await;
    let data = &json["data"];
    assert_eq!(data["tagline"], "Light, caught.");
    assert_eq!(data["specs"]["metal_type"], "18k gold");
    assert_eq!(data["specs"]["primary_stone_type"], "Diamond");
    assert_eq!(data["specs"]["other_stone_type"], "Onyx");
    assert_eq!(data["details_malformed"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_details_are_shown_as_description(pool: PgPool) {
    let id = seed(&pool, "Legacy", "necklaces", 10_000.0, Some("Handmade in Jaipur")).await;
    let test = build_test_app(pool).await;

    let json = expect_status(get(test.app(), &format!("/api/v1/products/{id}")).await, StatusCode::OK).await;
    assert_eq!(json["data"]["description"], "Handmade in Jaipur");
    assert_eq!(json["data"]["details_malformed"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_by_category(pool: PgPool) {
    seed(&pool, "Ring A", "rings", 1_000.0, None).await;
    seed(&pool, "Ring B", "rings", 2_000.0, None).await;
    seed(&pool, "Chain", "necklaces", 3_000.0, None).await;
    let test = build_test_app(pool).await;

    let json = expect_status(get(test.app(), "/api/v1/products?category=rings").await, StatusCode::OK).await;
    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.iter().all(|n| n.starts_with("Ring")));

    let json = expect_status(get(test.app(), "/api/v1/products?limit=1").await, StatusCode::OK).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn related_products_share_category_and_exclude_self(pool: PgPool) {
    let id = seed(&pool, "Ring A", "rings", 1_000.0, None).await;
    seed(&pool, "Ring B", "rings", 2_000.0, None).await;
    seed(&pool, "Chain", "necklaces", 3_000.0, None).await;
    let test = build_test_app(pool).await;

    let json = expect_status(
        get(test.app(), &format!("/api/v1/products/{id}/related")).await,
        StatusCode::OK,
    )
    .await;
    let related = json["data"].as_array().unwrap();
    assert_eq!(related.len(), 1);
    assert_eq!(related[0]["name"], "Ring B");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_product_is_404(pool: PgPool) {
    let test = build_test_app(pool).await;

    let json = expect_status(get(test.app(), "/api/v1/products/999").await, StatusCode::NOT_FOUND).await;
    assert_eq!(json["code"], "NOT_FOUND");

    expect_status(get(test.app(), "/api/v1/products/999/related").await, StatusCode::NOT_FOUND).await;
}

// ---------------------------------------------------------------------------
// Admin writes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_product_requires_admin(pool: PgPool) {
    let test = build_test_app(pool).await;
    let body = json!({ "name": "Ring", "base_price": 1000.0 });

    let response = post_json(test.app(), "/api/v1/admin/products", body.clone()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response =
        post_json_auth(test.app(), "/api/v1/admin/products", body.clone(), &test.customer_token()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let json = expect_status(
        post_json_auth(test.app(), "/api/v1/admin/products", body, &test.admin_token()).await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(json["data"]["name"], "Ring");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_product_rejects_negative_price(pool: PgPool) {
    let test = build_test_app(pool).await;
    let body = json!({ "name": "Ring", "base_price": -5.0 });

    let json = expect_status(
        post_json_auth(test.app(), "/api/v1/admin/products", body, &test.admin_token()).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_invalidates_cached_product(pool: PgPool) {
    let id = seed(&pool, "Old Name", "rings", 1_000.0, None).await;
    let test = build_test_app(pool).await;
    let uri = format!("/api/v1/products/{id}");

    // Warm the cache.
    let json = expect_status(get(test.app(), &uri).await, StatusCode::OK).await;
    assert_eq!(json["data"]["name"], "Old Name");

    expect_status(
        put_json_auth(
            test.app(),
            &format!("/api/v1/admin/products/{id}"),
            json!({ "name": "New Name" }),
            &test.admin_token(),
        )
        .await,
        StatusCode::OK,
    )
    .await;

    let json = expect_status(get(test.app(), &uri).await, StatusCode::OK).await;
    assert_eq!(json["data"]["name"], "New Name");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_prices_updates_products_with_specs(pool: PgPool) {
    let priced = ProductRepo::create(
        &pool,
        &CreateProduct {
            name: "Gold Band".into(),
            base_price: 30_000.0,
            metal_type: Some("22k gold".into()),
            metal_weight: Some("5g".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .id;
    seed(&pool, "Mystery", "rings", 1_000.0, None).await;
    let test = build_test_app(pool).await;

    let json = expect_status(
        post_json_auth(
            test.app(),
            "/api/v1/admin/products/refresh-prices",
            json!({}),
            &test.admin_token(),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"]["updated"], 1);
    assert_eq!(json["data"]["skipped"], 1);

    let json = expect_status(get(test.app(), &format!("/api/v1/products/{priced}")).await, StatusCode::OK).await;
    assert_eq!(json["data"]["price"]["source"], "calculated");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_refresh_changes_no_prices(pool: PgPool) {
    let mut ids = Vec::new();
    for name in ["Gold Band", "Broken Band"] {
        let product = ProductRepo::create(
            &pool,
            &CreateProduct {
                name: name.into(),
                base_price: 41_500.0,
                metal_type: Some("18k gold".into()),
                metal_weight: Some("4g".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        ids.push(product.id);
    }
    sqlx::query(
        "CREATE FUNCTION reject_broken_price() RETURNS trigger AS $$
         BEGIN
             IF NEW.name = 'Broken Band' THEN
                 RAISE EXCEPTION 'price write rejected';
             END IF;
             RETURN NEW;
         END;
         $$ LANGUAGE plpgsql",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TRIGGER trg_reject_broken_price BEFORE UPDATE ON products
         FOR EACH ROW EXECUTE FUNCTION reject_broken_price()",
    )
    .execute(&pool)
    .await
    .unwrap();
    let test = build_test_app(pool.clone()).await;
    let uri = format!("/api/v1/products/{}", ids[0]);

    // Warm the cache with the fallback price.
    let json = expect_status(get(test.app(), &uri).await, StatusCode::OK).await;
    assert_eq!(json["data"]["price"]["source"], "base_price_fallback");

    expect_status(
        post_json_auth(
            test.app(),
            "/api/v1/admin/products/refresh-prices",
            json!({}),
            &test.admin_token(),
        )
        .await,
        StatusCode::INTERNAL_SERVER_ERROR,
    )
    .await;

    let stored = ProductRepo::find_by_id(&pool, ids[0]).await.unwrap().unwrap();
    assert!(stored.calculated_price_usd.is_none());
    let json = expect_status(get(test.app(), &uri).await, StatusCode::OK).await;
    assert_eq!(json["data"]["price"]["source"], "base_price_fallback");
}
