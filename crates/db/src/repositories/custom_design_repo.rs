//! Repository for the `custom_design_requests` table.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::request::{CreateCustomDesignRequest, CustomDesignRequest};

/// Column list for custom_design_requests queries.
const COLUMNS: &str = "id, user_id, status, metal_type, stone_preferences, description, \
    budget, image_urls, quoted_price, cad_image_url, created_at, updated_at";

/// Provides CRUD operations for custom design requests.
pub struct CustomDesignRepo;

impl CustomDesignRepo {
    /// Create a new request in `pending` status.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateCustomDesignRequest,
    ) -> Result<CustomDesignRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO custom_design_requests
                (user_id, metal_type, stone_preferences, description, budget, image_urls)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CustomDesignRequest>(&query)
            .bind(user_id)
            .bind(&input.metal_type)
            .bind(&input.stone_preferences)
            .bind(&input.description)
            .bind(input.budget)
            .bind(&input.image_urls)
            .fetch_one(pool)
            .await
    }

    /// Find a request by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CustomDesignRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM custom_design_requests WHERE id = $1");
        sqlx::query_as::<_, CustomDesignRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a customer's requests, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<CustomDesignRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM custom_design_requests
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, CustomDesignRequest>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List all requests for the admin view, optionally filtered by status.
    pub async fn list_all(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CustomDesignRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM custom_design_requests
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, CustomDesignRequest>(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Move a request from `expected` to `status`, keeping the existing quote
    /// and CAD image unless given.
    ///
    /// Returns `None` when the row is missing or no longer in `expected`.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        expected: &str,
        status: &str,
        quoted_price: Option<f64>,
        cad_image_url: Option<&str>,
    ) -> Result<Option<CustomDesignRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE custom_design_requests SET
                status = $3,
                quoted_price = COALESCE($4, quoted_price),
                cad_image_url = COALESCE($5, cad_image_url)
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CustomDesignRequest>(&query)
            .bind(id)
            .bind(expected)
            .bind(status)
            .bind(quoted_price)
            .bind(cad_image_url)
            .fetch_optional(pool)
            .await
    }
}
