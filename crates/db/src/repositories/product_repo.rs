//! Repository for the `products` table.

use atelier_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::product::{
    ApplyGeneratedContent, CalculatedPrice, CreateProduct, Product, UpdateProduct,
};

/// Column list for products queries.
const COLUMNS: &str = "id, name, category, description, base_price, \
    calculated_price_usd, calculated_price_inr, image_url, additional_images, \
    metal_type, metal_weight, primary_stone_type, primary_stone_weight, \
    secondary_stone_type, secondary_stone_weight, other_stone_type, other_stone_weight, \
    details, prices_updated_at, created_at, updated_at";

/// Provides CRUD operations for products.
pub struct ProductRepo;

impl ProductRepo {
    /// List products, newest first, optionally filtered by category.
    pub async fn list(
        pool: &PgPool,
        category: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM products
             WHERE ($1::TEXT IS NULL OR category = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(category)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// List every product (used by the price refresh).
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products ORDER BY id");
        sqlx::query_as::<_, Product>(&query).fetch_all(pool).await
    }

    /// Find a product by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Products in the same category as `product_id`, excluding itself.
    pub async fn list_related(
        pool: &PgPool,
        product_id: DbId,
        limit: i64,
    ) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM products
             WHERE id <> $1
               AND category IS NOT DISTINCT FROM (SELECT category FROM products WHERE id = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(product_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Create a new product, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProduct) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products
                (name, category, description, base_price, image_url, additional_images,
                 metal_type, metal_weight, primary_stone_type, primary_stone_weight,
                 secondary_stone_type, secondary_stone_weight, other_stone_type,
                 other_stone_weight, details)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(&input.name)
            .bind(&input.category)
            .bind(&input.description)
            .bind(input.base_price)
            .bind(&input.image_url)
            .bind(&input.additional_images)
            .bind(&input.metal_type)
            .bind(&input.metal_weight)
            .bind(&input.primary_stone_type)
            .bind(&input.primary_stone_weight)
            .bind(&input.secondary_stone_type)
            .bind(&input.secondary_stone_weight)
            .bind(&input.other_stone_type)
            .bind(&input.other_stone_weight)
            .bind(&input.details)
            .fetch_one(pool)
            .await
    }

    /// Update a product. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProduct,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET
                name = COALESCE($2, name),
                category = COALESCE($3, category),
                description = COALESCE($4, description),
                base_price = COALESCE($5, base_price),
                image_url = COALESCE($6, image_url),
                additional_images = COALESCE($7, additional_images),
                metal_type = COALESCE($8, metal_type),
                metal_weight = COALESCE($9, metal_weight),
                primary_stone_type = COALESCE($10, primary_stone_type),
                primary_stone_weight = COALESCE($11, primary_stone_weight),
                secondary_stone_type = COALESCE($12, secondary_stone_type),
                secondary_stone_weight = COALESCE($13, secondary_stone_weight),
                other_stone_type = COALESCE($14, other_stone_type),
                other_stone_weight = COALESCE($15, other_stone_weight),
                details = COALESCE($16, details)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.category)
            .bind(&input.description)
            .bind(input.base_price)
            .bind(&input.image_url)
            .bind(&input.additional_images)
            .bind(&input.metal_type)
            .bind(&input.metal_weight)
            .bind(&input.primary_stone_type)
            .bind(&input.primary_stone_weight)
            .bind(&input.secondary_stone_type)
            .bind(&input.secondary_stone_weight)
            .bind(&input.other_stone_type)
            .bind(&input.other_stone_weight)
            .bind(&input.details)
            .fetch_optional(pool)
            .await
    }

    /// Apply every generated field in a single statement.
    pub async fn apply_generated_content(
        pool: &PgPool,
        id: DbId,
        content: &ApplyGeneratedContent,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET
                name = $2,
                description = $3,
                details = $4,
                calculated_price_usd = $5,
                calculated_price_inr = $6,
                prices_updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(&content.name)
            .bind(&content.description)
            .bind(&content.details)
            .bind(content.calculated_price_usd)
            .bind(content.calculated_price_inr)
            .fetch_optional(pool)
            .await
    }

    /// Store freshly calculated prices.
    pub async fn update_calculated_prices(
        pool: &PgPool,
        id: DbId,
        price_usd: f64,
        price_inr: f64,
        calculated_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        Self::update_calculated_prices_inner(
            &mut tx,
            &CalculatedPrice {
                product_id: id,
                usd: price_usd,
                inr: price_inr,
            },
            calculated_at,
        )
        .await?;
        tx.commit().await
    }

    /// Store a batch of calculated prices in one transaction. Either every
    /// product is updated or none is.
    pub async fn update_calculated_prices_batch(
        pool: &PgPool,
        prices: &[CalculatedPrice],
        calculated_at: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        for price in prices {
            Self::update_calculated_prices_inner(&mut tx, price, calculated_at).await?;
        }
        tx.commit().await?;
        Ok(prices.len() as u64)
    }

    async fn update_calculated_prices_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        price: &CalculatedPrice,
        calculated_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE products SET
                calculated_price_usd = $2,
                calculated_price_inr = $3,
                prices_updated_at = $4
             WHERE id = $1",
        )
        .bind(price.product_id)
        .bind(price.usd)
        .bind(price.inr)
        .bind(calculated_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
