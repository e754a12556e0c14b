//! Product catalog rows.

use atelier_core::product_details::{ProductRecord, RootSpecs};
use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: DbId,
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub base_price: f64,
    pub calculated_price_usd: Option<f64>,
    pub calculated_price_inr: Option<f64>,
    pub image_url: Option<String>,
    pub additional_images: Vec<String>,
    pub metal_type: Option<String>,
    pub metal_weight: Option<String>,
    pub primary_stone_type: Option<String>,
    pub primary_stone_weight: Option<String>,
    pub secondary_stone_type: Option<String>,
    pub secondary_stone_weight: Option<String>,
    pub other_stone_type: Option<String>,
    pub other_stone_weight: Option<String>,
    pub details: Option<String>,
    pub prices_updated_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Product {
    /// Borrow this row as input to the detail reconciler.
    pub fn as_record(&self) -> ProductRecord<'_> {
        ProductRecord {
            id: self.id,
            name: &self.name,
            category: self.category.as_deref(),
            description: self.description.as_deref(),
            base_price: self.base_price,
            calculated_price_usd: self.calculated_price_usd,
            calculated_price_inr: self.calculated_price_inr,
            image_url: self.image_url.as_deref(),
            additional_images: &self.additional_images,
            root: RootSpecs {
                metal_type: self.metal_type.as_deref(),
                metal_weight: self.metal_weight.as_deref(),
                primary_stone_type: self.primary_stone_type.as_deref(),
                primary_stone_weight: self.primary_stone_weight.as_deref(),
                secondary_stone_type: self.secondary_stone_type.as_deref(),
                secondary_stone_weight: self.secondary_stone_weight.as_deref(),
                other_stone_type: self.other_stone_type.as_deref(),
                other_stone_weight: self.other_stone_weight.as_deref(),
            },
            details: self.details.as_deref(),
        }
    }
}

/// DTO for creating a new product.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub base_price: f64,
    pub image_url: Option<String>,
    #[serde(default)]
    pub additional_images: Vec<String>,
    pub metal_type: Option<String>,
    pub metal_weight: Option<String>,
    pub primary_stone_type: Option<String>,
    pub primary_stone_weight: Option<String>,
    pub secondary_stone_type: Option<String>,
    pub secondary_stone_weight: Option<String>,
    pub other_stone_type: Option<String>,
    pub other_stone_weight: Option<String>,
    pub details: Option<String>,
}

/// DTO for updating an existing product. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub base_price: Option<f64>,
    pub image_url: Option<String>,
    pub additional_images: Option<Vec<String>>,
    pub metal_type: Option<String>,
    pub metal_weight: Option<String>,
    pub primary_stone_type: Option<String>,
    pub primary_stone_weight: Option<String>,
    pub secondary_stone_type: Option<String>,
    pub secondary_stone_weight: Option<String>,
    pub other_stone_type: Option<String>,
    pub other_stone_weight: Option<String>,
    pub details: Option<String>,
}

/// Generated content applied to a product in one statement.
#[derive(Debug, Clone)]
pub struct ApplyGeneratedContent {
    pub name: String,
    pub description: String,
    pub details: String,
    pub calculated_price_usd: f64,
    pub calculated_price_inr: f64,
}

/// A freshly estimated price pair for one product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalculatedPrice {
    pub product_id: DbId,
    pub usd: f64,
    pub inr: f64,
}
