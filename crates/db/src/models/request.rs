//! Custom design requests and customization (personalization) requests.

use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/* --------------------------------------------------------------------------
   Custom design requests
   -------------------------------------------------------------------------- */

/// A row from the `custom_design_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CustomDesignRequest {
    pub id: DbId,
    pub user_id: DbId,
    pub status: String,
    pub metal_type: Option<String>,
    pub stone_preferences: Option<String>,
    pub description: String,
    pub budget: Option<f64>,
    pub image_urls: Vec<String>,
    pub quoted_price: Option<f64>,
    pub cad_image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a custom design request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCustomDesignRequest {
    pub metal_type: Option<String>,
    pub stone_preferences: Option<String>,
    pub description: String,
    pub budget: Option<f64>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/* --------------------------------------------------------------------------
   Customization requests
   -------------------------------------------------------------------------- */

/// A row from the `customization_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CustomizationRequest {
    pub id: DbId,
    pub user_id: DbId,
    pub product_id: DbId,
    pub status: String,
    pub metal_type: Option<String>,
    pub stone_preferences: Option<String>,
    pub description: String,
    pub quoted_price: Option<f64>,
    pub cad_image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a customization request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCustomizationRequest {
    pub product_id: DbId,
    pub metal_type: Option<String>,
    pub stone_preferences: Option<String>,
    pub description: String,
}

/* --------------------------------------------------------------------------
   Status updates (both kinds)
   -------------------------------------------------------------------------- */

/// DTO for an admin status change. `quoted_price` is required for `quoted`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRequestStatus {
    pub status: String,
    pub quoted_price: Option<f64>,
    pub cad_image_url: Option<String>,
}
