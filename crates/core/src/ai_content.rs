//! AI product-content generation: inputs, response validation, and applying
//! generated content onto a product form.
//!
//! The generator itself is an external HTTP service. This module only knows
//! what goes in, what must come out, and that a response missing any field
//! is rejected whole.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::gems::{parse_gem_list, validate_gems, Gem};

/// Maximum length of the free-text description passed to the generator.
pub const MAX_USER_DESCRIPTION_LENGTH: usize = 2_000;

/// Maximum number of reference images per generation request.
pub const MAX_REFERENCE_IMAGES: usize = 10;

/// Parameters sent to the generator and stored under `details.aiInputs`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiInputs {
    pub product_type: String,
    pub metal_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metal_weight: Option<f64>,
    #[serde(default)]
    pub primary_gems: Vec<Gem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_description: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// Request body accepted by the generate endpoints.
///
/// Gems may arrive structured (`primaryGems`) or as free text (`gemText`);
/// the free text is only parsed when no structured list was given.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentInput {
    #[serde(flatten)]
    pub inputs: AiInputs,
    #[serde(default)]
    pub gem_text: Option<String>,
}

impl GenerateContentInput {
    pub fn into_inputs(self) -> AiInputs {
        let mut inputs = self.inputs;
        if inputs.primary_gems.is_empty() {
            if let Some(text) = self.gem_text.as_deref() {
                inputs.primary_gems = parse_gem_list(text);
            }
        }
        inputs
    }
}

fn is_acceptable_image_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://") || url.starts_with('/')
}

/// Validate generator inputs before any network call.
pub fn validate_ai_inputs(inputs: &AiInputs) -> Result<(), CoreError> {
    if inputs.product_type.trim().is_empty() {
        return Err(CoreError::Validation("Product type is required".into()));
    }
    if inputs.metal_type.trim().is_empty() {
        return Err(CoreError::Validation("Metal type is required".into()));
    }
    if let Some(weight) = inputs.metal_weight {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(CoreError::Validation(
                "Metal weight must be a positive number of grams".into(),
            ));
        }
    }
    validate_gems(&inputs.primary_gems)?;
    if let Some(desc) = &inputs.user_description {
        if desc.len() > MAX_USER_DESCRIPTION_LENGTH {
            return Err(CoreError::Validation(format!(
                "Description exceeds maximum length of {MAX_USER_DESCRIPTION_LENGTH} characters"
            )));
        }
    }
    if inputs.image_urls.len() > MAX_REFERENCE_IMAGES {
        return Err(CoreError::Validation(format!(
            "At most {MAX_REFERENCE_IMAGES} reference images are allowed"
        )));
    }
    if let Some(bad) = inputs
        .image_urls
        .iter()
        .find(|u| !is_acceptable_image_url(u))
    {
        return Err(CoreError::Validation(format!(
            "Image URL '{bad}' must be absolute or site-relative"
        )));
    }
    Ok(())
}

/// How a generation request is encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestEncoding {
    /// Plain JSON body; images are referenced by URL only.
    Json,
    /// `multipart/form-data` with an `inputs` JSON part and image parts.
    Multipart,
}

impl RequestEncoding {
    /// Multipart only when new binary images are attached.
    pub fn for_uploads(upload_count: usize) -> Self {
        if upload_count > 0 {
            Self::Multipart
        } else {
            Self::Json
        }
    }
}

/* --------------------------------------------------------------------------
Generated content
-------------------------------------------------------------------------- */

/// Generator response as received. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGeneratedContent {
    pub title: Option<String>,
    pub tagline: Option<String>,
    pub short_description: Option<String>,
    pub detailed_description: Option<String>,
    #[serde(alias = "priceUSD")]
    pub price_usd: Option<f64>,
    #[serde(alias = "priceINR")]
    pub price_inr: Option<f64>,
}

/// A generator response missing one or more required fields.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Generated content is incomplete; missing: {}", .missing.join(", "))]
pub struct IncompleteContent {
    pub missing: Vec<&'static str>,
}

/// A complete generator response. Only constructible with every field set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedContent {
    pub title: String,
    pub tagline: String,
    pub short_description: String,
    pub detailed_description: String,
    pub price_usd: f64,
    pub price_inr: f64,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl TryFrom<RawGeneratedContent> for GeneratedContent {
    type Error = IncompleteContent;

    fn try_from(raw: RawGeneratedContent) -> Result<Self, Self::Error> {
        let title = non_blank(raw.title);
        let tagline = non_blank(raw.tagline);
        let short_description = non_blank(raw.short_description);
        let detailed_description = non_blank(raw.detailed_description);
        let price_usd = raw.price_usd.filter(|p| p.is_finite() && *p >= 0.0);
        let price_inr = raw.price_inr.filter(|p| p.is_finite() && *p >= 0.0);

        let mut missing = Vec::new();
        if title.is_none() {
            missing.push("title");
        }
        if tagline.is_none() {
            missing.push("tagline");
        }
        if short_description.is_none() {
            missing.push("shortDescription");
        }
        if detailed_description.is_none() {
            missing.push("detailedDescription");
        }
        if price_usd.is_none() {
            missing.push("priceUSD");
        }
        if price_inr.is_none() {
            missing.push("priceINR");
        }

        match (
            title,
            tagline,
            short_description,
            detailed_description,
            price_usd,
            price_inr,
        ) {
            (Some(title), Some(tagline), Some(short), Some(detailed), Some(usd), Some(inr)) => {
                Ok(Self {
                    title,
                    tagline,
                    short_description: short,
                    detailed_description: detailed,
                    price_usd: usd,
                    price_inr: inr,
                })
            }
            _ => Err(IncompleteContent { missing }),
        }
    }
}

/* --------------------------------------------------------------------------
Product form
-------------------------------------------------------------------------- */

/// The editable product form the generator fills in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
    pub name: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub detailed_description: Option<String>,
    #[serde(default)]
    pub price_usd: Option<f64>,
    #[serde(default)]
    pub price_inr: Option<f64>,
}

impl ProductForm {
    /// Return a copy of the form with every generated field applied.
    pub fn apply_generated(&self, content: &GeneratedContent) -> ProductForm {
        ProductForm {
            name: content.title.clone(),
            tagline: Some(content.tagline.clone()),
            description: Some(content.short_description.clone()),
            detailed_description: Some(content.detailed_description.clone()),
            price_usd: Some(content.price_usd),
            price_inr: Some(content.price_inr),
        }
    }
}
