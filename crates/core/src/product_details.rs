//! Product detail reconciliation.
//!
//! A product row carries root-level spec columns plus a free-form `details`
//! TEXT column holding serialized JSON written by older admin forms and by the
//! AI generator:
//!
//! ```text
//! {
//!   "tagline": "...",
//!   "detailedDescription": "...",
//!   "additionalData": { "metalType": "...", "primaryStoneType": "...", ... },
//!   "aiInputs":       { "metalType": "...", "primaryGems": [...], ... }
//! }
//! ```
//!
//! [`build_product_view`] merges all of it into one display model. Spec fields
//! resolve root > `aiInputs` > `additionalData` > absent, and prices always
//! prefer the server-calculated columns. A blob that is not a JSON object is
//! never an error: its raw text becomes the description.

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};

use crate::ai_content::AiInputs;
use crate::error::CoreError;
use crate::gems::{parse_gem_list, Gem};
use crate::pricing::{parse_weight, resolve_display_price, DisplayPrice, PriceSpecs};
use crate::types::DbId;

/// Sentinel the admin form stores when no secondary stone was picked.
pub const SECONDARY_STONE_NONE: &str = "none_selected";

/* --------------------------------------------------------------------------
Details blob
-------------------------------------------------------------------------- */

/// Accept strings, numbers and booleans as text; anything else is absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Accept a gem array (skipping malformed entries) or a free-text gem list.
fn lenient_gems<'de, D>(deserializer: D) -> Result<Vec<Gem>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(name) if !name.trim().is_empty() => {
                    Some(Gem::named(name.trim()))
                }
                other => serde_json::from_value::<Gem>(other).ok(),
            })
            .collect(),
        Some(serde_json::Value::String(text)) => parse_gem_list(&text),
        _ => Vec::new(),
    })
}

fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    })
}

/// Accept a nested object; `null`, scalars, arrays and mistyped objects fall
/// back to the default.
fn lenient_object<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned + Default,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(object @ serde_json::Value::Object(_)) => {
            serde_json::from_value(object).unwrap_or_default()
        }
        _ => T::default(),
    })
}

/// Spec fields as they appear under `additionalData` (and mirrored in `aiInputs`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecFields {
    #[serde(deserialize_with = "lenient_string")]
    pub metal_type: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub metal_weight: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub primary_stone_type: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub primary_stone_weight: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub secondary_stone_type: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub secondary_stone_weight: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub other_stone_type: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub other_stone_weight: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub tagline: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub short_description: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub detailed_description: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub user_description: Option<String>,
}

/// The `aiInputs` object: spec fields plus generator-only inputs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredAiInputs {
    #[serde(flatten)]
    pub specs: SpecFields,
    #[serde(deserialize_with = "lenient_string")]
    pub product_type: Option<String>,
    #[serde(deserialize_with = "lenient_gems")]
    pub primary_gems: Vec<Gem>,
    #[serde(deserialize_with = "lenient_string_list")]
    pub image_urls: Vec<String>,
}

/// The whole `details` object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetailsBlob {
    #[serde(deserialize_with = "lenient_string")]
    pub tagline: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub detailed_description: Option<String>,
    #[serde(deserialize_with = "lenient_object")]
    pub additional_data: SpecFields,
    #[serde(deserialize_with = "lenient_object")]
    pub ai_inputs: Option<StoredAiInputs>,
}

/// Outcome of reading a `details` column.
#[derive(Debug, Clone)]
pub enum ParsedDetails {
    /// Column was null or blank.
    Empty,
    /// Column held a JSON object.
    Structured(Box<DetailsBlob>),
    /// Column held something that is not a JSON object; kept verbatim.
    Raw(String),
}

/// Parse a `details` column. Never fails.
pub fn parse_details(raw: Option<&str>) -> ParsedDetails {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return ParsedDetails::Empty;
    };

    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value @ serde_json::Value::Object(_)) => match DetailsBlob::deserialize(value) {
            Ok(blob) => ParsedDetails::Structured(Box::new(blob)),
            Err(_) => ParsedDetails::Raw(raw.to_string()),
        },
        _ => ParsedDetails::Raw(raw.to_string()),
    }
}

/// Recover the generator inputs stored alongside a product, if any.
pub fn stored_ai_inputs(raw: Option<&str>) -> Option<AiInputs> {
    let ParsedDetails::Structured(blob) = parse_details(raw) else {
        return None;
    };
    let stored = blob.ai_inputs?;
    Some(AiInputs {
        product_type: stored.product_type.unwrap_or_default(),
        metal_type: stored.specs.metal_type.unwrap_or_default(),
        metal_weight: stored.specs.metal_weight.as_deref().and_then(parse_weight),
        primary_gems: stored.primary_gems,
        user_description: stored.specs.user_description,
        image_urls: stored.image_urls,
    })
}

/* --------------------------------------------------------------------------
Reconciliation
-------------------------------------------------------------------------- */

/// Root-level spec columns of a product row.
#[derive(Debug, Clone, Copy, Default)]
pub struct RootSpecs<'a> {
    pub metal_type: Option<&'a str>,
    pub metal_weight: Option<&'a str>,
    pub primary_stone_type: Option<&'a str>,
    pub primary_stone_weight: Option<&'a str>,
    pub secondary_stone_type: Option<&'a str>,
    pub secondary_stone_weight: Option<&'a str>,
    pub other_stone_type: Option<&'a str>,
    pub other_stone_weight: Option<&'a str>,
}

/// Spec fields after precedence resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedSpecs {
    pub metal_type: Option<String>,
    pub metal_weight: Option<String>,
    pub primary_stone_type: Option<String>,
    pub primary_stone_weight: Option<String>,
    pub secondary_stone_type: Option<String>,
    pub secondary_stone_weight: Option<String>,
    pub other_stone_type: Option<String>,
    pub other_stone_weight: Option<String>,
}

impl ResolvedSpecs {
    /// Material specs for price estimation.
    pub fn price_specs(&self) -> PriceSpecs {
        let stones = [
            (&self.primary_stone_type, &self.primary_stone_weight),
            (&self.secondary_stone_type, &self.secondary_stone_weight),
            (&self.other_stone_type, &self.other_stone_weight),
        ]
        .into_iter()
        .filter_map(|(name, weight)| {
            let name = name.as_ref()?;
            let carats = weight.as_deref().and_then(parse_weight)?;
            Some((name.clone(), carats))
        })
        .collect();

        PriceSpecs {
            metal_type: self.metal_type.clone(),
            metal_weight_grams: self.metal_weight.as_deref().and_then(parse_weight),
            stones,
        }
    }
}

/// First non-blank candidate, trimmed.
fn first_present<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

fn is_no_secondary_stone(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case(SECONDARY_STONE_NONE)
}

/// Resolve spec fields with root > `aiInputs` > `additionalData` precedence.
pub fn resolve_specs(root: &RootSpecs<'_>, details: &ParsedDetails) -> ResolvedSpecs {
    let empty = SpecFields::default();
    let (ai, ai_gems, additional) = match details {
        ParsedDetails::Structured(blob) => (
            blob.ai_inputs.as_ref().map(|a| &a.specs).unwrap_or(&empty),
            blob.ai_inputs
                .as_ref()
                .map(|a| a.primary_gems.as_slice())
                .unwrap_or(&[]),
            &blob.additional_data,
        ),
        _ => (&empty, &[][..], &empty),
    };

    macro_rules! resolve {
        ($field:ident) => {
            first_present([
                root.$field,
                ai.$field.as_deref(),
                additional.$field.as_deref(),
            ])
        };
    }

    let lead_gem = ai_gems.first();
    let mut primary_stone_type = resolve!(primary_stone_type);
    let mut primary_stone_weight = resolve!(primary_stone_weight);
    if primary_stone_type.is_none() {
        if let Some(gem) = lead_gem {
            primary_stone_type = Some(gem.name.clone());
            if primary_stone_weight.is_none() {
                primary_stone_weight = gem.carats.map(|c| c.to_string());
            }
        }
    }

    let secondary_stone_type = resolve!(secondary_stone_type).filter(|s| !is_no_secondary_stone(s));
    let secondary_stone_weight = secondary_stone_type
        .as_ref()
        .and_then(|_| resolve!(secondary_stone_weight));

    ResolvedSpecs {
        metal_type: resolve!(metal_type),
        metal_weight: resolve!(metal_weight),
        primary_stone_type,
        primary_stone_weight,
        secondary_stone_type,
        secondary_stone_weight,
        other_stone_type: resolve!(other_stone_type),
        other_stone_weight: resolve!(other_stone_weight),
    }
}

/// A product row, borrowed, as input to [`build_product_view`].
#[derive(Debug, Clone, Copy)]
pub struct ProductRecord<'a> {
    pub id: DbId,
    pub name: &'a str,
    pub category: Option<&'a str>,
    pub description: Option<&'a str>,
    pub base_price: f64,
    pub calculated_price_usd: Option<f64>,
    pub calculated_price_inr: Option<f64>,
    pub image_url: Option<&'a str>,
    pub additional_images: &'a [String],
    pub root: RootSpecs<'a>,
    pub details: Option<&'a str>,
}

/// Display model served to the storefront.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: DbId,
    pub name: String,
    pub category: Option<String>,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub detailed_description: Option<String>,
    pub image_url: Option<String>,
    pub additional_images: Vec<String>,
    pub price: DisplayPrice,
    pub specs: ResolvedSpecs,
    /// True when `details` could not be read as a JSON object.
    pub details_malformed: bool,
}

/// Merge a product row into its display model.
pub fn build_product_view(record: &ProductRecord<'_>) -> ProductView {
    let details = parse_details(record.details);
    let specs = resolve_specs(&record.root, &details);
    let price = resolve_display_price(
        record.base_price,
        record.calculated_price_usd,
        record.calculated_price_inr,
    );

    let (tagline, description, detailed_description, details_malformed) = match &details {
        ParsedDetails::Raw(raw) => (None, Some(raw.clone()), None, true),
        ParsedDetails::Structured(blob) => (
            first_present([blob.tagline.as_deref(), blob.additional_data.tagline.as_deref()]),
            first_present([
                record.description,
                blob.description.as_deref(),
                blob.additional_data.short_description.as_deref(),
            ]),
            first_present([
                blob.detailed_description.as_deref(),
                blob.additional_data.detailed_description.as_deref(),
            ]),
            false,
        ),
        ParsedDetails::Empty => (None, first_present([record.description]), None, false),
    };

    ProductView {
        id: record.id,
        name: record.name.to_string(),
        category: record.category.map(str::to_string),
        tagline,
        description,
        detailed_description,
        image_url: record.image_url.map(str::to_string),
        additional_images: record.additional_images.to_vec(),
        price,
        specs,
        details_malformed,
    }
}

/* --------------------------------------------------------------------------
Writing back
-------------------------------------------------------------------------- */

/// Fields written into `details` after content generation.
#[derive(Debug, Clone, Default)]
pub struct DetailsUpdate<'a> {
    pub tagline: Option<&'a str>,
    pub detailed_description: Option<&'a str>,
    pub ai_inputs: Option<&'a AiInputs>,
}

/// Merge an update into an existing `details` column, preserving unknown keys.
///
/// A column that is not a JSON object is kept under `legacyDetails` rather
/// than discarded.
pub fn merge_details(existing: Option<&str>, update: &DetailsUpdate<'_>) -> String {
    let mut object = match existing.filter(|r| !r.trim().is_empty()) {
        None => serde_json::Map::new(),
        Some(raw) => match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => {
                let mut map = serde_json::Map::new();
                map.insert("legacyDetails".into(), serde_json::Value::String(raw.into()));
                map
            }
        },
    };

    if let Some(tagline) = update.tagline {
        object.insert("tagline".into(), tagline.into());
    }
    if let Some(detailed) = update.detailed_description {
        object.insert("detailedDescription".into(), detailed.into());
    }
    if let Some(inputs) = update.ai_inputs {
        if let Ok(value) = serde_json::to_value(inputs) {
            object.insert("aiInputs".into(), value);
        }
    }

    serde_json::Value::Object(object).to_string()
}

/// Maximum length of a product name.
pub const MAX_PRODUCT_NAME_LENGTH: usize = 200;

/// Validate the catalog fields an admin sets directly.
///
/// `None` means the field is not being changed.
pub fn validate_catalog_fields(name: Option<&str>, base_price: Option<f64>) -> Result<(), CoreError> {
    if let Some(name) = name {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("Product name is required".into()));
        }
        if name.chars().count() > MAX_PRODUCT_NAME_LENGTH {
            return Err(CoreError::Validation(format!(
                "Product name exceeds maximum length of {MAX_PRODUCT_NAME_LENGTH} characters"
            )));
        }
    }
    if let Some(price) = base_price {
        if !price.is_finite() || price < 0.0 {
            return Err(CoreError::Validation(
                "Base price must be a non-negative number".into(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::pricing::PriceSource;

    fn record<'a>(details: Option<&'a str>, root: RootSpecs<'a>) -> ProductRecord<'a> {
        ProductRecord {
            id: 7,
            name: "Halo Ring",
            category: Some("rings"),
            description: None,
            base_price: 41_500.0,
            calculated_price_usd: None,
            calculated_price_inr: None,
            image_url: None,
            additional_images: &[],
            root,
            details,
        }
    }

    #[test]
    fn malformed_details_become_the_description() {
        let raw = "{not json at all";
        let view = build_product_view(&record(Some(raw), RootSpecs::default()));
        assert_eq!(view.description.as_deref(), Some(raw));
        assert!(view.details_malformed);
        assert_eq!(view.specs, ResolvedSpecs::default());
    }

    #[test]
    fn non_object_json_is_treated_as_raw_text() {
        assert_matches!(parse_details(Some("\"just a string\"")), ParsedDetails::Raw(_));
        assert_matches!(parse_details(Some("[1,2]")), ParsedDetails::Raw(_));
        assert_matches!(parse_details(Some("   ")), ParsedDetails::Empty);
        assert_matches!(parse_details(None), ParsedDetails::Empty);
    }

    #[test]
    fn null_additional_data_keeps_the_rest_of_the_blob() {
        let details =
            json!({"tagline": "Light", "additionalData": null, "aiInputs": {"metalType": "18k gold"}})
                .to_string();
        let mut rec = record(Some(&details), RootSpecs::default());
        rec.description = Some("A ring");
        let view = build_product_view(&rec);

        assert!(!view.details_malformed);
        assert_eq!(view.tagline.as_deref(), Some("Light"));
        assert_eq!(view.specs.metal_type.as_deref(), Some("18k gold"));
        assert_eq!(view.description.as_deref(), Some("A ring"));
    }

    #[test]
    fn mistyped_nested_sections_are_ignored() {
        for nested in [json!("legacy text"), json!([1, 2]), json!(42)] {
            let details = json!({"tagline": "Bold", "additionalData": nested, "aiInputs": nested})
                .to_string();
            let ParsedDetails::Structured(blob) = parse_details(Some(&details)) else {
                panic!("expected a structured blob for {nested}");
            };
            assert_eq!(blob.tagline.as_deref(), Some("Bold"));
            assert!(blob.ai_inputs.is_none());
            assert!(blob.additional_data.metal_type.is_none());
        }
    }

    #[test]
    fn root_beats_ai_inputs_beats_additional_data() {
        let details = json!({
            "aiInputs": { "metalType": "22k gold", "metalWeight": 6 },
            "additionalData": { "metalType": "silver", "metalWeight": "9", "otherStoneType": "Onyx" }
        })
        .to_string();
        let root = RootSpecs {
            metal_type: Some("platinum"),
            ..Default::default()
        };
        let view = build_product_view(&record(Some(&details), root));
        assert_eq!(view.specs.metal_type.as_deref(), Some("platinum"));
        assert_eq!(view.specs.metal_weight.as_deref(), Some("6"));
        assert_eq!(view.specs.other_stone_type.as_deref(), Some("Onyx"));
    }

    #[test]
    fn blank_root_value_falls_through() {
        let details = json!({ "additionalData": { "metalType": "18k gold" } }).to_string();
        let root = RootSpecs {
            metal_type: Some("  "),
            ..Default::default()
        };
        let specs = resolve_specs(&root, &parse_details(Some(&details)));
        assert_eq!(specs.metal_type.as_deref(), Some("18k gold"));
    }

    #[test]
    fn secondary_stone_sentinels_resolve_to_absent() {
        for sentinel in ["", "none_selected", "NONE_SELECTED"] {
            let root = RootSpecs {
                secondary_stone_type: Some(sentinel),
                secondary_stone_weight: Some("0.2"),
                ..Default::default()
            };
            let specs = resolve_specs(&root, &ParsedDetails::Empty);
            assert_eq!(specs.secondary_stone_type, None, "sentinel {sentinel:?}");
            assert_eq!(specs.secondary_stone_weight, None);
        }
        let specs = resolve_specs(&RootSpecs::default(), &ParsedDetails::Empty);
        assert_eq!(specs.secondary_stone_type, None);
    }

    #[test]
    fn lead_gem_backs_the_primary_stone() {
        let details = json!({
            "aiInputs": { "primaryGems": [{ "name": "Diamond", "carats": 1.5 }, { "name": "Ruby" }] }
        })
        .to_string();
        let specs = resolve_specs(&RootSpecs::default(), &parse_details(Some(&details)));
        assert_eq!(specs.primary_stone_type.as_deref(), Some("Diamond"));
        assert_eq!(specs.primary_stone_weight.as_deref(), Some("1.5"));
    }

    #[test]
    fn gem_text_inside_ai_inputs_is_parsed() {
        let details = json!({ "aiInputs": { "primaryGems": "Emerald (2 carats)" } }).to_string();
        let inputs = stored_ai_inputs(Some(&details)).unwrap();
        assert_eq!(inputs.primary_gems, vec![Gem::with_carats("Emerald", 2.0)]);
    }

    #[test]
    fn calculated_price_wins_in_view() {
        let mut rec = record(None, RootSpecs::default());
        rec.calculated_price_usd = Some(612.0);
        rec.calculated_price_inr = Some(50_800.0);
        let view = build_product_view(&rec);
        assert_eq!(view.price.usd, 612.0);
        assert_eq!(view.price.source, PriceSource::Calculated);
    }

    #[test]
    fn fallback_price_uses_base_price() {
        let view = build_product_view(&record(None, RootSpecs::default()));
        assert_eq!(view.price.usd, (41_500.0_f64 / 83.0).round());
        assert_eq!(view.price.inr, 41_500.0);
    }

    #[test]
    fn tagline_and_descriptions_come_from_the_blob() {
        let details = json!({
            "tagline": "Light, caught.",
            "additionalData": { "shortDescription": "A halo ring.", "detailedDescription": "Long form." }
        })
        .to_string();
        let view = build_product_view(&record(Some(&details), RootSpecs::default()));
        assert_eq!(view.tagline.as_deref(), Some("Light, caught."));
        assert_eq!(view.description.as_deref(), Some("A halo ring."));
        assert_eq!(view.detailed_description.as_deref(), Some("Long form."));
    }

    #[test]
    fn price_specs_skip_stones_without_weight() {
        let specs = ResolvedSpecs {
            metal_type: Some("18k gold".into()),
            metal_weight: Some("4.2g".into()),
            primary_stone_type: Some("Diamond".into()),
            primary_stone_weight: Some("0.5".into()),
            other_stone_type: Some("Opal".into()),
            ..Default::default()
        };
        let price = specs.price_specs();
        assert_eq!(price.metal_weight_grams, Some(4.2));
        assert_eq!(price.stones, vec![("Diamond".to_string(), 0.5)]);
    }

    #[test]
    fn merge_details_preserves_unknown_keys() {
        let existing = json!({ "legacyFlag": true, "tagline": "old" }).to_string();
        let merged = merge_details(
            Some(&existing),
            &DetailsUpdate {
                tagline: Some("new"),
                ..Default::default()
            },
        );
        let value: serde_json::Value = serde_json::from_str(&merged).unwrap();
        assert_eq!(value["legacyFlag"], true);
        assert_eq!(value["tagline"], "new");
    }

    #[test]
    fn merge_details_keeps_malformed_text() {
        let merged = merge_details(Some("free text"), &DetailsUpdate::default());
        let value: serde_json::Value = serde_json::from_str(&merged).unwrap();
        assert_eq!(value["legacyDetails"], "free text");
    }

    #[test]
    fn catalog_fields_reject_blank_name_and_negative_price() {
        assert!(validate_catalog_fields(Some("Halo Ring"), Some(0.0)).is_ok());
        assert!(validate_catalog_fields(None, None).is_ok());
        assert!(validate_catalog_fields(Some("  "), None).is_err());
        assert!(validate_catalog_fields(None, Some(-5.0)).is_err());
        assert!(validate_catalog_fields(None, Some(f64::NAN)).is_err());
    }
}
