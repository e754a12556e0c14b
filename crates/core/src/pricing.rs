//! Price resolution and estimation.
//!
//! Two concerns live here:
//!
//! - [`resolve_display_price`]: what the storefront shows. Server-calculated
//!   prices always win; the persisted INR base price is only a fallback,
//!   converted at [`FALLBACK_INR_PER_USD`].
//! - [`estimate_price`]: how the server calculates those prices from a
//!   product's metal and stone specs, used by the scheduled price refresh.

use serde::Serialize;

/// Fixed FX rate used when no server-calculated USD price exists.
pub const FALLBACK_INR_PER_USD: f64 = 83.0;

/// Default labour/overhead markup applied on top of material cost.
pub const DEFAULT_MAKING_CHARGE: f64 = 0.15;

/// Where a displayed price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// Server-calculated `calculated_price_usd` was present.
    Calculated,
    /// Derived from `base_price` at the fallback FX rate.
    BasePriceFallback,
}

/// The price pair shown to shoppers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayPrice {
    pub usd: f64,
    pub inr: f64,
    pub source: PriceSource,
}

/// Resolve the display price for a product.
///
/// USD is `calculated_usd` when present, otherwise `round(base_price_inr / 83)`.
/// INR is `calculated_inr` when present, otherwise the base price itself.
/// Non-finite calculated values are treated as absent.
pub fn resolve_display_price(
    base_price_inr: f64,
    calculated_usd: Option<f64>,
    calculated_inr: Option<f64>,
) -> DisplayPrice {
    let calculated_usd = calculated_usd.filter(|v| v.is_finite());
    let calculated_inr = calculated_inr.filter(|v| v.is_finite());

    match calculated_usd {
        Some(usd) => DisplayPrice {
            usd,
            inr: calculated_inr.unwrap_or_else(|| (usd * FALLBACK_INR_PER_USD).round()),
            source: PriceSource::Calculated,
        },
        None => DisplayPrice {
            usd: (base_price_inr / FALLBACK_INR_PER_USD).round(),
            inr: calculated_inr.unwrap_or(base_price_inr),
            source: PriceSource::BasePriceFallback,
        },
    }
}

/* --------------------------------------------------------------------------
Estimation
-------------------------------------------------------------------------- */

/// Material rates in INR. Metal per gram, stones per carat.
#[derive(Debug, Clone)]
pub struct MaterialRates {
    pub gold_24k: f64,
    pub gold_22k: f64,
    pub gold_18k: f64,
    pub gold_14k: f64,
    pub gold_10k: f64,
    pub platinum: f64,
    pub silver: f64,
    pub diamond: f64,
    pub ruby: f64,
    pub sapphire: f64,
    pub emerald: f64,
    /// Per-carat rate for any stone not listed above.
    pub other_stone: f64,
    pub making_charge: f64,
}

impl Default for MaterialRates {
    fn default() -> Self {
        Self {
            gold_24k: 7_200.0,
            gold_22k: 6_600.0,
            gold_18k: 5_400.0,
            gold_14k: 4_200.0,
            gold_10k: 3_000.0,
            platinum: 3_200.0,
            silver: 90.0,
            diamond: 60_000.0,
            ruby: 25_000.0,
            sapphire: 20_000.0,
            emerald: 22_000.0,
            other_stone: 8_000.0,
            making_charge: DEFAULT_MAKING_CHARGE,
        }
    }
}

fn normalize(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace(['_', '-'], " ")
}

impl MaterialRates {
    /// Per-gram rate for a metal description such as `"18K White Gold"`,
    /// `"platinum"` or `"sterling_silver"`.
    pub fn metal_rate(&self, metal: &str) -> Option<f64> {
        let metal = normalize(metal);
        if metal.contains("platinum") {
            return Some(self.platinum);
        }
        if metal.contains("silver") {
            return Some(self.silver);
        }
        if metal.contains("gold") {
            let rate = [
                ("24k", self.gold_24k),
                ("22k", self.gold_22k),
                ("18k", self.gold_18k),
                ("14k", self.gold_14k),
                ("10k", self.gold_10k),
            ]
            .into_iter()
            .find(|(karat, _)| metal.contains(karat))
            .map(|(_, rate)| rate)
            .unwrap_or(self.gold_18k);
            return Some(rate);
        }
        None
    }

    /// Per-carat rate for a stone name.
    pub fn stone_rate(&self, stone: &str) -> f64 {
        let stone = normalize(stone);
        if stone.contains("diamond") {
            self.diamond
        } else if stone.contains("ruby") {
            self.ruby
        } else if stone.contains("sapphire") {
            self.sapphire
        } else if stone.contains("emerald") {
            self.emerald
        } else {
            self.other_stone
        }
    }
}

/// Resolved material specs for one product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSpecs {
    pub metal_type: Option<String>,
    pub metal_weight_grams: Option<f64>,
    /// `(stone name, carats)` pairs.
    pub stones: Vec<(String, f64)>,
}

/// A freshly calculated price pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceQuote {
    pub usd: f64,
    pub inr: f64,
}

/// Estimate a product price from its specs.
///
/// Returns `None` when the metal is unknown or has no positive weight; such
/// products keep whatever price they already have.
pub fn estimate_price(
    specs: &PriceSpecs,
    rates: &MaterialRates,
    inr_per_usd: f64,
) -> Option<PriceQuote> {
    let metal_rate = rates.metal_rate(specs.metal_type.as_deref()?)?;
    let weight = specs.metal_weight_grams.filter(|w| w.is_finite() && *w > 0.0)?;
    if !(inr_per_usd.is_finite() && inr_per_usd > 0.0) {
        return None;
    }

    let stone_cost: f64 = specs
        .stones
        .iter()
        .filter(|(_, carats)| carats.is_finite() && *carats > 0.0)
        .map(|(name, carats)| rates.stone_rate(name) * carats)
        .sum();

    let material = metal_rate * weight + stone_cost;
    let inr = (material * (1.0 + rates.making_charge)).round();
    let usd = (inr / inr_per_usd).round();

    Some(PriceQuote { usd, inr })
}

/// Parse a loosely formatted weight such as `"4.5"`, `"4.5g"` or `"2 carats"`.
pub fn parse_weight(raw: &str) -> Option<f64> {
    let numeric: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    numeric.parse::<f64>().ok().filter(|w| w.is_finite() && *w > 0.0)
}
