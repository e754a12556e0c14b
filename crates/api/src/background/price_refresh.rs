//! Periodic recalculation of product prices.
//!
//! Recomputes `calculated_price_usd` / `calculated_price_inr` for every
//! product from the material rate table and the product's resolved specs.
//! Products whose specs do not yield an estimate keep their stored prices.
//! All estimates from one pass are written in a single transaction, so a
//! failed pass changes nothing and leaves the cache consistent with the
//! database. The same refresh can be triggered on demand by an admin.

use std::time::Duration;

use atelier_core::pricing::{estimate_price, MaterialRates};
use atelier_core::product_details::{parse_details, resolve_specs};
use atelier_db::models::product::CalculatedPrice;
use atelier_db::repositories::ProductRepo;
use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::cache::QueryKey;
use crate::state::AppState;

/// Counts from one refresh pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    pub updated: u64,
    pub skipped: u64,
}

/// Recalculate prices for every product.
pub async fn refresh_all_prices(
    pool: &PgPool,
    rates: &MaterialRates,
    inr_per_usd: f64,
) -> Result<RefreshSummary, sqlx::Error> {
    let products = ProductRepo::list_all(pool).await?;
    let mut prices = Vec::with_capacity(products.len());

    for product in &products {
        let record = product.as_record();
        let specs = resolve_specs(&record.root, &parse_details(record.details)).price_specs();
        if let Some(quote) = estimate_price(&specs, rates, inr_per_usd) {
            prices.push(CalculatedPrice {
                product_id: product.id,
                usd: quote.usd,
                inr: quote.inr,
            });
        }
    }

    let updated = ProductRepo::update_calculated_prices_batch(pool, &prices, Utc::now()).await?;
    Ok(RefreshSummary {
        updated,
        skipped: (products.len() - prices.len()) as u64,
    })
}

/// Run one refresh and drop cached product data if anything changed.
pub async fn refresh_and_invalidate(state: &AppState) -> Result<RefreshSummary, sqlx::Error> {
    let summary =
        refresh_all_prices(&state.pool, &state.rates, state.config.inr_per_usd).await?;
    if summary.updated > 0 {
        state.cache.invalidate_where(QueryKey::is_product_data).await;
    }
    Ok(summary)
}

/// Run the price refresh loop until `cancel` is triggered.
pub async fn run(state: AppState, cancel: CancellationToken) {
    let interval_secs = state.config.price_refresh_interval_secs.max(1);

    tracing::info!(interval_secs, "Price refresh job started");

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Price refresh job stopping");
                break;
            }
            _ = interval.tick() => {
                match refresh_and_invalidate(&state).await {
                    Ok(summary) => {
                        tracing::info!(
                            updated = summary.updated,
                            skipped = summary.skipped,
                            "Price refresh: pass complete"
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Price refresh: pass failed");
                    }
                }
            }
        }
    }
}
