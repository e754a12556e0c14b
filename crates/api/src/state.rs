use std::sync::Arc;

use atelier_core::pricing::MaterialRates;

use crate::ai::client::AiContentClient;
use crate::cache::QueryCache;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: atelier_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Query cache shared by read handlers and invalidated by writes.
    pub cache: Arc<QueryCache>,
    /// Client for the AI product-content service.
    pub ai_client: AiContentClient,
    /// Material rate table used by the price refresh.
    pub rates: Arc<MaterialRates>,
}
