//! In-process query cache for storefront and back-office reads.
//!
//! Entries are keyed by [`QueryKey`] and expire after a fixed TTL. Every key
//! also carries a generation counter that is bumped on invalidation. A load
//! records the generation when it starts and only stores its result if the
//! generation is unchanged when it finishes, so a read that raced a write
//! can never put pre-write data back into the cache.
//!
//! Mutating handlers invalidate only after their database write succeeds.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use atelier_core::types::DbId;
use tokio::sync::RwLock;

use crate::error::AppResult;

/// Entry count above which expired entries are swept on insert.
const SWEEP_THRESHOLD: usize = 1_024;

/// Identifies one cached query result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Product(DbId),
    ProductList {
        category: Option<String>,
        limit: i64,
        offset: i64,
    },
    RelatedProducts(DbId),
    /// A custom design request with its comment thread.
    CustomDesign(DbId),
    /// A customer's custom design requests, by user id.
    UserCustomDesigns(DbId),
    /// A customization request with its comment thread.
    Customization(DbId),
    /// A customer's customization requests, by user id.
    UserCustomizations(DbId),
    /// One page of approved testimonials.
    PublicTestimonials { limit: i64, offset: i64 },
    /// One page of the admin testimonial list for a status filter (`None` = all).
    AdminTestimonials {
        status: Option<String>,
        limit: i64,
        offset: i64,
    },
}

impl QueryKey {
    /// Keys whose results include product data.
    pub fn is_product_data(&self) -> bool {
        matches!(
            self,
            Self::Product(_) | Self::ProductList { .. } | Self::RelatedProducts(_)
        )
    }

    /// Keys whose results include testimonials.
    pub fn is_testimonial_list(&self) -> bool {
        matches!(
            self,
            Self::PublicTestimonials { .. } | Self::AdminTestimonials { .. }
        )
    }
}

struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    stored_at: Instant,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<QueryKey, Entry>,
    generations: HashMap<QueryKey, u64>,
}

/// Proof that a load started at a given generation of its key.
#[derive(Debug)]
pub struct LoadTicket {
    key: QueryKey,
    generation: u64,
}

/// TTL cache with generation-checked stores.
pub struct QueryCache {
    ttl: Duration,
    inner: RwLock<Inner>,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Return a fresh cached value of type `T`, if any.
    pub async fn get<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let inner = self.inner.read().await;
        let entry = inner.entries.get(key)?;
        if entry.stored_at.elapsed() >= self.ttl {
            return None;
        }
        entry.value.downcast_ref::<T>().cloned()
    }

    /// Record the current generation of `key` before loading it.
    pub async fn begin_load(&self, key: QueryKey) -> LoadTicket {
        let mut inner = self.inner.write().await;
        let generation = *inner.generations.entry(key.clone()).or_insert(0);
        LoadTicket { key, generation }
    }

    /// Store a loaded value unless its key was invalidated meanwhile.
    ///
    /// Returns `false` when the value was discarded as stale.
    pub async fn finish_load<T>(&self, ticket: LoadTicket, value: T) -> bool
    where
        T: Send + Sync + 'static,
    {
        let mut guard = self.inner.write().await;
        let Inner {
            entries,
            generations,
        } = &mut *guard;

        if generations.get(&ticket.key).copied() != Some(ticket.generation) {
            return false;
        }

        if entries.len() >= SWEEP_THRESHOLD {
            let ttl = self.ttl;
            entries.retain(|_, e| e.stored_at.elapsed() < ttl);
            generations.retain(|k, _| k == &ticket.key || entries.contains_key(k));
        }

        entries.insert(
            ticket.key,
            Entry {
                value: Arc::new(value),
                stored_at: Instant::now(),
            },
        );
        true
    }

    /// Drop `key` and fence off any load of it that is still in flight.
    pub async fn invalidate(&self, key: &QueryKey) {
        self.invalidate_where(|k| k == key).await;
    }

    /// Drop every key matching `predicate` and fence off in-flight loads.
    pub async fn invalidate_where(&self, predicate: impl Fn(&QueryKey) -> bool) {
        let mut guard = self.inner.write().await;
        let Inner {
            entries,
            generations,
        } = &mut *guard;

        entries.retain(|k, _| !predicate(k));
        for (key, generation) in generations.iter_mut() {
            if predicate(key) {
                *generation += 1;
            }
        }
    }

    /// Return the cached value for `key`, or run `load` and cache its result.
    pub async fn get_or_load<T, F, Fut>(&self, key: QueryKey, load: F) -> AppResult<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        if let Some(hit) = self.get::<T>(&key).await {
            return Ok(hit);
        }

        let ticket = self.begin_load(key).await;
        let value = load().await?;
        if !self.finish_load(ticket, value.clone()).await {
            tracing::debug!("Query cache: discarded result of a load that raced an invalidation");
        }
        Ok(value)
    }
}
