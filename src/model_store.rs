//! Bounded LRU cache in front of a [`ModelStore`] implementation (§5).
//!
//! Grounded on the teacher's process-wide singleton caching habit
//! (`amas/metrics.rs`), adapted here to an explicit, per-engine cache object
//! rather than a `OnceLock` global — the engine owns its cache, not the
//! process. The `lru` crate is an enrichment pulled in for this purpose.

use crate::linucb::LinUCBModel;
use crate::store::ModelStore;
use crate::types::ItemId;
use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use tokio::sync::Mutex;

pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Wraps a backing [`ModelStore`] with a bounded LRU of recently used models.
/// Reads hit the cache first; writes go through to the store and refresh the
/// cache entry, so the cache is never the sole copy of a model.
pub struct ModelCache<S: ModelStore> {
    store: S,
    cache: Mutex<LruCache<ItemId, LinUCBModel>>,
}

impl<S: ModelStore> ModelCache<S> {
    pub fn new(store: S, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self {
            store,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn with_default_capacity(store: S) -> Self {
        Self::new(store, DEFAULT_CACHE_CAPACITY)
    }

    /// Drops every cached entry without touching the backing store.
    pub async fn invalidate_all(&self) {
        self.cache.lock().await.clear();
    }
}

#[async_trait]
impl<S: ModelStore> ModelStore for ModelCache<S> {
    type Error = S::Error;

    async fn get(&self, item_id: &ItemId) -> Result<Option<LinUCBModel>, Self::Error> {
        {
            let mut cache = self.cache.lock().await;
            if let Some(model) = cache.get(item_id) {
                return Ok(Some(model.clone()));
            }
        }

        let loaded = self.store.get(item_id).await?;
        if let Some(model) = &loaded {
            self.cache.lock().await.put(item_id.clone(), model.clone());
        }
        Ok(loaded)
    }

    async fn put(&self, item_id: &ItemId, model: &LinUCBModel) -> Result<(), Self::Error> {
        self.store.put(item_id, model).await?;
        self.cache.lock().await.put(item_id.clone(), model.clone());
        Ok(())
    }
}
