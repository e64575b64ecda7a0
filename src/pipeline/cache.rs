//! Concurrent cache of fitted models.

use crate::core::SalesFilter;
use crate::data::DataSnapshot;
use crate::models::FittedModel;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Identity of a fit: what was selected, from which data, with which settings.
///
/// Horizon and safety ratio are not part of the key; one fitted model
/// serves every horizon.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FitKey {
    pub filter: SalesFilter,
    pub snapshot: DataSnapshot,
    pub config: u64,
}

impl FitKey {
    pub fn new(filter: SalesFilter, snapshot: DataSnapshot, config: u64) -> Self {
        Self {
            filter,
            snapshot,
            config,
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    model: Arc<FittedModel>,
    last_used: u64,
}

/// Bounded map from [`FitKey`] to a shared fitted model.
///
/// When full, entries fitted on other data snapshots are dropped first,
/// then the least recently used entry.
#[derive(Debug, Clone)]
pub struct ModelCache {
    entries: Arc<DashMap<FitKey, CacheEntry>>,
    clock: Arc<AtomicU64>,
    capacity: usize,
}

impl ModelCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            clock: Arc::new(AtomicU64::new(0)),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    pub fn get(&self, key: &FitKey) -> Option<Arc<FittedModel>> {
        let tick = self.tick();
        let mut entry = self.entries.get_mut(key)?;
        entry.last_used = tick;
        Some(Arc::clone(&entry.model))
    }

    pub fn contains(&self, key: &FitKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Store a model, evicting as needed to stay within capacity.
    pub fn insert(&self, key: FitKey, model: Arc<FittedModel>) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict_for(key.snapshot);
        }
        let last_used = self.tick();
        self.entries.insert(key, CacheEntry { model, last_used });
    }

    fn evict_for(&self, current: DataSnapshot) {
        let before = self.entries.len();
        self.entries.retain(|k, _| k.snapshot == current);
        let stale = before - self.entries.len();

        let mut lru = 0;
        while self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|e| e.value().last_used)
                .map(|e| e.key().clone());
            match oldest {
                Some(key) => {
                    self.entries.remove(&key);
                    lru += 1;
                }
                None => break,
            }
        }
        debug!(stale, lru, "evicted fitted models");
    }

    /// Drop every model fitted on `snapshot`.
    pub fn invalidate_snapshot(&self, snapshot: DataSnapshot) -> usize {
        let before = self.entries.len();
        self.entries.retain(|k, _| k.snapshot != snapshot);
        before - self.entries.len()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new(32)
    }
}
