//! Content-addressed cache of fitted models.
//!
//! A fit is a pure function of (series, spec, options), so the cache keys on
//! a SHA-256 fingerprint of the series together with the spec and options.
//! The cache is an ordinary value owned by the caller; share it across
//! threads behind an `Arc`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::core::{SeriesFingerprint, TimeSeries};
use crate::error::Result;
use crate::models::sarima::{FitOptions, FittedModel, ModelFitter, ModelSpec};

/// Identity of a fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FitKey {
    pub fingerprint: SeriesFingerprint,
    pub spec: ModelSpec,
    pub options: FitOptions,
}

impl FitKey {
    pub fn new(series: &TimeSeries, spec: &ModelSpec, options: &FitOptions) -> Self {
        Self {
            fingerprint: series.fingerprint(),
            spec: *spec,
            options: *options,
        }
    }
}

/// Hit and miss counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Thread-safe map from [`FitKey`] to shared fitted models.
#[derive(Debug, Default)]
pub struct FitCache {
    entries: RwLock<HashMap<FitKey, Arc<FittedModel>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl FitCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &FitKey) -> Option<Arc<FittedModel>> {
        let found = self.entries.read().get(key).cloned();
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Store a model, returning the shared handle. An existing entry for the
    /// same key wins, so concurrent inserts agree on one instance.
    pub fn insert(&self, key: FitKey, model: FittedModel) -> Arc<FittedModel> {
        let mut entries = self.entries.write();
        Arc::clone(entries.entry(key).or_insert_with(|| Arc::new(model)))
    }

    /// Return the cached fit for `(series, spec, fitter options)` or fit and
    /// store it. The fit runs without holding the lock.
    pub fn get_or_fit(
        &self,
        fitter: &ModelFitter,
        series: &TimeSeries,
        spec: &ModelSpec,
    ) -> Result<Arc<FittedModel>> {
        let key = FitKey::new(series, spec, fitter.options());
        if let Some(model) = self.get(&key) {
            debug!(fingerprint = %key.fingerprint, spec = %spec, "fit cache hit");
            return Ok(model);
        }
        debug!(fingerprint = %key.fingerprint, spec = %spec, "fit cache miss");

        let model = fitter.fit(series, spec)?;
        Ok(self.insert(key, model))
    }

    pub fn remove(&self, key: &FitKey) -> Option<Arc<FittedModel>> {
        self.entries.write().remove(key)
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
