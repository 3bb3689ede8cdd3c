//! Memoised rule sets
//!
//! Mined rules are keyed by the dataset fingerprint, the transaction filter
//! and the mining thresholds. An entry is only reused while all three are
//! unchanged.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{
    config::MiningThresholds,
    rules::MinedRules,
    transactions::{Fingerprint, TransactionFilter},
};

/// Cache key for a mined rule set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    fingerprint: Fingerprint,
    filter: TransactionFilter,
    min_support_bits: u64,
    min_lift_bits: u64,
    max_len: Option<usize>,
}

impl CacheKey {
    /// Key for rules mined from the dataset with `fingerprint`, narrowed by
    /// `filter`, using `thresholds`.
    pub fn new(
        fingerprint: Fingerprint,
        filter: TransactionFilter,
        thresholds: &MiningThresholds,
    ) -> Self {
        Self {
            fingerprint,
            filter,
            min_support_bits: thresholds.min_support.to_bits(),
            min_lift_bits: thresholds.min_lift.to_bits(),
            max_len: thresholds.max_len,
        }
    }

    /// Dataset the entry was derived from.
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }
}

/// Memoisation layer for mined rules.
#[derive(Debug, Default)]
pub struct AnalysisCache {
    entries: FxHashMap<CacheKey, Arc<MinedRules>>,
    hits: usize,
    misses: usize,
}

impl AnalysisCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached entry for `key`, computing and storing it on a miss.
    ///
    /// # Errors
    ///
    /// Returns the error of `compute`; nothing is cached in that case.
    pub fn get_or_try_insert<E>(
        &mut self,
        key: CacheKey,
        compute: impl FnOnce() -> Result<MinedRules, E>,
    ) -> Result<Arc<MinedRules>, E> {
        if let Some(entry) = self.entries.get(&key) {
            self.hits += 1;
            debug!(fingerprint = %key.fingerprint, "rule cache hit");

            return Ok(Arc::clone(entry));
        }

        self.misses += 1;
        debug!(fingerprint = %key.fingerprint, "rule cache miss");

        let entry = Arc::new(compute()?);
        self.entries.insert(key, Arc::clone(&entry));

        Ok(entry)
    }

    /// Look up an entry without computing it.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<MinedRules>> {
        self.entries.get(key).cloned()
    }

    /// Drop every entry.
    pub fn invalidate(&mut self) {
        self.entries.clear();
    }

    /// Drop entries derived from any dataset other than `fingerprint`.
    pub fn retain_dataset(&mut self, fingerprint: Fingerprint) {
        self.entries.retain(|key, _| key.fingerprint == fingerprint);
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Lookups that had to compute.
    pub fn misses(&self) -> usize {
        self.misses
    }
}
