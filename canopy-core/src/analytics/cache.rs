//! Memoization boundary for callers that re-derive the snapshot often.
//!
//! The engine itself is stateless. Dashboards that rebuild on every render
//! can hold a [`SnapshotCache`] and only pay for a rebuild when the content of
//! the plantation collection actually changes.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use super::snapshot::{build_analytics_snapshot, AnalyticsSnapshot};
use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::types::Plantation;

/// SHA-256 of the canonical JSON encoding of the collection, hex encoded.
pub fn content_hash(plantations: &[Plantation]) -> Result<String> {
    let bytes = serde_json::to_vec(plantations)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Single-entry snapshot cache keyed by content hash.
pub struct SnapshotCache {
    config: AnalyticsConfig,
    entry: Option<(String, Arc<AnalyticsSnapshot>)>,
    hits: u64,
    misses: u64,
}

impl SnapshotCache {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self {
            config,
            entry: None,
            hits: 0,
            misses: 0,
        }
    }

    /// Return the cached snapshot if `plantations` is unchanged, otherwise
    /// rebuild and cache it.
    pub fn get_or_build(&mut self, plantations: &[Plantation]) -> Result<Arc<AnalyticsSnapshot>> {
        let key = content_hash(plantations)?;

        if let Some((cached_key, snapshot)) = &self.entry {
            if *cached_key == key {
                self.hits += 1;
                tracing::debug!(key = %key, "Using cached analytics snapshot");
                return Ok(Arc::clone(snapshot));
            }
        }

        self.misses += 1;
        tracing::debug!(key = %key, "Plantation content changed, rebuilding snapshot");

        let snapshot = Arc::new(build_analytics_snapshot(plantations, &self.config));
        self.entry = Some((key, Arc::clone(&snapshot)));
        Ok(snapshot)
    }

    /// Drop the cached entry.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// (hits, misses) since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
