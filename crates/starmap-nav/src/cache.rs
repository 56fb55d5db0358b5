use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{LocationId, PathResult};

/// Cache key for a directed `(origin, destination)` query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathKey {
    pub origin: LocationId,
    pub destination: LocationId,
}

impl PathKey {
    pub fn new(origin: LocationId, destination: LocationId) -> Self {
        Self {
            origin,
            destination,
        }
    }

    /// Collision-free 64-bit packing for consumers that need a scalar handle.
    pub fn packed(self) -> u64 {
        (u64::from(self.origin.0) << 32) | u64::from(self.destination.0)
    }
}

/// Write-once memo of path results.
///
/// Entries are never evicted or invalidated; the cache lives exactly as long as the
/// graph it was computed against.
#[derive(Debug, Default)]
pub struct PathCache {
    entries: HashMap<PathKey, PathResult>,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &PathKey) -> Option<&PathResult> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &PathKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Store `result` unless `key` is already cached. Returns whether it was stored.
    pub fn put(&mut self, key: PathKey, result: PathResult) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, result);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
