use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use tracing::info;

use crate::record::Record;

/// Logical name of a cached result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    CategoryIds,
    Cards,
    Card(i64),
}

impl CacheKey {
    /// List-level slots, reset by [`QueryCache::clear`].
    pub const LISTS: [CacheKey; 2] = [CacheKey::CategoryIds, CacheKey::Cards];

    pub fn is_list(&self) -> bool {
        matches!(self, CacheKey::CategoryIds | CacheKey::Cards)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::CategoryIds => f.write_str("categoryIds"),
            CacheKey::Cards => f.write_str("cards"),
            CacheKey::Card(id) => write!(f, "card_{id}"),
        }
    }
}

/// In-process cache of raw query records, keyed by [`CacheKey`].
///
/// No TTL, no size bound, no eviction. Entries live until they are
/// invalidated or cleared. Reads hand out copies so callers can never mutate
/// a cached result set.
#[derive(Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<CacheKey, Vec<Record>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<Vec<Record>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn insert(&self, key: CacheKey, records: Vec<Record>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, records);
    }

    /// Drop one entry. Returns whether it was present.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some()
    }

    /// Reset the `categoryIds` and `cards` slots only.
    ///
    /// Individual `card_<id>` entries survive and stay stale until their card
    /// is updated or [`QueryCache::clear_all`] runs.
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for key in CacheKey::LISTS {
            entries.remove(&key);
        }
        info!(remaining = entries.len(), "Cleared list caches (categoryIds, cards)");
    }

    /// Drop every entry, including individual cards.
    pub fn clear_all(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let dropped = entries.len();
        entries.clear();
        info!(dropped, "Cleared all caches");
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
