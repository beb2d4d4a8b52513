//! Deterministic SKU name matching and the resolution cache.

use std::collections::HashMap;
use std::sync::RwLock;

use dukaan_core::{SkuId, StoreId};

use crate::sku::Sku;

/// Match a free-text item name against one store's catalog.
///
/// Two passes over the same candidate sequence:
/// 1. case-insensitive exact match;
/// 2. case-insensitive containment either way round ("basmati" matches
///    "Basmati Rice", "2kg basmati rice" matches "Basmati Rice").
///
/// The first candidate wins within each pass, so callers must supply
/// candidates in a stable (insertion) order to keep resolution deterministic
/// for a given catalog snapshot.
pub fn best_match<'a>(name: &str, candidates: &'a [Sku]) -> Option<&'a Sku> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    if let Some(exact) = candidates.iter().find(|s| s.name.to_lowercase() == needle) {
        return Some(exact);
    }

    candidates.iter().find(|s| {
        let candidate = s.name.to_lowercase();
        candidate.contains(&needle) || needle.contains(&candidate)
    })
}

/// Process-lifetime cache of successful resolutions.
///
/// Keyed by `(store, lowercased name)`. Never invalidated: catalog names are
/// assumed near-static, and a stale hit still points at a real SKU. Racing
/// first writers both compute the same answer, so the last write is harmless.
///
/// Kept outside any transactional boundary: this is read-mostly in-process
/// state, not storage.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    inner: RwLock<HashMap<(StoreId, String), SkuId>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, store_id: StoreId, name: &str) -> Option<SkuId> {
        let map = self.inner.read().ok()?;
        map.get(&(store_id, name.trim().to_lowercase())).copied()
    }

    pub fn put(&self, store_id: StoreId, name: &str, sku_id: SkuId) {
        if let Ok(mut map) = self.inner.write() {
            map.insert((store_id, name.trim().to_lowercase()), sku_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use dukaan_core::{SkuId, StoreId};

    use super::*;

    fn sku(store_id: StoreId, name: &str) -> Sku {
        Sku {
            id: SkuId::new(),
            store_id,
            name: name.to_string(),
            category: "grocery".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn exact_match_beats_containment() {
        let store = StoreId::new();
        let catalog = vec![sku(store, "Milk Powder"), sku(store, "Milk")];

        let found = best_match("milk", &catalog).unwrap();
        assert_eq!(found.name, "Milk");
    }

    #[test]
    fn containment_matches_in_insertion_order() {
        let store = StoreId::new();
        let catalog = vec![sku(store, "Basmati Rice"), sku(store, "Rice Flour")];

        let found = best_match("rice", &catalog).unwrap();
        assert_eq!(found.name, "Basmati Rice");
    }

    #[test]
    fn longer_query_containing_sku_name_matches() {
        let store = StoreId::new();
        let catalog = vec![sku(store, "Basmati Rice")];

        let found = best_match("2kg Basmati Rice", &catalog).unwrap();
        assert_eq!(found.name, "Basmati Rice");
    }

    #[test]
    fn no_match_returns_none() {
        let store = StoreId::new();
        let catalog = vec![sku(store, "Sugar")];
        assert!(best_match("Shampoo", &catalog).is_none());
        assert!(best_match("   ", &catalog).is_none());
    }

    #[test]
    fn cache_is_keyed_by_store_and_lowercased_name() {
        let cache = ResolutionCache::new();
        let store_a = StoreId::new();
        let store_b = StoreId::new();
        let sku_id = SkuId::new();

        cache.put(store_a, "Milk", sku_id);

        assert_eq!(cache.get(store_a, "milk"), Some(sku_id));
        assert_eq!(cache.get(store_a, " MILK "), Some(sku_id));
        assert_eq!(cache.get(store_b, "milk"), None);
    }
}
