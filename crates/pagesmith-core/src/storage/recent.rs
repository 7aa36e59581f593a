//! Recently used component kinds.
//!
//! A small most-recent-first list shown in the component library. Storage
//! failures never reach the caller: they are logged and the list falls back
//! to empty (on load) or stays in memory only (on save).

use super::{KeyValueStore, StorageError, StorageResult};
use crate::components::ComponentKind;

/// Default number of remembered kinds.
pub const DEFAULT_RECENT_CAPACITY: usize = 6;

/// Storage key for the recent-components list.
pub const RECENT_COMPONENTS_KEY: &str = "recent-components";

/// Bounded, deduplicated, newest-first list of component kinds.
#[derive(Debug)]
pub struct RecentComponents<S: KeyValueStore> {
    store: S,
    key: String,
    capacity: usize,
    items: Vec<ComponentKind>,
}

impl<S: KeyValueStore> RecentComponents<S> {
    /// Load the list from `store` with default key and capacity.
    pub fn load(store: S) -> Self {
        Self::load_with(store, RECENT_COMPONENTS_KEY, DEFAULT_RECENT_CAPACITY)
    }

    /// Load the list from `store` under `key`, keeping at most `capacity` items.
    pub fn load_with(store: S, key: &str, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut items = match Self::read(&store, key) {
            Ok(items) => items,
            Err(e) => {
                log::warn!("Failed to load recent components: {}", e);
                Vec::new()
            }
        };
        items.truncate(capacity);
        Self {
            store,
            key: key.to_string(),
            capacity,
            items,
        }
    }

    fn read(store: &S, key: &str) -> StorageResult<Vec<ComponentKind>> {
        let Some(json) = store.get(key)? else {
            return Ok(Vec::new());
        };
        let raw: Vec<String> =
            serde_json::from_str(&json).map_err(|e| StorageError::Serialization(e.to_string()))?;

        let mut items = Vec::with_capacity(raw.len());
        for name in raw {
            match name.parse::<ComponentKind>() {
                Ok(kind) if !items.contains(&kind) => items.push(kind),
                Ok(_) => {}
                Err(e) => log::debug!("Skipping recent entry: {}", e),
            }
        }
        Ok(items)
    }

    fn save(&self) -> StorageResult<()> {
        let raw: Vec<&str> = self.items.iter().map(|k| k.as_str()).collect();
        let json =
            serde_json::to_string(&raw).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.set(&self.key, &json)
    }

    /// Move `kind` to the front, evicting the oldest entry past capacity.
    pub fn record(&mut self, kind: ComponentKind) {
        self.items.retain(|k| *k != kind);
        self.items.insert(0, kind);
        self.items.truncate(self.capacity);

        if let Err(e) = self.save() {
            log::warn!("Failed to save recent components: {}", e);
        }
    }

    /// Newest first.
    pub fn items(&self) -> &[ComponentKind] {
        &self.items
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::Io("unavailable".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Io("unavailable".to_string()))
        }

        fn remove(&self, _key: &str) -> StorageResult<()> {
            Err(StorageError::Io("unavailable".to_string()))
        }
    }

    #[test]
    fn test_record_newest_first_and_dedup() {
        let mut recent = RecentComponents::load(MemoryStore::new());
        recent.record(ComponentKind::Heading);
        recent.record(ComponentKind::Button);
        recent.record(ComponentKind::Heading);
        assert_eq!(recent.items(), &[ComponentKind::Heading, ComponentKind::Button]);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut recent = RecentComponents::load(MemoryStore::new());
        for kind in &ComponentKind::ALL[..7] {
            recent.record(*kind);
        }
        assert_eq!(recent.items().len(), DEFAULT_RECENT_CAPACITY);
        assert_eq!(recent.items()[0], ComponentKind::ALL[6]);
        assert!(!recent.items().contains(&ComponentKind::ALL[0]));
    }

    #[test]
    fn test_persists_across_loads() {
        let store = MemoryStore::new();
        let mut recent = RecentComponents::load(store);
        recent.record(ComponentKind::Image);
        recent.record(ComponentKind::Footer);

        let json = recent.store().get(RECENT_COMPONENTS_KEY).unwrap().unwrap();
        assert_eq!(json, r#"["footer","image"]"#);

        let store = MemoryStore::new();
        store.set(RECENT_COMPONENTS_KEY, &json).unwrap();
        let reloaded = RecentComponents::load(store);
        assert_eq!(reloaded.items(), &[ComponentKind::Footer, ComponentKind::Image]);
    }

    #[test]
    fn test_corrupt_json_falls_back_to_empty() {
        let store = MemoryStore::new();
        store.set(RECENT_COMPONENTS_KEY, "not json").unwrap();
        let recent = RecentComponents::load(store);
        assert!(recent.items().is_empty());
    }

    #[test]
    fn test_unknown_entries_skipped() {
        let store = MemoryStore::new();
        store
            .set(RECENT_COMPONENTS_KEY, r#"["button","carousel","button","spacer"]"#)
            .unwrap();
        let recent = RecentComponents::load(store);
        assert_eq!(recent.items(), &[ComponentKind::Button, ComponentKind::Spacer]);
    }

    #[test]
    fn test_broken_store_keeps_list_in_memory() {
        let mut recent = RecentComponents::load(BrokenStore);
        assert!(recent.items().is_empty());
        recent.record(ComponentKind::Video);
        assert_eq!(recent.items(), &[ComponentKind::Video]);
    }

    #[test]
    fn test_custom_key_and_capacity() {
        let mut recent = RecentComponents::load_with(MemoryStore::new(), "mine", 2);
        recent.record(ComponentKind::Section);
        recent.record(ComponentKind::Columns);
        recent.record(ComponentKind::Navbar);
        assert_eq!(recent.capacity(), 2);
        assert_eq!(recent.items(), &[ComponentKind::Navbar, ComponentKind::Columns]);
        assert!(recent.store().get("mine").unwrap().is_some());
    }
}
