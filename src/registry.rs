//! Virtual path to storage handle mapping.
//!
//! Seeded with the root handle when a grant resolves and grown by directory
//! enumeration. Entries are never removed; a later `register` for the same
//! path replaces the handle.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::types::{StorageHandle, VirtualPath};

#[derive(Debug, Default)]
pub struct HandleRegistry {
    entries: RwLock<HashMap<VirtualPath, StorageHandle>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the handle for `path`.
    pub fn register(&self, path: VirtualPath, handle: StorageHandle) {
        tracing::debug!("[Registry] {} -> {}", path, handle);
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(path, handle);
    }

    pub fn lookup(&self, path: &str) -> Option<StorageHandle> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(path)
            .cloned()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[test]
    fn test_lookup_unknown_path() {
        let registry = HandleRegistry::new();
        assert!(registry.lookup("tree://root").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_and_overwrite() {
        let registry = HandleRegistry::new();
        registry.register("tree://root".into(), StorageHandle::new("h1"));
        assert_eq!(registry.lookup("tree://root"), Some(StorageHandle::new("h1")));

        registry.register("tree://root".into(), StorageHandle::new("h2"));
        assert_eq!(registry.lookup("tree://root"), Some(StorageHandle::new("h2")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_paths_are_case_sensitive_tokens() {
        let registry = HandleRegistry::new();
        registry.register("tree://root/Roms".into(), StorageHandle::new("h1"));
        assert!(registry.contains("tree://root/Roms"));
        assert!(!registry.contains("tree://root/roms"));
        assert!(!registry.contains("tree://root/Roms/"));
        assert!(!registry.contains("tree://root/x/../Roms"));
    }

    #[test]
    fn test_concurrent_register_and_lookup() {
        let registry = Arc::new(HandleRegistry::new());
        let writers: Vec<_> = (0..4)
            .map(|t| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let path = format!("tree://root/{}-{}", t, i);
                        registry.register(path.clone().into(), StorageHandle::new(path.clone()));
                        assert_eq!(registry.lookup(&path), Some(StorageHandle::new(path)));
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }
        assert_eq!(registry.len(), 400);
    }

    proptest! {
        #[test]
        fn prop_lookup_returns_last_registered(
            ops in prop::collection::vec(("[a-c]{1,2}", "[0-9]{1,3}"), 0..40),
            queried in "[a-d]{1,2}",
        ) {
            let registry = HandleRegistry::new();
            let mut model: HashMap<String, String> = HashMap::new();
            for (path, handle) in &ops {
                registry.register(path.as_str().into(), StorageHandle::new(handle.clone()));
                model.insert(path.clone(), handle.clone());
            }
            for (path, handle) in &model {
                prop_assert_eq!(registry.lookup(path), Some(StorageHandle::new(handle.clone())));
            }
            prop_assert_eq!(registry.lookup(&queried).is_some(), model.contains_key(&queried));
            prop_assert_eq!(registry.len(), model.len());
        }
    }
}
