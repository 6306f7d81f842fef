//! Whole-collection repository over a key-value store
//!
//! The full record list lives under one key as a JSON array. It is read once
//! on open and rewritten on every change. Data that is not a JSON array is
//! discarded and the collection starts empty; inside a valid array only the
//! elements that are not objects are skipped.

use std::io;

use serde_json::Value;

use super::kv::KeyValueStore;
use super::record::{normalize_collection, stored_collection, PromptRecord};
use super::PromptRepository;
use crate::errors::{PadError, Result};

pub struct CollectionRepository<S: KeyValueStore> {
    store:   S,
    key:     String,
    records: Vec<PromptRecord>,
}

impl<S: KeyValueStore> CollectionRepository<S> {
    /// Load the collection stored under `key`
    pub fn open(mut store: S, key: &str, history_limit: usize) -> Result<Self> {
        let raw = match store.get_item(key) {
            Ok(raw) => raw,
            Err(PadError::IoError(err)) if err.kind() == io::ErrorKind::InvalidData => {
                tracing::warn!(key, error = %err, "discarding undecodable prompt collection");
                store.remove_item(key)?;
                None
            },
            Err(err) => return Err(err),
        };

        let records = match raw {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<Value>>(&raw) {
                Ok(items) => normalize_collection(stored_collection(&items), history_limit),
                Err(err) => {
                    tracing::warn!(key, error = %err, "discarding unparseable prompt collection");
                    store.remove_item(key)?;
                    Vec::new()
                },
            },
        };

        tracing::debug!(key, count = records.len(), "prompt collection loaded");

        Ok(Self {
            store,
            key: key.to_string(),
            records,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist `next` and adopt it only if the write succeeded
    fn commit(&mut self, next: Vec<PromptRecord>) -> Result<()> {
        let json = serde_json::to_string(&next)?;
        self.store.set_item(&self.key, &json)?;
        self.records = next;
        Ok(())
    }
}

impl<S: KeyValueStore> PromptRepository for CollectionRepository<S> {
    fn list(&self) -> Result<Vec<PromptRecord>> {
        Ok(self.records.clone())
    }

    fn get(&self, id: &str) -> Result<Option<PromptRecord>> {
        Ok(self.records.iter().find(|r| r.id == id).cloned())
    }

    fn upsert(&mut self, record: PromptRecord) -> Result<()> {
        let mut next = self.records.clone();
        match next.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            // Newest first, matching the display default
            None => next.insert(0, record),
        }
        self.commit(next)
    }

    fn remove(&mut self, id: &str) -> Result<bool> {
        if !self.records.iter().any(|r| r.id == id) {
            return Ok(false);
        }
        let next = self.records.iter().filter(|r| r.id != id).cloned().collect();
        self.commit(next)?;
        Ok(true)
    }

    fn count(&self) -> Result<usize> {
        Ok(self.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::kv::MemoryStore;
    use crate::db::record::DEFAULT_HISTORY_LIMIT;
    use crate::db::PROMPTS_STORAGE_KEY;

    fn store_with(raw: &str) -> MemoryStore {
        let mut store = MemoryStore::new();
        store.set_item(PROMPTS_STORAGE_KEY, raw).unwrap();
        store
    }

    #[test]
    fn test_open_empty_store() {
        let repo =
            CollectionRepository::open(MemoryStore::new(), PROMPTS_STORAGE_KEY, DEFAULT_HISTORY_LIMIT)
                .unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_corrupt_data_resets_and_removes_key() {
        let repo = CollectionRepository::open(
            store_with("{not json"),
            PROMPTS_STORAGE_KEY,
            DEFAULT_HISTORY_LIMIT,
        )
        .unwrap();

        assert!(repo.list().unwrap().is_empty());
        assert_eq!(repo.store().get_item(PROMPTS_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_non_array_json_resets() {
        let repo = CollectionRepository::open(
            store_with(r#"{"id": "a"}"#),
            PROMPTS_STORAGE_KEY,
            DEFAULT_HISTORY_LIMIT,
        )
        .unwrap();
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn test_loads_legacy_records() {
        let repo = CollectionRepository::open(
            store_with(r#"[{"id": "p1", "title": "Old", "text": "t", "createdAt": 5}]"#),
            PROMPTS_STORAGE_KEY,
            DEFAULT_HISTORY_LIMIT,
        )
        .unwrap();

        let record = repo.get("p1").unwrap().unwrap();
        assert_eq!(record.title, "Old");
        assert!(record.tags.is_empty());
        assert_eq!(record.use_count, 0);
    }

    #[test]
    fn test_badly_typed_record_keeps_the_others() {
        let repo = CollectionRepository::open(
            store_with(
                r#"[
                    {"id": "a", "title": "Kept", "text": "t", "createdAt": 1},
                    {"id": "b", "title": "Float", "text": "t", "createdAt": 1.7e12},
                    {"id": 42, "title": "Numeric id", "isFavorite": "true", "useCount": "3"},
                    "not a record",
                    {"id": "c", "title": ["wrong"], "history": [{"text": 5}, "x"]}
                ]"#,
            ),
            PROMPTS_STORAGE_KEY,
            DEFAULT_HISTORY_LIMIT,
        )
        .unwrap();

        assert_eq!(repo.count().unwrap(), 4);
        assert_eq!(repo.get("a").unwrap().unwrap().title, "Kept");
        assert_eq!(repo.get("b").unwrap().unwrap().created_at, 1_700_000_000_000);

        let numeric = repo.get("42").unwrap().unwrap();
        assert!(numeric.is_favorite);
        assert_eq!(numeric.use_count, 3);

        let wrong_title = repo.get("c").unwrap().unwrap();
        assert_eq!(wrong_title.title, "");
        assert_eq!(wrong_title.history.len(), 1);
        assert_eq!(wrong_title.history[0].text, "5");

        assert!(repo.store().get_item(PROMPTS_STORAGE_KEY).unwrap().is_some());
    }

    struct UndecodableStore {
        removed: bool,
    }

    impl KeyValueStore for UndecodableStore {
        fn get_item(&self, _key: &str) -> Result<Option<String>> {
            Err(PadError::IoError(io::Error::new(
                io::ErrorKind::InvalidData,
                "stream did not contain valid UTF-8",
            )))
        }

        fn set_item(&mut self, _key: &str, _value: &str) -> Result<()> {
            Ok(())
        }

        fn remove_item(&mut self, _key: &str) -> Result<()> {
            self.removed = true;
            Ok(())
        }
    }

    #[test]
    fn test_undecodable_data_resets_and_removes_key() {
        let repo = CollectionRepository::open(
            UndecodableStore { removed: false },
            PROMPTS_STORAGE_KEY,
            DEFAULT_HISTORY_LIMIT,
        )
        .unwrap();

        assert_eq!(repo.count().unwrap(), 0);
        assert!(repo.store().removed);
    }

    #[test]
    fn test_upsert_inserts_newest_first_and_persists() {
        let mut repo =
            CollectionRepository::open(MemoryStore::new(), PROMPTS_STORAGE_KEY, DEFAULT_HISTORY_LIMIT)
                .unwrap();

        let first = PromptRecord::new("one", "One", 1);
        let second = PromptRecord::new("two", "Two", 2);
        repo.upsert(first.clone()).unwrap();
        repo.upsert(second.clone()).unwrap();

        let ids: Vec<String> = repo.list().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second.id.clone(), first.id.clone()]);

        let raw = repo.store().get_item(PROMPTS_STORAGE_KEY).unwrap().unwrap();
        let reopened = CollectionRepository::open(
            store_with(&raw),
            PROMPTS_STORAGE_KEY,
            DEFAULT_HISTORY_LIMIT,
        )
        .unwrap();
        assert_eq!(reopened.list().unwrap(), repo.list().unwrap());
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut repo =
            CollectionRepository::open(MemoryStore::new(), PROMPTS_STORAGE_KEY, DEFAULT_HISTORY_LIMIT)
                .unwrap();
        let a = PromptRecord::new("a", "A", 1);
        let b = PromptRecord::new("b", "B", 2);
        repo.upsert(a.clone()).unwrap();
        repo.upsert(b.clone()).unwrap();

        let mut edited = a.clone();
        edited.title = "A2".to_string();
        repo.upsert(edited).unwrap();

        let list = repo.list().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].id, a.id);
        assert_eq!(list[1].title, "A2");
    }

    #[test]
    fn test_remove() {
        let mut repo =
            CollectionRepository::open(MemoryStore::new(), PROMPTS_STORAGE_KEY, DEFAULT_HISTORY_LIMIT)
                .unwrap();
        let a = PromptRecord::new("a", "A", 1);
        repo.upsert(a.clone()).unwrap();

        assert!(repo.remove(&a.id).unwrap());
        assert!(!repo.remove(&a.id).unwrap());
        assert_eq!(repo.count().unwrap(), 0);
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get_item(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set_item(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(PadError::Other("quota exceeded".into()))
        }

        fn remove_item(&mut self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_write_keeps_previous_state() {
        let mut repo =
            CollectionRepository::open(FailingStore, PROMPTS_STORAGE_KEY, DEFAULT_HISTORY_LIMIT)
                .unwrap();

        assert!(repo.upsert(PromptRecord::new("a", "A", 1)).is_err());
        assert_eq!(repo.count().unwrap(), 0);
    }
}
