//! In-memory keyed scalar store backing container flags.
//!
//! [`MemoryStore`] implements every capability trait that
//! `flagline-core`'s store-backed flag values consume, so one shared
//! store can collect parsed flag values and hand them to command actions.
//! Snapshots round-trip through JSON via [`MemoryStore::export_json`] and
//! [`MemoryStore::import_json`].
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use flagline_core::{ErrorHandling, FlagSet, TextStore};
//! use flagline_store::MemoryStore;
//!
//! let store = Rc::new(MemoryStore::new());
//! let mut flags = FlagSet::new("demo", ErrorHandling::Continue);
//! flags.text_store(&store, "name", "demo.name", "world", "Who to greet.");
//!
//! let arguments: Vec<String> = ["-name", "crew"].iter().map(|s| s.to_string()).collect();
//! flags.parse(&arguments).unwrap();
//! assert_eq!(store.to_text("demo.name"), "crew");
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use flagline_core::{
    BoolStore, FloatStore, Int64Store, IntStore, TextStore, Uint64Store, UintStore,
};

/// Errors from snapshot import/export.
#[derive(Debug, Error)]
pub enum StoreError {
    /// JSON serialization or parsing failure.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// One stored scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Entry {
    Bool(bool),
    Int(isize),
    Int64(i64),
    Uint(usize),
    Uint64(u64),
    Float(f64),
    Text(String),
}

/// Interior-mutable keyed store.
///
/// Reads of a missing key, or of a key holding a different kind, yield
/// the type's zero value; flag defaults are seeded at registration, so a
/// well-formed setup never observes that fallback.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    /// A copy of the entry under `key`, if any.
    pub fn entry(&self, key: &str) -> Option<Entry> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn remove(&self, key: &str) -> Option<Entry> {
        self.entries.borrow_mut().remove(key)
    }

    /// Serializes the whole store as pretty-printed JSON.
    pub fn export_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&*self.entries.borrow())?)
    }

    /// Merges entries parsed from `text` into the store, overwriting
    /// existing keys.
    pub fn import_json(&self, text: &str) -> Result<(), StoreError> {
        let parsed: HashMap<String, Entry> = serde_json::from_str(text)?;
        self.entries.borrow_mut().extend(parsed);
        Ok(())
    }

    fn put(&self, key: &str, entry: Entry) {
        self.entries.borrow_mut().insert(key.to_string(), entry);
    }
}

impl BoolStore for MemoryStore {
    fn set_bool(&self, key: &str, value: bool) {
        self.put(key, Entry::Bool(value));
    }

    fn to_bool(&self, key: &str) -> bool {
        match self.entries.borrow().get(key) {
            Some(Entry::Bool(value)) => *value,
            _ => false,
        }
    }
}

impl IntStore for MemoryStore {
    fn set_int(&self, key: &str, value: isize) {
        self.put(key, Entry::Int(value));
    }

    fn to_int(&self, key: &str) -> isize {
        match self.entries.borrow().get(key) {
            Some(Entry::Int(value)) => *value,
            _ => 0,
        }
    }
}

impl Int64Store for MemoryStore {
    fn set_int64(&self, key: &str, value: i64) {
        self.put(key, Entry::Int64(value));
    }

    fn to_int64(&self, key: &str) -> i64 {
        match self.entries.borrow().get(key) {
            Some(Entry::Int64(value)) => *value,
            _ => 0,
        }
    }
}

impl UintStore for MemoryStore {
    fn set_uint(&self, key: &str, value: usize) {
        self.put(key, Entry::Uint(value));
    }

    fn to_uint(&self, key: &str) -> usize {
        match self.entries.borrow().get(key) {
            Some(Entry::Uint(value)) => *value,
            _ => 0,
        }
    }
}

impl Uint64Store for MemoryStore {
    fn set_uint64(&self, key: &str, value: u64) {
        self.put(key, Entry::Uint64(value));
    }

    fn to_uint64(&self, key: &str) -> u64 {
        match self.entries.borrow().get(key) {
            Some(Entry::Uint64(value)) => *value,
            _ => 0,
        }
    }
}

impl FloatStore for MemoryStore {
    fn set_float(&self, key: &str, value: f64) {
        self.put(key, Entry::Float(value));
    }

    fn to_float(&self, key: &str) -> f64 {
        match self.entries.borrow().get(key) {
            Some(Entry::Float(value)) => *value,
            _ => 0.0,
        }
    }
}

impl TextStore for MemoryStore {
    fn set_text(&self, key: &str, value: &str) {
        self.put(key, Entry::Text(value.to_string()));
    }

    fn to_text(&self, key: &str) -> String {
        match self.entries.borrow().get(key) {
            Some(Entry::Text(value)) => value.clone(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_round_trips() {
        let store = MemoryStore::new();
        store.set_bool("b", true);
        store.set_int("i", -5);
        store.set_int64("i64", -5_000_000_000);
        store.set_uint("u", 5);
        store.set_uint64("u64", 5_000_000_000);
        store.set_float("f", 2.5);
        store.set_text("s", "hello");

        assert!(store.to_bool("b"));
        assert_eq!(store.to_int("i"), -5);
        assert_eq!(store.to_int64("i64"), -5_000_000_000);
        assert_eq!(store.to_uint("u"), 5);
        assert_eq!(store.to_uint64("u64"), 5_000_000_000);
        assert_eq!(store.to_float("f"), 2.5);
        assert_eq!(store.to_text("s"), "hello");
        assert_eq!(store.len(), 7);
    }

    #[test]
    fn test_missing_or_mismatched_keys_read_zero() {
        let store = MemoryStore::new();
        assert!(!store.to_bool("missing"));
        assert_eq!(store.to_text("missing"), "");

        store.set_text("s", "hello");
        // reading "s" as a different kind yields that kind's zero value
        assert_eq!(store.to_int("s"), 0);
    }

    #[test]
    fn test_overwrite_and_remove() {
        let store = MemoryStore::new();
        store.set_int("n", 1);
        store.set_int("n", 2);
        assert_eq!(store.to_int("n"), 2);
        assert_eq!(store.remove("n"), Some(Entry::Int(2)));
        assert!(!store.contains("n"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_json_snapshot_round_trip() {
        let store = MemoryStore::new();
        store.set_bool("enabled", true);
        store.set_text("label", "alpha");
        store.set_float("ratio", 0.5);
        let snapshot = store.export_json().unwrap();

        let restored = MemoryStore::new();
        restored.import_json(&snapshot).unwrap();
        assert!(restored.to_bool("enabled"));
        assert_eq!(restored.to_text("label"), "alpha");
        assert_eq!(restored.to_float("ratio"), 0.5);
        assert_eq!(restored.len(), 3);
    }

    #[test]
    fn test_import_rejects_malformed_json() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.import_json("not json"),
            Err(StoreError::Snapshot(_))
        ));
    }

    #[test]
    fn test_import_overwrites_existing_keys() {
        let store = MemoryStore::new();
        store.set_text("label", "old");
        store
            .import_json(r#"{"label":{"kind":"text","value":"new"}}"#)
            .unwrap();
        assert_eq!(store.to_text("label"), "new");
    }
}
