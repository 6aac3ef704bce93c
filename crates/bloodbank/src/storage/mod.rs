//! Storage layer for bloodbank.
//!
//! This module persists the donor and message collections, each as one JSON
//! array under a fixed key of a [`Backend`]. Reads fail open: a missing,
//! empty or malformed value loads as an empty collection.

pub mod backend;
pub mod migrations;
pub mod schema;

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::model::{Donor, Message};

pub use backend::{Backend, MemoryBackend, SqliteBackend};

/// Key holding the donor collection.
pub const DONORS_KEY: &str = "bb_donors_v1";

/// Key holding the message collection.
pub const MESSAGES_KEY: &str = "bb_messages_v1";

/// Collection store on top of a key-value backend.
#[derive(Debug)]
pub struct Storage<B> {
    backend: B,
}

impl Storage<SqliteBackend> {
    /// Open or create a `SQLite` store at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(SqliteBackend::open(path)?))
    }

    /// Create an in-memory `SQLite` store.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(SqliteBackend::open_in_memory()?))
    }
}

impl<B: Backend> Storage<B> {
    /// Wrap a backend.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Borrow the underlying backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Load every stored donor, or an empty list if nothing usable is stored.
    #[must_use]
    pub fn load_donors(&self) -> Vec<Donor> {
        self.load(DONORS_KEY)
    }

    /// Replace the stored donor collection.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the backend write fails.
    pub fn save_donors(&self, donors: &[Donor]) -> Result<()> {
        self.save(DONORS_KEY, donors)
    }

    /// Load every stored message, or an empty list if nothing usable is stored.
    #[must_use]
    pub fn load_messages(&self) -> Vec<Message> {
        self.load(MESSAGES_KEY)
    }

    /// Replace the stored message collection.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the backend write fails.
    pub fn save_messages(&self, messages: &[Message]) -> Result<()> {
        self.save(MESSAGES_KEY, messages)
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.backend.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key, error = %e, "Failed to read collection, treating as empty");
                return Vec::new();
            }
        };

        if raw.trim().is_empty() {
            return Vec::new();
        }

        match serde_json::from_str::<Option<Vec<T>>>(&raw) {
            Ok(items) => {
                let items = items.unwrap_or_default();
                debug!(key, count = items.len(), "Loaded collection");
                items
            }
            Err(e) => {
                warn!(key, error = %e, "Stored collection is malformed, treating as empty");
                Vec::new()
            }
        }
    }

    fn save<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let raw = serde_json::to_string(items)?;
        self.backend.set_item(key, &raw)?;
        debug!(key, count = items.len(), "Saved collection");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::model::{BloodGroup, Gender};

    fn donor(id: &str, blood_group: BloodGroup, available: bool) -> Donor {
        Donor {
            id: id.to_string(),
            name: format!("Donor {id}"),
            age: 28,
            gender: Gender::Other,
            blood_group,
            phone: "9000000000".to_string(),
            email: format!("{id}@example.com"),
            city: "Chennai".to_string(),
            last_donation_date: None,
            available,
            notes: None,
        }
    }

    fn message(id: &str) -> Message {
        Message {
            id: id.to_string(),
            at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            name: "Meera".to_string(),
            email: "meera@example.com".to_string(),
            message: "Is there a camp this weekend?".to_string(),
        }
    }

    #[test]
    fn test_load_missing_keys_is_empty() {
        let storage = Storage::new(MemoryBackend::new());
        assert!(storage.load_donors().is_empty());
        assert!(storage.load_messages().is_empty());
    }

    #[test]
    fn test_donor_round_trip_preserves_order() {
        let storage = Storage::open_in_memory().unwrap();
        let donors = vec![
            donor("b", BloodGroup::ONegative, false),
            donor("a", BloodGroup::AbPositive, true),
            donor("c", BloodGroup::BPositive, true),
        ];
        storage.save_donors(&donors).unwrap();
        assert_eq!(storage.load_donors(), donors);
    }

    #[test]
    fn test_message_round_trip() {
        let storage = Storage::open_in_memory().unwrap();
        let messages = vec![message("m2"), message("m1")];
        storage.save_messages(&messages).unwrap();
        assert_eq!(storage.load_messages(), messages);
    }

    #[test]
    fn test_save_replaces_whole_collection() {
        let storage = Storage::new(MemoryBackend::new());
        storage
            .save_donors(&[donor("a", BloodGroup::OPositive, true)])
            .unwrap();
        storage.save_donors(&[]).unwrap();
        assert!(storage.load_donors().is_empty());
    }

    #[test]
    fn test_collections_are_independent() {
        let storage = Storage::new(MemoryBackend::new());
        storage
            .save_donors(&[donor("a", BloodGroup::OPositive, true)])
            .unwrap();
        assert!(storage.load_messages().is_empty());
        storage.save_messages(&[message("m")]).unwrap();
        assert_eq!(storage.load_donors().len(), 1);
    }

    #[test]
    fn test_malformed_json_fails_open() {
        crate::logging::init_test_logging();
        let backend = MemoryBackend::new()
            .with_item(DONORS_KEY, "{not json")
            .with_item(MESSAGES_KEY, r#"[{"id": 1}]"#);
        let storage = Storage::new(backend);
        assert!(storage.load_donors().is_empty());
        assert!(storage.load_messages().is_empty());
    }

    #[test]
    fn test_empty_and_null_values_fail_open() {
        let backend = MemoryBackend::new()
            .with_item(DONORS_KEY, "")
            .with_item(MESSAGES_KEY, "null");
        let storage = Storage::new(backend);
        assert!(storage.load_donors().is_empty());
        assert!(storage.load_messages().is_empty());
    }

    #[test]
    fn test_persisted_layout_is_json_array() {
        let storage = Storage::new(MemoryBackend::new());
        storage
            .save_donors(&[donor("a", BloodGroup::APositive, true)])
            .unwrap();
        let raw = storage.backend().get_item(DONORS_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["id"], "a");
        assert_eq!(value[0]["bloodGroup"], "A+");
    }
}
