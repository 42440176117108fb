//! Key-value persistence seam.
//!
//! # Responsibility
//! - Define the string-keyed storage contract used by session and post
//!   repositories (browser local storage shape).
//! - Provide JSON read/write helpers on top of raw string values.
//!
//! # Invariants
//! - Values are whole JSON documents; there is no partial update.
//! - Implementations are synchronous and single-writer.

use crate::db::DbError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage read/write failure.
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    Db(DbError),
    Serialization(serde_json::Error),
    /// Stored document decoded but failed schema validation.
    InvalidData(String),
    /// Backing medium refused the operation (quota, closed handle, ...).
    Unavailable(String),
    /// Connection has not been migrated to the required schema.
    Uninitialized { expected: u32, actual: u32 },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "stored value is not valid json: {err}"),
            Self::InvalidData(message) => write!(f, "invalid stored data: {message}"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
            Self::Uninitialized { expected, actual } => write!(
                f,
                "storage schema version {actual} does not match required {expected}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// String-keyed storage medium.
pub trait KeyValueStore {
    /// Returns the raw value, or `None` when the key is absent.
    fn get_item(&self, key: &str) -> StoreResult<Option<String>>;
    /// Inserts or replaces the value under `key`.
    fn set_item(&self, key: &str, value: &str) -> StoreResult<()>;
    /// Removes `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> StoreResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> StoreResult<()> {
        (**self).remove_item(key)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Rc<T> {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> StoreResult<()> {
        (**self).remove_item(key)
    }
}

/// Reads and decodes the JSON document under `key`.
pub fn read_json<T: DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &str,
) -> StoreResult<Option<T>> {
    match store.get_item(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encodes `value` as JSON and writes it under `key`.
pub fn write_json<T: Serialize + ?Sized>(
    store: &impl KeyValueStore,
    key: &str,
    value: &T,
) -> StoreResult<()> {
    let raw = serde_json::to_string(value)?;
    store.set_item(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::{read_json, write_json, MemoryStore, StoreError};
    use std::rc::Rc;

    #[test]
    fn json_helpers_roundtrip_through_shared_handle() {
        let store = Rc::new(MemoryStore::new());
        let handle = Rc::clone(&store);
        write_json(&handle, "numbers", &vec![1, 2, 3]).unwrap();

        let loaded: Option<Vec<i32>> = read_json(&store, "numbers").unwrap();
        assert_eq!(loaded, Some(vec![1, 2, 3]));
    }

    #[test]
    fn read_json_reports_malformed_values() {
        let store = MemoryStore::new();
        store.insert_raw("broken", "{not json");
        let err = read_json::<Vec<i32>>(&store, "broken").unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
