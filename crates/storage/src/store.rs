use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Contract for the string-keyed session state store.
///
/// Values are opaque to the store: callers decide what goes into each slot
/// (the quiz engine keeps a JSON snapshot in one and a raw username in
/// another). Backends must treat `set_many` as all-or-nothing so a snapshot
/// and its companion slots never tear.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if the slot was never
    /// written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached or the value
    /// cannot be decoded.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Write every entry, atomically: either all slots land or none do.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails; on failure no entry has
    /// been applied.
    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError>;
}

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl StateStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .slots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .slots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        // One lock acquisition covers the whole batch.
        let mut guard = self
            .slots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        for &(key, value) in entries {
            guard.insert(key.to_owned(), value.to_owned());
        }
        Ok(())
    }
}
