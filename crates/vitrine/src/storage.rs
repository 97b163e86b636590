//! Persistence of the visitor's cookie decision.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::SiteResult;

/// Key-value storage that survives page loads.
pub trait ConsentStore {
    /// Reads a value.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Storage`](crate::SiteError::Storage) if the
    /// backend is unavailable.
    fn get(&self, key: &str) -> SiteResult<Option<String>>;

    /// Writes a value.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Storage`](crate::SiteError::Storage) if the
    /// backend is unavailable.
    fn set(&mut self, key: &str, value: &str) -> SiteResult<()>;
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryConsentStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryConsentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding one value.
    #[must_use]
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.values.lock().insert(key.to_owned(), value.to_owned());
        store
    }

    /// Reads a value without going through the trait.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }
}

impl ConsentStore for MemoryConsentStore {
    fn get(&self, key: &str) -> SiteResult<Option<String>> {
        Ok(self.peek(key))
    }

    fn set(&mut self, key: &str, value: &str) -> SiteResult<()> {
        self.values.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
