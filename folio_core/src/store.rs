// Copyright 2026 the Folio Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Durable key-value preference storage.
//!
//! The page persists exactly one value (the theme), but the port is a plain
//! string map so the persistence rules (default when absent, last write
//! wins) can be tested without any document.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::{String, ToString as _};
use core::cell::RefCell;

use crate::error::FolioError;

/// A durable client-side key-value store.
pub trait PreferenceStore {
    /// Reads a value. `Ok(None)` means the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, FolioError>;

    /// Writes a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), FolioError>;
}

/// An in-memory [`PreferenceStore`].
///
/// Clones share the same map, the way every handle to `localStorage` sees the
/// same data.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one entry.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        store
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    /// Returns `true` if nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, FolioError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), FolioError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, FolioError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), FolioError> {
        (**self).set(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_key_reads_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("theme"), Ok(None));
        assert!(store.is_empty());
    }

    #[test]
    fn last_write_wins_across_clones() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("theme", "light").unwrap();
        other.set("theme", "dark").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(store.len(), 1);
    }
}
