// Copyright 2026 the Folio Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `localStorage` preference store.

use folio_core::FolioError;
use folio_core::store::PreferenceStore;

use crate::{host_error, js_detail};

/// [`PreferenceStore`] backed by the window's `localStorage`.
#[derive(Clone, Debug)]
pub struct LocalStore {
    storage: web_sys::Storage,
}

impl LocalStore {
    /// Opens the window's `localStorage`.
    ///
    /// Fails when there is no window or storage is disabled (some private
    /// browsing modes).
    pub fn new() -> Result<Self, FolioError> {
        let window = web_sys::window().ok_or_else(|| FolioError::Host("no window".into()))?;
        let storage = window
            .local_storage()
            .map_err(|e| host_error("localStorage", &e))?
            .ok_or_else(|| FolioError::Store("localStorage unavailable".into()))?;
        Ok(Self { storage })
    }
}

impl PreferenceStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, FolioError> {
        self.storage
            .get_item(key)
            .map_err(|e| FolioError::Store(format!("{key}: {}", js_detail(&e))))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), FolioError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| FolioError::Store(format!("{key}: {}", js_detail(&e))))
    }
}
