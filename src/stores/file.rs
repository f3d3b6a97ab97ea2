// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! JSON state file implementing [`KeyValueStore`].
//!
//! The file holds one flat JSON object of string values. Writes go to a
//! sibling temporary file that is then renamed over the original, so a crash
//! mid-write never leaves a truncated state file behind.

use super::{KeyValueStore, MemoryKeyValueStore};
use crate::dns_errors::StoreError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

const STORE_NAME: &str = "state file";

/// Key-value store persisted as a JSON object on disk.
#[derive(Debug)]
pub struct JsonFileKeyValueStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonFileKeyValueStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy the current contents into an in-memory store.
    ///
    /// Writes to the copy never reach the file.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the file cannot be read or is corrupt.
    pub async fn snapshot(&self) -> Result<MemoryKeyValueStore, StoreError> {
        Ok(self.load().await?.into_iter().collect())
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(unavailable(&self.path, e)),
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
            store: STORE_NAME.to_string(),
            reason: format!("{}: {e}", self.path.display()),
        })
    }
}

fn unavailable(path: &Path, err: impl std::fmt::Display) -> StoreError {
    StoreError::Unavailable {
        store: STORE_NAME.to_string(),
        reason: format!("{}: {err}", path.display()),
    }
}

#[async_trait]
impl KeyValueStore for JsonFileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut values = self.load().await?;
        values.insert(key.to_string(), value.to_string());
        let json = serde_json::to_string_pretty(&values).map_err(|e| unavailable(&self.path, e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| unavailable(parent, e))?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| unavailable(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| unavailable(&self.path, e))?;

        debug!("Persisted key {} to {}", key, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod file_tests;
