// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory store implementations.
//!
//! Simple storage for testing and development. They also double as the write
//! side the management API and the dynamic-update handler would normally own.

use super::{AdditionalRecord, AdditionalRecordStore, Domain, DomainRegistry, KeyValueStore};
use crate::dns_errors::{StoreError, ValidationError};
use crate::records::{RecordType, RecordValue};
use crate::validation::validate_additional_record;
use async_trait::async_trait;
use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::RwLock;

fn poisoned(store: &str, err: impl std::fmt::Display) -> StoreError {
    StoreError::Unavailable {
        store: store.to_string(),
        reason: format!("lock poisoned: {err}"),
    }
}

const DOMAIN_REGISTRY: &str = "domain registry";
const ADDITIONAL_RECORDS: &str = "additional record store";
const KEY_VALUE: &str = "key-value store";

/// In-memory registry of subdomains, keyed by lowercase label.
#[derive(Debug, Default)]
pub struct MemoryDomainRegistry {
    domains: RwLock<HashMap<String, Domain>>,
}

impl MemoryDomainRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn upsert(&self, domain: Domain) -> Result<(), StoreError> {
        let mut guard = self
            .domains
            .write()
            .map_err(|e| poisoned(DOMAIN_REGISTRY, e))?;
        guard.insert(domain.subdomain.to_ascii_lowercase(), domain);
        Ok(())
    }

    /// Record the addresses reported by a dynamic update.
    ///
    /// Returns `false` when no domain with that label exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn update_addresses(
        &self,
        subdomain: &str,
        ipv4: Option<Ipv4Addr>,
        ipv6: Option<Ipv6Addr>,
    ) -> Result<bool, StoreError> {
        let mut guard = self
            .domains
            .write()
            .map_err(|e| poisoned(DOMAIN_REGISTRY, e))?;
        match guard.get_mut(&subdomain.to_ascii_lowercase()) {
            Some(domain) => {
                if ipv4.is_some() {
                    domain.last_ipv4 = ipv4;
                }
                if ipv6.is_some() {
                    domain.last_ipv6 = ipv6;
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl DomainRegistry for MemoryDomainRegistry {
    async fn find_domain(&self, subdomain: &str) -> Result<Option<Domain>, StoreError> {
        let guard = self
            .domains
            .read()
            .map_err(|e| poisoned(DOMAIN_REGISTRY, e))?;
        Ok(guard.get(&subdomain.to_ascii_lowercase()).cloned())
    }
}

/// In-memory additional records, kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryAdditionalRecordStore {
    records: RwLock<Vec<AdditionalRecord>>,
}

impl MemoryAdditionalRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record after applying the placement rules.
    ///
    /// Returns the id assigned to the record.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the label is invalid, the type is
    /// zone-managed, or the record is an A/AAAA/CNAME at `@`.
    pub fn insert(
        &self,
        domain_id: i64,
        sub_label: &str,
        value: RecordValue,
    ) -> Result<i64, ValidationError> {
        validate_additional_record(sub_label, &value)?;

        let mut guard = self
            .records
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let id = guard.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        guard.push(AdditionalRecord {
            id,
            domain_id,
            sub_label: sub_label.to_ascii_lowercase(),
            value,
        });
        Ok(id)
    }

    /// Remove a record by id. Returns `false` when it did not exist.
    pub fn remove(&self, id: i64) -> bool {
        let mut guard = self
            .records
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let before = guard.len();
        guard.retain(|r| r.id != id);
        guard.len() != before
    }
}

#[async_trait]
impl AdditionalRecordStore for MemoryAdditionalRecordStore {
    async fn find_records(
        &self,
        domain_id: i64,
        sub_label: &str,
        rtype: RecordType,
    ) -> Result<Vec<RecordValue>, StoreError> {
        let sub_label = sub_label.to_ascii_lowercase();
        let guard = self
            .records
            .read()
            .map_err(|e| poisoned(ADDITIONAL_RECORDS, e))?;
        Ok(guard
            .iter()
            .filter(|r| {
                r.domain_id == domain_id && r.sub_label == sub_label && r.value.record_type() == rtype
            })
            .map(|r| r.value.clone())
            .collect())
    }
}

/// In-memory key-value settings.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl FromIterator<(String, String)> for MemoryKeyValueStore {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: RwLock::new(iter.into_iter().collect()),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let guard = self.values.read().map_err(|e| poisoned(KEY_VALUE, e))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut guard = self.values.write().map_err(|e| poisoned(KEY_VALUE, e))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod memory_tests;
