// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Persistence collaborators consumed by the DNS core.
//!
//! The core never owns these stores; it only reads from them at query time
//! (and writes one key, the zone serial). Each collaborator is a trait so the
//! hosting service can back it with its database of choice:
//!
//! - [`DomainRegistry`] - registered subdomains with their last dynamic-update addresses
//! - [`AdditionalRecordStore`] - user-managed records below a registered subdomain
//! - [`KeyValueStore`] - small system settings, used for the persisted serial
//!
//! Reference implementations live in [`memory`] (tests, development) and
//! [`file`] (a JSON state file for the operator tool).

pub mod file;
pub mod memory;

pub use file::JsonFileKeyValueStore;
pub use memory::{MemoryAdditionalRecordStore, MemoryDomainRegistry, MemoryKeyValueStore};

use crate::dns_errors::StoreError;
use crate::records::{RecordType, RecordValue};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, Ipv6Addr};

/// A registered subdomain of the service.
///
/// Created by the management API, updated by the dynamic-update handler.
/// `subdomain` is the single label under the zone origin (e.g. `alice`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub id: i64,
    pub subdomain: String,
    pub owner_id: i64,
    #[serde(default)]
    pub last_ipv4: Option<Ipv4Addr>,
    #[serde(default)]
    pub last_ipv6: Option<Ipv6Addr>,
}

/// A user-managed record below a registered subdomain.
///
/// `sub_label` is relative to the subdomain; `@` is the subdomain itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AdditionalRecord {
    pub id: i64,
    pub domain_id: i64,
    pub sub_label: String,
    pub value: RecordValue,
}

/// Lookup of registered subdomains.
#[async_trait]
pub trait DomainRegistry: Send + Sync {
    /// Find a domain by its unique subdomain label (normalized lowercase).
    ///
    /// A miss is `Ok(None)`; `Err` is reserved for backend failures.
    async fn find_domain(&self, subdomain: &str) -> Result<Option<Domain>, StoreError>;
}

/// Lookup of additional records.
#[async_trait]
pub trait AdditionalRecordStore: Send + Sync {
    /// All records of `rtype` at `sub_label` below the domain, in insertion order.
    async fn find_records(
        &self,
        domain_id: i64,
        sub_label: &str,
        rtype: RecordType,
    ) -> Result<Vec<RecordValue>, StoreError>;
}

/// String key-value settings storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
