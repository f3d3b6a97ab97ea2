// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The statically provisioned zone.
//!
//! [`ZoneData`] holds the apex SOA and NS records plus every operator-declared
//! record, indexed by (name, record type). [`ZoneStore`] is the shared handle
//! the rest of the core passes around: a fair reader-writer lock over one
//! `ZoneData`, so any number of queries read concurrently while mutations
//! (always routed through the serial coordinator) get exclusive access.
//!
//! The SOA is a dedicated field rather than an entry of the record map, which
//! makes "exactly one SOA per zone" hold by construction.
//!
//! # Example
//!
//! ```rust
//! use nowip_dns::records::RecordType;
//! use nowip_dns::zone::{ZoneConfig, ZoneData};
//!
//! let config = ZoneConfig::new("example.test", "ns.example.test");
//! let zone = ZoneData::new(&config).unwrap();
//!
//! assert_eq!(zone.get("example.test", RecordType::SOA).len(), 1);
//! assert_eq!(zone.get("example.test", RecordType::NS).len(), 1);
//! ```

use crate::constants::{
    DEFAULT_SOA_EXPIRE_SECS, DEFAULT_SOA_MINIMUM_SECS, DEFAULT_SOA_REFRESH_SECS,
    DEFAULT_SOA_RETRY_SECS, DEFAULT_ZONE_TTL_SECS, SOA_ADMIN_LABEL,
};
use crate::dns_errors::ZoneError;
use crate::names::{normalize_name, relative_to};
use crate::records::{
    AData, AaaaData, NsData, RecordData, RecordType, RecordValue, ResourceRecord, SoaData,
};
use crate::validation::validate_hostname;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Static parameters of the zone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZoneConfig {
    /// Root domain served by this instance (e.g. `example.test`)
    pub origin: String,
    /// Primary nameserver, used as SOA primary and first NS record
    pub primary_ns: String,
    /// Optional second NS record
    pub secondary_ns: Option<String>,
    /// Address published for the root and the primary nameserver
    pub public_ipv4: Option<Ipv4Addr>,
    /// IPv6 address published for the root and the primary nameserver
    pub public_ipv6: Option<Ipv6Addr>,
    /// SOA refresh interval in seconds
    pub refresh: u32,
    /// SOA retry interval in seconds
    pub retry: u32,
    /// SOA expire time in seconds
    pub expire: u32,
    /// SOA minimum (negative caching) TTL in seconds
    pub minimum: u32,
}

impl ZoneConfig {
    /// Zone configuration with default SOA timers and no optional records.
    #[must_use]
    pub fn new(origin: impl Into<String>, primary_ns: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            primary_ns: primary_ns.into(),
            secondary_ns: None,
            public_ipv4: None,
            public_ipv6: None,
            refresh: DEFAULT_SOA_REFRESH_SECS,
            retry: DEFAULT_SOA_RETRY_SECS,
            expire: DEFAULT_SOA_EXPIRE_SECS,
            minimum: DEFAULT_SOA_MINIMUM_SECS,
        }
    }
}

/// Zone contents: SOA, NS and operator records keyed by (name, type).
///
/// Names are stored normalized (lowercase, no trailing dot).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZoneData {
    origin: String,
    nameserver: String,
    soa: SoaData,
    records: BTreeMap<(String, RecordType), Vec<RecordValue>>,
}

impl ZoneData {
    /// Build the initial zone from its configuration.
    ///
    /// The zone starts with serial 0; the serial coordinator replaces it with
    /// the persisted serial during initialization.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::InvalidConfiguration`] if the origin or a
    /// nameserver is not a valid hostname.
    pub fn new(config: &ZoneConfig) -> Result<Self, ZoneError> {
        let origin = normalize_name(&config.origin);
        let invalid = |reason: String| ZoneError::InvalidConfiguration {
            zone: origin.clone(),
            reason,
        };

        validate_hostname(&origin).map_err(|e| invalid(e.to_string()))?;
        let primary = normalize_name(&config.primary_ns);
        validate_hostname(&primary).map_err(|e| invalid(e.to_string()))?;

        let soa = SoaData {
            primary: primary.clone(),
            admin: format!("{SOA_ADMIN_LABEL}.{primary}"),
            serial: 0,
            refresh: config.refresh,
            retry: config.retry,
            expiration: config.expire,
            minimum: config.minimum,
        };

        let mut zone = Self {
            origin: origin.clone(),
            nameserver: primary.clone(),
            soa,
            records: BTreeMap::new(),
        };

        let mut nameservers = vec![zone_managed(RecordData::NS(NsData {
            ns: primary.clone(),
        }))];
        if let Some(secondary) = &config.secondary_ns {
            let secondary = normalize_name(secondary);
            validate_hostname(&secondary).map_err(|e| invalid(e.to_string()))?;
            nameservers.push(zone_managed(RecordData::NS(NsData { ns: secondary })));
        }
        zone.records
            .insert((origin.clone(), RecordType::NS), nameservers);

        // Glue for the root and for an in-zone primary nameserver.
        let mut glue_owners = vec![origin.clone()];
        if primary != origin && relative_to(&primary, &origin).is_some() {
            glue_owners.push(primary);
        }
        for owner in glue_owners {
            if let Some(address) = config.public_ipv4 {
                zone.records.insert(
                    (owner.clone(), RecordType::A),
                    vec![RecordValue::new(RecordData::A(AData { address }))],
                );
            }
            if let Some(address) = config.public_ipv6 {
                zone.records.insert(
                    (owner, RecordType::AAAA),
                    vec![RecordValue::new(RecordData::AAAA(AaaaData { address }))],
                );
            }
        }

        Ok(zone)
    }

    /// The normalized zone origin.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The normalized primary nameserver name.
    #[must_use]
    pub fn nameserver(&self) -> &str {
        &self.nameserver
    }

    #[must_use]
    pub fn soa(&self) -> &SoaData {
        &self.soa
    }

    #[must_use]
    pub fn serial(&self) -> u32 {
        self.soa.serial
    }

    pub(crate) fn set_serial(&mut self, serial: u32) {
        self.soa.serial = serial;
    }

    /// Records stored for (name, type), in insertion order.
    ///
    /// The name is compared case-insensitively. The SOA is served from its
    /// dedicated field at the origin.
    #[must_use]
    pub fn get(&self, name: &str, rtype: RecordType) -> Vec<RecordValue> {
        let name = normalize_name(name);
        if rtype == RecordType::SOA {
            return if name == self.origin {
                vec![self.soa_value()]
            } else {
                Vec::new()
            };
        }
        self.records
            .get(&(name, rtype))
            .cloned()
            .unwrap_or_default()
    }

    /// Replace the records stored for (name, type).
    ///
    /// A repeated `set` for the same key overwrites rather than appends, so
    /// reloading the same data is idempotent. An empty `values` removes the
    /// entry.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::ReservedType`] for SOA, [`ZoneError::OutOfZone`]
    /// for names outside the origin and [`ZoneError::TypeMismatch`] when a
    /// value's type differs from `rtype`.
    pub fn set(
        &mut self,
        name: &str,
        rtype: RecordType,
        values: Vec<RecordValue>,
    ) -> Result<(), ZoneError> {
        if rtype == RecordType::SOA {
            return Err(ZoneError::ReservedType {
                zone: self.origin.clone(),
                rtype,
            });
        }

        let name = normalize_name(name);
        if relative_to(&name, &self.origin).is_none() {
            return Err(ZoneError::OutOfZone {
                name,
                zone: self.origin.clone(),
            });
        }

        if let Some(value) = values.iter().find(|v| v.record_type() != rtype) {
            return Err(ZoneError::TypeMismatch {
                name,
                expected: rtype,
                found: value.record_type(),
            });
        }

        if values.is_empty() {
            self.records.remove(&(name, rtype));
        } else {
            self.records.insert((name, rtype), values);
        }
        Ok(())
    }

    /// True when the zone holds any record at `name` (the origin always does).
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        let name = normalize_name(name);
        name == self.origin || self.records.keys().any(|(owner, _)| *owner == name)
    }

    /// Every stored (name, type, value) triple, SOA first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, RecordType, RecordValue)> + '_ {
        std::iter::once((self.origin.as_str(), RecordType::SOA, self.soa_value())).chain(
            self.records.iter().flat_map(|((name, rtype), values)| {
                values
                    .iter()
                    .map(move |value| (name.as_str(), *rtype, value.clone()))
            }),
        )
    }

    /// Number of stored record values, excluding the SOA.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    /// True when both zones hold the same records, ignoring the serial.
    #[must_use]
    pub fn same_records(&self, other: &Self) -> bool {
        self.records == other.records
    }

    /// SOA and NS records for the authority section.
    #[must_use]
    pub fn authority_records(&self) -> Vec<ResourceRecord> {
        let mut authorities = vec![ResourceRecord::from_value(
            &self.origin,
            &self.soa_value(),
        )];
        authorities.extend(
            self.get(&self.origin, RecordType::NS)
                .iter()
                .map(|ns| ResourceRecord::from_value(&self.origin, ns)),
        );
        authorities
    }

    /// SHA-256 over the record contents, ignoring the serial.
    ///
    /// Two zones with the same fingerprint serve the same answers.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let entries: Vec<(&String, &RecordType, &Vec<RecordValue>)> = self
            .records
            .iter()
            .map(|((name, rtype), values)| (name, rtype, values))
            .collect();
        calculate_content_hash(&entries)
    }

    /// A serializable copy of the whole zone for export and transfer.
    #[must_use]
    pub fn snapshot(&self) -> ZoneSnapshot {
        ZoneSnapshot {
            origin: self.origin.clone(),
            serial: self.soa.serial,
            fingerprint: self.fingerprint(),
            records: self
                .iter()
                .map(|(name, _, value)| ResourceRecord::from_value(name, &value))
                .collect(),
        }
    }

    fn soa_value(&self) -> RecordValue {
        zone_managed(RecordData::SOA(self.soa.clone()))
    }
}

/// Exported view of the zone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ZoneSnapshot {
    pub origin: String,
    pub serial: u32,
    pub fingerprint: String,
    pub records: Vec<ResourceRecord>,
}

/// Calculate the SHA-256 hash of serializable content, as lowercase hex.
#[must_use]
pub fn calculate_content_hash<T: Serialize>(data: &T) -> String {
    let json = serde_json::to_string(data).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn zone_managed(data: RecordData) -> RecordValue {
    RecordValue::with_ttl(data, DEFAULT_ZONE_TTL_SECS)
}

/// Shared, lock-protected handle to the zone.
///
/// Cloning the handle is cheap; all clones see the same zone. The lock is
/// tokio's fair reader-writer lock, so a waiting writer is not starved by a
/// steady stream of readers.
#[derive(Clone, Debug)]
pub struct ZoneStore {
    origin: Arc<str>,
    nameserver: Arc<str>,
    inner: Arc<RwLock<ZoneData>>,
}

impl ZoneStore {
    #[must_use]
    pub fn new(zone: ZoneData) -> Self {
        Self {
            origin: Arc::from(zone.origin()),
            nameserver: Arc::from(zone.nameserver()),
            inner: Arc::new(RwLock::new(zone)),
        }
    }

    /// Build the zone from configuration and wrap it in a store.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::InvalidConfiguration`] for unusable configuration.
    pub fn from_config(config: &ZoneConfig) -> Result<Self, ZoneError> {
        ZoneData::new(config).map(Self::new)
    }

    /// The normalized zone origin. Never changes, readable without locking.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The normalized primary nameserver name.
    #[must_use]
    pub fn nameserver(&self) -> &str {
        &self.nameserver
    }

    /// Take a consistent read view of the zone.
    ///
    /// Hold the guard only for in-memory lookups.
    pub async fn read(&self) -> RwLockReadGuard<'_, ZoneData> {
        self.inner.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, ZoneData> {
        self.inner.write().await
    }

    /// Records stored for (name, type).
    pub async fn get(&self, name: &str, rtype: RecordType) -> Vec<RecordValue> {
        self.inner.read().await.get(name, rtype)
    }

    /// SOA and NS records for the authority section.
    pub async fn authorities(&self) -> Vec<ResourceRecord> {
        self.inner.read().await.authority_records()
    }

    pub async fn serial(&self) -> u32 {
        self.inner.read().await.serial()
    }

    /// Export the current zone contents.
    pub async fn export(&self) -> ZoneSnapshot {
        self.inner.read().await.snapshot()
    }
}

#[cfg(test)]
#[path = "zone_tests.rs"]
mod zone_tests;
