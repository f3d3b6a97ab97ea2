// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # NowIP DNS - authoritative resolution core for a dynamic DNS service
//!
//! This crate answers authoritative queries for one zone by combining three
//! sources of records:
//!
//! - the static zone: apex SOA and NS, glue, and operator-declared records
//!   loaded from a JSON file at startup
//! - the last addresses each registered subdomain reported through dynamic
//!   update
//! - additional records users manage below their subdomain
//!
//! It also owns the zone serial, persisting it and notifying secondary servers
//! whenever the zone changes.
//!
//! ## Modules
//!
//! - [`zone`] - The static zone and its shared, lock-protected store
//! - [`custom_records`] - Loader for the operator records file
//! - [`serial`] - Serial persistence, RFC 1982 arithmetic, mutation coordination
//! - [`notify`] - DNS NOTIFY toward secondaries
//! - [`resolver`] - The query entry point
//! - [`stores`] - Persistence collaborator traits and reference implementations
//! - [`service`] - The assembled core
//! - [`config`] - Settings from flags and environment variables
//! - [`metrics`] - Prometheus metrics
//!
//! ## Example
//!
//! ```rust,no_run
//! use nowip_dns::notify::HickoryNotifier;
//! use nowip_dns::service::{Collaborators, DnsCore};
//! use nowip_dns::stores::{MemoryAdditionalRecordStore, MemoryDomainRegistry, MemoryKeyValueStore};
//! use nowip_dns::zone::ZoneConfig;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), nowip_dns::dns_errors::CoreError> {
//! let collaborators = Collaborators {
//!     domains: Arc::new(MemoryDomainRegistry::new()),
//!     additional_records: Arc::new(MemoryAdditionalRecordStore::new()),
//!     settings: Arc::new(MemoryKeyValueStore::new()),
//!     notifier: Arc::new(HickoryNotifier::default()),
//! };
//! let config = ZoneConfig::new("example.test", "ns.example.test");
//! let core = DnsCore::bootstrap(&config, Vec::new(), collaborators, None).await?;
//!
//! let resolution = core
//!     .resolve("example.test", hickory_proto::rr::RecordType::SOA)
//!     .await?;
//! assert_eq!(resolution.answers.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod custom_records;
pub mod dns_errors;
pub mod metrics;
pub mod names;
pub mod notify;
pub mod records;
pub mod resolver;
pub mod serial;
pub mod service;
pub mod stores;
pub mod validation;
pub mod zone;

#[cfg(test)]
mod dns_errors_tests;
