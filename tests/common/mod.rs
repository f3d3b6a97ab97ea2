// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use nowip_dns::dns_errors::NotifyError;
use nowip_dns::notify::{SecondaryServer, ZoneNotifier};
use nowip_dns::service::{Collaborators, DnsCore};
use nowip_dns::stores::{
    Domain, MemoryAdditionalRecordStore, MemoryDomainRegistry, MemoryKeyValueStore,
};
use nowip_dns::zone::ZoneConfig;
use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub const ZONE: &str = "example.test";
pub const ALICE_ID: i64 = 1;
pub const BOB_ID: i64 = 2;

/// Notifier that records every NOTIFY instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, SecondaryServer)>>,
}

impl RecordingNotifier {
    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl ZoneNotifier for RecordingNotifier {
    async fn notify(&self, zone: &str, secondary: &SecondaryServer) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((zone.to_string(), secondary.clone()));
        Ok(())
    }
}

/// A running core plus handles on its in-memory collaborators.
pub struct TestCore {
    pub core: DnsCore,
    pub domains: Arc<MemoryDomainRegistry>,
    pub additional: Arc<MemoryAdditionalRecordStore>,
    pub settings: Arc<MemoryKeyValueStore>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn zone_config() -> ZoneConfig {
    let mut config = ZoneConfig::new(ZONE, format!("ns.{ZONE}"));
    config.secondary_ns = Some(format!("ns2.{ZONE}"));
    config.public_ipv4 = Some(Ipv4Addr::new(198, 51, 100, 1));
    config
}

/// Registry with alice (IPv4 set) and bob (no address yet).
pub fn seeded_domains() -> Arc<MemoryDomainRegistry> {
    let domains = Arc::new(MemoryDomainRegistry::new());
    domains
        .upsert(Domain {
            id: ALICE_ID,
            subdomain: "alice".to_string(),
            owner_id: 100,
            last_ipv4: Some(Ipv4Addr::new(203, 0, 113, 5)),
            last_ipv6: None,
        })
        .unwrap();
    domains
        .upsert(Domain {
            id: BOB_ID,
            subdomain: "bob".to_string(),
            owner_id: 101,
            last_ipv4: None,
            last_ipv6: None,
        })
        .unwrap();
    domains
}

/// Bootstrap a core against fresh in-memory stores.
pub async fn start_core(
    secondaries: Vec<SecondaryServer>,
    custom_records: Option<&Path>,
) -> TestCore {
    let domains = seeded_domains();
    let additional = Arc::new(MemoryAdditionalRecordStore::new());
    let settings = Arc::new(MemoryKeyValueStore::new());
    let notifier = Arc::new(RecordingNotifier::default());

    let core = DnsCore::bootstrap(
        &zone_config(),
        secondaries,
        Collaborators {
            domains: domains.clone(),
            additional_records: additional.clone(),
            settings: settings.clone(),
            notifier: notifier.clone(),
        },
        custom_records,
    )
    .await
    .expect("core should bootstrap");

    TestCore {
        core,
        domains,
        additional,
        settings,
        notifier,
    }
}
