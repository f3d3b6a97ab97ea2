// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for assembling the DNS core.

#[cfg(test)]
mod tests {
    use crate::constants::SERIAL_STORE_KEY;
    use crate::dns_errors::{CoreError, LoadError, NotifyError};
    use crate::notify::{HickoryNotifier, SecondaryServer, ZoneNotifier};
    use crate::serial::SerialCoordinator;
    use crate::service::*;
    use crate::stores::{
        Domain, KeyValueStore, MemoryAdditionalRecordStore, MemoryDomainRegistry,
        MemoryKeyValueStore,
    };
    use crate::zone::{ZoneConfig, ZoneStore};
    use async_trait::async_trait;
    use hickory_proto::rr::RecordType as WireType;
    use std::net::Ipv4Addr;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const NOW: u32 = 1_700_000_000;

    fn fixed_clock() -> u32 {
        NOW
    }

    fn config() -> ZoneConfig {
        ZoneConfig::new("example.test", "ns.example.test")
    }

    fn domains() -> Arc<MemoryDomainRegistry> {
        let domains = Arc::new(MemoryDomainRegistry::new());
        domains
            .upsert(Domain {
                id: 1,
                subdomain: "alice".to_string(),
                owner_id: 10,
                last_ipv4: Some(Ipv4Addr::new(203, 0, 113, 5)),
                last_ipv6: None,
            })
            .unwrap();
        domains
    }

    #[derive(Default)]
    struct CountingNotifier {
        sent: AtomicUsize,
    }

    #[async_trait]
    impl ZoneNotifier for CountingNotifier {
        async fn notify(&self, _zone: &str, _secondary: &SecondaryServer) -> Result<(), NotifyError> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Bootstrap with the real clock against a shared store and one secondary.
    async fn restart(
        settings: Arc<MemoryKeyValueStore>,
        notifier: Arc<CountingNotifier>,
        custom_records: &Path,
    ) -> DnsCore {
        let collaborators = Collaborators {
            domains: domains(),
            additional_records: Arc::new(MemoryAdditionalRecordStore::new()),
            settings,
            notifier,
        };
        DnsCore::bootstrap(
            &config(),
            vec![SecondaryServer::new("ns2.example.test", 53)],
            collaborators,
            Some(custom_records),
        )
        .await
        .unwrap()
    }

    async fn core(custom_records: Option<&Path>) -> Result<DnsCore, CoreError> {
        let zone = ZoneStore::from_config(&config()).unwrap();
        let coordinator = SerialCoordinator::new(
            zone.clone(),
            Arc::new(MemoryKeyValueStore::new()),
            Arc::new(HickoryNotifier::default()),
            Vec::new(),
        )
        .with_clock(fixed_clock);
        DnsCore::assemble(
            zone,
            coordinator,
            domains(),
            Arc::new(MemoryAdditionalRecordStore::new()),
            custom_records,
        )
        .await
    }

    #[tokio::test]
    async fn test_assemble_without_custom_records() {
        let core = core(None).await.unwrap();

        assert!(core.custom_records().is_none());
        assert_eq!(core.zone().serial().await, NOW);

        let a = core.resolve("alice.example.test", WireType::A).await.unwrap();
        assert_eq!(a.answers.len(), 1);
    }

    #[tokio::test]
    async fn test_assemble_merges_custom_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(&path, r#"{ "www": { "TXT": [{ "data": "hello" }] } }"#).unwrap();

        let core = core(Some(&path)).await.unwrap();

        let summary = core.custom_records().unwrap();
        assert_eq!(summary.records, 1);
        assert_eq!(summary.serial, NOW + 1);

        let txt = core.resolve("www.example.test", WireType::TXT).await.unwrap();
        assert_eq!(txt.answers.len(), 1);
    }

    #[tokio::test]
    async fn test_bad_custom_records_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(&path, r#"{ "@": { "A": [{ "address": "192.0.2.1" }] } }"#).unwrap();

        let err = core(Some(&path)).await.unwrap_err();

        assert!(matches!(err, CoreError::Load(LoadError::RejectedName { .. })));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_bootstrap_resumes_persisted_serial() {
        let settings = Arc::new(MemoryKeyValueStore::new());
        settings.set(SERIAL_STORE_KEY, "2024010101").await.unwrap();

        let core = DnsCore::bootstrap(
            &config(),
            Vec::new(),
            Collaborators {
                domains: domains(),
                additional_records: Arc::new(MemoryAdditionalRecordStore::new()),
                settings: settings.clone(),
                notifier: Arc::new(HickoryNotifier::default()),
            },
            None,
        )
        .await
        .unwrap();

        assert_eq!(core.coordinator().current().await, 2_024_010_101);
    }

    #[tokio::test]
    async fn test_bootstrap_rejects_invalid_zone() {
        let result = DnsCore::bootstrap(
            &ZoneConfig::new("not a domain", "ns.example.test"),
            Vec::new(),
            Collaborators {
                domains: domains(),
                additional_records: Arc::new(MemoryAdditionalRecordStore::new()),
                settings: Arc::new(MemoryKeyValueStore::new()),
                notifier: Arc::new(HickoryNotifier::default()),
            },
            None,
        )
        .await;

        assert!(matches!(result, Err(CoreError::Zone(_))));
    }

    #[tokio::test]
    async fn test_domain_updated_advances_serial() {
        let core = core(None).await.unwrap();

        let change = core.domain_updated().await.unwrap();

        assert_eq!(change.previous, NOW);
        assert_eq!(change.current, NOW + 1);
        assert_eq!(core.zone().serial().await, NOW + 1);
        assert!(change.notify.is_none());
    }

    #[tokio::test]
    async fn test_restart_with_same_inputs_keeps_serial_and_sends_no_notify() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(&path, r#"{ "@": { "TXT": [{ "data": "v=spf1 -all" }] } }"#).unwrap();
        let settings = Arc::new(MemoryKeyValueStore::new());
        let notifier = Arc::new(CountingNotifier::default());

        let first = restart(settings.clone(), notifier.clone(), &path).await;
        let serial = first.coordinator().current().await;
        // NOTIFY runs on a background task
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let sent = notifier.sent.load(Ordering::SeqCst);

        for _ in 0..2 {
            let again = restart(settings.clone(), notifier.clone(), &path).await;
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;

            assert!(!again.custom_records().unwrap().changed());
            assert_eq!(again.coordinator().current().await, serial);
            assert_eq!(
                again.resolve("example.test", WireType::TXT).await.unwrap().answers.len(),
                1
            );
        }

        assert_eq!(notifier.sent.load(Ordering::SeqCst), sent);
        assert_eq!(
            settings.get(SERIAL_STORE_KEY).await.unwrap(),
            Some(serial.to_string())
        );
    }

    #[tokio::test]
    async fn test_restart_with_changed_records_advances_serial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(&path, r#"{ "@": { "TXT": [{ "data": "v=spf1 -all" }] } }"#).unwrap();
        let settings = Arc::new(MemoryKeyValueStore::new());
        let notifier = Arc::new(CountingNotifier::default());

        let first = restart(settings.clone(), notifier.clone(), &path).await;
        let serial = first.coordinator().current().await;

        std::fs::write(&path, r#"{ "@": { "TXT": [{ "data": "v=spf1 mx -all" }] } }"#).unwrap();
        let second = restart(settings.clone(), notifier, &path).await;

        assert!(crate::serial::serial_gt(
            second.coordinator().current().await,
            serial
        ));
    }
}
