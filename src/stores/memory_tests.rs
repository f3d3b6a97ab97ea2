// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the in-memory stores.

#[cfg(test)]
mod tests {
    use crate::dns_errors::ValidationError;
    use crate::records::{AData, RecordData, RecordType, RecordValue, TxtData, TxtStrings};
    use crate::stores::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn domain(id: i64, subdomain: &str) -> Domain {
        Domain {
            id,
            subdomain: subdomain.to_string(),
            owner_id: 1,
            last_ipv4: None,
            last_ipv6: None,
        }
    }

    fn txt(text: &str) -> RecordValue {
        RecordValue::new(RecordData::TXT(TxtData {
            data: TxtStrings::One(text.to_string()),
        }))
    }

    #[tokio::test]
    async fn test_find_domain_is_case_insensitive() {
        let registry = MemoryDomainRegistry::new();
        registry.upsert(domain(1, "Alice")).unwrap();

        let found = registry.find_domain("ALICE").await.unwrap();
        assert_eq!(found.map(|d| d.id), Some(1));
        assert_eq!(registry.find_domain("bob").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_addresses_keeps_unreported_family() {
        let registry = MemoryDomainRegistry::new();
        registry.upsert(domain(1, "alice")).unwrap();

        let v4 = Ipv4Addr::new(203, 0, 113, 5);
        let v6: Ipv6Addr = "2001:db8::5".parse().unwrap();
        assert!(registry.update_addresses("alice", Some(v4), None).unwrap());
        assert!(registry.update_addresses("alice", None, Some(v6)).unwrap());
        assert!(!registry.update_addresses("carol", Some(v4), None).unwrap());

        let alice = registry.find_domain("alice").await.unwrap().unwrap();
        assert_eq!(alice.last_ipv4, Some(v4));
        assert_eq!(alice.last_ipv6, Some(v6));
    }

    #[tokio::test]
    async fn test_find_records_filters_by_domain_label_and_type() {
        let store = MemoryAdditionalRecordStore::new();
        store.insert(1, "foo", txt("one")).unwrap();
        store.insert(1, "foo", txt("two")).unwrap();
        store.insert(2, "foo", txt("other domain")).unwrap();
        store.insert(1, "bar", txt("other label")).unwrap();
        store
            .insert(
                1,
                "foo",
                RecordValue::new(RecordData::A(AData {
                    address: Ipv4Addr::new(192, 0, 2, 1),
                })),
            )
            .unwrap();

        let found = store.find_records(1, "FOO", RecordType::TXT).await.unwrap();
        assert_eq!(found, vec![txt("one"), txt("two")], "insertion order");
    }

    #[tokio::test]
    async fn test_insert_applies_placement_rules() {
        let store = MemoryAdditionalRecordStore::new();
        let a = RecordValue::new(RecordData::A(AData {
            address: Ipv4Addr::new(192, 0, 2, 1),
        }));

        assert_eq!(
            store.insert(1, "@", a),
            Err(ValidationError::ReservedApexType(RecordType::A))
        );
        assert!(store.find_records(1, "@", RecordType::A).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_record() {
        let store = MemoryAdditionalRecordStore::new();
        let id = store.insert(1, "@", txt("x")).unwrap();

        assert!(store.remove(id));
        assert!(!store.remove(id));
        assert!(store.find_records(1, "@", RecordType::TXT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_key_value_store() {
        let store = MemoryKeyValueStore::new();

        assert_eq!(store.get("dns_soa_serial").await.unwrap(), None);
        store.set("dns_soa_serial", "42").await.unwrap();
        assert_eq!(
            store.get("dns_soa_serial").await.unwrap(),
            Some("42".to_string())
        );
    }
}
