// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the JSON state file store.

#[cfg(test)]
mod tests {
    use crate::dns_errors::StoreError;
    use crate::stores::{JsonFileKeyValueStore, KeyValueStore};

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileKeyValueStore::new(dir.path().join("state.json"));

        assert_eq!(store.get("dns_soa_serial").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_creates_parent_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("state.json");
        let store = JsonFileKeyValueStore::new(&path);

        store.set("dns_soa_serial", "2024010101").await.unwrap();
        store.set("other", "value").await.unwrap();

        let reopened = JsonFileKeyValueStore::new(&path);
        assert_eq!(
            reopened.get("dns_soa_serial").await.unwrap(),
            Some("2024010101".to_string())
        );
        assert_eq!(reopened.get("other").await.unwrap(), Some("value".to_string()));

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["dns_soa_serial"], "2024010101");
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();
        let store = JsonFileKeyValueStore::new(&path);

        assert!(matches!(
            store.get("dns_soa_serial").await,
            Err(StoreError::Corrupt { .. })
        ));
        assert!(store.set("dns_soa_serial", "1").await.is_err());
    }

    #[tokio::test]
    async fn test_snapshot_is_detached_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = JsonFileKeyValueStore::new(&path);
        store.set("dns_soa_serial", "100").await.unwrap();

        let copy = store.snapshot().await.unwrap();
        assert_eq!(copy.get("dns_soa_serial").await.unwrap(), Some("100".to_string()));

        copy.set("dns_soa_serial", "101").await.unwrap();
        assert_eq!(store.get("dns_soa_serial").await.unwrap(), Some("100".to_string()));
    }
}
