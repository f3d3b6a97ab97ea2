// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Operator-declared records loaded at startup.
//!
//! The custom records file is a JSON object keyed by name (`@` for the zone
//! root, otherwise a relative label such as `www` or `_dmarc`). Each name maps
//! to an object keyed by uppercase record type, and each type maps to an array
//! of payloads:
//!
//! ```json
//! {
//!   "@":   { "TXT": [{ "data": "v=spf1 -all" }] },
//!   "www": { "CNAME": [{ "domain": "example.test", "ttl": 600 }] }
//! }
//! ```
//!
//! The whole file is validated before anything touches the zone, and the
//! merge runs as a single coordinator mutation: either every record lands and
//! the serial advances once, or nothing changes.

use crate::dns_errors::{CoreError, LoadError};
use crate::metrics::record_custom_records;
use crate::names::{absolute_name, normalize_name};
use crate::records::{RecordType, RecordValue};
use crate::serial::SerialCoordinator;
use crate::validation::{ensure_placement_allowed, ensure_user_suppliable, validate_relative_name};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Validated contents of a custom records file, keyed by (relative name, type).
///
/// Entries that normalize to the same key are concatenated in file order.
pub type CustomRecords = BTreeMap<(String, RecordType), Vec<RecordValue>>;

/// Result of a successful load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadSummary {
    /// Distinct names that received records
    pub names: usize,
    /// Total number of record values merged
    pub records: usize,
    /// Serial before the merge
    pub previous_serial: u32,
    /// Serial after the merge
    pub serial: u32,
}

impl LoadSummary {
    /// True when the merge changed the zone and advanced the serial.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.previous_serial != self.serial
    }
}

/// Parse and validate a custom records document without touching any zone.
///
/// # Errors
///
/// Returns a parse-class [`LoadError`] when the document does not have the
/// expected shape, and a rejection when a name, type or payload is invalid.
pub fn parse_custom_records(json: &str) -> Result<CustomRecords, LoadError> {
    let document: serde_json::Value =
        serde_json::from_str(json).map_err(|e| LoadError::MalformedJson {
            reason: e.to_string(),
        })?;
    let names = document.as_object().ok_or(LoadError::NotAnObject)?;

    let mut records = CustomRecords::new();
    for (name, types) in names {
        validate_relative_name(name).map_err(|source| LoadError::RejectedName {
            name: name.clone(),
            source,
        })?;
        let types = types.as_object().ok_or_else(|| LoadError::InvalidNameEntry {
            name: name.clone(),
        })?;
        let label = normalize_name(name);

        for (type_name, payloads) in types {
            let rtype = RecordType::from_str(type_name)
                .and_then(|rtype| {
                    ensure_user_suppliable(rtype)?;
                    ensure_placement_allowed(&label, rtype)?;
                    Ok(rtype)
                })
                .map_err(|source| LoadError::RejectedName {
                    name: name.clone(),
                    source,
                })?;

            let payloads = payloads
                .as_array()
                .ok_or_else(|| LoadError::InvalidTypeEntry {
                    name: name.clone(),
                    rtype: type_name.clone(),
                })?;

            let entry = records.entry((label.clone(), rtype)).or_default();
            for (index, payload) in payloads.iter().enumerate() {
                let value =
                    RecordValue::parse(rtype, payload).map_err(|source| LoadError::RejectedRecord {
                        name: name.clone(),
                        rtype,
                        index,
                        source,
                    })?;
                entry.push(value);
            }
        }
    }

    // A type key with an empty array declares nothing.
    records.retain(|_, values| !values.is_empty());
    Ok(records)
}

/// Loads the custom records file into the zone through the serial coordinator.
#[derive(Clone, Debug)]
pub struct CustomRecordLoader {
    coordinator: SerialCoordinator,
}

impl CustomRecordLoader {
    #[must_use]
    pub fn new(coordinator: SerialCoordinator) -> Self {
        Self { coordinator }
    }

    /// Read, validate and merge the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Load`] for unreadable or invalid files and
    /// [`CoreError::Serial`] when the new serial could not be persisted.
    /// Nothing is merged in either case.
    pub async fn load(&self, path: impl AsRef<Path>) -> Result<LoadSummary, CoreError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| LoadError::FileUnreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        debug!("Read custom records file {}", path.display());
        self.load_str(&json).await
    }

    /// Validate and merge a custom records document.
    ///
    /// Every (name, type) in the document replaces the zone's entry for that
    /// key, so loading the same document twice leaves the zone and the serial
    /// unchanged the second time.
    ///
    /// # Errors
    ///
    /// See [`CustomRecordLoader::load`].
    pub async fn load_str(&self, json: &str) -> Result<LoadSummary, CoreError> {
        let records = parse_custom_records(json)?;

        let names = records
            .keys()
            .map(|(name, _)| name.as_str())
            .collect::<BTreeSet<_>>()
            .len();
        let count = records.values().map(Vec::len).sum();

        let change = self
            .coordinator
            .apply(move |zone| {
                let origin = zone.origin().to_string();
                for ((name, rtype), values) in records {
                    zone.set(&absolute_name(&name, &origin), rtype, values)?;
                }
                Ok(())
            })
            .await?;

        let summary = LoadSummary {
            names,
            records: count,
            previous_serial: change.previous,
            serial: change.current,
        };

        record_custom_records(count);
        info!(
            "Loaded {} custom records for {} names into {} (serial {} -> {})",
            summary.records,
            summary.names,
            self.coordinator.zone().origin(),
            summary.previous_serial,
            summary.serial
        );
        Ok(summary)
    }
}

#[cfg(test)]
#[path = "custom_records_tests.rs"]
mod custom_records_tests;
