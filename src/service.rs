// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The assembled DNS core.
//!
//! [`DnsCore`] is built once at process start and owns the zone store, the
//! serial coordinator and the resolver. The transport and the dynamic-update
//! handler receive a reference (or a clone) of it instead of reaching for
//! process-wide state.

use crate::custom_records::{CustomRecordLoader, LoadSummary};
use crate::dns_errors::{CoreError, SerialError, StoreError};
use crate::notify::{SecondaryServer, ZoneNotifier};
use crate::resolver::{RecordResolver, Resolution};
use crate::serial::{SerialChange, SerialCoordinator};
use crate::stores::{AdditionalRecordStore, DomainRegistry, KeyValueStore};
use crate::zone::{ZoneConfig, ZoneStore};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// External collaborators the core reads from and notifies.
#[derive(Clone)]
pub struct Collaborators {
    pub domains: Arc<dyn DomainRegistry>,
    pub additional_records: Arc<dyn AdditionalRecordStore>,
    pub settings: Arc<dyn KeyValueStore>,
    pub notifier: Arc<dyn ZoneNotifier>,
}

/// The DNS core service object.
#[derive(Clone, Debug)]
pub struct DnsCore {
    zone: ZoneStore,
    coordinator: SerialCoordinator,
    resolver: RecordResolver,
    loaded: Option<LoadSummary>,
}

impl DnsCore {
    /// Build the zone, initialize the serial and merge the custom records.
    ///
    /// Restarting with the same configuration and custom records against the
    /// same key-value store keeps the persisted serial and sends no NOTIFY.
    ///
    /// # Errors
    ///
    /// Every error returned here is fatal: an invalid zone configuration, a
    /// serial that cannot be read or persisted, or a custom records file that
    /// fails to load.
    pub async fn bootstrap(
        config: &ZoneConfig,
        secondaries: Vec<SecondaryServer>,
        collaborators: Collaborators,
        custom_records: Option<&Path>,
    ) -> Result<Self, CoreError> {
        let zone = ZoneStore::from_config(config)?;
        let coordinator = SerialCoordinator::new(
            zone.clone(),
            collaborators.settings,
            collaborators.notifier,
            secondaries,
        );
        Self::assemble(
            zone,
            coordinator,
            collaborators.domains,
            collaborators.additional_records,
            custom_records,
        )
        .await
    }

    /// Same as [`DnsCore::bootstrap`] with a caller-built coordinator.
    ///
    /// # Errors
    ///
    /// See [`DnsCore::bootstrap`].
    pub async fn assemble(
        zone: ZoneStore,
        coordinator: SerialCoordinator,
        domains: Arc<dyn DomainRegistry>,
        additional_records: Arc<dyn AdditionalRecordStore>,
        custom_records: Option<&Path>,
    ) -> Result<Self, CoreError> {
        coordinator.init().await?;

        let loaded = match custom_records {
            Some(path) => Some(CustomRecordLoader::new(coordinator.clone()).load(path).await?),
            None => None,
        };

        let published = coordinator.publish().await?;
        debug!(
            "Startup zone for {} checked against the published contents (serial {} -> {})",
            zone.origin(),
            published.previous,
            published.current
        );

        let resolver = RecordResolver::new(zone.clone(), domains, additional_records);

        info!(
            "DNS core ready for {} (serial {}, {} secondaries)",
            zone.origin(),
            published.current,
            coordinator.secondaries().len()
        );

        Ok(Self {
            zone,
            coordinator,
            resolver,
            loaded,
        })
    }

    #[must_use]
    pub fn zone(&self) -> &ZoneStore {
        &self.zone
    }

    #[must_use]
    pub fn coordinator(&self) -> &SerialCoordinator {
        &self.coordinator
    }

    #[must_use]
    pub fn resolver(&self) -> &RecordResolver {
        &self.resolver
    }

    /// Summary of the custom records merged at startup, if a file was given.
    #[must_use]
    pub fn custom_records(&self) -> Option<&LoadSummary> {
        self.loaded.as_ref()
    }

    /// Answer one question from the transport.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when a backing store fails.
    pub async fn resolve(
        &self,
        name: &str,
        qtype: hickory_proto::rr::RecordType,
    ) -> Result<Resolution, StoreError> {
        self.resolver.resolve(name, qtype).await
    }

    /// Advance the serial after the dynamic-update handler changed a domain.
    ///
    /// # Errors
    ///
    /// Returns [`SerialError::WriteFailed`] if the serial could not be persisted.
    pub async fn domain_updated(&self) -> Result<SerialChange, SerialError> {
        self.coordinator.bump().await
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod service_tests;
