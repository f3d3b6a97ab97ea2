// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone serial ownership.
//!
//! The [`SerialCoordinator`] is the only writer of the zone. Every mutation
//! goes through [`SerialCoordinator::apply`] (or [`SerialCoordinator::bump`]
//! for changes made outside the zone, such as a dynamic address update), which:
//!
//! 1. copies the zone and applies the mutation to the copy,
//! 2. computes the next serial and persists it under `dns_soa_serial`,
//!    together with the zone fingerprint under `dns_zone_fingerprint`,
//! 3. swaps the copy in under the write lock,
//! 4. sends NOTIFY to every secondary on a background task.
//!
//! Readers never wait on persistence and observe either the old zone or the
//! new one, never a mix. If persistence fails nothing is swapped in.
//!
//! The persisted fingerprint identifies the contents secondaries already hold
//! at the persisted serial. A restart that rebuilds exactly those contents
//! keeps the serial and sends no NOTIFY.
//!
//! Serials compare under RFC 1982 serial number arithmetic, see [`serial_gt`].

use crate::constants::{FINGERPRINT_STORE_KEY, SERIAL_STORE_KEY};
use crate::dns_errors::{CoreError, SerialError, ZoneError};
use crate::metrics::record_serial;
use crate::notify::{notify_secondaries, SecondaryServer, ZoneNotifier};
use crate::stores::KeyValueStore;
use crate::zone::{ZoneData, ZoneStore};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Half the serial number space, 2^31.
const SERIAL_HALF_RANGE: u32 = 1 << 31;

/// RFC 1982 comparison: true when `a` is greater than `b`.
///
/// Pairs exactly 2^31 apart are incomparable and yield false both ways.
#[must_use]
pub fn serial_gt(a: u32, b: u32) -> bool {
    let distance = a.wrapping_sub(b);
    distance != 0 && distance < SERIAL_HALF_RANGE
}

/// The serial following `current` when the clock reads `now`.
///
/// Time-derived when the clock is ahead of the current serial, otherwise the
/// current serial plus one. The result is always greater than `current`.
#[must_use]
pub fn next_serial(current: u32, now: u32) -> u32 {
    if serial_gt(now, current) {
        now
    } else {
        current.wrapping_add(1)
    }
}

/// Current UNIX time in seconds, reduced modulo 2^32.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn unix_time_serial() -> u32 {
    chrono::Utc::now().timestamp() as u32
}

/// Outcome of a mutation routed through the coordinator.
#[derive(Debug)]
pub struct SerialChange {
    /// Serial before the mutation
    pub previous: u32,
    /// Serial after the mutation (equal to `previous` when nothing changed)
    pub current: u32,
    /// Background NOTIFY task, resolving to the number of secondaries that accepted
    pub notify: Option<JoinHandle<usize>>,
}

impl SerialChange {
    fn unchanged(serial: u32) -> Self {
        Self {
            previous: serial,
            current: serial,
            notify: None,
        }
    }

    /// True when the mutation advanced the serial.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// Owns the zone serial: initialization, persistence, bumps and NOTIFY.
///
/// Cloning is cheap; clones share the update lock and the zone.
#[derive(Clone)]
pub struct SerialCoordinator {
    zone: ZoneStore,
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn ZoneNotifier>,
    secondaries: Arc<[SecondaryServer]>,
    clock: fn() -> u32,
    // Fingerprint of the zone published at the current serial. Held across
    // copy, persist and swap so concurrent mutations never interleave.
    published: Arc<Mutex<Option<String>>>,
}

impl std::fmt::Debug for SerialCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialCoordinator")
            .field("zone", &self.zone.origin())
            .field("secondaries", &self.secondaries)
            .finish_non_exhaustive()
    }
}

impl SerialCoordinator {
    #[must_use]
    pub fn new(
        zone: ZoneStore,
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn ZoneNotifier>,
        secondaries: Vec<SecondaryServer>,
    ) -> Self {
        Self {
            zone,
            store,
            notifier,
            secondaries: secondaries.into(),
            clock: unix_time_serial,
            published: Arc::new(Mutex::new(None)),
        }
    }

    /// Replace the clock used to derive time-based serials.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> u32) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn zone(&self) -> &ZoneStore {
        &self.zone
    }

    #[must_use]
    pub fn secondaries(&self) -> &[SecondaryServer] {
        &self.secondaries
    }

    /// The serial currently served.
    pub async fn current(&self) -> u32 {
        self.zone.serial().await
    }

    /// Load the persisted serial, or derive and persist one on first start,
    /// and push it into the SOA. Also loads the fingerprint of the zone last
    /// published at that serial.
    ///
    /// # Errors
    ///
    /// Returns a [`SerialError`] when the store fails or holds a value that is
    /// not a 32-bit unsigned integer.
    pub async fn init(&self) -> Result<u32, SerialError> {
        let mut published = self.published.lock().await;

        let stored = self.read_key(SERIAL_STORE_KEY).await?;
        let stored_serial = stored.is_some();

        let serial = match stored {
            Some(value) => {
                let serial = value.trim().parse::<u32>().map_err(|_| SerialError::Corrupt {
                    key: SERIAL_STORE_KEY.to_string(),
                    value: value.clone(),
                })?;
                info!("Loaded zone serial {} for {}", serial, self.zone.origin());
                serial
            }
            None => {
                let serial = (self.clock)();
                self.persist(serial).await?;
                info!(
                    "No persisted serial for {}, initialized to {}",
                    self.zone.origin(),
                    serial
                );
                serial
            }
        };

        // A fingerprint only describes the zone at a serial that was read back.
        *published = if stored_serial {
            self.read_key(FINGERPRINT_STORE_KEY).await?
        } else {
            None
        };
        self.zone.write().await.set_serial(serial);
        record_serial(serial);
        Ok(serial)
    }

    /// Make sure the persisted fingerprint describes the zone being served.
    ///
    /// Called once the startup zone is complete. When the zone differs from
    /// the contents last published, the serial advances and secondaries are
    /// notified. Without a persisted fingerprint the current contents are
    /// recorded as published under the current serial.
    ///
    /// # Errors
    ///
    /// Returns a [`SerialError`] if the serial or the fingerprint could not be
    /// persisted.
    pub async fn publish(&self) -> Result<SerialChange, SerialError> {
        let mut published = self.published.lock().await;

        let (previous, fingerprint) = {
            let zone = self.zone.read().await;
            (zone.serial(), zone.fingerprint())
        };

        match published.as_deref() {
            Some(known) if known == fingerprint => {
                debug!(
                    "Zone {} matches the contents published at serial {}",
                    self.zone.origin(),
                    previous
                );
                return Ok(SerialChange::unchanged(previous));
            }
            None => {
                self.persist_fingerprint(&fingerprint).await?;
                *published = Some(fingerprint);
                return Ok(SerialChange::unchanged(previous));
            }
            Some(_) => {}
        }

        let current = next_serial(previous, (self.clock)());
        self.persist(current).await?;
        self.persist_fingerprint(&fingerprint).await?;
        self.zone.write().await.set_serial(current);
        *published = Some(fingerprint);

        Ok(self.committed(previous, current))
    }

    /// Advance the serial for a change made outside the zone data.
    ///
    /// # Errors
    ///
    /// Returns [`SerialError::WriteFailed`] if the new serial could not be
    /// persisted. The served serial is unchanged in that case.
    pub async fn bump(&self) -> Result<SerialChange, SerialError> {
        let _published = self.published.lock().await;

        let previous = self.zone.serial().await;
        let current = next_serial(previous, (self.clock)());
        self.persist(current).await?;
        self.zone.write().await.set_serial(current);

        Ok(self.committed(previous, current))
    }

    /// Run a zone mutation as one logical operation.
    ///
    /// The serial advances exactly once when the mutation changed any record,
    /// and not at all otherwise. A mutation that brings the zone back to the
    /// contents already published at the current serial is swapped in without
    /// advancing it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Zone`] if the mutation fails and
    /// [`CoreError::Serial`] if the new serial could not be persisted. In both
    /// cases the zone is left untouched.
    pub async fn apply<F>(&self, mutation: F) -> Result<SerialChange, CoreError>
    where
        F: FnOnce(&mut ZoneData) -> Result<(), ZoneError>,
    {
        let mut published = self.published.lock().await;

        let mut draft = self.zone.read().await.clone();
        let previous = draft.serial();
        mutation(&mut draft)?;

        let unchanged = draft.same_records(&*self.zone.read().await);
        if unchanged {
            debug!(
                "Mutation left zone {} unchanged, serial stays {}",
                self.zone.origin(),
                previous
            );
            return Ok(SerialChange::unchanged(previous));
        }

        let fingerprint = draft.fingerprint();
        if published.as_deref() == Some(fingerprint.as_str()) {
            debug!(
                "Zone {} restored to the contents published at serial {}",
                self.zone.origin(),
                previous
            );
            *self.zone.write().await = draft;
            return Ok(SerialChange::unchanged(previous));
        }

        let current = next_serial(previous, (self.clock)());
        self.persist(current).await?;
        self.persist_fingerprint(&fingerprint).await?;
        draft.set_serial(current);
        *self.zone.write().await = draft;
        *published = Some(fingerprint);

        Ok(self.committed(previous, current))
    }

    async fn read_key(&self, key: &str) -> Result<Option<String>, SerialError> {
        self.store
            .get(key)
            .await
            .map_err(|source| SerialError::ReadFailed {
                key: key.to_string(),
                source,
            })
    }

    async fn persist_fingerprint(&self, fingerprint: &str) -> Result<(), SerialError> {
        self.store
            .set(FINGERPRINT_STORE_KEY, fingerprint)
            .await
            .map_err(|source| SerialError::FingerprintWriteFailed {
                key: FINGERPRINT_STORE_KEY.to_string(),
                source,
            })
    }

    async fn persist(&self, serial: u32) -> Result<(), SerialError> {
        self.store
            .set(SERIAL_STORE_KEY, &serial.to_string())
            .await
            .map_err(|source| SerialError::WriteFailed {
                key: SERIAL_STORE_KEY.to_string(),
                serial,
                source,
            })
    }

    fn committed(&self, previous: u32, current: u32) -> SerialChange {
        info!(
            "Zone {} serial advanced {} -> {}",
            self.zone.origin(),
            previous,
            current
        );
        record_serial(current);

        SerialChange {
            previous,
            current,
            notify: self.spawn_notify(),
        }
    }

    fn spawn_notify(&self) -> Option<JoinHandle<usize>> {
        if self.secondaries.is_empty() {
            return None;
        }

        let notifier = Arc::clone(&self.notifier);
        let secondaries = Arc::clone(&self.secondaries);
        let zone = self.zone.origin().to_string();
        Some(tokio::spawn(async move {
            notify_secondaries(notifier.as_ref(), &zone, &secondaries).await
        }))
    }
}

#[cfg(test)]
#[path = "serial_tests.rs"]
mod serial_tests;
