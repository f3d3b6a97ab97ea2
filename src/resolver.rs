// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Query resolution.
//!
//! [`RecordResolver::resolve`] answers one (name, type) question for the
//! transport layer. The static zone is consulted first; names it does not
//! answer are split into the registered domain (the label directly below the
//! zone root) and the labels beneath it:
//!
//! | Query                        | Answered from                               |
//! |------------------------------|---------------------------------------------|
//! | `example.test SOA`           | zone                                        |
//! | `alice.example.test A`       | alice's last dynamic-update IPv4            |
//! | `alice.example.test TXT`     | additional records of alice at `@`          |
//! | `foo.alice.example.test TXT` | additional records of alice at `foo`        |
//!
//! Misses are empty answers, never errors. Only a failing backing store
//! produces an `Err`, so the transport can answer SERVFAIL.

use crate::constants::DYNAMIC_RECORD_TTL_SECS;
use crate::dns_errors::StoreError;
use crate::metrics::{
    record_query, SOURCE_ADDITIONAL, SOURCE_DYNAMIC, SOURCE_ERROR, SOURCE_NONE, SOURCE_ZONE,
};
use crate::names::{normalize_name, relative_to, split_label_path};
use crate::records::{AData, AaaaData, RecordData, RecordType, ResourceRecord};
use crate::stores::{AdditionalRecordStore, Domain, DomainRegistry};
use crate::zone::ZoneStore;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Answer and authority sections for one question.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub answers: Vec<ResourceRecord>,
    pub authorities: Vec<ResourceRecord>,
}

impl Resolution {
    /// True when both sections are empty (the name is outside the zone).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty() && self.authorities.is_empty()
    }

    fn authoritative(authorities: Vec<ResourceRecord>, answers: Vec<ResourceRecord>) -> Self {
        Self {
            answers,
            authorities,
        }
    }
}

/// The query entry point of the DNS core.
#[derive(Clone)]
pub struct RecordResolver {
    zone: ZoneStore,
    domains: Arc<dyn DomainRegistry>,
    additional: Arc<dyn AdditionalRecordStore>,
}

impl std::fmt::Debug for RecordResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordResolver")
            .field("zone", &self.zone.origin())
            .finish_non_exhaustive()
    }
}

impl RecordResolver {
    #[must_use]
    pub fn new(
        zone: ZoneStore,
        domains: Arc<dyn DomainRegistry>,
        additional: Arc<dyn AdditionalRecordStore>,
    ) -> Self {
        Self {
            zone,
            domains,
            additional,
        }
    }

    /// Resolve a question as decoded from the wire.
    ///
    /// Query types the core does not serve resolve to no answers.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the domain registry or the additional
    /// record store fails.
    pub async fn resolve(
        &self,
        name: &str,
        qtype: hickory_proto::rr::RecordType,
    ) -> Result<Resolution, StoreError> {
        let start = Instant::now();
        let rtype = RecordType::from_wire(qtype);
        let result = self.lookup(name, rtype).await;

        let source = match &result {
            Ok((_, source)) => *source,
            Err(_) => SOURCE_ERROR,
        };
        record_query(source, start.elapsed());
        debug!(
            "Resolved {} {} from {} in {:?}",
            name,
            qtype,
            source,
            start.elapsed()
        );

        result.map(|(resolution, _)| resolution)
    }

    /// Resolve a question for a record type known to the core.
    ///
    /// # Errors
    ///
    /// See [`RecordResolver::resolve`].
    pub async fn resolve_type(
        &self,
        name: &str,
        rtype: RecordType,
    ) -> Result<Resolution, StoreError> {
        self.lookup(name, Some(rtype))
            .await
            .map(|(resolution, _)| resolution)
    }

    async fn lookup(
        &self,
        name: &str,
        rtype: Option<RecordType>,
    ) -> Result<(Resolution, &'static str), StoreError> {
        let name = normalize_name(name);
        let Some(relative) = relative_to(&name, self.zone.origin()) else {
            return Ok((Resolution::default(), SOURCE_NONE));
        };

        let Some(rtype) = rtype else {
            let authorities = self.zone.authorities().await;
            return Ok((Resolution::authoritative(authorities, Vec::new()), SOURCE_NONE));
        };

        // Zone lookups happen under one read guard, released before any store I/O.
        let (authorities, zone_answers) = {
            let zone = self.zone.read().await;
            let authorities = zone.authority_records();
            let values = zone.get(&name, rtype);
            let zone_owned = relative.is_empty() || name == self.zone.nameserver();
            if zone_owned || !values.is_empty() {
                let answers = values
                    .iter()
                    .map(|value| ResourceRecord::from_value(&name, value))
                    .collect::<Vec<_>>();
                (authorities, Some(answers))
            } else {
                (authorities, None)
            }
        };

        if let Some(answers) = zone_answers {
            return Ok((Resolution::authoritative(authorities, answers), SOURCE_ZONE));
        }

        let Some(path) = split_label_path(relative) else {
            return Ok((Resolution::authoritative(authorities, Vec::new()), SOURCE_NONE));
        };

        let Some(domain) = self.domains.find_domain(path.apex).await? else {
            debug!("No registered domain '{}' for {}", path.apex, name);
            return Ok((Resolution::authoritative(authorities, Vec::new()), SOURCE_NONE));
        };

        if path.is_apex() && matches!(rtype, RecordType::A | RecordType::AAAA) {
            let answers = dynamic_answer(&name, &domain, rtype).into_iter().collect();
            return Ok((Resolution::authoritative(authorities, answers), SOURCE_DYNAMIC));
        }

        let answers = self
            .additional
            .find_records(domain.id, path.remainder, rtype)
            .await?
            .iter()
            .filter(|value| value.record_type() == rtype)
            .map(|value| ResourceRecord::from_value(&name, value))
            .collect();

        Ok((
            Resolution::authoritative(authorities, answers),
            SOURCE_ADDITIONAL,
        ))
    }
}

/// The address a domain last reported through dynamic update, if any.
fn dynamic_answer(name: &str, domain: &Domain, rtype: RecordType) -> Option<ResourceRecord> {
    let data = match rtype {
        RecordType::A => RecordData::A(AData {
            address: domain.last_ipv4?,
        }),
        RecordType::AAAA => RecordData::AAAA(AaaaData {
            address: domain.last_ipv6?,
        }),
        _ => return None,
    };

    Some(ResourceRecord {
        name: name.to_string(),
        rtype,
        ttl: DYNAMIC_RECORD_TTL_SECS,
        data,
    })
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod resolver_tests;
