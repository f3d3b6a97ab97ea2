// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Settings of the DNS core.
//!
//! Every setting can be given as a command-line flag or through its
//! `NOWIP_DNS_*` environment variable. Only the zone origin and the primary
//! nameserver are required.

use crate::constants::{
    DEFAULT_SOA_EXPIRE_SECS, DEFAULT_SOA_MINIMUM_SECS, DEFAULT_SOA_REFRESH_SECS,
    DEFAULT_SOA_RETRY_SECS, DEFAULT_STATE_FILE,
};
use crate::dns_errors::{NotifyError, ZoneError};
use crate::notify::{parse_secondaries, SecondaryServer};
use crate::zone::{ZoneConfig, ZoneData};
use clap::Parser;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::path::PathBuf;

/// DNS core settings.
#[derive(Clone, Debug, PartialEq, Eq, Parser)]
pub struct Settings {
    /// Root domain served by this instance
    #[arg(long, env = "NOWIP_DNS_DOMAIN")]
    pub domain: String,

    /// Primary nameserver (SOA primary and first NS record)
    #[arg(long = "ns-primary", env = "NOWIP_DNS_NS_PRIMARY")]
    pub ns_primary: String,

    /// Secondary nameserver published as a second NS record
    #[arg(long = "ns-secondary", env = "NOWIP_DNS_NS_SECONDARY")]
    pub ns_secondary: Option<String>,

    /// JSON file with operator-declared records
    #[arg(long = "custom-records-file", env = "NOWIP_DNS_CUSTOM_RECORDS_FILE")]
    pub custom_records_file: Option<PathBuf>,

    /// Comma-separated secondaries to NOTIFY, as host[:port]
    #[arg(long = "slave-servers", env = "NOWIP_DNS_SLAVE_SERVERS")]
    pub slave_servers: Option<String>,

    /// Public IPv4 address of the root and the primary nameserver
    #[arg(long = "public-ipv4", env = "NOWIP_DNS_PUBLIC_IPV4")]
    pub public_ipv4: Option<Ipv4Addr>,

    /// Public IPv6 address of the root and the primary nameserver
    #[arg(long = "public-ipv6", env = "NOWIP_DNS_PUBLIC_IPV6")]
    pub public_ipv6: Option<Ipv6Addr>,

    /// JSON state file holding the persisted serial
    #[arg(long = "state-file", env = "NOWIP_DNS_STATE_FILE", default_value = DEFAULT_STATE_FILE)]
    pub state_file: PathBuf,

    #[arg(long = "soa-refresh", env = "NOWIP_DNS_SOA_REFRESH", default_value_t = DEFAULT_SOA_REFRESH_SECS)]
    pub soa_refresh: u32,

    #[arg(long = "soa-retry", env = "NOWIP_DNS_SOA_RETRY", default_value_t = DEFAULT_SOA_RETRY_SECS)]
    pub soa_retry: u32,

    #[arg(long = "soa-expire", env = "NOWIP_DNS_SOA_EXPIRE", default_value_t = DEFAULT_SOA_EXPIRE_SECS)]
    pub soa_expire: u32,

    #[arg(long = "soa-minimum", env = "NOWIP_DNS_SOA_MINIMUM", default_value_t = DEFAULT_SOA_MINIMUM_SECS)]
    pub soa_minimum: u32,
}

impl Settings {
    /// Build the zone configuration, checking that it yields a usable zone.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::InvalidConfiguration`] when the domain or a
    /// nameserver is not a valid hostname.
    pub fn zone_config(&self) -> Result<ZoneConfig, ZoneError> {
        let config = ZoneConfig {
            origin: self.domain.clone(),
            primary_ns: self.ns_primary.clone(),
            secondary_ns: self
                .ns_secondary
                .clone()
                .filter(|ns| !ns.trim().is_empty()),
            public_ipv4: self.public_ipv4,
            public_ipv6: self.public_ipv6,
            refresh: self.soa_refresh,
            retry: self.soa_retry,
            expire: self.soa_expire,
            minimum: self.soa_minimum,
        };

        ZoneData::new(&config)?;
        Ok(config)
    }

    /// The secondaries to NOTIFY after each serial change.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::InvalidSecondary`] for a malformed entry.
    pub fn secondaries(&self) -> Result<Vec<SecondaryServer>, NotifyError> {
        self.slave_servers
            .as_deref()
            .map_or_else(|| Ok(Vec::new()), parse_secondaries)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
