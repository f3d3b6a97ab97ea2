// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS NOTIFY (RFC 1996) toward secondary servers.
//!
//! After every serial change the coordinator tells each configured secondary
//! that the zone changed, so it can refresh before its SOA refresh timer
//! fires. Delivery is best-effort: failures are logged and counted, never
//! retried, and never roll back the serial.

use crate::constants::{DNS_PORT, NOTIFY_TIMEOUT_SECS};
use crate::dns_errors::NotifyError;
use crate::metrics::record_notify;
use anyhow::Context;
use async_trait::async_trait;
use futures::future::join_all;
use hickory_client::client::{Client, SyncClient};
use hickory_client::op::ResponseCode;
use hickory_client::rr::{DNSClass, Name, RecordSet, RecordType};
use hickory_client::udp::UdpClientConnection;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A secondary server to notify, as configured (`host[:port]`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SecondaryServer {
    pub host: String,
    pub port: u16,
}

impl SecondaryServer {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for SecondaryServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for SecondaryServer {
    type Err = NotifyError;

    /// Parse `host`, `host:port`, a bare IPv6 address or `[ipv6]:port`.
    /// The port defaults to 53.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |reason: &str| NotifyError::InvalidSecondary {
            server: s.to_string(),
            reason: reason.to_string(),
        };

        let (host, port) = if let Some(rest) = s.strip_prefix('[') {
            let (host, after) = rest
                .split_once(']')
                .ok_or_else(|| invalid("missing closing bracket"))?;
            match after {
                "" => (host, None),
                _ => (
                    host,
                    Some(
                        after
                            .strip_prefix(':')
                            .ok_or_else(|| invalid("expected ':' after ']'"))?,
                    ),
                ),
            }
        } else if s.matches(':').count() == 1 {
            let (host, port) = s.split_once(':').ok_or_else(|| invalid("missing port"))?;
            (host, Some(port))
        } else {
            (s, None)
        };

        if host.is_empty() {
            return Err(invalid("host cannot be empty"));
        }
        let port = match port {
            Some(port) => port
                .parse::<u16>()
                .map_err(|e| invalid(&format!("invalid port '{port}': {e}")))?,
            None => DNS_PORT,
        };

        Ok(Self::new(host, port))
    }
}

/// Parse a comma-separated list of secondaries, skipping blank entries.
///
/// # Errors
///
/// Returns the first [`NotifyError::InvalidSecondary`] encountered.
pub fn parse_secondaries(list: &str) -> Result<Vec<SecondaryServer>, NotifyError> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(SecondaryServer::from_str)
        .collect()
}

/// Sends one NOTIFY for a zone to one secondary.
#[async_trait]
pub trait ZoneNotifier: Send + Sync {
    /// Notify `secondary` that `zone` changed.
    ///
    /// # Errors
    ///
    /// Returns a [`NotifyError`] when the message could not be delivered or
    /// the secondary did not answer NOERROR.
    async fn notify(&self, zone: &str, secondary: &SecondaryServer) -> Result<(), NotifyError>;
}

/// [`ZoneNotifier`] backed by the hickory DNS client over UDP.
#[derive(Clone, Debug)]
pub struct HickoryNotifier {
    timeout: Duration,
}

impl Default for HickoryNotifier {
    fn default() -> Self {
        Self::new(Duration::from_secs(NOTIFY_TIMEOUT_SECS))
    }
}

impl HickoryNotifier {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn resolve(secondary: &SecondaryServer) -> Result<SocketAddr, NotifyError> {
        let resolve_failed = |reason: String| NotifyError::ResolveFailed {
            server: secondary.to_string(),
            reason,
        };

        tokio::net::lookup_host((secondary.host.as_str(), secondary.port))
            .await
            .map_err(|e| resolve_failed(e.to_string()))?
            .next()
            .ok_or_else(|| resolve_failed("no addresses found".to_string()))
    }
}

#[async_trait]
impl ZoneNotifier for HickoryNotifier {
    async fn notify(&self, zone: &str, secondary: &SecondaryServer) -> Result<(), NotifyError> {
        let server_addr = Self::resolve(secondary).await?;
        let zone_str = zone.to_string();
        let timeout = self.timeout;

        // hickory's SyncClient blocks, keep it off the async workers
        let result = tokio::task::spawn_blocking(move || -> anyhow::Result<ResponseCode> {
            let conn = UdpClientConnection::with_timeout(server_addr, timeout)
                .context("Failed to create UDP connection")?;
            let mut client = SyncClient::new(conn);

            let name = Name::from_str(&zone_str)
                .with_context(|| format!("Invalid zone name: {zone_str}"))?;

            debug!("Sending NOTIFY for {} to {}", zone_str, server_addr);
            let response = client
                .notify(name, DNSClass::IN, RecordType::SOA, None::<RecordSet>)
                .with_context(|| format!("Failed to send NOTIFY for zone {zone_str}"))?;

            Ok(response.response_code())
        })
        .await;

        let send_failed = |reason: String| NotifyError::SendFailed {
            server: server_addr.to_string(),
            reason,
        };

        match result {
            Ok(Ok(ResponseCode::NoError)) => Ok(()),
            Ok(Ok(code)) => Err(NotifyError::Rejected {
                server: server_addr.to_string(),
                code: format!("{code:?}"),
            }),
            Ok(Err(e)) => Err(send_failed(format!("{e:#}"))),
            Err(e) => Err(send_failed(format!("NOTIFY task panicked or failed: {e}"))),
        }
    }
}

/// Notify every secondary concurrently and return how many accepted.
///
/// Each outcome is logged and counted in `nowip_dns_notify_total`.
pub async fn notify_secondaries(
    notifier: &dyn ZoneNotifier,
    zone: &str,
    secondaries: &[SecondaryServer],
) -> usize {
    let outcomes = join_all(
        secondaries
            .iter()
            .map(|secondary| async move { (secondary, notifier.notify(zone, secondary).await) }),
    )
    .await;

    let mut delivered = 0;
    for (secondary, outcome) in outcomes {
        match outcome {
            Ok(()) => {
                delivered += 1;
                record_notify("success");
                info!("NOTIFY for zone {} accepted by {}", zone, secondary);
            }
            Err(e) => {
                record_notify(e.reason());
                warn!("NOTIFY for zone {} to {} failed: {}", zone, secondary, e);
            }
        }
    }
    delivered
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod notify_tests;
