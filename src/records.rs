// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS record types and their payload schemas.
//!
//! Every record served by the core is a [`RecordValue`]: a typed payload
//! ([`RecordData`]) plus an optional TTL. Payloads arrive as loosely typed JSON
//! (from the custom records file or from the additional record store) and are
//! validated against their type's schema by [`RecordValue::parse`].
//!
//! | Type  | Fields                                                   |
//! |-------|----------------------------------------------------------|
//! | A     | `address` (IPv4)                                         |
//! | AAAA  | `address` (IPv6)                                         |
//! | CNAME | `domain` (hostname)                                      |
//! | MX    | `exchange` (hostname), `priority`                        |
//! | NS    | `ns` (hostname)                                          |
//! | PTR   | `domain` (hostname)                                      |
//! | SOA   | `primary`, `admin`, `serial`, `refresh`, `retry`, `expiration`, `minimum` |
//! | SRV   | `priority`, `weight`, `port`, `target` (hostname)        |
//! | TXT   | `data` (string or array of strings)                      |
//! | SPF   | `data` (string or array of strings)                      |
//! | CAA   | `flags`, `tag`, `value`                                  |

use crate::constants::DEFAULT_DNS_RECORD_TTL_SECS;
use crate::dns_errors::ValidationError;
use crate::validation::validate_hostname;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Record types known to the core.
///
/// SOA, NS and PTR only ever come from the zone configuration; the remaining
/// types may also be supplied by operators and end users.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,
    AAAA,
    CNAME,
    MX,
    NS,
    PTR,
    SOA,
    SRV,
    TXT,
    SPF,
    CAA,
}

impl RecordType {
    /// All record types, in wire-code order.
    pub const ALL: [Self; 11] = [
        Self::A,
        Self::NS,
        Self::CNAME,
        Self::SOA,
        Self::PTR,
        Self::MX,
        Self::TXT,
        Self::AAAA,
        Self::SRV,
        Self::SPF,
        Self::CAA,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::AAAA => "AAAA",
            Self::CNAME => "CNAME",
            Self::MX => "MX",
            Self::NS => "NS",
            Self::PTR => "PTR",
            Self::SOA => "SOA",
            Self::SRV => "SRV",
            Self::TXT => "TXT",
            Self::SPF => "SPF",
            Self::CAA => "CAA",
        }
    }

    /// The IANA type code of this record type.
    #[must_use]
    pub fn code(&self) -> u16 {
        match self {
            Self::A => 1,
            Self::NS => 2,
            Self::CNAME => 5,
            Self::SOA => 6,
            Self::PTR => 12,
            Self::MX => 15,
            Self::TXT => 16,
            Self::AAAA => 28,
            Self::SRV => 33,
            Self::SPF => 99,
            Self::CAA => 257,
        }
    }

    /// Map a decoded wire query type onto a supported record type.
    ///
    /// Returns `None` for every type the core does not serve (ANY, AXFR,
    /// DNSKEY, ...), which the resolver answers with an empty result.
    #[must_use]
    pub fn from_wire(rtype: hickory_proto::rr::RecordType) -> Option<Self> {
        let code = u16::from(rtype);
        Self::ALL.into_iter().find(|candidate| candidate.code() == code)
    }

    /// SOA, NS and PTR are owned by the zone and never user- or file-supplied.
    #[must_use]
    pub fn is_zone_managed(&self) -> bool {
        matches!(self, Self::SOA | Self::NS | Self::PTR)
    }

    /// A, AAAA and CNAME at `@` would conflict with the dynamic-update answers.
    #[must_use]
    pub fn is_apex_reserved(&self) -> bool {
        matches!(self, Self::A | Self::AAAA | Self::CNAME)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = ValidationError;

    /// Parse an uppercase record type name such as `AAAA`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == s)
            .ok_or_else(|| ValidationError::UnsupportedType(s.to_string()))
    }
}

/// IPv4 address record payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AData {
    pub address: Ipv4Addr,
}

/// IPv6 address record payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AaaaData {
    pub address: Ipv6Addr,
}

/// Canonical name record payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CnameData {
    pub domain: String,
}

/// Mail exchanger record payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MxData {
    pub exchange: String,
    pub priority: u16,
}

/// Nameserver record payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NsData {
    pub ns: String,
}

/// Pointer record payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PtrData {
    pub domain: String,
}

/// Start of authority payload.
///
/// The admin contact is in mailbox-as-name form (`admin.ns.example.test`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoaData {
    pub primary: String,
    pub admin: String,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expiration: u32,
    pub minimum: u32,
}

/// Service locator record payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrvData {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: String,
}

/// Text content of a TXT or SPF record: a single string or several.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TxtStrings {
    One(String),
    Many(Vec<String>),
}

impl TxtStrings {
    /// The individual character-strings of the record.
    #[must_use]
    pub fn strings(&self) -> Vec<&str> {
        match self {
            Self::One(s) => vec![s.as_str()],
            Self::Many(v) => v.iter().map(String::as_str).collect(),
        }
    }
}

/// TXT and SPF record payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxtData {
    pub data: TxtStrings,
}

/// Certification authority authorization payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaaData {
    pub flags: u8,
    pub tag: String,
    pub value: String,
}

/// Type-specific record payload.
///
/// Serializes to the bare payload object, so an answer renders as e.g.
/// `{"address": "203.0.113.5", "ttl": 300}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RecordData {
    A(AData),
    AAAA(AaaaData),
    CNAME(CnameData),
    MX(MxData),
    NS(NsData),
    PTR(PtrData),
    SOA(SoaData),
    SRV(SrvData),
    TXT(TxtData),
    SPF(TxtData),
    CAA(CaaData),
}

impl RecordData {
    #[must_use]
    pub fn record_type(&self) -> RecordType {
        match self {
            Self::A(_) => RecordType::A,
            Self::AAAA(_) => RecordType::AAAA,
            Self::CNAME(_) => RecordType::CNAME,
            Self::MX(_) => RecordType::MX,
            Self::NS(_) => RecordType::NS,
            Self::PTR(_) => RecordType::PTR,
            Self::SOA(_) => RecordType::SOA,
            Self::SRV(_) => RecordType::SRV,
            Self::TXT(_) => RecordType::TXT,
            Self::SPF(_) => RecordType::SPF,
            Self::CAA(_) => RecordType::CAA,
        }
    }
}

/// A record payload together with its optional TTL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecordValue {
    #[serde(flatten)]
    pub data: RecordData,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

impl RecordValue {
    #[must_use]
    pub fn new(data: RecordData) -> Self {
        Self { data, ttl: None }
    }

    #[must_use]
    pub fn with_ttl(data: RecordData, ttl: u32) -> Self {
        Self {
            data,
            ttl: Some(ttl),
        }
    }

    #[must_use]
    pub fn record_type(&self) -> RecordType {
        self.data.record_type()
    }

    /// TTL to serve: the record's own, or the 300 second default.
    #[must_use]
    pub fn ttl_or_default(&self) -> u32 {
        self.ttl.unwrap_or(DEFAULT_DNS_RECORD_TTL_SECS)
    }

    /// Validate a JSON payload against the schema of `rtype`.
    ///
    /// Unknown fields are ignored. Hostname fields must be valid DNS names.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPayload`] if the payload is not an
    /// object, misses a field, has a field of the wrong type or range, or
    /// carries an invalid hostname.
    pub fn parse(rtype: RecordType, payload: &serde_json::Value) -> Result<Self, ValidationError> {
        let object = payload
            .as_object()
            .ok_or_else(|| invalid(rtype, "expected a JSON object"))?;

        let ttl = match object.get("ttl") {
            None | Some(serde_json::Value::Null) => None,
            Some(value) => {
                let ttl = value
                    .as_u64()
                    .and_then(|ttl| u32::try_from(ttl).ok())
                    .ok_or_else(|| invalid(rtype, "ttl must be an integer between 0 and 4294967295"))?;
                Some(ttl)
            }
        };

        let data = match rtype {
            RecordType::A => RecordData::A(decode(rtype, payload)?),
            RecordType::AAAA => RecordData::AAAA(decode(rtype, payload)?),
            RecordType::CNAME => {
                let data: CnameData = decode(rtype, payload)?;
                check_hostname(rtype, &data.domain)?;
                RecordData::CNAME(data)
            }
            RecordType::MX => {
                let data: MxData = decode(rtype, payload)?;
                check_hostname(rtype, &data.exchange)?;
                RecordData::MX(data)
            }
            RecordType::NS => {
                let data: NsData = decode(rtype, payload)?;
                check_hostname(rtype, &data.ns)?;
                RecordData::NS(data)
            }
            RecordType::PTR => {
                let data: PtrData = decode(rtype, payload)?;
                check_hostname(rtype, &data.domain)?;
                RecordData::PTR(data)
            }
            RecordType::SOA => {
                let data: SoaData = decode(rtype, payload)?;
                check_hostname(rtype, &data.primary)?;
                RecordData::SOA(data)
            }
            RecordType::SRV => {
                let data: SrvData = decode(rtype, payload)?;
                check_hostname(rtype, &data.target)?;
                RecordData::SRV(data)
            }
            RecordType::TXT => RecordData::TXT(decode(rtype, payload)?),
            RecordType::SPF => RecordData::SPF(decode(rtype, payload)?),
            RecordType::CAA => {
                let data: CaaData = decode(rtype, payload)?;
                if data.tag.is_empty() || !data.tag.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return Err(invalid(rtype, "tag must be a non-empty alphanumeric string"));
                }
                RecordData::CAA(data)
            }
        };

        Ok(Self { data, ttl })
    }
}

/// A record as it appears in an answer or authority section.
///
/// Serializes flat: `{"name": "alice.example.test", "type": "A", "ttl": 300,
/// "address": "203.0.113.5"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResourceRecord {
    pub name: String,

    #[serde(rename = "type")]
    pub rtype: RecordType,

    pub ttl: u32,

    #[serde(flatten)]
    pub data: RecordData,
}

impl ResourceRecord {
    /// Attach an owner name to a stored value, resolving its TTL.
    #[must_use]
    pub fn from_value(name: &str, value: &RecordValue) -> Self {
        Self {
            name: name.to_string(),
            rtype: value.record_type(),
            ttl: value.ttl_or_default(),
            data: value.data.clone(),
        }
    }
}

fn invalid(rtype: RecordType, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidPayload {
        rtype,
        reason: reason.into(),
    }
}

fn decode<T: DeserializeOwned>(
    rtype: RecordType,
    payload: &serde_json::Value,
) -> Result<T, ValidationError> {
    serde_json::from_value(payload.clone()).map_err(|e| invalid(rtype, e.to_string()))
}

fn check_hostname(rtype: RecordType, hostname: &str) -> Result<(), ValidationError> {
    validate_hostname(hostname).map_err(|e| invalid(rtype, e.to_string()))
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod records_tests;
