// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the NowIP DNS core.
//!
//! This module provides specialized error types for:
//! - Record payload validation (type schemas, reserved types and labels)
//! - Loading the custom records file at startup
//! - Zone mutations and serial persistence
//! - Backing store lookups performed while resolving queries
//! - NOTIFY delivery to secondary servers
//!
//! Load and serial errors are fatal: an authoritative server must never serve a
//! partially loaded zone or a serial it cannot persist. NOTIFY errors are only
//! ever logged. A lookup miss is not an error at all and never appears here.

use crate::records::RecordType;
use thiserror::Error;

/// A record payload or record placement that violates the zone rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The record type name is not one this service knows how to serve
    #[error("unsupported record type '{0}'")]
    UnsupportedType(String),

    /// SOA, NS and PTR are owned by the zone itself
    #[error("record type {0} is managed by the zone and cannot be supplied")]
    ReservedType(RecordType),

    /// A, AAAA and CNAME at `@` would collide with the dynamic-update answers
    #[error("record type {0} is not allowed at '@' (reserved for dynamic update answers)")]
    ReservedApexType(RecordType),

    /// The payload does not match the schema of its record type
    #[error("invalid {rtype} payload: {reason}")]
    InvalidPayload {
        /// Record type whose schema was violated
        rtype: RecordType,
        /// Explanation of what is invalid
        reason: String,
    },

    /// A label or hostname is not a valid DNS name
    #[error("invalid name '{name}': {reason}")]
    InvalidName {
        /// The offending name
        name: String,
        /// Explanation of what is invalid
        reason: String,
    },
}

/// Errors raised while loading the custom records file.
///
/// Every variant is fatal at startup. The parse-class variants describe a file
/// that does not have the expected shape; the rejection variants carry the
/// location of the entry that failed validation.
#[derive(Error, Debug, Clone)]
pub enum LoadError {
    /// The file could not be read from disk
    #[error("Failed to read custom records file '{path}': {reason}")]
    FileUnreadable {
        /// Path that was read
        path: String,
        /// Underlying IO error
        reason: String,
    },

    /// The file is not valid JSON
    #[error("Custom records file is not valid JSON: {reason}")]
    MalformedJson {
        /// Parser error message
        reason: String,
    },

    /// The top-level JSON value is not an object
    #[error("Custom records file must contain a JSON object at the top level")]
    NotAnObject,

    /// A name maps to something other than an object keyed by record type
    #[error("Records for '{name}' must be an object keyed by record type")]
    InvalidNameEntry {
        /// The name (`@` or a label) from the file
        name: String,
    },

    /// A record type maps to something other than an array
    #[error("Records of type {rtype} under '{name}' must be an array")]
    InvalidTypeEntry {
        /// The name (`@` or a label) from the file
        name: String,
        /// The record type key from the file
        rtype: String,
    },

    /// The name or record type itself was rejected
    #[error("Custom records under '{name}' rejected: {source}")]
    RejectedName {
        /// The name (`@` or a label) from the file
        name: String,
        /// Reason for the rejection
        #[source]
        source: ValidationError,
    },

    /// A single record entry failed validation
    #[error("Invalid {rtype} record #{index} under '{name}': {source}")]
    RejectedRecord {
        /// The name (`@` or a label) from the file
        name: String,
        /// The record type key from the file
        rtype: RecordType,
        /// Zero-based position of the entry in its array
        index: usize,
        /// Reason for the rejection
        #[source]
        source: ValidationError,
    },
}

impl LoadError {
    /// Returns true if the file was structurally malformed (as opposed to
    /// well-formed but carrying invalid records).
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::FileUnreadable { .. }
                | Self::MalformedJson { .. }
                | Self::NotAnObject
                | Self::InvalidNameEntry { .. }
                | Self::InvalidTypeEntry { .. }
        )
    }
}

/// Errors raised by direct zone mutations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZoneError {
    /// The SOA is a dedicated field of the zone and only changes through the serial
    #[error("Record type {rtype} cannot be set through the record map of zone '{zone}'")]
    ReservedType {
        /// The zone being mutated
        zone: String,
        /// The rejected record type
        rtype: RecordType,
    },

    /// The record name does not belong to this zone
    #[error("Name '{name}' is outside zone '{zone}'")]
    OutOfZone {
        /// The rejected name
        name: String,
        /// The zone being mutated
        zone: String,
    },

    /// A value of one record type was stored under another
    #[error("Cannot store a {found} value as {expected} at '{name}'")]
    TypeMismatch {
        /// The owner name
        name: String,
        /// The record type of the entry
        expected: RecordType,
        /// The record type of the offending value
        found: RecordType,
    },

    /// The zone configuration is unusable
    #[error("Invalid zone configuration for '{zone}': {reason}")]
    InvalidConfiguration {
        /// The zone name with invalid configuration
        zone: String,
        /// Explanation of what is invalid
        reason: String,
    },
}

/// Errors related to the persisted zone serial.
#[derive(Error, Debug, Clone)]
pub enum SerialError {
    /// The key-value store could not be read
    #[error("Failed to read zone state from key '{key}': {source}")]
    ReadFailed {
        /// The persistence key
        key: String,
        /// Underlying store error
        #[source]
        source: StoreError,
    },

    /// The key-value store could not be written
    #[error("Failed to persist zone serial {serial} under key '{key}': {source}")]
    WriteFailed {
        /// The persistence key
        key: String,
        /// The serial that could not be written
        serial: u32,
        /// Underlying store error
        #[source]
        source: StoreError,
    },

    /// The fingerprint of the published zone could not be written
    #[error("Failed to record published zone fingerprint under key '{key}': {source}")]
    FingerprintWriteFailed {
        /// The persistence key
        key: String,
        /// Underlying store error
        #[source]
        source: StoreError,
    },

    /// The stored value is not a 32-bit unsigned integer
    #[error("Persisted zone serial '{value}' under key '{key}' is not a 32-bit unsigned integer")]
    Corrupt {
        /// The persistence key
        key: String,
        /// The value found in the store
        value: String,
    },
}

/// Errors reported by a backing store collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or failed the operation
    #[error("{store} unavailable: {reason}")]
    Unavailable {
        /// Which store failed (e.g. "domain registry")
        store: String,
        /// Underlying failure
        reason: String,
    },

    /// The store returned data that cannot be interpreted
    #[error("{store} returned corrupt data: {reason}")]
    Corrupt {
        /// Which store returned the data
        store: String,
        /// What was wrong with it
        reason: String,
    },
}

/// Errors raised while sending NOTIFY to a secondary server.
///
/// These are never fatal: secondaries recover through their own refresh timers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// A configured secondary is not of the form `host[:port]`
    #[error("Invalid secondary server '{server}': {reason}")]
    InvalidSecondary {
        /// The secondary as configured
        server: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// The secondary's host name did not resolve to an address
    #[error("Could not resolve secondary {server}: {reason}")]
    ResolveFailed {
        /// The secondary as configured (host:port)
        server: String,
        /// Resolver error
        reason: String,
    },

    /// The NOTIFY message could not be sent or no response arrived
    #[error("NOTIFY to {server} failed: {reason}")]
    SendFailed {
        /// The secondary address
        server: String,
        /// Transport error
        reason: String,
    },

    /// The secondary answered with a non-NOERROR response code
    #[error("NOTIFY to {server} rejected with response code {code}")]
    Rejected {
        /// The secondary address
        server: String,
        /// Response code returned by the secondary
        code: String,
    },
}

impl NotifyError {
    /// Stable reason code, used as the `status` label of NOTIFY metrics.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidSecondary { .. } => "NotifyInvalidSecondary",
            Self::ResolveFailed { .. } => "NotifyResolveFailed",
            Self::SendFailed { .. } => "NotifySendFailed",
            Self::Rejected { .. } => "NotifyRejected",
        }
    }
}

/// Composite error type that encompasses all errors of the DNS core.
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    /// Custom records file error
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Zone mutation error
    #[error(transparent)]
    Zone(#[from] ZoneError),

    /// Serial persistence error
    #[error(transparent)]
    Serial(#[from] SerialError),

    /// Backing store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// NOTIFY delivery error
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

impl CoreError {
    /// Returns true if the process must not go on serving the zone.
    ///
    /// Load and serial failures leave the zone in a state that cannot be
    /// claimed consistent toward secondaries. Store and NOTIFY failures only
    /// affect a single query or a single secondary.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Load(_) | Self::Serial(_) | Self::Zone(ZoneError::InvalidConfiguration { .. }) => {
                true
            }
            Self::Zone(
                ZoneError::ReservedType { .. }
                | ZoneError::OutOfZone { .. }
                | ZoneError::TypeMismatch { .. },
            )
            | Self::Store(_)
            | Self::Notify(_) => false,
        }
    }

    /// Returns a stable reason code for logs and metrics labels.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Load(err) if err.is_parse_error() => "CustomRecordsParseError",
            Self::Load(_) => "CustomRecordsValidationError",

            Self::Zone(ZoneError::ReservedType { .. }) => "ZoneReservedType",
            Self::Zone(ZoneError::OutOfZone { .. }) => "ZoneOutOfZone",
            Self::Zone(ZoneError::TypeMismatch { .. }) => "ZoneTypeMismatch",
            Self::Zone(ZoneError::InvalidConfiguration { .. }) => "ZoneInvalidConfiguration",

            Self::Serial(SerialError::ReadFailed { .. }) => "SerialReadFailed",
            Self::Serial(SerialError::WriteFailed { .. }) => "SerialWriteFailed",
            Self::Serial(SerialError::FingerprintWriteFailed { .. }) => {
                "SerialFingerprintWriteFailed"
            }
            Self::Serial(SerialError::Corrupt { .. }) => "SerialCorrupt",

            Self::Store(StoreError::Unavailable { .. }) => "StoreUnavailable",
            Self::Store(StoreError::Corrupt { .. }) => "StoreCorrupt",

            Self::Notify(err) => err.reason(),
        }
    }
}
