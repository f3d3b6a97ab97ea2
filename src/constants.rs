// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the NowIP DNS core.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// DNS Protocol Constants
// ============================================================================

/// Standard DNS port for queries and NOTIFY messages
pub const DNS_PORT: u16 = 53;

/// Marker for the apex of a zone or registered domain
pub const APEX_LABEL: &str = "@";

/// Maximum length of a single DNS label in octets
pub const MAX_LABEL_LENGTH: usize = 63;

/// Maximum length of a DNS name in presentation format
pub const MAX_NAME_LENGTH: usize = 253;

// ============================================================================
// TTL Constants
// ============================================================================

/// TTL of answers synthesized from dynamic-update addresses (5 minutes)
pub const DYNAMIC_RECORD_TTL_SECS: u32 = 300;

/// TTL applied to stored records that do not carry their own (5 minutes)
pub const DEFAULT_DNS_RECORD_TTL_SECS: u32 = 300;

/// TTL of the apex SOA and NS records (1 hour)
pub const DEFAULT_ZONE_TTL_SECS: u32 = 3600;

// ============================================================================
// SOA Constants
// ============================================================================

/// Default SOA refresh interval (1 hour)
pub const DEFAULT_SOA_REFRESH_SECS: u32 = 3600;

/// Default SOA retry interval (10 minutes)
pub const DEFAULT_SOA_RETRY_SECS: u32 = 600;

/// Default SOA expire time (7 days)
pub const DEFAULT_SOA_EXPIRE_SECS: u32 = 604_800;

/// Default SOA negative TTL (1 day)
pub const DEFAULT_SOA_MINIMUM_SECS: u32 = 86400;

/// Label prepended to the primary nameserver to build the SOA admin contact
pub const SOA_ADMIN_LABEL: &str = "admin";

// ============================================================================
// Persistence Constants
// ============================================================================

/// Key under which the zone serial is persisted
pub const SERIAL_STORE_KEY: &str = "dns_soa_serial";

/// Key under which the fingerprint of the zone published at that serial is persisted
pub const FINGERPRINT_STORE_KEY: &str = "dns_zone_fingerprint";

/// Default location of the JSON state file used by the operator tool
pub const DEFAULT_STATE_FILE: &str = "./data/dns-state.json";

// ============================================================================
// NOTIFY Constants
// ============================================================================

/// Upper bound for a single NOTIFY exchange with a secondary (5 seconds)
pub const NOTIFY_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;
