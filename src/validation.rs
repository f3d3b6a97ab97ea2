// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Name and placement validation for records entering the zone.
//!
//! Hostname rules follow RFC 1035 with the usual relaxations: labels of
//! letters, digits, hyphens and underscores, 1 to 63 octets, no leading or
//! trailing hyphen, at most 253 octets in total. A single trailing dot is
//! accepted.

use crate::constants::{APEX_LABEL, MAX_LABEL_LENGTH, MAX_NAME_LENGTH};
use crate::dns_errors::ValidationError;
use crate::records::{RecordType, RecordValue};
use hickory_proto::rr::Name;

/// Validate a fully qualified or relative hostname.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidName`] describing the first violation.
pub fn validate_hostname(hostname: &str) -> Result<(), ValidationError> {
    let trimmed = hostname.strip_suffix('.').unwrap_or(hostname);
    validate_labels(hostname, trimmed)?;

    Name::from_ascii(hostname).map_err(|e| invalid_name(hostname, e.to_string()))?;
    Ok(())
}

/// Validate a name relative to a zone or registered domain.
///
/// `@` is accepted as the apex marker. Anything else must be one or more
/// dot-separated labels without a trailing dot.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidName`] describing the first violation.
pub fn validate_relative_name(name: &str) -> Result<(), ValidationError> {
    if name == APEX_LABEL {
        return Ok(());
    }
    if name.ends_with('.') {
        return Err(invalid_name(name, "relative names must not end with a dot"));
    }
    validate_labels(name, name)
}

/// Reject record types that end users and operators may not supply at all.
///
/// # Errors
///
/// Returns [`ValidationError::ReservedType`] for SOA, NS and PTR.
pub fn ensure_user_suppliable(rtype: RecordType) -> Result<(), ValidationError> {
    if rtype.is_zone_managed() {
        return Err(ValidationError::ReservedType(rtype));
    }
    Ok(())
}

/// Enforce the apex reservation: no A, AAAA or CNAME at `@`.
///
/// # Errors
///
/// Returns [`ValidationError::ReservedApexType`] when the rule is violated.
pub fn ensure_placement_allowed(label: &str, rtype: RecordType) -> Result<(), ValidationError> {
    if label == APEX_LABEL && rtype.is_apex_reserved() {
        return Err(ValidationError::ReservedApexType(rtype));
    }
    Ok(())
}

/// Check an additional record before the management API stores it.
///
/// Applies the same rules the resolver relies on: a valid sub-label, a type
/// users may supply, and the apex reservation.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered.
pub fn validate_additional_record(sub_label: &str, value: &RecordValue) -> Result<(), ValidationError> {
    validate_relative_name(sub_label)?;
    let rtype = value.record_type();
    ensure_user_suppliable(rtype)?;
    ensure_placement_allowed(sub_label, rtype)
}

fn validate_labels(original: &str, name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(invalid_name(original, "name cannot be empty"));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(invalid_name(
            original,
            format!("name exceeds {MAX_NAME_LENGTH} characters"),
        ));
    }

    for label in name.split('.') {
        if label.is_empty() {
            return Err(invalid_name(original, "empty label (consecutive dots)"));
        }
        if label.len() > MAX_LABEL_LENGTH {
            return Err(invalid_name(
                original,
                format!("label '{label}' exceeds {MAX_LABEL_LENGTH} characters"),
            ));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(invalid_name(
                original,
                format!("label '{label}' cannot start or end with a hyphen"),
            ));
        }
        if let Some(c) = label
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(invalid_name(
                original,
                format!("label '{label}' contains invalid character '{c}'"),
            ));
        }
    }
    Ok(())
}

fn invalid_name(name: &str, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod validation_tests;
