// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Pure helpers for DNS name handling.
//!
//! Names are compared case-insensitively: every helper here works on the
//! normalized form (ASCII lowercase, no trailing dot) produced by
//! [`normalize_name`].

use crate::constants::APEX_LABEL;

/// A relative name split into the registered domain and the labels below it.
///
/// For `foo.bar` relative to the zone, `apex` is `bar` and `remainder` is
/// `foo`. For `bar` alone, `remainder` is the apex marker `@`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LabelPath<'a> {
    /// The single label closest to the zone root
    pub apex: &'a str,
    /// Everything to the left of the apex label, or `@`
    pub remainder: &'a str,
}

impl LabelPath<'_> {
    /// True when the query targets the registered domain itself.
    #[must_use]
    pub fn is_apex(&self) -> bool {
        self.remainder == APEX_LABEL
    }
}

/// Lowercase a name and strip one trailing dot.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.strip_suffix('.').unwrap_or(name).to_ascii_lowercase()
}

/// Strip `origin` from `name` on a label boundary.
///
/// Both arguments must already be normalized. Returns `Some("")` when the
/// name is the origin itself and `None` when the name lies outside it.
/// A plain suffix match is not enough: `badexample.test` is not inside
/// `example.test`.
#[must_use]
pub fn relative_to<'a>(name: &'a str, origin: &str) -> Option<&'a str> {
    if name == origin {
        return Some("");
    }
    name.strip_suffix(origin)?.strip_suffix('.')
}

/// Split a relative name into apex label and remainder.
///
/// Returns `None` for the empty name (the zone origin) and for names with
/// empty labels.
#[must_use]
pub fn split_label_path(relative: &str) -> Option<LabelPath<'_>> {
    if relative.is_empty() || relative.split('.').any(str::is_empty) {
        return None;
    }

    match relative.rsplit_once('.') {
        Some((remainder, apex)) => Some(LabelPath { apex, remainder }),
        None => Some(LabelPath {
            apex: relative,
            remainder: APEX_LABEL,
        }),
    }
}

/// Build the normalized absolute name for a relative name (`@` for the origin).
#[must_use]
pub fn absolute_name(relative: &str, origin: &str) -> String {
    if relative == APEX_LABEL || relative.is_empty() {
        origin.to_string()
    } else {
        format!("{}.{origin}", normalize_name(relative))
    }
}

#[cfg(test)]
#[path = "names_tests.rs"]
mod names_tests;
