// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for name helpers.

#[cfg(test)]
mod tests {
    use crate::names::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("ALICE.Example.TEST."), "alice.example.test");
        assert_eq!(normalize_name("example.test"), "example.test");
        assert_eq!(normalize_name("@"), "@");
    }

    #[test]
    fn test_relative_to_origin() {
        assert_eq!(relative_to("example.test", "example.test"), Some(""));
        assert_eq!(relative_to("alice.example.test", "example.test"), Some("alice"));
        assert_eq!(
            relative_to("foo.bar.example.test", "example.test"),
            Some("foo.bar")
        );
    }

    #[test]
    fn test_relative_to_requires_label_boundary() {
        assert_eq!(relative_to("badexample.test", "example.test"), None);
        assert_eq!(relative_to("example.org", "example.test"), None);
        assert_eq!(relative_to("test", "example.test"), None);
    }

    #[test]
    fn test_split_single_label() {
        let path = split_label_path("alice").unwrap();

        assert_eq!(path.apex, "alice");
        assert_eq!(path.remainder, "@");
        assert!(path.is_apex());
    }

    #[test]
    fn test_split_nested_labels() {
        let path = split_label_path("foo.bar").unwrap();
        assert_eq!(path.apex, "bar");
        assert_eq!(path.remainder, "foo");
        assert!(!path.is_apex());

        let deep = split_label_path("a.b.c").unwrap();
        assert_eq!(deep.apex, "c");
        assert_eq!(deep.remainder, "a.b");
    }

    #[test]
    fn test_split_rejects_empty() {
        assert_eq!(split_label_path(""), None);
        assert_eq!(split_label_path("foo..bar"), None);
        assert_eq!(split_label_path(".bar"), None);
    }

    #[test]
    fn test_absolute_name() {
        assert_eq!(absolute_name("@", "example.test"), "example.test");
        assert_eq!(absolute_name("WWW", "example.test"), "www.example.test");
        assert_eq!(absolute_name("_dmarc", "example.test"), "_dmarc.example.test");
    }
}
