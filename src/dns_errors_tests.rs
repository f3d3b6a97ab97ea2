// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for DNS error types.

#[cfg(test)]
mod tests {
    use crate::dns_errors::*;
    use crate::records::RecordType;

    #[test]
    fn test_reserved_apex_type_error() {
        let error = ValidationError::ReservedApexType(RecordType::CNAME);

        assert_eq!(
            error.to_string(),
            "record type CNAME is not allowed at '@' (reserved for dynamic update answers)"
        );
    }

    #[test]
    fn test_rejected_record_error_carries_location() {
        let error = LoadError::RejectedRecord {
            name: "www".to_string(),
            rtype: RecordType::MX,
            index: 2,
            source: ValidationError::InvalidPayload {
                rtype: RecordType::MX,
                reason: "missing field `exchange`".to_string(),
            },
        };

        assert_eq!(
            error.to_string(),
            "Invalid MX record #2 under 'www': invalid MX payload: missing field `exchange`"
        );
        assert!(!error.is_parse_error());
    }

    #[test]
    fn test_load_parse_errors() {
        assert!(LoadError::NotAnObject.is_parse_error());
        assert!(LoadError::MalformedJson {
            reason: "EOF".to_string()
        }
        .is_parse_error());
        assert!(LoadError::InvalidTypeEntry {
            name: "@".to_string(),
            rtype: "TXT".to_string(),
        }
        .is_parse_error());
    }

    #[test]
    fn test_serial_write_failed_error() {
        let error = SerialError::WriteFailed {
            key: "dns_soa_serial".to_string(),
            serial: 42,
            source: StoreError::Unavailable {
                store: "state file".to_string(),
                reason: "disk full".to_string(),
            },
        };

        assert_eq!(
            error.to_string(),
            "Failed to persist zone serial 42 under key 'dns_soa_serial': state file unavailable: disk full"
        );
    }

    #[test]
    fn test_notify_rejected_error() {
        let error = NotifyError::Rejected {
            server: "192.0.2.1:53".to_string(),
            code: "Refused".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "NOTIFY to 192.0.2.1:53 rejected with response code Refused"
        );
        assert_eq!(error.reason(), "NotifyRejected");
    }

    // ========================================================================
    // CoreError classification
    // ========================================================================

    #[test]
    fn test_load_and_serial_errors_are_fatal() {
        let load: CoreError = LoadError::NotAnObject.into();
        let serial: CoreError = SerialError::Corrupt {
            key: "dns_soa_serial".to_string(),
            value: "abc".to_string(),
        }
        .into();
        let config: CoreError = ZoneError::InvalidConfiguration {
            zone: "example.test".to_string(),
            reason: "bad".to_string(),
        }
        .into();

        assert!(load.is_fatal());
        assert!(serial.is_fatal());
        assert!(config.is_fatal());
    }

    #[test]
    fn test_store_and_notify_errors_are_not_fatal() {
        let store: CoreError = StoreError::Unavailable {
            store: "domain registry".to_string(),
            reason: "timeout".to_string(),
        }
        .into();
        let notify: CoreError = NotifyError::SendFailed {
            server: "192.0.2.1:53".to_string(),
            reason: "timed out".to_string(),
        }
        .into();

        assert!(!store.is_fatal());
        assert!(!notify.is_fatal());
    }

    #[test]
    fn test_core_error_reason_codes() {
        let cases: Vec<(CoreError, &str)> = vec![
            (LoadError::NotAnObject.into(), "CustomRecordsParseError"),
            (
                LoadError::RejectedName {
                    name: "@".to_string(),
                    source: ValidationError::ReservedType(RecordType::NS),
                }
                .into(),
                "CustomRecordsValidationError",
            ),
            (
                ZoneError::TypeMismatch {
                    name: "www.example.test".to_string(),
                    expected: RecordType::A,
                    found: RecordType::TXT,
                }
                .into(),
                "ZoneTypeMismatch",
            ),
            (
                StoreError::Corrupt {
                    store: "state file".to_string(),
                    reason: "not JSON".to_string(),
                }
                .into(),
                "StoreCorrupt",
            ),
            (
                SerialError::FingerprintWriteFailed {
                    key: "dns_zone_fingerprint".to_string(),
                    source: StoreError::Unavailable {
                        store: "state file".to_string(),
                        reason: "disk full".to_string(),
                    },
                }
                .into(),
                "SerialFingerprintWriteFailed",
            ),
            (
                NotifyError::InvalidSecondary {
                    server: "host:port".to_string(),
                    reason: "invalid port".to_string(),
                }
                .into(),
                "NotifyInvalidSecondary",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.reason(), expected, "reason for {error}");
        }
    }

    #[test]
    fn test_core_error_is_transparent() {
        let error: CoreError = ZoneError::OutOfZone {
            name: "example.org".to_string(),
            zone: "example.test".to_string(),
        }
        .into();

        assert_eq!(
            error.to_string(),
            "Name 'example.org' is outside zone 'example.test'"
        );
    }
}
