// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for action error types.

#[cfg(test)]
mod tests {
    use crate::errors::*;

    #[test]
    fn test_validation_error_message() {
        let error = ActionError::validation("port", "must be between 0 and 65535");

        assert_eq!(
            error.to_string(),
            "Invalid parameter 'port': must be between 0 and 65535"
        );
        assert_eq!(error.kind(), "ValidationError");
        assert!(error.is_local());
    }

    #[test]
    fn test_parse_error_message() {
        let error = ActionError::parse("additional_parameters", "expected value at line 1");

        assert_eq!(
            error.to_string(),
            "Failed to parse 'additional_parameters': expected value at line 1"
        );
        assert_eq!(error.kind(), "ParseError");
    }

    #[test]
    fn test_mapping_error_message() {
        let error = ActionError::Mapping {
            rule_type: "A".to_string(),
            object_type: "Client IP Address".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "No object type mapping for rule type 'A' and object type 'Client IP Address'"
        );
        assert_eq!(error.kind(), "MappingError");
    }

    #[test]
    fn test_duplicate_attribute_error_message() {
        let error = ActionError::DuplicateAttribute {
            key: "Site".to_string(),
        };

        assert_eq!(error.to_string(), "Duplicate extended attribute 'Site'");
        assert_eq!(error.kind(), "DuplicateAttributeError");
    }

    #[test]
    fn test_conflict_error_message() {
        let error = ActionError::Conflict {
            field: "name".to_string(),
        };

        assert!(error.to_string().contains("'name'"));
        assert_eq!(error.kind(), "ConflictError");
    }

    #[test]
    fn test_remote_error_is_verbatim() {
        let remote = RemoteError::http(400, "AdmConDataError: None (IBDataConflictError)");
        let error: ActionError = remote.into();

        assert_eq!(
            error.to_string(),
            "AdmConDataError: None (IBDataConflictError)"
        );
        assert_eq!(error.kind(), "RemoteError");
        assert!(!error.is_local());
    }

    #[test]
    fn test_transport_error_has_no_status() {
        let remote = RemoteError::transport("connection refused");
        assert_eq!(remote.status, None);
        assert_eq!(remote.to_string(), "connection refused");
    }
}
