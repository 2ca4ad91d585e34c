// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for payload assembly and additional parameter merging.

#[cfg(test)]
mod tests {
    use crate::object_map::{rule_entry, RecordKind, RuleTarget};
    use crate::payload::*;
    use crate::validation::JsonText;
    use serde_json::{json, Map, Value};

    fn cname_payload() -> Payload {
        let entry = rule_entry(RecordKind::Cname, RuleTarget::DomainName).unwrap();
        let mut payload = Payload::new(entry);
        payload
            .set("name", "bad.com.rpz.local")
            .set("rp_zone", "rpz.local")
            .set("canonical", "*");
        payload
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_conflict_on_typed_field() {
        let mut payload = cname_payload();
        let err = payload.merge(object(json!({"name": "x"}))).unwrap_err();
        assert_eq!(err.kind(), "ConflictError");
        assert_eq!(payload.get("name"), Some(&json!("bad.com.rpz.local")));
    }

    #[test]
    fn test_unset_optional_field_is_added() {
        let mut payload = cname_payload();
        payload.merge(object(json!({"ttl": 3600}))).unwrap();
        assert_eq!(payload.into_value()["ttl"], json!(3600));
    }

    #[test]
    fn test_optional_field_type_checked() {
        let mut payload = cname_payload();
        let err = payload
            .merge(object(json!({"disable": "yes"})))
            .unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
        assert!(err.to_string().contains("'disable'"));

        assert!(payload.merge(object(json!({"ttl": -5}))).is_err());
    }

    #[test]
    fn test_failed_merge_leaves_payload_untouched() {
        let mut payload = cname_payload();
        let before = payload.clone();
        assert!(payload
            .merge(object(json!({"ttl": 60, "canonical": "evil.com"})))
            .is_err());
        assert_eq!(payload, before);
    }

    #[test]
    fn test_extras_pass_through_when_accepted() {
        let mut payload = cname_payload();
        payload
            .merge(object(json!({"use_ttl": true, "custom_field": {"a": 1}})))
            .unwrap();
        let body = payload.into_value();
        assert_eq!(body["use_ttl"], json!(true));
        assert_eq!(body["custom_field"], json!({"a": 1}));
    }

    #[test]
    fn test_closed_entry_rejects_unknown_field() {
        let entry = rule_entry(RecordKind::Srv, RuleTarget::DomainName).unwrap();
        let mut payload = Payload::new(entry);
        payload.set("name", "_sip._tcp.bad.com.rpz.local");

        let err = payload
            .merge(object(json!({"flags": "U"})))
            .unwrap_err();
        assert_eq!(err.kind(), "ValidationError");

        payload.merge(object(json!({"view": "internal"}))).unwrap();
    }

    #[test]
    fn test_merge_additional_parses_text() {
        let mut payload = cname_payload();
        payload
            .merge_additional(Some(JsonText::Text("{\"comment\": \"from json\"}".into())))
            .unwrap();
        assert_eq!(payload.get("comment"), Some(&json!("from json")));

        let err = payload
            .merge_additional(Some(JsonText::Text("{not json".into())))
            .unwrap_err();
        assert_eq!(err.kind(), "ParseError");

        assert!(payload.merge_additional(None).is_ok());
    }

    #[test]
    fn test_default_field_respects_additional_parameters() {
        let mut payload = cname_payload();
        payload.merge(object(json!({"view": "internal"}))).unwrap();
        payload.default_field("view", "default");
        assert_eq!(payload.into_value()["view"], json!("internal"));

        let mut payload = cname_payload();
        payload.default_field("view", "default");
        assert_eq!(payload.into_value()["view"], json!("default"));
    }

    #[test]
    fn test_set_opt_skips_none() {
        let mut payload = cname_payload();
        payload.set_opt("comment", None::<String>);
        assert!(!payload.contains("comment"));
        payload.set_opt("comment", Some("blocked"));
        assert!(payload.contains("comment"));
    }
}
