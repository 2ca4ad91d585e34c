// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the result envelope.

#[cfg(test)]
mod tests {
    use crate::errors::{ActionError, RemoteError};
    use crate::result::{
        add_extattrs_display, describe_filters, join_list, join_nested, ActionOutput,
        ActionResult, ActionStatus, Summary,
    };
    use serde_json::json;

    #[test]
    fn test_single_summary() {
        let summary = Summary::single().with("reference_id", "zone_rp/x");
        assert_eq!(summary.get("total_objects"), Some(&json!(1)));
        assert_eq!(summary.get("total_objects_successful"), Some(&json!(1)));
        assert_eq!(summary.get("reference_id"), Some(&json!("zone_rp/x")));
    }

    #[test]
    fn test_listing_counts_well_formed_objects() {
        let data = vec![json!({"a": 1}), json!("stray"), json!({"b": 2})];
        let summary = Summary::listing(&data);
        assert_eq!(summary.get("total_objects"), Some(&json!(3)));
        assert_eq!(summary.get("total_objects_successful"), Some(&json!(2)));
    }

    #[test]
    fn test_empty_listing() {
        let summary = Summary::listing(&[]);
        assert_eq!(summary.get("total_objects"), Some(&json!(0)));
        assert_eq!(summary.get("total_objects_successful"), Some(&json!(0)));
    }

    #[test]
    fn test_success_serializes_four_parts() {
        let result = ActionResult::success(
            "get_response_policy_zone",
            json!({"fqdn": "rpz.local"}),
            ActionOutput::new(
                vec![json!({"fqdn": "rpz.local"})],
                Summary::listing(&[json!({})]),
                "Successfully retrieved 1 response policy zone(s)",
            ),
        );

        assert!(result.is_success());
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["parameters"]["fqdn"], "rpz.local");
        assert_eq!(value["data"][0]["fqdn"], "rpz.local");
        assert_eq!(value["summary"]["total_objects"], 1);
        assert_eq!(
            value["message"],
            "Successfully retrieved 1 response policy zone(s)"
        );
    }

    #[test]
    fn test_failure_records_kind_and_status() {
        let err: ActionError = RemoteError::http(400, "Zone already exists").into();
        let result = ActionResult::failure(
            "create_response_policy_zone",
            json!({}),
            &err,
            err.to_string(),
        );

        assert_eq!(result.status, ActionStatus::Failure);
        assert!(result.data.is_empty());
        assert_eq!(result.message, "Zone already exists");
        assert_eq!(result.summary["error_kind"], "RemoteError");
        assert_eq!(result.summary["http_status"], 400);
        assert_eq!(result.summary["total_objects"], 0);
    }

    #[test]
    fn test_local_failure_has_no_http_status() {
        let err = ActionError::validation("limit", "please provide a non-zero positive integer value");
        let result = ActionResult::failure("ip_lookup", json!({"limit": 0}), &err, err.to_string());
        assert_eq!(result.summary["error_kind"], "ValidationError");
        assert!(!result.summary.contains_key("http_status"));
    }

    #[test]
    fn test_extattrs_display_added() {
        let mut object = json!({"extattrs": {"Site": {"value": "HQ"}}});
        add_extattrs_display(&mut object);
        assert_eq!(object["extattrs_display"], "Site=HQ");

        let mut bare = json!({"name": "x"});
        add_extattrs_display(&mut bare);
        assert_eq!(bare["extattrs_display"], "");
    }

    #[test]
    fn test_join_helpers() {
        assert_eq!(join_list(Some(&json!(["HOST", "A"]))), "HOST, A");
        assert_eq!(join_list(Some(&json!("DHCP"))), "DHCP");
        assert_eq!(join_list(None), "");

        let addrs = json!([{"ipv4addr": "10.0.0.1"}, {"ipv4addr": "10.0.0.2"}]);
        assert_eq!(join_nested(Some(&addrs), "ipv4addr"), "10.0.0.1, 10.0.0.2");
        assert_eq!(join_nested(None, "ipv4addr"), "");
    }

    #[test]
    fn test_describe_filters() {
        assert_eq!(describe_filters(&[]), "None");
        assert_eq!(
            describe_filters(&[
                ("IP Address", "10.0.0.1".to_string()),
                ("Status", "USED".to_string())
            ]),
            "IP Address: 10.0.0.1; Status: USED"
        );
    }
}
