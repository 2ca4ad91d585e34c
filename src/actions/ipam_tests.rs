// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for IPAM actions.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::actions::test_support::{
        created_payload, has_filter, list_query, run, run_with, RecordingGateway,
    };
    use serde_json::json;

    // ========================================================================
    // ip_lookup
    // ========================================================================

    #[tokio::test]
    async fn test_ip_lookup_single_address() {
        let gateway = Arc::new(RecordingGateway::with_objects(vec![json!({
            "_ref": "ipv4address/Li5pcHY0X2FkZHJlc3Mk:192.168.1.100",
            "ip_address": "192.168.1.100",
            "status": "USED",
            "types": ["HOST", "A"],
            "names": ["web01.example.com"],
            "mac_address": "00:11:22:33:44:55",
            "extattrs": {"Site": {"value": "HQ"}}
        })]));

        let result = run_with(
            &gateway,
            "ip_lookup",
            json!({"ip_address": "192.168.1.100", "status": "ACTIVE"}),
        )
        .await;

        assert!(result.is_success(), "{}", result.message);
        assert_eq!(result.message, "Successfully retrieved 1 IP record(s)");
        assert_eq!(result.summary["total_ip_records"], 1);
        assert_eq!(
            result.summary["filters_applied"],
            "IP Address: 192.168.1.100; Status: ACTIVE"
        );

        let record = &result.data[0];
        assert_eq!(record["types_display"], "HOST, A");
        assert_eq!(record["names_display"], "web01.example.com");
        assert_eq!(record["usage_display"], "");
        assert_eq!(record["mac_address_duid"], "00:11:22:33:44:55");
        assert_eq!(record["extattrs_display"], "Site=HQ");

        let query = list_query(&gateway);
        assert_eq!(query.object_type, "ipv4address");
        assert!(has_filter(&query, "ip_address", "192.168.1.100"));
        assert!(has_filter(&query, "status", "ACTIVE"));
    }

    #[tokio::test]
    async fn test_ip_lookup_status_all_adds_no_filter() {
        let (result, gateway) = run(
            "ip_lookup",
            json!({"network": "10.0.0.0/24", "status": "ALL"}),
        )
        .await;

        assert!(result.is_success(), "{}", result.message);
        let query = list_query(&gateway);
        assert!(has_filter(&query, "network", "10.0.0.0/24"));
        assert!(!query.filters.iter().any(|(k, _)| k == "status"));
    }

    #[tokio::test]
    async fn test_ip_lookup_ipv6_range() {
        let (result, gateway) = run(
            "ip_lookup",
            json!({"from_ip": "2001:db8::1", "to_ip": "2001:db8::ff"}),
        )
        .await;

        assert!(result.is_success(), "{}", result.message);
        assert_eq!(
            result.summary["filters_applied"],
            "IP Range: 2001:db8::1 - 2001:db8::ff"
        );

        let query = list_query(&gateway);
        assert_eq!(query.object_type, "ipv6address");
        assert!(has_filter(&query, "ip_address>", "2001:db8::1"));
        assert!(has_filter(&query, "ip_address<", "2001:db8::ff"));
    }

    #[tokio::test]
    async fn test_ip_lookup_extattr_filters() {
        let (result, gateway) = run(
            "ip_lookup",
            json!({"ip_address": "10.1.1.1", "extended_attributes": "Site=HQ,Owner=netops"}),
        )
        .await;

        assert!(result.is_success(), "{}", result.message);
        let query = list_query(&gateway);
        assert!(has_filter(&query, "*Site", "HQ"));
        assert!(has_filter(&query, "*Owner", "netops"));
    }

    #[tokio::test]
    async fn test_ip_lookup_requires_one_selector() {
        let (result, gateway) = run("ip_lookup", json!({"status": "USED"})).await;
        assert_eq!(result.summary["error_kind"], "ValidationError");
        assert!(gateway.calls().is_empty());

        let (result, gateway) = run(
            "ip_lookup",
            json!({"ip_address": "10.0.0.1", "network": "10.0.0.0/24"}),
        )
        .await;
        assert_eq!(result.summary["error_kind"], "ValidationError");
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_ip_lookup_rejects_unknown_status() {
        let (result, gateway) = run(
            "ip_lookup",
            json!({"ip_address": "10.0.0.1", "status": "FREE"}),
        )
        .await;
        assert_eq!(result.summary["error_kind"], "ValidationError");
        assert!(result.message.contains("status"));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_ip_lookup_duplicate_extattr_key() {
        let (result, gateway) = run(
            "ip_lookup",
            json!({"ip_address": "10.0.0.1", "extended_attributes": "Site=HQ,Site=DR"}),
        )
        .await;
        assert_eq!(result.summary["error_kind"], "DuplicateAttributeError");
        assert!(gateway.calls().is_empty());
    }

    // ========================================================================
    // list_host_info
    // ========================================================================

    #[tokio::test]
    async fn test_list_hosts_display_and_flags() {
        let gateway = Arc::new(RecordingGateway::with_objects(vec![json!({
            "_ref": "record:host/ZG5z:web01.example.com/default",
            "name": "web01.example.com",
            "ipv4addrs": [{"ipv4addr": "10.0.0.5"}, {"ipv4addr": "10.0.0.6"}],
            "ipv6addrs": [{"ipv6addr": "2001:db8::5"}]
        })]));

        let result = run_with(
            &gateway,
            "list_host_info",
            json!({"name": "web01.example.com", "ipv4_address": "10.0.0.5"}),
        )
        .await;

        assert!(result.is_success(), "{}", result.message);
        assert_eq!(result.message, "Successfully retrieved 1 host record(s)");
        assert_eq!(result.data[0]["ipv4addrs_display"], "10.0.0.5, 10.0.0.6");
        assert_eq!(result.data[0]["ipv6addrs_display"], "2001:db8::5");
        assert_eq!(result.summary["limit"], 1000);
        assert_eq!(result.summary["name_filter_applied"], true);
        assert_eq!(result.summary["ipv4_filter_applied"], true);
        assert_eq!(result.summary["ipv6_filter_applied"], false);
        assert_eq!(result.summary["extended_attributes_filter_applied"], false);

        let query = list_query(&gateway);
        assert_eq!(query.object_type, "record:host");
        assert!(has_filter(&query, "name", "web01.example.com"));
        assert!(has_filter(&query, "ipv4addr", "10.0.0.5"));
    }

    #[tokio::test]
    async fn test_list_hosts_rejects_bad_ipv6() {
        let (result, gateway) = run("list_host_info", json!({"ipv6_address": "10.0.0.1"})).await;
        assert_eq!(result.summary["error_kind"], "ValidationError");
        assert!(gateway.calls().is_empty());
    }

    // ========================================================================
    // list_network_info
    // ========================================================================

    #[tokio::test]
    async fn test_list_networks_display() {
        let gateway = Arc::new(RecordingGateway::with_objects(vec![json!({
            "network": "10.0.0.0/24",
            "members": [
                {"_struct": "dhcpmember", "name": "dhcp1.example.com", "ipv4addr": "10.0.0.2"},
                {"_struct": "msdhcpserver", "ipv4addr": "10.0.0.3"}
            ],
            "options": [
                {"name": "routers", "num": 3, "value": "10.0.0.1"},
                {"name": "domain-name", "num": 15, "value": "example.com"}
            ]
        })]));

        let result = run_with(
            &gateway,
            "list_network_info",
            json!({"network": "10.0.0.0/24", "limit": 5}),
        )
        .await;

        assert!(result.is_success(), "{}", result.message);
        assert_eq!(result.message, "Successfully retrieved 1 network record(s)");
        assert_eq!(
            result.data[0]["members_display"],
            "dhcp1.example.com, 10.0.0.3"
        );
        assert_eq!(
            result.data[0]["options_display"],
            "routers=10.0.0.1, domain-name=example.com"
        );
        assert_eq!(result.summary["limit"], 5);

        let query = list_query(&gateway);
        assert_eq!(query.object_type, "network");
        assert!(has_filter(&query, "network", "10.0.0.0/24"));
        assert_eq!(query.limit, Some(5));
    }

    #[tokio::test]
    async fn test_list_networks_rejects_bad_cidr() {
        let (result, gateway) = run("list_network_info", json!({"network": "10.0.0.0/33"})).await;
        assert_eq!(result.summary["error_kind"], "ValidationError");
        assert!(gateway.calls().is_empty());
    }

    // ========================================================================
    // dhcp_lease_lookup
    // ========================================================================

    #[tokio::test]
    async fn test_lease_lookup_filters() {
        let gateway = Arc::new(RecordingGateway::with_objects(vec![json!({
            "address": "10.0.0.50",
            "hardware": "00:11:22:33:44:55",
            "starts": 0,
            "ends": 86_400
        })]));

        let result = run_with(
            &gateway,
            "dhcp_lease_lookup",
            json!({
                "ip_address": "10.0.0.50",
                "hostname": "laptop-42",
                "protocol": "IPV4"
            }),
        )
        .await;

        assert!(result.is_success(), "{}", result.message);
        assert_eq!(
            result.message,
            "Successfully retrieved 1 DHCP lease record(s)"
        );
        assert_eq!(result.summary["total_lease_records"], 1);
        assert_eq!(
            result.summary["filters_applied"],
            "IP Address: 10.0.0.50; Hostname: laptop-42; Protocol: IPV4"
        );
        assert_eq!(result.data[0]["starts_display"], "1970-01-01T00:00:00+00:00");
        assert_eq!(result.data[0]["ends_display"], "1970-01-02T00:00:00+00:00");
        assert!(result.data[0].get("cltt_display").is_none());

        let query = list_query(&gateway);
        assert_eq!(query.object_type, "lease");
        assert!(has_filter(&query, "address", "10.0.0.50"));
        assert!(has_filter(&query, "client_hostname", "laptop-42"));
        assert!(has_filter(&query, "protocol", "IPV4"));
    }

    #[tokio::test]
    async fn test_lease_lookup_hardware_regex_and_both_protocol() {
        let (result, gateway) = run(
            "dhcp_lease_lookup",
            json!({"hardware": "~^00:11", "protocol": "BOTH"}),
        )
        .await;

        assert!(result.is_success(), "{}", result.message);
        assert_eq!(result.summary["filters_applied"], "Hardware: ^00:11");

        let query = list_query(&gateway);
        assert!(has_filter(&query, "hardware~", "^00:11"));
        assert!(!query.filters.iter().any(|(k, _)| k == "protocol"));
    }

    #[tokio::test]
    async fn test_lease_lookup_without_filters() {
        let (result, gateway) = run("dhcp_lease_lookup", json!({})).await;

        assert!(result.is_success(), "{}", result.message);
        assert_eq!(result.summary["filters_applied"], "None");
        assert!(list_query(&gateway).filters.is_empty());
    }

    #[tokio::test]
    async fn test_lease_lookup_rejects_bad_hardware() {
        let (result, gateway) = run("dhcp_lease_lookup", json!({"hardware": "not-a-mac"})).await;
        assert_eq!(result.summary["error_kind"], "ValidationError");
        assert!(gateway.calls().is_empty());
    }

    // ========================================================================
    // create_host_record
    // ========================================================================

    #[tokio::test]
    async fn test_create_host_payload() {
        let (result, gateway) = run(
            "create_host_record",
            json!({
                "name": "web01.example.com",
                "ipv4_addresses": "[{\"ipv4addr\": \"10.0.0.5\", \"mac\": \"00:11:22:33:44:55\"}]",
                "ipv6_addresses": ["2001:db8::5"],
                "aliases": "www.example.com, web.example.com",
                "configure_for_dns": true,
                "extended_attributes": "Site=HQ"
            }),
        )
        .await;

        assert!(result.is_success(), "{}", result.message);
        let (object_type, payload) = created_payload(&gateway);
        assert_eq!(object_type, "record:host");
        assert_eq!(payload["name"], "web01.example.com");
        assert_eq!(payload["ipv4addrs"][0]["ipv4addr"], "10.0.0.5");
        assert_eq!(payload["ipv4addrs"][0]["mac"], "00:11:22:33:44:55");
        assert_eq!(payload["ipv6addrs"][0]["ipv6addr"], "2001:db8::5");
        assert_eq!(
            payload["aliases"],
            json!(["www.example.com", "web.example.com"])
        );
        assert_eq!(payload["configure_for_dns"], true);
        assert_eq!(payload["extattrs"]["Site"]["value"], "HQ");

        assert_eq!(
            result.message,
            "Successfully created Host Record. Reference ID: record:host/ZG5zLmZha2U:created/default"
        );
        assert_eq!(result.summary["name"], "web01.example.com");
        assert_eq!(result.data[0]["ipv4addrs_display"], "10.0.0.5");
    }

    #[tokio::test]
    async fn test_create_host_requires_an_address() {
        let (result, gateway) = run(
            "create_host_record",
            json!({"name": "web01.example.com", "ipv4_addresses": "[]"}),
        )
        .await;
        assert_eq!(result.summary["error_kind"], "ValidationError");
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_host_rejects_bad_mac() {
        let (result, gateway) = run(
            "create_host_record",
            json!({
                "name": "web01.example.com",
                "ipv4_addresses": [{"ipv4addr": "10.0.0.5", "mac": "001122334455"}]
            }),
        )
        .await;
        assert_eq!(result.summary["error_kind"], "ValidationError");
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_host_rejects_non_array_addresses() {
        let (result, gateway) = run(
            "create_host_record",
            json!({"name": "web01.example.com", "ipv4_addresses": "{\"ipv4addr\": \"10.0.0.5\"}"}),
        )
        .await;
        assert_eq!(result.summary["error_kind"], "ParseError");
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_host_additional_conflict() {
        let (result, gateway) = run(
            "create_host_record",
            json!({
                "name": "web01.example.com",
                "ipv4_addresses": ["10.0.0.5"],
                "additional_parameters": "{\"name\": \"other.example.com\"}"
            }),
        )
        .await;
        assert_eq!(result.summary["error_kind"], "ConflictError");
        assert!(gateway.calls().is_empty());
    }
}
