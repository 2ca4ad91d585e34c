// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for the HTTP WAPI client.

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::errors::ActionError;
    use crate::wapi::client::{build_api_url, error_message, WapiClient};
    use crate::wapi::{ListQuery, ReferenceId, WapiGateway};
    use reqwest::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{
        basic_auth, body_json, method, path, query_param, query_param_is_missing,
    };
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BASE: &str = "/wapi/v2.13.1";

    fn client_for(server: &MockServer, page_size: usize) -> WapiClient {
        let config = Config {
            url: server.uri(),
            username: "admin".to_string(),
            password: "secret".to_string(),
            page_size,
            ..Config::default()
        };
        WapiClient::new(&config).unwrap()
    }

    // ========================================================================
    // URL and error text helpers
    // ========================================================================

    #[test]
    fn test_build_api_url_adds_scheme() {
        assert_eq!(
            build_api_url("grid.example.com", "v2.13.1"),
            "https://grid.example.com/wapi/v2.13.1"
        );
    }

    #[test]
    fn test_build_api_url_keeps_scheme_and_trims_slash() {
        assert_eq!(
            build_api_url("http://10.0.0.1:8080/", "v2.12"),
            "http://10.0.0.1:8080/wapi/v2.12"
        );
        assert_eq!(
            build_api_url("https://grid/", "/v2.13.1/"),
            "https://grid/wapi/v2.13.1"
        );
    }

    #[test]
    fn test_error_message_prefers_text() {
        let body = r#"{"Error": "AdmConDataError: None (IBDataConflictError)", "code": "Client.Ibap.Data.Conflict", "text": "The record already exists."}"#;
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, body),
            "The record already exists."
        );
    }

    #[test]
    fn test_error_message_falls_back_to_error_field() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"Error": "Bad things"}"#),
            "Bad things"
        );
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"Error": {"text": "Nested"}}"#),
            "Nested"
        );
    }

    #[test]
    fn test_error_message_raw_and_empty_bodies() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "upstream down\n"),
            "upstream down"
        );
        assert_eq!(
            error_message(StatusCode::UNAUTHORIZED, ""),
            "Status Code: 401. Empty response with no data."
        );
    }

    // ========================================================================
    // List and pagination
    // ========================================================================

    #[tokio::test]
    async fn test_list_sends_filters_and_paging_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/zone_rp")))
            .and(basic_auth("admin", "secret"))
            .and(query_param("fqdn", "rpz.local"))
            .and(query_param("_return_fields", "fqdn,view"))
            .and(query_param("_paging", "1"))
            .and(query_param("_return_as_object", "1"))
            .and(query_param("_max_results", "1000"))
            .and(query_param_is_missing("_page_id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [{"_ref": "zone_rp/abc:rpz.local/default", "fqdn": "rpz.local"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, 1000);
        let query = ListQuery::new("zone_rp")
            .filter("fqdn", "rpz.local")
            .return_fields("fqdn,view");
        let objects = client.list(&query).await.unwrap();

        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0]["fqdn"], "rpz.local");
    }

    #[tokio::test]
    async fn test_list_follows_next_page_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/network")))
            .and(query_param_is_missing("_page_id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [{"network": "10.0.0.0/24"}, {"network": "10.0.1.0/24"}],
                "next_page_id": "page-2"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/network")))
            .and(query_param("_page_id", "page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [{"network": "10.0.2.0/24"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, 2);
        let objects = client.list(&ListQuery::new("network")).await.unwrap();

        let networks: Vec<&str> = objects
            .iter()
            .map(|o| o["network"].as_str().unwrap())
            .collect();
        assert_eq!(networks, vec!["10.0.0.0/24", "10.0.1.0/24", "10.0.2.0/24"]);
    }

    #[tokio::test]
    async fn test_list_stops_at_limit_and_truncates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/record:host")))
            .and(query_param("_max_results", "2"))
            .and(query_param_is_missing("_page_id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [{"name": "a"}, {"name": "b"}],
                "next_page_id": "next"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/record:host")))
            .and(query_param("_page_id", "next"))
            .and(query_param("_max_results", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [{"name": "c"}, {"name": "d"}],
                "next_page_id": "more"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, 2);
        let objects = client
            .list(&ListQuery::new("record:host").limit(Some(3)))
            .await
            .unwrap();

        assert_eq!(objects.len(), 3);
        assert_eq!(objects[2]["name"], "c");
    }

    #[tokio::test]
    async fn test_list_stops_on_empty_page_with_next_page_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/ipv4address")))
            .and(query_param_is_missing("_page_id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [{"ip_address": "10.0.0.1"}],
                "next_page_id": "page-2"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/ipv4address")))
            .and(query_param("_page_id", "page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [],
                "next_page_id": "page-2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, 1);
        let objects = client.list(&ListQuery::new("ipv4address")).await.unwrap();

        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0]["ip_address"], "10.0.0.1");
    }

    #[tokio::test]
    async fn test_list_accepts_plain_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/lease")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"address": "10.0.0.5"}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, 100);
        let objects = client.list(&ListQuery::new("lease")).await.unwrap();
        assert_eq!(objects, vec![json!({"address": "10.0.0.5"})]);
    }

    #[tokio::test]
    async fn test_list_error_surfaces_server_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/ipv4address")))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "Error": "AdmConProtoError: Invalid search",
                "code": "Client.Ibap.Proto",
                "text": "Field is not searchable: usage"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, 100);
        let err = client
            .list(&ListQuery::new("ipv4address").filter("usage", "DNS"))
            .await
            .unwrap_err();

        match err {
            ActionError::Remote(remote) => {
                assert_eq!(remote.status, Some(400));
                assert_eq!(remote.message, "Field is not searchable: usage");
            }
            other => panic!("expected remote error, got {other:?}"),
        }
    }

    // ========================================================================
    // Create, update, delete, probe
    // ========================================================================

    #[tokio::test]
    async fn test_create_posts_payload_with_return_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{BASE}/record:rpz:cname")))
            .and(query_param("_return_fields", "name,rp_zone,canonical"))
            .and(body_json(json!({"name": "bad.com.rpz.local", "rp_zone": "rpz.local", "canonical": ""})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "_ref": "record:rpz:cname/ZG5z:bad.com.rpz.local/default",
                "name": "bad.com.rpz.local"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, 100);
        let created = client
            .create(
                "record:rpz:cname",
                &json!({"name": "bad.com.rpz.local", "rp_zone": "rpz.local", "canonical": ""}),
                "name,rp_zone,canonical",
            )
            .await
            .unwrap();

        assert_eq!(
            created.reference.as_str(),
            "record:rpz:cname/ZG5z:bad.com.rpz.local/default"
        );
        assert_eq!(created.object["name"], "bad.com.rpz.local");
    }

    #[tokio::test]
    async fn test_create_accepts_bare_reference() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{BASE}/zone_rp")))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!("zone_rp/ZG5z:rpz.local/default")),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, 100);
        let created = client
            .create("zone_rp", &json!({"fqdn": "rpz.local"}), "")
            .await
            .unwrap();

        assert_eq!(created.reference.as_str(), "zone_rp/ZG5z:rpz.local/default");
        assert_eq!(created.object, json!({"_ref": "zone_rp/ZG5z:rpz.local/default"}));
    }

    #[tokio::test]
    async fn test_update_puts_to_reference() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(format!("{BASE}/record:rpz:cname/ZG5z:bad.com.rpz.local/default")))
            .and(query_param("_return_fields", "name,canonical"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_ref": "record:rpz:cname/ZG5z:bad.com.rpz.local/default",
                "canonical": "*"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, 100);
        let updated = client
            .update(
                &ReferenceId::new("record:rpz:cname/ZG5z:bad.com.rpz.local/default"),
                &json!({"canonical": "*"}),
                "name,canonical",
            )
            .await
            .unwrap();

        assert_eq!(updated["canonical"], "*");
    }

    #[tokio::test]
    async fn test_delete_returns_reference() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("{BASE}/zone_rp/ZG5z:rpz.local/default")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!("zone_rp/ZG5z:rpz.local/default")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, 100);
        let deleted = client
            .delete(&ReferenceId::new("zone_rp/ZG5z:rpz.local/default"))
            .await
            .unwrap();

        assert_eq!(deleted.as_str(), "zone_rp/ZG5z:rpz.local/default");
    }

    #[tokio::test]
    async fn test_probe_success_and_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/")))
            .and(basic_auth("admin", "secret"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"supported_objects": ["zone_rp"]})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, 100);
        assert!(client.probe().await.is_ok());

        let config = Config {
            url: server.uri(),
            username: "admin".to_string(),
            password: "wrong".to_string(),
            ..Config::default()
        };
        let bad = WapiClient::new(&config).unwrap();
        let err = bad.probe().await.unwrap_err();
        assert!(!err.is_local());
    }

    #[tokio::test]
    async fn test_transport_failure_message() {
        let config = Config {
            // Nothing listens on the discard port
            url: "http://127.0.0.1:9".to_string(),
            username: "admin".to_string(),
            timeout_secs: 2,
            ..Config::default()
        };
        let client = WapiClient::new(&config).unwrap();
        let err = client.probe().await.unwrap_err();

        match err {
            ActionError::Remote(remote) => {
                assert_eq!(remote.status, None);
                assert!(remote.message.starts_with("Error connecting to server."));
            }
            other => panic!("expected remote error, got {other:?}"),
        }
    }
}
