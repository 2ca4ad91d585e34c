// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP implementation of [`WapiGateway`].
//!
//! Requests go to `<url>/wapi/<version>/<object-type or reference>` with HTTP basic
//! authentication and JSON bodies. Lists are paginated with `_paging=1`,
//! `_return_as_object=1`, `_max_results` and `_page_id`.
//!
//! Failures are never retried: each failed call becomes an [`ActionError::Remote`] carrying
//! the HTTP status and the server's error text.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde_json::Value;
use tracing::{debug, error, info};
use url::Url;

use super::{Created, ListQuery, ReferenceId, WapiGateway};
use crate::config::Config;
use crate::constants::{DEFAULT_MAX_RESULTS, MAX_PAGE_SIZE, SCHEMA_PROBE_PATH};
use crate::errors::{ActionError, RemoteError};

/// Build the WAPI base URL from a server address and version.
///
/// Converts `grid.example.com` or `https://grid.example.com/` to
/// `https://grid.example.com/wapi/v2.13.1`. Plain `http://` URLs are kept as given.
#[must_use]
pub fn build_api_url(server: &str, version: &str) -> String {
    let server = server.trim().trim_end_matches('/');
    let version = version.trim_matches('/');
    if server.starts_with("http://") || server.starts_with("https://") {
        format!("{server}/wapi/{version}")
    } else {
        format!("https://{server}/wapi/{version}")
    }
}

/// Extract the human-readable message from a WAPI error body.
///
/// WAPI answers errors with `{"Error": "...", "code": "...", "text": "..."}`. The `text` field is
/// preferred, then `Error` (or `Error.text`), then the raw body.
#[must_use]
pub fn error_message(status: StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return format!("Status Code: {}. Empty response with no data.", status.as_u16());
    }

    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(body) {
        if let Some(text) = obj.get("text").and_then(Value::as_str) {
            return text.to_string();
        }
        match obj.get("Error") {
            Some(Value::String(text)) => return text.clone(),
            Some(Value::Object(inner)) => {
                if let Some(text) = inner.get("text").and_then(Value::as_str) {
                    return text.to_string();
                }
            }
            _ => {}
        }
    }

    body.trim().to_string()
}

/// WAPI client over HTTPS.
#[derive(Debug, Clone)]
pub struct WapiClient {
    /// HTTP client for API requests
    client: Arc<HttpClient>,
    /// `<url>/wapi/<version>`
    base_url: String,
    username: String,
    password: String,
    /// Objects per page when listing
    page_size: usize,
}

impl WapiClient {
    /// Create a client from connection settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.verify_server_cert)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client: Arc::new(client),
            base_url: build_api_url(&config.url, &config.wapi_version),
            username: config.username.clone(),
            password: config.password.clone(),
            page_size: config.page_size.clamp(1, MAX_PAGE_SIZE),
        })
    }

    /// The `<url>/wapi/<version>` prefix every request uses.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the URL of `path` (an object type or reference) with query parameters.
    fn endpoint(&self, path: &str, query: &[(String, String)]) -> Result<Url, ActionError> {
        let mut url = Url::parse(&format!("{}/{path}", self.base_url)).map_err(|e| {
            RemoteError::transport(format!("Invalid request URL for '{path}': {e}"))
        })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Send one request and decode the JSON answer.
    ///
    /// Empty success bodies decode to `Value::Null`.
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<Value, ActionError> {
        info!(
            method = %method,
            url = %url,
            has_body = body.is_some(),
            "WAPI request"
        );
        if let Some(body) = body {
            debug!(method = %method, url = %url, body = %body, "WAPI request body");
        }

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .basic_auth(&self.username, Some(&self.password));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            error!(method = %method, url = %url, error = %e, "WAPI request could not be sent");
            RemoteError::transport(format!("Error connecting to server. {e}"))
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            RemoteError::http(status.as_u16(), format!("Failed to read response body: {e}"))
        })?;

        if !status.is_success() {
            let message = error_message(status, &text);
            error!(
                method = %method,
                url = %url,
                status = %status,
                error = %message,
                "WAPI request failed"
            );
            return Err(RemoteError::http(status.as_u16(), message).into());
        }

        info!(
            method = %method,
            url = %url,
            status = %status,
            response_len = text.len(),
            "WAPI request successful"
        );

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            RemoteError::http(
                status.as_u16(),
                format!("Can't process response from server: {e}"),
            )
            .into()
        })
    }
}

#[async_trait]
impl WapiGateway for WapiClient {
    async fn list(&self, query: &ListQuery) -> Result<Vec<Value>, ActionError> {
        let limit = query.limit.unwrap_or(DEFAULT_MAX_RESULTS);
        let mut results: Vec<Value> = Vec::new();
        let mut page_id: Option<String> = None;

        debug!(
            object_type = %query.object_type,
            limit = limit,
            "Starting paginated WAPI list"
        );

        loop {
            let remaining = limit.saturating_sub(results.len());
            let mut params = query.filters.clone();
            if let Some(fields) = &query.return_fields {
                params.push(("_return_fields".to_string(), fields.clone()));
            }
            params.push(("_paging".to_string(), "1".to_string()));
            params.push(("_return_as_object".to_string(), "1".to_string()));
            params.push((
                "_max_results".to_string(),
                self.page_size.min(remaining).to_string(),
            ));
            if let Some(id) = &page_id {
                params.push(("_page_id".to_string(), id.clone()));
            }

            let url = self.endpoint(&query.object_type, &params)?;
            let response = self.send(Method::GET, url, None).await?;

            let page = match response {
                Value::Object(mut obj) => {
                    page_id = obj
                        .remove("next_page_id")
                        .and_then(|v| v.as_str().map(str::to_string));
                    match obj.remove("result") {
                        Some(Value::Array(items)) => items,
                        _ => Vec::new(),
                    }
                }
                Value::Array(items) => {
                    page_id = None;
                    items
                }
                Value::Null => {
                    page_id = None;
                    Vec::new()
                }
                other => {
                    page_id = None;
                    vec![other]
                }
            };

            debug!(
                object_type = %query.object_type,
                received = page.len(),
                next_page = page_id.is_some(),
                "Received WAPI page"
            );

            let empty_page = page.is_empty();
            results.extend(page);
            if empty_page || page_id.is_none() || results.len() >= limit {
                break;
            }
        }

        results.truncate(limit);
        Ok(results)
    }

    async fn create(
        &self,
        object_type: &str,
        payload: &Value,
        return_fields: &str,
    ) -> Result<Created, ActionError> {
        let url = self.endpoint(object_type, &return_fields_param(return_fields))?;
        let response = self.send(Method::POST, url, Some(payload)).await?;
        created_from_response(response)
    }

    async fn update(
        &self,
        reference: &ReferenceId,
        payload: &Value,
        return_fields: &str,
    ) -> Result<Value, ActionError> {
        let url = self.endpoint(reference.as_str(), &return_fields_param(return_fields))?;
        let response = self.send(Method::PUT, url, Some(payload)).await?;
        Ok(match response {
            Value::String(r) => serde_json::json!({ "_ref": r }),
            other => other,
        })
    }

    async fn delete(&self, reference: &ReferenceId) -> Result<ReferenceId, ActionError> {
        let url = self.endpoint(reference.as_str(), &[])?;
        let response = self.send(Method::DELETE, url, None).await?;
        Ok(match response {
            Value::String(r) => ReferenceId::new(r),
            _ => reference.clone(),
        })
    }

    async fn probe(&self) -> Result<(), ActionError> {
        let url = Url::parse(&format!("{}/{SCHEMA_PROBE_PATH}", self.base_url))
            .map_err(|e| RemoteError::transport(format!("Invalid request URL: {e}")))?;
        self.send(Method::GET, url, None).await.map(|_| ())
    }
}

fn return_fields_param(return_fields: &str) -> Vec<(String, String)> {
    if return_fields.is_empty() {
        Vec::new()
    } else {
        vec![("_return_fields".to_string(), return_fields.to_string())]
    }
}

/// A create answers either the new object (when `_return_fields` was sent) or its bare
/// reference string.
fn created_from_response(response: Value) -> Result<Created, ActionError> {
    match response {
        Value::String(r) => Ok(Created {
            object: serde_json::json!({ "_ref": r }),
            reference: ReferenceId::new(r),
        }),
        Value::Object(obj) => {
            let reference = obj
                .get("_ref")
                .and_then(Value::as_str)
                .map(ReferenceId::new)
                .ok_or_else(|| {
                    RemoteError::transport("Create response did not include a reference (_ref)")
                })?;
            Ok(Created {
                reference,
                object: Value::Object(obj),
            })
        }
        other => Err(RemoteError::transport(format!(
            "Unexpected create response: {other}"
        ))
        .into()),
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod client_tests;
