// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Uniform result envelope for every action.
//!
//! Each invocation produces one [`ActionResult`] with the same four parts regardless of the
//! action: `status`, `data` (returned objects, possibly empty), `summary` (counters plus
//! action-specific fields) and a human `message`.
//!
//! Writes (create/update/delete) are all-or-nothing and summarize exactly one object.
//! Reads (list/search/lookup) are best-effort: `total_objects` is the number of returned
//! objects and `total_objects_successful` the number that are well-formed JSON objects.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::ActionError;
use crate::extattrs::display_extattrs;

/// Summary key holding the number of returned objects
pub const TOTAL_OBJECTS: &str = "total_objects";

/// Summary key holding the number of well-formed returned objects
pub const TOTAL_OBJECTS_SUCCESSFUL: &str = "total_objects_successful";

/// Outcome of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    /// The remote call completed and its answer was summarized
    Success,
    /// Validation, mapping or the remote call failed; `message` says why
    Failure,
}

/// Summary counters and action-specific fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary(Map<String, Value>);

impl Summary {
    /// Summary of an action that touched no objects.
    #[must_use]
    pub fn empty() -> Self {
        Self::counted(0, 0)
    }

    /// Summary of a successful single-object write.
    #[must_use]
    pub fn single() -> Self {
        Self::counted(1, 1)
    }

    /// Summary of a read over `data`.
    #[must_use]
    pub fn listing(data: &[Value]) -> Self {
        let successful = data.iter().filter(|o| o.is_object()).count();
        Self::counted(data.len(), successful)
    }

    fn counted(total: usize, successful: usize) -> Self {
        let mut map = Map::new();
        map.insert(TOTAL_OBJECTS.to_string(), total.into());
        map.insert(TOTAL_OBJECTS_SUCCESSFUL.to_string(), successful.into());
        Self(map)
    }

    /// Add an action-specific field.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Value of a summary field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The summary as a JSON map.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

/// What a strategy produces from a successful remote call.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutput {
    /// Returned objects, in server order
    pub data: Vec<Value>,
    /// Counters and action-specific fields
    pub summary: Summary,
    /// Human-readable message
    pub message: String,
}

impl ActionOutput {
    /// Bundle the parts of a successful result.
    pub fn new(data: Vec<Value>, summary: Summary, message: impl Into<String>) -> Self {
        Self {
            data,
            summary,
            message: message.into(),
        }
    }
}

/// Result of one action invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResult {
    /// Action id
    pub action: String,
    /// Success or failure
    pub status: ActionStatus,
    /// Parameters as supplied by the caller
    pub parameters: Value,
    /// Returned objects
    pub data: Vec<Value>,
    /// Counters and action-specific fields
    pub summary: Map<String, Value>,
    /// Human-readable message
    pub message: String,
}

impl ActionResult {
    /// Successful result.
    #[must_use]
    pub fn success(action: &str, parameters: Value, output: ActionOutput) -> Self {
        Self {
            action: action.to_string(),
            status: ActionStatus::Success,
            parameters,
            data: output.data,
            summary: output.summary.into_map(),
            message: output.message,
        }
    }

    /// Failed result. No objects are returned; the summary records the error class and, for
    /// remote failures, the HTTP status.
    #[must_use]
    pub fn failure(
        action: &str,
        parameters: Value,
        error: &ActionError,
        message: impl Into<String>,
    ) -> Self {
        let mut summary = Summary::empty().with("error_kind", error.kind());
        if let ActionError::Remote(remote) = error {
            if let Some(status) = remote.status {
                summary = summary.with("http_status", status);
            }
        }

        Self {
            action: action.to_string(),
            status: ActionStatus::Failure,
            parameters,
            data: Vec::new(),
            summary: summary.into_map(),
            message: message.into(),
        }
    }

    /// Whether the action succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ActionStatus::Success
    }
}

// ============================================================================
// Display helpers for returned objects
// ============================================================================

/// Set `key` on a returned object. Non-object values are left untouched.
pub fn insert_field(object: &mut Value, key: &str, value: impl Into<Value>) {
    if let Value::Object(map) = object {
        map.insert(key.to_string(), value.into());
    }
}

/// Add `extattrs_display` (`k=v, k=v`) to a returned object.
pub fn add_extattrs_display(object: &mut Value) {
    let display = object
        .get("extattrs")
        .map(display_extattrs)
        .unwrap_or_default();
    insert_field(object, "extattrs_display", display);
}

/// Join a list field of strings as `a, b, c`. Scalars render as themselves.
#[must_use]
pub fn join_list(value: Option<&Value>) -> String {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(scalar_text)
            .collect::<Vec<_>>()
            .join(", "),
        Some(Value::Null) | None => String::new(),
        Some(other) => scalar_text(other),
    }
}

/// Collect one field from each element of an object array as `a, b`.
#[must_use]
pub fn join_nested(value: Option<&Value>, field: &str) -> String {
    let Some(Value::Array(items)) = value else {
        return String::new();
    };
    items
        .iter()
        .filter_map(|item| item.get(field))
        .map(scalar_text)
        .collect::<Vec<_>>()
        .join(", ")
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Describe the filters a lookup applied: `IP Address: 10.0.0.1; Status: USED`, or `None`.
#[must_use]
pub fn describe_filters(applied: &[(&str, String)]) -> String {
    if applied.is_empty() {
        return "None".to_string();
    }
    applied
        .iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod result_tests;
