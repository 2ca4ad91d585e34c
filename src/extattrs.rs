// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Extended attribute filter parsing.
//!
//! Extended attributes are user-defined annotations attached to WAPI objects. Callers pass them
//! as a single string of comma-separated `Key=Value` pairs:
//!
//! ```text
//! Site=New York,OtherProp=MyValue
//! ```
//!
//! The same tokenizer feeds two representations:
//! - the `extattrs` block of a create/update payload (`{"Site": {"value": "New York"}}`)
//! - search filter query parameters (`*Site=New York`) for list and lookup actions
//!
//! A value wrapped in double quotes may contain commas. Duplicate keys are rejected.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{json, Map, Value};

use crate::errors::ActionError;

/// Prefix WAPI uses for extended attribute search filters
pub const EXTATTR_FILTER_PREFIX: char = '*';

/// Parsed extended attributes, keyed by attribute name.
///
/// Keys are case-sensitive and unique. Iteration order is alphabetical, which keeps payloads
/// and filter lists deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtAttrMap(BTreeMap<String, String>);

impl ExtAttrMap {
    /// Parse a `Key1=Value1,Key2=Value2` string.
    ///
    /// # Arguments
    ///
    /// * `field` - Name of the parameter the text came from, used in error messages
    /// * `input` - The raw attribute string
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Parse`] if a segment has no `=`, has an empty key, contains an
    /// unterminated quote or has a `"` inside its value, and [`ActionError::DuplicateAttribute`] if a key repeats.
    pub fn parse(field: &str, input: &str) -> Result<Self, ActionError> {
        let mut attrs = BTreeMap::new();

        for segment in split_top_level(field, input)? {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }

            let Some((key, value)) = segment.split_once('=') else {
                return Err(ActionError::parse(
                    field,
                    format!("'{segment}' is not in key=value format"),
                ));
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(ActionError::parse(
                    field,
                    format!("'{segment}' has an empty attribute name"),
                ));
            }

            let value = unquote(value.trim());
            if value.contains('"') {
                return Err(ActionError::parse(
                    field,
                    format!("'{segment}' has a quote inside its value"),
                ));
            }
            if attrs.insert(key.to_string(), value.to_string()).is_some() {
                return Err(ActionError::DuplicateAttribute {
                    key: key.to_string(),
                });
            }
        }

        Ok(Self(attrs))
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no attributes were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value of a single attribute.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as a payload `extattrs` block: `{"Key": {"value": "Value"}}`.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        let block: Map<String, Value> = self
            .0
            .iter()
            .map(|(k, v)| (k.clone(), json!({ "value": v })))
            .collect();
        Value::Object(block)
    }

    /// Render as search filter pairs: `("*Key", "Value")`.
    #[must_use]
    pub fn to_filters(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(k, v)| (format!("{EXTATTR_FILTER_PREFIX}{k}"), v.clone()))
            .collect()
    }
}

impl fmt::Display for ExtAttrMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if value.contains(',') {
                write!(f, "{key}=\"{value}\"")?;
            } else {
                write!(f, "{key}={value}")?;
            }
        }
        Ok(())
    }
}

/// Render a WAPI `extattrs` object as `k=v, k=v` for display.
///
/// Values wrapped as `{"value": V}` are unwrapped; anything else is rendered as-is.
#[must_use]
pub fn display_extattrs(extattrs: &Value) -> String {
    let Some(obj) = extattrs.as_object() else {
        return String::new();
    };

    obj.iter()
        .map(|(key, wrapped)| {
            let value = wrapped.get("value").unwrap_or(wrapped);
            match value {
                Value::String(s) => format!("{key}={s}"),
                other => format!("{key}={other}"),
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Split on commas that are not inside double quotes.
fn split_top_level<'a>(field: &str, input: &'a str) -> Result<Vec<&'a str>, ActionError> {
    let mut segments = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (idx, ch) in input.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                segments.push(&input[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }

    if in_quotes {
        return Err(ActionError::parse(field, "unterminated quoted value"));
    }

    segments.push(&input[start..]);
    Ok(segments)
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

#[cfg(test)]
#[path = "extattrs_tests.rs"]
mod extattrs_tests;
