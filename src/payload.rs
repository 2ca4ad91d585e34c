// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Payload assembly and `additional_parameters` merging.
//!
//! A [`Payload`] keeps three buckets:
//!
//! - **typed** fields, populated from validated action parameters
//! - **optional** fields from the object type's closed schema, type-checked on entry
//! - **extras**, opaque fields passed through for object types that allow them
//!
//! Typed fields are immutable once set: `additional_parameters` cannot re-specify them, and an
//! attempt to do so fails with [`ActionError::Conflict`]. Because the buckets are only flattened
//! in [`Payload::into_value`], unchecked input can never overwrite validated input.

use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::ActionError;
use crate::object_map::{FieldKind, ObjectTypeEntry};
use crate::validation::{json_type_name, JsonText};

/// Parameter name carrying free-form extra fields
pub const ADDITIONAL_PARAMETERS: &str = "additional_parameters";

/// Request body under construction for one object type.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    entry: &'static ObjectTypeEntry,
    typed: Map<String, Value>,
    optional: Map<String, Value>,
    extras: Map<String, Value>,
}

impl Payload {
    /// Start an empty payload for `entry`.
    #[must_use]
    pub fn new(entry: &'static ObjectTypeEntry) -> Self {
        Self {
            entry,
            typed: Map::new(),
            optional: Map::new(),
            extras: Map::new(),
        }
    }

    /// The object type this payload targets.
    #[must_use]
    pub fn entry(&self) -> &'static ObjectTypeEntry {
        self.entry
    }

    /// Set a field from a validated action parameter.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.typed.insert(key.to_string(), value.into());
        self
    }

    /// Set a field from a validated action parameter, if one was supplied.
    pub fn set_opt<V: Into<Value>>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            self.set(key, v);
        }
        self
    }

    /// Whether any bucket holds `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.typed.contains_key(key)
            || self.optional.contains_key(key)
            || self.extras.contains_key(key)
    }

    /// Current value of `key`, whichever bucket holds it.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.typed
            .get(key)
            .or_else(|| self.optional.get(key))
            .or_else(|| self.extras.get(key))
    }

    /// Fill `key` with a default unless some bucket already set it.
    pub fn default_field(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        if !self.contains(key) {
            self.typed.insert(key.to_string(), value.into());
        }
        self
    }

    /// Parse and merge the raw `additional_parameters` parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Parse`] if the text is not a JSON object, and any error of
    /// [`Payload::merge`].
    pub fn merge_additional(&mut self, raw: Option<JsonText>) -> Result<(), ActionError> {
        let Some(raw) = raw else {
            return Ok(());
        };
        let extra = raw.decode_object(ADDITIONAL_PARAMETERS)?;
        self.merge(extra)
    }

    /// Merge caller-supplied extra fields.
    ///
    /// Nothing is merged unless every field is accepted.
    ///
    /// # Errors
    ///
    /// - [`ActionError::Conflict`] if a field was already set from a typed parameter
    /// - [`ActionError::Validation`] if a declared optional field has the wrong JSON type, or if
    ///   the object type does not accept undeclared fields
    pub fn merge(&mut self, extra: Map<String, Value>) -> Result<(), ActionError> {
        let mut optional = Map::new();
        let mut extras = Map::new();

        for (key, value) in extra {
            if self.typed.contains_key(&key) {
                return Err(ActionError::Conflict { field: key });
            }

            if let Some(field) = self.entry.optional_field(&key) {
                check_kind(&key, field.kind, &value)?;
                optional.insert(key, value);
            } else if self.entry.accepts_extras {
                extras.insert(key, value);
            } else {
                return Err(ActionError::validation(
                    key,
                    format!(
                        "not a supported additional parameter for {}",
                        self.entry.object_type
                    ),
                ));
            }
        }

        debug!(
            object_type = %self.entry.object_type,
            optional = optional.len(),
            extras = extras.len(),
            "Merged additional parameters"
        );

        self.optional.extend(optional);
        self.extras.extend(extras);
        Ok(())
    }

    /// Flatten the buckets into the request body.
    #[must_use]
    pub fn into_value(self) -> Value {
        let mut body = self.extras;
        body.extend(self.optional);
        body.extend(self.typed);
        Value::Object(body)
    }
}

fn check_kind(key: &str, kind: FieldKind, value: &Value) -> Result<(), ActionError> {
    let ok = match kind {
        FieldKind::Bool => value.is_boolean(),
        FieldKind::U32 => value.as_u64().is_some_and(|v| u32::try_from(v).is_ok()),
        FieldKind::Str => value.is_string(),
        FieldKind::Object => value.is_object(),
        FieldKind::Array => value.is_array(),
    };

    if ok {
        Ok(())
    } else {
        let expected = match kind {
            FieldKind::Bool => "a boolean",
            FieldKind::U32 => "a non-negative 32-bit integer",
            FieldKind::Str => "a string",
            FieldKind::Object => "an object",
            FieldKind::Array => "an array",
        };
        Err(ActionError::validation(
            key,
            format!("expected {expected}, got {}", json_type_name(value)),
        ))
    }
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod payload_tests;
