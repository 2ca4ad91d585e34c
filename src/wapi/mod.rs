// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Access to the WAPI object API.
//!
//! The action pipeline never talks HTTP directly. It describes each remote call as a
//! [`WapiRequest`] and hands it to a [`WapiGateway`], which executes list/create/update/delete
//! calls against a named object type or an opaque [`ReferenceId`].
//!
//! [`client::WapiClient`] is the HTTP implementation; tests substitute an in-memory gateway.
//!
//! # Example
//!
//! ```rust,no_run
//! use wapictl::config::Config;
//! use wapictl::wapi::{client::WapiClient, ListQuery, WapiGateway};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::load(None)?;
//! let client = WapiClient::new(&config)?;
//!
//! let zones = client
//!     .list(&ListQuery::new("zone_rp").filter("fqdn", "rpz.local"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ActionError, RemoteError};

/// Opaque identifier of one remote object.
///
/// Shaped like `<object-type>/<token>:<display-name>/<view>`. Only the object type segment is
/// ever inspected; the rest is passed back to the server unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceId(String);

impl ReferenceId {
    /// Wrap a reference string.
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Parse a caller-supplied reference for `field`.
    ///
    /// The object type and the token after the first `/` must both be non-empty.
    pub fn parse(field: &str, reference: impl Into<String>) -> Result<Self, ActionError> {
        let reference = reference.into();
        match reference.split_once('/') {
            Some((object_type, token)) if !object_type.is_empty() && !token.is_empty() => {
                Ok(Self(reference))
            }
            _ => Err(ActionError::validation(
                field,
                format!("'{reference}' is not an object reference, expected <type>/<id>"),
            )),
        }
    }

    /// The reference as sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The object type segment (everything before the first `/`).
    #[must_use]
    pub fn object_type(&self) -> &str {
        self.0.split('/').next().unwrap_or_default()
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A filtered, paginated read of one object type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Remote object type, e.g. `record:host`
    pub object_type: String,
    /// Search filters, sent as query parameters in order
    pub filters: Vec<(String, String)>,
    /// `_return_fields` value; server defaults when `None`
    pub return_fields: Option<String>,
    /// Maximum number of objects; the gateway's default when `None`
    pub limit: Option<usize>,
}

impl ListQuery {
    /// Start a query with no filters.
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            ..Self::default()
        }
    }

    /// Add a filter.
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }

    /// Add several filters.
    #[must_use]
    pub fn filters(mut self, filters: impl IntoIterator<Item = (String, String)>) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Request specific fields.
    #[must_use]
    pub fn return_fields(mut self, fields: impl Into<String>) -> Self {
        self.return_fields = Some(fields.into());
        self
    }

    /// Cap the number of returned objects.
    #[must_use]
    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }
}

/// Result of a create call.
#[derive(Debug, Clone, PartialEq)]
pub struct Created {
    /// Reference of the new object
    pub reference: ReferenceId,
    /// The object as returned by the server (at least `{"_ref": ...}`)
    pub object: Value,
}

/// Remote operations the action pipeline depends on.
///
/// Implementations surface every failure as [`ActionError::Remote`] and never retry.
#[async_trait]
pub trait WapiGateway: Send + Sync {
    /// Read objects matching a query, in server order.
    async fn list(&self, query: &ListQuery) -> Result<Vec<Value>, ActionError>;

    /// Create an object of `object_type`.
    async fn create(
        &self,
        object_type: &str,
        payload: &Value,
        return_fields: &str,
    ) -> Result<Created, ActionError>;

    /// Update the object behind `reference`.
    async fn update(
        &self,
        reference: &ReferenceId,
        payload: &Value,
        return_fields: &str,
    ) -> Result<Value, ActionError>;

    /// Delete the object behind `reference`, returning the deleted reference.
    async fn delete(&self, reference: &ReferenceId) -> Result<ReferenceId, ActionError>;

    /// Authenticated schema request used to test connectivity.
    async fn probe(&self) -> Result<(), ActionError>;
}

/// One remote call, as planned by an action.
#[derive(Debug, Clone, PartialEq)]
pub enum WapiRequest {
    /// Paginated read
    List(ListQuery),
    /// Object creation
    Create {
        /// Remote object type
        object_type: String,
        /// Request body
        payload: Value,
        /// `_return_fields` for the created object
        return_fields: String,
    },
    /// Object update by reference
    Update {
        /// Object to update
        reference: ReferenceId,
        /// Request body
        payload: Value,
        /// `_return_fields` for the updated object
        return_fields: String,
    },
    /// Object deletion by reference
    Delete(ReferenceId),
    /// Connectivity probe
    Probe,
}

impl WapiRequest {
    /// HTTP verb the request maps to.
    #[must_use]
    pub fn verb(&self) -> &'static str {
        match self {
            Self::List(_) | Self::Probe => "GET",
            Self::Create { .. } => "POST",
            Self::Update { .. } => "PUT",
            Self::Delete(_) => "DELETE",
        }
    }

    /// Execute the request against a gateway.
    ///
    /// # Errors
    ///
    /// Propagates the gateway's [`ActionError::Remote`].
    pub async fn execute(&self, gateway: &dyn WapiGateway) -> Result<WapiOutcome, ActionError> {
        match self {
            Self::List(query) => gateway.list(query).await.map(WapiOutcome::Objects),
            Self::Create {
                object_type,
                payload,
                return_fields,
            } => gateway
                .create(object_type, payload, return_fields)
                .await
                .map(WapiOutcome::Created),
            Self::Update {
                reference,
                payload,
                return_fields,
            } => gateway
                .update(reference, payload, return_fields)
                .await
                .map(WapiOutcome::Updated),
            Self::Delete(reference) => gateway.delete(reference).await.map(WapiOutcome::Deleted),
            Self::Probe => gateway.probe().await.map(|()| WapiOutcome::Reachable),
        }
    }
}

/// What a successful [`WapiRequest`] produced.
#[derive(Debug, Clone, PartialEq)]
pub enum WapiOutcome {
    /// Objects read by a list
    Objects(Vec<Value>),
    /// A new object
    Created(Created),
    /// The updated object
    Updated(Value),
    /// Reference of a deleted object
    Deleted(ReferenceId),
    /// The server answered the probe
    Reachable,
}

impl WapiOutcome {
    fn label(&self) -> &'static str {
        match self {
            Self::Objects(_) => "list",
            Self::Created(_) => "create",
            Self::Updated(_) => "update",
            Self::Deleted(_) => "delete",
            Self::Reachable => "probe",
        }
    }

    fn mismatch(&self, expected: &str) -> ActionError {
        RemoteError::transport(format!(
            "Expected a {expected} response but the gateway returned a {} response",
            self.label()
        ))
        .into()
    }

    /// Objects returned by a list.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Remote`] for any other outcome.
    pub fn into_objects(self) -> Result<Vec<Value>, ActionError> {
        match self {
            Self::Objects(objects) => Ok(objects),
            other => Err(other.mismatch("list")),
        }
    }

    /// The created object.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Remote`] for any other outcome.
    pub fn into_created(self) -> Result<Created, ActionError> {
        match self {
            Self::Created(created) => Ok(created),
            other => Err(other.mismatch("create")),
        }
    }

    /// The updated object.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Remote`] for any other outcome.
    pub fn into_updated(self) -> Result<Value, ActionError> {
        match self {
            Self::Updated(object) => Ok(object),
            other => Err(other.mismatch("update")),
        }
    }

    /// Reference of the deleted object.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Remote`] for any other outcome.
    pub fn into_deleted(self) -> Result<ReferenceId, ActionError> {
        match self {
            Self::Deleted(reference) => Ok(reference),
            other => Err(other.mismatch("delete")),
        }
    }

    /// Confirm the probe succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Remote`] for any other outcome.
    pub fn into_reachable(self) -> Result<(), ActionError> {
        match self {
            Self::Reachable => Ok(()),
            other => Err(other.mismatch("probe")),
        }
    }
}
