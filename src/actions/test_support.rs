// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory gateway for pipeline tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use super::ActionDispatcher;
use crate::errors::{ActionError, RemoteError};
use crate::result::ActionResult;
use crate::wapi::{Created, ListQuery, ReferenceId, WapiGateway, WapiRequest};

/// Gateway that records every call and answers from canned data.
#[derive(Debug, Default)]
pub(crate) struct RecordingGateway {
    calls: Mutex<Vec<WapiRequest>>,
    objects: Vec<Value>,
    failure: Option<RemoteError>,
}

impl RecordingGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Lists answer with `objects`.
    pub(crate) fn with_objects(objects: Vec<Value>) -> Self {
        Self {
            objects,
            ..Self::default()
        }
    }

    /// Every call fails with `status` and `message`.
    pub(crate) fn failing(status: u16, message: &str) -> Self {
        Self {
            failure: Some(RemoteError::http(status, message)),
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<WapiRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn single_call(&self) -> WapiRequest {
        let calls = self.calls();
        assert_eq!(calls.len(), 1, "expected exactly one remote call, got {calls:?}");
        calls.into_iter().next().unwrap()
    }

    fn record(&self, request: WapiRequest) -> Result<(), ActionError> {
        self.calls.lock().unwrap().push(request);
        match &self.failure {
            Some(e) => Err(e.clone().into()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl WapiGateway for RecordingGateway {
    async fn list(&self, query: &ListQuery) -> Result<Vec<Value>, ActionError> {
        self.record(WapiRequest::List(query.clone()))?;
        let mut objects = self.objects.clone();
        if let Some(limit) = query.limit {
            objects.truncate(limit);
        }
        Ok(objects)
    }

    async fn create(
        &self,
        object_type: &str,
        payload: &Value,
        return_fields: &str,
    ) -> Result<Created, ActionError> {
        self.record(WapiRequest::Create {
            object_type: object_type.to_string(),
            payload: payload.clone(),
            return_fields: return_fields.to_string(),
        })?;

        let reference = ReferenceId::new(format!("{object_type}/ZG5zLmZha2U:created/default"));
        let mut object = payload.clone();
        if let Value::Object(map) = &mut object {
            map.insert("_ref".to_string(), reference.as_str().into());
        }
        Ok(Created { reference, object })
    }

    async fn update(
        &self,
        reference: &ReferenceId,
        payload: &Value,
        return_fields: &str,
    ) -> Result<Value, ActionError> {
        self.record(WapiRequest::Update {
            reference: reference.clone(),
            payload: payload.clone(),
            return_fields: return_fields.to_string(),
        })?;

        let mut object = payload.clone();
        if let Value::Object(map) = &mut object {
            map.insert("_ref".to_string(), reference.as_str().into());
        }
        Ok(object)
    }

    async fn delete(&self, reference: &ReferenceId) -> Result<ReferenceId, ActionError> {
        self.record(WapiRequest::Delete(reference.clone()))?;
        Ok(reference.clone())
    }

    async fn probe(&self) -> Result<(), ActionError> {
        self.record(WapiRequest::Probe)
    }
}

/// Dispatch `action` against `gateway`.
pub(crate) async fn run_with(
    gateway: &Arc<RecordingGateway>,
    action: &str,
    params: Value,
) -> ActionResult {
    let dispatcher = ActionDispatcher::new(gateway.clone());
    dispatcher.dispatch(action, params).await
}

/// Dispatch `action` against a fresh gateway with no canned objects.
pub(crate) async fn run(action: &str, params: Value) -> (ActionResult, Arc<RecordingGateway>) {
    let gateway = Arc::new(RecordingGateway::new());
    let result = run_with(&gateway, action, params).await;
    (result, gateway)
}

/// Payload of the single create call.
pub(crate) fn created_payload(gateway: &RecordingGateway) -> (String, Value) {
    match gateway.single_call() {
        WapiRequest::Create {
            object_type,
            payload,
            ..
        } => (object_type, payload),
        other => panic!("expected a create call, got {other:?}"),
    }
}

/// Query of the single list call.
pub(crate) fn list_query(gateway: &RecordingGateway) -> ListQuery {
    match gateway.single_call() {
        WapiRequest::List(query) => query,
        other => panic!("expected a list call, got {other:?}"),
    }
}

/// Whether `query` carries filter `key=value`.
pub(crate) fn has_filter(query: &ListQuery, key: &str, value: &str) -> bool {
    query.filters.iter().any(|(k, v)| k == key && v == value)
}
