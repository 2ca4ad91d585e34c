// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `test_connectivity`: authenticated probe of the WAPI schema endpoint.

use super::ActionStrategy;
use crate::errors::ActionError;
use crate::result::{ActionOutput, Summary};
use crate::validation::{ActionParams, ParamSchema};
use crate::wapi::{WapiOutcome, WapiRequest};

/// `test_connectivity`
#[derive(Debug)]
pub struct TestConnectivity;

impl ActionStrategy for TestConnectivity {
    type Validated = ();

    const SCHEMA: ParamSchema = ParamSchema::EMPTY;

    fn validate(_: &ActionParams) -> Result<(), ActionError> {
        Ok(())
    }

    fn build_request((): &()) -> Result<WapiRequest, ActionError> {
        Ok(WapiRequest::Probe)
    }

    fn summarize((): &(), outcome: WapiOutcome) -> Result<ActionOutput, ActionError> {
        outcome.into_reachable()?;
        Ok(ActionOutput::new(
            Vec::new(),
            Summary::empty(),
            "Connectivity test succeeded",
        ))
    }

    fn failure_message(error: &ActionError) -> String {
        format!("Connectivity test failed: {error}")
    }
}
