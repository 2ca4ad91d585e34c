// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Action strategies and the dispatcher that runs them.
//!
//! Every action runs through the same fixed pipeline:
//!
//! 1. **Schema** - reject unknown keys and missing required parameters
//! 2. **Validate** - type-check and cross-check parameters, parse extended attributes
//! 3. **Build** - resolve the object type, assemble the payload, merge `additional_parameters`
//! 4. **Execute** - one call on the [`WapiGateway`]
//! 5. **Summarize** - shape the response into an [`ActionResult`]
//!
//! Each action only supplies the parts that differ, as an [`ActionStrategy`]. Any stage failure
//! short-circuits the rest, and a local failure never reaches the gateway.
//!
//! # Available Actions
//!
//! ## RPZ rules
//!
//! - `create_rpz_cname_rule`, `update_rpz_cname_rule`
//! - `create_rpz_a_rule`, `create_rpz_aaaa_rule`, `create_rpz_mx_rule`, `create_rpz_ptr_rule`,
//!   `create_rpz_srv_rule`, `create_rpz_naptr_rule`, `create_rpz_txt_rule`
//! - `delete_rpz_rule`, `search_rpz_rule`
//!
//! ## Response policy zones
//!
//! - `create_response_policy_zone`, `get_response_policy_zone`, `delete_response_policy_zone`
//!
//! ## IPAM
//!
//! - `ip_lookup`, `list_host_info`, `list_network_info`, `dhcp_lease_lookup`,
//!   `create_host_record`
//!
//! ## Other
//!
//! - `test_connectivity`
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use serde_json::json;
//! use wapictl::actions::ActionDispatcher;
//! use wapictl::config::Config;
//! use wapictl::wapi::client::WapiClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = WapiClient::new(&Config::load(None)?)?;
//! let dispatcher = ActionDispatcher::new(Arc::new(client));
//!
//! let result = dispatcher
//!     .dispatch("ip_lookup", json!({"ip_address": "192.168.1.100", "status": "ACTIVE"}))
//!     .await;
//! println!("{}", result.message);
//! # Ok(())
//! # }
//! ```

pub mod connectivity;
pub mod ipam;
pub mod rpz_rules;
pub mod zones;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::ActionError;
use crate::result::{ActionOutput, ActionResult};
use crate::validation::{ActionParams, ParamSchema};
use crate::wapi::{WapiGateway, WapiOutcome, WapiRequest};

use connectivity::TestConnectivity;
use ipam::{CreateHostRecord, DhcpLeaseLookup, IpLookup, ListHostInfo, ListNetworkInfo};
use rpz_rules::{
    CreateARule, CreateAaaaRule, CreateCnameRule, CreateMxRule, CreateNaptrRule, CreatePtrRule,
    CreateSrvRule, CreateTxtRule, DeleteRpzRule, SearchRpzRule, UpdateCnameRule,
};
use zones::{CreateResponsePolicyZone, DeleteResponsePolicyZone, GetResponsePolicyZone};

/// The per-action parts of the pipeline.
pub trait ActionStrategy {
    /// Parameters after validation.
    type Validated: Send + Sync;

    /// Closed parameter schema.
    const SCHEMA: ParamSchema;

    /// Type-check and cross-check the raw parameters.
    ///
    /// # Errors
    ///
    /// Returns a local [`ActionError`] describing the first invalid parameter.
    fn validate(params: &ActionParams) -> Result<Self::Validated, ActionError>;

    /// Plan the single remote call.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Mapping`], [`ActionError::Parse`], [`ActionError::Conflict`] or
    /// [`ActionError::Validation`] when the payload cannot be assembled.
    fn build_request(validated: &Self::Validated) -> Result<WapiRequest, ActionError>;

    /// Shape the remote outcome into the result's data, summary and message.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Remote`] if the outcome does not match the request.
    fn summarize(
        validated: &Self::Validated,
        outcome: WapiOutcome,
    ) -> Result<ActionOutput, ActionError>;

    /// Failure message for the result.
    fn failure_message(error: &ActionError) -> String {
        error.to_string()
    }
}

// ============================================================================
// Action identifiers
// ============================================================================

/// Every supported action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// `test_connectivity`
    TestConnectivity,
    /// `create_rpz_cname_rule`
    CreateRpzCnameRule,
    /// `update_rpz_cname_rule`
    UpdateRpzCnameRule,
    /// `create_rpz_a_rule`
    CreateRpzARule,
    /// `create_rpz_aaaa_rule`
    CreateRpzAaaaRule,
    /// `create_rpz_mx_rule`
    CreateRpzMxRule,
    /// `create_rpz_ptr_rule`
    CreateRpzPtrRule,
    /// `create_rpz_srv_rule`
    CreateRpzSrvRule,
    /// `create_rpz_naptr_rule`
    CreateRpzNaptrRule,
    /// `create_rpz_txt_rule`
    CreateRpzTxtRule,
    /// `delete_rpz_rule`
    DeleteRpzRule,
    /// `search_rpz_rule`
    SearchRpzRule,
    /// `create_response_policy_zone`
    CreateResponsePolicyZone,
    /// `get_response_policy_zone`
    GetResponsePolicyZone,
    /// `delete_response_policy_zone`
    DeleteResponsePolicyZone,
    /// `ip_lookup`
    IpLookup,
    /// `list_host_info`
    ListHostInfo,
    /// `list_network_info`
    ListNetworkInfo,
    /// `dhcp_lease_lookup`
    DhcpLeaseLookup,
    /// `create_host_record`
    CreateHostRecord,
}

impl ActionKind {
    /// Every action, in catalogue order.
    pub const ALL: [Self; 20] = [
        Self::TestConnectivity,
        Self::CreateRpzCnameRule,
        Self::UpdateRpzCnameRule,
        Self::CreateRpzARule,
        Self::CreateRpzAaaaRule,
        Self::CreateRpzMxRule,
        Self::CreateRpzPtrRule,
        Self::CreateRpzSrvRule,
        Self::CreateRpzNaptrRule,
        Self::CreateRpzTxtRule,
        Self::DeleteRpzRule,
        Self::SearchRpzRule,
        Self::CreateResponsePolicyZone,
        Self::GetResponsePolicyZone,
        Self::DeleteResponsePolicyZone,
        Self::IpLookup,
        Self::ListHostInfo,
        Self::ListNetworkInfo,
        Self::DhcpLeaseLookup,
        Self::CreateHostRecord,
    ];

    /// The action id callers use.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TestConnectivity => "test_connectivity",
            Self::CreateRpzCnameRule => "create_rpz_cname_rule",
            Self::UpdateRpzCnameRule => "update_rpz_cname_rule",
            Self::CreateRpzARule => "create_rpz_a_rule",
            Self::CreateRpzAaaaRule => "create_rpz_aaaa_rule",
            Self::CreateRpzMxRule => "create_rpz_mx_rule",
            Self::CreateRpzPtrRule => "create_rpz_ptr_rule",
            Self::CreateRpzSrvRule => "create_rpz_srv_rule",
            Self::CreateRpzNaptrRule => "create_rpz_naptr_rule",
            Self::CreateRpzTxtRule => "create_rpz_txt_rule",
            Self::DeleteRpzRule => "delete_rpz_rule",
            Self::SearchRpzRule => "search_rpz_rule",
            Self::CreateResponsePolicyZone => "create_response_policy_zone",
            Self::GetResponsePolicyZone => "get_response_policy_zone",
            Self::DeleteResponsePolicyZone => "delete_response_policy_zone",
            Self::IpLookup => "ip_lookup",
            Self::ListHostInfo => "list_host_info",
            Self::ListNetworkInfo => "list_network_info",
            Self::DhcpLeaseLookup => "dhcp_lease_lookup",
            Self::CreateHostRecord => "create_host_record",
        }
    }

    /// Parameter schema of the action.
    #[must_use]
    pub const fn schema(self) -> ParamSchema {
        match self {
            Self::TestConnectivity => TestConnectivity::SCHEMA,
            Self::CreateRpzCnameRule => CreateCnameRule::SCHEMA,
            Self::UpdateRpzCnameRule => UpdateCnameRule::SCHEMA,
            Self::CreateRpzARule => CreateARule::SCHEMA,
            Self::CreateRpzAaaaRule => CreateAaaaRule::SCHEMA,
            Self::CreateRpzMxRule => CreateMxRule::SCHEMA,
            Self::CreateRpzPtrRule => CreatePtrRule::SCHEMA,
            Self::CreateRpzSrvRule => CreateSrvRule::SCHEMA,
            Self::CreateRpzNaptrRule => CreateNaptrRule::SCHEMA,
            Self::CreateRpzTxtRule => CreateTxtRule::SCHEMA,
            Self::DeleteRpzRule => DeleteRpzRule::SCHEMA,
            Self::SearchRpzRule => SearchRpzRule::SCHEMA,
            Self::CreateResponsePolicyZone => CreateResponsePolicyZone::SCHEMA,
            Self::GetResponsePolicyZone => GetResponsePolicyZone::SCHEMA,
            Self::DeleteResponsePolicyZone => DeleteResponsePolicyZone::SCHEMA,
            Self::IpLookup => IpLookup::SCHEMA,
            Self::ListHostInfo => ListHostInfo::SCHEMA,
            Self::ListNetworkInfo => ListNetworkInfo::SCHEMA,
            Self::DhcpLeaseLookup => DhcpLeaseLookup::SCHEMA,
            Self::CreateHostRecord => CreateHostRecord::SCHEMA,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ActionError::validation("action", format!("unknown action '{s}'")))
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Runs actions against one gateway.
///
/// The dispatcher holds no per-invocation state, so one instance can serve concurrent
/// invocations.
#[derive(Clone)]
pub struct ActionDispatcher {
    gateway: Arc<dyn WapiGateway>,
}

impl fmt::Debug for ActionDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDispatcher").finish_non_exhaustive()
    }
}

impl ActionDispatcher {
    /// Create a dispatcher over `gateway`.
    #[must_use]
    pub fn new(gateway: Arc<dyn WapiGateway>) -> Self {
        Self { gateway }
    }

    /// Run an action by id with raw JSON parameters.
    ///
    /// Never fails: unknown actions and malformed parameters produce a failed result.
    pub async fn dispatch(&self, action: &str, params: Value) -> ActionResult {
        let echoed = params.clone();

        let kind = match action.parse::<ActionKind>() {
            Ok(kind) => kind,
            Err(e) => {
                warn!(action = %action, error = %e, "Unknown action");
                return ActionResult::failure(action, echoed, &e, e.to_string());
            }
        };

        match ActionParams::from_value(params) {
            Ok(params) => self.dispatch_kind(kind, &params).await,
            Err(e) => {
                warn!(action = %kind, error = %e, "Action parameters are not an object");
                ActionResult::failure(kind.as_str(), echoed, &e, e.to_string())
            }
        }
    }

    /// Run an action with parsed parameters.
    pub async fn dispatch_kind(&self, kind: ActionKind, params: &ActionParams) -> ActionResult {
        match kind {
            ActionKind::TestConnectivity => self.run::<TestConnectivity>(kind, params).await,
            ActionKind::CreateRpzCnameRule => self.run::<CreateCnameRule>(kind, params).await,
            ActionKind::UpdateRpzCnameRule => self.run::<UpdateCnameRule>(kind, params).await,
            ActionKind::CreateRpzARule => self.run::<CreateARule>(kind, params).await,
            ActionKind::CreateRpzAaaaRule => self.run::<CreateAaaaRule>(kind, params).await,
            ActionKind::CreateRpzMxRule => self.run::<CreateMxRule>(kind, params).await,
            ActionKind::CreateRpzPtrRule => self.run::<CreatePtrRule>(kind, params).await,
            ActionKind::CreateRpzSrvRule => self.run::<CreateSrvRule>(kind, params).await,
            ActionKind::CreateRpzNaptrRule => self.run::<CreateNaptrRule>(kind, params).await,
            ActionKind::CreateRpzTxtRule => self.run::<CreateTxtRule>(kind, params).await,
            ActionKind::DeleteRpzRule => self.run::<DeleteRpzRule>(kind, params).await,
            ActionKind::SearchRpzRule => self.run::<SearchRpzRule>(kind, params).await,
            ActionKind::CreateResponsePolicyZone => {
                self.run::<CreateResponsePolicyZone>(kind, params).await
            }
            ActionKind::GetResponsePolicyZone => {
                self.run::<GetResponsePolicyZone>(kind, params).await
            }
            ActionKind::DeleteResponsePolicyZone => {
                self.run::<DeleteResponsePolicyZone>(kind, params).await
            }
            ActionKind::IpLookup => self.run::<IpLookup>(kind, params).await,
            ActionKind::ListHostInfo => self.run::<ListHostInfo>(kind, params).await,
            ActionKind::ListNetworkInfo => self.run::<ListNetworkInfo>(kind, params).await,
            ActionKind::DhcpLeaseLookup => self.run::<DhcpLeaseLookup>(kind, params).await,
            ActionKind::CreateHostRecord => self.run::<CreateHostRecord>(kind, params).await,
        }
    }

    async fn run<S: ActionStrategy>(&self, kind: ActionKind, params: &ActionParams) -> ActionResult {
        info!(action = %kind, "Running action");

        match self.execute::<S>(params).await {
            Ok(output) => {
                info!(
                    action = %kind,
                    objects = output.data.len(),
                    message = %output.message,
                    "Action succeeded"
                );
                ActionResult::success(kind.as_str(), params.to_value(), output)
            }
            Err(e) => {
                warn!(
                    action = %kind,
                    error_kind = e.kind(),
                    local = e.is_local(),
                    error = %e,
                    "Action failed"
                );
                ActionResult::failure(kind.as_str(), params.to_value(), &e, S::failure_message(&e))
            }
        }
    }

    async fn execute<S: ActionStrategy>(
        &self,
        params: &ActionParams,
    ) -> Result<ActionOutput, ActionError> {
        params.check_schema(&S::SCHEMA)?;
        let validated = S::validate(params)?;
        let request = S::build_request(&validated)?;

        debug!(verb = request.verb(), request = ?request, "Planned remote call");

        let outcome = request.execute(self.gateway.as_ref()).await?;
        S::summarize(&validated, outcome)
    }
}

// ============================================================================
// Helpers shared by strategies
// ============================================================================

/// Reference from a created or updated object, falling back to `fallback`.
pub(crate) fn object_reference(object: &Value, fallback: &str) -> String {
    object
        .get("_ref")
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_string()
}

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
mod ipam_tests;
