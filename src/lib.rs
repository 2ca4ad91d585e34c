// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#![allow(unexpected_cfgs)]

//! # wapictl - RPZ and IPAM actions for grid WAPI servers
//!
//! wapictl lets an orchestration caller run DNS firewall (Response Policy Zone) and IPAM
//! operations against a grid manager's WAPI object API.
//!
//! ## Overview
//!
//! Each caller request names an action and carries loosely typed parameters. The crate:
//!
//! - Validates and normalizes the parameters against a closed per-action schema
//! - Resolves a logical rule description (record kind, rule type, object type) to a concrete
//!   WAPI object type through a static table
//! - Builds the request payload and merges caller-supplied `additional_parameters` without
//!   overwriting typed fields
//! - Parses extended attribute syntax (`Site=HQ,Owner="a,b"`) into payload blocks or filters
//! - Shapes every response into the same [`result::ActionResult`]
//!
//! ## Modules
//!
//! - [`actions`] - Action strategies and the dispatcher
//! - [`wapi`] - Remote call descriptions, the gateway trait and the HTTP client
//! - [`object_map`] - Rule kind and target to object type table
//! - [`payload`] - Payload assembly and `additional_parameters` merging
//! - [`extattrs`] - Extended attribute parsing
//! - [`validation`] - Parameter accessors and address validation
//! - [`result`] - Uniform action results
//! - [`config`] - Connection settings
//! - [`errors`] - Action error types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use serde_json::json;
//! use wapictl::{actions::ActionDispatcher, config::Config, wapi::client::WapiClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::load(None)?;
//! let dispatcher = ActionDispatcher::new(Arc::new(WapiClient::new(&config)?));
//!
//! let result = dispatcher
//!     .dispatch(
//!         "create_rpz_cname_rule",
//!         json!({
//!             "name": "bad.example.com",
//!             "rp_zone": "rpz.local",
//!             "rule_type": "Block (No such domain)",
//!             "object_type": "Domain Name"
//!         }),
//!     )
//!     .await;
//! assert!(result.is_success());
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod config;
pub mod constants;
pub mod errors;
pub mod extattrs;
pub mod object_map;
pub mod payload;
pub mod result;
pub mod validation;
pub mod wapi;
