// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! IPAM actions: IP address lookup, host and network listing, DHCP lease lookup and host
//! record creation.
//!
//! Lookups translate their parameters into WAPI search filters. Extended attribute filters
//! (`Site=HQ,Owner=netops`) become `*Site=HQ` and `*Owner=netops`. Returned objects gain
//! `*_display` companions that flatten nested fields into readable text.

use std::net::{Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::ActionStrategy;
use crate::constants::{
    DEFAULT_MAX_RESULTS, IP_LOOKUP_STATUS_VALUES, LEASE_PROTOCOL_BOTH, LEASE_PROTOCOL_VALUES,
};
use crate::errors::ActionError;
use crate::extattrs::ExtAttrMap;
use crate::object_map::{entry_for, ObjectKey};
use crate::payload::{Payload, ADDITIONAL_PARAMETERS};
use crate::result::{
    add_extattrs_display, describe_filters, insert_field, join_list, join_nested, ActionOutput,
    Summary,
};
use crate::validation::{
    parse_ip, parse_ipv4, parse_ipv6, parse_network, select_ip_group, validate_hardware,
    validate_mac, ActionParams, IpSelector, JsonText, ParamSchema,
};
use crate::wapi::{ListQuery, WapiOutcome, WapiRequest};

const EXTENDED_ATTRIBUTES: &str = "extended_attributes";

/// Status value that adds no filter
const STATUS_ALL: &str = "ALL";

/// Lease fields holding epoch seconds
const LEASE_TIMESTAMP_FIELDS: &[&str] = &["starts", "ends", "cltt", "tstp", "tsfp"];

fn extattr_filter(params: &ActionParams) -> Result<ExtAttrMap, ActionError> {
    match params.str(EXTENDED_ATTRIBUTES)? {
        Some(text) => ExtAttrMap::parse(EXTENDED_ATTRIBUTES, &text),
        None => Ok(ExtAttrMap::default()),
    }
}

// ============================================================================
// IP lookup
// ============================================================================

/// A validated IP address lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct IpQuery {
    selector: IpSelector,
    status: Option<String>,
    extattrs: ExtAttrMap,
    limit: Option<usize>,
}

impl IpQuery {
    fn filters_applied(&self) -> Vec<(&'static str, String)> {
        let mut applied = match &self.selector {
            IpSelector::Address(ip) => vec![("IP Address", ip.to_string())],
            IpSelector::Network { cidr, .. } => vec![("Network", cidr.clone())],
            IpSelector::Range { from, to } => vec![("IP Range", format!("{from} - {to}"))],
        };
        if let Some(status) = &self.status {
            applied.push(("Status", status.clone()));
        }
        if !self.extattrs.is_empty() {
            applied.push(("Extended Attributes", self.extattrs.to_string()));
        }
        applied
    }
}

/// `ip_lookup`
///
/// The address family of the selector picks `ipv4address` or `ipv6address`.
#[derive(Debug)]
pub struct IpLookup;

impl ActionStrategy for IpLookup {
    type Validated = IpQuery;

    const SCHEMA: ParamSchema = ParamSchema {
        required: &[],
        optional: &[
            "ip_address",
            "network",
            "from_ip",
            "to_ip",
            "status",
            EXTENDED_ATTRIBUTES,
            "limit",
        ],
    };

    fn validate(params: &ActionParams) -> Result<IpQuery, ActionError> {
        Ok(IpQuery {
            selector: select_ip_group(params)?,
            status: params.enum_value("status", IP_LOOKUP_STATUS_VALUES)?,
            extattrs: extattr_filter(params)?,
            limit: params.limit("limit")?,
        })
    }

    fn build_request(query: &IpQuery) -> Result<WapiRequest, ActionError> {
        let key = if query.selector.is_ipv6() {
            ObjectKey::Ipv6Address
        } else {
            ObjectKey::Ipv4Address
        };
        let entry = entry_for(key)?;

        let mut list = ListQuery::new(entry.object_type)
            .return_fields(entry.return_fields)
            .limit(query.limit);
        list = match &query.selector {
            IpSelector::Address(ip) => list.filter("ip_address", ip.to_string()),
            IpSelector::Network { cidr, .. } => list.filter("network", cidr.as_str()),
            IpSelector::Range { from, to } => list
                .filter("ip_address>", from.to_string())
                .filter("ip_address<", to.to_string()),
        };
        if let Some(status) = query.status.as_deref().filter(|s| *s != STATUS_ALL) {
            list = list.filter("status", status);
        }

        Ok(WapiRequest::List(list.filters(query.extattrs.to_filters())))
    }

    fn summarize(query: &IpQuery, outcome: WapiOutcome) -> Result<ActionOutput, ActionError> {
        let mut records = outcome.into_objects()?;
        for record in &mut records {
            for field in ["types", "names", "usage", "conflict_types"] {
                let display = join_list(record.get(field));
                insert_field(record, &format!("{field}_display"), display);
            }
            let hardware = record
                .get("mac_address")
                .or_else(|| record.get("duid"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            insert_field(record, "mac_address_duid", hardware);
            add_extattrs_display(record);
        }

        let summary = Summary::listing(&records)
            .with("total_ip_records", records.len())
            .with("filters_applied", describe_filters(&query.filters_applied()));
        let message = format!("Successfully retrieved {} IP record(s)", records.len());
        Ok(ActionOutput::new(records, summary, message))
    }
}

// ============================================================================
// Host listing
// ============================================================================

/// A validated host record listing.
#[derive(Debug, Clone, PartialEq)]
pub struct HostQuery {
    name: Option<String>,
    ipv4: Option<Ipv4Addr>,
    ipv6: Option<Ipv6Addr>,
    extattrs: ExtAttrMap,
    limit: Option<usize>,
}

/// `list_host_info`
#[derive(Debug)]
pub struct ListHostInfo;

impl ActionStrategy for ListHostInfo {
    type Validated = HostQuery;

    const SCHEMA: ParamSchema = ParamSchema {
        required: &[],
        optional: &[
            "name",
            "ipv4_address",
            "ipv6_address",
            EXTENDED_ATTRIBUTES,
            "limit",
        ],
    };

    fn validate(params: &ActionParams) -> Result<HostQuery, ActionError> {
        Ok(HostQuery {
            name: params.str("name")?,
            ipv4: params
                .str("ipv4_address")?
                .map(|v| parse_ipv4("ipv4_address", &v))
                .transpose()?,
            ipv6: params
                .str("ipv6_address")?
                .map(|v| parse_ipv6("ipv6_address", &v))
                .transpose()?,
            extattrs: extattr_filter(params)?,
            limit: params.limit("limit")?,
        })
    }

    fn build_request(query: &HostQuery) -> Result<WapiRequest, ActionError> {
        let entry = entry_for(ObjectKey::Host)?;

        let mut list = ListQuery::new(entry.object_type)
            .return_fields(entry.return_fields)
            .limit(query.limit);
        if let Some(name) = &query.name {
            list = list.filter("name", name.as_str());
        }
        if let Some(ipv4) = query.ipv4 {
            list = list.filter("ipv4addr", ipv4.to_string());
        }
        if let Some(ipv6) = query.ipv6 {
            list = list.filter("ipv6addr", ipv6.to_string());
        }

        Ok(WapiRequest::List(list.filters(query.extattrs.to_filters())))
    }

    fn summarize(query: &HostQuery, outcome: WapiOutcome) -> Result<ActionOutput, ActionError> {
        let mut hosts = outcome.into_objects()?;
        hosts.iter_mut().for_each(add_host_display);

        let summary = Summary::listing(&hosts)
            .with("limit", query.limit.unwrap_or(DEFAULT_MAX_RESULTS))
            .with("name_filter_applied", query.name.is_some())
            .with("ipv4_filter_applied", query.ipv4.is_some())
            .with("ipv6_filter_applied", query.ipv6.is_some())
            .with("extended_attributes_filter_applied", !query.extattrs.is_empty());
        let message = format!("Successfully retrieved {} host record(s)", hosts.len());
        Ok(ActionOutput::new(hosts, summary, message))
    }
}

fn add_host_display(host: &mut Value) {
    let ipv4 = join_nested(host.get("ipv4addrs"), "ipv4addr");
    let ipv6 = join_nested(host.get("ipv6addrs"), "ipv6addr");
    insert_field(host, "ipv4addrs_display", ipv4);
    insert_field(host, "ipv6addrs_display", ipv6);
    add_extattrs_display(host);
}

// ============================================================================
// Network listing
// ============================================================================

/// A validated network listing.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkQuery {
    network: Option<String>,
    extattrs: ExtAttrMap,
    limit: Option<usize>,
}

/// `list_network_info`
#[derive(Debug)]
pub struct ListNetworkInfo;

impl ActionStrategy for ListNetworkInfo {
    type Validated = NetworkQuery;

    const SCHEMA: ParamSchema = ParamSchema {
        required: &[],
        optional: &["network", EXTENDED_ATTRIBUTES, "limit"],
    };

    fn validate(params: &ActionParams) -> Result<NetworkQuery, ActionError> {
        let network = params.str("network")?;
        if let Some(cidr) = &network {
            parse_network("network", cidr)?;
        }
        Ok(NetworkQuery {
            network,
            extattrs: extattr_filter(params)?,
            limit: params.limit("limit")?,
        })
    }

    fn build_request(query: &NetworkQuery) -> Result<WapiRequest, ActionError> {
        let entry = entry_for(ObjectKey::Network)?;

        let mut list = ListQuery::new(entry.object_type)
            .return_fields(entry.return_fields)
            .limit(query.limit);
        if let Some(network) = &query.network {
            list = list.filter("network", network.as_str());
        }

        Ok(WapiRequest::List(list.filters(query.extattrs.to_filters())))
    }

    fn summarize(query: &NetworkQuery, outcome: WapiOutcome) -> Result<ActionOutput, ActionError> {
        let mut networks = outcome.into_objects()?;
        for network in &mut networks {
            let members = members_display(network.get("members"));
            let options = options_display(network.get("options"));
            insert_field(network, "members_display", members);
            insert_field(network, "options_display", options);
            add_extattrs_display(network);
        }

        let summary = Summary::listing(&networks)
            .with("limit", query.limit.unwrap_or(DEFAULT_MAX_RESULTS))
            .with("network_filter_applied", query.network.is_some())
            .with("extended_attributes_filter_applied", !query.extattrs.is_empty());
        let message = format!("Successfully retrieved {} network record(s)", networks.len());
        Ok(ActionOutput::new(networks, summary, message))
    }
}

/// DHCP members by name, falling back to their address.
fn members_display(members: Option<&Value>) -> String {
    let Some(Value::Array(members)) = members else {
        return String::new();
    };
    members
        .iter()
        .filter_map(|m| {
            m.get("name")
                .or_else(|| m.get("ipv4addr"))
                .or_else(|| m.get("ipv6addr"))
                .and_then(Value::as_str)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// DHCP options as `name=value`.
fn options_display(options: Option<&Value>) -> String {
    let Some(Value::Array(options)) = options else {
        return String::new();
    };
    options
        .iter()
        .filter_map(|o| {
            let name = o.get("name").and_then(Value::as_str)?;
            let value = match o.get("value") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            };
            Some(format!("{name}={value}"))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// DHCP lease lookup
// ============================================================================

/// A validated lease lookup: WAPI filters plus their human labels.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaseQuery {
    filters: Vec<(String, String)>,
    applied: Vec<(&'static str, String)>,
    limit: Option<usize>,
}

/// `dhcp_lease_lookup`
#[derive(Debug)]
pub struct DhcpLeaseLookup;

impl ActionStrategy for DhcpLeaseLookup {
    type Validated = LeaseQuery;

    const SCHEMA: ParamSchema = ParamSchema {
        required: &[],
        optional: &[
            "ip_address",
            "hardware",
            "hostname",
            "ipv6_duid",
            "protocol",
            "fingerprint",
            "username",
            "limit",
        ],
    };

    fn validate(params: &ActionParams) -> Result<LeaseQuery, ActionError> {
        let mut query = LeaseQuery {
            filters: Vec::new(),
            applied: Vec::new(),
            limit: params.limit("limit")?,
        };
        let mut add = |key: &str, label: &'static str, value: String| {
            query.filters.push((key.to_string(), value.clone()));
            query.applied.push((label, value));
        };

        if let Some(ip) = params.str("ip_address")? {
            add("address", "IP Address", parse_ip("ip_address", &ip)?.to_string());
        }
        if let Some(hardware) = params.str("hardware")? {
            validate_hardware("hardware", &hardware)?;
            match hardware.strip_prefix('~') {
                Some(pattern) => add("hardware~", "Hardware", pattern.to_string()),
                None => add("hardware", "Hardware", hardware.clone()),
            }
        }
        if let Some(hostname) = params.str("hostname")? {
            add("client_hostname", "Hostname", hostname);
        }
        if let Some(duid) = params.str("ipv6_duid")? {
            add("ipv6_duid", "IPv6 DUID", duid);
        }
        if let Some(protocol) = params.enum_value("protocol", LEASE_PROTOCOL_VALUES)? {
            if protocol != LEASE_PROTOCOL_BOTH {
                add("protocol", "Protocol", protocol);
            }
        }
        if let Some(fingerprint) = params.str("fingerprint")? {
            add("fingerprint", "Fingerprint", fingerprint);
        }
        if let Some(username) = params.str("username")? {
            add("username", "Username", username);
        }

        Ok(query)
    }

    fn build_request(query: &LeaseQuery) -> Result<WapiRequest, ActionError> {
        let entry = entry_for(ObjectKey::Lease)?;
        Ok(WapiRequest::List(
            ListQuery::new(entry.object_type)
                .filters(query.filters.clone())
                .return_fields(entry.return_fields)
                .limit(query.limit),
        ))
    }

    fn summarize(query: &LeaseQuery, outcome: WapiOutcome) -> Result<ActionOutput, ActionError> {
        let mut leases = outcome.into_objects()?;
        leases.iter_mut().for_each(add_lease_display);

        let summary = Summary::listing(&leases)
            .with("total_lease_records", leases.len())
            .with("filters_applied", describe_filters(&query.applied));
        let message = format!(
            "Successfully retrieved {} DHCP lease record(s)",
            leases.len()
        );
        Ok(ActionOutput::new(leases, summary, message))
    }
}

fn add_lease_display(lease: &mut Value) {
    for field in LEASE_TIMESTAMP_FIELDS {
        let display = lease
            .get(*field)
            .and_then(Value::as_i64)
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .map(|ts| ts.to_rfc3339());
        if let Some(display) = display {
            insert_field(lease, &format!("{field}_display"), display);
        }
    }
}

// ============================================================================
// Host record creation
// ============================================================================

/// A validated host record create.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHost {
    name: String,
    ipv4addrs: Vec<Value>,
    ipv6addrs: Vec<Value>,
    aliases: Vec<String>,
    view: Option<String>,
    comment: Option<String>,
    configure_for_dns: Option<bool>,
    extattrs: ExtAttrMap,
    additional: Option<JsonText>,
}

/// `create_host_record`
#[derive(Debug)]
pub struct CreateHostRecord;

impl ActionStrategy for CreateHostRecord {
    type Validated = NewHost;

    const SCHEMA: ParamSchema = ParamSchema {
        required: &["name"],
        optional: &[
            "ipv4_addresses",
            "ipv6_addresses",
            "aliases",
            "view",
            "comment",
            "configure_for_dns",
            EXTENDED_ATTRIBUTES,
            ADDITIONAL_PARAMETERS,
        ],
    };

    fn validate(params: &ActionParams) -> Result<NewHost, ActionError> {
        let ipv4addrs = address_list(params, "ipv4_addresses", "ipv4addr", |field, v| {
            parse_ipv4(field, v).map(|ip| ip.to_string())
        })?;
        let ipv6addrs = address_list(params, "ipv6_addresses", "ipv6addr", |field, v| {
            parse_ipv6(field, v).map(|ip| ip.to_string())
        })?;

        if ipv4addrs.is_empty() && ipv6addrs.is_empty() {
            return Err(ActionError::validation(
                "ipv4_addresses",
                "at least one of ipv4_addresses or ipv6_addresses must be provided",
            ));
        }

        let aliases = params
            .str("aliases")?
            .map(|text| {
                text.split(',')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(NewHost {
            name: params.required_str("name")?,
            ipv4addrs,
            ipv6addrs,
            aliases,
            view: params.str("view")?,
            comment: params.comment("comment")?,
            configure_for_dns: params.bool("configure_for_dns")?,
            extattrs: extattr_filter(params)?,
            additional: params.raw_json(ADDITIONAL_PARAMETERS),
        })
    }

    fn build_request(host: &NewHost) -> Result<WapiRequest, ActionError> {
        let entry = entry_for(ObjectKey::Host)?;

        let mut payload = Payload::new(entry);
        payload
            .set("name", host.name.as_str())
            .set_opt("view", host.view.as_deref())
            .set_opt("comment", host.comment.as_deref())
            .set_opt("configure_for_dns", host.configure_for_dns);
        if !host.ipv4addrs.is_empty() {
            payload.set("ipv4addrs", host.ipv4addrs.clone());
        }
        if !host.ipv6addrs.is_empty() {
            payload.set("ipv6addrs", host.ipv6addrs.clone());
        }
        if !host.aliases.is_empty() {
            payload.set("aliases", host.aliases.clone());
        }
        if !host.extattrs.is_empty() {
            payload.set("extattrs", host.extattrs.to_payload());
        }
        payload.merge_additional(host.additional.clone())?;

        Ok(WapiRequest::Create {
            object_type: entry.object_type.to_string(),
            payload: payload.into_value(),
            return_fields: entry.return_fields.to_string(),
        })
    }

    fn summarize(host: &NewHost, outcome: WapiOutcome) -> Result<ActionOutput, ActionError> {
        let created = outcome.into_created()?;
        let reference = created.reference.to_string();
        let mut object = created.object;
        add_host_display(&mut object);

        let view = object
            .get("view")
            .cloned()
            .unwrap_or_else(|| host.view.clone().into());

        Ok(ActionOutput::new(
            vec![object],
            Summary::single()
                .with("reference_id", reference.as_str())
                .with("name", host.name.as_str())
                .with("view", view),
            format!("Successfully created Host Record. Reference ID: {reference}"),
        ))
    }
}

/// Parse a JSON array of host addresses.
///
/// Elements are objects carrying `addr_field` (plus optional `mac` and any other host address
/// fields) or bare address strings.
fn address_list<F>(
    params: &ActionParams,
    key: &str,
    addr_field: &str,
    parse: F,
) -> Result<Vec<Value>, ActionError>
where
    F: Fn(&str, &str) -> Result<String, ActionError>,
{
    let Some(raw) = params.raw_json(key) else {
        return Ok(Vec::new());
    };

    let items = match raw.decode(key)? {
        Value::Array(items) => items,
        _ => return Err(ActionError::parse(key, "expected a JSON array of addresses")),
    };

    items
        .into_iter()
        .map(|item| {
            let mut entry = match item {
                Value::String(address) => {
                    let mut map = Map::new();
                    map.insert(addr_field.to_string(), Value::String(address));
                    map
                }
                Value::Object(map) => map,
                _ => {
                    return Err(ActionError::validation(
                        key,
                        "each address must be an object or an address string",
                    ))
                }
            };

            let address = entry
                .get(addr_field)
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    ActionError::validation(key, format!("each address needs '{addr_field}'"))
                })?;
            let address = parse(key, address)?;
            entry.insert(addr_field.to_string(), Value::String(address));

            if let Some(mac) = entry.get("mac") {
                let mac = mac
                    .as_str()
                    .ok_or_else(|| ActionError::validation(key, "'mac' must be a string"))?;
                validate_mac(key, mac)?;
            }

            Ok(Value::Object(entry))
        })
        .collect()
}
