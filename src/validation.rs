// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Parameter validation for actions.
//!
//! Every action receives a flat JSON object of raw parameters. [`ActionParams`] wraps that object
//! and exposes typed accessors that normalize the loose input shapes callers send (strings,
//! numbers, booleans, empty strings meaning "not supplied"). Each accessor fails with
//! [`ActionError::Validation`] naming the offending parameter.
//!
//! Cross-field rules shared by several actions (IP families, CIDR networks, MAC formats,
//! enumerations and the `ip_address` / `network` / range selector group) live here too, so
//! every check runs before any remote call is attempted.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::constants::{MAX_COMMENT_LEN, MAX_U16_FIELD};
use crate::errors::ActionError;

/// `xx:xx:xx:xx:xx:xx` or `xx-xx-xx-xx-xx-xx`
static MAC_SEPARATED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:([0-9A-Fa-f]{2}:){5}|([0-9A-Fa-f]{2}-){5})[0-9A-Fa-f]{2}$")
        .expect("static regex")
});

/// `xxxx.xxxx.xxxx`
static MAC_DOTTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9A-Fa-f]{4}\.){2}[0-9A-Fa-f]{4}$").expect("static regex"));

/// `xxxxxxxxxxxx`
static MAC_BARE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Fa-f]{12}$").expect("static regex"));

/// Closed parameter schema of one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSchema {
    /// Parameters that must be present and non-empty
    pub required: &'static [&'static str],
    /// Parameters that may be present
    pub optional: &'static [&'static str],
}

impl ParamSchema {
    /// Schema accepting no parameters at all.
    pub const EMPTY: Self = Self {
        required: &[],
        optional: &[],
    };

    /// Whether `key` belongs to the schema.
    #[must_use]
    pub fn allows(&self, key: &str) -> bool {
        self.required.contains(&key) || self.optional.contains(&key)
    }
}

/// Raw parameters of one action invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionParams(Map<String, Value>);

impl From<Map<String, Value>> for ActionParams {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl ActionParams {
    /// Wrap a JSON value, which must be an object (or `null` for "no parameters").
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Validation`] if the value is neither an object nor `null`.
    pub fn from_value(value: Value) -> Result<Self, ActionError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(ActionError::validation(
                "parameters",
                format!("expected a JSON object, got {}", json_type_name(&other)),
            )),
        }
    }

    /// The raw parameters, as echoed back in action results.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Check the parameters against a closed schema.
    ///
    /// Unknown keys are rejected, and every required key must carry a non-empty value.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Validation`] naming the first unknown or missing parameter.
    pub fn check_schema(&self, schema: &ParamSchema) -> Result<(), ActionError> {
        if let Some(unknown) = self.0.keys().find(|k| !schema.allows(k)) {
            return Err(ActionError::validation(
                unknown.as_str(),
                "unknown parameter for this action",
            ));
        }

        for required in schema.required {
            if !self.is_supplied(required) {
                return Err(ActionError::validation(*required, "parameter is required"));
            }
        }

        Ok(())
    }

    /// Whether a parameter carries a value (`null` and `""` count as absent).
    #[must_use]
    pub fn is_supplied(&self, key: &str) -> bool {
        match self.0.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        }
    }

    /// Optional string parameter, trimmed. Numbers and booleans are rendered as text.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Validation`] for arrays and objects.
    pub fn str(&self, key: &str) -> Result<Option<String>, ActionError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
            }
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(other) => Err(ActionError::validation(
                key,
                format!("expected a string, got {}", json_type_name(other)),
            )),
        }
    }

    /// Required string parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Validation`] if absent, empty or not scalar.
    pub fn required_str(&self, key: &str) -> Result<String, ActionError> {
        self.str(key)?
            .ok_or_else(|| ActionError::validation(key, "parameter is required"))
    }

    /// Optional integer parameter.
    ///
    /// Accepts JSON integers, integral floats (`5.0`) and strings holding either.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Validation`] if the value is not an integer.
    pub fn int(&self, key: &str) -> Result<Option<i64>, ActionError> {
        let invalid =
            || ActionError::validation(key, "please provide a valid integer value");

        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    Ok(Some(i))
                } else {
                    n.as_f64().and_then(integral).map(Some).ok_or_else(invalid)
                }
            }
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                if let Ok(i) = trimmed.parse::<i64>() {
                    return Ok(Some(i));
                }
                trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(integral)
                    .map(Some)
                    .ok_or_else(invalid)
            }
            Some(_) => Err(invalid()),
        }
    }

    /// Optional 16-bit record field (`priority`, `weight`, `port`, `preference`, `order`).
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Validation`] unless the value is an integer in 0–65535.
    pub fn u16_field(&self, key: &str) -> Result<Option<u16>, ActionError> {
        self.int(key)?
            .map(|v| u16::try_from(v).map_err(|_| out_of_range(key)))
            .transpose()
    }

    /// Required 16-bit record field.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Validation`] if absent or out of range.
    pub fn required_u16(&self, key: &str) -> Result<u16, ActionError> {
        self.u16_field(key)?
            .ok_or_else(|| ActionError::validation(key, "parameter is required"))
    }

    /// Optional `limit`: a positive integer.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Validation`] for zero, negative or non-integer values.
    pub fn limit(&self, key: &str) -> Result<Option<usize>, ActionError> {
        match self.int(key)? {
            None => Ok(None),
            Some(v) if v > 0 => usize::try_from(v).map(Some).map_err(|_| {
                ActionError::validation(key, "please provide a non-zero positive integer value")
            }),
            Some(_) => Err(ActionError::validation(
                key,
                "please provide a non-zero positive integer value",
            )),
        }
    }

    /// Optional boolean. Accepts JSON booleans and the strings `true`/`false`.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Validation`] for anything else.
    pub fn bool(&self, key: &str) -> Result<Option<bool>, ActionError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "" => Ok(None),
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(ActionError::validation(key, "expected true or false")),
            },
            Some(other) => Err(ActionError::validation(
                key,
                format!("expected a boolean, got {}", json_type_name(other)),
            )),
        }
    }

    /// Optional comment, limited to 256 characters.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Validation`] if the comment is too long.
    pub fn comment(&self, key: &str) -> Result<Option<String>, ActionError> {
        let comment = self.str(key)?;
        if let Some(text) = &comment {
            if text.chars().count() > MAX_COMMENT_LEN {
                return Err(ActionError::validation(
                    key,
                    format!("comment length cannot exceed {MAX_COMMENT_LEN} characters"),
                ));
            }
        }
        Ok(comment)
    }

    /// Optional parameter restricted to a fixed set of values.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Validation`] listing the accepted values.
    pub fn enum_value(
        &self,
        key: &str,
        allowed: &[&str],
    ) -> Result<Option<String>, ActionError> {
        match self.str(key)? {
            None => Ok(None),
            Some(v) if allowed.contains(&v.as_str()) => Ok(Some(v)),
            Some(v) => Err(ActionError::validation(
                key,
                format!("'{v}' is not valid, expected one of: {}", allowed.join(", ")),
            )),
        }
    }

    /// Optional raw JSON text parameter. Values that are already JSON objects or arrays are
    /// passed through.
    #[must_use]
    pub fn raw_json(&self, key: &str) -> Option<JsonText> {
        match self.0.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(Value::String(s)) => Some(JsonText::Text(s.clone())),
            Some(other) => Some(JsonText::Value(other.clone())),
        }
    }
}

/// A parameter that carries JSON, either as text or as an already decoded value.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonText {
    /// Text to be parsed
    Text(String),
    /// Pre-decoded value
    Value(Value),
}

impl JsonText {
    /// Decode into a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Parse`] if the text is not valid JSON.
    pub fn decode(self, field: &str) -> Result<Value, ActionError> {
        match self {
            Self::Value(v) => Ok(v),
            Self::Text(text) => serde_json::from_str(&text)
                .map_err(|e| ActionError::parse(field, format!("invalid JSON: {e}"))),
        }
    }

    /// Decode into a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Parse`] if the text is not valid JSON or not an object.
    pub fn decode_object(self, field: &str) -> Result<Map<String, Value>, ActionError> {
        match self.decode(field)? {
            Value::Object(map) => Ok(map),
            other => Err(ActionError::parse(
                field,
                format!("expected a JSON object, got {}", json_type_name(&other)),
            )),
        }
    }
}

/// How an IP lookup selects addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpSelector {
    /// A single address
    Address(IpAddr),
    /// Every address in a CIDR network
    Network {
        /// Network in CIDR notation, as supplied
        cidr: String,
        /// Network base address (selects the address family)
        base: IpAddr,
    },
    /// An inclusive address range
    Range {
        /// First address
        from: IpAddr,
        /// Last address
        to: IpAddr,
    },
}

impl IpSelector {
    /// Whether the selector addresses IPv6 space.
    #[must_use]
    pub fn is_ipv6(&self) -> bool {
        match self {
            Self::Address(ip) | Self::Network { base: ip, .. } | Self::Range { from: ip, .. } => {
                ip.is_ipv6()
            }
        }
    }
}

/// Resolve the `ip_address` / `network` / (`from_ip` + `to_ip`) group.
///
/// Exactly one of the three must be supplied, and a range needs both ends.
///
/// # Errors
///
/// Returns [`ActionError::Validation`] when zero or several groups are supplied, when only one
/// end of a range is present, or when an address or network does not parse.
pub fn select_ip_group(params: &ActionParams) -> Result<IpSelector, ActionError> {
    let ip_address = params.str("ip_address")?;
    let network = params.str("network")?;
    let from_ip = params.str("from_ip")?;
    let to_ip = params.str("to_ip")?;

    let range_given = from_ip.is_some() || to_ip.is_some();
    let groups = [ip_address.is_some(), network.is_some(), range_given]
        .iter()
        .filter(|g| **g)
        .count();

    match groups {
        0 => {
            return Err(ActionError::validation(
                "ip_address",
                "one of ip_address, network or from_ip/to_ip must be provided",
            ))
        }
        1 => {}
        _ => {
            return Err(ActionError::validation(
                "ip_address",
                "only one of ip_address, network or from_ip/to_ip can be provided",
            ))
        }
    }

    if let Some(address) = ip_address {
        return parse_ip("ip_address", &address).map(IpSelector::Address);
    }

    if let Some(cidr) = network {
        let base = parse_network("network", &cidr)?;
        return Ok(IpSelector::Network { cidr, base });
    }

    let (Some(from), Some(to)) = (from_ip, to_ip) else {
        return Err(ActionError::validation(
            "from_ip",
            "from_ip and to_ip must be provided together",
        ));
    };

    let from = parse_ip("from_ip", &from)?;
    let to = parse_ip("to_ip", &to)?;
    if from.is_ipv4() != to.is_ipv4() {
        return Err(ActionError::validation(
            "to_ip",
            "from_ip and to_ip must be the same IP version",
        ));
    }
    if from > to {
        return Err(ActionError::validation(
            "from_ip",
            format!("from_ip ({from}) must be less than or equal to to_ip ({to})"),
        ));
    }

    Ok(IpSelector::Range { from, to })
}

/// Parse an IPv4 or IPv6 address.
///
/// # Errors
///
/// Returns [`ActionError::Validation`] if `value` is not an IP address.
pub fn parse_ip(field: &str, value: &str) -> Result<IpAddr, ActionError> {
    value
        .trim()
        .parse::<IpAddr>()
        .map_err(|_| ActionError::validation(field, format!("invalid IP address format: {value}")))
}

/// Parse an IPv4 address.
///
/// # Errors
///
/// Returns [`ActionError::Validation`] if `value` is not an IPv4 address.
pub fn parse_ipv4(field: &str, value: &str) -> Result<Ipv4Addr, ActionError> {
    value
        .trim()
        .parse::<Ipv4Addr>()
        .map_err(|_| ActionError::validation(field, format!("invalid IPv4 address format: {value}")))
}

/// Parse an IPv6 address.
///
/// # Errors
///
/// Returns [`ActionError::Validation`] if `value` is not an IPv6 address.
pub fn parse_ipv6(field: &str, value: &str) -> Result<Ipv6Addr, ActionError> {
    value
        .trim()
        .parse::<Ipv6Addr>()
        .map_err(|_| ActionError::validation(field, format!("invalid IPv6 address format: {value}")))
}

/// Parse a network in CIDR notation (a bare address counts as a host network).
///
/// Host bits may be set. Returns the address part, which selects the family.
///
/// # Errors
///
/// Returns [`ActionError::Validation`] if the address or prefix length is invalid.
pub fn parse_network(field: &str, value: &str) -> Result<IpAddr, ActionError> {
    let invalid = || {
        ActionError::validation(
            field,
            format!("invalid network format: {value}, expected CIDR notation such as 192.168.1.0/24"),
        )
    };

    let (address, prefix) = match value.trim().split_once('/') {
        Some((address, prefix)) => (address, Some(prefix)),
        None => (value.trim(), None),
    };

    let base: IpAddr = address.parse().map_err(|_| invalid())?;
    if let Some(prefix) = prefix {
        let bits: u8 = prefix.parse().map_err(|_| invalid())?;
        let max = if base.is_ipv4() { 32 } else { 128 };
        if bits > max {
            return Err(invalid());
        }
    }

    Ok(base)
}

/// Validate a host MAC address (`xx:xx:xx:xx:xx:xx` or `xx-xx-xx-xx-xx-xx`).
///
/// # Errors
///
/// Returns [`ActionError::Validation`] for any other format.
pub fn validate_mac(field: &str, value: &str) -> Result<(), ActionError> {
    if MAC_SEPARATED_RE.is_match(value) {
        Ok(())
    } else {
        Err(ActionError::validation(
            field,
            format!("invalid MAC address format: {value}"),
        ))
    }
}

/// Validate a lease hardware filter.
///
/// Accepts the separated, dotted and bare MAC forms, or a server-side regular expression
/// starting with `~`.
///
/// # Errors
///
/// Returns [`ActionError::Validation`] for any other format.
pub fn validate_hardware(field: &str, value: &str) -> Result<(), ActionError> {
    let accepted = value.starts_with('~')
        || MAC_SEPARATED_RE.is_match(value)
        || MAC_DOTTED_RE.is_match(value)
        || MAC_BARE_RE.is_match(value);

    if accepted {
        Ok(())
    } else {
        Err(ActionError::validation(
            field,
            format!("invalid MAC address format: {value}, use xx:xx:xx:xx:xx:xx, xx-xx-xx-xx-xx-xx, xxxx.xxxx.xxxx, xxxxxxxxxxxx or a ~regex"),
        ))
    }
}

fn integral(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        #[allow(clippy::cast_possible_truncation)]
        Some(f as i64)
    } else {
        None
    }
}

fn out_of_range(key: &str) -> ActionError {
    ActionError::validation(key, format!("value must be between 0 and {MAX_U16_FIELD}"))
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod validation_tests;
