// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Mapping from logical rule descriptions to WAPI object types.
//!
//! Callers describe RPZ rules with human labels (`rule_type = "Block (No data)"`,
//! `object_type = "Domain Name"`). This module resolves those labels into typed keys, looks the
//! key up in [`OBJECT_TYPE_TABLE`], and hands back the remote object type together with its
//! field schema and return field list.
//!
//! The table is a `static` slice: it is built at compile time, never mutated, and safe to read
//! from any number of concurrent invocations.
//!
//! It also owns the two naming rules every rule create shares: qualifying a rule name with its
//! policy zone, and deriving reverse-lookup names for PTR rules.

use std::fmt;
use std::net::IpAddr;

use crate::constants::{
    CANONICAL_BLOCK_NO_DOMAIN, CANONICAL_PASSTHRU, CANONICAL_WILDCARD,
    CANONICAL_WILDCARD_PASSTHRU, OBJ_HOST, OBJ_IPV4_ADDRESS, OBJ_IPV6_ADDRESS, OBJ_LEASE,
    OBJ_NETWORK, OBJ_RPZ_A, OBJ_RPZ_AAAA, OBJ_RPZ_AAAA_IP, OBJ_RPZ_A_IP, OBJ_RPZ_CNAME,
    OBJ_RPZ_CNAME_CLIENT_IP, OBJ_RPZ_CNAME_IP, OBJ_RPZ_MX, OBJ_RPZ_NAPTR, OBJ_RPZ_PTR,
    OBJ_RPZ_SRV, OBJ_RPZ_TXT, OBJ_ZONE_RP, RETURN_FIELDS_HOST, RETURN_FIELDS_IPV4_ADDRESS,
    RETURN_FIELDS_IPV6_ADDRESS, RETURN_FIELDS_LEASE, RETURN_FIELDS_NETWORK,
    RETURN_FIELDS_RPZ_A, RETURN_FIELDS_RPZ_AAAA, RETURN_FIELDS_RPZ_CNAME,
    RETURN_FIELDS_RPZ_CNAME_IP, RETURN_FIELDS_RPZ_MX, RETURN_FIELDS_RPZ_NAPTR,
    RETURN_FIELDS_RPZ_PTR, RETURN_FIELDS_RPZ_SRV, RETURN_FIELDS_RPZ_TXT, RETURN_FIELDS_ZONE_RP,
};
use crate::errors::ActionError;

// ============================================================================
// Rule labels
// ============================================================================

/// Policy of an RPZ CNAME rule (`rule_type` parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CnamePolicy {
    /// Let the query through unchanged
    Passthru,
    /// Answer NXDOMAIN
    BlockNoSuchDomain,
    /// Answer NODATA
    BlockNoData,
    /// Rewrite the answer to another domain name
    Substitute,
}

impl CnamePolicy {
    /// Every policy, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Passthru,
        Self::BlockNoSuchDomain,
        Self::BlockNoData,
        Self::Substitute,
    ];

    /// The label callers use for this policy.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Passthru => "Passthru",
            Self::BlockNoSuchDomain => "Block (No such domain)",
            Self::BlockNoData => "Block (No data)",
            Self::Substitute => "Substitute (domain name)",
        }
    }

    /// Parse a `rule_type` label.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Mapping`] for unknown labels.
    pub fn from_label(label: &str, object_type: &str) -> Result<Self, ActionError> {
        Self::ALL
            .into_iter()
            .find(|p| p.label() == label)
            .ok_or_else(|| ActionError::Mapping {
                rule_type: label.to_string(),
                object_type: object_type.to_string(),
            })
    }
}

/// What an RPZ rule matches on (`object_type` parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleTarget {
    /// Queried domain name (QNAME trigger)
    DomainName,
    /// Address in the response (IP trigger)
    IpAddress,
    /// Address of the querying client
    ClientIpAddress,
}

impl RuleTarget {
    /// Every target, in declaration order.
    pub const ALL: [Self; 3] = [Self::DomainName, Self::IpAddress, Self::ClientIpAddress];

    /// The label callers use for this target.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DomainName => "Domain Name",
            Self::IpAddress => "IP address",
            Self::ClientIpAddress => "Client IP Address",
        }
    }

    /// Parse an `object_type` label.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Mapping`] for unknown labels.
    pub fn from_label(label: &str, rule_type: &str) -> Result<Self, ActionError> {
        Self::ALL
            .into_iter()
            .find(|t| t.label() == label)
            .ok_or_else(|| ActionError::Mapping {
                rule_type: rule_type.to_string(),
                object_type: label.to_string(),
            })
    }

    /// Derive the target of an existing CNAME rule from its reference's object type.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Validation`] if the object type is not a CNAME rule type.
    pub fn from_cname_object_type(object_type: &str) -> Result<Self, ActionError> {
        match object_type {
            OBJ_RPZ_CNAME => Ok(Self::DomainName),
            OBJ_RPZ_CNAME_IP => Ok(Self::IpAddress),
            OBJ_RPZ_CNAME_CLIENT_IP => Ok(Self::ClientIpAddress),
            other => Err(ActionError::validation(
                "reference_id",
                format!("'{other}' is not an RPZ CNAME rule reference"),
            )),
        }
    }
}

/// DNS record kind of an RPZ rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Policy rule expressed as a CNAME (block, passthru, substitute)
    Cname,
    /// IPv4 address substitution
    A,
    /// IPv6 address substitution
    Aaaa,
    /// Mail exchanger substitution
    Mx,
    /// Reverse lookup substitution
    Ptr,
    /// Service locator substitution
    Srv,
    /// Naming authority pointer substitution
    Naptr,
    /// Text record substitution
    Txt,
}

impl RecordKind {
    /// Record kind label used in messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cname => "CNAME",
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Mx => "MX",
            Self::Ptr => "PTR",
            Self::Srv => "SRV",
            Self::Naptr => "NAPTR",
            Self::Txt => "TXT",
        }
    }
}

// ============================================================================
// Object type table
// ============================================================================

/// Key of one [`ObjectTypeEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKey {
    /// RPZ rule of a record kind on a target
    RpzRule {
        /// Record kind
        kind: RecordKind,
        /// Trigger the rule matches on
        target: RuleTarget,
    },
    /// Response policy zone
    ResponsePolicyZone,
    /// Host record
    Host,
    /// IPv4 network
    Network,
    /// IPv4 address lookup
    Ipv4Address,
    /// IPv6 address lookup
    Ipv6Address,
    /// DHCP lease
    Lease,
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RpzRule { kind, target } => {
                write!(f, "RPZ {} rule on {}", kind.label(), target.label())
            }
            Self::ResponsePolicyZone => f.write_str("response policy zone"),
            Self::Host => f.write_str("host record"),
            Self::Network => f.write_str("network"),
            Self::Ipv4Address => f.write_str("IPv4 address"),
            Self::Ipv6Address => f.write_str("IPv6 address"),
            Self::Lease => f.write_str("DHCP lease"),
        }
    }
}

/// JSON shape an optional payload field must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// JSON boolean
    Bool,
    /// Non-negative integer that fits in 32 bits
    U32,
    /// JSON string
    Str,
    /// JSON object
    Object,
    /// JSON array
    Array,
}

/// An optional payload field that may be set through `additional_parameters`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionalField {
    /// Field name on the wire
    pub name: &'static str,
    /// Expected JSON shape
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> OptionalField {
    OptionalField { name, kind }
}

/// Optional fields shared by every RPZ rule type.
const RPZ_COMMON_FIELDS: &[OptionalField] = &[
    field("comment", FieldKind::Str),
    field("disable", FieldKind::Bool),
    field("extattrs", FieldKind::Object),
    field("ttl", FieldKind::U32),
    field("use_ttl", FieldKind::Bool),
    field("view", FieldKind::Str),
];

const RPZ_NAPTR_FIELDS: &[OptionalField] = &[
    field("comment", FieldKind::Str),
    field("disable", FieldKind::Bool),
    field("extattrs", FieldKind::Object),
    field("flags", FieldKind::Str),
    field("regexp", FieldKind::Str),
    field("services", FieldKind::Str),
    field("ttl", FieldKind::U32),
    field("use_ttl", FieldKind::Bool),
    field("view", FieldKind::Str),
];

const ZONE_RP_FIELDS: &[OptionalField] = &[
    field("comment", FieldKind::Str),
    field("disable", FieldKind::Bool),
    field("extattrs", FieldKind::Object),
    field("fireeye_rule_mapping", FieldKind::Object),
    field("rpz_policy", FieldKind::Str),
    field("rpz_severity", FieldKind::Str),
    field("rpz_type", FieldKind::Str),
    field("substitute_name", FieldKind::Str),
    field("view", FieldKind::Str),
];

const HOST_FIELDS: &[OptionalField] = &[
    field("aliases", FieldKind::Array),
    field("comment", FieldKind::Str),
    field("configure_for_dns", FieldKind::Bool),
    field("disable", FieldKind::Bool),
    field("extattrs", FieldKind::Object),
    field("ttl", FieldKind::U32),
    field("use_ttl", FieldKind::Bool),
    field("view", FieldKind::Str),
];

/// One row of the object type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectTypeEntry {
    /// Lookup key
    pub key: ObjectKey,
    /// Remote object type identifier
    pub object_type: &'static str,
    /// Payload fields always populated from typed action parameters
    pub required: &'static [&'static str],
    /// Closed set of optional payload fields
    pub optional: &'static [OptionalField],
    /// Whether fields outside `required`/`optional` may be passed through untouched
    pub accepts_extras: bool,
    /// `_return_fields` requested on create and list
    pub return_fields: &'static str,
}

impl ObjectTypeEntry {
    /// Schema of an optional field, if the entry declares it.
    #[must_use]
    pub fn optional_field(&self, name: &str) -> Option<&'static OptionalField> {
        self.optional.iter().find(|f| f.name == name)
    }
}

const fn rpz(
    kind: RecordKind,
    target: RuleTarget,
    object_type: &'static str,
    required: &'static [&'static str],
    optional: &'static [OptionalField],
    accepts_extras: bool,
    return_fields: &'static str,
) -> ObjectTypeEntry {
    ObjectTypeEntry {
        key: ObjectKey::RpzRule { kind, target },
        object_type,
        required,
        optional,
        accepts_extras,
        return_fields,
    }
}

const fn listing(
    key: ObjectKey,
    object_type: &'static str,
    return_fields: &'static str,
) -> ObjectTypeEntry {
    ObjectTypeEntry {
        key,
        object_type,
        required: &[],
        optional: &[],
        accepts_extras: false,
        return_fields,
    }
}

const CNAME_REQUIRED: &[&str] = &["name", "rp_zone", "canonical"];

/// Every remote object type the adapter knows about.
pub static OBJECT_TYPE_TABLE: &[ObjectTypeEntry] = &[
    // CNAME rules
    rpz(
        RecordKind::Cname,
        RuleTarget::DomainName,
        OBJ_RPZ_CNAME,
        CNAME_REQUIRED,
        RPZ_COMMON_FIELDS,
        true,
        RETURN_FIELDS_RPZ_CNAME,
    ),
    rpz(
        RecordKind::Cname,
        RuleTarget::IpAddress,
        OBJ_RPZ_CNAME_IP,
        CNAME_REQUIRED,
        RPZ_COMMON_FIELDS,
        true,
        RETURN_FIELDS_RPZ_CNAME_IP,
    ),
    rpz(
        RecordKind::Cname,
        RuleTarget::ClientIpAddress,
        OBJ_RPZ_CNAME_CLIENT_IP,
        CNAME_REQUIRED,
        RPZ_COMMON_FIELDS,
        true,
        RETURN_FIELDS_RPZ_CNAME_IP,
    ),
    // Address rules
    rpz(
        RecordKind::A,
        RuleTarget::DomainName,
        OBJ_RPZ_A,
        &["name", "rp_zone", "ipv4addr"],
        RPZ_COMMON_FIELDS,
        true,
        RETURN_FIELDS_RPZ_A,
    ),
    rpz(
        RecordKind::A,
        RuleTarget::IpAddress,
        OBJ_RPZ_A_IP,
        &["name", "rp_zone", "ipv4addr"],
        RPZ_COMMON_FIELDS,
        true,
        RETURN_FIELDS_RPZ_A,
    ),
    rpz(
        RecordKind::Aaaa,
        RuleTarget::DomainName,
        OBJ_RPZ_AAAA,
        &["name", "rp_zone", "ipv6addr"],
        RPZ_COMMON_FIELDS,
        true,
        RETURN_FIELDS_RPZ_AAAA,
    ),
    rpz(
        RecordKind::Aaaa,
        RuleTarget::IpAddress,
        OBJ_RPZ_AAAA_IP,
        &["name", "rp_zone", "ipv6addr"],
        RPZ_COMMON_FIELDS,
        true,
        RETURN_FIELDS_RPZ_AAAA,
    ),
    // Domain-only rules
    rpz(
        RecordKind::Mx,
        RuleTarget::DomainName,
        OBJ_RPZ_MX,
        &["name", "rp_zone", "mail_exchanger", "preference"],
        RPZ_COMMON_FIELDS,
        true,
        RETURN_FIELDS_RPZ_MX,
    ),
    rpz(
        RecordKind::Ptr,
        RuleTarget::DomainName,
        OBJ_RPZ_PTR,
        &["name", "rp_zone", "ptrdname"],
        RPZ_COMMON_FIELDS,
        true,
        RETURN_FIELDS_RPZ_PTR,
    ),
    rpz(
        RecordKind::Srv,
        RuleTarget::DomainName,
        OBJ_RPZ_SRV,
        &["name", "rp_zone", "priority", "weight", "port", "target"],
        RPZ_COMMON_FIELDS,
        false,
        RETURN_FIELDS_RPZ_SRV,
    ),
    rpz(
        RecordKind::Naptr,
        RuleTarget::DomainName,
        OBJ_RPZ_NAPTR,
        &["name", "rp_zone", "order", "preference", "replacement"],
        RPZ_NAPTR_FIELDS,
        false,
        RETURN_FIELDS_RPZ_NAPTR,
    ),
    rpz(
        RecordKind::Txt,
        RuleTarget::DomainName,
        OBJ_RPZ_TXT,
        &["name", "rp_zone", "text"],
        RPZ_COMMON_FIELDS,
        true,
        RETURN_FIELDS_RPZ_TXT,
    ),
    // Zones and IPAM objects
    ObjectTypeEntry {
        key: ObjectKey::ResponsePolicyZone,
        object_type: OBJ_ZONE_RP,
        required: &["fqdn"],
        optional: ZONE_RP_FIELDS,
        accepts_extras: true,
        return_fields: RETURN_FIELDS_ZONE_RP,
    },
    ObjectTypeEntry {
        key: ObjectKey::Host,
        object_type: OBJ_HOST,
        required: &["name", "ipv4addrs", "ipv6addrs"],
        optional: HOST_FIELDS,
        accepts_extras: true,
        return_fields: RETURN_FIELDS_HOST,
    },
    listing(ObjectKey::Network, OBJ_NETWORK, RETURN_FIELDS_NETWORK),
    listing(ObjectKey::Ipv4Address, OBJ_IPV4_ADDRESS, RETURN_FIELDS_IPV4_ADDRESS),
    listing(ObjectKey::Ipv6Address, OBJ_IPV6_ADDRESS, RETURN_FIELDS_IPV6_ADDRESS),
    listing(ObjectKey::Lease, OBJ_LEASE, RETURN_FIELDS_LEASE),
];

/// Look up a table entry by key.
#[must_use]
pub fn lookup(key: ObjectKey) -> Option<&'static ObjectTypeEntry> {
    OBJECT_TYPE_TABLE.iter().find(|entry| entry.key == key)
}

/// Look up a table entry for a non-rule object.
///
/// # Errors
///
/// Returns [`ActionError::Mapping`] if the table has no entry for `key`.
pub fn entry_for(key: ObjectKey) -> Result<&'static ObjectTypeEntry, ActionError> {
    lookup(key).ok_or_else(|| ActionError::Mapping {
        rule_type: key.to_string(),
        object_type: String::new(),
    })
}

/// Look up the entry for an RPZ rule of `kind` on `target`.
///
/// # Errors
///
/// Returns [`ActionError::Mapping`] if the combination has no table entry (for example an MX
/// rule on an IP address trigger).
pub fn rule_entry(
    kind: RecordKind,
    target: RuleTarget,
) -> Result<&'static ObjectTypeEntry, ActionError> {
    lookup(ObjectKey::RpzRule { kind, target }).ok_or_else(|| ActionError::Mapping {
        rule_type: kind.label().to_string(),
        object_type: target.label().to_string(),
    })
}

/// Find the entry whose remote object type is `object_type`.
#[must_use]
pub fn entry_by_object_type(object_type: &str) -> Option<&'static ObjectTypeEntry> {
    OBJECT_TYPE_TABLE
        .iter()
        .find(|entry| entry.object_type == object_type)
}

// ============================================================================
// Canonical values and naming
// ============================================================================

/// Compute the `canonical` field of a CNAME rule.
///
/// # Arguments
///
/// * `policy` - Rule policy
/// * `target` - What the rule matches on
/// * `name` - Rule name as supplied by the caller (before zone qualification)
/// * `substitute_name` - Replacement domain for substitute rules
///
/// # Errors
///
/// Returns [`ActionError::Validation`] if a substitute rule targets anything other than a
/// domain name, or if `substitute_name` is missing for a substitute rule.
pub fn cname_canonical(
    policy: CnamePolicy,
    target: RuleTarget,
    name: &str,
    substitute_name: Option<&str>,
) -> Result<String, ActionError> {
    let canonical = match (policy, target) {
        (CnamePolicy::BlockNoSuchDomain, _) => CANONICAL_BLOCK_NO_DOMAIN,
        (CnamePolicy::BlockNoData, _) => CANONICAL_WILDCARD,
        (CnamePolicy::Passthru, RuleTarget::DomainName) if name.starts_with('*') => {
            CANONICAL_WILDCARD_PASSTHRU
        }
        (CnamePolicy::Passthru, RuleTarget::DomainName | RuleTarget::IpAddress) => name,
        (CnamePolicy::Passthru, RuleTarget::ClientIpAddress) => CANONICAL_PASSTHRU,
        (CnamePolicy::Substitute, RuleTarget::DomainName) => {
            substitute_name.ok_or_else(|| {
                ActionError::validation(
                    "substitute_name",
                    "substitute name is required when rule type is 'Substitute (domain name)'",
                )
            })?
        }
        (CnamePolicy::Substitute, other) => {
            return Err(ActionError::validation(
                "rule_type",
                format!(
                    "cannot create a substitute rule for {}, substitute rules are only supported for Domain Name objects",
                    other.label()
                ),
            ))
        }
    };

    Ok(canonical.to_string())
}

/// Qualify a rule name with its policy zone.
///
/// Names already ending in `.<rp_zone>` are returned unchanged.
#[must_use]
pub fn qualify_name(name: &str, rp_zone: &str) -> String {
    if name.ends_with(&format!(".{rp_zone}")) {
        name.to_string()
    } else {
        format!("{name}.{rp_zone}")
    }
}

/// Derive the reverse-lookup name of an address.
///
/// - IPv4 `90.90.90.9` becomes `9.90.90.90.in-addr.arpa`
/// - IPv6 addresses are expanded to 32 nibbles, reversed and dot-joined under `ip6.arpa`
#[must_use]
pub fn reverse_name(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => {
            let octets = v4.octets();
            format!(
                "{}.{}.{}.{}.in-addr.arpa",
                octets[3], octets[2], octets[1], octets[0]
            )
        }
        IpAddr::V6(v6) => {
            let nibbles: Vec<String> = v6
                .octets()
                .iter()
                .rev()
                .flat_map(|byte| [byte & 0x0f, byte >> 4])
                .map(|nibble| format!("{nibble:x}"))
                .collect();
            format!("{}.ip6.arpa", nibbles.join("."))
        }
    }
}

#[cfg(test)]
#[path = "object_map_tests.rs"]
mod object_map_tests;
