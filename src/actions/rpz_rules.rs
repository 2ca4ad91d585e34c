// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! RPZ rule actions: create/update CNAME rules, create A, AAAA, MX, PTR, SRV, NAPTR and TXT
//! rules, delete any rule by reference, and search rules of one object type.
//!
//! Rule names are always qualified with their policy zone (`bad.com` in `rpz.local` becomes
//! `bad.com.rpz.local`) before they are sent.

use std::net::IpAddr;

use serde_json::{json, Value};

use super::{object_reference, ActionStrategy};
use crate::constants::{DEFAULT_VIEW, OBJ_RPZ_RULE_PREFIX};
use crate::errors::ActionError;
use crate::object_map::{
    cname_canonical, entry_by_object_type, qualify_name, reverse_name, rule_entry, CnamePolicy,
    RecordKind, RuleTarget,
};
use crate::payload::{Payload, ADDITIONAL_PARAMETERS};
use crate::result::{add_extattrs_display, ActionOutput, Summary};
use crate::validation::{parse_ipv4, parse_ipv6, ActionParams, JsonText, ParamSchema};
use crate::wapi::{ListQuery, ReferenceId, WapiOutcome, WapiRequest};

// ============================================================================
// Shared rule create
// ============================================================================

/// A validated rule create for every record kind except CNAME.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSpec {
    kind: RecordKind,
    target: RuleTarget,
    /// Zone-qualified rule name
    name: String,
    rp_zone: String,
    comment: Option<String>,
    /// Record-specific typed fields, in payload order
    fields: Vec<(&'static str, Value)>,
    additional: Option<JsonText>,
}

impl RuleSpec {
    fn new(
        params: &ActionParams,
        kind: RecordKind,
        target: RuleTarget,
        name: &str,
    ) -> Result<Self, ActionError> {
        let rp_zone = params.required_str("rp_zone")?;
        Ok(Self {
            kind,
            target,
            name: qualify_name(name, &rp_zone),
            rp_zone,
            comment: params.comment("comment")?,
            fields: Vec::new(),
            additional: params.raw_json(ADDITIONAL_PARAMETERS),
        })
    }

    fn field(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        self.fields.push((key, value.into()));
        self
    }

    fn field_value(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    fn build_request(&self) -> Result<WapiRequest, ActionError> {
        let entry = rule_entry(self.kind, self.target)?;

        let mut payload = Payload::new(entry);
        payload
            .set("name", self.name.as_str())
            .set("rp_zone", self.rp_zone.as_str())
            .set_opt("comment", self.comment.as_deref());
        for (key, value) in &self.fields {
            payload.set(key, value.clone());
        }
        payload.merge_additional(self.additional.clone())?;

        Ok(WapiRequest::Create {
            object_type: entry.object_type.to_string(),
            payload: payload.into_value(),
            return_fields: entry.return_fields.to_string(),
        })
    }

    fn summarize(&self, outcome: WapiOutcome) -> Result<ActionOutput, ActionError> {
        let created = outcome.into_created()?;
        let reference = created.reference.to_string();
        let mut object = created.object;

        let mut summary = Summary::single()
            .with("reference_id", reference.as_str())
            .with("rule_name", self.name.as_str())
            .with("rp_zone", self.rp_zone.as_str());

        let message = match self.kind {
            RecordKind::Srv | RecordKind::Naptr => {
                add_extattrs_display(&mut object);
                if self.kind == RecordKind::Srv {
                    for key in ["priority", "port", "weight"] {
                        if let Some(value) = self.field_value(key) {
                            summary = summary.with(key, value.clone());
                        }
                    }
                }
                format!("Successfully created 1 RPZ {} rule", self.kind.label())
            }
            _ => format!(
                "Successfully created RPZ {} rule with reference ID: {reference}",
                self.kind.label()
            ),
        };

        Ok(ActionOutput::new(vec![object], summary, message))
    }
}

macro_rules! rule_create_strategy {
    ($strategy:ident) => {
        impl ActionStrategy for $strategy {
            type Validated = RuleSpec;

            const SCHEMA: ParamSchema = $strategy::PARAMS;

            fn validate(params: &ActionParams) -> Result<RuleSpec, ActionError> {
                $strategy::spec(params)
            }

            fn build_request(spec: &RuleSpec) -> Result<WapiRequest, ActionError> {
                spec.build_request()
            }

            fn summarize(spec: &RuleSpec, outcome: WapiOutcome) -> Result<ActionOutput, ActionError> {
                spec.summarize(outcome)
            }
        }
    };
}

// ============================================================================
// CNAME rules
// ============================================================================

/// A validated CNAME rule create or update.
#[derive(Debug, Clone, PartialEq)]
pub struct CnameRule {
    policy: CnamePolicy,
    target: RuleTarget,
    /// Zone-qualified rule name
    name: String,
    rp_zone: String,
    canonical: String,
    comment: Option<String>,
    view: Option<String>,
    additional: Option<JsonText>,
    /// Rule to update; `None` for creates
    reference: Option<ReferenceId>,
}

impl CnameRule {
    fn from_params(
        params: &ActionParams,
        policy: CnamePolicy,
        target: RuleTarget,
        reference: Option<ReferenceId>,
    ) -> Result<Self, ActionError> {
        let name = params.required_str("name")?;
        let rp_zone = params.required_str("rp_zone")?;
        let substitute_name = params.str("substitute_name")?;
        let canonical = cname_canonical(policy, target, &name, substitute_name.as_deref())?;

        Ok(Self {
            policy,
            target,
            name: qualify_name(&name, &rp_zone),
            rp_zone,
            canonical,
            comment: params.comment("comment")?,
            view: params.str("view")?,
            additional: params.raw_json(ADDITIONAL_PARAMETERS),
            reference,
        })
    }

    fn build_request(&self) -> Result<WapiRequest, ActionError> {
        let entry = rule_entry(RecordKind::Cname, self.target)?;

        let mut payload = Payload::new(entry);
        payload
            .set("name", self.name.as_str())
            .set("rp_zone", self.rp_zone.as_str())
            .set("canonical", self.canonical.as_str())
            .set_opt("comment", self.comment.as_deref())
            .set_opt("view", self.view.as_deref());
        payload.merge_additional(self.additional.clone())?;

        match &self.reference {
            None => {
                payload.default_field("view", DEFAULT_VIEW);
                Ok(WapiRequest::Create {
                    object_type: entry.object_type.to_string(),
                    payload: payload.into_value(),
                    return_fields: entry.return_fields.to_string(),
                })
            }
            Some(reference) => Ok(WapiRequest::Update {
                reference: reference.clone(),
                payload: payload.into_value(),
                return_fields: entry.return_fields.to_string(),
            }),
        }
    }

    fn summarize(&self, outcome: WapiOutcome) -> Result<ActionOutput, ActionError> {
        let (verb, object) = match &self.reference {
            None => ("created", outcome.into_created()?.object),
            Some(_) => ("updated", outcome.into_updated()?),
        };

        let fallback = self.reference.as_ref().map(ReferenceId::as_str).unwrap_or_default();
        let reference = object_reference(&object, fallback);

        let summary = Summary::single()
            .with("reference_id", reference.as_str())
            .with("rule_name", self.name.as_str())
            .with("rp_zone", self.rp_zone.as_str())
            .with("rule_type", self.policy.label())
            .with("object_type", self.target.label());

        Ok(ActionOutput::new(
            vec![object],
            summary,
            format!("Successfully {verb} RPZ CNAME rule with reference ID: {reference}"),
        ))
    }
}

/// `create_rpz_cname_rule`
#[derive(Debug)]
pub struct CreateCnameRule;

impl ActionStrategy for CreateCnameRule {
    type Validated = CnameRule;

    const SCHEMA: ParamSchema = ParamSchema {
        required: &["name", "rp_zone", "rule_type", "object_type"],
        optional: &["substitute_name", "comment", "view", ADDITIONAL_PARAMETERS],
    };

    fn validate(params: &ActionParams) -> Result<CnameRule, ActionError> {
        let rule_type = params.required_str("rule_type")?;
        let object_type = params.required_str("object_type")?;
        let policy = CnamePolicy::from_label(&rule_type, &object_type)?;
        let target = RuleTarget::from_label(&object_type, &rule_type)?;
        CnameRule::from_params(params, policy, target, None)
    }

    fn build_request(rule: &CnameRule) -> Result<WapiRequest, ActionError> {
        rule.build_request()
    }

    fn summarize(rule: &CnameRule, outcome: WapiOutcome) -> Result<ActionOutput, ActionError> {
        rule.summarize(outcome)
    }
}

/// `update_rpz_cname_rule`
///
/// The rule's target kind is taken from the reference's object type, so an update can change
/// the policy but never move a rule between domain and IP triggers.
#[derive(Debug)]
pub struct UpdateCnameRule;

impl ActionStrategy for UpdateCnameRule {
    type Validated = CnameRule;

    const SCHEMA: ParamSchema = ParamSchema {
        required: &["reference_id", "rule_type", "name", "rp_zone"],
        optional: &["substitute_name", "comment", "view", ADDITIONAL_PARAMETERS],
    };

    fn validate(params: &ActionParams) -> Result<CnameRule, ActionError> {
        let reference = ReferenceId::parse("reference_id", params.required_str("reference_id")?)?;
        let target = RuleTarget::from_cname_object_type(reference.object_type())?;
        let rule_type = params.required_str("rule_type")?;
        let policy = CnamePolicy::from_label(&rule_type, reference.object_type())?;
        CnameRule::from_params(params, policy, target, Some(reference))
    }

    fn build_request(rule: &CnameRule) -> Result<WapiRequest, ActionError> {
        rule.build_request()
    }

    fn summarize(rule: &CnameRule, outcome: WapiOutcome) -> Result<ActionOutput, ActionError> {
        rule.summarize(outcome)
    }
}

// ============================================================================
// Other record kinds
// ============================================================================

/// `create_rpz_a_rule`
#[derive(Debug)]
pub struct CreateARule;

impl CreateARule {
    const PARAMS: ParamSchema = ParamSchema {
        required: &["name", "rp_zone", "object_type", "ipv4_address"],
        optional: &["comment", ADDITIONAL_PARAMETERS],
    };

    fn spec(params: &ActionParams) -> Result<RuleSpec, ActionError> {
        let target = address_rule_target(params, RecordKind::A)?;
        let address = parse_ipv4("ipv4_address", &params.required_str("ipv4_address")?)?;
        let name = params.required_str("name")?;
        Ok(RuleSpec::new(params, RecordKind::A, target, &name)?.field("ipv4addr", address.to_string()))
    }
}

rule_create_strategy!(CreateARule);

/// `create_rpz_aaaa_rule`
#[derive(Debug)]
pub struct CreateAaaaRule;

impl CreateAaaaRule {
    const PARAMS: ParamSchema = ParamSchema {
        required: &["name", "rp_zone", "object_type", "ipv6_address"],
        optional: &["comment", ADDITIONAL_PARAMETERS],
    };

    fn spec(params: &ActionParams) -> Result<RuleSpec, ActionError> {
        let target = address_rule_target(params, RecordKind::Aaaa)?;
        let address = parse_ipv6("ipv6_address", &params.required_str("ipv6_address")?)?;
        let name = params.required_str("name")?;
        Ok(RuleSpec::new(params, RecordKind::Aaaa, target, &name)?
            .field("ipv6addr", address.to_string()))
    }
}

rule_create_strategy!(CreateAaaaRule);

/// A and AAAA rules match on domain names or response addresses, never on clients.
fn address_rule_target(params: &ActionParams, kind: RecordKind) -> Result<RuleTarget, ActionError> {
    let label = params.required_str("object_type")?;
    match RuleTarget::from_label(&label, kind.label())? {
        RuleTarget::ClientIpAddress => Err(ActionError::Mapping {
            rule_type: kind.label().to_string(),
            object_type: label,
        }),
        target => Ok(target),
    }
}

/// `create_rpz_mx_rule`
#[derive(Debug)]
pub struct CreateMxRule;

impl CreateMxRule {
    const PARAMS: ParamSchema = ParamSchema {
        required: &["name", "rp_zone", "mail_exchanger", "preference"],
        optional: &["comment", ADDITIONAL_PARAMETERS],
    };

    fn spec(params: &ActionParams) -> Result<RuleSpec, ActionError> {
        let name = params.required_str("name")?;
        let mail_exchanger = params.required_str("mail_exchanger")?;
        let preference = params.required_u16("preference")?;
        Ok(
            RuleSpec::new(params, RecordKind::Mx, RuleTarget::DomainName, &name)?
                .field("mail_exchanger", mail_exchanger)
                .field("preference", preference),
        )
    }
}

rule_create_strategy!(CreateMxRule);

/// `create_rpz_ptr_rule`
///
/// Without an explicit `name`, the rule is named after the reverse-lookup name of
/// `ipv4_address` or `ipv6_address`.
#[derive(Debug)]
pub struct CreatePtrRule;

impl CreatePtrRule {
    const PARAMS: ParamSchema = ParamSchema {
        required: &["rp_zone", "ptr_dname"],
        optional: &[
            "name",
            "ipv4_address",
            "ipv6_address",
            "comment",
            ADDITIONAL_PARAMETERS,
        ],
    };

    fn spec(params: &ActionParams) -> Result<RuleSpec, ActionError> {
        let name = params.str("name")?;
        let ipv4 = params
            .str("ipv4_address")?
            .map(|v| parse_ipv4("ipv4_address", &v))
            .transpose()?;
        let ipv6 = params
            .str("ipv6_address")?
            .map(|v| parse_ipv6("ipv6_address", &v))
            .transpose()?;

        if ipv4.is_some() && ipv6.is_some() {
            return Err(ActionError::validation(
                "ipv6_address",
                "only one of ipv4_address or ipv6_address can be provided",
            ));
        }

        let address = ipv4.map(IpAddr::V4).or(ipv6.map(IpAddr::V6));
        let name = match (name, address) {
            (Some(name), _) => name,
            (None, Some(address)) => reverse_name(address),
            (None, None) => {
                return Err(ActionError::validation(
                    "name",
                    "at least one of name, ipv4_address or ipv6_address must be provided",
                ))
            }
        };

        let mut spec = RuleSpec::new(params, RecordKind::Ptr, RuleTarget::DomainName, &name)?
            .field("ptrdname", params.required_str("ptr_dname")?);
        if let Some(v4) = ipv4 {
            spec = spec.field("ipv4addr", v4.to_string());
        }
        if let Some(v6) = ipv6 {
            spec = spec.field("ipv6addr", v6.to_string());
        }
        Ok(spec)
    }
}

rule_create_strategy!(CreatePtrRule);

/// `create_rpz_srv_rule`
#[derive(Debug)]
pub struct CreateSrvRule;

impl CreateSrvRule {
    const PARAMS: ParamSchema = ParamSchema {
        required: &["name", "rp_zone", "priority", "weight", "port", "target"],
        optional: &["comment", ADDITIONAL_PARAMETERS],
    };

    fn spec(params: &ActionParams) -> Result<RuleSpec, ActionError> {
        let name = params.required_str("name")?;
        Ok(
            RuleSpec::new(params, RecordKind::Srv, RuleTarget::DomainName, &name)?
                .field("priority", params.required_u16("priority")?)
                .field("weight", params.required_u16("weight")?)
                .field("port", params.required_u16("port")?)
                .field("target", params.required_str("target")?),
        )
    }
}

rule_create_strategy!(CreateSrvRule);

/// `create_rpz_naptr_rule`
#[derive(Debug)]
pub struct CreateNaptrRule;

impl CreateNaptrRule {
    const PARAMS: ParamSchema = ParamSchema {
        required: &["name", "rp_zone", "order", "preference", "replacement"],
        optional: &["comment", ADDITIONAL_PARAMETERS],
    };

    fn spec(params: &ActionParams) -> Result<RuleSpec, ActionError> {
        let name = params.required_str("name")?;
        Ok(
            RuleSpec::new(params, RecordKind::Naptr, RuleTarget::DomainName, &name)?
                .field("order", params.required_u16("order")?)
                .field("preference", params.required_u16("preference")?)
                .field("replacement", params.required_str("replacement")?),
        )
    }
}

rule_create_strategy!(CreateNaptrRule);

/// `create_rpz_txt_rule`
#[derive(Debug)]
pub struct CreateTxtRule;

impl CreateTxtRule {
    const PARAMS: ParamSchema = ParamSchema {
        required: &["name", "rp_zone", "text"],
        optional: &["comment", ADDITIONAL_PARAMETERS],
    };

    fn spec(params: &ActionParams) -> Result<RuleSpec, ActionError> {
        let name = params.required_str("name")?;
        Ok(
            RuleSpec::new(params, RecordKind::Txt, RuleTarget::DomainName, &name)?
                .field("text", params.required_str("text")?),
        )
    }
}

rule_create_strategy!(CreateTxtRule);

// ============================================================================
// Delete and search
// ============================================================================

/// `delete_rpz_rule`
#[derive(Debug)]
pub struct DeleteRpzRule;

impl ActionStrategy for DeleteRpzRule {
    type Validated = ReferenceId;

    const SCHEMA: ParamSchema = ParamSchema {
        required: &["reference_id"],
        optional: &[],
    };

    fn validate(params: &ActionParams) -> Result<ReferenceId, ActionError> {
        let reference = ReferenceId::parse("reference_id", params.required_str("reference_id")?)?;
        if !reference.object_type().starts_with(OBJ_RPZ_RULE_PREFIX) {
            return Err(ActionError::validation(
                "reference_id",
                format!("'{}' is not an RPZ rule reference", reference.object_type()),
            ));
        }
        Ok(reference)
    }

    fn build_request(reference: &ReferenceId) -> Result<WapiRequest, ActionError> {
        Ok(WapiRequest::Delete(reference.clone()))
    }

    fn summarize(_: &ReferenceId, outcome: WapiOutcome) -> Result<ActionOutput, ActionError> {
        let deleted = outcome.into_deleted()?;
        Ok(ActionOutput::new(
            vec![json!({ "_ref": deleted.as_str() })],
            Summary::single().with("reference_id", deleted.as_str()),
            format!("Successfully deleted RPZ Rule. Reference ID: {deleted}"),
        ))
    }
}

/// `search_rpz_rule`
#[derive(Debug)]
pub struct SearchRpzRule;

impl ActionStrategy for SearchRpzRule {
    type Validated = ListQuery;

    const SCHEMA: ParamSchema = ParamSchema {
        required: &["object_type"],
        optional: &["rule_name", "output_fields", "limit"],
    };

    fn validate(params: &ActionParams) -> Result<ListQuery, ActionError> {
        let object_type = params.required_str("object_type")?;
        if !object_type.starts_with(OBJ_RPZ_RULE_PREFIX) {
            return Err(ActionError::validation(
                "object_type",
                format!("'{object_type}' is not an RPZ rule object type"),
            ));
        }

        let mut query = ListQuery::new(object_type).limit(params.limit("limit")?);
        if let Some(rule_name) = params.str("rule_name")? {
            query = query.filter("name", rule_name);
        }
        if let Some(fields) = params.str("output_fields")? {
            query = query.return_fields(fields);
        }
        Ok(query)
    }

    fn build_request(query: &ListQuery) -> Result<WapiRequest, ActionError> {
        if entry_by_object_type(&query.object_type).is_none() {
            return Err(ActionError::Mapping {
                rule_type: "RPZ rule".to_string(),
                object_type: query.object_type.clone(),
            });
        }
        Ok(WapiRequest::List(query.clone()))
    }

    fn summarize(query: &ListQuery, outcome: WapiOutcome) -> Result<ActionOutput, ActionError> {
        let mut rules = outcome.into_objects()?;
        for rule in &mut rules {
            if let Value::Object(map) = rule {
                if let Some(reference) = map.remove("_ref") {
                    map.insert("ref".to_string(), reference);
                }
            }
            add_extattrs_display(rule);
        }

        let summary = Summary::listing(&rules)
            .with("total_rules_found", rules.len())
            .with("object_type", query.object_type.as_str());
        let message = format!("Successfully retrieved {} RPZ rule(s)", rules.len());
        Ok(ActionOutput::new(rules, summary, message))
    }
}
