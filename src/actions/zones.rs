// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Response policy zone actions.

use serde_json::{json, Map, Value};

use super::ActionStrategy;
use crate::constants::{OBJ_ZONE_RP, RPZ_POLICY_VALUES, RPZ_SEVERITY_VALUES, RPZ_TYPE_VALUES};
use crate::errors::ActionError;
use crate::object_map::{entry_for, ObjectKey};
use crate::payload::{Payload, ADDITIONAL_PARAMETERS};
use crate::result::{add_extattrs_display, ActionOutput, Summary};
use crate::validation::{ActionParams, JsonText, ParamSchema};
use crate::wapi::{ListQuery, ReferenceId, WapiOutcome, WapiRequest};

/// Policy value that rewrites answers and therefore needs a substitute name
const POLICY_SUBSTITUTE: &str = "SUBSTITUTE";

/// A validated zone create.
#[derive(Debug, Clone, PartialEq)]
pub struct NewZone {
    fqdn: String,
    rpz_policy: Option<String>,
    rpz_severity: Option<String>,
    rpz_type: Option<String>,
    substitute_name: Option<String>,
    comment: Option<String>,
    fireeye_rule_mapping: Option<Map<String, Value>>,
    view: Option<String>,
    additional: Option<JsonText>,
}

/// `create_response_policy_zone`
#[derive(Debug)]
pub struct CreateResponsePolicyZone;

impl ActionStrategy for CreateResponsePolicyZone {
    type Validated = NewZone;

    const SCHEMA: ParamSchema = ParamSchema {
        required: &["fqdn"],
        optional: &[
            "rpz_policy",
            "rpz_severity",
            "rpz_type",
            "substitute_name",
            "comment",
            "fireeye_rule_mapping",
            "view",
            ADDITIONAL_PARAMETERS,
        ],
    };

    fn validate(params: &ActionParams) -> Result<NewZone, ActionError> {
        let zone = NewZone {
            fqdn: params.required_str("fqdn")?,
            rpz_policy: params.enum_value("rpz_policy", RPZ_POLICY_VALUES)?,
            rpz_severity: params.enum_value("rpz_severity", RPZ_SEVERITY_VALUES)?,
            rpz_type: params.enum_value("rpz_type", RPZ_TYPE_VALUES)?,
            substitute_name: params.str("substitute_name")?,
            comment: params.comment("comment")?,
            fireeye_rule_mapping: params
                .raw_json("fireeye_rule_mapping")
                .map(|raw| raw.decode_object("fireeye_rule_mapping"))
                .transpose()?,
            view: params.str("view")?,
            additional: params.raw_json(ADDITIONAL_PARAMETERS),
        };

        if zone.rpz_policy.as_deref() == Some(POLICY_SUBSTITUTE) && zone.substitute_name.is_none()
        {
            return Err(ActionError::validation(
                "substitute_name",
                "substitute name is required when rpz_policy is SUBSTITUTE",
            ));
        }

        Ok(zone)
    }

    fn build_request(zone: &NewZone) -> Result<WapiRequest, ActionError> {
        let entry = entry_for(ObjectKey::ResponsePolicyZone)?;

        let mut payload = Payload::new(entry);
        payload
            .set("fqdn", zone.fqdn.as_str())
            .set_opt("rpz_policy", zone.rpz_policy.as_deref())
            .set_opt("rpz_severity", zone.rpz_severity.as_deref())
            .set_opt("rpz_type", zone.rpz_type.as_deref())
            .set_opt("substitute_name", zone.substitute_name.as_deref())
            .set_opt("comment", zone.comment.as_deref())
            .set_opt("fireeye_rule_mapping", zone.fireeye_rule_mapping.clone())
            .set_opt("view", zone.view.as_deref());
        payload.merge_additional(zone.additional.clone())?;

        Ok(WapiRequest::Create {
            object_type: entry.object_type.to_string(),
            payload: payload.into_value(),
            return_fields: entry.return_fields.to_string(),
        })
    }

    fn summarize(zone: &NewZone, outcome: WapiOutcome) -> Result<ActionOutput, ActionError> {
        let created = outcome.into_created()?;
        let reference = created.reference.to_string();
        let mut object = created.object;
        add_extattrs_display(&mut object);

        Ok(ActionOutput::new(
            vec![object],
            Summary::single()
                .with("reference_id", reference.as_str())
                .with("fqdn", zone.fqdn.as_str()),
            format!("Successfully created Response Policy Zone. Reference ID: {reference}"),
        ))
    }
}

/// `get_response_policy_zone`
#[derive(Debug)]
pub struct GetResponsePolicyZone;

impl ActionStrategy for GetResponsePolicyZone {
    type Validated = ListQuery;

    const SCHEMA: ParamSchema = ParamSchema {
        required: &[],
        optional: &["fqdn", "view", "comment", "limit"],
    };

    fn validate(params: &ActionParams) -> Result<ListQuery, ActionError> {
        let mut query = ListQuery::new(OBJ_ZONE_RP).limit(params.limit("limit")?);
        for key in ["fqdn", "view", "comment"] {
            if let Some(value) = params.str(key)? {
                query = query.filter(key, value);
            }
        }
        Ok(query)
    }

    fn build_request(query: &ListQuery) -> Result<WapiRequest, ActionError> {
        let entry = entry_for(ObjectKey::ResponsePolicyZone)?;
        Ok(WapiRequest::List(
            query.clone().return_fields(entry.return_fields),
        ))
    }

    fn summarize(_: &ListQuery, outcome: WapiOutcome) -> Result<ActionOutput, ActionError> {
        let mut zones = outcome.into_objects()?;
        zones.iter_mut().for_each(add_extattrs_display);

        let summary = Summary::listing(&zones).with("total_zones_found", zones.len());
        let message = format!(
            "Successfully retrieved {} response policy zone(s)",
            zones.len()
        );
        Ok(ActionOutput::new(zones, summary, message))
    }
}

/// `delete_response_policy_zone`
#[derive(Debug)]
pub struct DeleteResponsePolicyZone;

impl ActionStrategy for DeleteResponsePolicyZone {
    type Validated = ReferenceId;

    const SCHEMA: ParamSchema = ParamSchema {
        required: &["reference_id"],
        optional: &[],
    };

    fn validate(params: &ActionParams) -> Result<ReferenceId, ActionError> {
        let reference = ReferenceId::parse("reference_id", params.required_str("reference_id")?)?;
        if reference.object_type() != OBJ_ZONE_RP {
            return Err(ActionError::validation(
                "reference_id",
                format!(
                    "'{}' is not a response policy zone reference",
                    reference.object_type()
                ),
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
            format!("Successfully deleted Response Policy Zone. Reference ID: {deleted}"),
        ))
    }
}
