//! External authentication rules: the token issuer, the OAuth clients that
//! trust it, and how its claims map onto cluster identities.

use hcp_api::enums::{
    ConditionStatus, ExternalAuthClientType, ExternalAuthConditionType, TokenValidationRuleType,
    UsernameClaimPrefixPolicy,
};
use hcp_api::external_auth::{
    ExternalAuthClaimProfile, ExternalAuthClientComponentProfile, ExternalAuthClientProfile,
    ExternalAuthCondition, ExternalAuthProperties, ExternalAuthServiceProviderProperties,
    GroupClaimProfile, TokenClaimMappingsProfile, TokenClaimValidationRule, TokenIssuerProfile,
    TokenRequiredClaim, UsernameClaimProfile,
};
use hcp_api::resource_types::EXTERNAL_AUTH;
use hcp_api::ExternalAuth;
use hcp_core::{ErrorList, FieldError, FieldPath, Operation};

use crate::arm::validate_proxy_resource;
use crate::each::{each_slice_value, unique_by};
use crate::immutable::immutable;
use crate::primitives::{
    enum_value, forbidden, matches_regex, max_items, max_len, min_items, pem, required, required_slice,
    HTTPS_URL, HTTPS_URL_MESSAGE,
};
use crate::resource_id::restricted_resource_id_with_resource_group;
use crate::union::DiscriminatedUnion;
use crate::validator::Ctx;

const MAX_AUDIENCES: usize = 10;
const MAX_CLIENTS: usize = 20;
const MAX_COMPONENT_NAME_LEN: usize = 256;
const MAX_AUTH_CLIENT_NAMESPACE_LEN: usize = 63;
const MAX_GROUP_CLAIM_LEN: usize = 256;

const PREFIX_UNION: DiscriminatedUnion<'static> =
    DiscriminatedUnion::new("prefixPolicy", "prefix", ["prefix", "Prefix"]);
const REQUIRED_CLAIM_UNION: DiscriminatedUnion<'static> =
    DiscriminatedUnion::new("type", "requiredClaim", ["requiredClaim", "RequiredClaim"]);

pub(crate) fn validate_external_auth(
    cx: Ctx<'_>,
    new: &ExternalAuth,
    old: Option<&ExternalAuth>,
) -> ErrorList {
    let op = cx.op;
    // Proxy resources share the envelope path of tracked ones.
    let mut errs = validate_proxy_resource(
        cx,
        &FieldPath::new("trackedResource"),
        &new.proxy_resource,
        old.map(|o| &o.proxy_resource),
    );
    errs.append(restricted_resource_id_with_resource_group(
        op,
        &FieldPath::new("id"),
        new.id(),
        None,
        EXTERNAL_AUTH,
    ));
    errs.append(validate_properties(
        op,
        &FieldPath::new("properties"),
        &new.properties,
        old.map(|o| &o.properties),
    ));
    errs.append(validate_service_provider_properties(
        op,
        &FieldPath::new("serviceProviderProperties"),
        &new.service_provider_properties,
        old.map(|o| &o.service_provider_properties),
    ));
    errs
}

fn validate_properties(
    op: Operation,
    path: &FieldPath,
    new: &ExternalAuthProperties,
    old: Option<&ExternalAuthProperties>,
) -> ErrorList {
    let mut errs = immutable(
        op,
        &path.child("provisioningState"),
        &new.provisioning_state,
        old.map(|o| &o.provisioning_state),
    );
    errs.append(validate_condition(op, &path.child("condition"), &new.condition));
    errs.append(validate_issuer(op, &path.child("issuer"), &new.issuer, old.map(|o| &o.issuer)));

    let clients = path.child("clients");
    errs.append(max_items(
        op,
        &clients,
        Some(new.clients.as_slice()),
        old.map(|o| o.clients.as_slice()),
        MAX_CLIENTS,
    ));
    errs.append(each_slice_value(op, &clients, &new.clients, validate_client));
    errs.append(unique_by(&clients, &new.clients, |client| client.component.clone()));

    errs.append(validate_claim(op, &path.child("claim"), &new.claim, old.map(|o| &o.claim)));
    errs.append(validate_clients_against_audiences(&clients, &new.clients, &new.issuer));
    errs
}

/// An all-default condition means none was reported.
fn validate_condition(op: Operation, path: &FieldPath, new: &ExternalAuthCondition) -> ErrorList {
    if *new == ExternalAuthCondition::default() {
        return ErrorList::new();
    }
    let mut errs = enum_value::<ExternalAuthConditionType>(op, &path.child("type"), &new.condition_type, None);
    errs.append(enum_value::<ConditionStatus>(op, &path.child("status"), &new.status, None));
    errs
}

fn validate_issuer(
    op: Operation,
    path: &FieldPath,
    new: &TokenIssuerProfile,
    old: Option<&TokenIssuerProfile>,
) -> ErrorList {
    let url = path.child("url");
    let mut errs = required(op, &url, &new.url, old.map(|o| &o.url));
    errs.append(matches_regex(op, &url, &new.url, None, &HTTPS_URL, HTTPS_URL_MESSAGE));

    let audiences = path.child("audiences");
    let values = new.audiences.as_deref();
    errs.append(required_slice(op, &audiences, values, old.map(|o| o.audiences.as_deref())));
    errs.append(min_items(op, &audiences, values, None, 1));
    errs.append(max_items(op, &audiences, values, None, MAX_AUDIENCES));

    errs.append(pem(op, &path.child("ca"), &new.ca, None));
    errs
}

fn validate_client(
    op: Operation,
    path: &FieldPath,
    new: &ExternalAuthClientProfile,
    _old: Option<&ExternalAuthClientProfile>,
) -> ErrorList {
    let component = path.child("component");
    let mut errs = required(op, &component, &new.component, None);
    errs.append(validate_client_component(op, &component, &new.component));

    errs.append(required(op, &path.child("clientId"), &new.client_id, None));

    let client_type = path.child("type");
    errs.append(required(op, &client_type, &new.client_type, None));
    errs.append(enum_value::<ExternalAuthClientType>(op, &client_type, &new.client_type, None));
    errs
}

fn validate_client_component(
    op: Operation,
    path: &FieldPath,
    new: &ExternalAuthClientComponentProfile,
) -> ErrorList {
    let name = path.child("name");
    let mut errs = required(op, &name, &new.name, None);
    errs.append(max_len(op, &name, &new.name, None, MAX_COMPONENT_NAME_LEN));

    let namespace = path.child("authClientNamespace");
    errs.append(required(op, &namespace, &new.auth_client_namespace, None));
    errs.append(max_len(
        op,
        &namespace,
        &new.auth_client_namespace,
        None,
        MAX_AUTH_CLIENT_NAMESPACE_LEN,
    ));
    errs
}

/// Each client ID must be one of the issuer's audiences, compared exactly.
fn validate_clients_against_audiences(
    path: &FieldPath,
    clients: &[ExternalAuthClientProfile],
    issuer: &TokenIssuerProfile,
) -> ErrorList {
    let audiences = issuer.audiences.as_deref().unwrap_or_default();
    clients
        .iter()
        .enumerate()
        .filter(|(_, client)| !audiences.contains(&client.client_id))
        .map(|(i, client)| {
            FieldError::invalid(
                &path.index(i).child("clientId"),
                client.client_id.as_str(),
                "must match an audience in issuer audiences",
            )
        })
        .collect()
}

fn validate_claim(
    op: Operation,
    path: &FieldPath,
    new: &ExternalAuthClaimProfile,
    old: Option<&ExternalAuthClaimProfile>,
) -> ErrorList {
    let mappings = path.child("mappings");
    let old_mappings = old.map(|o| &o.mappings);
    let mut errs = required(op, &mappings, &new.mappings, old_mappings);
    errs.append(validate_mappings(op, &mappings, &new.mappings, old_mappings));
    errs.append(each_slice_value(
        op,
        &path.child("validationRules"),
        &new.validation_rules,
        validate_validation_rule,
    ));
    errs
}

fn validate_mappings(
    op: Operation,
    path: &FieldPath,
    new: &TokenClaimMappingsProfile,
    old: Option<&TokenClaimMappingsProfile>,
) -> ErrorList {
    let username = path.child("username");
    let old_username = old.map(|o| &o.username);
    let mut errs = required(op, &username, &new.username, old_username);
    errs.append(validate_username(op, &username, &new.username, old_username));
    if let Some(groups) = &new.groups {
        errs.append(validate_groups(
            op,
            &path.child("groups"),
            groups,
            old.and_then(|o| o.groups.as_ref()),
        ));
    }
    errs
}

fn validate_username(
    op: Operation,
    path: &FieldPath,
    new: &UsernameClaimProfile,
    old: Option<&UsernameClaimProfile>,
) -> ErrorList {
    let mut errs = required(op, &path.child("claim"), &new.claim, old.map(|o| &o.claim));
    errs.append(enum_value::<UsernameClaimPrefixPolicy>(
        op,
        &path.child("prefixPolicy"),
        &new.prefix_policy,
        old.map(|o| &o.prefix_policy),
    ));
    errs.append(PREFIX_UNION.validate(
        op,
        path,
        new.prefix_policy.as_str(),
        !new.prefix.is_empty(),
        old.map(|o| (o.prefix_policy.as_str(), !o.prefix.is_empty())),
    ));
    errs
}

fn validate_groups(
    op: Operation,
    path: &FieldPath,
    new: &GroupClaimProfile,
    old: Option<&GroupClaimProfile>,
) -> ErrorList {
    let claim = path.child("claim");
    let mut errs = required(op, &claim, &new.claim, old.map(|o| &o.claim));
    errs.append(max_len(op, &claim, &new.claim, None, MAX_GROUP_CLAIM_LEN));
    errs
}

fn validate_validation_rule(
    op: Operation,
    path: &FieldPath,
    new: &TokenClaimValidationRule,
    _old: Option<&TokenClaimValidationRule>,
) -> ErrorList {
    let mut errs = enum_value::<TokenValidationRuleType>(op, &path.child("type"), &new.rule_type, None);
    errs.append(REQUIRED_CLAIM_UNION.validate(
        op,
        path,
        new.rule_type.as_str(),
        new.required_claim != TokenRequiredClaim::default(),
        None,
    ));
    let required_claim = path.child("requiredClaim");
    errs.append(required(op, &required_claim.child("claim"), &new.required_claim.claim, None));
    errs.append(required(
        op,
        &required_claim.child("requiredValue"),
        &new.required_claim.required_value,
        None,
    ));
    errs
}

fn validate_service_provider_properties(
    op: Operation,
    path: &FieldPath,
    new: &ExternalAuthServiceProviderProperties,
    old: Option<&ExternalAuthServiceProviderProperties>,
) -> ErrorList {
    let cosmos_uid = path.child("cosmosUID");
    let mut errs = immutable(op, &cosmos_uid, &new.cosmos_uid, old.map(|o| &o.cosmos_uid));
    if old.is_none() {
        errs.append(forbidden(op, &cosmos_uid, &new.cosmos_uid, None));
    }
    errs.append(immutable(
        op,
        &path.child("clusterServiceID"),
        &new.cluster_service_id,
        old.map(|o| &o.cluster_service_id),
    ));
    errs
}
