//! # Cluster Validation
//!
//! Walks the cluster tree in field order, then runs the checks that need
//! the whole object: resource IDs relative to the cluster's own ID, and
//! identity references relative to the attached identities.

use std::collections::BTreeMap;

use hcp_api::cluster::{
    ClusterAutoscalingProfile, ClusterCustomerProperties, ClusterImageRegistryProfile,
    ClusterServiceProviderProperties, CustomerApiProfile, CustomerDnsProfile,
    CustomerManagedEncryptionProfile, CustomerPlatformProfile, EtcdDataEncryptionProfile,
    EtcdProfile, KmsEncryptionProfile, KmsKey, NetworkProfile, UserAssignedIdentitiesProfile,
    VersionProfile,
};
use hcp_api::enums::{
    ClusterImageRegistryState, CustomerManagedEncryptionType, EtcdDataEncryptionKeyManagementMode,
    NetworkType, OutboundType, Visibility,
};
use hcp_api::resource_types::{CLUSTER, NETWORK_SECURITY_GROUP, SUBNET, USER_ASSIGNED_IDENTITY};
use hcp_api::Cluster;
use hcp_core::{ErrorList, FieldPath};

use crate::arm::{validate_managed_service_identity, validate_tracked_resource};
use crate::each::{each_map_key, each_map_value, each_slice_value};
use crate::identity::{reconcile_identities, IdentityReference};
use crate::immutable::immutable;
use crate::network::{cidr_overlap, NamedCidr};
use crate::primitives::{
    cidr_v4, enum_value, forbidden, ipv4, matches_regex, max_items, max_len, maximum, min_items,
    minimum, no_extra_whitespace, openshift_version_without_micro, or, required, Check,
    CLUSTER_NAME, RESOURCE_NAME_MESSAGE, RFC1035_LABEL, RFC1035_LABEL_MESSAGE,
};
use crate::resource_id::{
    different_resource_group_name, different_resource_group_name_from_resource_id,
    restricted_resource_id, restricted_resource_id_with_resource_group, same_subscription,
    user_assigned_identity_location,
};
use crate::union::DiscriminatedUnion;
use crate::validator::Ctx;

const MAX_CLUSTER_NAME_LEN: usize = 54;
const MAX_DOMAIN_PREFIX_LEN: usize = 15;
const MAX_AUTHORIZED_CIDRS: usize = 500;
const MAX_NODE_DRAIN_TIMEOUT_MINUTES: i32 = 10080;
const MAX_KMS_FIELD_LEN: usize = 255;

const CUSTOMER_MANAGED_UNION: DiscriminatedUnion<'static> = DiscriminatedUnion::new(
    "keyManagementMode",
    "customerManaged",
    ["customerManaged", "CustomerManaged"],
);
const KMS_UNION: DiscriminatedUnion<'static> = DiscriminatedUnion::new("encryptionType", "kms", ["kms", "KMS"]);

fn user_assigned_identities_path() -> FieldPath {
    FieldPath::from_fields([
        "customerProperties",
        "platform",
        "operatorsAuthentication",
        "userAssignedIdentities",
    ])
}

pub(crate) fn validate_cluster(cx: Ctx<'_>, new: &Cluster, old: Option<&Cluster>) -> ErrorList {
    let op = cx.op;
    let mut errs = validate_tracked_resource(
        cx,
        &FieldPath::new("trackedResource"),
        &new.tracked_resource,
        old.map(|o| &o.tracked_resource),
    );

    let id_path = FieldPath::new("id");
    errs.append(restricted_resource_id_with_resource_group(op, &id_path, new.id(), None, CLUSTER));
    if let Some(id) = new.id() {
        errs.append(max_len(op, &id_path, id.name(), None, MAX_CLUSTER_NAME_LEN));
        errs.append(matches_regex(op, &id_path, id.name(), None, &CLUSTER_NAME, RESOURCE_NAME_MESSAGE));
    }

    errs.append(validate_customer_properties(
        cx,
        &FieldPath::new("customerProperties"),
        &new.customer_properties,
        old.map(|o| &o.customer_properties),
    ));
    errs.append(validate_service_provider_properties(
        cx,
        &FieldPath::new("serviceProviderProperties"),
        &new.service_provider_properties,
        old.map(|o| &o.service_provider_properties),
    ));
    if let Some(identity) = &new.identity {
        errs.append(validate_managed_service_identity(
            cx,
            &FieldPath::new("identity"),
            identity,
            old.and_then(|o| o.identity.as_ref()),
        ));
    }

    errs.append(validate_resource_ids_against_cluster_id(cx, new));
    errs.append(validate_operators_against_identities(new));
    errs
}

// ─── Customer properties ─────────────────────────────────────────────

fn validate_customer_properties(
    cx: Ctx<'_>,
    path: &FieldPath,
    new: &ClusterCustomerProperties,
    old: Option<&ClusterCustomerProperties>,
) -> ErrorList {
    let op = cx.op;
    let mut errs = validate_version(cx, &path.child("version"), &new.version, old.map(|o| &o.version));
    errs.append(validate_dns(cx, &path.child("dns"), &new.dns, old.map(|o| &o.dns)));

    let network = path.child("network");
    let old_network = old.map(|o| &o.network);
    errs.append(cx.immutable_by_structure(&network, &new.network, old_network));
    errs.append(validate_network(cx, &network, &new.network, old_network));

    errs.append(validate_api(cx, &path.child("api"), &new.api, old.map(|o| &o.api)));

    let platform = path.child("platform");
    let old_platform = old.map(|o| &o.platform);
    errs.append(cx.immutable_by_structure(&platform, &new.platform, old_platform));
    errs.append(validate_platform(cx, &platform, &new.platform, old_platform));

    errs.append(validate_autoscaling(
        cx,
        &path.child("autoscaling"),
        &new.autoscaling,
        old.map(|o| &o.autoscaling),
    ));

    let drain = path.child("nodeDrainTimeoutMinutes");
    let old_drain = old.map(|o| &o.node_drain_timeout_minutes);
    errs.append(minimum(op, &drain, &new.node_drain_timeout_minutes, old_drain, 0));
    errs.append(maximum(
        op,
        &drain,
        &new.node_drain_timeout_minutes,
        old_drain,
        MAX_NODE_DRAIN_TIMEOUT_MINUTES,
    ));

    let etcd = path.child("etcd");
    let old_etcd = old.map(|o| &o.etcd);
    errs.append(cx.immutable_by_structure(&etcd, &new.etcd, old_etcd));
    errs.append(validate_etcd(cx, &etcd, &new.etcd, old_etcd));

    let registry = path.child("clusterImageRegistry");
    let old_registry = old.map(|o| &o.cluster_image_registry);
    errs.append(cx.immutable_by_structure(&registry, &new.cluster_image_registry, old_registry));
    errs.append(validate_image_registry(cx, &registry, &new.cluster_image_registry, old_registry));
    errs
}

fn validate_version(
    cx: Ctx<'_>,
    path: &FieldPath,
    new: &VersionProfile,
    old: Option<&VersionProfile>,
) -> ErrorList {
    let op = cx.op;
    let id = path.child("id");
    let channel_group = path.child("channelGroup");

    let mut errs = immutable(op, &id, &new.id, old.map(|o| &o.id));
    errs.append(immutable(op, &channel_group, &new.channel_group, old.map(|o| &o.channel_group)));
    errs.append(required(op, &channel_group, &new.channel_group, None));
    // Stable releases fall back to the service's default version.
    if new.channel_group != "stable" {
        errs.append(required(op, &id, &new.id, None));
    }
    errs.append(openshift_version_without_micro(op, &id, &new.id, None));
    errs
}

fn validate_dns(
    cx: Ctx<'_>,
    path: &FieldPath,
    new: &CustomerDnsProfile,
    old: Option<&CustomerDnsProfile>,
) -> ErrorList {
    let op = cx.op;
    let prefix = path.child("baseDomainPrefix");
    let mut errs = immutable(op, &prefix, &new.base_domain_prefix, old.map(|o| &o.base_domain_prefix));
    errs.append(max_len(op, &prefix, &new.base_domain_prefix, None, MAX_DOMAIN_PREFIX_LEN));
    errs.append(matches_regex(
        op,
        &prefix,
        &new.base_domain_prefix,
        None,
        &RFC1035_LABEL,
        RFC1035_LABEL_MESSAGE,
    ));
    errs
}

fn validate_network(
    cx: Ctx<'_>,
    path: &FieldPath,
    new: &NetworkProfile,
    old: Option<&NetworkProfile>,
) -> ErrorList {
    let op = cx.op;
    let network_type = path.child("networkType");
    let mut errs = immutable(op, &network_type, &new.network_type, old.map(|o| &o.network_type));
    errs.append(enum_value::<NetworkType>(op, &network_type, &new.network_type, None));

    let cidrs: [(&str, &String, Option<&String>); 3] = [
        ("podCidr", &new.pod_cidr, old.map(|o| &o.pod_cidr)),
        ("serviceCidr", &new.service_cidr, old.map(|o| &o.service_cidr)),
        ("machineCidr", &new.machine_cidr, old.map(|o| &o.machine_cidr)),
    ];
    for (name, value, old_value) in cidrs {
        let field = path.child(name);
        errs.append(immutable(op, &field, value, old_value));
        errs.append(cidr_v4(op, &field, value, None));
    }

    let host_prefix = path.child("hostPrefix");
    errs.append(immutable(op, &host_prefix, &new.host_prefix, old.map(|o| &o.host_prefix)));
    errs.append(minimum(op, &host_prefix, &new.host_prefix, None, 23));
    errs.append(maximum(op, &host_prefix, &new.host_prefix, None, 26));

    // Subnet sizing limits are enforced by the cluster service.
    errs.append(cidr_overlap(
        path,
        &[
            NamedCidr::new("machine", &new.machine_cidr),
            NamedCidr::new("service", &new.service_cidr),
            NamedCidr::new("pod", &new.pod_cidr),
        ],
    ));
    errs
}

fn validate_api(
    cx: Ctx<'_>,
    path: &FieldPath,
    new: &CustomerApiProfile,
    old: Option<&CustomerApiProfile>,
) -> ErrorList {
    let op = cx.op;
    // The misspelling is part of the published error paths.
    let visibility = path.child("visiblity");
    let mut errs = immutable(op, &visibility, &new.visibility, old.map(|o| &o.visibility));
    errs.append(enum_value::<Visibility>(op, &visibility, &new.visibility, None));

    let cidrs_path = path.child("authorizedCidrs");
    let cidrs = new.authorized_cidrs.as_deref();
    errs.append(max_items(op, &cidrs_path, cidrs, None, MAX_AUTHORIZED_CIDRS));
    errs.append(min_items(op, &cidrs_path, cidrs, None, 1));

    let cidrs = cidrs.unwrap_or_default();
    let address_or_range: [Check<'_, str>; 2] = [&ipv4, &cidr_v4];
    errs.append(each_slice_value(op, &cidrs_path, cidrs, |op, p, v: &String, _| {
        or(op, p, v.as_str(), None, &address_or_range)
    }));
    errs.append(each_slice_value(op, &cidrs_path, cidrs, required));
    errs.append(each_slice_value(op, &cidrs_path, cidrs, |op, p, v: &String, _| {
        no_extra_whitespace(op, p, v, None)
    }));
    errs
}

fn validate_platform(
    cx: Ctx<'_>,
    path: &FieldPath,
    new: &CustomerPlatformProfile,
    old: Option<&CustomerPlatformProfile>,
) -> ErrorList {
    let op = cx.op;
    let managed_rg = path.child("managedResourceGroup");
    let mut errs = immutable(
        op,
        &managed_rg,
        &new.managed_resource_group,
        old.map(|o| &o.managed_resource_group),
    );

    let subnet = path.child("subnetId");
    let old_subnet = old.map(|o| &o.subnet_id);
    errs.append(immutable(op, &subnet, &new.subnet_id, old_subnet));
    errs.append(required(op, &subnet, &new.subnet_id, old_subnet));
    errs.append(restricted_resource_id(op, &subnet, &new.subnet_id, None, SUBNET));
    errs.append(different_resource_group_name_from_resource_id(
        op,
        &subnet,
        &new.subnet_id,
        None,
        &new.managed_resource_group,
    ));

    let outbound = path.child("outboundType");
    errs.append(immutable(op, &outbound, &new.outbound_type, old.map(|o| &o.outbound_type)));
    errs.append(enum_value::<OutboundType>(op, &outbound, &new.outbound_type, None));

    let nsg = path.child("networkSecurityGroupId");
    let old_nsg = old.map(|o| &o.network_security_group_id);
    errs.append(immutable(op, &nsg, &new.network_security_group_id, old_nsg));
    errs.append(required(op, &nsg, &new.network_security_group_id, old_nsg));
    errs.append(restricted_resource_id(
        op,
        &nsg,
        &new.network_security_group_id,
        old_nsg.map(String::as_str),
        NETWORK_SECURITY_GROUP,
    ));

    let auth = path.child("operatorsAuthentication");
    let old_auth = old.map(|o| &o.operators_authentication);
    errs.append(cx.immutable_by_structure(&auth, &new.operators_authentication, old_auth));

    let identities = auth.child("userAssignedIdentities");
    let old_identities = old_auth.map(|o| &o.user_assigned_identities);
    errs.append(cx.immutable_by_structure(
        &identities,
        &new.operators_authentication.user_assigned_identities,
        old_identities,
    ));
    errs.append(validate_user_assigned_identities(
        cx,
        &identities,
        &new.operators_authentication.user_assigned_identities,
        old_identities,
    ));
    errs
}

fn validate_operator_map(
    cx: Ctx<'_>,
    path: &FieldPath,
    new: &BTreeMap<String, String>,
    old: Option<&BTreeMap<String, String>>,
) -> ErrorList {
    let op = cx.op;
    let mut errs = cx.immutable_by_structure(path, new, old);
    errs.append(each_map_key(op, path, new, old, |op, p, k, _| {
        required(op, p, &k.to_string(), None)
    }));
    errs.append(each_map_value(op, path, new, old, required));
    errs.append(each_map_value(op, path, new, old, |op, p, v, o| {
        restricted_resource_id(op, p, v, o.map(String::as_str), USER_ASSIGNED_IDENTITY)
    }));
    errs
}

fn validate_user_assigned_identities(
    cx: Ctx<'_>,
    path: &FieldPath,
    new: &UserAssignedIdentitiesProfile,
    old: Option<&UserAssignedIdentitiesProfile>,
) -> ErrorList {
    let mut errs = validate_operator_map(
        cx,
        &path.child("controlPlaneOperators"),
        &new.control_plane_operators,
        old.map(|o| &o.control_plane_operators),
    );
    errs.append(validate_operator_map(
        cx,
        &path.child("dataPlaneOperators"),
        &new.data_plane_operators,
        old.map(|o| &o.data_plane_operators),
    ));

    let service = path.child("serviceManagedIdentity");
    let old_service = old.map(|o| &o.service_managed_identity);
    errs.append(immutable(cx.op, &service, &new.service_managed_identity, old_service));
    errs.append(restricted_resource_id(
        cx.op,
        &service,
        &new.service_managed_identity,
        old_service.map(String::as_str),
        USER_ASSIGNED_IDENTITY,
    ));
    errs
}

fn validate_autoscaling(
    cx: Ctx<'_>,
    path: &FieldPath,
    new: &ClusterAutoscalingProfile,
    old: Option<&ClusterAutoscalingProfile>,
) -> ErrorList {
    let mut errs = minimum(
        cx.op,
        &path.child("maxPodGracePeriodSeconds"),
        &new.max_pod_grace_period_seconds,
        old.map(|o| &o.max_pod_grace_period_seconds),
        1,
    );
    errs.append(minimum(
        cx.op,
        &path.child("maxNodeProvisionTimeSeconds"),
        &new.max_node_provision_time_seconds,
        old.map(|o| &o.max_node_provision_time_seconds),
        1,
    ));
    errs
}

fn validate_etcd(cx: Ctx<'_>, path: &FieldPath, new: &EtcdProfile, old: Option<&EtcdProfile>) -> ErrorList {
    let encryption = path.child("dataEncryption");
    let old_encryption = old.map(|o| &o.data_encryption);
    let mut errs = cx.immutable_by_structure(&encryption, &new.data_encryption, old_encryption);
    errs.append(validate_data_encryption(cx, &encryption, &new.data_encryption, old_encryption));
    errs
}

fn validate_data_encryption(
    cx: Ctx<'_>,
    path: &FieldPath,
    new: &EtcdDataEncryptionProfile,
    old: Option<&EtcdDataEncryptionProfile>,
) -> ErrorList {
    let op = cx.op;
    let mode = path.child("keyManagementMode");
    let old_mode = old.map(|o| &o.key_management_mode);
    let mut errs = immutable(op, &mode, &new.key_management_mode, old_mode);
    errs.append(enum_value::<EtcdDataEncryptionKeyManagementMode>(
        op,
        &mode,
        &new.key_management_mode,
        old_mode,
    ));

    let customer_managed = path.child("customerManaged");
    let old_customer_managed = old.and_then(|o| o.customer_managed.as_ref());
    errs.append(cx.immutable_by_structure(
        &customer_managed,
        &new.customer_managed,
        old.map(|o| &o.customer_managed),
    ));
    errs.append(CUSTOMER_MANAGED_UNION.validate(
        op,
        path,
        new.key_management_mode.as_str(),
        new.customer_managed.is_some(),
        old.map(|o| (o.key_management_mode.as_str(), o.customer_managed.is_some())),
    ));
    if let Some(profile) = &new.customer_managed {
        errs.append(validate_customer_managed(cx, &customer_managed, profile, old_customer_managed));
    }
    errs
}

fn validate_customer_managed(
    cx: Ctx<'_>,
    path: &FieldPath,
    new: &CustomerManagedEncryptionProfile,
    old: Option<&CustomerManagedEncryptionProfile>,
) -> ErrorList {
    let op = cx.op;
    let encryption_type = path.child("encryptionType");
    let old_type = old.map(|o| &o.encryption_type);
    let mut errs = immutable(op, &encryption_type, &new.encryption_type, old_type);
    errs.append(enum_value::<CustomerManagedEncryptionType>(
        op,
        &encryption_type,
        &new.encryption_type,
        old_type,
    ));

    let kms = path.child("kms");
    errs.append(cx.immutable_by_structure(&kms, &new.kms, old.map(|o| &o.kms)));
    errs.append(KMS_UNION.validate(
        op,
        path,
        new.encryption_type.as_str(),
        new.kms.is_some(),
        old.map(|o| (o.encryption_type.as_str(), o.kms.is_some())),
    ));
    if let Some(profile) = &new.kms {
        errs.append(validate_kms(cx, &kms, profile, old.and_then(|o| o.kms.as_ref())));
    }
    errs
}

fn validate_kms(
    cx: Ctx<'_>,
    path: &FieldPath,
    new: &KmsEncryptionProfile,
    old: Option<&KmsEncryptionProfile>,
) -> ErrorList {
    let active_key = path.child("activeKey");
    let old_key = old.map(|o| &o.active_key);
    let mut errs = cx.immutable_by_structure(&active_key, &new.active_key, old_key);
    errs.append(validate_kms_key(cx, &active_key, &new.active_key, old_key));
    errs
}

fn validate_kms_key(cx: Ctx<'_>, path: &FieldPath, new: &KmsKey, old: Option<&KmsKey>) -> ErrorList {
    let fields: [(&str, &String, Option<&String>); 3] = [
        ("name", &new.name, old.map(|o| &o.name)),
        ("vaultName", &new.vault_name, old.map(|o| &o.vault_name)),
        ("version", &new.version, old.map(|o| &o.version)),
    ];
    let mut errs = ErrorList::new();
    for (name, value, old_value) in fields {
        let field = path.child(name);
        errs.append(immutable(cx.op, &field, value, old_value));
        errs.append(required(cx.op, &field, value, None));
        errs.append(max_len(cx.op, &field, value, None, MAX_KMS_FIELD_LEN));
    }
    errs
}

fn validate_image_registry(
    cx: Ctx<'_>,
    path: &FieldPath,
    new: &ClusterImageRegistryProfile,
    old: Option<&ClusterImageRegistryProfile>,
) -> ErrorList {
    let state = path.child("state");
    let old_state = old.map(|o| &o.state);
    let mut errs = immutable(cx.op, &state, &new.state, old_state);
    errs.append(enum_value::<ClusterImageRegistryState>(cx.op, &state, &new.state, old_state));
    errs
}

// ─── Service provider properties ─────────────────────────────────────

fn validate_service_provider_properties(
    cx: Ctx<'_>,
    path: &FieldPath,
    new: &ClusterServiceProviderProperties,
    old: Option<&ClusterServiceProviderProperties>,
) -> ErrorList {
    let op = cx.op;
    let mut errs = immutable(
        op,
        &path.child("provisioningState"),
        &new.provisioning_state,
        old.map(|o| &o.provisioning_state),
    );

    let cosmos_uid = path.child("cosmosUID");
    errs.append(immutable(op, &cosmos_uid, &new.cosmos_uid, old.map(|o| &o.cosmos_uid)));
    // Assigned by the service after the first write.
    if old.is_none() {
        errs.append(forbidden(op, &cosmos_uid, &new.cosmos_uid, None));
    }
    errs.append(immutable(
        op,
        &path.child("clusterServiceID"),
        &new.cluster_service_id,
        old.map(|o| &o.cluster_service_id),
    ));
    errs.append(immutable(
        op,
        &path.child("dns").child("baseDomain"),
        &new.dns.base_domain,
        old.map(|o| &o.dns.base_domain),
    ));

    let console = path.child("console");
    let old_console = old.map(|o| &o.console);
    errs.append(cx.immutable_by_structure(&console, &new.console, old_console));
    errs.append(immutable(op, &console.child("url"), &new.console.url, old_console.map(|o| &o.url)));

    errs.append(immutable(
        op,
        &path.child("api").child("url"),
        &new.api.url,
        old.map(|o| &o.api.url),
    ));

    let platform = path.child("platform");
    let old_platform = old.map(|o| &o.platform);
    errs.append(cx.immutable_by_structure(&platform, &new.platform, old_platform));
    errs.append(immutable(
        op,
        &platform.child("issuerUrl"),
        &new.platform.issuer_url,
        old_platform.map(|o| &o.issuer_url),
    ));
    errs
}

// ─── Whole-object checks ─────────────────────────────────────────────

/// Resources the cluster references must share its subscription and stay
/// out of the managed resource group.
fn validate_resource_ids_against_cluster_id(cx: Ctx<'_>, cluster: &Cluster) -> ErrorList {
    let Some(id) = cluster.id() else {
        return ErrorList::new();
    };
    let op = cx.op;
    let platform = &cluster.customer_properties.platform;
    let platform_path = FieldPath::from_fields(["customerProperties", "platform"]);

    let mut errs = different_resource_group_name(
        op,
        &platform_path.child("managedResourceGroup"),
        &platform.managed_resource_group,
        None,
        id.resource_group_name(),
    );
    let subnet = platform_path.child("subnetId");
    errs.append(same_subscription(op, &subnet, &platform.subnet_id, None, id.subscription_id()));
    errs.append(different_resource_group_name_from_resource_id(
        op,
        &subnet,
        &platform.subnet_id,
        None,
        &platform.managed_resource_group,
    ));

    let identities = &platform.operators_authentication.user_assigned_identities;
    let identities_path = user_assigned_identities_path();
    let check_location = |path: &FieldPath, value: &str| {
        user_assigned_identity_location(
            op,
            path,
            value,
            None,
            id.subscription_id(),
            &platform.managed_resource_group,
        )
    };
    for (slot, map) in [
        ("controlPlaneOperators", &identities.control_plane_operators),
        ("dataPlaneOperators", &identities.data_plane_operators),
    ] {
        let slot_path = identities_path.child(slot);
        for (name, value) in map {
            errs.append(check_location(&slot_path.key(name.as_str()), value));
        }
    }
    errs.append(check_location(
        &identities_path.child("serviceManagedIdentity"),
        &identities.service_managed_identity,
    ));
    errs
}

/// Every attached identity is used by exactly one control plane operator
/// or the service identity slot, and data plane operators bring their own.
fn validate_operators_against_identities(cluster: &Cluster) -> ErrorList {
    let identities = &cluster.customer_properties.platform.operators_authentication.user_assigned_identities;
    let slots = user_assigned_identities_path();

    let mut consumers: Vec<IdentityReference<'_>> = identities
        .control_plane_operators
        .iter()
        .map(|(name, id)| {
            IdentityReference::new(slots.child("controlPlaneOperators").key(name.as_str()), id)
        })
        .collect();
    if !identities.service_managed_identity.is_empty() {
        consumers.push(IdentityReference::new(
            slots.child("serviceManagedIdentity"),
            &identities.service_managed_identity,
        ));
    }
    let data_plane: Vec<IdentityReference<'_>> = identities
        .data_plane_operators
        .iter()
        .map(|(name, id)| IdentityReference::new(slots.child("dataPlaneOperators").key(name.as_str()), id))
        .collect();

    let assigned = cluster
        .identity
        .as_ref()
        .map(|msi| &msi.user_assigned_identities);
    reconcile_identities(
        &FieldPath::from_fields(["identity", "userAssignedIdentities"]),
        assigned.into_iter().flat_map(|m| m.keys().map(String::as_str)),
        &consumers,
        &data_plane,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcp_api::fixtures;
    use hcp_core::{EqualityStrategies, ErrorKind, Operation};

    fn run(op: Operation, new: &Cluster, old: Option<&Cluster>) -> ErrorList {
        let strategies = EqualityStrategies::default();
        validate_cluster(Ctx { op, strategies: &strategies }, new, old)
    }

    fn create(new: &Cluster) -> ErrorList {
        run(Operation::Create, new, None)
    }

    fn details_at<'a>(errs: &'a ErrorList, path: &'a str) -> Vec<&'a str> {
        errs.at(path).map(|e| e.detail.as_str()).collect()
    }

    #[test]
    fn minimum_valid_cluster_passes() {
        let errs = create(&fixtures::minimum_valid_cluster());
        assert!(errs.is_empty(), "{errs}");
    }

    #[test]
    fn cluster_with_identities_passes() {
        let errs = create(&fixtures::valid_cluster_with_identities());
        assert!(errs.is_empty(), "{errs}");
    }

    #[test]
    fn name_pattern_and_length() {
        let mut cluster = fixtures::minimum_valid_cluster();
        let long = format!(
            "{}/providers/Microsoft.RedHatOpenShift/hcpOpenShiftClusters/{}",
            "/subscriptions/11111111-1111-1111-1111-111111111111/resourceGroups/testResourceGroup",
            "a".repeat(55)
        );
        cluster.tracked_resource.resource.id = Some(hcp_core::ResourceId::new(long).unwrap());
        let errs = create(&cluster);
        assert_eq!(errs.at("id").count(), 2, "{errs}");
        assert!(errs.at("id").any(|e| e.kind == ErrorKind::TooLong));
    }

    #[test]
    fn non_stable_channel_requires_version() {
        let mut cluster = fixtures::minimum_valid_cluster();
        cluster.customer_properties.version.channel_group = "candidate".to_string();
        let errs = create(&cluster);
        assert_eq!(errs.len(), 1, "{errs}");
        assert_eq!(errs.errors()[0].path.to_string(), "customerProperties.version.id");
        assert_eq!(errs.errors()[0].kind, ErrorKind::Required);
    }

    #[test]
    fn version_patch_is_managed() {
        let mut cluster = fixtures::minimum_valid_cluster();
        cluster.customer_properties.version.id = "4.15.1".to_string();
        let errs = create(&cluster);
        assert_eq!(
            details_at(&errs, "customerProperties.version.id"),
            ["must be specified as MAJOR.MINOR; the PATCH value is managed"]
        );
    }

    #[test]
    fn overlapping_networks_reported_at_network() {
        let mut cluster = fixtures::minimum_valid_cluster();
        cluster.customer_properties.network.service_cidr = "10.0.0.0/23".to_string();
        let errs = create(&cluster);
        assert_eq!(
            details_at(&errs, "customerProperties.network"),
            ["machine CIDR '10.0.0.0/16' and service CIDR '10.0.0.0/23' overlap"]
        );
    }

    #[test]
    fn authorized_cidrs_accept_addresses_and_ranges() {
        let mut cluster = fixtures::minimum_valid_cluster();
        cluster.customer_properties.api.authorized_cidrs =
            Some(vec!["10.0.0.1".to_string(), "192.168.0.0/24".to_string()]);
        assert!(create(&cluster).is_empty());

        cluster.customer_properties.api.authorized_cidrs = Some(vec![" 10.0.0.1".to_string()]);
        let errs = create(&cluster);
        let details = details_at(&errs, "customerProperties.api.authorizedCidrs[0]");
        assert!(details.contains(&"must not contain extra whitespace"), "{errs}");

        cluster.customer_properties.api.authorized_cidrs = Some(vec![]);
        let errs = create(&cluster);
        assert_eq!(
            details_at(&errs, "customerProperties.api.authorizedCidrs"),
            ["must have at least 1 items"]
        );
    }

    #[test]
    fn visibility_path_keeps_published_spelling() {
        let mut cluster = fixtures::minimum_valid_cluster();
        cluster.customer_properties.api.visibility = Visibility::new("Internal");
        let errs = create(&cluster);
        assert_eq!(errs.at("customerProperties.api.visiblity").count(), 1, "{errs}");
    }

    #[test]
    fn customer_managed_encryption_requires_profile() {
        let mut cluster = fixtures::minimum_valid_cluster();
        cluster.customer_properties.etcd.data_encryption.key_management_mode =
            EtcdDataEncryptionKeyManagementMode::CUSTOMER_MANAGED;
        let errs = create(&cluster);
        assert_eq!(
            details_at(&errs, "customerProperties.etcd.dataEncryption.customerManaged"),
            ["must be specified when `keyManagementMode` is \"CustomerManaged\""]
        );
    }

    #[test]
    fn kms_key_fields_required() {
        let mut cluster = fixtures::minimum_valid_cluster();
        let encryption = &mut cluster.customer_properties.etcd.data_encryption;
        encryption.key_management_mode = EtcdDataEncryptionKeyManagementMode::CUSTOMER_MANAGED;
        encryption.customer_managed = Some(CustomerManagedEncryptionProfile {
            encryption_type: CustomerManagedEncryptionType::KMS,
            kms: Some(KmsEncryptionProfile::default()),
        });
        let errs = create(&cluster);
        assert_eq!(errs.len(), 3, "{errs}");
        assert!(errs.iter().all(|e| e.kind == ErrorKind::Required));
        assert_eq!(
            errs.at("customerProperties.etcd.dataEncryption.customerManaged.kms.activeKey.vaultName")
                .count(),
            1
        );
    }

    #[test]
    fn cosmos_uid_forbidden_on_create_only() {
        let mut cluster = fixtures::minimum_valid_cluster();
        cluster.service_provider_properties.cosmos_uid = "uid".to_string();
        let errs = create(&cluster);
        let forbidden: Vec<_> = errs.at("serviceProviderProperties.cosmosUID").collect();
        assert_eq!(forbidden.len(), 1);
        assert_eq!(forbidden[0].kind, ErrorKind::Forbidden);

        let errs = run(Operation::Update, &cluster, Some(&cluster));
        assert!(errs.is_empty(), "{errs}");
    }

    #[test]
    fn managed_resource_group_must_differ_from_cluster_group() {
        let mut cluster = fixtures::minimum_valid_cluster();
        cluster.customer_properties.platform.managed_resource_group =
            fixtures::TEST_RESOURCE_GROUP_NAME.to_lowercase();
        let errs = create(&cluster);
        let details = details_at(&errs, "customerProperties.platform.managedResourceGroup");
        assert_eq!(details, ["must not be the same resource group name: \"testResourceGroup\""]);
        assert_eq!(
            details_at(&errs, "customerProperties.platform.subnetId"),
            ["must not be the same resource group name: \"testresourcegroup\"",
             "must not be the same resource group name: \"testresourcegroup\""]
        );
    }

    #[test]
    fn data_plane_operator_may_not_reuse_attached_identity() {
        let mut cluster = fixtures::valid_cluster_with_identities();
        cluster
            .customer_properties
            .platform
            .operators_authentication
            .user_assigned_identities
            .data_plane_operators
            .insert("image-registry".to_string(), fixtures::test_user_assigned_identity("CP-CAPZ"));
        let errs = create(&cluster);
        assert_eq!(errs.len(), 1, "{errs}");
        assert_eq!(
            errs.errors()[0].path.to_string(),
            "customerProperties.platform.operatorsAuthentication.userAssignedIdentities.dataPlaneOperators[image-registry]"
        );
    }

    #[test]
    fn update_with_same_object_is_clean() {
        let cluster = fixtures::valid_cluster_with_identities();
        assert!(run(Operation::Update, &cluster, Some(&cluster)).is_empty());
    }

    #[test]
    fn platform_change_reports_struct_and_field() {
        let old = fixtures::minimum_valid_cluster();
        let mut new = old.clone();
        new.customer_properties.platform.network_security_group_id = fixtures::test_network_security_group_id()
            .replace(fixtures::TEST_NETWORK_SECURITY_GROUP_NAME, "otherNsg");
        let errs = run(Operation::Update, &new, Some(&old));
        let paths: Vec<String> = errs.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(
            paths,
            [
                "customerProperties.platform",
                "customerProperties.platform.networkSecurityGroupId"
            ]
        );
        assert!(errs.iter().all(|e| e.kind == ErrorKind::Immutable));
    }
}
