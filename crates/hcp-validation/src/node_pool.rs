//! Node pool rules, on their own and relative to the parent cluster.

use hcp_api::enums::{DiskStorageAccountType, Effect};
use hcp_api::node_pool::{
    NodePoolAutoScaling, NodePoolPlatformProfile, NodePoolProperties, NodePoolServiceProviderProperties,
    NodePoolVersionProfile, OsDiskProfile, Taint, MAX_NODE_POOL_NODES,
};
use hcp_api::resource_types::{DISK_ENCRYPTION_SET, NODE_POOL, SUBNET};
use hcp_api::{Cluster, NodePool};
use hcp_core::{ErrorList, FieldError, FieldPath, Operation, ResourceId};

use crate::arm::validate_tracked_resource;
use crate::each::{each_map_key_at_parent, each_map_value, each_slice_value};
use crate::immutable::immutable;
use crate::primitives::{
    enum_value, equal_to, forbidden, kube_label_value, kube_qualified_name, matches_regex, max_len,
    maximum_if_no_availability_zone, minimum, openshift_version_with_optional_micro, required,
    NODE_POOL_NAME, RESOURCE_NAME_MESSAGE,
};
use crate::resource_id::{restricted_resource_id, restricted_resource_id_with_resource_group};
use crate::validator::Ctx;

const MAX_NODE_POOL_NAME_LEN: usize = 15;
const MIN_OS_DISK_SIZE_GIB: i32 = 64;

pub(crate) fn validate_node_pool(cx: Ctx<'_>, new: &NodePool, old: Option<&NodePool>) -> ErrorList {
    let op = cx.op;
    let mut errs = validate_tracked_resource(
        cx,
        &FieldPath::new("trackedResource"),
        &new.tracked_resource,
        old.map(|o| &o.tracked_resource),
    );

    let id_path = FieldPath::new("id");
    errs.append(restricted_resource_id_with_resource_group(op, &id_path, new.id(), None, NODE_POOL));
    if let Some(id) = new.id() {
        errs.append(max_len(op, &id_path, id.name(), None, MAX_NODE_POOL_NAME_LEN));
        errs.append(matches_regex(op, &id_path, id.name(), None, &NODE_POOL_NAME, RESOURCE_NAME_MESSAGE));
    }

    errs.append(validate_properties(
        cx,
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
    cx: Ctx<'_>,
    path: &FieldPath,
    new: &NodePoolProperties,
    old: Option<&NodePoolProperties>,
) -> ErrorList {
    let op = cx.op;
    let mut errs = immutable(
        op,
        &path.child("provisioningState"),
        &new.provisioning_state,
        old.map(|o| &o.provisioning_state),
    );
    errs.append(validate_version(op, &path.child("version"), &new.version, old.map(|o| &o.version)));

    let platform = path.child("platform");
    let old_platform = old.map(|o| &o.platform);
    errs.append(cx.immutable_by_structure(&platform, &new.platform, old_platform));
    errs.append(validate_platform(cx, &platform, &new.platform, old_platform));

    let zone = new.platform.availability_zone.as_str();
    let replicas = path.child("replicas");
    let old_replicas = old.map(|o| &o.replicas);
    errs.append(minimum(op, &replicas, &new.replicas, old_replicas, 0));
    errs.append(maximum_if_no_availability_zone(
        op,
        &replicas,
        &new.replicas,
        old_replicas,
        MAX_NODE_POOL_NODES,
        zone,
    ));
    // The autoscaler owns the replica count.
    if new.auto_scaling.is_some() {
        errs.append(equal_to(op, &replicas, &new.replicas, old_replicas, 0));
    }

    errs.append(immutable(op, &path.child("autoRepair"), &new.auto_repair, old.map(|o| &o.auto_repair)));

    if let Some(auto_scaling) = &new.auto_scaling {
        errs.append(validate_auto_scaling(
            op,
            &path.child("autoScaling"),
            auto_scaling,
            old.and_then(|o| o.auto_scaling.as_ref()),
            zone,
        ));
    }

    let labels = path.child("labels");
    let old_labels = old.map(|o| &o.labels);
    errs.append(each_map_key_at_parent(op, &labels, &new.labels, old_labels, kube_qualified_name));
    errs.append(each_map_value(op, &labels, &new.labels, old_labels, |op, p, v, o| {
        kube_label_value(op, p, v, o.map(String::as_str))
    }));

    errs.append(each_slice_value(op, &path.child("taints"), &new.taints, validate_taint));
    errs
}

fn validate_version(
    op: Operation,
    path: &FieldPath,
    new: &NodePoolVersionProfile,
    old: Option<&NodePoolVersionProfile>,
) -> ErrorList {
    let id = path.child("id");
    let old_id = old.map(|o| &o.id);
    let mut errs = ErrorList::new();
    if new.channel_group != "stable" {
        errs.append(required(op, &id, &new.id, old_id));
    }
    errs.append(openshift_version_with_optional_micro(op, &id, &new.id, old_id.map(String::as_str)));
    // Compared with the control plane's channel group by the parent check.
    errs.append(required(
        op,
        &path.child("channelGroup"),
        &new.channel_group,
        old.map(|o| &o.channel_group),
    ));
    errs
}

fn validate_platform(
    cx: Ctx<'_>,
    path: &FieldPath,
    new: &NodePoolPlatformProfile,
    old: Option<&NodePoolPlatformProfile>,
) -> ErrorList {
    let op = cx.op;
    let subnet = path.child("subnetId");
    let old_subnet = old.map(|o| &o.subnet_id);
    let mut errs = immutable(op, &subnet, &new.subnet_id, old_subnet);
    errs.append(restricted_resource_id(op, &subnet, &new.subnet_id, old_subnet.map(String::as_str), SUBNET));

    let vm_size = path.child("vmSize");
    let old_vm_size = old.map(|o| &o.vm_size);
    errs.append(immutable(op, &vm_size, &new.vm_size, old_vm_size));
    errs.append(required(op, &vm_size, &new.vm_size, old_vm_size));

    errs.append(immutable(
        op,
        &path.child("enableEncryptionAtHost"),
        &new.enable_encryption_at_host,
        old.map(|o| &o.enable_encryption_at_host),
    ));

    let os_disk = path.child("osDisk");
    let old_os_disk = old.map(|o| &o.os_disk);
    errs.append(cx.immutable_by_structure(&os_disk, &new.os_disk, old_os_disk));
    errs.append(validate_os_disk(op, &os_disk, &new.os_disk, old_os_disk));

    errs.append(immutable(
        op,
        &path.child("availabilityZone"),
        &new.availability_zone,
        old.map(|o| &o.availability_zone),
    ));
    errs
}

fn validate_os_disk(op: Operation, path: &FieldPath, new: &OsDiskProfile, old: Option<&OsDiskProfile>) -> ErrorList {
    let mut errs = ErrorList::new();
    if let Some(size) = &new.size_gib {
        errs.append(minimum(
            op,
            &path.child("sizeGiB"),
            size,
            old.and_then(|o| o.size_gib.as_ref()),
            MIN_OS_DISK_SIZE_GIB,
        ));
    }
    errs.append(enum_value::<DiskStorageAccountType>(
        op,
        &path.child("diskStorageAccountType"),
        &new.disk_storage_account_type,
        old.map(|o| &o.disk_storage_account_type),
    ));
    errs.append(restricted_resource_id(
        op,
        &path.child("encryptionSetId"),
        &new.encryption_set_id,
        old.map(|o| o.encryption_set_id.as_str()),
        DISK_ENCRYPTION_SET,
    ));
    errs
}

fn validate_auto_scaling(
    op: Operation,
    path: &FieldPath,
    new: &NodePoolAutoScaling,
    old: Option<&NodePoolAutoScaling>,
    availability_zone: &str,
) -> ErrorList {
    let min = path.child("min");
    let max = path.child("max");
    let old_min = old.map(|o| &o.min);
    let old_max = old.map(|o| &o.max);

    let mut errs = minimum(op, &min, &new.min, old_min, 0);
    errs.append(maximum_if_no_availability_zone(
        op,
        &min,
        &new.min,
        old_min,
        MAX_NODE_POOL_NODES,
        availability_zone,
    ));
    errs.append(maximum_if_no_availability_zone(
        op,
        &max,
        &new.max,
        old_max,
        MAX_NODE_POOL_NODES,
        availability_zone,
    ));
    // Ordering only means something once both bounds are in range.
    if errs.is_empty() {
        errs.append(minimum(op, &max, &new.max, old_max, new.min));
    }
    errs
}

fn validate_taint(op: Operation, path: &FieldPath, new: &Taint, _old: Option<&Taint>) -> ErrorList {
    let key = path.child("key");
    let mut errs = enum_value::<Effect>(op, &path.child("effect"), &new.effect, None);
    errs.append(required(op, &key, &new.key, None));
    errs.append(kube_qualified_name(op, &key, &new.key, None));
    errs.append(kube_label_value(op, &path.child("value"), &new.value, None));
    errs
}

fn validate_service_provider_properties(
    op: Operation,
    path: &FieldPath,
    new: &NodePoolServiceProviderProperties,
    old: Option<&NodePoolServiceProviderProperties>,
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

// ─── Parent cluster ──────────────────────────────────────────────────

pub(crate) fn validate_node_pool_against_cluster(node_pool: &NodePool, cluster: &Cluster) -> ErrorList {
    let mut errs = validate_channel_group(node_pool, cluster);
    errs.append(validate_subnet_vnet(node_pool, cluster));
    errs
}

fn validate_channel_group(node_pool: &NodePool, cluster: &Cluster) -> ErrorList {
    let node_pool_group = &node_pool.properties.version.channel_group;
    let cluster_group = &cluster.customer_properties.version.channel_group;
    if node_pool_group == cluster_group {
        return ErrorList::new();
    }
    FieldError::invalid(
        &FieldPath::from_fields(["properties", "version", "channelGroup"]),
        node_pool_group.as_str(),
        format!(
            "Node pool channel group '{node_pool_group}' must be the same as control plane channel group '{cluster_group}'"
        ),
    )
    .into()
}

/// Both subnets must hang off the same virtual network. Identifiers that do
/// not parse were already reported by the per-entity checks.
fn validate_subnet_vnet(node_pool: &NodePool, cluster: &Cluster) -> ErrorList {
    let raw = &node_pool.properties.platform.subnet_id;
    if raw.is_empty() {
        return ErrorList::new();
    }
    let (Ok(cluster_subnet), Ok(node_pool_subnet)) = (
        ResourceId::new(&cluster.customer_properties.platform.subnet_id),
        ResourceId::new(raw),
    ) else {
        return ErrorList::new();
    };

    let cluster_vnet = cluster_subnet.parent();
    let same_vnet = match (node_pool_subnet.parent(), cluster_vnet) {
        (Some(a), Some(b)) => a.eq_ignore_case(b),
        (None, None) => true,
        _ => false,
    };
    if same_vnet {
        return ErrorList::new();
    }
    let cluster_vnet = cluster_vnet.map(ResourceId::as_str).unwrap_or_default();
    FieldError::invalid(
        &FieldPath::from_fields(["properties", "platform", "subnetId"]),
        raw.as_str(),
        format!(
            "Subnet '{}' must belong to the same VNet as the parent cluster VNet '{cluster_vnet}'",
            node_pool_subnet.as_str()
        ),
    )
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcp_api::fixtures;
    use hcp_core::{EqualityStrategies, ErrorKind};

    fn run(op: Operation, new: &NodePool, old: Option<&NodePool>) -> ErrorList {
        let strategies = EqualityStrategies::default();
        validate_node_pool(Ctx { op, strategies: &strategies }, new, old)
    }

    fn create(new: &NodePool) -> ErrorList {
        run(Operation::Create, new, None)
    }

    fn paths(errs: &ErrorList) -> Vec<String> {
        errs.iter().map(|e| e.path.to_string()).collect()
    }

    #[test]
    fn minimum_valid_node_pool_passes() {
        let errs = create(&fixtures::minimum_valid_node_pool());
        assert!(errs.is_empty(), "{errs}");
    }

    #[test]
    fn vm_size_required() {
        let mut np = fixtures::minimum_valid_node_pool();
        np.properties.platform.vm_size.clear();
        let errs = create(&np);
        assert_eq!(paths(&errs), ["properties.platform.vmSize"]);
        assert_eq!(errs.errors()[0].kind, ErrorKind::Required);
    }

    #[test]
    fn node_pools_may_pin_a_patch_release() {
        let mut np = fixtures::minimum_valid_node_pool();
        np.properties.version.id = "4.15.1".to_string();
        assert!(create(&np).is_empty());
        np.properties.version.id = "4.x".to_string();
        assert_eq!(paths(&create(&np)), ["properties.version.id"]);
    }

    #[test]
    fn replica_limit_lifted_by_availability_zone() {
        let mut np = fixtures::minimum_valid_node_pool();
        np.properties.replicas = 201;
        assert_eq!(paths(&create(&np)), ["properties.replicas"]);
        np.properties.platform.availability_zone = "1".to_string();
        assert!(create(&np).is_empty());
    }

    #[test]
    fn autoscaling_forces_zero_replicas() {
        let mut np = fixtures::minimum_valid_node_pool();
        np.properties.replicas = 3;
        np.properties.auto_scaling = Some(NodePoolAutoScaling { min: 1, max: 3 });
        let errs = create(&np);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs.errors()[0].detail, "must be equal to 0");
    }

    #[test]
    fn autoscaling_order_checked_after_bounds() {
        let mut np = fixtures::minimum_valid_node_pool();
        np.properties.auto_scaling = Some(NodePoolAutoScaling { min: 5, max: 2 });
        let errs = create(&np);
        assert_eq!(paths(&errs), ["properties.autoScaling.max"]);
        assert_eq!(errs.errors()[0].detail, "must be greater than or equal to 5");

        np.properties.auto_scaling = Some(NodePoolAutoScaling { min: -1, max: -2 });
        let errs = create(&np);
        assert_eq!(paths(&errs), ["properties.autoScaling.min"]);
    }

    #[test]
    fn small_os_disk_rejected() {
        let mut np = fixtures::minimum_valid_node_pool();
        np.properties.platform.os_disk.size_gib = Some(32);
        assert_eq!(paths(&create(&np)), ["properties.platform.osDisk.sizeGiB"]);
        np.properties.platform.os_disk.size_gib = None;
        assert!(create(&np).is_empty());
    }

    #[test]
    fn label_keys_reported_at_map_and_values_at_entry() {
        let mut np = fixtures::minimum_valid_node_pool();
        np.properties.labels.insert("bad key".to_string(), "ok".to_string());
        np.properties.labels.insert("good".to_string(), "bad value!".to_string());
        let errs = create(&np);
        assert_eq!(paths(&errs), ["properties.labels", "properties.labels[good]"]);
    }

    #[test]
    fn existing_label_keys_are_not_revalidated() {
        let mut old = fixtures::minimum_valid_node_pool();
        old.properties.labels.insert("legacy key".to_string(), "v".to_string());
        let mut new = old.clone();
        new.properties.labels.insert("legacy key".to_string(), "v2".to_string());
        assert!(run(Operation::Update, &new, Some(&old)).is_empty());
    }

    #[test]
    fn taint_fields_checked_in_order() {
        let mut np = fixtures::minimum_valid_node_pool();
        np.properties.taints.push(Taint {
            effect: Effect::new("Sometimes"),
            key: String::new(),
            value: "ok".to_string(),
        });
        let errs = create(&np);
        let kinds: Vec<_> = errs.iter().map(|e| (e.path.to_string(), e.kind)).collect();
        assert_eq!(kinds[0], ("properties.taints[0].effect".to_string(), ErrorKind::NotSupported));
        assert_eq!(kinds[1], ("properties.taints[0].key".to_string(), ErrorKind::Required));
    }

    #[test]
    fn platform_change_is_immutable() {
        let old = fixtures::minimum_valid_node_pool();
        let mut new = old.clone();
        new.properties.platform.vm_size = "Standard_D4s_v3".to_string();
        let errs = run(Operation::Update, &new, Some(&old));
        assert_eq!(paths(&errs), ["properties.platform", "properties.platform.vmSize"]);
    }

    #[test]
    fn channel_group_must_match_cluster() {
        let cluster = fixtures::minimum_valid_cluster();
        let mut np = fixtures::minimum_valid_node_pool();
        np.properties.version.channel_group = "fast".to_string();
        let errs = validate_node_pool_against_cluster(&np, &cluster);
        assert_eq!(errs.len(), 1);
        assert_eq!(
            errs.errors()[0].detail,
            "Node pool channel group 'fast' must be the same as control plane channel group 'stable'"
        );
        assert_eq!(errs.errors()[0].path.to_string(), "properties.version.channelGroup");
    }

    #[test]
    fn subnet_must_share_cluster_vnet() {
        let cluster = fixtures::minimum_valid_cluster();
        let mut np = fixtures::minimum_valid_node_pool();
        np.properties.platform.subnet_id = fixtures::test_subnet_id().to_uppercase();
        assert!(validate_node_pool_against_cluster(&np, &cluster).is_empty());

        np.properties.platform.subnet_id =
            fixtures::test_subnet_id().replace(fixtures::TEST_VNET_NAME, "otherVnet");
        let errs = validate_node_pool_against_cluster(&np, &cluster);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs.errors()[0].path.to_string(), "properties.platform.subnetId");
        assert!(errs.errors()[0]
            .detail
            .ends_with(&format!("must belong to the same VNet as the parent cluster VNet '{}'", fixtures::test_vnet_id())));
    }

    #[test]
    fn unparseable_subnets_are_skipped() {
        let cluster = fixtures::minimum_valid_cluster();
        let mut np = fixtures::minimum_valid_node_pool();
        np.properties.platform.subnet_id = "not-an-id".to_string();
        assert!(validate_node_pool_against_cluster(&np, &cluster).is_empty());
    }
}
