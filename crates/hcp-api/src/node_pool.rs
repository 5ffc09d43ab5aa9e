//! # HCP OpenShift Node Pool
//!
//! A group of worker machines attached to a cluster.

use std::collections::BTreeMap;

use hcp_core::{impl_structural_eq, ResourceId};
use serde::{Deserialize, Serialize};

use crate::arm::{ManagedServiceIdentity, TrackedResource};
use crate::enums::{DiskStorageAccountType, Effect, ProvisioningState};

/// Upper bound on replicas and autoscaling limits when the pool is not
/// pinned to an availability zone.
pub const MAX_NODE_POOL_NODES: i32 = 200;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodePool {
    #[serde(flatten)]
    pub tracked_resource: TrackedResource,
    pub properties: NodePoolProperties,
    pub service_provider_properties: NodePoolServiceProviderProperties,
    pub identity: Option<ManagedServiceIdentity>,
}

impl NodePool {
    pub fn new_default(id: Option<ResourceId>, location: impl Into<String>) -> Self {
        let tracked_resource = match id {
            Some(id) => TrackedResource::new(id, location),
            None => TrackedResource {
                location: location.into(),
                ..Default::default()
            },
        };
        Self {
            tracked_resource,
            properties: NodePoolProperties {
                version: NodePoolVersionProfile {
                    id: String::new(),
                    channel_group: "stable".to_string(),
                },
                platform: NodePoolPlatformProfile {
                    os_disk: OsDiskProfile {
                        size_gib: Some(64),
                        disk_storage_account_type: DiskStorageAccountType::PREMIUM_LRS,
                        encryption_set_id: String::new(),
                    },
                    ..Default::default()
                },
                auto_repair: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn id(&self) -> Option<&ResourceId> {
        self.tracked_resource.resource.id.as_ref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodePoolProperties {
    pub provisioning_state: ProvisioningState,
    pub version: NodePoolVersionProfile,
    pub platform: NodePoolPlatformProfile,
    pub replicas: i32,
    pub auto_repair: bool,
    pub auto_scaling: Option<NodePoolAutoScaling>,
    pub labels: BTreeMap<String, String>,
    pub taints: Vec<Taint>,
    pub node_drain_timeout_minutes: Option<i32>,
}

/// Node pools may pin a patch release, unlike clusters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodePoolVersionProfile {
    pub id: String,
    pub channel_group: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodePoolPlatformProfile {
    pub subnet_id: String,
    pub vm_size: String,
    pub enable_encryption_at_host: bool,
    pub os_disk: OsDiskProfile,
    pub availability_zone: String,
}

impl_structural_eq!(NodePoolPlatformProfile {
    subnet_id,
    vm_size,
    enable_encryption_at_host,
    os_disk,
    availability_zone,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OsDiskProfile {
    #[serde(rename = "sizeGiB")]
    pub size_gib: Option<i32>,
    pub disk_storage_account_type: DiskStorageAccountType,
    pub encryption_set_id: String,
}

impl_structural_eq!(OsDiskProfile {
    size_gib,
    disk_storage_account_type,
    encryption_set_id,
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodePoolAutoScaling {
    pub min: i32,
    pub max: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Taint {
    pub effect: Effect,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodePoolServiceProviderProperties {
    #[serde(rename = "cosmosUID")]
    pub cosmos_uid: String,
    #[serde(rename = "clusterServiceID")]
    pub cluster_service_id: String,
}
