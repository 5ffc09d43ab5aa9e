//! # HCP OpenShift Cluster
//!
//! The internal representation of a hosted control plane cluster. Fields the
//! customer supplies live under [`ClusterCustomerProperties`]; fields the
//! service fills in live under [`ClusterServiceProviderProperties`].

use std::collections::BTreeMap;

use hcp_core::{impl_structural_eq, ResourceId};
use serde::{Deserialize, Serialize};

use crate::arm::{ManagedServiceIdentity, TrackedResource};
use crate::enums::{
    ClusterImageRegistryState, CustomerManagedEncryptionType, EtcdDataEncryptionKeyManagementMode,
    NetworkType, OutboundType, ProvisioningState, Visibility,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Cluster {
    #[serde(flatten)]
    pub tracked_resource: TrackedResource,
    pub customer_properties: ClusterCustomerProperties,
    pub service_provider_properties: ClusterServiceProviderProperties,
    pub identity: Option<ManagedServiceIdentity>,
}

impl Cluster {
    /// A cluster carrying every server-side default, addressed by `id`.
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
            customer_properties: ClusterCustomerProperties {
                version: VersionProfile {
                    id: String::new(),
                    channel_group: "stable".to_string(),
                },
                network: NetworkProfile {
                    network_type: NetworkType::OVN_KUBERNETES,
                    pod_cidr: "10.128.0.0/14".to_string(),
                    service_cidr: "172.30.0.0/16".to_string(),
                    machine_cidr: "10.0.0.0/16".to_string(),
                    host_prefix: 23,
                },
                api: CustomerApiProfile {
                    visibility: Visibility::PUBLIC,
                    authorized_cidrs: None,
                },
                platform: CustomerPlatformProfile {
                    outbound_type: OutboundType::LOAD_BALANCER,
                    ..Default::default()
                },
                autoscaling: ClusterAutoscalingProfile {
                    max_nodes_total: 0,
                    max_pod_grace_period_seconds: 600,
                    max_node_provision_time_seconds: 900,
                    pod_priority_threshold: -10,
                },
                etcd: EtcdProfile {
                    data_encryption: EtcdDataEncryptionProfile {
                        key_management_mode: EtcdDataEncryptionKeyManagementMode::PLATFORM_MANAGED,
                        customer_managed: None,
                    },
                },
                cluster_image_registry: ClusterImageRegistryProfile {
                    state: ClusterImageRegistryState::ENABLED,
                },
                ..Default::default()
            },
            service_provider_properties: ClusterServiceProviderProperties::default(),
            identity: None,
        }
    }

    pub fn id(&self) -> Option<&ResourceId> {
        self.tracked_resource.resource.id.as_ref()
    }
}

// ─── Customer properties ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterCustomerProperties {
    pub version: VersionProfile,
    pub dns: CustomerDnsProfile,
    pub network: NetworkProfile,
    pub api: CustomerApiProfile,
    pub platform: CustomerPlatformProfile,
    pub autoscaling: ClusterAutoscalingProfile,
    pub node_drain_timeout_minutes: i32,
    pub etcd: EtcdProfile,
    pub cluster_image_registry: ClusterImageRegistryProfile,
}

/// OpenShift release selection. `id` is `MAJOR.MINOR`; the patch level is
/// chosen by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VersionProfile {
    pub id: String,
    pub channel_group: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomerDnsProfile {
    pub base_domain_prefix: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkProfile {
    pub network_type: NetworkType,
    pub pod_cidr: String,
    pub service_cidr: String,
    pub machine_cidr: String,
    pub host_prefix: i32,
}

impl_structural_eq!(NetworkProfile {
    network_type,
    pod_cidr,
    service_cidr,
    machine_cidr,
    host_prefix,
});

/// `authorized_cidrs` distinguishes "not given" from "given and empty".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomerApiProfile {
    pub visibility: Visibility,
    pub authorized_cidrs: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomerPlatformProfile {
    pub managed_resource_group: String,
    pub subnet_id: String,
    pub outbound_type: OutboundType,
    pub network_security_group_id: String,
    pub operators_authentication: OperatorsAuthenticationProfile,
}

impl_structural_eq!(CustomerPlatformProfile {
    managed_resource_group,
    subnet_id,
    outbound_type,
    network_security_group_id,
    operators_authentication,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OperatorsAuthenticationProfile {
    pub user_assigned_identities: UserAssignedIdentitiesProfile,
}

impl_structural_eq!(OperatorsAuthenticationProfile { user_assigned_identities });

/// Operator identity slots. Map values and `service_managed_identity` are
/// user-assigned identity resource IDs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserAssignedIdentitiesProfile {
    pub control_plane_operators: BTreeMap<String, String>,
    pub data_plane_operators: BTreeMap<String, String>,
    pub service_managed_identity: String,
}

impl_structural_eq!(UserAssignedIdentitiesProfile {
    control_plane_operators,
    data_plane_operators,
    service_managed_identity,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterAutoscalingProfile {
    pub max_nodes_total: i32,
    pub max_pod_grace_period_seconds: i32,
    pub max_node_provision_time_seconds: i32,
    pub pod_priority_threshold: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EtcdProfile {
    pub data_encryption: EtcdDataEncryptionProfile,
}

impl_structural_eq!(EtcdProfile { data_encryption });

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EtcdDataEncryptionProfile {
    pub key_management_mode: EtcdDataEncryptionKeyManagementMode,
    pub customer_managed: Option<CustomerManagedEncryptionProfile>,
}

impl_structural_eq!(EtcdDataEncryptionProfile {
    key_management_mode,
    customer_managed,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomerManagedEncryptionProfile {
    pub encryption_type: CustomerManagedEncryptionType,
    pub kms: Option<KmsEncryptionProfile>,
}

impl_structural_eq!(CustomerManagedEncryptionProfile { encryption_type, kms });

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KmsEncryptionProfile {
    pub active_key: KmsKey,
}

impl_structural_eq!(KmsEncryptionProfile { active_key });

/// A key in an Azure Key Vault.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KmsKey {
    pub name: String,
    pub vault_name: String,
    pub version: String,
}

impl_structural_eq!(KmsKey { name, vault_name, version });

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterImageRegistryProfile {
    pub state: ClusterImageRegistryState,
}

impl_structural_eq!(ClusterImageRegistryProfile { state });

// ─── Service provider properties ─────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterServiceProviderProperties {
    pub provisioning_state: ProvisioningState,
    #[serde(rename = "cosmosUID")]
    pub cosmos_uid: String,
    #[serde(rename = "clusterServiceID")]
    pub cluster_service_id: String,
    pub dns: ServiceProviderDnsProfile,
    pub console: ServiceProviderConsoleProfile,
    pub api: ServiceProviderApiProfile,
    pub platform: ServiceProviderPlatformProfile,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceProviderDnsProfile {
    pub base_domain: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceProviderConsoleProfile {
    pub url: String,
}

impl_structural_eq!(ServiceProviderConsoleProfile { url });

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceProviderApiProfile {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceProviderPlatformProfile {
    pub issuer_url: String,
}

impl_structural_eq!(ServiceProviderPlatformProfile { issuer_url });
