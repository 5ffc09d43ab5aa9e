//! ARM resource type names referenced by validation rules.
//!
//! Compared case-insensitively against [`hcp_core::ResourceType`].

pub const CLUSTER: &str = "Microsoft.RedHatOpenShift/hcpOpenShiftClusters";
pub const NODE_POOL: &str = "Microsoft.RedHatOpenShift/hcpOpenShiftClusters/nodePools";
pub const EXTERNAL_AUTH: &str = "Microsoft.RedHatOpenShift/hcpOpenShiftClusters/externalAuths";

pub const SUBSCRIPTION: &str = "Microsoft.Resources/subscriptions";

pub const SUBNET: &str = "Microsoft.Network/virtualNetworks/subnets";
pub const NETWORK_SECURITY_GROUP: &str = "Microsoft.Network/networkSecurityGroups";
pub const USER_ASSIGNED_IDENTITY: &str = "Microsoft.ManagedIdentity/userAssignedIdentities";
pub const DISK_ENCRYPTION_SET: &str = "Microsoft.Compute/diskEncryptionSets";
