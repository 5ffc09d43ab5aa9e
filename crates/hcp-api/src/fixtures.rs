//! # Test Fixtures
//!
//! Canonical identifiers and minimum-valid resources shared by the unit
//! tests in this crate and the integration tests of dependent crates
//! (enable the `fixtures` feature).
//!
//! Every builder returns a resource that passes create validation as is;
//! tests mutate one field and assert on the resulting errors.

use std::collections::BTreeMap;

use hcp_core::ResourceId;

use crate::arm::{ManagedServiceIdentity, Subscription, UserAssignedIdentity};
use crate::cluster::Cluster;
use crate::enums::{ManagedServiceIdentityType, SubscriptionState};
use crate::external_auth::ExternalAuth;
use crate::node_pool::NodePool;

pub const TEST_LOCATION: &str = "westus3";
pub const TEST_TENANT_ID: &str = "00000000-0000-0000-0000-000000000000";
pub const TEST_SUBSCRIPTION_ID: &str = "11111111-1111-1111-1111-111111111111";
pub const TEST_ALT_SUBSCRIPTION_ID: &str = "22222222-2222-2222-2222-222222222222";
pub const TEST_RESOURCE_GROUP_NAME: &str = "testResourceGroup";
pub const TEST_CLUSTER_NAME: &str = "testCluster";
pub const TEST_NODE_POOL_NAME: &str = "testNodePool";
pub const TEST_EXTERNAL_AUTH_NAME: &str = "testExternalAuth";
pub const TEST_MANAGED_RESOURCE_GROUP_NAME: &str = "testManagedResourceGroup";
pub const TEST_NETWORK_SECURITY_GROUP_NAME: &str = "testNetworkSecurityGroup";
pub const TEST_VNET_NAME: &str = "testVirtualNetwork";
pub const TEST_SUBNET_NAME: &str = "testSubnet";

/// A PEM-encoded self-signed certificate.
pub const TEST_CA_PEM: &str = "-----BEGIN CERTIFICATE-----
MIICMzCCAZygAwIBAgIJALiPnVsvq8dsMA0GCSqGSIb3DQEBBQUAMFMxCzAJBgNV
BAYTAlVTMQwwCgYDVQQIEwNmb28xDDAKBgNVBAcTA2ZvbzEMMAoGA1UEChMDZm9v
MQwwCgYDVQQLEwNmb28xDDAKBgNVBAMTA2ZvbzAeFw0xMzAzMTkxNTQwMTlaFw0x
ODAzMTgxNTQwMTlaMFMxCzAJBgNVBAYTAlVTMQwwCgYDVQQIEwNmb28xDDAKBgNV
BAcTA2ZvbzEMMAoGA1UEChMDZm9vMQwwCgYDVQQLEwNmb28xDDAKBgNVBAMTA2Zv
bzCBnzANBgkqhkiG9w0BAQEFAAOBjQAwgYkCgYEAzdGfxi9CNbMf1UUcvDQh7MYB
OveIHyc0E0KIbhjK5FkCBU4CiZrbfHagaW7ZEcN0tt3EvpbOMxxc/ZQU2WN/s/wP
xph0pSfsfFsTKM4RhTWD2v4fgk+xZiKd1p0+L4hTtpwnEw0uXRVd0ki6muwV5y/P
+5FHUeldq+pgTcgzuK8CAwEAAaMPMA0wCwYDVR0PBAQDAgLkMA0GCSqGSIb3DQEB
BQUAA4GBAJiDAAtY0mQQeuxWdzLRzXmjvdSuL9GoyT3BF/jSnpxz5/58dba8pWen
v3pj4P3w5DoOso0rzkZy2jEsEitlVM2mLSbQpMM+MUVQCQoiG6W9xuCFuxSrwPIS
pAqEAuV4DNoxQKKWmhVv+J0ptMWD25Pnpxeq5sXzghfJnslJlQND
-----END CERTIFICATE-----
";

fn parse(raw: String) -> ResourceId {
    ResourceId::new(&raw).unwrap_or_else(|e| panic!("fixture ID {raw} does not parse: {e}"))
}

fn resource_group_path(subscription_id: &str, resource_group: &str) -> String {
    format!("/subscriptions/{subscription_id}/resourceGroups/{resource_group}")
}

pub fn test_cluster_id() -> ResourceId {
    parse(format!(
        "{}/providers/Microsoft.RedHatOpenShift/hcpOpenShiftClusters/{TEST_CLUSTER_NAME}",
        resource_group_path(TEST_SUBSCRIPTION_ID, TEST_RESOURCE_GROUP_NAME)
    ))
}

pub fn test_node_pool_id() -> ResourceId {
    parse(format!("{}/nodePools/{TEST_NODE_POOL_NAME}", test_cluster_id()))
}

pub fn test_external_auth_id() -> ResourceId {
    parse(format!("{}/externalAuths/{TEST_EXTERNAL_AUTH_NAME}", test_cluster_id()))
}

pub fn test_network_security_group_id() -> String {
    format!(
        "{}/providers/Microsoft.Network/networkSecurityGroups/{TEST_NETWORK_SECURITY_GROUP_NAME}",
        resource_group_path(TEST_SUBSCRIPTION_ID, TEST_RESOURCE_GROUP_NAME)
    )
}

pub fn test_vnet_id() -> String {
    format!(
        "{}/providers/Microsoft.Network/virtualNetworks/{TEST_VNET_NAME}",
        resource_group_path(TEST_SUBSCRIPTION_ID, TEST_RESOURCE_GROUP_NAME)
    )
}

pub fn test_subnet_id() -> String {
    format!("{}/subnets/{TEST_SUBNET_NAME}", test_vnet_id())
}

/// A user-assigned identity in the test resource group. The resource
/// group keyword is lowercase, as ARM often returns it.
pub fn test_user_assigned_identity(name: &str) -> String {
    format!(
        "/subscriptions/{TEST_SUBSCRIPTION_ID}/resourcegroups/{TEST_RESOURCE_GROUP_NAME}/providers/Microsoft.ManagedIdentity/userAssignedIdentities/{name}"
    )
}

/// Default cluster plus the fields create validation requires.
pub fn minimum_valid_cluster() -> Cluster {
    let mut cluster = Cluster::new_default(Some(test_cluster_id()), TEST_LOCATION);
    let platform = &mut cluster.customer_properties.platform;
    platform.managed_resource_group = TEST_MANAGED_RESOURCE_GROUP_NAME.to_string();
    platform.subnet_id = test_subnet_id();
    platform.network_security_group_id = test_network_security_group_id();
    cluster
}

/// A valid cluster whose assigned identities are each used exactly once by
/// a control plane operator or the service managed identity slot, and whose
/// data plane operator uses an identity that is not assigned.
pub fn valid_cluster_with_identities() -> Cluster {
    let mut cluster = minimum_valid_cluster();
    let identities = &mut cluster
        .customer_properties
        .platform
        .operators_authentication
        .user_assigned_identities;
    identities.control_plane_operators = BTreeMap::from([
        ("cluster-api-azure".to_string(), test_user_assigned_identity("cp-capz")),
        ("ingress".to_string(), test_user_assigned_identity("cp-ingress")),
    ]);
    identities.data_plane_operators = BTreeMap::from([(
        "disk-csi-driver".to_string(),
        test_user_assigned_identity("dp-disk"),
    )]);
    identities.service_managed_identity = test_user_assigned_identity("service");

    cluster.identity = Some(ManagedServiceIdentity {
        identity_type: ManagedServiceIdentityType::USER_ASSIGNED,
        user_assigned_identities: ["cp-capz", "cp-ingress", "service"]
            .into_iter()
            .map(|n| (test_user_assigned_identity(n), Some(UserAssignedIdentity::default())))
            .collect(),
        ..Default::default()
    });
    cluster
}

pub fn minimum_valid_node_pool() -> NodePool {
    let mut node_pool = NodePool::new_default(Some(test_node_pool_id()), TEST_LOCATION);
    node_pool.properties.platform.vm_size = "Standard_D8s_v3".to_string();
    node_pool
}

pub fn minimum_valid_external_auth() -> ExternalAuth {
    let mut auth = ExternalAuth::new_default(Some(test_external_auth_id()));
    auth.properties.issuer.url = "https://www.redhat.com".to_string();
    auth.properties.issuer.audiences = Some(vec!["audience1".to_string()]);
    auth.properties.claim.mappings.username.claim = "my-cool-claim".to_string();
    auth
}

pub fn valid_subscription() -> Subscription {
    Subscription {
        id: Some(parse("/subscriptions/12345678-1234-1234-1234-123456789012".to_string())),
        state: SubscriptionState::REGISTERED,
        registration_date: Some("2023-01-01T00:00:00Z".to_string()),
        properties: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_nest_under_the_cluster() {
        let np = test_node_pool_id();
        assert!(np.parent().unwrap().eq_ignore_case(&test_cluster_id()));
        assert_eq!(test_external_auth_id().name(), TEST_EXTERNAL_AUTH_NAME);
    }

    #[test]
    fn subnet_parent_is_the_vnet() {
        let subnet = ResourceId::new(test_subnet_id()).unwrap();
        assert_eq!(subnet.parent().unwrap().as_str(), test_vnet_id());
    }

    #[test]
    fn identity_fixture_assigns_three_identities() {
        let cluster = valid_cluster_with_identities();
        assert_eq!(cluster.identity.unwrap().user_assigned_identities.len(), 3);
    }
}
