//! # ARM Envelope Types
//!
//! The resource envelope shared by every entity (identifier, system data,
//! location) plus managed identities and the subscription record.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use hcp_core::{impl_structural_eq, ResourceId};
use serde::{Deserialize, Serialize};

use crate::enums::{ManagedServiceIdentityType, SubscriptionState};

/// Creation and modification metadata stamped by ARM.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SystemData {
    pub created_by: String,
    pub created_by_type: String,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub last_modified_by: String,
    pub last_modified_by_type: String,
    pub last_modified_at: Option<DateTime<FixedOffset>>,
}

impl_structural_eq!(SystemData {
    created_by,
    created_by_type,
    created_at,
    last_modified_by,
    last_modified_by_type,
    last_modified_at,
});

/// Fields common to every ARM resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Resource {
    pub id: Option<ResourceId>,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub system_data: Option<SystemData>,
}

impl Resource {
    /// A resource envelope whose name and type are taken from `id`.
    pub fn new(id: ResourceId) -> Self {
        Self {
            name: id.name().to_string(),
            resource_type: id.resource_type().to_string(),
            id: Some(id),
            system_data: None,
        }
    }
}

/// A top-level resource with a location and tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackedResource {
    #[serde(flatten)]
    pub resource: Resource,
    pub location: String,
    pub tags: BTreeMap<String, String>,
}

impl TrackedResource {
    pub fn new(id: ResourceId, location: impl Into<String>) -> Self {
        Self {
            resource: Resource::new(id),
            location: location.into(),
            tags: BTreeMap::new(),
        }
    }
}

/// A child resource without its own location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyResource {
    #[serde(flatten)]
    pub resource: Resource,
}

impl ProxyResource {
    pub fn new(id: ResourceId) -> Self {
        Self {
            resource: Resource::new(id),
        }
    }
}

/// Managed identities attached to a resource.
///
/// `user_assigned_identities` is keyed by the identity's resource ID string.
/// Keys are compared case-insensitively but stored as written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManagedServiceIdentity {
    pub principal_id: String,
    pub tenant_id: String,
    #[serde(rename = "type")]
    pub identity_type: ManagedServiceIdentityType,
    pub user_assigned_identities: BTreeMap<String, Option<UserAssignedIdentity>>,
}

impl_structural_eq!(ManagedServiceIdentity {
    principal_id,
    tenant_id,
    identity_type,
    user_assigned_identities,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserAssignedIdentity {
    pub client_id: Option<String>,
    pub principal_id: Option<String>,
}

impl_structural_eq!(UserAssignedIdentity { client_id, principal_id });

/// A subscription's registration with the resource provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Subscription {
    pub id: Option<ResourceId>,
    pub state: SubscriptionState,
    pub registration_date: Option<String>,
    pub properties: Option<SubscriptionProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubscriptionProperties {
    pub tenant_id: Option<String>,
    pub location_placement_id: Option<String>,
    pub quota_id: Option<String>,
    pub registered_features: Vec<Feature>,
}

/// A preview feature flag registered on a subscription.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Feature {
    pub name: Option<String>,
    pub state: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracked_resource_flattens_envelope() {
        let id = ResourceId::new(
            "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.RedHatOpenShift/hcpOpenShiftClusters/c1",
        )
        .unwrap();
        let tracked = TrackedResource::new(id, "westus3");
        let json = serde_json::to_value(&tracked).unwrap();
        assert_eq!(json["name"], "c1");
        assert_eq!(json["type"], "Microsoft.RedHatOpenShift/hcpOpenShiftClusters");
        assert_eq!(json["location"], "westus3");

        let back: TrackedResource = serde_json::from_value(json).unwrap();
        assert_eq!(back, tracked);
    }

    #[test]
    fn identity_map_accepts_null_values() {
        let msi: ManagedServiceIdentity = serde_json::from_str(
            r#"{"type":"UserAssigned","userAssignedIdentities":{"/a":null,"/b":{"clientId":"c"}}}"#,
        )
        .unwrap();
        assert_eq!(msi.user_assigned_identities.len(), 2);
        assert!(msi.user_assigned_identities["/a"].is_none());
        assert_eq!(
            msi.user_assigned_identities["/b"].as_ref().unwrap().client_id.as_deref(),
            Some("c")
        );
    }

    #[test]
    fn subscription_defaults_when_fields_missing() {
        let sub: Subscription = serde_json::from_str(r#"{"state":"Registered"}"#).unwrap();
        assert!(sub.id.is_none());
        assert_eq!(sub.state, SubscriptionState::REGISTERED);
        assert!(sub.registration_date.is_none());
    }
}
