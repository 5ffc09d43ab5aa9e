//! # HCP OpenShift External Auth
//!
//! An external OIDC token issuer trusted by a cluster, with the OAuth clients
//! that use it and the claim mappings applied to its tokens.

use chrono::{DateTime, FixedOffset};
use hcp_core::ResourceId;
use serde::{Deserialize, Serialize};

use crate::arm::ProxyResource;
use crate::enums::{
    ConditionStatus, ExternalAuthClientType, ExternalAuthConditionType, ProvisioningState,
    TokenValidationRuleType, UsernameClaimPrefixPolicy,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExternalAuth {
    #[serde(flatten)]
    pub proxy_resource: ProxyResource,
    pub properties: ExternalAuthProperties,
    pub service_provider_properties: ExternalAuthServiceProviderProperties,
}

impl ExternalAuth {
    pub fn new_default(id: Option<ResourceId>) -> Self {
        let proxy_resource = match id {
            Some(id) => ProxyResource::new(id),
            None => ProxyResource::default(),
        };
        let mut auth = Self {
            proxy_resource,
            ..Default::default()
        };
        auth.properties.claim.mappings.username.prefix_policy = UsernameClaimPrefixPolicy::NONE;
        auth
    }

    pub fn id(&self) -> Option<&ResourceId> {
        self.proxy_resource.resource.id.as_ref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExternalAuthProperties {
    pub provisioning_state: ProvisioningState,
    pub condition: ExternalAuthCondition,
    pub issuer: TokenIssuerProfile,
    pub clients: Vec<ExternalAuthClientProfile>,
    pub claim: ExternalAuthClaimProfile,
}

/// Status reported by the service. An all-default condition means "none".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExternalAuthCondition {
    #[serde(rename = "type")]
    pub condition_type: ExternalAuthConditionType,
    pub status: ConditionStatus,
    pub last_transition_time: Option<DateTime<FixedOffset>>,
    pub reason: String,
    pub message: String,
}

/// `audiences` distinguishes "not given" from "given and empty".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenIssuerProfile {
    pub url: String,
    pub audiences: Option<Vec<String>>,
    pub ca: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExternalAuthClientProfile {
    pub component: ExternalAuthClientComponentProfile,
    pub client_id: String,
    pub extra_scopes: Vec<String>,
    #[serde(rename = "type")]
    pub client_type: ExternalAuthClientType,
}

/// The console or CLI component a client belongs to. The pair of name and
/// namespace identifies a client within one external auth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExternalAuthClientComponentProfile {
    pub name: String,
    pub auth_client_namespace: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExternalAuthClaimProfile {
    pub mappings: TokenClaimMappingsProfile,
    pub validation_rules: Vec<TokenClaimValidationRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenClaimMappingsProfile {
    pub username: UsernameClaimProfile,
    pub groups: Option<GroupClaimProfile>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UsernameClaimProfile {
    pub claim: String,
    pub prefix: String,
    pub prefix_policy: UsernameClaimPrefixPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupClaimProfile {
    pub claim: String,
    pub prefix: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TokenClaimValidationRule {
    #[serde(rename = "type")]
    pub rule_type: TokenValidationRuleType,
    pub required_claim: TokenRequiredClaim,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TokenRequiredClaim {
    pub claim: String,
    pub required_value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalAuthServiceProviderProperties {
    #[serde(rename = "cosmosUID")]
    pub cosmos_uid: String,
    #[serde(rename = "clusterServiceID")]
    pub cluster_service_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sets_prefix_policy_none() {
        let auth = ExternalAuth::new_default(None);
        assert_eq!(
            auth.properties.claim.mappings.username.prefix_policy,
            UsernameClaimPrefixPolicy::NONE
        );
        assert!(auth.properties.issuer.audiences.is_none());
        assert_eq!(auth.properties.condition, ExternalAuthCondition::default());
    }

    #[test]
    fn proxy_resource_has_no_location() {
        let json = serde_json::to_value(ExternalAuth::new_default(None)).unwrap();
        assert!(json.get("location").is_none());
        assert!(json["properties"]["claim"]["mappings"].get("username").is_some());
    }

    #[test]
    fn client_fields_deserialize() {
        let auth: ExternalAuth = serde_json::from_str(
            r#"{"properties":{"issuer":{"url":"https://example.com","audiences":["a"]},
                "clients":[{"component":{"name":"console","authClientNamespace":"openshift-console"},
                "clientId":"a","type":"Confidential"}]}}"#,
        )
        .unwrap();
        let client = &auth.properties.clients[0];
        assert_eq!(client.component.auth_client_namespace, "openshift-console");
        assert_eq!(client.client_type, ExternalAuthClientType::CONFIDENTIAL);
        assert_eq!(auth.properties.issuer.audiences.as_deref(), Some(&["a".to_string()][..]));
    }
}
