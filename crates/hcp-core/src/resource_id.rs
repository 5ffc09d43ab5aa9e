//! # Azure Resource Identifiers
//!
//! Parses hierarchical ARM identifiers of the forms
//!
//! ```text
//! /subscriptions/<id>
//! /subscriptions/<id>/resourceGroups/<rg>
//! /subscriptions/<id>[/resourceGroups/<rg>]/providers/<ns>/<type>/<name>[/<subtype>/<subname>]...
//! ```
//!
//! The keywords `subscriptions`, `resourceGroups` and `providers` match
//! case-insensitively. Segment text is kept exactly as written: identifiers
//! in this domain are case-insensitive but not case-normalized, so
//! comparisons go through [`ResourceId::eq_ignore_case`] and friends.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::ResourceIdError;

macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

const SUBSCRIPTIONS: &str = "subscriptions";
const RESOURCE_GROUPS: &str = "resourceGroups";
const PROVIDERS: &str = "providers";
const RESOURCES_NAMESPACE: &str = "Microsoft.Resources";

// ---------------------------------------------------------------------------
// ResourceType
// ---------------------------------------------------------------------------

/// Provider namespace plus one or more nested type names,
/// e.g. `Microsoft.Network/virtualNetworks/subnets`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResourceType {
    namespace: String,
    types: Vec<String>,
}

impl ResourceType {
    pub fn new(namespace: impl Into<String>, types: Vec<String>) -> Self {
        Self {
            namespace: namespace.into(),
            types,
        }
    }

    /// `Microsoft.Resources/subscriptions`.
    pub fn subscriptions() -> Self {
        Self::new(RESOURCES_NAMESPACE, vec![SUBSCRIPTIONS.to_string()])
    }

    /// `Microsoft.Resources/resourceGroups`.
    pub fn resource_groups() -> Self {
        Self::new(RESOURCES_NAMESPACE, vec![RESOURCE_GROUPS.to_string()])
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    /// Case-insensitive comparison against a `Namespace/type[/subtype]` string.
    pub fn matches(&self, expected: &str) -> bool {
        self.to_string().eq_ignore_ascii_case(expected)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.namespace)?;
        for t in &self.types {
            write!(f, "/{t}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ResourceId
// ---------------------------------------------------------------------------

/// A parsed ARM resource identifier.
///
/// `Default` yields an identifier with every component empty. It never
/// comes out of the parser but lets callers model "present but blank".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResourceId {
    raw: String,
    subscription_id: String,
    resource_group_name: String,
    provider_namespace: String,
    resource_type: ResourceType,
    name: String,
    parent: Option<Box<ResourceId>>,
}

impl ResourceId {
    /// Parse an identifier string.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ResourceIdError> {
        let raw = raw.as_ref();
        if raw.is_empty() {
            return Err(ResourceIdError::Empty);
        }
        let Some(body) = raw.strip_prefix('/') else {
            return Err(ResourceIdError::MissingLeadingSlash(raw.to_string()));
        };
        let malformed = |reason| ResourceIdError::Malformed {
            id: raw.to_string(),
            reason,
        };

        let parts: Vec<&str> = body.trim_end_matches('/').split('/').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(malformed("empty path segment"));
        }
        if parts.len() < 2 || !parts[0].eq_ignore_ascii_case(SUBSCRIPTIONS) {
            return Err(malformed("expected /subscriptions/<id>"));
        }

        let subscription_id = parts[1];
        let mut current = ResourceId {
            raw: format!("/{}/{}", parts[0], subscription_id),
            subscription_id: subscription_id.to_string(),
            resource_type: ResourceType::subscriptions(),
            name: subscription_id.to_string(),
            ..Default::default()
        };
        let mut rest = &parts[2..];

        if let Some(keyword) = rest.first().filter(|k| k.eq_ignore_ascii_case(RESOURCE_GROUPS)) {
            let Some(group) = rest.get(1) else {
                return Err(malformed("missing resource group name"));
            };
            current = ResourceId {
                raw: format!("{}/{}/{}", current.raw, keyword, group),
                subscription_id: current.subscription_id.clone(),
                resource_group_name: group.to_string(),
                resource_type: ResourceType::resource_groups(),
                name: group.to_string(),
                parent: Some(Box::new(current)),
                ..Default::default()
            };
            rest = &rest[2..];
        }

        if rest.is_empty() {
            return Ok(current);
        }
        if !rest[0].eq_ignore_ascii_case(PROVIDERS) || rest.len() < 2 {
            return Err(malformed("expected providers/<namespace>"));
        }
        let namespace = rest[1];
        let pairs = &rest[2..];
        if pairs.is_empty() || pairs.len() % 2 != 0 {
            return Err(malformed("expected <type>/<name> pairs after the provider namespace"));
        }

        let mut raw_prefix = format!("{}/{}/{}", current.raw, rest[0], namespace);
        let mut types = Vec::with_capacity(pairs.len() / 2);
        for pair in pairs.chunks(2) {
            if pair[0].eq_ignore_ascii_case(PROVIDERS) {
                return Err(malformed("nested provider segments are not supported"));
            }
            types.push(pair[0].to_string());
            raw_prefix = format!("{}/{}/{}", raw_prefix, pair[0], pair[1]);
            current = ResourceId {
                raw: raw_prefix.clone(),
                subscription_id: current.subscription_id.clone(),
                resource_group_name: current.resource_group_name.clone(),
                provider_namespace: namespace.to_string(),
                resource_type: ResourceType::new(namespace, types.clone()),
                name: pair[1].to_string(),
                parent: Some(Box::new(current)),
            };
        }
        Ok(current)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// Empty for subscription-scoped identifiers.
    pub fn resource_group_name(&self) -> &str {
        &self.resource_group_name
    }

    /// Empty for subscription and resource group identifiers.
    pub fn provider_namespace(&self) -> &str {
        &self.provider_namespace
    }

    pub fn resource_type(&self) -> &ResourceType {
        &self.resource_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The enclosing resource: a subnet's virtual network, a node pool's
    /// cluster, a resource group's subscription.
    pub fn parent(&self) -> Option<&ResourceId> {
        self.parent.as_deref()
    }

    /// Case-insensitive identity comparison.
    pub fn eq_ignore_case(&self, other: &ResourceId) -> bool {
        self.raw.eq_ignore_ascii_case(&other.raw)
    }

    /// Lowercased form used as a lookup key.
    pub fn folded(&self) -> String {
        self.raw.to_lowercase()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for ResourceId {
    type Err = ResourceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ResourceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl_validating_deserialize!(ResourceId);
