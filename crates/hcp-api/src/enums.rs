//! # String-Backed Enumerations
//!
//! API enumerations are open strings on the wire: a request carrying an
//! unknown value must still deserialize so validation can report it with the
//! list of supported values. Each type here is a newtype over a string with
//! associated constants for the known values and a `VALUES` allow-set.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An open string enumeration with a fixed allow-set.
pub trait StringEnum {
    /// Every value the API accepts.
    const VALUES: &'static [&'static str];

    fn as_str(&self) -> &str;
}

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Cow<'static, str>);

        impl $name {
            $( $(#[$vmeta])* pub const $variant: Self = Self(Cow::Borrowed($value)); )+

            /// Every value the API accepts.
            pub const VALUES: &'static [&'static str] = &[$($value),+];

            pub fn new(value: impl Into<String>) -> Self {
                Self(Cow::Owned(value.into()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Whether the value is one of [`Self::VALUES`].
            pub fn is_known(&self) -> bool {
                Self::VALUES.contains(&self.as_str())
            }
        }

        impl StringEnum for $name {
            const VALUES: &'static [&'static str] = $name::VALUES;

            fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                String::deserialize(deserializer).map(Self::new)
            }
        }

        hcp_core::impl_structural_leaf!($name);
    };
}

// ─── ARM ─────────────────────────────────────────────────────────────

string_enum! {
    /// Lifecycle state of an asynchronous ARM operation on a resource.
    ProvisioningState {
        ACCEPTED => "Accepted",
        AWAITING_SECRET => "AwaitingSecret",
        CANCELED => "Canceled",
        DELETING => "Deleting",
        FAILED => "Failed",
        PROVISIONING => "Provisioning",
        SUCCEEDED => "Succeeded",
        UPDATING => "Updating",
    }
}

string_enum! {
    /// Kind of managed identity attached to a resource.
    ManagedServiceIdentityType {
        NONE => "None",
        SYSTEM_ASSIGNED => "SystemAssigned",
        SYSTEM_ASSIGNED_USER_ASSIGNED => "SystemAssigned,UserAssigned",
        USER_ASSIGNED => "UserAssigned",
    }
}

string_enum! {
    /// Registration state of a subscription with the resource provider.
    SubscriptionState {
        REGISTERED => "Registered",
        UNREGISTERED => "Unregistered",
        WARNED => "Warned",
        DELETED => "Deleted",
        SUSPENDED => "Suspended",
    }
}

// ─── Cluster ─────────────────────────────────────────────────────────

string_enum! {
    NetworkType {
        OVN_KUBERNETES => "OVNKubernetes",
        OTHER => "Other",
    }
}

string_enum! {
    /// Reachability of the cluster API server.
    Visibility {
        PUBLIC => "Public",
        PRIVATE => "Private",
    }
}

string_enum! {
    OutboundType {
        LOAD_BALANCER => "LoadBalancer",
    }
}

string_enum! {
    /// Who manages the etcd data encryption key.
    EtcdDataEncryptionKeyManagementMode {
        CUSTOMER_MANAGED => "CustomerManaged",
        PLATFORM_MANAGED => "PlatformManaged",
    }
}

string_enum! {
    CustomerManagedEncryptionType {
        KMS => "KMS",
    }
}

string_enum! {
    /// Install mode of the ImageStream-backed cluster image registry.
    ClusterImageRegistryState {
        ENABLED => "Enabled",
        DISABLED => "Disabled",
    }
}

// ─── Node pool ───────────────────────────────────────────────────────

string_enum! {
    DiskStorageAccountType {
        PREMIUM_LRS => "Premium_LRS",
        STANDARD_SSD_LRS => "StandardSSD_LRS",
        STANDARD_LRS => "Standard_LRS",
    }
}

string_enum! {
    /// Scheduling effect of a node taint.
    Effect {
        NO_EXECUTE => "NoExecute",
        NO_SCHEDULE => "NoSchedule",
        PREFER_NO_SCHEDULE => "PreferNoSchedule",
    }
}

// ─── External auth ───────────────────────────────────────────────────

string_enum! {
    ExternalAuthClientType {
        CONFIDENTIAL => "Confidential",
        PUBLIC => "Public",
    }
}

string_enum! {
    ExternalAuthConditionType {
        AVAILABLE => "Available",
        DEGRADED => "Degraded",
        PROGRESSING => "Progressing",
    }
}

string_enum! {
    ConditionStatus {
        TRUE => "True",
        FALSE => "False",
        UNKNOWN => "Unknown",
    }
}

string_enum! {
    /// How the username claim is prefixed when mapped into the cluster.
    UsernameClaimPrefixPolicy {
        PREFIX => "Prefix",
        NO_PREFIX => "NoPrefix",
        NONE => "None",
    }
}

string_enum! {
    TokenValidationRuleType {
        REQUIRED_CLAIM => "RequiredClaim",
    }
}
