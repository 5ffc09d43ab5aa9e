//! # hcp-api — Internal Resource Model
//!
//! Version-independent representations of the resources the HCP resource
//! provider manages: clusters, node pools, external auth configurations,
//! and subscription registrations.
//!
//! ## Conventions
//!
//! - Every struct derives `Default` and deserializes with `#[serde(default)]`,
//!   so a partial document yields a value that validation can report on
//!   instead of a parse failure.
//! - `Option` marks fields where "absent" and "present but empty" differ
//!   (authorized CIDRs, audiences, disk size, nested profiles).
//! - Enumerated fields are open string newtypes from [`enums`]: unknown
//!   values survive deserialization and are rejected by validation.
//! - Composite values compared for immutability implement
//!   [`hcp_core::StructuralEq`].

pub mod arm;
pub mod cluster;
pub mod enums;
pub mod external_auth;
pub mod node_pool;
pub mod resource_types;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use arm::{
    ManagedServiceIdentity, ProxyResource, Resource, Subscription, SystemData, TrackedResource,
    UserAssignedIdentity,
};
pub use cluster::Cluster;
pub use external_auth::ExternalAuth;
pub use node_pool::NodePool;
