//! # hcp-validation — Validation and Consistency Engine
//!
//! Checks a proposed HCP OpenShift resource, and on update the stored
//! version it replaces, and reports every problem as a path-addressed
//! [`hcp_core::FieldError`].
//!
//! ## Layout
//!
//! - [`primitives`]: single-field checks (required, bounds, enums, formats).
//! - [`each`]: apply a check to every map key, map value or list element.
//! - [`immutable`]: value and structural immutability on update.
//! - [`union`]: discriminated union presence rules.
//! - [`resource_id`]: Azure resource identifier checks.
//! - [`identity`]: reconciliation of attached identities and their users.
//! - [`network`]: overlap between address ranges.
//! - [`validator`]: the entry points, one tree per resource kind.
//!
//! ## Conventions
//!
//! Every check has the shape `(op, path, value, old) -> ErrorList`, with
//! extra parameters after `old`. Checks never short-circuit across fields:
//! a single call reports all findings in a deterministic order.
//!
//! ```
//! use hcp_validation::validate_cluster_create;
//!
//! let cluster = hcp_api::Cluster::new_default(None, "westus3");
//! let errs = validate_cluster_create(&cluster);
//! assert!(errs.at("trackedResource.resource.id").next().is_some());
//! ```

mod arm;
mod cluster;
mod external_auth;
mod node_pool;
mod subscription;

pub mod each;
pub mod identity;
pub mod immutable;
pub mod network;
pub mod primitives;
pub mod resource_id;
pub mod union;
pub mod validator;

pub use identity::{reconcile_identities, IdentityReference};
pub use network::{cidr_overlap, NamedCidr};
pub use union::DiscriminatedUnion;
pub use validator::{
    api_path_mapper, validate_cluster_create, validate_cluster_update, validate_external_auth_create,
    validate_external_auth_update, validate_node_pool_against_cluster, validate_node_pool_create,
    validate_node_pool_update, validate_subscription_create, validate_subscription_update, Validator,
};
