//! # Validation Entry Points
//!
//! [`Validator`] owns the configuration a validation run needs: the
//! equality strategies used by structural immutability checks and an
//! optional path mapper applied to the findings. The free functions use a
//! shared default-configured validator.

use std::fmt;

use hcp_api::{Cluster, ExternalAuth, NodePool, Subscription};
use hcp_core::{
    EqualityStrategies, ErrorList, FieldPath, Operation, PathMapper, PrefixMapper, StructuralEq,
};
use once_cell::sync::Lazy;

use crate::immutable::immutable_by_structure;

/// Per-call state threaded through an entity tree.
#[derive(Clone, Copy)]
pub(crate) struct Ctx<'a> {
    pub op: Operation,
    pub strategies: &'a EqualityStrategies,
}

impl Ctx<'_> {
    pub fn immutable_by_structure<T: StructuralEq + ?Sized>(
        &self,
        path: &FieldPath,
        value: &T,
        old: Option<&T>,
    ) -> ErrorList {
        immutable_by_structure(self.strategies, self.op, path, value, old)
    }
}

/// Configured validation engine. Holds no per-call state, so one instance
/// can serve concurrent callers.
pub struct Validator {
    strategies: EqualityStrategies,
    path_mapper: Option<Box<dyn PathMapper + Send + Sync>>,
}

impl Validator {
    pub fn new(strategies: EqualityStrategies) -> Self {
        Self {
            strategies,
            path_mapper: None,
        }
    }

    /// Rewrite every finding's path with `mapper` before returning it.
    pub fn with_path_mapper(mut self, mapper: impl PathMapper + Send + Sync + 'static) -> Self {
        self.path_mapper = Some(Box::new(mapper));
        self
    }

    pub fn strategies(&self) -> &EqualityStrategies {
        &self.strategies
    }

    fn ctx(&self, op: Operation) -> Ctx<'_> {
        Ctx {
            op,
            strategies: &self.strategies,
        }
    }

    fn finish(&self, entity: &'static str, op: Operation, errs: ErrorList) -> ErrorList {
        tracing::debug!(entity, operation = %op, errors = errs.len(), "validated resource");
        match &self.path_mapper {
            Some(mapper) => errs.rewrite_paths(mapper.as_ref()),
            None => errs,
        }
    }

    pub fn validate_cluster(&self, op: Operation, new: &Cluster, old: Option<&Cluster>) -> ErrorList {
        let errs = crate::cluster::validate_cluster(self.ctx(op), new, old);
        self.finish("cluster", op, errs)
    }

    pub fn validate_node_pool(&self, op: Operation, new: &NodePool, old: Option<&NodePool>) -> ErrorList {
        let errs = crate::node_pool::validate_node_pool(self.ctx(op), new, old);
        self.finish("node_pool", op, errs)
    }

    pub fn validate_external_auth(
        &self,
        op: Operation,
        new: &ExternalAuth,
        old: Option<&ExternalAuth>,
    ) -> ErrorList {
        let errs = crate::external_auth::validate_external_auth(self.ctx(op), new, old);
        self.finish("external_auth", op, errs)
    }

    pub fn validate_subscription(
        &self,
        op: Operation,
        new: &Subscription,
        old: Option<&Subscription>,
    ) -> ErrorList {
        let errs = crate::subscription::validate_subscription(self.ctx(op), new, old);
        self.finish("subscription", op, errs)
    }

    /// Rules a node pool must satisfy relative to its parent cluster.
    pub fn validate_node_pool_against_cluster(&self, node_pool: &NodePool, cluster: &Cluster) -> ErrorList {
        let errs = crate::node_pool::validate_node_pool_against_cluster(node_pool, cluster);
        tracing::debug!(
            entity = "node_pool",
            parent = "cluster",
            errors = errs.len(),
            "validated resource against parent"
        );
        match &self.path_mapper {
            Some(mapper) => errs.rewrite_paths(mapper.as_ref()),
            None => errs,
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(EqualityStrategies::default())
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("strategies", &self.strategies)
            .field("path_mapper", &self.path_mapper.is_some())
            .finish()
    }
}

/// Maps internal paths onto the names used by the public API:
/// the ARM envelope is flattened to the top level and customer properties
/// are reported under `properties`.
pub fn api_path_mapper() -> PrefixMapper {
    PrefixMapper::new()
        .rule(
            FieldPath::from_fields(["trackedResource", "resource"]),
            FieldPath::default(),
        )
        .rule(FieldPath::from_fields(["trackedResource"]), FieldPath::default())
        .rule(FieldPath::new("customerProperties"), FieldPath::new("properties"))
}

static DEFAULT_VALIDATOR: Lazy<Validator> = Lazy::new(Validator::default);

pub fn validate_cluster_create(new: &Cluster) -> ErrorList {
    DEFAULT_VALIDATOR.validate_cluster(Operation::Create, new, None)
}

pub fn validate_cluster_update(new: &Cluster, old: &Cluster) -> ErrorList {
    DEFAULT_VALIDATOR.validate_cluster(Operation::Update, new, Some(old))
}

pub fn validate_node_pool_create(new: &NodePool) -> ErrorList {
    DEFAULT_VALIDATOR.validate_node_pool(Operation::Create, new, None)
}

pub fn validate_node_pool_update(new: &NodePool, old: &NodePool) -> ErrorList {
    DEFAULT_VALIDATOR.validate_node_pool(Operation::Update, new, Some(old))
}

pub fn validate_node_pool_against_cluster(node_pool: &NodePool, cluster: &Cluster) -> ErrorList {
    DEFAULT_VALIDATOR.validate_node_pool_against_cluster(node_pool, cluster)
}

pub fn validate_external_auth_create(new: &ExternalAuth) -> ErrorList {
    DEFAULT_VALIDATOR.validate_external_auth(Operation::Create, new, None)
}

pub fn validate_external_auth_update(new: &ExternalAuth, old: &ExternalAuth) -> ErrorList {
    DEFAULT_VALIDATOR.validate_external_auth(Operation::Update, new, Some(old))
}

pub fn validate_subscription_create(new: &Subscription) -> ErrorList {
    DEFAULT_VALIDATOR.validate_subscription(Operation::Create, new, None)
}

pub fn validate_subscription_update(new: &Subscription, old: &Subscription) -> ErrorList {
    DEFAULT_VALIDATOR.validate_subscription(Operation::Update, new, Some(old))
}
