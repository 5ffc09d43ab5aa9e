//! `hcp validate`: run the validation engine over resource documents.
//!
//! The operation is inferred from the arguments: Create when only `--new`
//! is given, Update when `--old` names the stored version. Findings are
//! written to stdout as a pretty-printed JSON array.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use serde::de::DeserializeOwned;

use hcp_api::{Cluster, ExternalAuth, NodePool, Subscription};
use hcp_core::{ErrorList, Operation};
use hcp_validation::{api_path_mapper, Validator};

use crate::{read_json, EXIT_INVALID, EXIT_VALID};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    Cluster,
    NodePool,
    ExternalAuth,
    Subscription,
}

impl ResourceKind {
    fn name(self) -> &'static str {
        match self {
            Self::Cluster => "cluster",
            Self::NodePool => "node pool",
            Self::ExternalAuth => "external auth",
            Self::Subscription => "subscription",
        }
    }
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Kind of resource the documents describe.
    pub kind: ResourceKind,

    /// Proposed resource document.
    #[arg(long)]
    pub new: PathBuf,

    /// Stored resource document; validates as an update when present.
    #[arg(long)]
    pub old: Option<PathBuf>,

    /// Parent cluster document (node pools only).
    #[arg(long)]
    pub cluster: Option<PathBuf>,

    /// Report findings under public API field names.
    #[arg(long)]
    pub api_paths: bool,
}

impl ValidateArgs {
    fn operation(&self) -> Operation {
        if self.old.is_some() {
            Operation::Update
        } else {
            Operation::Create
        }
    }
}

fn load<T: DeserializeOwned>(args: &ValidateArgs) -> Result<(T, Option<T>)> {
    let new = read_json(&args.new)?;
    let old = args.old.as_deref().map(read_json).transpose()?;
    Ok((new, old))
}

/// Validate the documents named by `args` and return every finding.
pub fn validate_documents(args: &ValidateArgs) -> Result<ErrorList> {
    if args.cluster.is_some() && args.kind != ResourceKind::NodePool {
        bail!("--cluster applies only to node pools, not to a {}", args.kind.name());
    }

    let validator = if args.api_paths {
        Validator::default().with_path_mapper(api_path_mapper())
    } else {
        Validator::default()
    };
    let op = args.operation();
    tracing::info!(kind = args.kind.name(), operation = %op, new = %args.new.display(), "validating");

    let errs = match args.kind {
        ResourceKind::Cluster => {
            let (new, old) = load::<Cluster>(args)?;
            validator.validate_cluster(op, &new, old.as_ref())
        }
        ResourceKind::NodePool => {
            let (new, old) = load::<NodePool>(args)?;
            let mut errs = validator.validate_node_pool(op, &new, old.as_ref());
            if let Some(path) = &args.cluster {
                let cluster: Cluster = read_json(path)?;
                errs.append(validator.validate_node_pool_against_cluster(&new, &cluster));
            }
            errs
        }
        ResourceKind::ExternalAuth => {
            let (new, old) = load::<ExternalAuth>(args)?;
            validator.validate_external_auth(op, &new, old.as_ref())
        }
        ResourceKind::Subscription => {
            let (new, old) = load::<Subscription>(args)?;
            validator.validate_subscription(op, &new, old.as_ref())
        }
    };
    Ok(errs)
}

pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let errs = validate_documents(args)?;
    println!("{}", serde_json::to_string_pretty(&errs)?);

    if errs.is_empty() {
        tracing::info!("{} is valid", args.kind.name());
        Ok(EXIT_VALID)
    } else {
        tracing::warn!(findings = errs.len(), "{} is invalid", args.kind.name());
        Ok(EXIT_INVALID)
    }
}
