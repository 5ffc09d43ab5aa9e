//! # hcp-cli — Resource Document Validation
//!
//! Provides the `hcp` command-line interface over the validation engine.
//!
//! ## Subcommands
//!
//! - `hcp validate` — Validate a cluster, node pool, external auth or
//!   subscription document, optionally against its stored version.
//! - `hcp default-cluster` — Print the default cluster document.
//!
//! ```bash
//! hcp validate cluster --new cluster.json
//! hcp validate node-pool --new np.json --old np-stored.json --cluster cluster.json
//! hcp -v validate subscription --new sub.json --api-paths
//! ```
//!
//! Exit codes: `0` when the document is valid, `2` when validation
//! produced findings, `1` on I/O, parse or usage errors.

pub mod defaults;
pub mod validate;

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;

/// Exit code for a document with no findings.
pub const EXIT_VALID: u8 = 0;

/// Exit code for a document with at least one finding.
pub const EXIT_INVALID: u8 = 2;

/// Read a JSON document from `path` into `T`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}
