//! # hcp-core — Foundational Types for HCP Resource Validation
//!
//! This crate defines the vocabulary every validator in the workspace speaks.
//! Every other crate depends on `hcp-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Findings are values, not errors.** Validators return an
//!    [`ErrorList`] of path-addressed [`FieldError`]s. `Result::Err` is
//!    reserved for failures that stop validation from running at all.
//!
//! 2. **Parsed identifiers.** [`ResourceId`] is only constructed through its
//!    parser, including during deserialization. Comparisons between
//!    identifiers are case-insensitive.
//!
//! 3. **Explicit equality configuration.** Structural immutability checks
//!    take an [`EqualityStrategies`] registry instead of consulting a
//!    process-wide table.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `hcp-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod cidr;
pub mod equality;
pub mod error;
pub mod field;
pub mod operation;
pub mod resource_id;

// Re-export primary types for ergonomic imports.
pub use cidr::IpNet;
pub use equality::{EqualityStrategies, StructuralEq};
pub use error::{CidrError, HcpError, ResourceIdError};
pub use field::{ErrorKind, ErrorList, FieldError, FieldPath, PathMapper, PrefixMapper};
pub use operation::Operation;
pub use resource_id::{ResourceId, ResourceType};
