//! # Error Types — Structured Error Hierarchy
//!
//! Validation findings are never errors: they are collected as
//! [`ErrorList`](crate::ErrorList) values. The types here cover the
//! failures that prevent validation from running at all, such as a
//! malformed identifier at a parse boundary or an unreadable input document.

use thiserror::Error;

/// Top-level error type for the HCP validation workspace.
#[derive(Error, Debug)]
pub enum HcpError {
    /// A resource identifier failed to parse.
    #[error("resource ID error: {0}")]
    ResourceId(#[from] ResourceIdError),

    /// An address range failed to parse.
    #[error("CIDR error: {0}")]
    Cidr(#[from] CidrError),

    /// An operation name was not `create` or `update`.
    #[error("unknown operation \"{0}\": expected \"create\" or \"update\"")]
    UnknownOperation(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error parsing an Azure resource identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceIdError {
    /// The identifier was the empty string.
    #[error("invalid resource ID: id cannot be empty")]
    Empty,

    /// The identifier did not begin with `/`.
    #[error("invalid resource ID: resource id '{0}' must start with '/'")]
    MissingLeadingSlash(String),

    /// The identifier did not match the expected segment grammar.
    #[error("invalid resource ID: {id}: {reason}")]
    Malformed {
        /// The offending identifier.
        id: String,
        /// Which part of the grammar was violated.
        reason: &'static str,
    },
}

/// Error parsing an address range in CIDR notation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CidrError {
    /// The text is not `<address>/<prefix length>`.
    #[error("invalid CIDR address: {0}")]
    Invalid(String),
}
