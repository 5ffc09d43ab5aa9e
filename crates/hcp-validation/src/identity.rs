//! # Identity Consistency
//!
//! A cluster lists the user-assigned identities attached to it and, in a
//! separate subtree, the operator slots that consume identities. The two
//! must agree:
//!
//! - every attached identity is consumed by exactly one control plane slot
//!   or the service slot;
//! - every control plane or service reference names an attached identity;
//! - data plane slots never name an attached identity, because data plane
//!   operators authenticate with identities the customer manages.
//!
//! Identifiers are compared case-folded. ARM does not normalize their case,
//! even within one resource.

use std::collections::BTreeMap;

use hcp_core::{ErrorList, FieldError, FieldPath};

/// An operator slot's identity reference and where it was found.
#[derive(Debug, Clone)]
pub struct IdentityReference<'a> {
    pub path: FieldPath,
    pub id: &'a str,
}

impl<'a> IdentityReference<'a> {
    pub fn new(path: FieldPath, id: &'a str) -> Self {
        Self { path, id }
    }
}

/// Cross-check attached identities against the slots that reference them.
///
/// `assigned` are the attached identity keys in report order, addressed
/// under `assigned_path`. `consumers` are tallied in order; `data_plane`
/// references must not be attached.
pub fn reconcile_identities<'a>(
    assigned_path: &FieldPath,
    assigned: impl IntoIterator<Item = &'a str> + Clone,
    consumers: &[IdentityReference<'_>],
    data_plane: &[IdentityReference<'_>],
) -> ErrorList {
    let mut tally: BTreeMap<String, usize> = assigned
        .clone()
        .into_iter()
        .map(|key| (key.to_lowercase(), 0))
        .collect();
    let mut errs = ErrorList::new();

    for reference in consumers {
        match tally.get_mut(&reference.id.to_lowercase()) {
            Some(count) => *count += 1,
            None => errs.push(FieldError::invalid(
                &reference.path,
                reference.id,
                "identity is not assigned to this resource",
            )),
        }
    }

    for key in assigned {
        let detail = match tally.get(&key.to_lowercase()) {
            Some(0) => "identity is assigned to this resource but not used",
            Some(1) | None => continue,
            Some(_) => "identity is used multiple times",
        };
        errs.push(FieldError::invalid(&assigned_path.key(key), key, detail));
    }

    for reference in data_plane {
        if tally.contains_key(&reference.id.to_lowercase()) {
            errs.push(FieldError::invalid(
                &reference.path,
                reference.id,
                "cannot use identity assigned to this resource by .identities.userAssignedIdentities",
            ));
        }
    }

    if !errs.is_empty() {
        tracing::trace!(
            assigned = tally.len(),
            findings = errs.len(),
            "identity references disagree with assigned identities"
        );
    }
    errs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(name: &str) -> FieldPath {
        FieldPath::new("operators").key(name)
    }

    fn assigned_path() -> FieldPath {
        FieldPath::from_fields(["identity", "userAssignedIdentities"])
    }

    fn run(assigned: &[&str], consumers: &[(&str, &str)], data_plane: &[(&str, &str)]) -> ErrorList {
        let consumers: Vec<_> = consumers
            .iter()
            .map(|(slot_name, id)| IdentityReference::new(slot(slot_name), id))
            .collect();
        let data_plane: Vec<_> = data_plane
            .iter()
            .map(|(slot_name, id)| IdentityReference::new(slot(slot_name), id))
            .collect();
        reconcile_identities(&assigned_path(), assigned.iter().copied(), &consumers, &data_plane)
    }

    #[test]
    fn each_identity_used_once_is_valid() {
        let errs = run(&["/A", "/B"], &[("x", "/a"), ("y", "/B")], &[("dp", "/C")]);
        assert!(errs.is_empty(), "{errs}");
    }

    #[test]
    fn unused_identity_reported_at_assignment() {
        let errs = run(&["/a", "/b"], &[("x", "/a")], &[]);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs.errors()[0].path.to_string(), "identity.userAssignedIdentities[/b]");
        assert_eq!(errs.errors()[0].detail, "identity is assigned to this resource but not used");
    }

    #[test]
    fn double_use_reported_once() {
        let errs = run(&["/a"], &[("x", "/a"), ("y", "/A")], &[]);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs.errors()[0].detail, "identity is used multiple times");
    }

    #[test]
    fn unknown_reference_reported_at_slot() {
        let errs = run(&[], &[("x", "/missing")], &[]);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs.errors()[0].path.to_string(), "operators[x]");
        assert_eq!(errs.errors()[0].detail, "identity is not assigned to this resource");
    }

    #[test]
    fn data_plane_may_not_use_assigned_identity() {
        let errs = run(&["/a"], &[("x", "/a")], &[("dp", "/A")]);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs.errors()[0].path.to_string(), "operators[dp]");
    }
}
