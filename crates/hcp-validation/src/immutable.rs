//! Update-only checks that a value did not change.

use hcp_core::{EqualityStrategies, ErrorList, FieldError, FieldPath, Operation, StructuralEq};

/// On update, the value must equal the old value under `PartialEq`.
pub fn immutable<T: PartialEq + ?Sized>(
    op: Operation,
    path: &FieldPath,
    value: &T,
    old: Option<&T>,
) -> ErrorList {
    match old {
        Some(old) if op.is_update() && value != old => FieldError::immutable(path).into(),
        _ => ErrorList::new(),
    }
}

/// On update, the value must equal the old value under structural equality,
/// so leaf types with a registered strategy compare by that strategy.
pub fn immutable_by_structure<T: StructuralEq + ?Sized>(
    strategies: &EqualityStrategies,
    op: Operation,
    path: &FieldPath,
    value: &T,
    old: Option<&T>,
) -> ErrorList {
    match old {
        Some(old) if op.is_update() && !strategies.equal(value, old) => {
            tracing::trace!(field = %path, "structural change on immutable field");
            FieldError::immutable(path).into()
        }
        _ => ErrorList::new(),
    }
}
