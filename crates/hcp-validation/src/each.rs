//! Iteration over maps and lists.
//!
//! Map iterators ratchet on update: a key that already existed, or an entry
//! whose value did not change, is not re-validated. List iterators do not
//! ratchet because list elements have no stable identity.

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

use hcp_core::{ErrorList, FieldError, FieldPath, Operation};
use serde::Serialize;

/// Apply `check` to every key not already present in `old`, reporting at
/// `path[key]`.
pub fn each_map_key<V, F>(
    op: Operation,
    path: &FieldPath,
    map: &BTreeMap<String, V>,
    old: Option<&BTreeMap<String, V>>,
    check: F,
) -> ErrorList
where
    F: Fn(Operation, &FieldPath, &str, Option<&str>) -> ErrorList,
{
    let mut errs = ErrorList::new();
    for key in new_keys(op, map, old) {
        errs.append(check(op, &path.key(key.as_str()), key.as_str(), None));
    }
    errs
}

/// Like [`each_map_key`] but reports at the map itself, matching how label
/// keys are reported by Kubernetes.
pub fn each_map_key_at_parent<V, F>(
    op: Operation,
    path: &FieldPath,
    map: &BTreeMap<String, V>,
    old: Option<&BTreeMap<String, V>>,
    check: F,
) -> ErrorList
where
    F: Fn(Operation, &FieldPath, &str, Option<&str>) -> ErrorList,
{
    let mut errs = ErrorList::new();
    for key in new_keys(op, map, old) {
        errs.append(check(op, path, key.as_str(), None));
    }
    errs
}

fn new_keys<'a, V>(
    op: Operation,
    map: &'a BTreeMap<String, V>,
    old: Option<&'a BTreeMap<String, V>>,
) -> impl Iterator<Item = &'a String> + 'a {
    map.keys().filter(move |key| {
        !(op.is_update() && old.is_some_and(|o| o.contains_key(key.as_str())))
    })
}

/// Apply `check` to every value that is new or changed relative to `old`,
/// passing the old value alongside, reporting at `path[key]`.
pub fn each_map_value<V, F>(
    op: Operation,
    path: &FieldPath,
    map: &BTreeMap<String, V>,
    old: Option<&BTreeMap<String, V>>,
    check: F,
) -> ErrorList
where
    V: PartialEq,
    F: Fn(Operation, &FieldPath, &V, Option<&V>) -> ErrorList,
{
    let mut errs = ErrorList::new();
    for (key, value) in map {
        let old_value = old.and_then(|o| o.get(key));
        if op.is_update() && old_value == Some(value) {
            continue;
        }
        errs.append(check(op, &path.key(key.as_str()), value, old_value));
    }
    errs
}

/// Apply `check` to every element, reporting at `path[i]`.
pub fn each_slice_value<T, F>(op: Operation, path: &FieldPath, items: &[T], check: F) -> ErrorList
where
    F: Fn(Operation, &FieldPath, &T, Option<&T>) -> ErrorList,
{
    let mut errs = ErrorList::new();
    for (i, item) in items.iter().enumerate() {
        errs.append(check(op, &path.index(i), item, None));
    }
    errs
}

/// Report every element whose key repeats an earlier element's key.
pub fn unique_by<T, K, F>(path: &FieldPath, items: &[T], key: F) -> ErrorList
where
    K: Eq + Hash + Serialize,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    let mut errs = ErrorList::new();
    for (i, item) in items.iter().enumerate() {
        let k = key(item);
        let bad_value = serde_json::to_value(&k).unwrap_or_default();
        if !seen.insert(k) {
            errs.push(FieldError::duplicate(&path.index(i), bad_value));
        }
    }
    errs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{kube_qualified_name, required};
    use hcp_core::ErrorKind;

    fn path() -> FieldPath {
        FieldPath::new("labels")
    }

    fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn paths(errs: &ErrorList) -> Vec<String> {
        errs.iter().map(|e| e.path.to_string()).collect()
    }

    #[test]
    fn map_keys_report_at_key_path() {
        let m = map(&[("", "a"), ("ok", "b")]);
        let errs = each_map_key(Operation::Create, &path(), &m, None, |op, p, k, _| {
            required(op, p, &k.to_string(), None)
        });
        assert_eq!(paths(&errs), ["labels[]"]);
    }

    #[test]
    fn map_keys_skip_existing_keys_on_update() {
        let old = map(&[("-bad", "v")]);
        let new = map(&[("-bad", "v"), ("-worse", "v")]);
        let errs = each_map_key(Operation::Update, &path(), &new, Some(&old), kube_qualified_name);
        assert!(errs.iter().all(|e| e.path.to_string() == "labels[-worse]"));
        assert!(!errs.is_empty());

        let errs = each_map_key(Operation::Create, &path(), &new, Some(&old), kube_qualified_name);
        assert!(errs.iter().any(|e| e.path.to_string() == "labels[-bad]"));
    }

    #[test]
    fn map_keys_at_parent_report_at_map_path() {
        let m = map(&[("-bad", "v")]);
        let errs = each_map_key_at_parent(Operation::Create, &path(), &m, None, kube_qualified_name);
        assert!(!errs.is_empty());
        assert!(errs.iter().all(|e| e.path.to_string() == "labels"));
    }

    #[test]
    fn map_values_skip_unchanged_entries_on_update() {
        let old = map(&[("a", ""), ("b", "x")]);
        let new = map(&[("a", ""), ("b", "")]);
        let errs = each_map_value(Operation::Update, &path(), &new, Some(&old), required);
        assert_eq!(paths(&errs), ["labels[b]"]);
        assert_eq!(errs.errors()[0].kind, ErrorKind::Required);
    }

    #[test]
    fn slice_values_report_at_index() {
        let items = vec!["a".to_string(), String::new(), String::new()];
        let errs = each_slice_value(Operation::Update, &path(), &items, required);
        assert_eq!(paths(&errs), ["labels[1]", "labels[2]"]);
    }

    #[test]
    fn unique_by_reports_later_duplicates() {
        let items = ["a", "b", "a", "a"];
        let errs = unique_by(&path(), &items, |s| s.to_string());
        assert_eq!(paths(&errs), ["labels[2]", "labels[3]"]);
        assert_eq!(errs.errors()[0].bad_value, serde_json::json!("a"));
    }
}
