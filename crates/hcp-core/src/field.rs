//! # Field Errors — Path-Addressed Validation Results
//!
//! Every validator in the workspace reports problems as [`FieldError`]s
//! collected into an [`ErrorList`]. Errors are addressed by a [`FieldPath`]
//! that renders the way API clients see it:
//! `customerProperties.platform.operatorsAuthentication.userAssignedIdentities.controlPlaneOperators[ingress]`.
//!
//! ## Design
//!
//! - A path is immutable; `child`, `key` and `index` return a new path.
//! - Errors are never merged or deduplicated. Two validators flagging the
//!   same field produce two entries, in the order they ran.
//! - An empty [`ErrorList`] means "valid". Concatenation is the only way
//!   lists combine.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

// ---------------------------------------------------------------------------
// FieldPath
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    Field(String),
    Key(String),
    Index(usize),
}

/// Location of a value inside a resource tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Start a path at a top-level field.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Field(name.into())],
        }
    }

    /// Build a path from a sequence of nested field names.
    pub fn from_fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: names
                .into_iter()
                .map(|n| Segment::Field(n.into()))
                .collect(),
        }
    }

    /// Path of a struct field below this one.
    pub fn child(&self, name: impl Into<String>) -> Self {
        self.with(Segment::Field(name.into()))
    }

    /// Path of a map entry below this one.
    pub fn key(&self, key: impl Into<String>) -> Self {
        self.with(Segment::Key(key.into()))
    }

    /// Path of a slice element below this one.
    pub fn index(&self, index: usize) -> Self {
        self.with(Segment::Index(index))
    }

    /// True when the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether `prefix` is a leading run of this path's segments.
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Replace the leading `from` segments with `to`, or `None` when this
    /// path does not start with `from`.
    pub fn replace_prefix(&self, from: &FieldPath, to: &FieldPath) -> Option<FieldPath> {
        if !self.starts_with(from) {
            return None;
        }
        let mut segments = to.segments.clone();
        segments.extend_from_slice(&self.segments[from.segments.len()..]);
        Some(FieldPath { segments })
    }

    fn with(&self, segment: Segment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);
        Self { segments }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Field(name) if i == 0 => f.write_str(name)?,
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Key(key) => write!(f, "[{key}]")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// Coarse classification of a field error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A mandatory value is missing.
    Required,
    /// The value fails a semantic or cross-field rule.
    Invalid,
    /// The value is not one of an enumerated allow-set.
    NotSupported,
    /// A string exceeds its length bound.
    TooLong,
    /// A collection exceeds its item bound.
    TooMany,
    /// The value must be absent.
    Forbidden,
    /// The value changed on update when it must not.
    Immutable,
    /// The value repeats an earlier element of the same collection.
    Duplicate,
}

impl ErrorKind {
    /// Human-readable kind text used in rendered errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "Required value",
            Self::Invalid => "Invalid value",
            Self::NotSupported => "Unsupported value",
            Self::TooLong => "Too long",
            Self::TooMany => "Too many",
            Self::Forbidden => "Forbidden",
            Self::Immutable => "Immutable field",
            Self::Duplicate => "Duplicate value",
        }
    }

    /// Machine-readable type name used in serialized errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Required => "FieldValueRequired",
            Self::Invalid => "FieldValueInvalid",
            Self::NotSupported => "FieldValueNotSupported",
            Self::TooLong => "FieldValueTooLong",
            Self::TooMany => "FieldValueTooMany",
            Self::Forbidden => "FieldValueForbidden",
            Self::Immutable => "FieldValueImmutable",
            Self::Duplicate => "FieldValueDuplicate",
        }
    }

    // Kinds whose rendering omits the offending value.
    fn hides_value(&self) -> bool {
        matches!(
            self,
            Self::Required | Self::Forbidden | Self::TooLong | Self::Immutable
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.type_name())
    }
}

// ---------------------------------------------------------------------------
// FieldError
// ---------------------------------------------------------------------------

/// A single validation failure at a specific field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Where the failure was found.
    #[serde(rename = "field")]
    pub path: FieldPath,
    /// What kind of failure it is.
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    /// The offending value, or `Null` when it is not reported.
    #[serde(rename = "badValue", skip_serializing_if = "Value::is_null")]
    pub bad_value: Value,
    /// Human-readable explanation.
    pub detail: String,
}

impl FieldError {
    fn build(path: &FieldPath, kind: ErrorKind, bad_value: Value, detail: impl Into<String>) -> Self {
        Self {
            path: path.clone(),
            kind,
            bad_value,
            detail: detail.into(),
        }
    }

    pub fn required(path: &FieldPath, detail: impl Into<String>) -> Self {
        Self::build(path, ErrorKind::Required, Value::Null, detail)
    }

    pub fn invalid(path: &FieldPath, value: impl Into<Value>, detail: impl Into<String>) -> Self {
        Self::build(path, ErrorKind::Invalid, value.into(), detail)
    }

    /// `value` is not in `allowed`; the detail lists the allow-set sorted.
    pub fn not_supported<S: AsRef<str>>(path: &FieldPath, value: impl Into<Value>, allowed: &[S]) -> Self {
        let mut quoted: Vec<String> = allowed
            .iter()
            .map(|v| format!("{:?}", v.as_ref()))
            .collect();
        quoted.sort();
        let detail = if quoted.is_empty() {
            String::new()
        } else {
            format!("supported values: {}", quoted.join(", "))
        };
        Self::build(path, ErrorKind::NotSupported, value.into(), detail)
    }

    pub fn too_long(path: &FieldPath, max_bytes: usize) -> Self {
        Self::build(
            path,
            ErrorKind::TooLong,
            Value::Null,
            format!("may not be more than {max_bytes} bytes"),
        )
    }

    pub fn too_many(path: &FieldPath, actual: usize, max_items: usize) -> Self {
        Self::build(
            path,
            ErrorKind::TooMany,
            actual.into(),
            format!("must have at most {max_items} items"),
        )
    }

    pub fn forbidden(path: &FieldPath, detail: impl Into<String>) -> Self {
        Self::build(path, ErrorKind::Forbidden, Value::Null, detail)
    }

    pub fn immutable(path: &FieldPath) -> Self {
        Self::build(path, ErrorKind::Immutable, Value::Null, "field is immutable")
    }

    pub fn duplicate(path: &FieldPath, value: impl Into<Value>) -> Self {
        Self::build(path, ErrorKind::Duplicate, value.into(), "")
    }

    /// The same error relocated to another path.
    pub fn with_path(mut self, path: FieldPath) -> Self {
        self.path = path;
        self
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)?;
        if !self.kind.hides_value() && !self.bad_value.is_null() {
            write!(f, ": {}", self.bad_value)?;
        }
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ErrorList
// ---------------------------------------------------------------------------

/// Ordered collection of field errors. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ErrorList(Vec<FieldError>);

impl ErrorList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// Move every error of `other` to the end of this list.
    pub fn append(&mut self, other: ErrorList) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<FieldError> {
        self.0
    }

    /// Errors whose rendered path equals `path`.
    pub fn at<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.0.iter().filter(move |e| e.path.to_string() == path)
    }

    /// Apply `mapper` to every error path, keeping paths it declines.
    pub fn rewrite_paths(self, mapper: &dyn PathMapper) -> ErrorList {
        self.0
            .into_iter()
            .map(|e| match mapper.map_path(&e.path) {
                Some(path) => e.with_path(path),
                None => e,
            })
            .collect()
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl From<FieldError> for ErrorList {
    fn from(error: FieldError) -> Self {
        Self(vec![error])
    }
}

impl From<Vec<FieldError>> for ErrorList {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

impl FromIterator<FieldError> for ErrorList {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<FieldError> for ErrorList {
    fn extend<I: IntoIterator<Item = FieldError>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for ErrorList {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ---------------------------------------------------------------------------
// Path rewriting
// ---------------------------------------------------------------------------

/// Rewrites internal field paths into the names a caller reports.
pub trait PathMapper {
    /// The replacement path, or `None` to keep `path` unchanged.
    fn map_path(&self, path: &FieldPath) -> Option<FieldPath>;
}

impl<F> PathMapper for F
where
    F: Fn(&FieldPath) -> Option<FieldPath>,
{
    fn map_path(&self, path: &FieldPath) -> Option<FieldPath> {
        self(path)
    }
}

/// Ordered prefix substitutions; the first matching rule wins.
#[derive(Debug, Clone, Default)]
pub struct PrefixMapper {
    rules: Vec<(FieldPath, FieldPath)>,
}

impl PrefixMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, from: FieldPath, to: FieldPath) -> Self {
        self.rules.push((from, to));
        self
    }
}

impl PathMapper for PrefixMapper {
    fn map_path(&self, path: &FieldPath) -> Option<FieldPath> {
        self.rules
            .iter()
            .find_map(|(from, to)| path.replace_prefix(from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_renders_fields_keys_and_indices() {
        let path = FieldPath::new("customerProperties")
            .child("platform")
            .child("operatorsAuthentication")
            .child("userAssignedIdentities")
            .child("controlPlaneOperators")
            .key("operatorX");
        assert_eq!(
            path.to_string(),
            "customerProperties.platform.operatorsAuthentication.userAssignedIdentities.controlPlaneOperators[operatorX]"
        );
        assert_eq!(
            FieldPath::new("properties").child("taints").index(1).child("value").to_string(),
            "properties.taints[1].value"
        );
    }

    #[test]
    fn child_does_not_mutate_parent() {
        let parent = FieldPath::from_fields(["a", "b"]);
        let _ = parent.child("c");
        assert_eq!(parent.to_string(), "a.b");
        assert_eq!(parent.len(), 2);
    }

    #[test]
    fn empty_path_renders_empty() {
        assert_eq!(FieldPath::default().to_string(), "");
        assert!(FieldPath::default().is_empty());
    }

    #[test]
    fn replace_prefix_swaps_leading_segments() {
        let path = FieldPath::from_fields(["customerProperties", "version", "id"]);
        let mapped = path
            .replace_prefix(&FieldPath::new("customerProperties"), &FieldPath::new("properties"))
            .unwrap();
        assert_eq!(mapped.to_string(), "properties.version.id");
        assert!(path
            .replace_prefix(&FieldPath::new("identity"), &FieldPath::new("x"))
            .is_none());
    }

    #[test]
    fn required_error_renders_without_value() {
        let e = FieldError::required(&FieldPath::new("location"), "");
        assert_eq!(e.to_string(), "location: Required value");
    }

    #[test]
    fn invalid_error_renders_quoted_value_and_detail() {
        let e = FieldError::invalid(&FieldPath::new("podCidr"), "10.0.0.1/16", "not IPv4 CIDR");
        assert_eq!(e.to_string(), "podCidr: Invalid value: \"10.0.0.1/16\": not IPv4 CIDR");
    }

    #[test]
    fn not_supported_lists_sorted_values() {
        let e = FieldError::not_supported(&FieldPath::new("visibility"), "Hidden", &["Public", "Private"]);
        assert_eq!(
            e.to_string(),
            "visibility: Unsupported value: \"Hidden\": supported values: \"Private\", \"Public\""
        );
    }

    #[test]
    fn bound_errors_carry_limits() {
        assert_eq!(
            FieldError::too_long(&FieldPath::new("name"), 15).to_string(),
            "name: Too long: may not be more than 15 bytes"
        );
        assert_eq!(
            FieldError::too_many(&FieldPath::new("clients"), 21, 20).to_string(),
            "clients: Too many: 21: must have at most 20 items"
        );
    }

    #[test]
    fn list_preserves_order_and_duplicates() {
        let path = FieldPath::new("x");
        let mut list = ErrorList::new();
        list.push(FieldError::required(&path, ""));
        list.push(FieldError::required(&path, ""));
        let mut other = ErrorList::new();
        other.push(FieldError::immutable(&path));
        list.append(other);
        assert_eq!(list.len(), 3);
        assert_eq!(list.errors()[2].kind, ErrorKind::Immutable);
        assert_eq!(list.at("x").count(), 3);
        assert_eq!(list.to_string().lines().count(), 3);
    }

    #[test]
    fn list_serializes_as_array() {
        let list = ErrorList::from(FieldError::invalid(&FieldPath::new("a").index(0), 3, "bad"));
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json[0]["field"], "a[0]");
        assert_eq!(json[0]["type"], "FieldValueInvalid");
        assert_eq!(json[0]["badValue"], 3);
        assert_eq!(json[0]["detail"], "bad");

        let required = serde_json::to_value(FieldError::required(&FieldPath::new("b"), "")).unwrap();
        assert!(required.get("badValue").is_none());
    }

    #[test]
    fn rewrite_paths_applies_first_matching_rule() {
        let mapper = PrefixMapper::new()
            .rule(FieldPath::new("customerProperties"), FieldPath::new("properties"))
            .rule(FieldPath::new("trackedResource"), FieldPath::default());
        let list: ErrorList = vec![
            FieldError::required(&FieldPath::from_fields(["customerProperties", "version", "id"]), ""),
            FieldError::required(&FieldPath::from_fields(["trackedResource", "location"]), ""),
            FieldError::required(&FieldPath::new("identity"), ""),
        ]
        .into();
        let rewritten: Vec<String> = list
            .rewrite_paths(&mapper)
            .iter()
            .map(|e| e.path.to_string())
            .collect();
        assert_eq!(rewritten, vec!["properties.version.id", "location", "identity"]);
    }

    #[test]
    fn closures_are_path_mappers() {
        let mapper = |p: &FieldPath| {
            p.replace_prefix(&FieldPath::new("a"), &FieldPath::new("b"))
        };
        let list = ErrorList::from(FieldError::required(&FieldPath::new("a").child("c"), ""));
        assert_eq!(list.rewrite_paths(&mapper).errors()[0].path.to_string(), "b.c");
    }
}
