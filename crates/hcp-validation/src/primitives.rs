//! # Primitive Validators
//!
//! Stateless single-field checks. Every function takes the operation, the
//! field path, the new value and the old value (absent on create) so that
//! checks compose uniformly inside [`crate::each`] iterators and [`or`].
//!
//! Presence is a separate concern: apart from [`required`] and
//! [`forbidden`], an empty value passes every check here.

use std::fmt;

use hcp_api::enums::StringEnum;
use hcp_core::{ErrorList, FieldError, FieldPath, Operation};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// Lowercase RFC 1035 DNS label.
pub static RFC1035_LABEL: Lazy<Regex> =
    Lazy::new(|| compile(r"^[a-z]([-a-z0-9]*[a-z0-9])?$"));
pub const RFC1035_LABEL_MESSAGE: &str = "(must be a valid DNS RFC 1035 label)";

pub static CLUSTER_NAME: Lazy<Regex> =
    Lazy::new(|| compile(r"^[a-zA-Z][-a-zA-Z0-9]{1,52}[a-zA-Z0-9]$"));
pub static NODE_POOL_NAME: Lazy<Regex> =
    Lazy::new(|| compile(r"^[a-zA-Z][-a-zA-Z0-9]{1,13}[a-zA-Z0-9]$"));
pub const RESOURCE_NAME_MESSAGE: &str = "must be a valid DNS RFC 1035 label";

pub static HTTPS_URL: Lazy<Regex> = Lazy::new(|| compile(r"^https://.*"));
pub const HTTPS_URL_MESSAGE: &str = "must be https URL";

const QUALIFIED_NAME_FMT: &str = "([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9]";
const QUALIFIED_NAME_MAX_LEN: usize = 63;
const DNS1123_SUBDOMAIN_FMT: &str = "[a-z0-9]([-a-z0-9]*[a-z0-9])?(\\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*";
const DNS1123_SUBDOMAIN_MAX_LEN: usize = 253;
const LABEL_VALUE_FMT: &str = "(([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9])?";
const LABEL_VALUE_MAX_LEN: usize = 63;

static QUALIFIED_NAME: Lazy<Regex> = Lazy::new(|| compile(&format!("^{QUALIFIED_NAME_FMT}$")));
static DNS1123_SUBDOMAIN: Lazy<Regex> =
    Lazy::new(|| compile(&format!("^{DNS1123_SUBDOMAIN_FMT}$")));
static LABEL_VALUE: Lazy<Regex> = Lazy::new(|| compile(&format!("^{LABEL_VALUE_FMT}$")));

// Built-in patterns are literals; `built_in_patterns_compile` forces each one.
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}"))
}

// ---------------------------------------------------------------------------
// Presence
// ---------------------------------------------------------------------------

/// The value must not be its zero value.
///
/// On update an unchanged value is accepted, so an object stored before the
/// field became mandatory can still be updated.
pub fn required<T: Default + PartialEq>(
    op: Operation,
    path: &FieldPath,
    value: &T,
    old: Option<&T>,
) -> ErrorList {
    if *value != T::default() {
        return ErrorList::new();
    }
    if op.is_update() && old.is_some_and(|o| o == value) {
        return ErrorList::new();
    }
    FieldError::required(path, "").into()
}

/// Like [`required`] for optional lists: `None` and an empty list both fail.
pub fn required_slice<T: PartialEq>(
    op: Operation,
    path: &FieldPath,
    value: Option<&[T]>,
    old: Option<Option<&[T]>>,
) -> ErrorList {
    if value.is_some_and(|v| !v.is_empty()) {
        return ErrorList::new();
    }
    if op.is_update() && old.is_some_and(|o| o == value) {
        return ErrorList::new();
    }
    FieldError::required(path, "").into()
}

/// The value must be its zero value.
pub fn forbidden<T: Default + PartialEq>(
    _op: Operation,
    path: &FieldPath,
    value: &T,
    _old: Option<&T>,
) -> ErrorList {
    if *value == T::default() {
        return ErrorList::new();
    }
    FieldError::forbidden(path, "").into()
}

// ---------------------------------------------------------------------------
// Enumerations and bounds
// ---------------------------------------------------------------------------

/// The value must be one of `E::VALUES`, compared exactly.
pub fn enum_value<E: StringEnum>(
    _op: Operation,
    path: &FieldPath,
    value: &E,
    _old: Option<&E>,
) -> ErrorList {
    if E::VALUES.contains(&value.as_str()) {
        return ErrorList::new();
    }
    FieldError::not_supported(path, value.as_str(), E::VALUES).into()
}

pub fn min_items<T>(
    _op: Operation,
    path: &FieldPath,
    value: Option<&[T]>,
    _old: Option<&[T]>,
    min: usize,
) -> ErrorList {
    match value {
        Some(items) if items.len() < min => FieldError::invalid(
            path,
            items.len(),
            format!("must have at least {min} items"),
        )
        .into(),
        _ => ErrorList::new(),
    }
}

pub fn max_items<T>(
    _op: Operation,
    path: &FieldPath,
    value: Option<&[T]>,
    _old: Option<&[T]>,
    max: usize,
) -> ErrorList {
    match value {
        Some(items) if items.len() > max => FieldError::too_many(path, items.len(), max).into(),
        _ => ErrorList::new(),
    }
}

/// Length in bytes, inclusive.
pub fn max_len(_op: Operation, path: &FieldPath, value: &str, _old: Option<&str>, max: usize) -> ErrorList {
    if value.len() > max {
        return FieldError::too_long(path, max).into();
    }
    ErrorList::new()
}

pub fn min_len(_op: Operation, path: &FieldPath, value: &str, _old: Option<&str>, min: usize) -> ErrorList {
    if value.len() < min {
        return FieldError::invalid(path, value, format!("must be at least {min} characters long")).into();
    }
    ErrorList::new()
}

pub fn minimum<T>(_op: Operation, path: &FieldPath, value: &T, _old: Option<&T>, min: T) -> ErrorList
where
    T: Copy + PartialOrd + fmt::Display + Into<Value>,
{
    if *value < min {
        return FieldError::invalid(path, *value, format!("must be greater than or equal to {min}")).into();
    }
    ErrorList::new()
}

pub fn maximum<T>(_op: Operation, path: &FieldPath, value: &T, _old: Option<&T>, max: T) -> ErrorList
where
    T: Copy + PartialOrd + fmt::Display + Into<Value>,
{
    if *value > max {
        return FieldError::invalid(path, *value, format!("must be less than or equal to {max}")).into();
    }
    ErrorList::new()
}

/// [`maximum`], applied only when no availability zone is pinned.
pub fn maximum_if_no_availability_zone<T>(
    op: Operation,
    path: &FieldPath,
    value: &T,
    old: Option<&T>,
    max: T,
    availability_zone: &str,
) -> ErrorList
where
    T: Copy + PartialOrd + fmt::Display + Into<Value>,
{
    if !availability_zone.is_empty() {
        return ErrorList::new();
    }
    maximum(op, path, value, old, max)
}

pub fn equal_to<T>(_op: Operation, path: &FieldPath, value: &T, _old: Option<&T>, expected: T) -> ErrorList
where
    T: Copy + PartialEq + fmt::Display + Into<Value>,
{
    if *value != expected {
        return FieldError::invalid(path, *value, format!("must be equal to {expected}")).into();
    }
    ErrorList::new()
}

// ---------------------------------------------------------------------------
// String formats
// ---------------------------------------------------------------------------

pub fn matches_regex(
    _op: Operation,
    path: &FieldPath,
    value: &str,
    _old: Option<&str>,
    regex: &Regex,
    message: &str,
) -> ErrorList {
    if value.is_empty() || regex.is_match(value) {
        return ErrorList::new();
    }
    FieldError::invalid(path, value, message).into()
}

pub fn no_extra_whitespace(_op: Operation, path: &FieldPath, value: &str, _old: Option<&str>) -> ErrorList {
    if value.trim() != value {
        return FieldError::invalid(path, value, "must not contain extra whitespace").into();
    }
    ErrorList::new()
}

/// An IPv4 network in CIDR notation written at its base address.
pub fn cidr_v4(_op: Operation, path: &FieldPath, value: &str, _old: Option<&str>) -> ErrorList {
    if value.is_empty() {
        return ErrorList::new();
    }
    let net: hcp_core::IpNet = match value.parse() {
        Ok(net) => net,
        Err(e) => return FieldError::invalid(path, value, e.to_string()).into(),
    };
    if !net.is_ipv4() {
        return FieldError::invalid(path, value, "not IPv4").into();
    }
    if net.has_host_bits() {
        return FieldError::invalid(path, value, "not IPv4 CIDR").into();
    }
    ErrorList::new()
}

/// A bare IPv4 address.
pub fn ipv4(_op: Operation, path: &FieldPath, value: &str, _old: Option<&str>) -> ErrorList {
    if value.is_empty() {
        return ErrorList::new();
    }
    match value.parse::<std::net::IpAddr>() {
        Err(_) => FieldError::invalid(path, value, "not an IP").into(),
        Ok(ip) if !ip.is_ipv4() => FieldError::invalid(path, value, "not IPv4").into(),
        Ok(_) => ErrorList::new(),
    }
}

/// At least one certificate block must parse as an X.509 certificate, the
/// same bar a certificate pool applies when loading PEM. Blocks that do not
/// parse are skipped. Chains are not verified.
pub fn pem(_op: Operation, path: &FieldPath, value: &str, _old: Option<&str>) -> ErrorList {
    if value.is_empty() {
        return ErrorList::new();
    }
    let mut reader = value.as_bytes();
    let loaded = rustls_pemfile::certs(&mut reader)
        .filter_map(Result::ok)
        .any(|der| is_x509_certificate(der.as_ref()));
    if !loaded {
        return FieldError::invalid(path, value, "not a valid PEM").into();
    }
    ErrorList::new()
}

fn is_x509_certificate(der: &[u8]) -> bool {
    matches!(x509_parser::parse_x509_certificate(der), Ok((rest, _)) if rest.is_empty())
}

// ---------------------------------------------------------------------------
// OpenShift versions
// ---------------------------------------------------------------------------

/// Parse `MAJOR[.MINOR[.PATCH]][-pre][+build]`, with an optional `v`.
fn parse_version(value: &str) -> Option<semver::Version> {
    let trimmed = value.strip_prefix('v').unwrap_or(value);
    let split = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (core, suffix) = trimmed.split_at(split);
    let mut parts: Vec<&str> = core.split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    while parts.len() < 3 {
        parts.push("0");
    }
    semver::Version::parse(&format!("{}{suffix}", parts.join("."))).ok()
}

fn openshift_version(path: &FieldPath, value: &str, allow_micro: bool) -> ErrorList {
    if value.is_empty() {
        return ErrorList::new();
    }
    if parse_version(value).is_none() {
        return FieldError::invalid(path, value, format!("Malformed version: {value}")).into();
    }
    if !allow_micro && value.splitn(3, '.').count() > 2 {
        return FieldError::invalid(
            path,
            value,
            "must be specified as MAJOR.MINOR; the PATCH value is managed",
        )
        .into();
    }
    ErrorList::new()
}

/// A semantic version without a patch component.
pub fn openshift_version_without_micro(
    _op: Operation,
    path: &FieldPath,
    value: &str,
    _old: Option<&str>,
) -> ErrorList {
    openshift_version(path, value, false)
}

/// A semantic version; the patch component is optional.
pub fn openshift_version_with_optional_micro(
    _op: Operation,
    path: &FieldPath,
    value: &str,
    _old: Option<&str>,
) -> ErrorList {
    openshift_version(path, value, true)
}

// ---------------------------------------------------------------------------
// Kubernetes names
// ---------------------------------------------------------------------------

fn regex_error(fmt: &str, examples: &[&str]) -> String {
    let examples: Vec<String> = examples.iter().map(|e| format!("'{e}'")).collect();
    format!(
        "consist of alphanumeric characters, '-', '_' or '.', and must start and end with an alphanumeric character (e.g. {}, regex used for validation is '{fmt}')",
        examples.join(",  or ")
    )
}

fn qualified_name_problems(value: &str) -> Vec<String> {
    let mut problems = Vec::new();
    let parts: Vec<&str> = value.split('/').collect();
    let name = match parts.as_slice() {
        [name] => *name,
        [prefix, name] => {
            if prefix.is_empty() {
                problems.push("prefix part must be non-empty".to_string());
            } else {
                if prefix.len() > DNS1123_SUBDOMAIN_MAX_LEN {
                    problems.push(format!(
                        "prefix part must be no more than {DNS1123_SUBDOMAIN_MAX_LEN} characters"
                    ));
                }
                if !DNS1123_SUBDOMAIN.is_match(prefix) {
                    problems.push(format!(
                        "prefix part a lowercase RFC 1123 subdomain must consist of lower case alphanumeric characters, '-' or '.', and must start and end with an alphanumeric character (e.g. 'example.com', regex used for validation is '{DNS1123_SUBDOMAIN_FMT}')"
                    ));
                }
            }
            *name
        }
        _ => {
            return vec![format!(
                "a qualified name must {} with an optional DNS subdomain prefix and '/' (e.g. 'example.com/MyName')",
                regex_error(QUALIFIED_NAME_FMT, &["MyName", "my.name", "123-abc"])
            )];
        }
    };

    if name.is_empty() {
        problems.push("name part must be non-empty".to_string());
    } else if name.len() > QUALIFIED_NAME_MAX_LEN {
        problems.push(format!("name part must be no more than {QUALIFIED_NAME_MAX_LEN} characters"));
    }
    if !QUALIFIED_NAME.is_match(name) {
        problems.push(format!(
            "name part must {}",
            regex_error(QUALIFIED_NAME_FMT, &["MyName", "my.name", "123-abc"])
        ));
    }
    problems
}

/// A Kubernetes qualified name: `[prefix/]name`, as used by label keys and
/// taint keys.
pub fn kube_qualified_name(_op: Operation, path: &FieldPath, value: &str, _old: Option<&str>) -> ErrorList {
    qualified_name_problems(value)
        .into_iter()
        .map(|msg| FieldError::invalid(path, value, msg))
        .collect()
}

/// A Kubernetes label value. Empty is allowed.
pub fn kube_label_value(_op: Operation, path: &FieldPath, value: &str, _old: Option<&str>) -> ErrorList {
    let mut errs = ErrorList::new();
    if value.len() > LABEL_VALUE_MAX_LEN {
        errs.push(FieldError::invalid(
            path,
            value,
            format!("must be no more than {LABEL_VALUE_MAX_LEN} characters"),
        ));
    }
    if !LABEL_VALUE.is_match(value) {
        errs.push(FieldError::invalid(
            path,
            value,
            format!(
                "a valid label must be an empty string or {}",
                regex_error(LABEL_VALUE_FMT, &["MyValue", "my_value", "12345"])
            ),
        ));
    }
    errs
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// A signature-compatible check over `T`.
pub type Check<'a, T> = &'a dyn Fn(Operation, &FieldPath, &T, Option<&T>) -> ErrorList;

/// Passes when any check passes; otherwise every check's errors, in order.
pub fn or<T: ?Sized>(
    op: Operation,
    path: &FieldPath,
    value: &T,
    old: Option<&T>,
    checks: &[Check<'_, T>],
) -> ErrorList {
    let mut errs = ErrorList::new();
    for check in checks {
        let found = check(op, path, value, old);
        if found.is_empty() {
            return ErrorList::new();
        }
        errs.append(found);
    }
    errs
}
