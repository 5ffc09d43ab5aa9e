//! Azure resource identifier checks.
//!
//! String-valued fields are parsed here; a parse failure is reported once
//! and skips every check that needs the parsed form. Comparisons of
//! subscriptions, resource groups and types ignore case.

use hcp_core::{ErrorList, FieldError, FieldPath, Operation, ResourceId};

/// Required components and optional type restriction, first failure only.
fn check_components(path: &FieldPath, id: &ResourceId, resource_type: Option<&str>) -> ErrorList {
    let problem = if id.subscription_id().is_empty() {
        "subscription ID is required".to_string()
    } else if id.resource_group_name().is_empty() {
        "resource group is required".to_string()
    } else if id.name().is_empty() {
        "resource name is required".to_string()
    } else {
        match resource_type {
            Some(expected) if !id.resource_type().matches(expected) => {
                format!("resource ID must reference an instance of type {expected:?}")
            }
            _ => return ErrorList::new(),
        }
    };
    FieldError::invalid(path, id.as_str(), problem).into()
}

fn parse(path: &FieldPath, value: &str) -> Result<ResourceId, ErrorList> {
    ResourceId::new(value).map_err(|e| FieldError::invalid(path, value, e.to_string()).into())
}

/// A well-formed identifier with subscription, resource group and name.
pub fn resource_id(_op: Operation, path: &FieldPath, value: &str, _old: Option<&str>) -> ErrorList {
    if value.is_empty() {
        return ErrorList::new();
    }
    match parse(path, value) {
        Ok(id) => check_components(path, &id, None),
        Err(errs) => errs,
    }
}

/// [`resource_id`] that must also reference an instance of `resource_type`.
pub fn restricted_resource_id(
    _op: Operation,
    path: &FieldPath,
    value: &str,
    _old: Option<&str>,
    resource_type: &str,
) -> ErrorList {
    if value.is_empty() {
        return ErrorList::new();
    }
    match parse(path, value) {
        Ok(id) => check_components(path, &id, Some(resource_type)),
        Err(errs) => errs,
    }
}

/// Type restriction for an identifier that was parsed on deserialization.
pub fn restricted_resource_id_with_resource_group(
    _op: Operation,
    path: &FieldPath,
    value: Option<&ResourceId>,
    _old: Option<&ResourceId>,
    resource_type: &str,
) -> ErrorList {
    match value {
        Some(id) => check_components(path, id, Some(resource_type)),
        None => ErrorList::new(),
    }
}

pub fn same_subscription(
    _op: Operation,
    path: &FieldPath,
    value: &str,
    _old: Option<&str>,
    subscription_id: &str,
) -> ErrorList {
    if value.is_empty() {
        return ErrorList::new();
    }
    let id = match parse(path, value) {
        Ok(id) => id,
        Err(errs) => return errs,
    };
    if !id.subscription_id().eq_ignore_ascii_case(subscription_id) {
        return FieldError::invalid(
            path,
            value,
            format!("must be in the same Azure subscription: {subscription_id:?}"),
        )
        .into();
    }
    ErrorList::new()
}

fn same_resource_group(path: &FieldPath, value: &str, actual: &str, resource_group: &str) -> ErrorList {
    if actual.eq_ignore_ascii_case(resource_group) {
        return FieldError::invalid(
            path,
            value,
            format!("must not be the same resource group name: {resource_group:?}"),
        )
        .into();
    }
    ErrorList::new()
}

/// A resource group name field that must differ from `resource_group`.
pub fn different_resource_group_name(
    _op: Operation,
    path: &FieldPath,
    value: &str,
    _old: Option<&str>,
    resource_group: &str,
) -> ErrorList {
    if value.is_empty() {
        return ErrorList::new();
    }
    same_resource_group(path, value, value, resource_group)
}

/// An identifier whose resource group must differ from `resource_group`.
pub fn different_resource_group_name_from_resource_id(
    _op: Operation,
    path: &FieldPath,
    value: &str,
    _old: Option<&str>,
    resource_group: &str,
) -> ErrorList {
    if value.is_empty() {
        return ErrorList::new();
    }
    match parse(path, value) {
        Ok(id) => same_resource_group(path, value, id.resource_group_name(), resource_group),
        Err(errs) => errs,
    }
}

/// A user-assigned identity must live in the cluster's subscription and
/// outside the managed resource group.
pub fn user_assigned_identity_location(
    op: Operation,
    path: &FieldPath,
    value: &str,
    old: Option<&str>,
    subscription_id: &str,
    managed_resource_group: &str,
) -> ErrorList {
    if value.is_empty() {
        return ErrorList::new();
    }
    let mut errs = same_subscription(op, path, value, old, subscription_id);
    errs.append(different_resource_group_name_from_resource_id(
        op,
        path,
        value,
        old,
        managed_resource_group,
    ));
    errs
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcp_api::fixtures;
    use hcp_api::resource_types::{SUBNET, USER_ASSIGNED_IDENTITY};

    const CREATE: Operation = Operation::Create;

    fn path() -> FieldPath {
        FieldPath::new("id")
    }

    fn details(errs: &ErrorList) -> Vec<&str> {
        errs.iter().map(|e| e.detail.as_str()).collect()
    }

    #[test]
    fn empty_value_is_not_checked() {
        assert!(resource_id(CREATE, &path(), "", None).is_empty());
        assert!(restricted_resource_id(CREATE, &path(), "", None, SUBNET).is_empty());
    }

    #[test]
    fn parse_failure_reports_parser_message() {
        let errs = resource_id(CREATE, &path(), "not-an-id", None);
        assert_eq!(errs.len(), 1);
        assert!(errs.errors()[0].detail.contains("must start with '/'"));
    }

    #[test]
    fn components_checked_in_order() {
        let errs = resource_id(CREATE, &path(), "/subscriptions/sub", None);
        assert_eq!(details(&errs), ["resource group is required"]);
        let errs = resource_id(CREATE, &path(), "/subscriptions/sub/resourceGroups/rg", None);
        assert!(errs.is_empty(), "{errs}");
    }

    #[test]
    fn restricted_type_is_case_insensitive() {
        let subnet = fixtures::test_subnet_id();
        assert!(restricted_resource_id(CREATE, &path(), &subnet, None, SUBNET).is_empty());
        assert!(restricted_resource_id(CREATE, &path(), &subnet.to_lowercase(), None, SUBNET).is_empty());
        let errs = restricted_resource_id(CREATE, &path(), &subnet, None, USER_ASSIGNED_IDENTITY);
        assert_eq!(
            details(&errs),
            [r#"resource ID must reference an instance of type "Microsoft.ManagedIdentity/userAssignedIdentities""#]
        );
    }

    #[test]
    fn parsed_identifier_restriction() {
        let id = fixtures::test_cluster_id();
        let errs =
            restricted_resource_id_with_resource_group(CREATE, &path(), Some(&id), None, SUBNET);
        assert_eq!(errs.len(), 1);
        assert!(restricted_resource_id_with_resource_group(CREATE, &path(), None, None, SUBNET).is_empty());
    }

    #[test]
    fn cross_resource_rules() {
        let subnet = fixtures::test_subnet_id();
        assert!(same_subscription(CREATE, &path(), &subnet, None, fixtures::TEST_SUBSCRIPTION_ID).is_empty());
        let errs = same_subscription(CREATE, &path(), &subnet, None, fixtures::TEST_ALT_SUBSCRIPTION_ID);
        assert_eq!(
            details(&errs),
            [r#"must be in the same Azure subscription: "22222222-2222-2222-2222-222222222222""#]
        );

        let errs = different_resource_group_name_from_resource_id(
            CREATE,
            &path(),
            &subnet,
            None,
            &fixtures::TEST_RESOURCE_GROUP_NAME.to_uppercase(),
        );
        assert_eq!(errs.len(), 1);
        assert!(different_resource_group_name(CREATE, &path(), "rg", None, "RG").len() == 1);
        assert!(different_resource_group_name(CREATE, &path(), "rg", None, "other").is_empty());
    }

    #[test]
    fn identity_location_accumulates_both_checks() {
        let identity = fixtures::test_user_assigned_identity("id");
        let errs = user_assigned_identity_location(
            CREATE,
            &path(),
            &identity,
            None,
            fixtures::TEST_ALT_SUBSCRIPTION_ID,
            fixtures::TEST_RESOURCE_GROUP_NAME,
        );
        assert_eq!(errs.len(), 2);
    }
}
