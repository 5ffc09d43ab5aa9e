//! Rules for the ARM envelope and managed identities shared by entities.

use hcp_api::enums::ManagedServiceIdentityType;
use hcp_api::resource_types::USER_ASSIGNED_IDENTITY;
use hcp_api::{ManagedServiceIdentity, ProxyResource, Resource, TrackedResource, UserAssignedIdentity};
use hcp_core::{ErrorList, FieldPath};

use crate::each::{each_map_key, each_map_value};
use crate::immutable::immutable;
use crate::primitives::{enum_value, required};
use crate::resource_id::restricted_resource_id;
use crate::validator::Ctx;

pub(crate) fn validate_resource(
    cx: Ctx<'_>,
    path: &FieldPath,
    new: &Resource,
    old: Option<&Resource>,
) -> ErrorList {
    let mut errs = required(cx.op, &path.child("id"), &new.id, old.map(|o| &o.id));

    let created_at = new.system_data.as_ref().and_then(|s| s.created_at);
    let old_created_at = old.map(|o| o.system_data.as_ref().and_then(|s| s.created_at));
    errs.append(cx.immutable_by_structure(
        &path.child("systemData").child("createdAt"),
        &created_at,
        old_created_at.as_ref(),
    ));
    errs
}

pub(crate) fn validate_tracked_resource(
    cx: Ctx<'_>,
    path: &FieldPath,
    new: &TrackedResource,
    old: Option<&TrackedResource>,
) -> ErrorList {
    let mut errs = validate_resource(cx, &path.child("resource"), &new.resource, old.map(|o| &o.resource));

    let location = path.child("location");
    let old_location = old.map(|o| &o.location);
    errs.append(required(cx.op, &location, &new.location, old_location));
    errs.append(immutable(cx.op, &location, &new.location, old_location));
    errs
}

pub(crate) fn validate_proxy_resource(
    cx: Ctx<'_>,
    path: &FieldPath,
    new: &ProxyResource,
    old: Option<&ProxyResource>,
) -> ErrorList {
    validate_resource(cx, &path.child("resource"), &new.resource, old.map(|o| &o.resource))
}

pub(crate) fn validate_managed_service_identity(
    cx: Ctx<'_>,
    path: &FieldPath,
    new: &ManagedServiceIdentity,
    old: Option<&ManagedServiceIdentity>,
) -> ErrorList {
    let op = cx.op;
    let mut errs = immutable(
        op,
        &path.child("principalId"),
        &new.principal_id,
        old.map(|o| &o.principal_id),
    );
    errs.append(immutable(op, &path.child("tenantId"), &new.tenant_id, old.map(|o| &o.tenant_id)));

    errs.append(required(op, &path.child("type"), &new.identity_type, None));
    // Reported under the name older API versions used for this field.
    errs.append(enum_value::<ManagedServiceIdentityType>(
        op,
        &path.child("state"),
        &new.identity_type,
        old.map(|o| &o.identity_type),
    ));

    let identities = path.child("userAssignedIdentities");
    let old_identities = old.map(|o| &o.user_assigned_identities);
    errs.append(each_map_key(op, &identities, &new.user_assigned_identities, old_identities, |op, p, k, _| {
        required(op, p, &k, None)
    }));
    errs.append(each_map_key(op, &identities, &new.user_assigned_identities, old_identities, |op, p, k, o| {
        restricted_resource_id(op, p, k, o, USER_ASSIGNED_IDENTITY)
    }));
    errs.append(each_map_value(
        op,
        &identities,
        &new.user_assigned_identities,
        old_identities,
        |op, p, value, old_value| match value {
            Some(value) => validate_user_assigned_identity(op, p, value, old_value.and_then(Option::as_ref)),
            None => ErrorList::new(),
        },
    ));
    errs
}

fn validate_user_assigned_identity(
    op: hcp_core::Operation,
    path: &FieldPath,
    new: &UserAssignedIdentity,
    old: Option<&UserAssignedIdentity>,
) -> ErrorList {
    let mut errs = immutable(op, &path.child("clientId"), &new.client_id, old.map(|o| &o.client_id));
    errs.append(immutable(
        op,
        &path.child("principalId"),
        &new.principal_id,
        old.map(|o| &o.principal_id),
    ));
    errs
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcp_api::SystemData;
    use hcp_core::{EqualityStrategies, ErrorKind, Operation};

    fn ctx(op: Operation, strategies: &EqualityStrategies) -> Ctx<'_> {
        Ctx { op, strategies }
    }

    #[test]
    fn tracked_resource_requires_id_and_location() {
        let strategies = EqualityStrategies::default();
        let errs = validate_tracked_resource(
            ctx(Operation::Create, &strategies),
            &FieldPath::new("trackedResource"),
            &TrackedResource::default(),
            None,
        );
        let paths: Vec<String> = errs.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(paths, ["trackedResource.resource.id", "trackedResource.location"]);
        assert!(errs.iter().all(|e| e.kind == ErrorKind::Required));
    }

    #[test]
    fn creation_time_compares_in_utc() {
        let strategies = EqualityStrategies::default();
        let stamp = |s: &str| Resource {
            system_data: Some(SystemData {
                created_at: Some(chrono::DateTime::parse_from_rfc3339(s).unwrap()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let old = stamp("2025-01-01T00:00:00Z");
        let same = stamp("2025-01-01T01:00:00+01:00");
        let other = stamp("2025-01-02T00:00:00Z");
        let path = FieldPath::new("resource");
        let cx = ctx(Operation::Update, &strategies);

        let errs = validate_resource(cx, &path, &same, Some(&old));
        assert!(errs.at("resource.systemData.createdAt").next().is_none(), "{errs}");
        let errs = validate_resource(cx, &path, &other, Some(&old));
        assert_eq!(errs.at("resource.systemData.createdAt").count(), 1);
    }

    #[test]
    fn identity_type_enum_reported_at_state() {
        let strategies = EqualityStrategies::default();
        let msi = ManagedServiceIdentity {
            identity_type: ManagedServiceIdentityType::new("Bogus"),
            ..Default::default()
        };
        let errs = validate_managed_service_identity(
            ctx(Operation::Create, &strategies),
            &FieldPath::new("identity"),
            &msi,
            None,
        );
        assert_eq!(errs.len(), 1);
        assert_eq!(errs.errors()[0].path.to_string(), "identity.state");
        assert_eq!(errs.errors()[0].kind, ErrorKind::NotSupported);
    }

    #[test]
    fn user_assigned_identity_details_are_immutable() {
        let strategies = EqualityStrategies::default();
        let key = hcp_api::fixtures::test_user_assigned_identity("a");
        let with_client = |client: &str| ManagedServiceIdentity {
            identity_type: ManagedServiceIdentityType::USER_ASSIGNED,
            user_assigned_identities: [(
                key.clone(),
                Some(UserAssignedIdentity {
                    client_id: Some(client.to_string()),
                    principal_id: None,
                }),
            )]
            .into(),
            ..Default::default()
        };
        let errs = validate_managed_service_identity(
            ctx(Operation::Update, &strategies),
            &FieldPath::new("identity"),
            &with_client("new"),
            Some(&with_client("old")),
        );
        assert_eq!(errs.len(), 1);
        assert_eq!(
            errs.errors()[0].path.to_string(),
            format!("identity.userAssignedIdentities[{key}].clientId")
        );
    }
}
