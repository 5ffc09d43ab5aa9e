//! Subscription registration rules.
//!
//! Unlike the other resource checks, every problem with the subscription ID
//! is reported, not just the first.

use hcp_api::enums::SubscriptionState;
use hcp_api::resource_types::SUBSCRIPTION;
use hcp_api::Subscription;
use hcp_core::{ErrorList, FieldError, FieldPath, ResourceId};
use uuid::Uuid;

use crate::immutable::immutable;
use crate::primitives::{enum_value, no_extra_whitespace};
use crate::validator::Ctx;

pub(crate) fn validate_subscription(
    cx: Ctx<'_>,
    new: &Subscription,
    old: Option<&Subscription>,
) -> ErrorList {
    let op = cx.op;
    let id = FieldPath::new("id");
    let mut errs = match &new.id {
        Some(resource_id) => validate_subscription_id(&id, resource_id),
        None => FieldError::required(&id, "").into(),
    };
    errs.append(immutable(op, &id, &new.id, old.map(|o| &o.id)));

    let registration_date = FieldPath::new("registrationDate");
    match &new.registration_date {
        Some(date) => errs.append(no_extra_whitespace(op, &registration_date, date, None)),
        None => errs.push(FieldError::required(&registration_date, "")),
    }

    errs.append(enum_value::<SubscriptionState>(
        op,
        &FieldPath::new("state"),
        &new.state,
        old.map(|o| &o.state),
    ));
    errs
}

fn validate_subscription_id(path: &FieldPath, id: &ResourceId) -> ErrorList {
    let mut errs = ErrorList::new();
    let mut invalid = |detail: String| errs.push(FieldError::invalid(path, id.as_str(), detail));

    if id.subscription_id().is_empty() {
        invalid("subscription ID is required".to_string());
    }
    if id.name().is_empty() {
        invalid("resource name is required".to_string());
    }
    if !id.resource_type().matches(SUBSCRIPTION) {
        invalid(format!("resource ID must reference an instance of type {SUBSCRIPTION:?}"));
    }
    if !id.resource_group_name().is_empty() {
        invalid("resource group must be empty".to_string());
    }
    if !id.subscription_id().is_empty() {
        if let Err(e) = Uuid::parse_str(id.subscription_id()) {
            invalid(format!("invalid UUID: {e}"));
        }
    }
    errs
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcp_api::fixtures;
    use hcp_core::{EqualityStrategies, ErrorKind, Operation};

    fn run(op: Operation, new: &Subscription, old: Option<&Subscription>) -> ErrorList {
        let strategies = EqualityStrategies::default();
        validate_subscription(Ctx { op, strategies: &strategies }, new, old)
    }

    fn create(new: &Subscription) -> ErrorList {
        run(Operation::Create, new, None)
    }

    fn with_id(raw: &str) -> Subscription {
        Subscription {
            id: Some(ResourceId::new(raw).unwrap()),
            ..fixtures::valid_subscription()
        }
    }

    fn details(errs: &ErrorList) -> Vec<&str> {
        errs.iter().map(|e| e.detail.as_str()).collect()
    }

    #[test]
    fn valid_subscription_passes() {
        let errs = create(&fixtures::valid_subscription());
        assert!(errs.is_empty(), "{errs}");
    }

    #[test]
    fn missing_id_is_required() {
        let sub = Subscription {
            id: None,
            ..fixtures::valid_subscription()
        };
        let errs = create(&sub);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs.errors()[0].path.to_string(), "id");
        assert_eq!(errs.errors()[0].kind, ErrorKind::Required);
    }

    #[test]
    fn cluster_id_accumulates_every_problem() {
        let errs = create(&with_id(
            "/subscriptions/test-sub/resourceGroups/test-rg/providers/Microsoft.RedHatOpenShift/hcpOpenShiftClusters/test-cluster",
        ));
        let details = details(&errs);
        assert_eq!(details.len(), 3, "{errs}");
        assert_eq!(
            details[0],
            r#"resource ID must reference an instance of type "Microsoft.Resources/subscriptions""#
        );
        assert_eq!(details[1], "resource group must be empty");
        assert!(details[2].starts_with("invalid UUID"));
        assert!(errs.iter().all(|e| e.path.to_string() == "id"));
    }

    #[test]
    fn blank_id_reports_missing_components() {
        let sub = Subscription {
            id: Some(ResourceId::default()),
            ..fixtures::valid_subscription()
        };
        let errs = create(&sub);
        assert_eq!(
            details(&errs),
            [
                "subscription ID is required",
                "resource name is required",
                r#"resource ID must reference an instance of type "Microsoft.Resources/subscriptions""#,
            ]
        );
    }

    #[test]
    fn subscription_id_must_be_uuid() {
        let errs = create(&with_id("/subscriptions/invalid-uuid"));
        assert_eq!(errs.len(), 1);
        assert!(errs.errors()[0].detail.starts_with("invalid UUID"));
    }

    #[test]
    fn registration_date_presence_and_whitespace() {
        let mut sub = fixtures::valid_subscription();
        sub.registration_date = None;
        let errs = create(&sub);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs.errors()[0].kind, ErrorKind::Required);

        sub.registration_date = Some(String::new());
        assert!(create(&sub).is_empty());

        for date in [" 2023-01-01T00:00:00Z", "\t2023-01-01T00:00:00Z\t", "   "] {
            sub.registration_date = Some(date.to_string());
            let errs = create(&sub);
            assert_eq!(details(&errs), ["must not contain extra whitespace"], "{date:?}");
        }
    }

    #[test]
    fn unknown_state_reported_at_state() {
        let mut sub = fixtures::valid_subscription();
        sub.state = SubscriptionState::new("Frozen");
        let errs = create(&sub);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs.errors()[0].path.to_string(), "state");
        assert_eq!(errs.errors()[0].kind, ErrorKind::NotSupported);
    }

    #[test]
    fn id_is_immutable() {
        let old = fixtures::valid_subscription();
        let new = with_id("/subscriptions/87654321-4321-4321-4321-210987654321");
        let errs = run(Operation::Update, &new, Some(&old));
        assert_eq!(errs.len(), 1);
        assert_eq!(errs.errors()[0].kind, ErrorKind::Immutable);
    }
}
