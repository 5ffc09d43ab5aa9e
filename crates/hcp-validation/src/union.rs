//! Discriminated unions: a member field that must be set exactly when a
//! discriminator field holds a particular value.

use hcp_core::{ErrorList, FieldError, FieldPath, Operation};

#[derive(Debug, Clone, Copy)]
pub struct DiscriminatedUnion<'a> {
    /// JSON name of the discriminator field.
    pub discriminator: &'a str,
    /// JSON name of the member field.
    pub member: &'a str,
    /// API token for the selecting value, as clients spell it.
    pub token: &'a str,
    /// Internal discriminator value that requires the member. This is the
    /// spelling that is compared.
    pub value: &'a str,
}

impl<'a> DiscriminatedUnion<'a> {
    /// `spellings` is `[api token, internal value]`.
    pub const fn new(discriminator: &'a str, member: &'a str, spellings: [&'a str; 2]) -> Self {
        Self {
            discriminator,
            member,
            token: spellings[0],
            value: spellings[1],
        }
    }

    /// Check one union instance. `path` addresses the struct holding both
    /// fields; errors are reported at the member.
    ///
    /// `old` carries the previous discriminant and presence. On update an
    /// instance with neither changed is accepted.
    pub fn validate(
        &self,
        op: Operation,
        path: &FieldPath,
        discriminant: &str,
        is_set: bool,
        old: Option<(&str, bool)>,
    ) -> ErrorList {
        if op.is_update() && old == Some((discriminant, is_set)) {
            return ErrorList::new();
        }
        let member = path.child(self.member);
        let selected = discriminant == self.value;
        if selected && !is_set {
            return FieldError::invalid(
                &member,
                "",
                format!("must be specified when `{}` is {:?}", self.discriminator, self.value),
            )
            .into();
        }
        if !selected && is_set {
            return FieldError::invalid(
                &member,
                "",
                format!("may only be specified when `{}` is {:?}", self.discriminator, self.value),
            )
            .into();
        }
        ErrorList::new()
    }
}
