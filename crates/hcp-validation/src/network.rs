//! Overlap between a resource's address ranges.

use hcp_core::{ErrorList, FieldError, FieldPath, IpNet};

/// A CIDR-valued field and the name used for it in messages.
#[derive(Debug, Clone, Copy)]
pub struct NamedCidr<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

impl<'a> NamedCidr<'a> {
    pub fn new(name: &'a str, value: &'a str) -> Self {
        Self { name, value }
    }
}

/// Report every pair of ranges where one range contains the other's base
/// address, in input order. Values that do not parse are skipped; the
/// CIDR check on the field itself reports them.
pub fn cidr_overlap(path: &FieldPath, cidrs: &[NamedCidr<'_>]) -> ErrorList {
    let parsed: Vec<(NamedCidr<'_>, IpNet)> = cidrs
        .iter()
        .filter_map(|c| c.value.parse::<IpNet>().ok().map(|net| (*c, net)))
        .collect();

    let mut errs = ErrorList::new();
    for (i, (a, a_net)) in parsed.iter().enumerate() {
        for (b, b_net) in &parsed[i + 1..] {
            if a_net.intersects(b_net) {
                errs.push(FieldError::invalid(
                    path,
                    a.value,
                    format!(
                        "{} CIDR '{}' and {} CIDR '{}' overlap",
                        a.name, a.value, b.name, b.value
                    ),
                ));
            }
        }
    }
    errs
}
