//! # Structural Equality Strategies
//!
//! Immutability checks on composite values compare them field by field.
//! Most leaves compare with `PartialEq`, but some types need their own
//! notion of "unchanged": a timestamp re-rendered in another offset names
//! the same instant and is still the same value.
//!
//! [`EqualityStrategies`] is the explicit registry of those per-type rules.
//! It is built once, handed to the validator, and consulted by every
//! [`StructuralEq`] leaf comparison.

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};

use crate::cidr::IpNet;
use crate::resource_id::ResourceId;

type EqFn = Box<dyn Fn(&dyn Any, &dyn Any) -> bool + Send + Sync>;

/// Registry of custom equality functions keyed by value type.
pub struct EqualityStrategies {
    funcs: HashMap<TypeId, (&'static str, EqFn)>,
}

impl EqualityStrategies {
    /// A registry with no strategies; every leaf uses `PartialEq`.
    pub fn empty() -> Self {
        Self {
            funcs: HashMap::new(),
        }
    }

    /// Register `eq` as the equality for `T`, replacing any earlier entry.
    pub fn register<T: Any>(&mut self, eq: fn(&T, &T) -> bool) -> &mut Self {
        let wrapped: EqFn = Box::new(move |a: &dyn Any, b: &dyn Any| {
            match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
                (Some(a), Some(b)) => eq(a, b),
                _ => false,
            }
        });
        let name = std::any::type_name::<T>();
        if self.funcs.insert(TypeId::of::<T>(), (name, wrapped)).is_some() {
            tracing::warn!(value_type = name, "replaced registered equality strategy");
        }
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<T: Any>(mut self, eq: fn(&T, &T) -> bool) -> Self {
        self.register(eq);
        self
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.funcs.contains_key(&TypeId::of::<T>())
    }

    /// Compare two leaf values with the registered strategy for `T`, or
    /// `PartialEq` when none is registered.
    pub fn leaf_eq<T: Any + PartialEq>(&self, a: &T, b: &T) -> bool {
        match self.funcs.get(&TypeId::of::<T>()) {
            Some((_, eq)) => eq(a, b),
            None => a == b,
        }
    }

    /// Structural comparison of two values of any participating type.
    pub fn equal<T: StructuralEq + ?Sized>(&self, a: &T, b: &T) -> bool {
        a.structural_eq(b, self)
    }
}

/// Two timestamps are the same value when they name the same instant after
/// normalizing to UTC, down to the nanosecond.
fn same_utc_instant(a: &DateTime<FixedOffset>, b: &DateTime<FixedOffset>) -> bool {
    a.with_timezone(&Utc) == b.with_timezone(&Utc)
}

fn same_instant(a: &DateTime<Utc>, b: &DateTime<Utc>) -> bool {
    a == b
}

impl Default for EqualityStrategies {
    fn default() -> Self {
        Self::empty()
            .with::<DateTime<FixedOffset>>(same_utc_instant)
            .with::<DateTime<Utc>>(same_instant)
    }
}

impl fmt::Debug for EqualityStrategies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.funcs.values().map(|(name, _)| *name).collect();
        names.sort_unstable();
        f.debug_struct("EqualityStrategies")
            .field("types", &names)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// StructuralEq
// ---------------------------------------------------------------------------

/// Deep equality that defers leaf comparisons to an [`EqualityStrategies`].
pub trait StructuralEq {
    fn structural_eq(&self, other: &Self, strategies: &EqualityStrategies) -> bool;
}

/// Implement [`StructuralEq`] for leaf types through the strategy registry.
#[macro_export]
macro_rules! impl_structural_leaf {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::equality::StructuralEq for $ty {
                fn structural_eq(
                    &self,
                    other: &Self,
                    strategies: &$crate::equality::EqualityStrategies,
                ) -> bool {
                    strategies.leaf_eq(self, other)
                }
            }
        )+
    };
}

/// Implement [`StructuralEq`] for a struct by comparing the listed fields.
///
/// Every field of the struct must be listed.
#[macro_export]
macro_rules! impl_structural_eq {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::equality::StructuralEq for $ty {
            #[allow(unused_variables)]
            fn structural_eq(
                &self,
                other: &Self,
                strategies: &$crate::equality::EqualityStrategies,
            ) -> bool {
                true $(&& $crate::equality::StructuralEq::structural_eq(
                    &self.$field,
                    &other.$field,
                    strategies,
                ))*
            }
        }
    };
}

impl_structural_leaf!(
    String,
    bool,
    i32,
    i64,
    u32,
    u64,
    ResourceId,
    IpNet,
    DateTime<FixedOffset>,
    DateTime<Utc>,
);

impl<T: StructuralEq> StructuralEq for Option<T> {
    fn structural_eq(&self, other: &Self, strategies: &EqualityStrategies) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.structural_eq(b, strategies),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: StructuralEq> StructuralEq for Box<T> {
    fn structural_eq(&self, other: &Self, strategies: &EqualityStrategies) -> bool {
        (**self).structural_eq(other, strategies)
    }
}

impl<T: StructuralEq> StructuralEq for Vec<T> {
    fn structural_eq(&self, other: &Self, strategies: &EqualityStrategies) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other)
                .all(|(a, b)| a.structural_eq(b, strategies))
    }
}

impl<K: Ord, V: StructuralEq> StructuralEq for BTreeMap<K, V> {
    fn structural_eq(&self, other: &Self, strategies: &EqualityStrategies) -> bool {
        self.len() == other.len()
            && self.iter().all(|(k, a)| {
                other
                    .get(k)
                    .is_some_and(|b| a.structural_eq(b, strategies))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Audit {
        created_at: Option<DateTime<FixedOffset>>,
        tags: BTreeMap<String, String>,
        owners: Vec<String>,
    }

    impl_structural_eq!(Audit { created_at, tags, owners });

    fn audit(created_at: &str) -> Audit {
        Audit {
            created_at: Some(ts(created_at)),
            tags: BTreeMap::from([("env".to_string(), "prod".to_string())]),
            owners: vec!["team-a".to_string()],
        }
    }

    #[test]
    fn default_strategies_compare_timestamps_as_utc_instants() {
        let strategies = EqualityStrategies::default();
        assert!(strategies.contains::<DateTime<FixedOffset>>());
        assert!(strategies.equal(
            &ts("2024-05-01T10:00:00.250Z"),
            &ts("2024-05-01T12:00:00.250+02:00")
        ));
        assert!(!strategies.equal(&ts("2024-05-01T10:00:01Z"), &ts("2024-05-01T10:00:00Z")));
    }

    #[test]
    fn sub_second_changes_are_not_equal() {
        let strategies = EqualityStrategies::default();
        assert!(!strategies.equal(
            &ts("2024-05-01T12:00:00.100Z"),
            &ts("2024-05-01T12:00:00.900Z")
        ));
        let utc = |s: &str| ts(s).with_timezone(&Utc);
        assert!(!strategies.equal(&utc("2024-05-01T12:00:00.100Z"), &utc("2024-05-01T12:00:00.900Z")));
    }

    #[test]
    fn empty_strategies_fall_back_to_partial_eq() {
        let strategies = EqualityStrategies::empty();
        assert!(!strategies.contains::<DateTime<FixedOffset>>());
        assert!(!strategies.equal(
            &ts("2024-05-01T10:00:00.250Z"),
            &ts("2024-05-01T10:00:00Z")
        ));
        assert!(strategies.equal(&"a".to_string(), &"a".to_string()));
    }

    #[test]
    fn structs_compare_field_by_field() {
        let strategies = EqualityStrategies::default();
        let a = audit("2024-05-01T10:00:00.5Z");
        let mut b = audit("2024-05-01T12:00:00.5+02:00");
        assert!(strategies.equal(&a, &b));
        assert!(!strategies.equal(&a, &audit("2024-05-01T10:00:00Z")));

        b.owners.push("team-b".to_string());
        assert!(!strategies.equal(&a, &b));

        let mut c = audit("2024-05-01T10:00:00Z");
        c.tags.insert("env".to_string(), "dev".to_string());
        assert!(!strategies.equal(&a, &c));
    }

    #[test]
    fn registered_strategy_overrides_leaf() {
        let strategies = EqualityStrategies::empty()
            .with::<String>(|a, b| a.eq_ignore_ascii_case(b));
        assert!(strategies.equal(&"Public".to_string(), &"PUBLIC".to_string()));
        assert!(strategies.equal(&Some("x".to_string()), &Some("X".to_string())));
        assert!(!strategies.equal(&Some("x".to_string()), &None));
    }

    #[test]
    fn debug_lists_registered_types() {
        let rendered = format!("{:?}", EqualityStrategies::default());
        assert!(rendered.contains("DateTime"));
    }
}
