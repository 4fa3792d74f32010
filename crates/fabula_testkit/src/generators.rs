//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random namespaces, document ids,
//! bodies, and mix weights that maintain required invariants.

use fabula_core::Body;
use proptest::prelude::*;
use serde_json::Value;

/// Words a namespace or path segment may never be.
const RESERVED: &[&str] = &[
    "d", "u", "l", "x", "f", "c", "p", "m", "t", "r", "i", "novies", "mxd", "in",
];

/// Strategy for generating valid namespaces.
pub fn namespace_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,15}")
        .expect("Invalid regex")
        .prop_filter("Namespace must not be reserved", |s| {
            !RESERVED.contains(&s.as_str()) && s != "temps"
        })
}

/// Strategy for generating valid document ids.
pub fn document_id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,15}")
        .expect("Invalid regex")
        .prop_filter("Id must not be reserved", |s| {
            !RESERVED.contains(&s.as_str()) && s != "temps"
        })
}

/// Strategy for generating scalar JSON values.
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i32>().prop_map(Value::from),
        (-1.0e6f64..1.0e6).prop_map(Value::from),
        any::<bool>().prop_map(Value::Bool),
        prop::string::string_regex("[a-z ]{0,16}")
            .expect("Invalid regex")
            .prop_map(Value::String),
    ]
}

/// Strategy for generating flat document bodies.
pub fn body_strategy() -> impl Strategy<Value = Body> {
    prop::collection::btree_map(
        prop::string::string_regex("[a-z][a-z0-9_]{0,9}").expect("Invalid regex"),
        scalar_strategy(),
        0..6,
    )
    .prop_map(|map| map.into_iter().collect())
}

/// Strategy for generating bodies with one level of nesting, the shape the
/// patch merge recurses into.
pub fn nested_body_strategy() -> impl Strategy<Value = Body> {
    prop::collection::btree_map(
        prop::string::string_regex("[a-z][a-z0-9_]{0,9}").expect("Invalid regex"),
        prop_oneof![
            scalar_strategy(),
            body_strategy().prop_map(Value::Object),
        ],
        0..6,
    )
    .prop_map(|map| map.into_iter().collect())
}

/// Strategy for generating strictly positive mix weights.
pub fn weights_strategy(len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.01f64..100.0, len..=len)
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn namespaces_avoid_reserved_words(ns in namespace_strategy()) {
            prop_assert!(!RESERVED.contains(&ns.as_str()));
            prop_assert!(ns != "temps");
        }

        #[test]
        fn weights_are_positive(weights in weights_strategy(4)) {
            prop_assert_eq!(weights.len(), 4);
            prop_assert!(weights.iter().all(|w| *w > 0.0));
        }
    }
}
