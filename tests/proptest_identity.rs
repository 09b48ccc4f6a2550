//! Property-based tests using proptest
//!
//! These tests check the SLO query resolution and the data source identity
//! hash against randomized filter values.

use ddmap::resource::service_level_objectives::{
    hash_identity, resolve_slo_query, SloFilterFields, SloQuery,
};
use proptest::prelude::*;

/// Filter text, including the characters the identity key escapes
fn arb_field() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[a-z:_*]{1,12}",
        "[a-z|\\\\]{1,6}",
    ]
}

fn arb_ids() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z0-9]{0,8}", 0..4)
}

/// A full set of list filters plus an optional free-text query
#[derive(Debug, Clone)]
struct Filters {
    ids: Vec<String>,
    name: String,
    tags: String,
    metrics: String,
    query: String,
}

impl Filters {
    fn resolve(&self) -> SloQuery {
        resolve_slo_query(SloFilterFields {
            ids: &self.ids,
            name: Some(self.name.as_str()),
            tags: Some(self.tags.as_str()),
            metrics: Some(self.metrics.as_str()),
            query: Some(self.query.as_str()),
        })
    }
}

fn arb_filters() -> impl Strategy<Value = Filters> {
    (arb_ids(), arb_field(), arb_field(), arb_field(), arb_field()).prop_map(
        |(ids, name, tags, metrics, query)| Filters {
            ids,
            name,
            tags,
            metrics,
            query,
        },
    )
}

proptest! {
    /// The identity is a lowercase 64-character hex digest
    #[test]
    fn identity_is_hex_sha256(filters in arb_filters()) {
        let identity = filters.resolve().identity();
        prop_assert_eq!(identity.len(), 64);
        prop_assert!(identity.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    /// Resolving the same filters twice gives the same identity
    #[test]
    fn identity_is_stable(filters in arb_filters()) {
        prop_assert_eq!(filters.resolve().identity(), filters.clone().resolve().identity());
    }

    /// A non-empty query wins over every list filter
    #[test]
    fn query_takes_precedence(filters in arb_filters()) {
        let resolved = filters.resolve();
        if filters.query.is_empty() {
            prop_assert!(matches!(resolved, SloQuery::List(_)), "expected a list query");
        } else {
            prop_assert_eq!(resolved, SloQuery::Search { query: filters.query.clone() });
        }
    }

    /// Different effective queries never share an identity key
    #[test]
    fn distinct_queries_have_distinct_keys(a in arb_filters(), b in arb_filters()) {
        let (qa, qb) = (a.resolve(), b.resolve());
        if qa != qb {
            prop_assert_ne!(qa.identity_key(), qb.identity_key());
        } else {
            prop_assert_eq!(qa.identity(), qb.identity());
        }
    }

    /// The identity is the hash of the identity key
    #[test]
    fn identity_hashes_key(filters in arb_filters()) {
        let query = filters.resolve();
        prop_assert_eq!(query.identity(), hash_identity(&query.identity_key()));
    }
}

#[test]
fn separator_in_a_field_does_not_collide() {
    let split = Filters {
        ids: vec![],
        name: "a|b".to_string(),
        tags: String::new(),
        metrics: String::new(),
        query: String::new(),
    };
    let shifted = Filters {
        ids: vec![],
        name: "a".to_string(),
        tags: "b".to_string(),
        metrics: String::new(),
        query: String::new(),
    };
    assert_ne!(split.resolve().identity(), shifted.resolve().identity());
}
