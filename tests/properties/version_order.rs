//! Property tests for tag ordering.

use std::cmp::Ordering;

use proptest::prelude::*;

use wadf::domain::services::version_sort::{compare_versions, latest_version, sort_versions};

fn dotted(parts: &[u16]) -> String {
    parts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// Dotted versions with at least two parts, optionally suffixed
fn version() -> impl Strategy<Value = String> {
    (
        proptest::collection::vec(0u16..200, 2..5),
        proptest::option::of("[a-z]{1,4}"),
    )
        .prop_map(|(parts, suffix)| format!("{}{}", dotted(&parts), suffix.unwrap_or_default()))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Three-part versions order like their numeric tuples.
    #[test]
    fn property_numeric_versions_order_numerically(
        a in proptest::array::uniform3(0u16..1000),
        b in proptest::array::uniform3(0u16..1000),
    ) {
        prop_assert_eq!(compare_versions(&dotted(&a), &dotted(&b)), a.cmp(&b));
    }

    /// PROPERTY: A suffixed pre-release sorts before its bare version.
    #[test]
    fn property_suffix_sorts_before_base(
        parts in proptest::collection::vec(0u16..200, 2..5),
        suffix in "[a-z]{1,6}",
    ) {
        let base = dotted(&parts);
        let pre = format!("{}{}", base, suffix);
        prop_assert_eq!(compare_versions(&pre, &base), Ordering::Less);
        prop_assert_eq!(compare_versions(&base, &pre), Ordering::Greater);
    }

    /// PROPERTY: Comparison is antisymmetric.
    #[test]
    fn property_compare_is_antisymmetric(a in version(), b in version()) {
        prop_assert_eq!(compare_versions(&a, &b), compare_versions(&b, &a).reverse());
    }

    /// PROPERTY: Sorting yields a non-decreasing list whose last element is
    /// the latest version, and sorting again changes nothing.
    #[test]
    fn property_sort_agrees_with_latest(
        mut tags in proptest::collection::vec(version(), 1..12),
    ) {
        sort_versions(&mut tags);
        for pair in tags.windows(2) {
            prop_assert_ne!(compare_versions(&pair[0], &pair[1]), Ordering::Greater);
        }
        let latest = latest_version(&tags).unwrap();
        prop_assert_eq!(compare_versions(latest, tags.last().unwrap()), Ordering::Equal);

        let mut again = tags.clone();
        sort_versions(&mut again);
        prop_assert_eq!(again, tags);
    }
}
