//! Property tests for macro resolution.

use proptest::prelude::*;

use wadf::MacroEngine;

/// Names the resolver recognises that no fallback rule matches
fn plain_name() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9_]{2,20}")
        .unwrap()
        .prop_filter("not a numbered entity", |s| {
            !s.starts_with("db") && !s.starts_with("vhost")
        })
}

/// Values without markers or references
fn literal() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9 ./:_-]{0,40}")
        .unwrap()
        .prop_filter("no input markers", |s| {
            !s.starts_with("**") && !s.starts_with("%%")
        })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 96,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Text without `@` comes back unchanged and records nothing.
    #[test]
    fn property_text_without_references_is_untouched(text in "[^@]{0,80}") {
        let mut engine = MacroEngine::with_definitions([("appref", "shop")]).unwrap();
        let out = engine.resolve_string(&text, None).unwrap();
        prop_assert_eq!(out, text);
        prop_assert!(engine.unresolved().is_empty());
    }

    /// PROPERTY: An unknown macro resolves to its own sentinel, every time.
    #[test]
    fn property_unknown_macro_is_a_stable_sentinel(name in plain_name()) {
        let mut engine = MacroEngine::with_definitions([("appref", "shop")]).unwrap();
        prop_assume!(name != "appref");
        let sentinel = format!("@{}@", name);

        let first = engine.resolve_string(&sentinel, Some("test")).unwrap();
        let second = engine.resolve_string(&first, Some("test")).unwrap();

        prop_assert_eq!(&first, &sentinel);
        prop_assert_eq!(&second, &sentinel);
        prop_assert_eq!(engine.get(&name).unwrap(), None);
        prop_assert!(!engine.unresolved().is_empty());
    }

    /// PROPERTY: Resolving an already resolved value changes nothing.
    #[test]
    fn property_resolution_reaches_a_fixed_point(
        name in plain_name(),
        prefix in literal(),
        value in literal(),
    ) {
        prop_assume!(name != "inner");
        let mut engine = MacroEngine::with_definitions([
            ("inner".to_string(), value.clone()),
            (name.clone(), format!("{}@inner@", prefix)),
        ])
        .unwrap();

        let resolved = engine.resolve(&name).unwrap();
        prop_assert_eq!(&resolved, &format!("{}{}", prefix, value));
        let again = engine.resolve_string(&resolved, None).unwrap();
        prop_assert_eq!(again, resolved);
    }

    /// PROPERTY: Later definitions win over earlier ones.
    #[test]
    fn property_last_definition_wins(
        name in plain_name(),
        values in proptest::collection::vec(literal(), 1..6),
    ) {
        let mut engine = MacroEngine::new();
        for value in &values {
            engine.append([(name.as_str(), value.as_str())]).unwrap();
        }
        engine.resolve_all().unwrap();
        prop_assert_eq!(engine.resolve(&name).unwrap(), values.last().unwrap().clone());
    }

    /// PROPERTY: Numbered entities fall back to their base with the number
    /// filled in; entity 1 gets an empty number.
    #[test]
    fn property_numbered_entities_fall_back_to_base(n in 1u32..500) {
        let mut engine = MacroEngine::with_definitions([
            ("db_name", "shop@db_number@"),
            ("db_host", "db.local"),
        ])
        .unwrap();

        let expected = if n == 1 { "shop".to_string() } else { format!("shop{}", n) };
        prop_assert_eq!(engine.resolve(&format!("db{}_name", n)).unwrap(), expected);
        prop_assert_eq!(engine.resolve(&format!("db{}_host", n)).unwrap(), "db.local");
    }

    /// PROPERTY: An explicit numbered definition beats the fallback.
    #[test]
    fn property_explicit_entity_beats_fallback(n in 1u32..500, host in "[a-z]{3,10}\\.test") {
        let name = format!("db{}_host", n);
        let mut engine = MacroEngine::with_definitions([
            ("db_host".to_string(), "db.local".to_string()),
            (name.clone(), host.clone()),
        ])
        .unwrap();
        prop_assert_eq!(engine.resolve(&name).unwrap(), host);
    }
}
