//! Property-based tests for parameter identity.

use std::collections::HashSet;

use proptest::prelude::*;
use sifter_params::{metadata, ParameterId, ParameterMetadata};
use sifter_convert::ElementId;

fn identifier_string() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<i64>().prop_map(|n| n.to_string()),
        (any::<i64>(), "[A-Za-z ;]{0,12}").prop_map(|(n, d)| format!("{n};{d}")),
        any::<u128>().prop_map(|n| uuid::Uuid::from_u128(n).to_string()),
        (any::<u128>(), "[A-Za-z ]{0,12}")
            .prop_map(|(n, d)| format!("{};{d}", uuid::Uuid::from_u128(n).simple())),
        ".{0,24}",
    ]
}

proptest! {
    /// Parsing the stable form of a parsed identifier is a fixed point.
    #[test]
    fn stable_form_is_idempotent(s in identifier_string()) {
        if let Ok(first) = s.parse::<ParameterId>() {
            let second: ParameterId = first.stable().parse().unwrap();
            prop_assert_eq!(second.stable(), first.stable());
            prop_assert_eq!(second, first);
        }
    }

    /// Equal identifiers hash equal, whatever path built them.
    #[test]
    fn builtin_paths_agree(code in i64::MIN..0, name in "[A-Za-z]{1,10}") {
        let parsed: ParameterId = format!("{code};{name}").parse().unwrap();
        let built = ParameterId::builtin_named(code, &name).unwrap();
        let from_parts = ParameterId::from_parts(None, Some(code), None, Some(&name)).unwrap();

        let set: HashSet<ParameterId> = [parsed, built, from_parts].into_iter().collect();
        prop_assert_eq!(set.len(), 1);
    }

    /// Persisted metadata reloads verbatim.
    #[test]
    fn metadata_json_round_trip(
        entries in prop::collection::btree_map(
            i64::MIN..0,
            ("[A-Za-z ]{0,10}", any::<bool>(), prop::collection::btree_set(-3_000_000i64..0, 0..5)),
            0..10,
        )
    ) {
        let original: Vec<ParameterMetadata> = entries
            .into_iter()
            .map(|(code, (name, is_instance, cats))| {
                let mut meta = ParameterMetadata::new(
                    ParameterId::builtin_named(code, &name).unwrap(),
                    is_instance,
                );
                for c in cats {
                    meta.add_category(ElementId(c));
                }
                meta
            })
            .collect();

        let json = metadata::to_json(&original).unwrap();
        let back = metadata::from_json(&json).unwrap();
        prop_assert_eq!(back, original);
    }
}
