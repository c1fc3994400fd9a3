use json_filter_value::{compare, del_paths, equal, get_path, set_path, PathComponent};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::cmp::Ordering;

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-50i64..50).prop_map(Value::from),
        "[a-c]{0,2}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec(("[a-c]", inner), 0..4)
                .prop_map(|kvs| Value::Object(kvs.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn compare_agrees_with_equal(a in arb_value(), b in arb_value()) {
        prop_assert_eq!(equal(&a, &b), compare(&a, &b) == Ordering::Equal);
    }

    #[test]
    fn compare_is_antisymmetric(a in arb_value(), b in arb_value()) {
        prop_assert_eq!(compare(&a, &b), compare(&b, &a).reverse());
    }

    #[test]
    fn set_then_get_reads_back(key in "[a-c]", v in arb_value(), doc in arb_value()) {
        let path = vec![PathComponent::Key(key)];
        if let Ok(updated) = set_path(doc, &path, v.clone()) {
            prop_assert!(equal(&get_path(&updated, &path).unwrap(), &v));
        }
    }

    #[test]
    fn deleting_every_index_empties_an_array(items in prop::collection::vec(any::<i32>(), 0..8)) {
        let doc = json!(items);
        let paths = (0..items.len()).map(|i| vec![PathComponent::Index(i as i64)]).collect();
        prop_assert_eq!(del_paths(doc, paths).unwrap(), json!([]));
    }
}
