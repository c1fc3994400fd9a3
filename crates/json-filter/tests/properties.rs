use json_filter::Engine;
use proptest::prelude::*;
use serde_json::{json, Value};

fn ints() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(-1000i64..1000, 0..12)
}

fn run_one(engine: &Engine, filter: &str, input: Value) -> Value {
    let mut out = engine.run(filter, input).unwrap();
    assert_eq!(out.len(), 1, "{filter} should have one output");
    out.remove(0)
}

proptest! {
    #[test]
    fn map_matches_iterate_and_collect(xs in ints()) {
        let engine = Engine::new();
        let manual: Vec<i64> = xs.iter().map(|x| x * 3 + 1).collect();
        let mapped = run_one(&engine, "map(. * 3 + 1)", json!(xs));
        let collected = run_one(&engine, "[.[] | . * 3 + 1]", json!(xs));
        prop_assert_eq!(&mapped, &collected);
        prop_assert_eq!(mapped, json!(manual));
    }

    #[test]
    fn any_all_agree_with_iterators(xs in ints(), t in -1000i64..1000) {
        let engine = Engine::new();
        let input = json!({"xs": xs, "t": t});
        let any = run_one(&engine, ".t as $t | .xs | any(. > $t)", input.clone());
        let all = run_one(&engine, ".t as $t | .xs | all(. > $t)", input.clone());
        let not_any_not = run_one(&engine, ".t as $t | .xs | any(. > $t | not) | not", input);
        prop_assert_eq!(any, json!(xs.iter().any(|x| *x > t)));
        prop_assert_eq!(&all, &json!(xs.iter().all(|x| *x > t)));
        prop_assert_eq!(all, not_any_not);
    }

    #[test]
    fn update_with_empty_filters(xs in ints(), t in -1000i64..1000) {
        let engine = Engine::new();
        let input = json!({"xs": xs, "t": t});
        let out = run_one(&engine, ".t as $t | .xs | (.[] | select(. > $t)) |= empty", input);
        let kept: Vec<i64> = xs.iter().copied().filter(|x| *x <= t).collect();
        prop_assert_eq!(out, json!(kept));
    }

    #[test]
    fn map_values_preserves_length(xs in ints()) {
        let engine = Engine::new();
        let out = run_one(&engine, "map_values(. - 1)", json!(xs));
        let expected: Vec<i64> = xs.iter().map(|x| x - 1).collect();
        prop_assert_eq!(out, json!(expected));
    }

    #[test]
    fn limit_takes_a_prefix(xs in ints(), n in 0usize..15) {
        let engine = Engine::new();
        let out = run_one(&engine, &format!("[limit({n}; .[])]"), json!(xs));
        let expected: Vec<i64> = xs.iter().copied().take(n).collect();
        prop_assert_eq!(out, json!(expected));
    }

    #[test]
    fn paths_read_back_through_getpath(xs in ints()) {
        let engine = Engine::new();
        let input = json!({"a": xs, "b": {"c": xs.len()}});
        let out = run_one(
            &engine,
            "[paths] as $ps | . as $doc | reduce $ps[] as $p (null; setpath($p; $doc | getpath($p)))",
            input.clone(),
        );
        prop_assert_eq!(out, input);
    }
}
