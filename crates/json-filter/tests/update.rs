//! Integration tests for path expressions and the update operators.

use json_filter::{Engine, EvalError, ValueError};
use serde_json::{json, Value};

fn check(filter: &str, input: Value, expected: Vec<Value>) {
    let out = Engine::new()
        .run(filter, input)
        .unwrap_or_else(|e| panic!("{filter} failed: {e}"));
    assert_eq!(out, expected, "filter: {filter}");
}

fn check_one(filter: &str, input: Value, expected: Value) {
    check(filter, input, vec![expected]);
}

fn check_err(filter: &str, input: Value) -> EvalError {
    Engine::new()
        .run(filter, input)
        .err()
        .unwrap_or_else(|| panic!("expected error for {filter}"))
}

// ----------------------------------------------------------------- path

#[test]
fn test_path_of_accessors() {
    check_one("path(.a[0].b)", json!(null), json!(["a", 0, "b"]));
    check("path(.a, .b)", json!(null), vec![json!(["a"]), json!(["b"])]);
    check_one("[path(.[])]", json!({"x": 1, "y": 2}), json!([["x"], ["y"]]));
    check_one("path(.)", json!(1), json!([]));
    check_one(
        "[path(..)]",
        json!({"a": [1]}),
        json!([[], ["a"], ["a", 0]]),
    );
}

#[test]
fn test_path_through_library() {
    check_one(
        "[path(.[] | select(. > 1))]",
        json!([1, 2, 3]),
        json!([[1], [2]]),
    );
    check_one("path(first(.a, .b))", json!(null), json!(["a"]));
    check_one("path(getpath([\"a\", \"b\"]))", json!(null), json!(["a", "b"]));
    check_one("[paths]", json!({"a": [1]}), json!([["a"], ["a", 0]]));
    check_one("[leaf_paths]", json!({"a": [1], "b": 2}), json!([["a", 0], ["b"]]));
    check_one("[paths(type == \"array\")]", json!({"a": [1]}), json!([["a"]]));
}

#[test]
fn test_invalid_path_expressions() {
    assert!(matches!(check_err("1 |= 2", json!(null)), EvalError::Path(_)));
    assert!(matches!(check_err("path(.a + 1)", json!(null)), EvalError::Path(_)));
    assert!(matches!(check_err("path(length)", json!([])), EvalError::Path(_)));
    assert_eq!(
        check_err("path(1)", json!(null)).to_string(),
        "invalid path expression: literal"
    );
}

// ----------------------------------------------------------------- assignment

#[test]
fn test_assign() {
    check_one(".a = 1", json!({"a": 0, "b": 1}), json!({"a": 1, "b": 1}));
    check_one(".a = .b", json!({"a": null, "b": 3}), json!({"a": 3, "b": 3}));
    check_one("(.a, .b) = 1", json!({}), json!({"a": 1, "b": 1}));
    check(
        ".a = (1, 2)",
        json!({}),
        vec![json!({"a": 1}), json!({"a": 2})],
    );
    check_one(".a.b = 5", json!(null), json!({"a": {"b": 5}}));
    check_one(".[2] = 1", json!([]), json!([null, null, 1]));
}

#[test]
fn test_arithmetic_update() {
    check_one(".a += 1", json!({"a": 1}), json!({"a": 2}));
    check_one(".[] *= 2", json!([1, 2]), json!([2, 4]));
    check_one(".a -= .b", json!({"a": 5, "b": 2}), json!({"a": 3, "b": 2}));
    check(
        ".a /= 2, .a %= 2",
        json!({"a": 3}),
        vec![json!({"a": 1.5}), json!({"a": 1})],
    );
    check_one(".[] += 1 | .[0]", json!([10]), json!(11));
    assert!(matches!(check_err(".[] += 1", json!([1, "x"])), EvalError::Type(_)));
}

#[test]
fn test_assign_to_huge_index_fails() {
    assert_eq!(
        check_err(".[1e18] = 1", json!(null)),
        EvalError::Type(ValueError::IndexTooLarge)
    );
    assert_eq!(
        check_err(r#"setpath([1000000000]; 1)"#, json!([])),
        EvalError::Type(ValueError::IndexTooLarge)
    );
}

#[test]
fn test_slice_updates() {
    check_one(".[1:] |= map(. * 10)", json!([1, 2, 3]), json!([1, 20, 30]));
    check_one(".[2:4] = [\"x\"]", json!([0, 1, 2, 3, 4]), json!([0, 1, "x", 4]));
    check_one(".[1:][0] = 9", json!([1, 2, 3]), json!([1, 9, 3]));
    check_one("del(.[:2])", json!([1, 2, 3]), json!([3]));
    check_one(".[:1] |= empty", json!([1, 2]), json!([2]));
    check_one("path(.[1:2])", json!(null), json!([{"start": 1, "end": 2}]));
    check_one(
        r#"getpath([{"start": 1, "end": null}])"#,
        json!([1, 2, 3]),
        json!([2, 3]),
    );
    assert!(matches!(check_err(".[1:] = 1", json!([1, 2])), EvalError::Type(_)));
}

// ----------------------------------------------------------------- |=

#[test]
fn test_update() {
    check_one(".a |= . + 1", json!({"a": 1}), json!({"a": 2}));
    check_one(".a.b |= 5", json!(null), json!({"a": {"b": 5}}));
    check_one(".a |= (.b = 1)", json!({"a": {}}), json!({"a": {"b": 1}}));
    check_one("first(.[]) |= 10", json!([1, 2]), json!([10, 2]));
    check_one(
        "(.. | numbers) |= . + 1",
        json!([1, [2], "x"]),
        json!([2, [3], "x"]),
    );
}

#[test]
fn test_update_keeps_key_order() {
    let out = Engine::new()
        .run("map_values(. + 1)", json!({"a": 1, "b": 2}))
        .unwrap();
    assert_eq!(out[0].to_string(), r#"{"a":2,"b":3}"#);
    let out = Engine::new()
        .run(".b |= 0", json!({"c": 1, "b": 2, "a": 3}))
        .unwrap();
    assert_eq!(out[0].to_string(), r#"{"c":1,"b":0,"a":3}"#);
}

#[test]
fn test_update_with_empty_deletes() {
    check_one("map_values(empty)", json!([1, 2, 3]), json!([]));
    check_one("(.[] | select(. > 1)) |= empty", json!([1, 2, 3]), json!([1]));
    check_one(".[] |= empty", json!({"a": 1, "b": 2}), json!({}));
    check_one(
        "map_values(select(. != 2))",
        json!({"a": 1, "b": 2, "c": 3}),
        json!({"a": 1, "c": 3}),
    );
}

#[test]
fn test_update_takes_first_output() {
    check_one(".[] |= (. , . * 100)", json!([1, 2]), json!([1, 2]));
}

// ----------------------------------------------------------------- library

#[test]
fn test_del() {
    check_one("del(.a)", json!({"a": 1, "b": 2}), json!({"b": 2}));
    check_one("del(.a, .b)", json!({"a": 1, "b": 2, "c": 3}), json!({"c": 3}));
    check_one("del(.[0, 2])", json!([1, 2, 3]), json!([2]));
    check_one("del(.[] | select(. == 2))", json!([1, 2, 3, 2]), json!([1, 3]));
    check_one("del(.missing)", json!({"a": 1}), json!({"a": 1}));
}

#[test]
fn test_getpath_setpath_delpaths() {
    check_one(r#"getpath(["a", "b"])"#, json!({"a": {"b": 1}}), json!(1));
    check_one(r#"getpath(["x", 0])"#, json!(null), json!(null));
    check_one(r#"setpath(["a"]; 2)"#, json!(null), json!({"a": 2}));
    check_one(r#"setpath(["a", 1]; 2)"#, json!({}), json!({"a": [null, 2]}));
    check_one(r#"delpaths([["a"], ["b", 0]])"#, json!({"a": 1, "b": [1, 2]}), json!({"b": [2]}));
    assert!(matches!(check_err("setpath(1; 2)", json!(null)), EvalError::Type(_)));
}

#[test]
fn test_pick_and_walk() {
    check_one(
        "pick(.b.c)",
        json!({"a": 1, "b": {"c": 2, "d": 3}}),
        json!({"b": {"c": 2}}),
    );
    check_one(
        "walk(if type == \"number\" then . + 1 else . end)",
        json!({"a": [1, 2], "b": "x"}),
        json!({"a": [2, 3], "b": "x"}),
    );
}

#[test]
fn test_engine_update_entry_point() {
    let engine = Engine::new();
    let path = engine.parse(".items[] | select(.done)").unwrap();
    let f = engine.parse(".done = false").unwrap();
    let out = engine
        .update(
            &path,
            &f,
            json!({"items": [{"done": true}, {"done": false}]}),
        )
        .unwrap();
    assert_eq!(out, json!({"items": [{"done": false}, {"done": false}]}));
}
