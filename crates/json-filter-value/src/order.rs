use serde_json::{Map, Number, Value};
use std::cmp::Ordering;

/// Rank of a value's type in the total order.
///
/// `null < false < true < numbers < strings < arrays < objects`
fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(false) => 1,
        Value::Bool(true) => 2,
        Value::Number(_) => 3,
        Value::String(_) => 4,
        Value::Array(_) => 5,
        Value::Object(_) => 6,
    }
}

/// Total order over values.
///
/// Values of different types order by type rank. Numbers order numerically
/// (NaN-free by construction, since serde_json numbers are finite), strings
/// by code point, arrays lexicographically. Objects first compare their
/// sorted key lists, then their values key by key in sorted key order.
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use serde_json::json;
/// use json_filter_value::compare;
///
/// assert_eq!(compare(&json!(null), &json!(false)), Ordering::Less);
/// assert_eq!(compare(&json!(10), &json!("1")), Ordering::Less);
/// assert_eq!(compare(&json!([1, 2]), &json!([1, 2, 0])), Ordering::Less);
/// assert_eq!(compare(&json!({"a": 2}), &json!({"a": 1})), Ordering::Greater);
/// ```
pub fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (l, r) in x.iter().zip(y) {
                match compare(l, r) {
                    Ordering::Equal => {}
                    other => return other,
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(x), Value::Object(y)) => compare_objects(x, y),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn compare_numbers(x: &Number, y: &Number) -> Ordering {
    match (x.as_i64(), y.as_i64()) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => {
            let a = x.as_f64().unwrap_or(0.0);
            let b = y.as_f64().unwrap_or(0.0);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
    }
}

fn compare_objects(x: &Map<String, Value>, y: &Map<String, Value>) -> Ordering {
    let mut keys_x: Vec<&String> = x.keys().collect();
    let mut keys_y: Vec<&String> = y.keys().collect();
    keys_x.sort();
    keys_y.sort();
    match keys_x.cmp(&keys_y) {
        Ordering::Equal => {}
        other => return other,
    }
    for key in keys_x {
        match compare(&x[key.as_str()], &y[key.as_str()]) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_ranks() {
        let ordered = [
            json!(null),
            json!(false),
            json!(true),
            json!(-5),
            json!(""),
            json!([]),
            json!({}),
        ];
        for pair in ordered.windows(2) {
            assert_eq!(compare(&pair[0], &pair[1]), Ordering::Less, "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_numbers() {
        assert_eq!(compare(&json!(1), &json!(1.5)), Ordering::Less);
        assert_eq!(compare(&json!(2.0), &json!(2)), Ordering::Equal);
        assert_eq!(compare(&json!(-3), &json!(-4)), Ordering::Greater);
    }

    #[test]
    fn test_objects_compare_keys_first() {
        // {"b": 0} has key list ["b"] which sorts after ["a", "c"]
        assert_eq!(compare(&json!({"b": 0}), &json!({"a": 9, "c": 9})), Ordering::Greater);
        assert_eq!(compare(&json!({"a": 1, "b": 2}), &json!({"b": 2, "a": 1})), Ordering::Equal);
        assert_eq!(compare(&json!({"a": 1, "b": 2}), &json!({"a": 1, "b": 3})), Ordering::Less);
    }
}
