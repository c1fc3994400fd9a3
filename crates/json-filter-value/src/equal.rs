use serde_json::{Number, Value};

/// Structural equality between two values.
///
/// - Numbers compare by numeric value, so `1` equals `1.0`.
/// - Arrays compare element by element, in order.
/// - Objects compare as key sets with equal values; key order is ignored.
///
/// The relation is total: values of different types are simply unequal.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use json_filter_value::equal;
///
/// assert!(equal(&json!({"a": [1, 2.0]}), &json!({"a": [1.0, 2]})));
/// assert!(equal(&json!({"a": 1, "b": 2}), &json!({"b": 2, "a": 1})));
/// assert!(!equal(&json!([1, 2]), &json!([2, 1])));
/// assert!(!equal(&json!(null), &json!(false)));
/// ```
pub fn equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::String(a), Value::String(b)) => a == b,

        (Value::Array(arr_a), Value::Array(arr_b)) => {
            arr_a.len() == arr_b.len() && arr_a.iter().zip(arr_b).all(|(x, y)| equal(x, y))
        }

        (Value::Object(obj_a), Value::Object(obj_b)) => {
            if obj_a.len() != obj_b.len() {
                return false;
            }
            for (key, val_a) in obj_a {
                match obj_b.get(key) {
                    Some(val_b) if equal(val_a, val_b) => {}
                    _ => return false,
                }
            }
            true
        }

        _ => false,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => x == y,
        _ => a.as_f64() == b.as_f64(),
    }
}
