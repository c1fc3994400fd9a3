//! Reading values out of containers.

use crate::error::ValueError;
use crate::ops::{number, preview};
use crate::path::PathComponent;
use crate::type_name;
use serde_json::Value;

/// Resolves a possibly negative index against a container length.
///
/// Negative indices count from the end. Returns `None` when the resolved
/// position falls before the start.
pub fn resolve_index(len: usize, index: i64) -> Option<usize> {
    if index >= 0 {
        Some(index as usize)
    } else {
        let from_end = index.unsigned_abs() as usize;
        len.checked_sub(from_end)
    }
}

fn index_from_number(n: &serde_json::Number) -> i64 {
    n.as_i64().unwrap_or_else(|| n.as_f64().unwrap_or(0.0).floor() as i64)
}

/// `value[key]` where `key` is any value.
///
/// `null` indexed by a string or number is `null`. Objects are indexed by
/// strings and arrays by numbers; missing members and out-of-range indices
/// yield `null`.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use json_filter_value::index;
///
/// assert_eq!(index(&json!({"a": 1}), &json!("a")).unwrap(), json!(1));
/// assert_eq!(index(&json!([1, 2, 3]), &json!(-1)).unwrap(), json!(3));
/// assert_eq!(index(&json!(null), &json!("a")).unwrap(), json!(null));
/// assert!(index(&json!(5), &json!("a")).is_err());
/// ```
pub fn index(value: &Value, key: &Value) -> Result<Value, ValueError> {
    match (value, key) {
        (Value::Null, Value::String(_) | Value::Number(_) | Value::Null) => Ok(Value::Null),
        (Value::Object(map), Value::String(k)) => Ok(map.get(k).cloned().unwrap_or(Value::Null)),
        (Value::Array(arr), Value::Number(n)) => {
            let item = resolve_index(arr.len(), index_from_number(n)).and_then(|i| arr.get(i));
            Ok(item.cloned().unwrap_or(Value::Null))
        }
        _ => Err(ValueError::CannotIndex {
            target: type_name(value),
            key: preview(key),
        }),
    }
}

/// `value.name`; a shortcut for [`index`] with a string key.
pub fn field(value: &Value, name: &str) -> Result<Value, ValueError> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Object(map) => Ok(map.get(name).cloned().unwrap_or(Value::Null)),
        other => Err(ValueError::CannotIndex {
            target: type_name(other),
            key: format!("\"{name}\""),
        }),
    }
}

/// Converts a key value into the path component it addresses.
///
/// Objects with a `start` or `end` member address slices.
pub fn component(key: &Value) -> Result<PathComponent, ValueError> {
    match key {
        Value::String(s) => Ok(PathComponent::Key(s.clone())),
        Value::Number(n) => Ok(PathComponent::Index(index_from_number(n))),
        Value::Object(map) if map.contains_key("start") || map.contains_key("end") => {
            let open = Value::Null;
            let (from, to) = slice_bounds(
                map.get("start").unwrap_or(&open),
                map.get("end").unwrap_or(&open),
            )?;
            Ok(PathComponent::Slice(from, to))
        }
        other => Err(ValueError::InvalidPath(preview(other))),
    }
}

fn slice_bound(bound: &Value, round: fn(f64) -> f64) -> Result<Option<i64>, ValueError> {
    match bound {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(Some(
            n.as_i64()
                .unwrap_or_else(|| round(n.as_f64().unwrap_or(0.0)) as i64),
        )),
        other => Err(ValueError::InvalidSlice(preview(other))),
    }
}

/// Reads slice bounds: `null` leaves a bound open, the start rounds down and
/// the end rounds up.
pub fn slice_bounds(from: &Value, to: &Value) -> Result<(Option<i64>, Option<i64>), ValueError> {
    Ok((slice_bound(from, f64::floor)?, slice_bound(to, f64::ceil)?))
}

/// Resolves slice bounds against a length.
///
/// Negative bounds count from the end and both bounds are clamped to the
/// container. An end before the start gives an empty range.
pub fn slice_range(len: usize, from: Option<i64>, to: Option<i64>) -> (usize, usize) {
    let clamp = |i: i64| -> usize {
        if i < 0 {
            len.saturating_sub(i.unsigned_abs() as usize)
        } else {
            (i as usize).min(len)
        }
    };
    let start = from.map_or(0, clamp);
    let end = to.map_or(len, clamp).max(start);
    (start, end)
}

/// `value[from:to]` for arrays and strings; strings are sliced by
/// characters and `null` stays `null`.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use json_filter_value::slice;
///
/// assert_eq!(slice(&json!([1, 2, 3]), Some(1), None).unwrap(), json!([2, 3]));
/// assert_eq!(slice(&json!("héllo"), Some(-3), Some(-1)).unwrap(), json!("ll"));
/// ```
pub fn slice(value: &Value, from: Option<i64>, to: Option<i64>) -> Result<Value, ValueError> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Array(arr) => {
            let (start, end) = slice_range(arr.len(), from, to);
            Ok(Value::Array(arr[start..end].to_vec()))
        }
        Value::String(s) => {
            let (start, end) = slice_range(s.chars().count(), from, to);
            Ok(Value::String(s.chars().skip(start).take(end - start).collect()))
        }
        other => Err(ValueError::CannotSlice(type_name(other))),
    }
}

/// All children of a container with the component addressing each.
///
/// Array elements come in order, object members in insertion order.
pub fn children(value: Value) -> Result<Vec<(PathComponent, Value)>, ValueError> {
    match value {
        Value::Array(arr) => Ok(arr
            .into_iter()
            .enumerate()
            .map(|(i, v)| (PathComponent::Index(i as i64), v))
            .collect()),
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(k, v)| (PathComponent::Key(k), v))
            .collect()),
        other => Err(ValueError::CannotIterate(type_name(&other))),
    }
}

/// Number of elements, members or characters; absolute value of a number.
pub fn length(value: &Value) -> Result<Value, ValueError> {
    match value {
        Value::Null => Ok(Value::from(0)),
        Value::Bool(_) => Err(ValueError::NoLength("boolean")),
        Value::Number(n) => Ok(match n.as_i64() {
            Some(i) => match i.checked_abs() {
                Some(a) => Value::from(a),
                None => number((i as f64).abs()),
            },
            None => number(n.as_f64().unwrap_or(0.0).abs()),
        }),
        Value::String(s) => Ok(Value::from(s.chars().count())),
        Value::Array(a) => Ok(Value::from(a.len())),
        Value::Object(m) => Ok(Value::from(m.len())),
    }
}

/// Object keys (sorted when `sorted`) or array indices.
pub fn keys(value: &Value, sorted: bool) -> Result<Value, ValueError> {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            if sorted {
                keys.sort();
            }
            Ok(Value::Array(keys.into_iter().map(|k| Value::String(k.clone())).collect()))
        }
        Value::Array(arr) => Ok(Value::Array((0..arr.len()).map(Value::from).collect())),
        other => Err(ValueError::NoKeys(type_name(other))),
    }
}

/// Whether an object has a key or an array has an index.
pub fn has(value: &Value, key: &Value) -> Result<bool, ValueError> {
    match (value, key) {
        (Value::Object(map), Value::String(k)) => Ok(map.contains_key(k)),
        (Value::Array(arr), Value::Number(n)) => {
            let i = index_from_number(n);
            Ok(i >= 0 && (i as usize) < arr.len())
        }
        _ => Err(ValueError::CannotCheckKey {
            target: type_name(value),
            key: type_name(key),
        }),
    }
}

/// Strings stay as they are; everything else becomes its JSON text.
pub fn to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slices() {
        let arr = json!([0, 1, 2, 3, 4]);
        assert_eq!(slice(&arr, Some(1), Some(3)).unwrap(), json!([1, 2]));
        assert_eq!(slice(&arr, None, Some(-3)).unwrap(), json!([0, 1]));
        assert_eq!(slice(&arr, Some(3), Some(1)).unwrap(), json!([]));
        assert_eq!(slice(&arr, Some(-99), Some(99)).unwrap(), arr);
        assert_eq!(slice(&json!("abcdef"), Some(2), Some(4)).unwrap(), json!("cd"));
        assert_eq!(slice(&json!(null), Some(0), Some(1)).unwrap(), json!(null));
        assert_eq!(slice(&json!({}), Some(0), None), Err(ValueError::CannotSlice("object")));
    }

    #[test]
    fn test_slice_bounds() {
        assert_eq!(slice_bounds(&json!(1.5), &json!(2.5)).unwrap(), (Some(1), Some(3)));
        assert_eq!(slice_bounds(&json!(null), &json!(-1)).unwrap(), (None, Some(-1)));
        assert!(slice_bounds(&json!("a"), &json!(null)).is_err());
        assert_eq!(
            component(&json!({"start": 1, "end": null})).unwrap(),
            PathComponent::Slice(Some(1), None)
        );
    }

    #[test]
    fn test_resolve_index() {
        assert_eq!(resolve_index(3, 0), Some(0));
        assert_eq!(resolve_index(3, 5), Some(5));
        assert_eq!(resolve_index(3, -1), Some(2));
        assert_eq!(resolve_index(3, -3), Some(0));
        assert_eq!(resolve_index(3, -4), None);
    }

    #[test]
    fn test_index_misses_are_null() {
        assert_eq!(index(&json!({"a": 1}), &json!("b")).unwrap(), json!(null));
        assert_eq!(index(&json!([1]), &json!(3)).unwrap(), json!(null));
        assert_eq!(index(&json!([1]), &json!(-3)).unwrap(), json!(null));
        assert_eq!(index(&json!([1, 2]), &json!(1.7)).unwrap(), json!(2));
    }

    #[test]
    fn test_index_errors() {
        let err = index(&json!([1]), &json!("a")).unwrap_err();
        assert_eq!(err.to_string(), "cannot index array with \"a\"");
        let err = field(&json!(1), "a").unwrap_err();
        assert_eq!(err.to_string(), "cannot index number with \"a\"");
    }

    #[test]
    fn test_children_order() {
        let kids = children(json!({"b": 1, "a": 2})).unwrap();
        assert_eq!(
            kids,
            vec![
                (PathComponent::Key("b".into()), json!(1)),
                (PathComponent::Key("a".into()), json!(2)),
            ]
        );
        assert!(matches!(children(json!(3)), Err(ValueError::CannotIterate("number"))));
    }

    #[test]
    fn test_length_keys_has() {
        assert_eq!(length(&json!("héllo")).unwrap(), json!(5));
        assert_eq!(length(&json!(-4)).unwrap(), json!(4));
        assert_eq!(length(&json!(null)).unwrap(), json!(0));
        assert!(length(&json!(true)).is_err());
        assert_eq!(keys(&json!({"b": 1, "a": 2}), true).unwrap(), json!(["a", "b"]));
        assert_eq!(keys(&json!({"b": 1, "a": 2}), false).unwrap(), json!(["b", "a"]));
        assert_eq!(keys(&json!([5, 6]), true).unwrap(), json!([0, 1]));
        assert!(has(&json!({"a": null}), &json!("a")).unwrap());
        assert!(!has(&json!([1]), &json!(1)).unwrap());
        assert!(has(&json!(1), &json!(0)).is_err());
    }
}
