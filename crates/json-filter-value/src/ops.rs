//! Arithmetic operators over values.

use crate::error::ValueError;
use crate::{equal, type_name};
use serde_json::{Map, Number, Value};

/// Largest integer magnitude an `f64` represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Longest string, in bytes, that string repetition may produce.
const MAX_REPEAT_LEN: usize = i32::MAX as usize;

/// Converts a float into a number value.
///
/// Integral results within the exactly representable range become integers,
/// so `1.5 + 0.5` prints as `2`. Non-finite results become `null`.
pub fn number(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

pub fn as_f64(n: &Number) -> f64 {
    n.as_f64().unwrap_or(0.0)
}

/// Short JSON rendering of a value for error messages.
pub fn preview(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() <= 11 {
        return text;
    }
    let head: String = text.chars().take(10).collect();
    format!("{head}...")
}

fn cannot(verb: &'static str, l: &Value, r: &Value) -> ValueError {
    ValueError::CannotApply {
        verb,
        lhs: type_name(l),
        lhs_value: preview(l),
        rhs: type_name(r),
        rhs_value: preview(r),
    }
}

fn int_pair(l: &Number, r: &Number) -> Option<(i64, i64)> {
    Some((l.as_i64()?, r.as_i64()?))
}

/// `l + r`.
///
/// `null` is the identity on either side; numbers add, strings and arrays
/// concatenate, objects merge shallowly with the right side winning.
pub fn add(l: Value, r: Value) -> Result<Value, ValueError> {
    match (l, r) {
        (Value::Null, r) => Ok(r),
        (l, Value::Null) => Ok(l),
        (Value::Number(a), Value::Number(b)) => Ok(match int_pair(&a, &b) {
            Some((x, y)) => match x.checked_add(y) {
                Some(sum) => Value::from(sum),
                None => number(x as f64 + y as f64),
            },
            None => number(as_f64(&a) + as_f64(&b)),
        }),
        (Value::String(mut a), Value::String(b)) => {
            a.push_str(&b);
            Ok(Value::String(a))
        }
        (Value::Array(mut a), Value::Array(b)) => {
            a.extend(b);
            Ok(Value::Array(a))
        }
        (Value::Object(mut a), Value::Object(b)) => {
            for (k, v) in b {
                a.insert(k, v);
            }
            Ok(Value::Object(a))
        }
        (l, r) => Err(cannot("added", &l, &r)),
    }
}

/// `l - r`.
///
/// Numbers subtract; arrays drop every element equal to some element of `r`.
pub fn sub(l: Value, r: Value) -> Result<Value, ValueError> {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => Ok(match int_pair(&a, &b) {
            Some((x, y)) => match x.checked_sub(y) {
                Some(diff) => Value::from(diff),
                None => number(x as f64 - y as f64),
            },
            None => number(as_f64(&a) - as_f64(&b)),
        }),
        (Value::Array(a), Value::Array(b)) => Ok(Value::Array(
            a.into_iter()
                .filter(|x| !b.iter().any(|y| equal(x, y)))
                .collect(),
        )),
        (l, r) => Err(cannot("subtracted", &l, &r)),
    }
}

/// `l * r`.
///
/// Numbers multiply, objects merge recursively, and a string times a number
/// repeats the string (`null` for counts below one).
pub fn mul(l: Value, r: Value) -> Result<Value, ValueError> {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => Ok(match int_pair(&a, &b) {
            Some((x, y)) => match x.checked_mul(y) {
                Some(prod) => Value::from(prod),
                None => number(x as f64 * y as f64),
            },
            None => number(as_f64(&a) * as_f64(&b)),
        }),
        (Value::String(s), Value::Number(n)) | (Value::Number(n), Value::String(s)) => {
            let times = as_f64(&n);
            if times < 1.0 {
                return Ok(Value::Null);
            }
            let times = times as usize;
            match s.len().checked_mul(times) {
                Some(len) if len <= MAX_REPEAT_LEN => Ok(Value::String(s.repeat(times))),
                _ => Err(ValueError::RepeatTooLong),
            }
        }
        (Value::Object(a), Value::Object(b)) => Ok(Value::Object(deep_merge(a, b))),
        (l, r) => Err(cannot("multiplied", &l, &r)),
    }
}

fn deep_merge(mut a: Map<String, Value>, b: Map<String, Value>) -> Map<String, Value> {
    for (k, v) in b {
        let merged = match (a.remove(&k), v) {
            (Some(Value::Object(x)), Value::Object(y)) => Value::Object(deep_merge(x, y)),
            (_, v) => v,
        };
        a.insert(k, merged);
    }
    a
}

/// `l / r`.
///
/// Numbers divide (a zero divisor is an error); strings split on `r`.
pub fn div(l: Value, r: Value) -> Result<Value, ValueError> {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => {
            let divisor = as_f64(&b);
            if divisor == 0.0 {
                return Err(ValueError::DivisionByZero(a.to_string()));
            }
            Ok(number(as_f64(&a) / divisor))
        }
        (Value::String(a), Value::String(b)) => {
            if a.is_empty() {
                return Ok(Value::Array(Vec::new()));
            }
            let parts = if b.is_empty() {
                a.chars().map(|c| Value::String(c.to_string())).collect()
            } else {
                a.split(b.as_str()).map(|s| Value::String(s.to_string())).collect()
            };
            Ok(Value::Array(parts))
        }
        (l, r) => Err(cannot("divided", &l, &r)),
    }
}

/// `l % r` on integers; floats are truncated first.
pub fn rem(l: Value, r: Value) -> Result<Value, ValueError> {
    match (&l, &r) {
        (Value::Number(a), Value::Number(b)) => {
            let x = a.as_i64().unwrap_or_else(|| as_f64(a) as i64);
            let y = b.as_i64().unwrap_or_else(|| as_f64(b) as i64);
            if y == 0 {
                return Err(ValueError::DivisionByZero(a.to_string()));
            }
            Ok(Value::from(x.wrapping_rem(y)))
        }
        _ => Err(cannot("divided", &l, &r)),
    }
}

/// Unary minus.
pub fn neg(v: Value) -> Result<Value, ValueError> {
    match v {
        Value::Number(n) => Ok(match n.as_i64() {
            Some(i) => match i.checked_neg() {
                Some(x) => Value::from(x),
                None => number(-(i as f64)),
            },
            None => number(-as_f64(&n)),
        }),
        other => Err(ValueError::CannotNegate(type_name(&other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_normalisation() {
        assert_eq!(number(2.0), json!(2));
        assert_eq!(number(2.5), json!(2.5));
        assert_eq!(number(f64::NAN), json!(null));
        assert_eq!(number(1e300), json!(1e300));
    }

    #[test]
    fn test_add() {
        assert_eq!(add(json!(1), json!(2)).unwrap(), json!(3));
        assert_eq!(add(json!(1.5), json!(0.5)).unwrap(), json!(2));
        assert_eq!(add(json!(null), json!("x")).unwrap(), json!("x"));
        assert_eq!(add(json!([1]), json!(null)).unwrap(), json!([1]));
        assert_eq!(add(json!("ab"), json!("cd")).unwrap(), json!("abcd"));
        assert_eq!(add(json!([1]), json!([2, 3])).unwrap(), json!([1, 2, 3]));
        assert_eq!(
            add(json!({"a": 1, "b": 1}), json!({"b": 2})).unwrap(),
            json!({"a": 1, "b": 2})
        );
        assert_eq!(add(json!(i64::MAX), json!(1)).unwrap(), json!(9223372036854775808.0));
    }

    #[test]
    fn test_add_type_error() {
        let err = add(json!({}), json!(1)).unwrap_err();
        assert_eq!(err.to_string(), "object ({}) and number (1) cannot be added");
    }

    #[test]
    fn test_sub() {
        assert_eq!(sub(json!(5), json!(7)).unwrap(), json!(-2));
        assert_eq!(sub(json!([1, 2, 1, 3]), json!([1])).unwrap(), json!([2, 3]));
        assert!(sub(json!("a"), json!("a")).is_err());
    }

    #[test]
    fn test_mul() {
        assert_eq!(mul(json!(3), json!(4)).unwrap(), json!(12));
        assert_eq!(mul(json!("ab"), json!(3)).unwrap(), json!("ababab"));
        assert_eq!(mul(json!("ab"), json!(0)).unwrap(), json!(null));
        assert_eq!(mul(json!("ab"), json!(1e18)), Err(ValueError::RepeatTooLong));
        assert_eq!(mul(json!(""), json!(1e18)).unwrap(), json!(""));
        assert_eq!(
            mul(json!({"a": {"b": 1, "c": 2}}), json!({"a": {"c": 3}})).unwrap(),
            json!({"a": {"b": 1, "c": 3}})
        );
    }

    #[test]
    fn test_div_and_rem() {
        assert_eq!(div(json!(7), json!(2)).unwrap(), json!(3.5));
        assert_eq!(div(json!(6), json!(3)).unwrap(), json!(2));
        assert_eq!(div(json!("a,b"), json!(",")).unwrap(), json!(["a", "b"]));
        assert!(matches!(div(json!(1), json!(0)), Err(ValueError::DivisionByZero(_))));
        assert_eq!(rem(json!(7), json!(3)).unwrap(), json!(1));
        assert_eq!(rem(json!(-7), json!(3)).unwrap(), json!(-1));
        assert!(rem(json!(7), json!(0)).is_err());
    }

    #[test]
    fn test_neg() {
        assert_eq!(neg(json!(3)).unwrap(), json!(-3));
        assert_eq!(neg(json!(-1.5)).unwrap(), json!(1.5));
        assert_eq!(neg(json!("x")).unwrap_err(), ValueError::CannotNegate("string"));
    }
}
