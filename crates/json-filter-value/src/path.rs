//! Paths into values: reading, writing and deleting by path.

use crate::access::{component, resolve_index, slice, slice_range};
use crate::error::ValueError;
use crate::order::compare;
use crate::type_name;
use serde_json::{Map, Value};
use std::fmt;

/// Largest array index a write may extend an array to.
const MAX_ARRAY_INDEX: usize = 536_870_911;

/// One step of a path: an object key, an array index or an array slice.
///
/// Indices and slice bounds may be negative, counting from the end of the
/// array they are applied to. An open slice bound is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathComponent {
    Key(String),
    Index(i64),
    Slice(Option<i64>, Option<i64>),
}

impl From<&PathComponent> for Value {
    fn from(c: &PathComponent) -> Self {
        match c {
            PathComponent::Key(k) => Value::String(k.clone()),
            PathComponent::Index(i) => Value::from(*i),
            PathComponent::Slice(from, to) => {
                let mut map = Map::new();
                map.insert("start".to_string(), from.map_or(Value::Null, Value::from));
                map.insert("end".to_string(), to.map_or(Value::Null, Value::from));
                Value::Object(map)
            }
        }
    }
}

impl fmt::Display for PathComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathComponent::Key(k) => write!(f, "{k:?}"),
            PathComponent::Index(i) => write!(f, "{i}"),
            PathComponent::Slice(from, to) => {
                if let Some(from) = from {
                    write!(f, "{from}")?;
                }
                f.write_str(":")?;
                if let Some(to) = to {
                    write!(f, "{to}")?;
                }
                Ok(())
            }
        }
    }
}

/// A route from the root of a value to one location inside it.
pub type Path = Vec<PathComponent>;

/// Renders a path as a value: an array of strings, integers and
/// `{"start", "end"}` slice objects.
pub fn path_to_value(path: &[PathComponent]) -> Value {
    Value::Array(path.iter().map(Value::from).collect())
}

/// Parses a path value (`["a", 0]`) back into components.
pub fn path_from_value(value: &Value) -> Result<Path, ValueError> {
    match value {
        Value::Array(parts) => parts.iter().map(component).collect(),
        other => Err(ValueError::NotAPath(type_name(other))),
    }
}

/// Reads the value at `path`; absent locations read as `null`.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use json_filter_value::{get_path, PathComponent};
///
/// let doc = json!({"a": [10, 20]});
/// let path = [PathComponent::Key("a".into()), PathComponent::Index(-1)];
/// assert_eq!(get_path(&doc, &path).unwrap(), json!(20));
///
/// let missing = [PathComponent::Key("b".into()), PathComponent::Key("c".into())];
/// assert_eq!(get_path(&doc, &missing).unwrap(), json!(null));
/// ```
pub fn get_path(value: &Value, path: &[PathComponent]) -> Result<Value, ValueError> {
    let mut current = value;
    for (i, step) in path.iter().enumerate() {
        let next = match (current, step) {
            (Value::Null, _) => return Ok(Value::Null),
            (target, PathComponent::Slice(from, to)) => {
                return get_path(&slice(target, *from, *to)?, &path[i + 1..]);
            }
            (Value::Object(map), PathComponent::Key(k)) => map.get(k),
            (Value::Array(arr), PathComponent::Index(i)) => {
                resolve_index(arr.len(), *i).and_then(|i| arr.get(i))
            }
            (other, step) => {
                return Err(ValueError::CannotIndex {
                    target: type_name(other),
                    key: step.to_string(),
                })
            }
        };
        match next {
            Some(v) => current = v,
            None => return Ok(Value::Null),
        }
    }
    Ok(current.clone())
}

/// Replaces the value at `path` with `new`, creating containers on the way.
///
/// `null` turns into an object for a key step and into an array for an
/// index step. Arrays grow with `null` padding when an index lies past the
/// end. A negative index before the start of an array is an error.
pub fn set_path(value: Value, path: &[PathComponent], new: Value) -> Result<Value, ValueError> {
    let Some((head, rest)) = path.split_first() else {
        return Ok(new);
    };
    match (value, head) {
        (Value::Null, PathComponent::Key(k)) => {
            let mut map = Map::new();
            map.insert(k.clone(), set_path(Value::Null, rest, new)?);
            Ok(Value::Object(map))
        }
        (Value::Object(mut map), PathComponent::Key(k)) => {
            let slot = map.entry(k.clone()).or_insert(Value::Null);
            let child = std::mem::take(slot);
            *slot = set_path(child, rest, new)?;
            Ok(Value::Object(map))
        }
        (Value::Null, PathComponent::Index(i)) => set_in_array(Vec::new(), *i, rest, new),
        (Value::Array(arr), PathComponent::Index(i)) => set_in_array(arr, *i, rest, new),
        (Value::Null, PathComponent::Slice(from, to)) => {
            set_slice(Vec::new(), *from, *to, rest, new)
        }
        (Value::Array(arr), PathComponent::Slice(from, to)) => {
            set_slice(arr, *from, *to, rest, new)
        }
        (other, step) => Err(ValueError::CannotIndex {
            target: type_name(&other),
            key: step.to_string(),
        }),
    }
}

fn set_in_array(
    mut arr: Vec<Value>,
    index: i64,
    rest: &[PathComponent],
    new: Value,
) -> Result<Value, ValueError> {
    let i = resolve_index(arr.len(), index).ok_or(ValueError::OutOfBounds)?;
    if i > MAX_ARRAY_INDEX {
        return Err(ValueError::IndexTooLarge);
    }
    if i >= arr.len() {
        arr.resize(i + 1, Value::Null);
    }
    let child = std::mem::take(&mut arr[i]);
    arr[i] = set_path(child, rest, new)?;
    Ok(Value::Array(arr))
}

/// Replaces the elements a slice addresses. The slice is rewritten as an
/// array first; whatever replaces it must still be an array.
fn set_slice(
    mut arr: Vec<Value>,
    from: Option<i64>,
    to: Option<i64>,
    rest: &[PathComponent],
    new: Value,
) -> Result<Value, ValueError> {
    let (start, end) = slice_range(arr.len(), from, to);
    let current = Value::Array(arr[start..end].to_vec());
    match set_path(current, rest, new)? {
        Value::Array(items) => {
            arr.splice(start..end, items);
            Ok(Value::Array(arr))
        }
        other => Err(ValueError::SliceAssign(type_name(&other))),
    }
}

/// Deletes every location in `paths`.
///
/// Paths are deleted from the greatest to the least (in the value order of
/// their array form), so deleting one array element never shifts the index
/// of another pending deletion. Duplicates are deleted once. Deleting the
/// empty path yields `null`.
pub fn del_paths(value: Value, mut paths: Vec<Path>) -> Result<Value, ValueError> {
    paths.sort_by(|a, b| compare(&path_to_value(b), &path_to_value(a)));
    paths.dedup();
    paths.into_iter().try_fold(value, |acc, p| del_path(acc, &p))
}

fn del_path(value: Value, path: &[PathComponent]) -> Result<Value, ValueError> {
    let Some((head, rest)) = path.split_first() else {
        return Ok(Value::Null);
    };
    match (value, head) {
        (Value::Null, _) => Ok(Value::Null),
        (Value::Object(mut map), PathComponent::Key(k)) => {
            if rest.is_empty() {
                map.shift_remove(k);
            } else if let Some(slot) = map.get_mut(k) {
                let child = std::mem::take(slot);
                *slot = del_path(child, rest)?;
            }
            Ok(Value::Object(map))
        }
        (Value::Array(mut arr), PathComponent::Index(i)) => {
            let idx = resolve_index(arr.len(), *i).ok_or(ValueError::OutOfBounds)?;
            if idx < arr.len() {
                if rest.is_empty() {
                    arr.remove(idx);
                } else {
                    let child = std::mem::take(&mut arr[idx]);
                    arr[idx] = del_path(child, rest)?;
                }
            }
            Ok(Value::Array(arr))
        }
        (Value::Array(mut arr), PathComponent::Slice(from, to)) => {
            let (start, end) = slice_range(arr.len(), *from, *to);
            if rest.is_empty() {
                arr.drain(start..end);
            } else {
                match del_path(Value::Array(arr[start..end].to_vec()), rest)? {
                    Value::Array(items) => {
                        arr.splice(start..end, items);
                    }
                    other => return Err(ValueError::SliceAssign(type_name(&other))),
                }
            }
            Ok(Value::Array(arr))
        }
        (other, step) => Err(ValueError::CannotIndex {
            target: type_name(&other),
            key: step.to_string(),
        }),
    }
}
