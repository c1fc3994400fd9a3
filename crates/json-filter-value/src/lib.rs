//! json-filter-value - value-domain operations for json-filter.
//!
//! Filters operate on plain [`serde_json::Value`]s (with key order
//! preserved). This crate supplies the operations the evaluator needs on
//! top of them: structural equality, a total order, truthiness, arithmetic,
//! indexing and path-based reads, writes and deletions.
//!
//! # Example
//!
//! ```
//! use json_filter_value::{add, equal, set_path, PathComponent};
//! use serde_json::json;
//!
//! let doc = json!({"a": {"b": 1}});
//! let path = [PathComponent::Key("a".into()), PathComponent::Key("b".into())];
//! let doc = set_path(doc, &path, add(json!(1), json!(1.0)).unwrap()).unwrap();
//!
//! assert!(equal(&doc, &json!({"a": {"b": 2}})));
//! ```

pub mod access;
pub mod equal;
pub mod error;
pub mod ops;
pub mod order;
pub mod path;

pub use access::{
    children, component, field, has, index, keys, length, resolve_index, slice, slice_bounds,
    slice_range, to_string,
};
pub use equal::equal;
pub use error::ValueError;
pub use ops::{add, div, mul, neg, number, preview, rem, sub};
pub use order::compare;
pub use path::{del_paths, get_path, path_from_value, path_to_value, set_path, Path, PathComponent};

use serde_json::Value;

/// Name of a value's type as reported by `type`.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Everything except `false` and `null` is truthy.
pub fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}
