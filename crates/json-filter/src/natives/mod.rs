//! Native definitions: primitives implemented by the host.

pub mod basic;
pub mod generators;
pub mod paths;

use crate::env::Closure;
use crate::eval::ValRs;
use crate::path::PathRs;
use json_filter_value::Path;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Value-mode implementation: receives one closure per argument and the
/// input.
pub type RunFn = for<'a> fn(Vec<Closure<'a>>, Value) -> ValRs<'a>;

/// Path-mode implementation: receives the arguments and the current
/// `(path, value)` pair.
pub type PathFn = for<'a> fn(Vec<Closure<'a>>, (Path, Value)) -> PathRs<'a>;

/// A native, keyed by name and arity.
pub struct NativeDefinition {
    pub name: &'static str,
    pub arity: usize,
    pub run: RunFn,
    /// `None` when the native cannot be used as a path expression.
    pub paths: Option<PathFn>,
}

/// Map of native name -> definitions with that name, one per arity.
pub type NativeMap = HashMap<&'static str, Vec<Arc<NativeDefinition>>>;

/// All natives combined.
pub fn all_natives() -> Vec<Arc<NativeDefinition>> {
    let mut natives = Vec::new();
    natives.extend(basic::natives());
    natives.extend(paths::natives());
    natives.extend(generators::natives());
    natives
}

/// Builds a `NativeMap` from a list of native definitions.
pub fn natives_to_map(natives: Vec<Arc<NativeDefinition>>) -> NativeMap {
    let mut map: NativeMap = HashMap::new();
    for native in natives {
        let entry = map.entry(native.name).or_default();
        entry.retain(|n| n.arity != native.arity);
        entry.push(native);
    }
    map
}

/// Build the native map from all natives.
pub fn natives_map() -> NativeMap {
    natives_to_map(all_natives())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_keys_by_name_and_arity() {
        let map = natives_map();
        let error = &map["error"];
        assert_eq!(error.len(), 2);
        assert!(map["limit"].iter().all(|n| n.arity == 2));
        assert!(map["recurse"][0].paths.is_some());
        assert!(map["length"][0].paths.is_none());
    }
}
