//! Generator natives: `limit` and `recurse/1`.

use super::NativeDefinition;
use crate::env::Closure;
use crate::error::EvalError;
use crate::eval::ValRs;
use crate::path::PathRs;
use json_filter_value::{type_name, Path, ValueError};
use serde_json::Value;
use std::sync::Arc;

/// Number of outputs `limit` takes; non-positive counts take none.
fn limit_count(n: &Value) -> Result<usize, EvalError> {
    match n {
        Value::Number(n) => {
            let n = n.as_i64().unwrap_or_else(|| n.as_f64().unwrap_or(0.0).ceil() as i64);
            Ok(usize::try_from(n).unwrap_or(0))
        }
        other => Err(ValueError::NotANumber(type_name(other)).into()),
    }
}

fn limit_run<'a>(args: Vec<Closure<'a>>, input: Value) -> ValRs<'a> {
    let mut args = args.into_iter();
    let (Some(n), Some(f)) = (args.next(), args.next()) else {
        return Box::new(std::iter::empty());
    };
    Box::new(n.run(input.clone()).flat_map(move |n| -> ValRs<'a> {
        match n.and_then(|n| limit_count(&n)) {
            Ok(count) => Box::new(f.run(input.clone()).take(count)),
            Err(e) => Box::new(std::iter::once(Err(e))),
        }
    }))
}

fn limit_paths<'a>(args: Vec<Closure<'a>>, current: (Path, Value)) -> PathRs<'a> {
    let mut args = args.into_iter();
    let (Some(n), Some(f)) = (args.next(), args.next()) else {
        return Box::new(std::iter::empty());
    };
    Box::new(n.run(current.1.clone()).flat_map(move |n| -> PathRs<'a> {
        match n.and_then(|n| limit_count(&n)) {
            Ok(count) => Box::new(f.paths(current.clone()).take(count)),
            Err(e) => Box::new(std::iter::once(Err(e))),
        }
    }))
}

/// Pre-order traversal driven by an explicit stack of suspended child
/// streams.
///
/// An item is yielded before its children are produced, and each stream is
/// only pulled when the consumer asks for more, so neither deep nor wide
/// traversals do work ahead of demand.
struct Recurse<'a, T> {
    f: Closure<'a>,
    step: fn(&Closure<'a>, T) -> Box<dyn Iterator<Item = Result<T, EvalError>> + 'a>,
    pending: Option<T>,
    stack: Vec<Box<dyn Iterator<Item = Result<T, EvalError>> + 'a>>,
}

impl<'a, T: Clone> Recurse<'a, T> {
    fn visit(&mut self, item: T) -> T {
        let children = (self.step)(&self.f, item.clone());
        self.stack.push(children);
        item
    }
}

impl<'a, T: Clone> Iterator for Recurse<'a, T> {
    type Item = Result<T, EvalError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(item) = self.pending.take() {
            return Some(Ok(self.visit(item)));
        }
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(Ok(item)) => return Some(Ok(self.visit(item))),
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

fn recurse_run<'a>(args: Vec<Closure<'a>>, input: Value) -> ValRs<'a> {
    let Some(f) = args.into_iter().next() else {
        return Box::new(std::iter::empty());
    };
    Box::new(Recurse {
        f,
        step: |f, v| f.run(v),
        pending: Some(input),
        stack: Vec::new(),
    })
}

fn recurse_paths<'a>(args: Vec<Closure<'a>>, current: (Path, Value)) -> PathRs<'a> {
    let Some(f) = args.into_iter().next() else {
        return Box::new(std::iter::empty());
    };
    Box::new(Recurse {
        f,
        step: |f, pv| f.paths(pv),
        pending: Some(current),
        stack: Vec::new(),
    })
}

pub fn natives() -> Vec<Arc<NativeDefinition>> {
    vec![
        Arc::new(NativeDefinition {
            name: "limit",
            arity: 2,
            run: limit_run,
            paths: Some(limit_paths),
        }),
        Arc::new(NativeDefinition {
            name: "recurse",
            arity: 1,
            run: recurse_run,
            paths: Some(recurse_paths),
        }),
    ]
}

#[cfg(test)]
mod tests {
    use crate::Engine;
    use serde_json::json;

    #[test]
    fn test_limit() {
        let engine = Engine::core();
        assert_eq!(
            engine.run("limit(2; 1, 2, 3)", json!(null)).unwrap(),
            vec![json!(1), json!(2)]
        );
        assert!(engine.run("limit(0; 1, 2)", json!(null)).unwrap().is_empty());
        assert!(engine.run("limit(-1; 1, 2)", json!(null)).unwrap().is_empty());
        assert!(engine.run(r#"limit("a"; 1)"#, json!(null)).is_err());
    }

    #[test]
    fn test_limit_stops_before_error() {
        let engine = Engine::core();
        assert_eq!(
            engine.run("limit(1; 1, error(\"x\"))", json!(null)).unwrap(),
            vec![json!(1)]
        );
    }

    #[test]
    fn test_recurse_is_pre_order() {
        let engine = Engine::core();
        let out = engine
            .run("recurse(.[]?)", json!({"a": [1, 2], "b": 3}))
            .unwrap();
        assert_eq!(
            out,
            vec![
                json!({"a": [1, 2], "b": 3}),
                json!([1, 2]),
                json!(1),
                json!(2),
                json!(3)
            ]
        );
    }

    #[test]
    fn test_recurse_is_lazy() {
        let engine = Engine::core();
        // An unbounded recursion truncated by limit.
        assert_eq!(
            engine.run("limit(4; 0 | recurse(. + 1))", json!(null)).unwrap(),
            vec![json!(0), json!(1), json!(2), json!(3)]
        );
    }

    #[test]
    fn test_recurse_paths() {
        let engine = Engine::core();
        assert_eq!(
            engine.run("path(recurse(.[]?))", json!({"a": [7]})).unwrap(),
            vec![json!([]), json!(["a"]), json!(["a", 0])]
        );
    }
}
