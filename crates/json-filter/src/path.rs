//! Path-mode evaluation and the update operators.
//!
//! In path mode a filter produces the locations it would read instead of
//! the values found there. `p |= f`, `p = v` and `p op= v` are built on top:
//! they walk the locations of `p` and rewrite the input at each of them.

use crate::env::{Closure, Env, Resolved};
use crate::error::EvalError;
use crate::eval::{self, bind_args, bind_pattern};
use crate::types::Filter;
use json_filter_value::{
    children, component, del_paths, field, get_path, index, is_truthy, set_path, slice, Path,
    PathComponent,
};
use serde_json::Value;

pub type PathR = Result<(Path, Value), EvalError>;
pub type PathRs<'a> = Box<dyn Iterator<Item = PathR> + 'a>;

fn once<'a>(r: PathR) -> PathRs<'a> {
    Box::new(std::iter::once(r))
}

fn lazy<'a>(f: impl FnOnce() -> PathRs<'a> + 'a) -> PathRs<'a> {
    Box::new(std::iter::once_with(f).flatten())
}

fn flat_map_ok<'a>(
    xs: PathRs<'a>,
    f: impl Fn((Path, Value)) -> PathRs<'a> + 'a,
) -> PathRs<'a> {
    Box::new(xs.flat_map(move |x| match x {
        Ok(x) => f(x),
        Err(e) => once(Err(e)),
    }))
}

fn not_a_path<'a>(what: impl Into<String>) -> PathRs<'a> {
    once(Err(EvalError::Path(what.into())))
}

fn extend(path: &Path, step: PathComponent) -> Path {
    let mut path = path.clone();
    path.push(step);
    path
}

/// Evaluates `filter` in path mode, starting from `current`, a location
/// and the value found there.
pub fn paths<'a>(filter: &'a Filter, env: Env<'a>, current: (Path, Value)) -> PathRs<'a> {
    match filter {
        Filter::Id => once(Ok(current)),
        Filter::Field(target, name) => {
            flat_map_ok(paths(target, env, current), move |(p, v)| {
                once(
                    field(&v, name)
                        .map(|found| (extend(&p, PathComponent::Key(name.clone())), found))
                        .map_err(EvalError::from),
                )
            })
        }
        Filter::Index(target, idx) => {
            let root = current.1.clone();
            flat_map_ok(paths(target, env.clone(), current), move |(p, v)| {
                Box::new(
                    eval::run(idx, env.clone(), root.clone()).map(move |i| -> PathR {
                        let i = i?;
                        let step = component(&i)?;
                        Ok((extend(&p, step), index(&v, &i)?))
                    }),
                )
            })
        }
        Filter::Slice(target, from, to) => {
            let (from, to) = (from.as_deref(), to.as_deref());
            let root = current.1.clone();
            flat_map_ok(paths(target, env.clone(), current), move |(p, v)| {
                Box::new(
                    eval::bounds(from, to, env.clone(), root.clone()).map(move |b| -> PathR {
                        let (from, to) = b?;
                        let found = slice(&v, from, to)?;
                        Ok((extend(&p, PathComponent::Slice(from, to)), found))
                    }),
                )
            })
        }
        Filter::Iterate(target) => flat_map_ok(paths(target, env, current), |(p, v)| {
            match children(v) {
                Ok(items) => Box::new(
                    items
                        .into_iter()
                        .map(move |(step, child)| Ok((extend(&p, step), child))),
                ),
                Err(e) => once(Err(e.into())),
            }
        }),
        Filter::Pipe(l, r) => flat_map_ok(paths(l, env.clone(), current), move |pv| {
            paths(r, env.clone(), pv)
        }),
        Filter::Comma(l, r) => {
            let rhs = {
                let (env, current) = (env.clone(), current.clone());
                lazy(move || paths(r, env, current))
            };
            Box::new(paths(l, env, current).chain(rhs))
        }
        Filter::If(cond, then, otherwise) => {
            let conds = eval::run(cond, env.clone(), current.1.clone());
            Box::new(conds.flat_map(move |c| -> PathRs<'a> {
                match c {
                    Ok(c) => {
                        let branch = if is_truthy(&c) { then } else { otherwise };
                        paths(branch, env.clone(), current.clone())
                    }
                    Err(e) => once(Err(e)),
                }
            }))
        }
        Filter::Alt(l, r) => {
            let mut lhs = Some(
                paths(l, env.clone(), current.clone())
                    .filter_map(Result::ok)
                    .filter(|(_, v)| is_truthy(v)),
            );
            let mut any = false;
            let mut rhs: Option<PathRs<'a>> = None;
            Box::new(std::iter::from_fn(move || {
                if let Some(it) = lhs.as_mut() {
                    if let Some(pv) = it.next() {
                        any = true;
                        return Some(Ok(pv));
                    }
                    lhs = None;
                    if !any {
                        rhs = Some(paths(r, env.clone(), current.clone()));
                    }
                }
                rhs.as_mut()?.next()
            }))
        }
        Filter::Bind(source, pattern, body) => {
            let sources = eval::run(source, env.clone(), current.1.clone());
            Box::new(sources.flat_map(move |x| -> PathRs<'a> {
                match x.and_then(|x| bind_pattern(pattern, x, env.clone())) {
                    Ok(scope) => paths(body, scope, current.clone()),
                    Err(e) => once(Err(e)),
                }
            }))
        }
        Filter::Try(body, None) => {
            let mut body = Some(paths(body, env, current));
            Box::new(std::iter::from_fn(move || {
                let next = body.as_mut()?.next()?;
                if next.is_err() {
                    body = None;
                    return None;
                }
                Some(next)
            }))
        }
        Filter::Define(defs, body) => {
            let env = defs.iter().fold(env, |env, def| env.push_def(def));
            paths(body, env, current)
        }
        Filter::Call(name, args) => lazy(move || call(name, args, env, current)),
        other => not_a_path(other.describe()),
    }
}

fn call<'a>(name: &'a str, args: &'a [Filter], env: Env<'a>, current: (Path, Value)) -> PathRs<'a> {
    let resolved = match env.resolve(name, args.len()) {
        Ok(r) => r,
        Err(e) => return once(Err(e)),
    };
    match resolved {
        Resolved::Closure(closure) => closure.paths(current),
        Resolved::Def(def, callee) => {
            let body = &def.body;
            let input = current.1.clone();
            bind_args(def, args, env, callee, input, move |env| {
                paths(body, env, current.clone())
            })
        }
        Resolved::Native(native) => match native.paths {
            Some(run) => {
                let closures = args
                    .iter()
                    .map(|a| Closure {
                        filter: a,
                        env: env.clone(),
                    })
                    .collect();
                run(closures, current)
            }
            None => not_a_path(format!("{}/{}", native.name, native.arity)),
        },
    }
}

/// Rewrites `input` at every path of `path_expr`.
///
/// Paths are produced lazily from the original input. For each path,
/// `replace` receives the value currently stored there (including earlier
/// rewrites) and returns the replacement, or `None` to delete the location.
/// Deletions are applied after all rewrites. Any error aborts the whole
/// rewrite.
pub fn modify<'a>(
    path_expr: &'a Filter,
    input: Value,
    env: Env<'a>,
    mut replace: impl FnMut(Value) -> Result<Option<Value>, EvalError>,
) -> Result<Value, EvalError> {
    let mut working = input.clone();
    let mut deletions = Vec::new();
    for pv in paths(path_expr, env, (Vec::new(), input)) {
        let (path, _) = pv?;
        let current = get_path(&working, &path)?;
        match replace(current)? {
            Some(new) => working = set_path(working, &path, new)?,
            None => {
                log::trace!("scheduling deletion of {path:?}");
                deletions.push(path);
            }
        }
    }
    if deletions.is_empty() {
        return Ok(working);
    }
    log::trace!("deleting {} paths", deletions.len());
    Ok(del_paths(working, deletions)?)
}

/// `path_expr |= f`: replaces the value at each path with the first output
/// of `f` on it, deleting the location when `f` has no output.
///
/// # Examples
///
/// ```
/// use json_filter::{parse, update, Engine};
/// use serde_json::json;
///
/// let engine = Engine::new();
/// let (path, f) = (parse(".[]").unwrap(), parse(". * 10").unwrap());
/// let out = update(&path, &f, json!({"a": 1, "b": 2}), engine.env()).unwrap();
/// assert_eq!(out.to_string(), r#"{"a":10,"b":20}"#);
/// ```
pub fn update<'a>(
    path_expr: &'a Filter,
    f: &'a Filter,
    input: Value,
    env: Env<'a>,
) -> Result<Value, EvalError> {
    let update_env = env.clone();
    modify(path_expr, input, env, |old| {
        eval::run(f, update_env.clone(), old).next().transpose()
    })
}
