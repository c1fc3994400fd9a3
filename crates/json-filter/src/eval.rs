//! Lazy generator evaluation.
//!
//! Every filter evaluates to a boxed iterator of results. Building the
//! iterator does no evaluation; work happens when the consumer pulls.

use crate::env::{Closure, Env, Resolved};
use crate::error::EvalError;
use crate::path;
use crate::types::*;
use json_filter_value::{
    add, compare, div, equal, field, index, is_truthy, mul, neg, rem, slice, slice_bounds, sub,
    type_name, ValueError,
};
use serde_json::{Map, Value};
use std::cmp::Ordering;

pub type ValR = Result<Value, EvalError>;
pub type ValRs<'a> = Box<dyn Iterator<Item = ValR> + 'a>;

pub(crate) fn once<'a>(r: ValR) -> ValRs<'a> {
    Box::new(std::iter::once(r))
}

/// A single result computed on first pull.
pub fn once_with<'a>(f: impl FnOnce() -> ValR + 'a) -> ValRs<'a> {
    Box::new(std::iter::once_with(f))
}

/// A stream that is only built on first pull.
pub(crate) fn lazy<'a>(f: impl FnOnce() -> ValRs<'a> + 'a) -> ValRs<'a> {
    Box::new(std::iter::once_with(f).flatten())
}

/// Applies `f` to every successful output of `xs`; errors pass through.
pub(crate) fn flat_map_ok<'a>(xs: ValRs<'a>, f: impl Fn(Value) -> ValRs<'a> + 'a) -> ValRs<'a> {
    Box::new(xs.flat_map(move |x| match x {
        Ok(x) => f(x),
        Err(e) => once(Err(e)),
    }))
}

/// Outputs of a filter, ending after the first error.
pub struct Outputs<'a> {
    inner: ValRs<'a>,
    failed: bool,
}

impl<'a> Iterator for Outputs<'a> {
    type Item = ValR;

    fn next(&mut self) -> Option<ValR> {
        if self.failed {
            return None;
        }
        let next = self.inner.next()?;
        self.failed = next.is_err();
        Some(next)
    }
}

/// Evaluates `filter` on `input`.
///
/// The returned iterator yields the outputs in order. An error is yielded
/// as the last item.
pub fn evaluate<'a>(filter: &'a Filter, input: Value, env: Env<'a>) -> Outputs<'a> {
    Outputs {
        inner: run(filter, env, input),
        failed: false,
    }
}

pub(crate) fn math(l: Value, op: MathOp, r: Value) -> ValR {
    Ok(match op {
        MathOp::Add => add(l, r)?,
        MathOp::Sub => sub(l, r)?,
        MathOp::Mul => mul(l, r)?,
        MathOp::Div => div(l, r)?,
        MathOp::Rem => rem(l, r)?,
    })
}

fn cmp(l: &Value, op: CmpOp, r: &Value) -> bool {
    match op {
        CmpOp::Eq => equal(l, r),
        CmpOp::Ne => !equal(l, r),
        CmpOp::Lt => compare(l, r) == Ordering::Less,
        CmpOp::Le => compare(l, r) != Ordering::Greater,
        CmpOp::Gt => compare(l, r) == Ordering::Greater,
        CmpOp::Ge => compare(l, r) != Ordering::Less,
    }
}

type BoundsR = Result<(Option<i64>, Option<i64>), EvalError>;

/// Slice bounds as `(from, to)` pairs; `from` outermost. An omitted bound
/// is open.
pub(crate) fn bounds<'a>(
    from: Option<&'a Filter>,
    to: Option<&'a Filter>,
    env: Env<'a>,
    input: Value,
) -> Box<dyn Iterator<Item = BoundsR> + 'a> {
    fn bound<'a>(f: Option<&'a Filter>, env: Env<'a>, input: Value) -> ValRs<'a> {
        match f {
            Some(f) => run(f, env, input),
            None => once(Ok(Value::Null)),
        }
    }
    let froms = bound(from, env.clone(), input.clone());
    Box::new(froms.flat_map(move |f| -> Box<dyn Iterator<Item = BoundsR> + 'a> {
        match f {
            Ok(f) => Box::new(
                bound(to, env.clone(), input.clone())
                    .map(move |t| -> BoundsR { Ok(slice_bounds(&f, &t?)?) }),
            ),
            Err(e) => Box::new(std::iter::once(Err(e))),
        }
    }))
}

fn iterate<'a>(value: Value) -> ValRs<'a> {
    match value {
        Value::Array(items) => Box::new(items.into_iter().map(Ok)),
        Value::Object(map) => Box::new(map.into_iter().map(|(_, v)| Ok(v))),
        other => once(Err(ValueError::CannotIterate(type_name(&other)).into())),
    }
}

/// Binds the variables of `pattern` against `value`.
pub(crate) fn bind_pattern<'a>(
    pattern: &'a Pattern,
    value: Value,
    env: Env<'a>,
) -> Result<Env<'a>, EvalError> {
    match pattern {
        Pattern::Var(name) => Ok(env.push_var(name, value)),
        Pattern::Array(items) => items.iter().enumerate().try_fold(env, |env, (i, p)| {
            let item = index(&value, &Value::from(i))?;
            bind_pattern(p, item, env)
        }),
        Pattern::Object(entries) => entries.iter().try_fold(env, |env, (key, p)| {
            let item = field(&value, key)?;
            bind_pattern(p, item, env)
        }),
    }
}

/// Binds call arguments and hands the body environment to `body`.
///
/// Filter parameters become closures over `caller`. Value parameters are
/// additionally bound to each output of their argument in turn, leftmost
/// parameter outermost.
pub(crate) fn bind_args<'a, T: 'a>(
    def: &'a Def,
    args: &'a [Filter],
    caller: Env<'a>,
    callee: Env<'a>,
    input: Value,
    body: impl Fn(Env<'a>) -> Box<dyn Iterator<Item = Result<T, EvalError>> + 'a> + Clone + 'a,
) -> Box<dyn Iterator<Item = Result<T, EvalError>> + 'a> {
    let callee = def.params.iter().zip(args).fold(callee, |env, (p, a)| {
        env.push_arg(
            p.name(),
            Closure {
                filter: a,
                env: caller.clone(),
            },
        )
    });
    bind_values(&def.params, args, caller, callee, input, body)
}

fn bind_values<'a, T: 'a>(
    params: &'a [Param],
    args: &'a [Filter],
    caller: Env<'a>,
    callee: Env<'a>,
    input: Value,
    body: impl Fn(Env<'a>) -> Box<dyn Iterator<Item = Result<T, EvalError>> + 'a> + Clone + 'a,
) -> Box<dyn Iterator<Item = Result<T, EvalError>> + 'a> {
    let (Some((param, params)), Some((arg, args))) = (params.split_first(), args.split_first())
    else {
        return body(callee);
    };
    match param {
        Param::Filter(_) => bind_values(params, args, caller, callee, input, body),
        Param::Value(name) => {
            let outputs = run(arg, caller.clone(), input.clone());
            Box::new(outputs.flat_map(
                move |v| -> Box<dyn Iterator<Item = Result<T, EvalError>> + 'a> {
                    match v {
                        Ok(v) => bind_values(
                            params,
                            args,
                            caller.clone(),
                            callee.push_var(name, v),
                            input.clone(),
                            body.clone(),
                        ),
                        Err(e) => Box::new(std::iter::once(Err(e))),
                    }
                },
            ))
        }
    }
}

fn call<'a>(name: &'a str, args: &'a [Filter], env: Env<'a>, input: Value) -> ValRs<'a> {
    let resolved = match env.resolve(name, args.len()) {
        Ok(r) => r,
        Err(e) => return once(Err(e)),
    };
    match resolved {
        Resolved::Closure(closure) => closure.run(input),
        Resolved::Def(def, callee) => {
            let body = &def.body;
            bind_args(def, args, env, callee, input.clone(), move |env| {
                run(body, env, input.clone())
            })
        }
        Resolved::Native(native) => {
            let closures = args
                .iter()
                .map(|a| Closure {
                    filter: a,
                    env: env.clone(),
                })
                .collect();
            (native.run)(closures, input)
        }
    }
}

fn object<'a>(
    entries: &'a [(Filter, Filter)],
    env: Env<'a>,
    input: Value,
    acc: Map<String, Value>,
) -> ValRs<'a> {
    let Some(((k, v), rest)) = entries.split_first() else {
        return once(Ok(Value::Object(acc)));
    };
    let keys = run(k, env.clone(), input.clone());
    flat_map_ok(keys, move |key| {
        let key = match key {
            Value::String(s) => s,
            other => return once(Err(ValueError::NotAString(type_name(&other)).into())),
        };
        let (env, input, acc) = (env.clone(), input.clone(), acc.clone());
        flat_map_ok(run(v, env.clone(), input.clone()), move |value| {
            let mut acc = acc.clone();
            acc.insert(key.clone(), value);
            object(rest, env.clone(), input.clone(), acc)
        })
    })
}

/// `l op r` for every pair of outputs: `r` outermost, `l` innermost.
fn binary<'a>(
    l: &'a Filter,
    r: &'a Filter,
    env: Env<'a>,
    input: Value,
    f: impl Fn(Value, Value) -> ValR + Copy + 'a,
) -> ValRs<'a> {
    let rhs = run(r, env.clone(), input.clone());
    flat_map_ok(rhs, move |y| {
        Box::new(
            run(l, env.clone(), input.clone()).map(move |x| -> ValR { f(x?, y.clone()) }),
        )
    })
}

fn logic<'a>(l: &'a Filter, op: LogicOp, r: &'a Filter, env: Env<'a>, input: Value) -> ValRs<'a> {
    let lhs = run(l, env.clone(), input.clone());
    flat_map_ok(lhs, move |x| {
        let decided = match op {
            LogicOp::And => !is_truthy(&x),
            LogicOp::Or => is_truthy(&x),
        };
        if decided {
            return once(Ok(Value::Bool(op == LogicOp::Or)));
        }
        Box::new(
            run(r, env.clone(), input.clone()).map(|y| y.map(|y| Value::Bool(is_truthy(&y)))),
        )
    })
}

/// Truthy outputs of `l`, or the outputs of `r` if there are none.
fn alternative<'a>(l: &'a Filter, r: &'a Filter, env: Env<'a>, input: Value) -> ValRs<'a> {
    let mut lhs = Some(
        run(l, env.clone(), input.clone())
            .filter_map(Result::ok)
            .filter(is_truthy),
    );
    let mut any = false;
    let mut rhs: Option<ValRs<'a>> = None;
    Box::new(std::iter::from_fn(move || {
        if let Some(it) = lhs.as_mut() {
            if let Some(v) = it.next() {
                any = true;
                return Some(Ok(v));
            }
            lhs = None;
            if !any {
                rhs = Some(run(r, env.clone(), input.clone()));
            }
        }
        rhs.as_mut()?.next()
    }))
}

/// Outputs of `body` up to its first error, then the outputs of `handler`
/// on the error value.
fn try_catch<'a>(
    body: &'a Filter,
    handler: Option<&'a Filter>,
    env: Env<'a>,
    input: Value,
) -> ValRs<'a> {
    let mut body = Some(run(body, env.clone(), input));
    let mut caught: Option<ValRs<'a>> = None;
    Box::new(std::iter::from_fn(move || {
        if let Some(it) = body.as_mut() {
            match it.next() {
                Some(Ok(v)) => return Some(Ok(v)),
                Some(Err(e)) => {
                    body = None;
                    caught = handler.map(|h| run(h, env.clone(), e.into_value()));
                }
                None => {
                    body = None;
                }
            }
        }
        caught.as_mut()?.next()
    }))
}

fn reduce<'a>(
    source: &'a Filter,
    pattern: &'a Pattern,
    init: &'a Filter,
    update: &'a Filter,
    env: Env<'a>,
    input: Value,
) -> ValRs<'a> {
    let inits = run(init, env.clone(), input.clone());
    flat_map_ok(inits, move |acc| {
        let (env, input) = (env.clone(), input.clone());
        once_with(move || {
            let mut acc = acc;
            for x in run(source, env.clone(), input) {
                let scope = bind_pattern(pattern, x?, env.clone())?;
                let mut next = Value::Null;
                for y in run(update, scope, acc) {
                    next = y?;
                }
                acc = next;
            }
            Ok(acc)
        })
    })
}

fn foreach<'a>(
    source: &'a Filter,
    pattern: &'a Pattern,
    init: &'a Filter,
    update: &'a Filter,
    extract: Option<&'a Filter>,
    env: Env<'a>,
    input: Value,
) -> ValRs<'a> {
    let inits = run(init, env.clone(), input.clone());
    flat_map_ok(inits, move |state| {
        let env = env.clone();
        let mut state = Some(state);
        let items = run(source, env.clone(), input.clone());
        Box::new(items.flat_map(move |x| -> ValRs<'a> {
            let Some(current) = state.take() else {
                return Box::new(std::iter::empty());
            };
            let scope = match x.and_then(|x| bind_pattern(pattern, x, env.clone())) {
                Ok(scope) => scope,
                Err(e) => return once(Err(e)),
            };
            let mut outputs = Vec::new();
            let mut error = None;
            for y in run(update, scope.clone(), current.clone()) {
                match y {
                    Ok(y) => outputs.push(y),
                    Err(e) => {
                        error = Some(e);
                        break;
                    }
                }
            }
            if error.is_none() {
                state = Some(outputs.last().cloned().unwrap_or(current));
            }
            let extracted = outputs.into_iter().flat_map(move |y| match extract {
                Some(e) => run(e, scope.clone(), y),
                None => once(Ok(y)),
            });
            Box::new(extracted.chain(error.map(Err)))
        }))
    })
}

/// Evaluates `filter` on `input` in `env`.
pub fn run<'a>(filter: &'a Filter, env: Env<'a>, input: Value) -> ValRs<'a> {
    match filter {
        Filter::Id => once(Ok(input)),
        Filter::Literal(v) => once_with(move || Ok(v.clone())),
        Filter::Var(name) => once_with(move || env.var(name)),
        Filter::Field(target, name) => Box::new(
            run(target, env, input).map(move |t| -> ValR { Ok(field(&t?, name)?) }),
        ),
        Filter::Index(target, idx) => {
            let targets = run(target, env.clone(), input.clone());
            flat_map_ok(targets, move |t| {
                Box::new(
                    run(idx, env.clone(), input.clone())
                        .map(move |i| -> ValR { Ok(index(&t, &i?)?) }),
                )
            })
        }
        Filter::Slice(target, from, to) => {
            let (from, to) = (from.as_deref(), to.as_deref());
            let targets = run(target, env.clone(), input.clone());
            flat_map_ok(targets, move |t| {
                Box::new(
                    bounds(from, to, env.clone(), input.clone())
                        .map(move |b| -> ValR {
                            let (from, to) = b?;
                            Ok(slice(&t, from, to)?)
                        }),
                )
            })
        }
        Filter::Iterate(target) => flat_map_ok(run(target, env, input), iterate),
        Filter::Pipe(l, r) => flat_map_ok(run(l, env.clone(), input), move |x| {
            run(r, env.clone(), x)
        }),
        Filter::Comma(l, r) => {
            let rhs = {
                let (env, input) = (env.clone(), input.clone());
                lazy(move || run(r, env, input))
            };
            Box::new(run(l, env, input).chain(rhs))
        }
        Filter::Array(None) => once(Ok(Value::Array(Vec::new()))),
        Filter::Array(Some(f)) => once_with(move || {
            run(f, env, input)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }),
        Filter::Object(entries) => lazy(move || object(entries, env, input, Map::new())),
        Filter::If(cond, then, otherwise) => {
            let conds = run(cond, env.clone(), input.clone());
            flat_map_ok(conds, move |c| {
                let branch = if is_truthy(&c) { then } else { otherwise };
                run(branch, env.clone(), input.clone())
            })
        }
        Filter::Call(name, args) => lazy(move || call(name, args, env, input)),
        Filter::Bind(source, pattern, body) => {
            let sources = run(source, env.clone(), input.clone());
            flat_map_ok(sources, move |x| match bind_pattern(pattern, x, env.clone()) {
                Ok(scope) => run(body, scope, input.clone()),
                Err(e) => once(Err(e)),
            })
        }
        Filter::Reduce {
            source,
            pattern,
            init,
            update,
        } => reduce(source, pattern, init, update, env, input),
        Filter::Foreach {
            source,
            pattern,
            init,
            update,
            extract,
        } => foreach(source, pattern, init, update, extract.as_deref(), env, input),
        Filter::Update(p, f) => once_with(move || path::update(p, f, input, env)),
        Filter::Assign(p, f) => {
            let values = run(f, env.clone(), input.clone());
            flat_map_ok(values, move |v| {
                let (env, input) = (env.clone(), input.clone());
                once_with(move || path::modify(p, input, env, |_| Ok(Some(v.clone()))))
            })
        }
        Filter::UpdateWith(p, op, f) => {
            let op = *op;
            let values = run(f, env.clone(), input.clone());
            flat_map_ok(values, move |v| {
                let (env, input) = (env.clone(), input.clone());
                once_with(move || {
                    path::modify(p, input, env, |old| math(old, op, v.clone()).map(Some))
                })
            })
        }
        Filter::Try(body, handler) => try_catch(body, handler.as_deref(), env, input),
        Filter::Neg(f) => Box::new(run(f, env, input).map(|x| -> ValR { Ok(neg(x?)?) })),
        Filter::Math(l, op, r) => {
            let op = *op;
            binary(l, r, env, input, move |x, y| math(x, op, y))
        }
        Filter::Cmp(l, op, r) => {
            let op = *op;
            binary(l, r, env, input, move |x, y| Ok(Value::Bool(cmp(&x, op, &y))))
        }
        Filter::Logic(l, op, r) => logic(l, *op, r, env, input),
        Filter::Alt(l, r) => alternative(l, r, env, input),
        Filter::Define(defs, body) => {
            let env = defs.iter().fold(env, |env, def| env.push_def(def));
            run(body, env, input)
        }
    }
}
