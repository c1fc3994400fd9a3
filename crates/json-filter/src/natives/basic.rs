//! Basic natives: `empty`, `error`, `length`, `keys`, `has`, `type` and
//! `tostring`.

use super::NativeDefinition;
use crate::env::Closure;
use crate::error::EvalError;
use crate::eval::{once_with, ValR, ValRs};
use crate::path::PathRs;
use json_filter_value::{has, keys, length, to_string, type_name, Path};
use serde_json::Value;
use std::sync::Arc;

fn empty_run<'a>(_: Vec<Closure<'a>>, _: Value) -> ValRs<'a> {
    Box::new(std::iter::empty())
}

fn empty_paths<'a>(_: Vec<Closure<'a>>, _: (Path, Value)) -> PathRs<'a> {
    Box::new(std::iter::empty())
}

fn error_run<'a>(_: Vec<Closure<'a>>, input: Value) -> ValRs<'a> {
    once_with(move || Err(EvalError::Thrown(input)))
}

fn error_paths<'a>(_: Vec<Closure<'a>>, (_, value): (Path, Value)) -> PathRs<'a> {
    Box::new(std::iter::once_with(move || Err(EvalError::Thrown(value))))
}

fn error_msg_run<'a>(args: Vec<Closure<'a>>, input: Value) -> ValRs<'a> {
    let Some(msg) = args.into_iter().next() else {
        return Box::new(std::iter::empty());
    };
    Box::new(msg.run(input).map(|m| -> ValR { Err(EvalError::Thrown(m?)) }))
}

fn length_run<'a>(_: Vec<Closure<'a>>, input: Value) -> ValRs<'a> {
    once_with(move || Ok(length(&input)?))
}

fn keys_run<'a>(_: Vec<Closure<'a>>, input: Value) -> ValRs<'a> {
    once_with(move || Ok(keys(&input, true)?))
}

fn keys_unsorted_run<'a>(_: Vec<Closure<'a>>, input: Value) -> ValRs<'a> {
    once_with(move || Ok(keys(&input, false)?))
}

fn has_run<'a>(args: Vec<Closure<'a>>, input: Value) -> ValRs<'a> {
    let Some(key) = args.into_iter().next() else {
        return Box::new(std::iter::empty());
    };
    Box::new(
        key.run(input.clone())
            .map(move |k| -> ValR { Ok(Value::Bool(has(&input, &k?)?)) }),
    )
}

fn type_run<'a>(_: Vec<Closure<'a>>, input: Value) -> ValRs<'a> {
    once_with(move || Ok(Value::String(type_name(&input).to_string())))
}

fn tostring_run<'a>(_: Vec<Closure<'a>>, input: Value) -> ValRs<'a> {
    once_with(move || Ok(Value::String(to_string(&input))))
}

pub fn natives() -> Vec<Arc<NativeDefinition>> {
    vec![
        Arc::new(NativeDefinition {
            name: "empty",
            arity: 0,
            run: empty_run,
            paths: Some(empty_paths),
        }),
        Arc::new(NativeDefinition {
            name: "error",
            arity: 0,
            run: error_run,
            paths: Some(error_paths),
        }),
        Arc::new(NativeDefinition {
            name: "error",
            arity: 1,
            run: error_msg_run,
            paths: None,
        }),
        Arc::new(NativeDefinition {
            name: "length",
            arity: 0,
            run: length_run,
            paths: None,
        }),
        Arc::new(NativeDefinition {
            name: "keys",
            arity: 0,
            run: keys_run,
            paths: None,
        }),
        Arc::new(NativeDefinition {
            name: "keys_unsorted",
            arity: 0,
            run: keys_unsorted_run,
            paths: None,
        }),
        Arc::new(NativeDefinition {
            name: "has",
            arity: 1,
            run: has_run,
            paths: None,
        }),
        Arc::new(NativeDefinition {
            name: "type",
            arity: 0,
            run: type_run,
            paths: None,
        }),
        Arc::new(NativeDefinition {
            name: "tostring",
            arity: 0,
            run: tostring_run,
            paths: None,
        }),
    ]
}
