//! Path natives: `getpath`, `setpath`, `delpaths` and `path`.

use super::NativeDefinition;
use crate::env::Closure;
use crate::eval::{ValR, ValRs};
use crate::path::{PathR, PathRs};
use json_filter_value::{
    del_paths, get_path, path_from_value, path_to_value, set_path, Path, ValueError,
};
use serde_json::Value;
use std::sync::Arc;

fn getpath_run<'a>(args: Vec<Closure<'a>>, input: Value) -> ValRs<'a> {
    let Some(path) = args.into_iter().next() else {
        return Box::new(std::iter::empty());
    };
    Box::new(path.run(input.clone()).map(move |p| -> ValR {
        let p = path_from_value(&p?)?;
        Ok(get_path(&input, &p)?)
    }))
}

fn getpath_paths<'a>(args: Vec<Closure<'a>>, (at, value): (Path, Value)) -> PathRs<'a> {
    let Some(path) = args.into_iter().next() else {
        return Box::new(std::iter::empty());
    };
    Box::new(path.run(value.clone()).map(move |p| -> PathR {
        let p = path_from_value(&p?)?;
        let found = get_path(&value, &p)?;
        let mut full = at.clone();
        full.extend(p);
        Ok((full, found))
    }))
}

fn setpath_run<'a>(args: Vec<Closure<'a>>, input: Value) -> ValRs<'a> {
    let mut args = args.into_iter();
    let (Some(path), Some(new)) = (args.next(), args.next()) else {
        return Box::new(std::iter::empty());
    };
    Box::new(path.run(input.clone()).flat_map(move |p| -> ValRs<'a> {
        let p = match p.and_then(|p| Ok(path_from_value(&p)?)) {
            Ok(p) => p,
            Err(e) => return Box::new(std::iter::once(Err(e))),
        };
        let input = input.clone();
        Box::new(
            new.run(input.clone())
                .map(move |v| -> ValR { Ok(set_path(input.clone(), &p, v?)?) }),
        )
    }))
}

fn delpaths_run<'a>(args: Vec<Closure<'a>>, input: Value) -> ValRs<'a> {
    let Some(paths) = args.into_iter().next() else {
        return Box::new(std::iter::empty());
    };
    Box::new(paths.run(input.clone()).map(move |ps| -> ValR {
        let paths = match ps? {
            Value::Array(items) => items
                .iter()
                .map(path_from_value)
                .collect::<Result<Vec<_>, _>>()?,
            other => {
                return Err(ValueError::NotAPath(json_filter_value::type_name(&other)).into())
            }
        };
        Ok(del_paths(input.clone(), paths)?)
    }))
}

fn path_run<'a>(args: Vec<Closure<'a>>, input: Value) -> ValRs<'a> {
    let Some(f) = args.into_iter().next() else {
        return Box::new(std::iter::empty());
    };
    Box::new(
        f.paths((Vec::new(), input))
            .map(|r| r.map(|(p, _)| path_to_value(&p))),
    )
}

pub fn natives() -> Vec<Arc<NativeDefinition>> {
    vec![
        Arc::new(NativeDefinition {
            name: "getpath",
            arity: 1,
            run: getpath_run,
            paths: Some(getpath_paths),
        }),
        Arc::new(NativeDefinition {
            name: "setpath",
            arity: 2,
            run: setpath_run,
            paths: None,
        }),
        Arc::new(NativeDefinition {
            name: "delpaths",
            arity: 1,
            run: delpaths_run,
            paths: None,
        }),
        Arc::new(NativeDefinition {
            name: "path",
            arity: 1,
            run: path_run,
            paths: None,
        }),
    ]
}
