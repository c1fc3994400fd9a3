//! Evaluation environments.
//!
//! An [`Env`] is an immutable chain of local scopes plus a window (the
//! horizon) into the global definition table. Pushing a binding returns a
//! new environment and never changes the one it was pushed onto, so
//! closures captured earlier keep seeing exactly what they saw.

use crate::defs::Definitions;
use crate::error::EvalError;
use crate::eval::{self, ValRs};
use crate::natives::NativeDefinition;
use crate::path::{self, PathRs};
use crate::types::{Def, Filter};
use json_filter_value::Path;
use serde_json::Value;
use std::collections::BTreeSet;
use std::rc::Rc;

enum Binding<'a> {
    Var(&'a str, Value),
    Def(&'a Def),
    Arg(&'a str, Closure<'a>),
}

struct Scope<'a> {
    binding: Binding<'a>,
    parent: Option<Rc<Scope<'a>>>,
}

#[derive(Clone)]
pub struct Env<'a> {
    scope: Option<Rc<Scope<'a>>>,
    horizon: usize,
    globals: &'a Definitions,
}

/// A filter argument together with the environment of the call site.
///
/// Closures are evaluated afresh on every reference.
#[derive(Clone)]
pub struct Closure<'a> {
    pub filter: &'a Filter,
    pub env: Env<'a>,
}

impl<'a> Closure<'a> {
    pub fn run(&self, input: Value) -> ValRs<'a> {
        eval::run(self.filter, self.env.clone(), input)
    }

    pub fn paths(&self, current: (Path, Value)) -> PathRs<'a> {
        path::paths(self.filter, self.env.clone(), current)
    }
}

/// What a call resolved to.
pub enum Resolved<'a> {
    /// A definition and the environment its body runs in, before parameters
    /// are bound.
    Def(&'a Def, Env<'a>),
    /// A filter parameter.
    Closure(Closure<'a>),
    Native(&'a NativeDefinition),
}

impl<'a> Env<'a> {
    /// Top-level environment: every global definition is visible.
    pub fn new(globals: &'a Definitions) -> Self {
        Self {
            scope: None,
            horizon: usize::MAX,
            globals,
        }
    }

    pub fn globals(&self) -> &'a Definitions {
        self.globals
    }

    fn push(&self, binding: Binding<'a>) -> Self {
        Self {
            scope: Some(Rc::new(Scope {
                binding,
                parent: self.scope.clone(),
            })),
            horizon: self.horizon,
            globals: self.globals,
        }
    }

    pub fn push_var(&self, name: &'a str, value: Value) -> Self {
        self.push(Binding::Var(name, value))
    }

    pub fn push_def(&self, def: &'a Def) -> Self {
        self.push(Binding::Def(def))
    }

    pub fn push_arg(&self, name: &'a str, closure: Closure<'a>) -> Self {
        self.push(Binding::Arg(name, closure))
    }

    fn scopes(&self) -> impl Iterator<Item = &Rc<Scope<'a>>> {
        std::iter::successors(self.scope.as_ref(), |s| s.parent.as_ref())
    }

    pub fn var(&self, name: &str) -> Result<Value, EvalError> {
        self.scopes()
            .find_map(|s| match &s.binding {
                Binding::Var(n, v) if *n == name => Some(v.clone()),
                _ => None,
            })
            .ok_or_else(|| EvalError::UnboundVariable(name.to_string()))
    }

    /// Resolves `name/arity`: local scopes innermost first, then the
    /// visible part of the global table, then natives.
    pub fn resolve(&self, name: &str, arity: usize) -> Result<Resolved<'a>, EvalError> {
        for scope in self.scopes() {
            match &scope.binding {
                Binding::Def(def) if def.name == name && def.arity() == arity => {
                    let env = Env {
                        scope: Some(Rc::clone(scope)),
                        horizon: self.horizon,
                        globals: self.globals,
                    };
                    return Ok(Resolved::Def(*def, env));
                }
                Binding::Arg(n, closure) if *n == name && arity == 0 => {
                    return Ok(Resolved::Closure(closure.clone()));
                }
                _ => {}
            }
        }
        if let Some(ordinal) = self.globals.lookup(name, arity, self.horizon) {
            let env = Env {
                scope: None,
                horizon: ordinal + 1,
                globals: self.globals,
            };
            return Ok(Resolved::Def(self.globals.get(ordinal), env));
        }
        if let Some(native) = self.globals.native(name, arity) {
            return Ok(Resolved::Native(native));
        }
        log::debug!("unresolved call to {name}/{arity}");
        Err(self.unresolved(name, arity))
    }

    fn unresolved(&self, name: &str, arity: usize) -> EvalError {
        let mut available = BTreeSet::new();
        for scope in self.scopes() {
            match &scope.binding {
                Binding::Def(def) if def.name == name => {
                    available.insert(def.arity());
                }
                Binding::Arg(n, _) if *n == name => {
                    available.insert(0);
                }
                _ => {}
            }
        }
        available.extend(self.globals.arities(name, self.horizon));
        if available.is_empty() {
            EvalError::UnboundName {
                name: name.to_string(),
                arity,
            }
        } else {
            EvalError::Arity {
                name: name.to_string(),
                arity,
                available: available.into_iter().collect(),
            }
        }
    }
}
