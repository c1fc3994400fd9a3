use crate::defs::{Definitions, STD};
use crate::env::Env;
use crate::error::EvalError;
use crate::eval::{evaluate, Outputs};
use crate::natives::{natives_map, NativeDefinition};
use crate::parser::FilterParser;
use crate::path::update;
use crate::types::Filter;
use serde_json::Value;
use std::sync::Arc;

/// Owns the global definition table and evaluates filters against it.
///
/// # Examples
///
/// ```
/// use json_filter::Engine;
/// use serde_json::json;
///
/// let engine = Engine::new();
/// let out = engine.run("map(. * 2)", json!([1, 2, 3])).unwrap();
/// assert_eq!(out, vec![json!([2, 4, 6])]);
/// ```
pub struct Engine {
    defs: Definitions,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Natives plus the standard library.
    pub fn new() -> Self {
        let mut engine = Self::core();
        engine.define(STD).expect("the standard library is valid");
        engine
    }

    /// Natives only.
    pub fn core() -> Self {
        Self {
            defs: Definitions::with_natives(natives_map()),
        }
    }

    /// Adds a native, replacing any native with the same name and arity.
    pub fn with_native(mut self, native: NativeDefinition) -> Self {
        self.defs.insert_native(Arc::new(native));
        self
    }

    /// Registers the definitions in `source`. A redefinition of an existing
    /// name and arity only affects filters and definitions that come after
    /// it.
    pub fn define(&mut self, source: &str) -> Result<usize, EvalError> {
        self.defs.define(source)
    }

    pub fn parse(&self, source: &str) -> Result<Filter, EvalError> {
        Ok(FilterParser::parse(source)?)
    }

    /// Top-level environment: every definition registered so far is visible.
    pub fn env(&self) -> Env<'_> {
        Env::new(&self.defs)
    }

    pub fn definitions(&self) -> &Definitions {
        &self.defs
    }

    pub fn evaluate<'a>(&'a self, filter: &'a Filter, input: Value) -> Outputs<'a> {
        evaluate(filter, input, self.env())
    }

    /// Parses and evaluates `source`, collecting every output.
    pub fn run(&self, source: &str, input: Value) -> Result<Vec<Value>, EvalError> {
        let filter = self.parse(source)?;
        self.evaluate(&filter, input).collect()
    }

    /// `path |= f` on `input`.
    pub fn update(&self, path: &Filter, f: &Filter, input: Value) -> Result<Value, EvalError> {
        update(path, f, input, self.env())
    }
}
