//! The global definition table.

use crate::error::EvalError;
use crate::natives::{NativeDefinition, NativeMap};
use crate::parser::FilterParser;
use crate::types::Def;
use std::collections::HashMap;
use std::sync::Arc;

/// Source of the standard library.
pub const STD: &str = include_str!("std.jq");

/// Global definitions in registration order, indexed by name, plus the
/// native table.
///
/// A definition is addressed by its ordinal. Lookups take a horizon and only
/// consider ordinals below it, so a definition body never sees anything
/// registered after it.
#[derive(Default)]
pub struct Definitions {
    defs: Vec<Def>,
    index: HashMap<String, Vec<(usize, usize)>>,
    natives: NativeMap,
}

impl Definitions {
    /// An empty table without natives.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_natives(natives: NativeMap) -> Self {
        Self {
            natives,
            ..Self::default()
        }
    }

    /// Adds or replaces a native. Natives are keyed by name and arity.
    pub fn insert_native(&mut self, native: Arc<NativeDefinition>) {
        let entry = self.natives.entry(native.name).or_default();
        entry.retain(|n| n.arity != native.arity);
        entry.push(native);
    }

    /// Appends a definition and returns its ordinal. An earlier definition
    /// with the same name and arity stays in place for everything that was
    /// registered before this one.
    pub fn push(&mut self, def: Def) -> usize {
        let ordinal = self.defs.len();
        log::debug!("defining {}/{} at {ordinal}", def.name, def.arity());
        self.index
            .entry(def.name.clone())
            .or_default()
            .push((def.arity(), ordinal));
        self.defs.push(def);
        ordinal
    }

    /// Parses `source` as a sequence of definitions and appends them.
    pub fn define(&mut self, source: &str) -> Result<usize, EvalError> {
        let (defs, body) = FilterParser::parse_module(source)?;
        if let Some(body) = body {
            return Err(EvalError::Definition(format!(
                "expected only definitions, found a {}",
                body.describe()
            )));
        }
        let count = defs.len();
        for def in defs {
            self.push(def);
        }
        Ok(count)
    }

    /// Newest ordinal below `horizon` defining `name/arity`.
    pub fn lookup(&self, name: &str, arity: usize, horizon: usize) -> Option<usize> {
        self.index
            .get(name)?
            .iter()
            .rev()
            .find(|(a, ordinal)| *a == arity && *ordinal < horizon)
            .map(|(_, ordinal)| *ordinal)
    }

    pub fn get(&self, ordinal: usize) -> &Def {
        &self.defs[ordinal]
    }

    pub fn native(&self, name: &str, arity: usize) -> Option<&NativeDefinition> {
        self.natives
            .get(name)?
            .iter()
            .find(|n| n.arity == arity)
            .map(|n| n.as_ref())
    }

    /// Arities under which `name` is visible below `horizon`, natives
    /// included.
    pub fn arities(&self, name: &str, horizon: usize) -> Vec<usize> {
        let defined = self
            .index
            .get(name)
            .into_iter()
            .flatten()
            .filter(|(_, ordinal)| *ordinal < horizon)
            .map(|(arity, _)| *arity);
        let native = self.natives.get(name).into_iter().flatten().map(|n| n.arity);
        defined.chain(native).collect()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
