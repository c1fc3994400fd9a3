//! json-filter - a lazy evaluator for jq-style filters.
//!
//! A filter consumes one JSON value and produces a stream of zero or more
//! values. Streams are pulled on demand: combinators such as `first`,
//! `limit`, `isempty` and `any` stop their producers as soon as the answer
//! is known, so they work on unbounded generators.
//!
//! The [`Engine`] owns the global definitions (natives and the standard
//! library) and is the usual entry point:
//!
//! ```
//! use json_filter::Engine;
//! use serde_json::json;
//!
//! let engine = Engine::new();
//!
//! let out = engine.run("first(range(10; 1000000000))", json!(null)).unwrap();
//! assert_eq!(out, vec![json!(10)]);
//!
//! let out = engine.run(r#"map_values(. + 1)"#, json!({"a": 1, "b": 2})).unwrap();
//! assert_eq!(out[0].to_string(), r#"{"a":2,"b":3}"#);
//! ```
//!
//! Lower-level building blocks are public as well: [`parse`] turns text
//! into a [`Filter`], [`evaluate`] runs a filter in an [`Env`], and
//! [`update`] implements `path |= f`.

pub mod ast;
pub mod defs;
pub mod engine;
pub mod env;
pub mod error;
pub mod eval;
pub mod natives;
pub mod parser;
pub mod path;
pub mod types;

pub use ast::Ast;
pub use defs::Definitions;
pub use engine::Engine;
pub use env::{Closure, Env};
pub use error::EvalError;
pub use eval::{evaluate, Outputs, ValR, ValRs};
pub use natives::NativeDefinition;
pub use parser::{parse, FilterParser, ParseError};
pub use path::{paths, update, PathR, PathRs};
pub use types::*;

pub use json_filter_value::{Path, PathComponent, ValueError};
