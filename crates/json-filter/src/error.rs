use crate::parser::ParseError;
use json_filter_value::ValueError;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("{0}")]
    Type(#[from] ValueError),

    #[error("{name}/{arity} is not defined, but {name} exists with arity {available:?}")]
    Arity {
        name: String,
        arity: usize,
        available: Vec<usize>,
    },

    #[error("{name}/{arity} is not defined")]
    UnboundName { name: String, arity: usize },

    #[error("${0} is not defined")]
    UnboundVariable(String),

    #[error("invalid path expression: {0}")]
    Path(String),

    #[error("{}", thrown_message(.0))]
    Thrown(Value),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Definition(String),
}

impl EvalError {
    /// The value a `catch` handler receives for this error.
    ///
    /// Thrown values are passed through unchanged; every other error is
    /// caught as its message.
    pub fn into_value(self) -> Value {
        match self {
            EvalError::Thrown(v) => v,
            other => Value::String(other.to_string()),
        }
    }
}

fn thrown_message(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => format!("{other} (not a string)"),
    }
}
