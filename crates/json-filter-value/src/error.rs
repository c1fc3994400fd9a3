use thiserror::Error;

/// Failure of a value-level operation.
///
/// Every variant describes an operation applied to a value of the wrong
/// shape; the evaluator reports all of them as type errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    #[error("cannot index {target} with {key}")]
    CannotIndex { target: &'static str, key: String },

    #[error("cannot iterate over {0}")]
    CannotIterate(&'static str),

    #[error("{lhs} ({lhs_value}) and {rhs} ({rhs_value}) cannot be {verb}")]
    CannotApply {
        verb: &'static str,
        lhs: &'static str,
        lhs_value: String,
        rhs: &'static str,
        rhs_value: String,
    },

    #[error("{0} cannot be negated")]
    CannotNegate(&'static str),

    #[error("{0} cannot be divided because the divisor is zero")]
    DivisionByZero(String),

    #[error("out of bounds negative array index")]
    OutOfBounds,

    #[error("invalid path component: {0}")]
    InvalidPath(String),

    #[error("paths must be arrays, got {0}")]
    NotAPath(&'static str),

    #[error("{0} has no length")]
    NoLength(&'static str),

    #[error("{0} has no keys")]
    NoKeys(&'static str),

    #[error("cannot check whether {target} has a key of type {key}")]
    CannotCheckKey { target: &'static str, key: &'static str },

    #[error("cannot slice {0}")]
    CannotSlice(&'static str),

    #[error("slice bounds must be numbers or null, got {0}")]
    InvalidSlice(String),

    #[error("a slice of an array can only be assigned another array, got {0}")]
    SliceAssign(&'static str),

    #[error("array index too large")]
    IndexTooLarge,

    #[error("repeat string result too long")]
    RepeatTooLong,

    #[error("expected a number, got {0}")]
    NotANumber(&'static str),

    #[error("object keys must be strings, got {0}")]
    NotAString(&'static str),
}
