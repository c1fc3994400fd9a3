//! Filter AST.

use serde_json::Value;

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
    Rem, // %
}

/// Comparison operators. `==` and `!=` are total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq, // ==
    Ne, // !=
    Lt, // <
    Le, // <=
    Gt, // >
    Ge, // >=
}

/// Short-circuiting boolean operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

/// Destructuring pattern of `as`, `reduce` and `foreach`.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// `$name`
    Var(String),
    /// `[$a, $b]`: element `i` is matched against pattern `i`.
    Array(Vec<Pattern>),
    /// `{key: $a, $b}`: member `key` is matched against its pattern.
    Object(Vec<(String, Pattern)>),
}

/// Formal parameter of a definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// `$name`: bound to each output of the argument, and also callable as `name`.
    Value(String),
    /// `name`: bound to the argument filter as a closure.
    Filter(String),
}

impl Param {
    pub fn name(&self) -> &str {
        match self {
            Param::Value(n) | Param::Filter(n) => n,
        }
    }
}

/// `def name(params): body;`
#[derive(Debug, Clone, PartialEq)]
pub struct Def {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Filter,
}

impl Def {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// A filter expression.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Filter {
    /// `.`
    #[default]
    Id,
    /// `1`, `"a"`, `null`, ...
    Literal(Value),
    /// `target.name`
    Field(Box<Filter>, String),
    /// `target[index]`; `index` runs on the same input as `target`.
    Index(Box<Filter>, Box<Filter>),
    /// `target[from:to]`; either bound may be omitted. Bounds run on the
    /// same input as `target`.
    Slice(Box<Filter>, Option<Box<Filter>>, Option<Box<Filter>>),
    /// `target[]`
    Iterate(Box<Filter>),
    /// `l | r`
    Pipe(Box<Filter>, Box<Filter>),
    /// `l, r`
    Comma(Box<Filter>, Box<Filter>),
    /// `[f]`, `[]`
    Array(Option<Box<Filter>>),
    /// `{k: v, ...}`
    Object(Vec<(Filter, Filter)>),
    /// `if cond then t else e end`; `elif` chains nest in the else branch.
    If(Box<Filter>, Box<Filter>, Box<Filter>),
    /// `name`, `name(a; b)`
    Call(String, Vec<Filter>),
    /// `$name`
    Var(String),
    /// `source as pattern | body`
    Bind(Box<Filter>, Pattern, Box<Filter>),
    /// `reduce source as pattern (init; update)`
    Reduce {
        source: Box<Filter>,
        pattern: Pattern,
        init: Box<Filter>,
        update: Box<Filter>,
    },
    /// `foreach source as pattern (init; update; extract)`
    Foreach {
        source: Box<Filter>,
        pattern: Pattern,
        init: Box<Filter>,
        update: Box<Filter>,
        extract: Option<Box<Filter>>,
    },
    /// `path |= f`
    Update(Box<Filter>, Box<Filter>),
    /// `path = f`
    Assign(Box<Filter>, Box<Filter>),
    /// `path += f` and friends
    UpdateWith(Box<Filter>, MathOp, Box<Filter>),
    /// `try body catch handler`, `body?`
    Try(Box<Filter>, Option<Box<Filter>>),
    /// `-f`
    Neg(Box<Filter>),
    Math(Box<Filter>, MathOp, Box<Filter>),
    Cmp(Box<Filter>, CmpOp, Box<Filter>),
    Logic(Box<Filter>, LogicOp, Box<Filter>),
    /// `l // r`
    Alt(Box<Filter>, Box<Filter>),
    /// `def ...; body`
    Define(Vec<Def>, Box<Filter>),
}

impl Filter {
    /// Short description used in path-expression errors.
    pub fn describe(&self) -> &'static str {
        match self {
            Filter::Id => "identity",
            Filter::Literal(_) => "literal",
            Filter::Field(..) => "field access",
            Filter::Index(..) => "index",
            Filter::Slice(..) => "slice",
            Filter::Iterate(_) => "iteration",
            Filter::Pipe(..) => "pipe",
            Filter::Comma(..) => "comma",
            Filter::Array(_) => "array construction",
            Filter::Object(_) => "object construction",
            Filter::If(..) => "conditional",
            Filter::Call(..) => "call",
            Filter::Var(_) => "variable",
            Filter::Bind(..) => "binding",
            Filter::Reduce { .. } => "reduce",
            Filter::Foreach { .. } => "foreach",
            Filter::Update(..) | Filter::Assign(..) | Filter::UpdateWith(..) => "assignment",
            Filter::Try(..) => "try",
            Filter::Neg(_) => "negation",
            Filter::Math(..) => "arithmetic",
            Filter::Cmp(..) => "comparison",
            Filter::Logic(..) => "boolean operator",
            Filter::Alt(..) => "alternative",
            Filter::Define(..) => "definition",
        }
    }
}
