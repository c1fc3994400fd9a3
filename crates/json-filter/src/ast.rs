//! AST construction helpers.

use crate::types::*;
use serde_json::Value;

/// Helper functions for constructing filter AST nodes without the parser.
pub struct Ast;

impl Ast {
    /// `.`
    pub fn id() -> Filter {
        Filter::Id
    }

    pub fn literal(value: impl Into<Value>) -> Filter {
        Filter::Literal(value.into())
    }

    /// `.name`
    pub fn field(name: impl Into<String>) -> Filter {
        Filter::Field(Box::new(Filter::Id), name.into())
    }

    /// `.[index]`
    pub fn index(index: Filter) -> Filter {
        Filter::Index(Box::new(Filter::Id), Box::new(index))
    }

    /// `.[from:to]`
    pub fn slice(from: Option<Filter>, to: Option<Filter>) -> Filter {
        Filter::Slice(Box::new(Filter::Id), from.map(Box::new), to.map(Box::new))
    }

    /// `.[]`
    pub fn iterate() -> Filter {
        Filter::Iterate(Box::new(Filter::Id))
    }

    pub fn pipe(l: Filter, r: Filter) -> Filter {
        Filter::Pipe(Box::new(l), Box::new(r))
    }

    pub fn comma(l: Filter, r: Filter) -> Filter {
        Filter::Comma(Box::new(l), Box::new(r))
    }

    /// `[f]`
    pub fn array(f: Filter) -> Filter {
        Filter::Array(Some(Box::new(f)))
    }

    pub fn if_then_else(cond: Filter, then: Filter, otherwise: Filter) -> Filter {
        Filter::If(Box::new(cond), Box::new(then), Box::new(otherwise))
    }

    pub fn call(name: impl Into<String>, args: Vec<Filter>) -> Filter {
        Filter::Call(name.into(), args)
    }

    pub fn var(name: impl Into<String>) -> Filter {
        Filter::Var(name.into())
    }

    /// `source as $name | body`
    pub fn bind(source: Filter, name: impl Into<String>, body: Filter) -> Filter {
        Filter::Bind(Box::new(source), Pattern::Var(name.into()), Box::new(body))
    }

    /// `path |= f`
    pub fn update(path: Filter, f: Filter) -> Filter {
        Filter::Update(Box::new(path), Box::new(f))
    }

    pub fn math(l: Filter, op: MathOp, r: Filter) -> Filter {
        Filter::Math(Box::new(l), op, Box::new(r))
    }

    pub fn cmp(l: Filter, op: CmpOp, r: Filter) -> Filter {
        Filter::Cmp(Box::new(l), op, Box::new(r))
    }

    /// `def name(params): body;`
    pub fn def(name: impl Into<String>, params: Vec<Param>, body: Filter) -> Def {
        Def {
            name: name.into(),
            params,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ast_construction() {
        // [.[] | . + 1]
        let f = Ast::array(Ast::pipe(
            Ast::iterate(),
            Ast::math(Ast::id(), MathOp::Add, Ast::literal(1)),
        ));
        match f {
            Filter::Array(Some(inner)) => assert!(matches!(*inner, Filter::Pipe(..))),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_slice_construction() {
        let f = Ast::slice(Some(Ast::literal(1)), None);
        assert_eq!(f, crate::parser::parse(".[1:]").unwrap());
    }

    #[test]
    fn test_def_arity() {
        let d = Ast::def(
            "f",
            vec![Param::Value("a".into()), Param::Filter("g".into())],
            Ast::id(),
        );
        assert_eq!(d.arity(), 2);
        assert_eq!(d.params[0].name(), "a");
    }
}
