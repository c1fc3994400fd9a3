//! Filter language parser.
//!
//! Precedence, loosest first: `|` (right), `,`, `//` (right), `=` `|=` `+=`
//! `-=` `*=` `/=` `%=` (non-associative), `or`, `and`, comparisons
//! (non-associative), `+` `-`, `*` `/` `%`, unary `-`, postfix terms.
//! `term as $x | body` and `def f: ...; body` may appear wherever an operand
//! may, and their body extends as far right as possible.

use crate::types::*;
use json_filter_value::{neg, number};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected character: {0}")]
    UnexpectedChar(char),
    #[error("Unexpected end of input")]
    UnexpectedEnd,
    #[error("Unexpected keyword: {0}")]
    UnexpectedKeyword(String),
    #[error("Expected {0}")]
    Expected(&'static str),
    #[error("Invalid escape sequence")]
    InvalidEscape,
    #[error("Invalid number")]
    InvalidNumber,
    #[error("Unclosed string")]
    UnclosedString,
}

const KEYWORDS: &[&str] = &[
    "def", "if", "then", "elif", "else", "end", "as", "reduce", "foreach", "try", "catch",
    "and", "or",
];

/// Filter parser.
pub struct FilterParser<'a> {
    input: &'a str,
    pos: usize,
}

/// Parses a complete filter.
pub fn parse(input: &str) -> Result<Filter, ParseError> {
    FilterParser::parse(input)
}

impl<'a> FilterParser<'a> {
    /// Parse a filter expression.
    pub fn parse(input: &'a str) -> Result<Filter, ParseError> {
        let mut parser = Self { input, pos: 0 };
        let filter = parser.parse_pipe()?;
        parser.expect_end()?;
        Ok(filter)
    }

    /// Parse a sequence of leading definitions, optionally followed by a
    /// filter that may use them.
    pub fn parse_module(input: &'a str) -> Result<(Vec<Def>, Option<Filter>), ParseError> {
        let mut parser = Self { input, pos: 0 };
        let mut defs = Vec::new();
        parser.skip_whitespace();
        while parser.peek_keyword("def") {
            defs.push(parser.parse_def()?);
            parser.skip_whitespace();
        }
        if parser.is_at_end() {
            return Ok((defs, None));
        }
        let body = parser.parse_pipe()?;
        parser.expect_end()?;
        Ok((defs, Some(body)))
    }

    fn expect_end(&mut self) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.peek() {
            None => Ok(()),
            Some(c) => Err(ParseError::UnexpectedChar(c)),
        }
    }

    fn parse_pipe(&mut self) -> Result<Filter, ParseError> {
        let lhs = self.parse_comma()?;
        self.skip_whitespace();
        if self.peek() == Some('|') && !self.peek_str("|=") {
            self.advance();
            let rhs = self.parse_pipe()?;
            return Ok(Filter::Pipe(Box::new(lhs), Box::new(rhs)));
        }
        Ok(lhs)
    }

    fn parse_comma(&mut self) -> Result<Filter, ParseError> {
        let mut left = self.parse_alternative()?;
        self.skip_whitespace();
        while self.peek() == Some(',') {
            self.advance();
            let right = self.parse_alternative()?;
            left = Filter::Comma(Box::new(left), Box::new(right));
            self.skip_whitespace();
        }
        Ok(left)
    }

    fn parse_alternative(&mut self) -> Result<Filter, ParseError> {
        let left = self.parse_assignment()?;
        self.skip_whitespace();
        if self.peek_str("//") {
            self.advance_by(2);
            let right = self.parse_alternative()?;
            return Ok(Filter::Alt(Box::new(left), Box::new(right)));
        }
        Ok(left)
    }

    fn parse_assignment(&mut self) -> Result<Filter, ParseError> {
        let left = self.parse_or()?;
        self.skip_whitespace();
        let ops: [(&str, Option<MathOp>); 6] = [
            ("+=", Some(MathOp::Add)),
            ("-=", Some(MathOp::Sub)),
            ("*=", Some(MathOp::Mul)),
            ("/=", Some(MathOp::Div)),
            ("%=", Some(MathOp::Rem)),
            ("|=", None),
        ];
        for (token, op) in ops {
            if self.peek_str(token) {
                self.advance_by(2);
                let right = self.parse_or()?;
                return Ok(match op {
                    Some(op) => Filter::UpdateWith(Box::new(left), op, Box::new(right)),
                    None => Filter::Update(Box::new(left), Box::new(right)),
                });
            }
        }
        if self.peek() == Some('=') && !self.peek_str("==") {
            self.advance();
            let right = self.parse_or()?;
            return Ok(Filter::Assign(Box::new(left), Box::new(right)));
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Filter, ParseError> {
        let mut left = self.parse_and()?;
        self.skip_whitespace();
        while self.peek_keyword("or") {
            self.advance_by(2);
            let right = self.parse_and()?;
            left = Filter::Logic(Box::new(left), LogicOp::Or, Box::new(right));
            self.skip_whitespace();
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Filter, ParseError> {
        let mut left = self.parse_comparison()?;
        self.skip_whitespace();
        while self.peek_keyword("and") {
            self.advance_by(3);
            let right = self.parse_comparison()?;
            left = Filter::Logic(Box::new(left), LogicOp::And, Box::new(right));
            self.skip_whitespace();
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Filter, ParseError> {
        let left = self.parse_additive()?;
        self.skip_whitespace();
        match self.peek_comparison_operator() {
            Some((op, len)) => {
                self.advance_by(len);
                let right = self.parse_additive()?;
                Ok(Filter::Cmp(Box::new(left), op, Box::new(right)))
            }
            None => Ok(left),
        }
    }

    fn peek_comparison_operator(&self) -> Option<(CmpOp, usize)> {
        if self.peek_str("==") {
            Some((CmpOp::Eq, 2))
        } else if self.peek_str("!=") {
            Some((CmpOp::Ne, 2))
        } else if self.peek_str("<=") {
            Some((CmpOp::Le, 2))
        } else if self.peek_str(">=") {
            Some((CmpOp::Ge, 2))
        } else if self.peek_str("<") {
            Some((CmpOp::Lt, 1))
        } else if self.peek_str(">") {
            Some((CmpOp::Gt, 1))
        } else {
            None
        }
    }

    fn parse_additive(&mut self) -> Result<Filter, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            self.skip_whitespace();
            let op = match self.peek() {
                Some('+') if !self.peek_str("+=") => MathOp::Add,
                Some('-') if !self.peek_str("-=") => MathOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Filter::Math(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Filter, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            self.skip_whitespace();
            let op = match self.peek() {
                Some('*') if !self.peek_str("*=") => MathOp::Mul,
                Some('/') if !self.peek_str("/=") && !self.peek_str("//") => MathOp::Div,
                Some('%') if !self.peek_str("%=") => MathOp::Rem,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Filter::Math(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Filter, ParseError> {
        self.skip_whitespace();
        if self.peek() == Some('-') {
            self.advance();
            return Ok(match self.parse_unary()? {
                Filter::Literal(n @ Value::Number(_)) => match neg(n.clone()) {
                    Ok(v) => Filter::Literal(v),
                    Err(_) => Filter::Neg(Box::new(Filter::Literal(n))),
                },
                other => Filter::Neg(Box::new(other)),
            });
        }
        self.parse_operand()
    }

    /// A postfix term, a `def` block or a `term as $x | body` binding.
    fn parse_operand(&mut self) -> Result<Filter, ParseError> {
        self.skip_whitespace();
        if self.peek_keyword("def") {
            let mut defs = Vec::new();
            while self.peek_keyword("def") {
                defs.push(self.parse_def()?);
                self.skip_whitespace();
            }
            let body = self.parse_pipe()?;
            return Ok(Filter::Define(defs, Box::new(body)));
        }
        let term = self.parse_postfix()?;
        self.skip_whitespace();
        if self.peek_keyword("as") {
            self.advance_by(2);
            let pattern = self.parse_pattern()?;
            self.skip_whitespace();
            if self.peek() != Some('|') || self.peek_str("|=") {
                return Err(ParseError::Expected("'|' after binding pattern"));
            }
            self.advance();
            let body = self.parse_pipe()?;
            return Ok(Filter::Bind(Box::new(term), pattern, Box::new(body)));
        }
        Ok(term)
    }

    fn parse_def(&mut self) -> Result<Def, ParseError> {
        self.expect_keyword("def")?;
        self.skip_whitespace();
        let name = self.parse_identifier()?;
        self.skip_whitespace();
        let mut params = Vec::new();
        if self.peek() == Some('(') {
            self.advance();
            loop {
                self.skip_whitespace();
                if self.peek() == Some('$') {
                    self.advance();
                    params.push(Param::Value(self.parse_identifier()?));
                } else {
                    params.push(Param::Filter(self.parse_identifier()?));
                }
                self.skip_whitespace();
                match self.peek() {
                    Some(';') => self.advance(),
                    Some(')') => {
                        self.advance();
                        break;
                    }
                    Some(c) => return Err(ParseError::UnexpectedChar(c)),
                    None => return Err(ParseError::UnexpectedEnd),
                }
            }
            self.skip_whitespace();
        }
        self.expect(':')?;
        let body = self.parse_pipe()?;
        self.skip_whitespace();
        self.expect(';')?;
        Ok(Def { name, params, body })
    }

    fn parse_pattern(&mut self) -> Result<Pattern, ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some('$') => {
                self.advance();
                Ok(Pattern::Var(self.parse_identifier()?))
            }
            Some('[') => {
                self.advance();
                let mut items = Vec::new();
                loop {
                    items.push(self.parse_pattern()?);
                    self.skip_whitespace();
                    match self.peek() {
                        Some(',') => self.advance(),
                        Some(']') => {
                            self.advance();
                            break;
                        }
                        Some(c) => return Err(ParseError::UnexpectedChar(c)),
                        None => return Err(ParseError::UnexpectedEnd),
                    }
                }
                Ok(Pattern::Array(items))
            }
            Some('{') => {
                self.advance();
                let mut entries = Vec::new();
                loop {
                    self.skip_whitespace();
                    let entry = match self.peek() {
                        Some('$') => {
                            self.advance();
                            let name = self.parse_identifier()?;
                            (name.clone(), Pattern::Var(name))
                        }
                        Some('"') => {
                            let key = self.parse_string()?;
                            self.skip_whitespace();
                            self.expect(':')?;
                            (key, self.parse_pattern()?)
                        }
                        _ => {
                            let key = self.parse_identifier()?;
                            self.skip_whitespace();
                            self.expect(':')?;
                            (key, self.parse_pattern()?)
                        }
                    };
                    entries.push(entry);
                    self.skip_whitespace();
                    match self.peek() {
                        Some(',') => self.advance(),
                        Some('}') => {
                            self.advance();
                            break;
                        }
                        Some(c) => return Err(ParseError::UnexpectedChar(c)),
                        None => return Err(ParseError::UnexpectedEnd),
                    }
                }
                Ok(Pattern::Object(entries))
            }
            Some(c) => Err(ParseError::UnexpectedChar(c)),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    /// A primary followed by `.name`, `."name"`, `[e]`, `[]` and `?`
    /// suffixes. Suffixes must follow without whitespace.
    fn parse_postfix(&mut self) -> Result<Filter, ParseError> {
        let mut term = self.parse_primary()?;
        loop {
            match self.peek() {
                Some('[') => term = self.parse_bracket_suffix(term)?,
                Some('?') => {
                    self.advance();
                    term = Filter::Try(Box::new(term), None);
                }
                Some('.') => match self.peek_at(1) {
                    Some('[') => {
                        self.advance();
                        term = self.parse_bracket_suffix(term)?;
                    }
                    Some('"') => {
                        self.advance();
                        let name = self.parse_string()?;
                        term = Filter::Field(Box::new(term), name);
                    }
                    Some(c) if is_ident_start(c) => {
                        self.advance();
                        let name = self.parse_identifier()?;
                        term = Filter::Field(Box::new(term), name);
                    }
                    _ => break,
                },
                _ => break,
            }
        }
        Ok(term)
    }

    fn parse_bracket_suffix(&mut self, target: Filter) -> Result<Filter, ParseError> {
        self.expect('[')?;
        self.skip_whitespace();
        if self.peek() == Some(']') {
            self.advance();
            return Ok(Filter::Iterate(Box::new(target)));
        }
        let from = if self.peek() == Some(':') {
            None
        } else {
            Some(Box::new(self.parse_pipe()?))
        };
        self.skip_whitespace();
        if self.peek() != Some(':') {
            self.expect(']')?;
            let index = from.ok_or(ParseError::Expected("index"))?;
            return Ok(Filter::Index(Box::new(target), index));
        }
        self.advance();
        self.skip_whitespace();
        let to = if self.peek() == Some(']') {
            None
        } else {
            Some(Box::new(self.parse_pipe()?))
        };
        self.skip_whitespace();
        self.expect(']')?;
        if from.is_none() && to.is_none() {
            return Err(ParseError::Expected("slice bound"));
        }
        Ok(Filter::Slice(Box::new(target), from, to))
    }

    fn parse_primary(&mut self) -> Result<Filter, ParseError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(ParseError::UnexpectedEnd),
            Some('.') => {
                self.advance();
                match self.peek() {
                    Some('.') => {
                        self.advance();
                        Ok(Filter::Call("recurse".to_string(), Vec::new()))
                    }
                    Some('"') => {
                        let name = self.parse_string()?;
                        Ok(Filter::Field(Box::new(Filter::Id), name))
                    }
                    Some('[') => self.parse_bracket_suffix(Filter::Id),
                    Some(c) if is_ident_start(c) => {
                        let name = self.parse_identifier()?;
                        Ok(Filter::Field(Box::new(Filter::Id), name))
                    }
                    _ => Ok(Filter::Id),
                }
            }
            Some('$') => {
                self.advance();
                Ok(Filter::Var(self.parse_identifier()?))
            }
            Some('"') => Ok(Filter::Literal(Value::String(self.parse_string()?))),
            Some('0'..='9') => Ok(Filter::Literal(self.parse_number()?)),
            Some('(') => {
                self.advance();
                let inner = self.parse_pipe()?;
                self.skip_whitespace();
                self.expect(')')?;
                Ok(inner)
            }
            Some('[') => {
                self.advance();
                self.skip_whitespace();
                if self.peek() == Some(']') {
                    self.advance();
                    return Ok(Filter::Array(None));
                }
                let inner = self.parse_pipe()?;
                self.skip_whitespace();
                self.expect(']')?;
                Ok(Filter::Array(Some(Box::new(inner))))
            }
            Some('{') => self.parse_object(),
            Some(c) if is_ident_start(c) => self.parse_word(),
            Some(c) => Err(ParseError::UnexpectedChar(c)),
        }
    }

    fn parse_word(&mut self) -> Result<Filter, ParseError> {
        let word = self.parse_identifier()?;
        match word.as_str() {
            "null" => return Ok(Filter::Literal(Value::Null)),
            "true" => return Ok(Filter::Literal(Value::Bool(true))),
            "false" => return Ok(Filter::Literal(Value::Bool(false))),
            "if" => return self.parse_if(),
            "try" => {
                let body = self.parse_postfix()?;
                self.skip_whitespace();
                let handler = if self.peek_keyword("catch") {
                    self.advance_by(5);
                    Some(Box::new(self.parse_postfix()?))
                } else {
                    None
                };
                return Ok(Filter::Try(Box::new(body), handler));
            }
            "reduce" => return self.parse_reduce(),
            "foreach" => return self.parse_foreach(),
            w if KEYWORDS.contains(&w) => return Err(ParseError::UnexpectedKeyword(word)),
            _ => {}
        }
        self.skip_whitespace();
        let mut args = Vec::new();
        if self.peek() == Some('(') {
            self.advance();
            loop {
                args.push(self.parse_pipe()?);
                self.skip_whitespace();
                match self.peek() {
                    Some(';') => self.advance(),
                    Some(')') => {
                        self.advance();
                        break;
                    }
                    Some(c) => return Err(ParseError::UnexpectedChar(c)),
                    None => return Err(ParseError::UnexpectedEnd),
                }
            }
        }
        Ok(Filter::Call(word, args))
    }

    fn parse_if(&mut self) -> Result<Filter, ParseError> {
        let cond = self.parse_pipe()?;
        self.skip_whitespace();
        self.expect_keyword("then")?;
        let then = self.parse_pipe()?;
        self.skip_whitespace();
        let otherwise = if self.peek_keyword("elif") {
            self.advance_by(4);
            self.parse_if()?
        } else if self.peek_keyword("else") {
            self.advance_by(4);
            let otherwise = self.parse_pipe()?;
            self.skip_whitespace();
            self.expect_keyword("end")?;
            otherwise
        } else {
            self.expect_keyword("end")?;
            Filter::Id
        };
        Ok(Filter::If(Box::new(cond), Box::new(then), Box::new(otherwise)))
    }

    /// `SOURCE as PATTERN (` shared by `reduce` and `foreach`.
    fn parse_fold_head(&mut self) -> Result<(Filter, Pattern), ParseError> {
        let source = self.parse_postfix()?;
        self.skip_whitespace();
        self.expect_keyword("as")?;
        let pattern = self.parse_pattern()?;
        self.skip_whitespace();
        self.expect('(')?;
        Ok((source, pattern))
    }

    fn parse_reduce(&mut self) -> Result<Filter, ParseError> {
        let (source, pattern) = self.parse_fold_head()?;
        let init = self.parse_pipe()?;
        self.skip_whitespace();
        self.expect(';')?;
        let update = self.parse_pipe()?;
        self.skip_whitespace();
        self.expect(')')?;
        Ok(Filter::Reduce {
            source: Box::new(source),
            pattern,
            init: Box::new(init),
            update: Box::new(update),
        })
    }

    fn parse_foreach(&mut self) -> Result<Filter, ParseError> {
        let (source, pattern) = self.parse_fold_head()?;
        let init = self.parse_pipe()?;
        self.skip_whitespace();
        self.expect(';')?;
        let update = self.parse_pipe()?;
        self.skip_whitespace();
        let extract = if self.peek() == Some(';') {
            self.advance();
            let extract = self.parse_pipe()?;
            self.skip_whitespace();
            Some(Box::new(extract))
        } else {
            None
        };
        self.expect(')')?;
        Ok(Filter::Foreach {
            source: Box::new(source),
            pattern,
            init: Box::new(init),
            update: Box::new(update),
            extract,
        })
    }

    fn parse_object(&mut self) -> Result<Filter, ParseError> {
        self.expect('{')?;
        let mut entries = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some('}') {
            self.advance();
            return Ok(Filter::Object(entries));
        }
        loop {
            self.skip_whitespace();
            let entry = match self.peek() {
                Some('$') => {
                    self.advance();
                    let name = self.parse_identifier()?;
                    (Filter::Literal(Value::String(name.clone())), Filter::Var(name))
                }
                Some('(') => {
                    self.advance();
                    let key = self.parse_pipe()?;
                    self.skip_whitespace();
                    self.expect(')')?;
                    self.skip_whitespace();
                    self.expect(':')?;
                    (key, self.parse_object_value()?)
                }
                Some('"') => {
                    let key = self.parse_string()?;
                    self.parse_object_entry(key)?
                }
                _ => {
                    let key = self.parse_identifier()?;
                    self.parse_object_entry(key)?
                }
            };
            entries.push(entry);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.advance(),
                Some('}') => {
                    self.advance();
                    break;
                }
                Some(c) => return Err(ParseError::UnexpectedChar(c)),
                None => return Err(ParseError::UnexpectedEnd),
            }
        }
        Ok(Filter::Object(entries))
    }

    /// `key: value` or the shorthand `key`, which reads `.key`.
    fn parse_object_entry(&mut self, key: String) -> Result<(Filter, Filter), ParseError> {
        self.skip_whitespace();
        if self.peek() == Some(':') {
            self.advance();
            let value = self.parse_object_value()?;
            return Ok((Filter::Literal(Value::String(key)), value));
        }
        let value = Filter::Field(Box::new(Filter::Id), key.clone());
        Ok((Filter::Literal(Value::String(key)), value))
    }

    /// Object values stop at `,` and `}`; `|` chains are allowed.
    fn parse_object_value(&mut self) -> Result<Filter, ParseError> {
        let value = self.parse_alternative()?;
        self.skip_whitespace();
        if self.peek() == Some('|') && !self.peek_str("|=") {
            self.advance();
            let rest = self.parse_object_value()?;
            return Ok(Filter::Pipe(Box::new(value), Box::new(rest)));
        }
        Ok(value)
    }

    fn parse_identifier(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        match self.peek() {
            Some(c) if is_ident_start(c) => self.advance(),
            Some(c) => return Err(ParseError::UnexpectedChar(c)),
            None => return Err(ParseError::UnexpectedEnd),
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_number(&mut self) -> Result<Value, ParseError> {
        let start = self.pos;
        let mut integral = true;
        while matches!(self.peek(), Some('0'..='9')) {
            self.advance();
        }
        if self.peek() == Some('.') && matches!(self.peek_at(1), Some('0'..='9')) {
            integral = false;
            self.advance();
            while matches!(self.peek(), Some('0'..='9')) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            integral = false;
            self.advance();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.advance();
            }
            if !matches!(self.peek(), Some('0'..='9')) {
                return Err(ParseError::InvalidNumber);
            }
            while matches!(self.peek(), Some('0'..='9')) {
                self.advance();
            }
        }
        let text = &self.input[start..self.pos];
        if integral {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Value::from(n));
            }
        }
        text.parse::<f64>()
            .map(number)
            .map_err(|_| ParseError::InvalidNumber)
    }

    fn parse_string(&mut self) -> Result<String, ParseError> {
        self.expect('"')?;
        let mut result = String::new();
        loop {
            match self.peek() {
                None => return Err(ParseError::UnclosedString),
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    let escaped = match self.peek() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('b') => '\u{8}',
                        Some('f') => '\u{c}',
                        Some('/') => '/',
                        Some('\\') => '\\',
                        Some('"') => '"',
                        Some('u') => {
                            self.advance();
                            result.push(self.parse_unicode_escape()?);
                            continue;
                        }
                        _ => return Err(ParseError::InvalidEscape),
                    };
                    result.push(escaped);
                    self.advance();
                }
                Some(c) => {
                    result.push(c);
                    self.advance();
                }
            }
        }
        Ok(result)
    }

    /// The `XXXX` of `\uXXXX`, combining a following low surrogate.
    fn parse_unicode_escape(&mut self) -> Result<char, ParseError> {
        let high = self.parse_hex4()?;
        if (0xD800..0xDC00).contains(&high) {
            if !self.peek_str("\\u") {
                return Err(ParseError::InvalidEscape);
            }
            self.advance_by(2);
            let low = self.parse_hex4()?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(ParseError::InvalidEscape);
            }
            let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
            return char::from_u32(code).ok_or(ParseError::InvalidEscape);
        }
        char::from_u32(high).ok_or(ParseError::InvalidEscape)
    }

    fn parse_hex4(&mut self) -> Result<u32, ParseError> {
        let digits = self
            .input
            .get(self.pos..self.pos + 4)
            .ok_or(ParseError::InvalidEscape)?;
        let code = u32::from_str_radix(digits, 16).map_err(|_| ParseError::InvalidEscape)?;
        self.advance_by(4);
        Ok(code)
    }

    fn peek_str(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    /// True if the next word is exactly `kw`.
    fn peek_keyword(&self, kw: &str) -> bool {
        self.peek_str(kw)
            && !self.input[self.pos + kw.len()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    fn expect_keyword(&mut self, kw: &'static str) -> Result<(), ParseError> {
        self.skip_whitespace();
        if self.peek_keyword(kw) {
            self.advance_by(kw.len());
            Ok(())
        } else {
            Err(ParseError::Expected(kw))
        }
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(n)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.advance();
                Ok(())
            }
            Some(c) => Err(ParseError::UnexpectedChar(c)),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    /// Skips whitespace and `#` comments.
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else if c == '#' {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id() -> Box<Filter> {
        Box::new(Filter::Id)
    }

    fn lit(v: Value) -> Box<Filter> {
        Box::new(Filter::Literal(v))
    }

    #[test]
    fn test_parse_paths() {
        assert_eq!(parse(".").unwrap(), Filter::Id);
        assert_eq!(parse(".a").unwrap(), Filter::Field(id(), "a".into()));
        assert_eq!(
            parse(".a.b").unwrap(),
            Filter::Field(Box::new(Filter::Field(id(), "a".into())), "b".into())
        );
        assert_eq!(
            parse(".[0]").unwrap(),
            Filter::Index(id(), lit(json!(0)))
        );
        assert_eq!(
            parse(".a[]").unwrap(),
            Filter::Iterate(Box::new(Filter::Field(id(), "a".into())))
        );
        assert_eq!(parse(r#"."a b""#).unwrap(), Filter::Field(id(), "a b".into()));
        assert_eq!(parse("..").unwrap(), Filter::Call("recurse".into(), vec![]));
    }

    #[test]
    fn test_parse_slices() {
        assert_eq!(
            parse(".[1:2]").unwrap(),
            Filter::Slice(id(), Some(lit(json!(1))), Some(lit(json!(2))))
        );
        assert_eq!(
            parse(".[-2:]").unwrap(),
            Filter::Slice(id(), Some(lit(json!(-2))), None)
        );
        assert_eq!(
            parse(".a[:.n]").unwrap(),
            Filter::Slice(
                Box::new(Filter::Field(id(), "a".into())),
                None,
                Some(Box::new(Filter::Field(id(), "n".into())))
            )
        );
        assert_eq!(parse(".[:]"), Err(ParseError::Expected("slice bound")));
    }

    #[test]
    fn test_parse_precedence() {
        // 1, 2 | 3  ==  (1, 2) | 3
        match parse("1, 2 | 3").unwrap() {
            Filter::Pipe(l, _) => assert!(matches!(*l, Filter::Comma(..))),
            other => panic!("unexpected {other:?}"),
        }
        // 1 + 2 * 3
        match parse("1 + 2 * 3").unwrap() {
            Filter::Math(_, MathOp::Add, r) => {
                assert!(matches!(*r, Filter::Math(_, MathOp::Mul, _)))
            }
            other => panic!("unexpected {other:?}"),
        }
        // a // b // c is right associative
        match parse("1 // 2 // 3").unwrap() {
            Filter::Alt(_, r) => assert!(matches!(*r, Filter::Alt(..))),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            parse("-1").unwrap(),
            Filter::Literal(json!(-1))
        );
    }

    #[test]
    fn test_parse_assignment_operators() {
        assert!(matches!(parse(".a |= 1").unwrap(), Filter::Update(..)));
        assert!(matches!(parse(".a = 1").unwrap(), Filter::Assign(..)));
        assert!(matches!(
            parse(".a += 1").unwrap(),
            Filter::UpdateWith(_, MathOp::Add, _)
        ));
        assert!(matches!(parse(".a == 1").unwrap(), Filter::Cmp(_, CmpOp::Eq, _)));
        assert!(matches!(parse(".a | 1").unwrap(), Filter::Pipe(..)));
    }

    #[test]
    fn test_parse_binding_extends_right() {
        // 1, . as $x | $x  ==  1, (. as $x | $x)
        match parse("1, . as $x | $x").unwrap() {
            Filter::Comma(_, r) => assert!(matches!(*r, Filter::Bind(..))),
            other => panic!("unexpected {other:?}"),
        }
        match parse(". as [$a, {b: $c, $d}] | $a").unwrap() {
            Filter::Bind(_, Pattern::Array(items), _) => {
                assert_eq!(items[0], Pattern::Var("a".into()));
                assert_eq!(
                    items[1],
                    Pattern::Object(vec![
                        ("b".into(), Pattern::Var("c".into())),
                        ("d".into(), Pattern::Var("d".into())),
                    ])
                );
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_definitions() {
        let f = parse("def f($a; g): g + $a; f(1; 2)").unwrap();
        match f {
            Filter::Define(defs, body) => {
                assert_eq!(defs.len(), 1);
                assert_eq!(
                    defs[0].params,
                    vec![Param::Value("a".into()), Param::Filter("g".into())]
                );
                assert!(matches!(*body, Filter::Call(ref n, ref a) if n == "f" && a.len() == 2));
            }
            other => panic!("unexpected {other:?}"),
        }
        let (defs, body) = FilterParser::parse_module("def a: 1; # one\ndef b: 2;").unwrap();
        assert_eq!(defs.len(), 2);
        assert!(body.is_none());
    }

    #[test]
    fn test_parse_control_flow() {
        assert!(matches!(
            parse("if . then 1 elif . == 2 then 2 else 3 end").unwrap(),
            Filter::If(_, _, ref e) if matches!(**e, Filter::If(..))
        ));
        assert!(matches!(
            parse("if . then 1 end").unwrap(),
            Filter::If(_, _, ref e) if **e == Filter::Id
        ));
        assert!(matches!(
            parse("reduce .[] as $x (0; . + $x)").unwrap(),
            Filter::Reduce { .. }
        ));
        assert!(matches!(
            parse("foreach .[] as $x (0; . + $x; [$x, .])").unwrap(),
            Filter::Foreach { extract: Some(_), .. }
        ));
        assert!(matches!(
            parse("try error(1) catch .").unwrap(),
            Filter::Try(_, Some(_))
        ));
        assert!(matches!(parse(".a?").unwrap(), Filter::Try(_, None)));
    }

    #[test]
    fn test_parse_objects() {
        let f = parse(r#"{a, "b": 2, $c, (.d): 4, e: .x | .y}"#).unwrap();
        match f {
            Filter::Object(entries) => {
                assert_eq!(entries.len(), 5);
                assert_eq!(entries[0].1, Filter::Field(id(), "a".into()));
                assert_eq!(entries[2].1, Filter::Var("c".into()));
                assert!(matches!(entries[4].1, Filter::Pipe(..)));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(parse("1.5").unwrap(), Filter::Literal(json!(1.5)));
        assert_eq!(parse("1e2").unwrap(), Filter::Literal(json!(100)));
        assert_eq!(
            parse(r#""a\n\u00e9\ud83d\ude00""#).unwrap(),
            Filter::Literal(json!("a\n\u{e9}\u{1F600}"))
        );
        assert_eq!(parse("[]").unwrap(), Filter::Array(None));
        assert_eq!(parse("{}").unwrap(), Filter::Object(vec![]));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse(".a ]").unwrap_err(), ParseError::UnexpectedChar(']'));
        assert_eq!(parse("(1").unwrap_err(), ParseError::UnexpectedEnd);
        assert_eq!(parse(r#""abc"#).unwrap_err(), ParseError::UnclosedString);
        assert_eq!(
            parse("if 1 then 2").unwrap_err(),
            ParseError::Expected("end")
        );
        assert_eq!(
            parse("then").unwrap_err(),
            ParseError::UnexpectedKeyword("then".into())
        );
        assert_eq!(parse(r#""\q""#).unwrap_err(), ParseError::InvalidEscape);
    }
}
