//! Parser for the driver's line syntax
//!
//! ```text
//! line    := operand ('+' operand)*
//! operand := INT | INT'n' | STRING | 'true' | 'false' | 'null'
//!          | 'fn' IDENT
//!          | 'foreign' ( 'int' INT | 'big' INT | 'text' STRING
//!                      | 'null' | 'object' IDENT )
//! ```

use crate::error::DriverError;
use crate::interop::Foreign;
use crate::interop::host::{HostBigInteger, HostInteger, HostNull, HostObject, HostString};
use crate::lexer::{Token, tokenize};
use crate::span::Span;
use crate::value::Value;
use num_bigint::BigInt;
use num_traits::ToPrimitive;

/// A literal operand and where it was written
#[derive(Debug, Clone, PartialEq)]
pub struct Operand {
    pub value: Value,
    pub span: Span,
}

/// A parsed line: `operands.len() == plus_spans.len() + 1`
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub operands: Vec<Operand>,
    pub plus_spans: Vec<Span>,
}

/// Tokenize and parse one line
pub fn parse(source: &str) -> Result<Line, DriverError> {
    let tokens = tokenize(source)?;
    Parser::new(tokens, source.len()).line()
}

struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn new(tokens: Vec<(Token, Span)>, end: usize) -> Self {
        Parser { tokens, pos: 0, end }
    }

    fn line(mut self) -> Result<Line, DriverError> {
        let mut operands = vec![self.operand()?];
        let mut plus_spans = Vec::new();
        while let Some((token, span)) = self.next() {
            if token != Token::Plus {
                return Err(DriverError::parser(format!("expected `+`, found `{token}`"), span));
            }
            plus_spans.push(span);
            operands.push(self.operand()?);
        }
        Ok(Line { operands, plus_spans })
    }

    fn operand(&mut self) -> Result<Operand, DriverError> {
        let (token, span) = self.expect("an operand")?;
        let value = match token {
            Token::IntLit(n) => integer(n),
            Token::BigLit(n) => Value::BigInt(n),
            Token::StringLit(s) => Value::text(s),
            Token::True => Value::Bool(true),
            Token::False => Value::Bool(false),
            Token::Null => Value::Null,
            Token::Fn => {
                let (name, name_span) = self.ident("a function name")?;
                return Ok(Operand {
                    value: Value::callable(name),
                    span: span.merge(name_span),
                });
            }
            Token::Foreign => return self.foreign(span),
            other => {
                return Err(DriverError::parser(
                    format!("expected an operand, found `{other}`"),
                    span,
                ));
            }
        };
        Ok(Operand { value, span })
    }

    fn foreign(&mut self, start: Span) -> Result<Operand, DriverError> {
        let (token, span) = self.expect("a foreign value kind")?;
        let (object, end) = match token {
            Token::Null => (Foreign::new(HostNull), span),
            Token::Ident(kind) => match kind.as_str() {
                "int" => {
                    let (n, end) = self.integer_literal()?;
                    let n = n.to_i64().ok_or_else(|| {
                        DriverError::parser("foreign int does not fit in 64 bits", end)
                    })?;
                    (Foreign::new(HostInteger(n)), end)
                }
                "big" => {
                    let (n, end) = self.integer_literal()?;
                    (Foreign::new(HostBigInteger(n)), end)
                }
                "text" => match self.expect("a string literal")? {
                    (Token::StringLit(s), end) => (Foreign::new(HostString(s)), end),
                    (other, end) => {
                        return Err(DriverError::parser(
                            format!("expected a string literal, found `{other}`"),
                            end,
                        ));
                    }
                },
                "object" => {
                    let (class, end) = self.ident("a class name")?;
                    (Foreign::new(HostObject::new(class)), end)
                }
                _ => {
                    return Err(DriverError::parser(
                        format!("unknown foreign kind `{kind}` (expected int, big, text, null or object)"),
                        span,
                    ));
                }
            },
            other => {
                return Err(DriverError::parser(
                    format!("expected a foreign value kind, found `{other}`"),
                    span,
                ));
            }
        };
        Ok(Operand {
            value: Value::Foreign(object),
            span: start.merge(end),
        })
    }

    fn integer_literal(&mut self) -> Result<(BigInt, Span), DriverError> {
        match self.expect("an integer")? {
            (Token::IntLit(n) | Token::BigLit(n), span) => Ok((n, span)),
            (other, span) => Err(DriverError::parser(
                format!("expected an integer, found `{other}`"),
                span,
            )),
        }
    }

    fn ident(&mut self, what: &str) -> Result<(String, Span), DriverError> {
        match self.expect(what)? {
            (Token::Ident(name), span) => Ok((name, span)),
            (other, span) => Err(DriverError::parser(
                format!("expected {what}, found `{other}`"),
                span,
            )),
        }
    }

    fn expect(&mut self, what: &str) -> Result<(Token, Span), DriverError> {
        self.next().ok_or_else(|| {
            DriverError::parser(
                format!("expected {what}, found end of line"),
                Span::new(self.end, self.end),
            )
        })
    }

    fn next(&mut self) -> Option<(Token, Span)> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }
}

/// `Int` when the literal fits in 64 bits, `BigInt` otherwise
fn integer(n: BigInt) -> Value {
    match n.to_i64() {
        Some(n) => Value::Int(n),
        None => Value::BigInt(n),
    }
}
