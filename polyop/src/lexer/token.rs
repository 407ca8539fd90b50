//! Token definitions for the line syntax

use logos::Logos;
use num_bigint::BigInt;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("fn")]
    Fn,
    #[token("foreign")]
    Foreign,

    #[token("+")]
    Plus,

    /// Integer with an `n` suffix, always arbitrary precision
    #[regex(r"-?[0-9]+n", |lex| {
        let s = lex.slice();
        s[..s.len() - 1].parse::<BigInt>().ok()
    }, priority = 3)]
    BigLit(BigInt),

    /// Decimal integer of any magnitude; the parser narrows it
    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<BigInt>().ok(), priority = 2)]
    IntLit(BigInt),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    StringLit(String),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_.]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),
}

/// Strip the quotes and process escape sequences
fn unescape(literal: &str) -> String {
    let inner = &literal[1..literal.len() - 1];
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('0') => result.push('\0'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Null => write!(f, "null"),
            Token::Fn => write!(f, "fn"),
            Token::Foreign => write!(f, "foreign"),
            Token::Plus => write!(f, "+"),
            Token::BigLit(n) => write!(f, "{n}n"),
            Token::IntLit(n) => write!(f, "{n}"),
            Token::StringLit(s) => write!(f, "\"{s}\""),
            Token::Ident(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trips_source_form() {
        assert_eq!(Token::BigLit(BigInt::from(7)).to_string(), "7n");
        assert_eq!(Token::IntLit(BigInt::from(-3)).to_string(), "-3");
        assert_eq!(Token::StringLit("hi".to_string()).to_string(), "\"hi\"");
        assert_eq!(Token::Foreign.to_string(), "foreign");
        assert_eq!(Token::Plus.to_string(), "+");
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r#""a\nb""#), "a\nb");
        assert_eq!(unescape(r#""say \"hi\"""#), "say \"hi\"");
        assert_eq!(unescape(r#""\q""#), "\\q");
        assert_eq!(unescape(r#""""#), "");
    }
}
