//! Lexer for the driver's line syntax, using logos

mod token;

pub use token::Token;

use crate::error::DriverError;
use crate::span::Span;
use logos::Logos;

/// Tokenize one input line
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>, DriverError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::from(lexer.span());
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(_) => {
                return Err(DriverError::lexer(
                    format!("unexpected input: {:?}", lexer.slice()),
                    span,
                ));
            }
        }
    }

    Ok(tokens)
}
