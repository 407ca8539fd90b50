//! Error types and reporting

use crate::node::SourceLocation;
use crate::span::Span;
use crate::value::Value;
use std::fmt;
use thiserror::Error;

/// Result type for node evaluation
pub type EvalResult<T> = Result<T, EvalError>;

/// Evaluation error.
///
/// `Type` is the only user-visible failure. `Unreachable` means a foreign
/// value broke its capability contract and must not be retried.
#[derive(Debug, Clone, Error)]
pub enum EvalError {
    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("unreachable state in operation \"{operation}\": {message}")]
    Unreachable {
        operation: &'static str,
        message: String,
    },
}

impl EvalError {
    pub fn unreachable(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Unreachable {
            operation,
            message: message.into(),
        }
    }

    pub fn is_type_error(&self) -> bool {
        matches!(self, Self::Type(_))
    }
}

/// No numeric or textual interpretation exists for the operands
#[derive(Debug, Clone)]
pub struct TypeError {
    pub operation: &'static str,
    pub operands: Vec<Value>,
    pub location: Option<SourceLocation>,
}

impl TypeError {
    pub fn new(operation: &'static str, operands: Vec<Value>) -> Self {
        TypeError {
            operation,
            operands,
            location: None,
        }
    }

    pub fn at(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type error")?;
        if let Some(location) = &self.location {
            write!(f, " at {location}")?;
        }
        write!(f, ": operation \"{}\" not defined for", self.operation)?;

        let mut sep = " ";
        for operand in &self.operands {
            write!(f, "{sep}")?;
            sep = ", ";
            if let Some(meta) = operand.meta_name() {
                write!(f, "{meta} ")?;
            }
            if operand.is_string_like() {
                write!(f, "\"{operand}\"")?;
            } else {
                write!(f, "{operand}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for TypeError {}

/// Driver error: the line syntax, configuration and I/O around the nodes
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Lexer error at {span:?}: {message}")]
    Lexer { message: String, span: Span },

    #[error("Parser error at {span:?}: {message}")]
    Parser { message: String, span: Span },

    #[error("{error}")]
    Eval { error: EvalError, span: Option<Span> },

    #[error("Config error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DriverError {
    pub fn lexer(message: impl Into<String>, span: Span) -> Self {
        Self::Lexer {
            message: message.into(),
            span,
        }
    }

    pub fn parser(message: impl Into<String>, span: Span) -> Self {
        Self::Parser {
            message: message.into(),
            span,
        }
    }

    pub fn eval(error: EvalError, span: Option<Span>) -> Self {
        Self::Eval { error, span }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lexer { span, .. } | Self::Parser { span, .. } => Some(*span),
            Self::Eval { span, .. } => *span,
            Self::Config { .. } | Self::Io(_) => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Lexer { message, .. } | Self::Parser { message, .. } => message.clone(),
            Self::Config { message } => message.clone(),
            Self::Eval { error, .. } => error.to_string(),
            Self::Io(err) => err.to_string(),
        }
    }
}

impl From<EvalError> for DriverError {
    fn from(error: EvalError) -> Self {
        Self::eval(error, None)
    }
}

/// Report error with ariadne
pub fn report_error(filename: &str, source: &str, error: &DriverError) {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let kind = match error {
        DriverError::Lexer { .. } => "Lexer",
        DriverError::Parser { .. } => "Parser",
        DriverError::Eval {
            error: EvalError::Type(_),
            ..
        } => "Type",
        DriverError::Eval { .. } => "Internal",
        DriverError::Config { .. } => "Config",
        DriverError::Io(_) => "IO",
    };

    let printed = if let Some(span) = error.span() {
        Report::build(ReportKind::Error, (filename, span.start..span.end))
            .with_message(format!("{kind} error"))
            .with_label(
                Label::new((filename, span.start..span.end))
                    .with_message(error.message())
                    .with_color(Color::Red),
            )
            .finish()
            .eprint((filename, Source::from(source)))
    } else {
        Report::build(ReportKind::Error, (filename, 0..0))
            .with_message(format!("{kind} error: {}", error.message()))
            .finish()
            .eprint((filename, Source::from(source)))
    };

    if printed.is_err() {
        eprintln!("{kind} error: {}", error.message());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interop::Foreign;
    use crate::interop::host::{HostNull, HostObject, HostString};

    #[test]
    fn test_type_error_message_format() {
        let err = TypeError::new("+", vec![Value::Bool(true), Value::Int(1)]);
        insta::assert_snapshot!(err.to_string(), @r#"Type error: operation "+" not defined for Boolean true, Number 1"#);
    }

    #[test]
    fn test_type_error_quotes_text_operands() {
        let err = TypeError::new("+", vec![Value::text("a"), Value::Null]);
        assert_eq!(
            err.to_string(),
            "Type error: operation \"+\" not defined for String \"a\", NULL"
        );
    }

    #[test]
    fn test_type_error_with_location() {
        let location = SourceLocation::new("main.vk", 3, 7);
        let err = TypeError::new("+", vec![Value::Null, Value::Bool(false)]).at(Some(location));
        insta::assert_snapshot!(err.to_string(), @r#"Type error at main.vk line 3 col 7: operation "+" not defined for NULL, Boolean false"#);
    }

    #[test]
    fn test_type_error_foreign_operands() {
        let err = TypeError::new(
            "+",
            vec![
                Value::Foreign(Foreign::new(HostObject::new("Point"))),
                Value::Foreign(Foreign::new(HostNull)),
            ],
        );
        assert_eq!(
            err.to_string(),
            "Type error: operation \"+\" not defined for Point Point@object, null"
        );

        let err = TypeError::new(
            "+",
            vec![Value::Foreign(Foreign::new(HostString("x".into()))), Value::callable("f")],
        );
        assert_eq!(
            err.to_string(),
            "Type error: operation \"+\" not defined for host.String \"x\", Function f"
        );
    }

    #[test]
    fn test_eval_error_from_type_error() {
        let err: EvalError = TypeError::new("+", vec![]).into();
        assert!(err.is_type_error());
    }

    #[test]
    fn test_unreachable_is_not_type_error() {
        let err = EvalError::unreachable("+", "broken facade");
        assert!(!err.is_type_error());
        assert_eq!(
            err.to_string(),
            "unreachable state in operation \"+\": broken facade"
        );
    }

    #[test]
    fn test_driver_error_span() {
        let err = DriverError::parser("expected operand", Span::new(2, 3));
        assert_eq!(err.span(), Some(Span::new(2, 3)));
        assert_eq!(err.message(), "expected operand");

        let err = DriverError::config("bad limit");
        assert_eq!(err.span(), None);
        assert_eq!(err.to_string(), "Config error: bad limit");
    }

    #[test]
    fn test_driver_error_wraps_eval_error() {
        let eval = EvalError::Type(TypeError::new("+", vec![Value::Bool(true), Value::Null]));
        let err = DriverError::eval(eval, Some(Span::new(0, 1)));
        assert!(err.message().starts_with("Type error"));
        assert_eq!(err.span(), Some(Span::new(0, 1)));
    }
}
