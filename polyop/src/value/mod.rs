//! Runtime values observed by adaptive nodes
//!
//! Every value belongs to exactly one [`Kind`] for its whole lifetime.
//! Foreign values are never pattern-matched for their contents; they are
//! only probed through the capability table in [`crate::interop`].

use crate::error::{EvalError, EvalResult};
use crate::interop::Foreign;
use num_bigint::BigInt;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Runtime value
#[derive(Debug, Clone)]
pub enum Value {
    /// 64-bit signed integer
    Int(i64),
    /// Arbitrary-precision integer
    BigInt(BigInt),
    /// Immutable text, shared without copying
    Text(Arc<str>),
    /// Boolean
    Bool(bool),
    /// The null sentinel
    Null,
    /// Callable value, rendered by name
    Callable(Callable),
    /// Value owned by another runtime
    Foreign(Foreign),
}

/// Value kinds, one per [`Value`] variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Kind {
    Int,
    BigInt,
    Text,
    Bool,
    Null,
    Callable,
    Foreign,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Int => "Int64",
            Kind::BigInt => "BigInt",
            Kind::Text => "Text",
            Kind::Bool => "Bool",
            Kind::Null => "Null",
            Kind::Callable => "Callable",
            Kind::Foreign => "Foreign",
        };
        f.write_str(name)
    }
}

/// Representation key a limited specialization is cached under.
///
/// Native values are keyed by kind, foreign values by the representation
/// name their object reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Repr {
    Native(Kind),
    Foreign(Arc<str>),
}

impl fmt::Display for Repr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repr::Native(kind) => write!(f, "{kind}"),
            Repr::Foreign(name) => write!(f, "{name}"),
        }
    }
}

/// A callable value. Only its name is observable here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callable {
    name: Arc<str>,
}

impl Callable {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Callable { name: name.into() }
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }
}

impl Value {
    pub fn text(text: impl Into<Arc<str>>) -> Self {
        Value::Text(text.into())
    }

    pub fn big(value: impl Into<BigInt>) -> Self {
        Value::BigInt(value.into())
    }

    pub fn callable(name: impl Into<Arc<str>>) -> Self {
        Value::Callable(Callable::new(name))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Int(_) => Kind::Int,
            Value::BigInt(_) => Kind::BigInt,
            Value::Text(_) => Kind::Text,
            Value::Bool(_) => Kind::Bool,
            Value::Null => Kind::Null,
            Value::Callable(_) => Kind::Callable,
            Value::Foreign(_) => Kind::Foreign,
        }
    }

    pub fn repr(&self) -> Repr {
        match self {
            Value::Foreign(foreign) => Repr::Foreign(Arc::from(foreign.representation())),
            other => Repr::Native(other.kind()),
        }
    }

    /// Compare against a representation key without allocating
    pub fn has_repr(&self, repr: &Repr) -> bool {
        match (self, repr) {
            (Value::Foreign(foreign), Repr::Foreign(name)) => foreign.representation() == &**name,
            (Value::Foreign(_), Repr::Native(_)) => false,
            (value, Repr::Native(kind)) => value.kind() == *kind,
            (_, Repr::Foreign(_)) => false,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Value::Text(_))
    }

    /// `Int` or `BigInt`
    pub fn is_native_integer(&self) -> bool {
        matches!(self, Value::Int(_) | Value::BigInt(_))
    }

    /// Lossless widening of the native integer kinds.
    ///
    /// Returns `None` for every other kind; foreign values are never widened
    /// implicitly and go through [`Value::big_integer`] instead.
    pub fn widen(&self) -> Option<BigInt> {
        match self {
            Value::Int(n) => Some(BigInt::from(*n)),
            Value::BigInt(n) => Some(n.clone()),
            _ => None,
        }
    }

    /// Capability probe: does this value fit in an arbitrary-precision integer?
    pub fn fits_in_big_integer(&self) -> bool {
        match self {
            Value::Int(_) | Value::BigInt(_) => true,
            Value::Foreign(foreign) => foreign.fits_in_big_integer(),
            _ => false,
        }
    }

    /// Conversion matching [`Value::fits_in_big_integer`].
    ///
    /// Only called after the probe said yes, so a failure is an
    /// [`EvalError::Unreachable`].
    pub fn big_integer(&self, operation: &'static str) -> EvalResult<BigInt> {
        match self {
            Value::Foreign(foreign) => foreign.big_integer(operation),
            other => other.widen().ok_or_else(|| {
                EvalError::unreachable(
                    operation,
                    format!("{} does not fit in a big integer", other.kind()),
                )
            }),
        }
    }

    /// Meta-object name used in diagnostics
    pub fn meta_name(&self) -> Option<String> {
        match self {
            Value::Int(_) | Value::BigInt(_) => Some("Number".to_string()),
            Value::Text(_) => Some("String".to_string()),
            Value::Bool(_) => Some("Boolean".to_string()),
            Value::Null => None,
            Value::Callable(_) => Some("Function".to_string()),
            Value::Foreign(foreign) if foreign.is_null() => None,
            Value::Foreign(foreign) => foreign.meta_name(),
        }
    }

    /// Does the value render as a quoted string in diagnostics?
    pub fn is_string_like(&self) -> bool {
        match self {
            Value::Text(_) => true,
            Value::Foreign(foreign) => foreign.is_text(),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::BigInt(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => write!(f, "NULL"),
            Value::Callable(callable) => write!(f, "{}", callable.name()),
            Value::Foreign(foreign) => write!(f, "{}", foreign.display_string()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Callable(a), Value::Callable(b)) => a == b,
            (Value::Foreign(a), Value::Foreign(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::BigInt(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(Arc::from(s))
    }
}

impl From<Foreign> for Value {
    fn from(foreign: Foreign) -> Self {
        Value::Foreign(foreign)
    }
}
