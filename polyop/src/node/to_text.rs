//! Adaptive value-to-text coercion
//!
//! Every kind has exactly one canonical text form, so this node never
//! rewrites on failure; it only specializes on the kinds it observes.
//! Foreign values are cached per representation and spend the admission
//! limit.

use super::Node;
use crate::cache::{CacheSnapshot, Resolution, Specialization, SpecializationCache};
use crate::config::RuntimeConfig;
use crate::error::{EvalError, EvalResult};
use crate::interop::Foreign;
use crate::value::Value;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Operation name reported by this node
pub const OPERATION: &str = "to_text";

static NULL_TEXT: LazyLock<Arc<str>> = LazyLock::new(|| Arc::from("null"));
static FOREIGN_NULL_TEXT: LazyLock<Arc<str>> = LazyLock::new(|| Arc::from("null"));
static TRUE_TEXT: LazyLock<Arc<str>> = LazyLock::new(|| Arc::from("true"));
static FALSE_TEXT: LazyLock<Arc<str>> = LazyLock::new(|| Arc::from("false"));
static FOREIGN_OBJECT_TEXT: LazyLock<Arc<str>> = LazyLock::new(|| Arc::from("[foreign object]"));

/// Conversions the to-text node can install
#[derive(Debug, Clone, PartialEq)]
pub enum ToTextSpecialization {
    Null,
    Text,
    Bool,
    Int,
    BigInt,
    Callable,
    /// Foreign values of one representation, probed in fixed order
    Foreign { representation: Arc<str> },
}

impl fmt::Display for ToTextSpecialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToTextSpecialization::Null => write!(f, "Null"),
            ToTextSpecialization::Text => write!(f, "Text"),
            ToTextSpecialization::Bool => write!(f, "Bool"),
            ToTextSpecialization::Int => write!(f, "Int64"),
            ToTextSpecialization::BigInt => write!(f, "BigInt"),
            ToTextSpecialization::Callable => write!(f, "Callable"),
            ToTextSpecialization::Foreign { representation } => {
                write!(f, "Foreign({representation})")
            }
        }
    }
}

impl Specialization for ToTextSpecialization {
    type Operands = Value;

    fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ToTextSpecialization::Null, Value::Null)
            | (ToTextSpecialization::Text, Value::Text(_))
            | (ToTextSpecialization::Bool, Value::Bool(_))
            | (ToTextSpecialization::Int, Value::Int(_))
            | (ToTextSpecialization::BigInt, Value::BigInt(_))
            | (ToTextSpecialization::Callable, Value::Callable(_)) => true,
            (ToTextSpecialization::Foreign { representation }, Value::Foreign(foreign)) => {
                foreign.representation() == &**representation
            }
            _ => false,
        }
    }

    fn is_limited(&self) -> bool {
        matches!(self, ToTextSpecialization::Foreign { .. })
    }
}

impl ToTextSpecialization {
    /// The specialization that handles `value`
    pub fn for_value(value: &Value) -> Self {
        match value {
            Value::Null => ToTextSpecialization::Null,
            Value::Text(_) => ToTextSpecialization::Text,
            Value::Bool(_) => ToTextSpecialization::Bool,
            Value::Int(_) => ToTextSpecialization::Int,
            Value::BigInt(_) => ToTextSpecialization::BigInt,
            Value::Callable(_) => ToTextSpecialization::Callable,
            Value::Foreign(foreign) => ToTextSpecialization::Foreign {
                representation: Arc::from(foreign.representation()),
            },
        }
    }

    fn convert(&self, value: &Value) -> EvalResult<Arc<str>> {
        match (self, value) {
            (ToTextSpecialization::Null, Value::Null) => Ok(NULL_TEXT.clone()),
            (ToTextSpecialization::Text, Value::Text(text)) => Ok(text.clone()),
            (ToTextSpecialization::Bool, Value::Bool(true)) => Ok(TRUE_TEXT.clone()),
            (ToTextSpecialization::Bool, Value::Bool(false)) => Ok(FALSE_TEXT.clone()),
            (ToTextSpecialization::Int, Value::Int(n)) => Ok(Arc::from(n.to_string())),
            (ToTextSpecialization::BigInt, Value::BigInt(n)) => Ok(Arc::from(n.to_string())),
            (ToTextSpecialization::Callable, Value::Callable(callable)) => {
                Ok(callable.name().clone())
            }
            (ToTextSpecialization::Foreign { .. }, Value::Foreign(foreign)) => {
                from_foreign(foreign)
            }
            (spec, value) => Err(EvalError::unreachable(
                OPERATION,
                format!("{spec} conversion applied to a {} value", value.kind()),
            )),
        }
    }
}

/// Probe order: integer, text, big integer, null, then the placeholder
fn from_foreign(foreign: &Foreign) -> EvalResult<Arc<str>> {
    if foreign.fits_in_integer() {
        return Ok(Arc::from(foreign.integer(OPERATION)?.to_string()));
    }
    if foreign.is_text() {
        return Ok(Arc::from(foreign.text(OPERATION)?));
    }
    if foreign.fits_in_big_integer() {
        return Ok(Arc::from(foreign.big_integer(OPERATION)?.to_string()));
    }
    if foreign.is_null() {
        return Ok(FOREIGN_NULL_TEXT.clone());
    }
    Ok(FOREIGN_OBJECT_TEXT.clone())
}

fn specialize(value: &Value, _retired: &[ToTextSpecialization]) -> Option<ToTextSpecialization> {
    Some(ToTextSpecialization::for_value(value))
}

/// Converts any value to its canonical text
#[derive(Debug, Clone)]
pub struct ToTextNode {
    cache: SpecializationCache<ToTextSpecialization>,
}

impl ToTextNode {
    pub fn new(config: &RuntimeConfig) -> Self {
        ToTextNode {
            cache: SpecializationCache::new(OPERATION, config.to_text_limit),
        }
    }

    pub fn execute(&mut self, value: &Value) -> EvalResult<Arc<str>> {
        match self.cache.resolve(value, specialize) {
            Resolution::Cached(spec) | Resolution::Installed(spec) => spec.convert(value),
            Resolution::Generic | Resolution::Unsupported => Self::execute_uncached(value),
        }
    }

    /// The generic implementation: same conversions, nothing cached
    pub fn execute_uncached(value: &Value) -> EvalResult<Arc<str>> {
        ToTextSpecialization::for_value(value).convert(value)
    }

    pub fn cache(&self) -> &SpecializationCache<ToTextSpecialization> {
        &self.cache
    }
}

impl Default for ToTextNode {
    fn default() -> Self {
        Self::new(&RuntimeConfig::default())
    }
}

impl Node for ToTextNode {
    fn operation(&self) -> &'static str {
        OPERATION
    }

    fn snapshot(&self) -> CacheSnapshot {
        self.cache.snapshot()
    }
}
