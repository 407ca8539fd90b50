//! Foreign interop facade
//!
//! Values owned by another runtime are reached only through the capability
//! table of [`ForeignObject`]: four probes and the matching conversions.
//! A probe that answers `true` promises that its conversion succeeds; a
//! conversion that fails anyway is reported as [`EvalError::Unreachable`],
//! never as a user-visible type error.

pub mod host;

use crate::error::{EvalError, EvalResult};
use num_bigint::BigInt;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use thiserror::Error;

/// Conversion requested on a foreign value that does not support it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported representation: {message}")]
pub struct Unsupported {
    pub message: &'static str,
}

impl Unsupported {
    pub fn new(message: &'static str) -> Self {
        Unsupported { message }
    }
}

/// Capability table of a foreign value.
///
/// Every probe defaults to `false` and every conversion to [`Unsupported`],
/// so an implementation only declares what it supports.
pub trait ForeignObject: fmt::Debug + Send + Sync {
    /// Name of the external representation. Values sharing a name share
    /// cache entries at a call site.
    fn representation(&self) -> &str;

    fn fits_in_integer(&self) -> bool {
        false
    }

    fn fits_in_big_integer(&self) -> bool {
        false
    }

    fn is_text(&self) -> bool {
        false
    }

    fn is_null(&self) -> bool {
        false
    }

    fn as_integer(&self) -> Result<i64, Unsupported> {
        Err(Unsupported::new("as_integer"))
    }

    fn as_big_integer(&self) -> Result<BigInt, Unsupported> {
        Err(Unsupported::new("as_big_integer"))
    }

    fn as_text(&self) -> Result<String, Unsupported> {
        Err(Unsupported::new("as_text"))
    }

    /// Meta-object name for diagnostics, if the foreign runtime has one
    fn meta_name(&self) -> Option<String> {
        None
    }

    /// Display string for diagnostics
    fn display_string(&self) -> String;
}

/// Shared handle to a foreign value
#[derive(Clone)]
pub struct Foreign(Arc<dyn ForeignObject>);

impl Foreign {
    pub fn new(object: impl ForeignObject + 'static) -> Self {
        Foreign(Arc::new(object))
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Foreign) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// [`ForeignObject::as_integer`] after a successful probe
    pub fn integer(&self, operation: &'static str) -> EvalResult<i64> {
        self.0
            .as_integer()
            .map_err(|err| broken_contract(operation, "fits_in_integer", self, err))
    }

    /// [`ForeignObject::as_big_integer`] after a successful probe
    pub fn big_integer(&self, operation: &'static str) -> EvalResult<BigInt> {
        self.0
            .as_big_integer()
            .map_err(|err| broken_contract(operation, "fits_in_big_integer", self, err))
    }

    /// [`ForeignObject::as_text`] after a successful probe
    pub fn text(&self, operation: &'static str) -> EvalResult<String> {
        self.0
            .as_text()
            .map_err(|err| broken_contract(operation, "is_text", self, err))
    }
}

fn broken_contract(
    operation: &'static str,
    probe: &str,
    foreign: &Foreign,
    err: Unsupported,
) -> EvalError {
    EvalError::unreachable(
        operation,
        format!(
            "{} reported {probe} but the conversion failed ({err})",
            foreign.representation()
        ),
    )
}

impl Deref for Foreign {
    type Target = dyn ForeignObject;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl fmt::Debug for Foreign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Foreign").field(&self.0).finish()
    }
}
