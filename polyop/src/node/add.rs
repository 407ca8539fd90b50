//! Adaptive addition
//!
//! Specializations, from most specific to most general:
//!
//! 1. `FixedWidth` - two `Int`s, overflow-checked. An overflow retires it
//!    for the call site and the same operands are re-dispatched.
//! 2. `ArbitraryPrecision` - `Int`/`BigInt` pairs, widened, result `BigInt`.
//! 3. `ForeignNumeric` - any pair that fits in a big integer, keyed by
//!    operand representation; replaces `ArbitraryPrecision` and spends the
//!    admission limit.
//! 4. `Concat` - either operand is `Text`. Checked before any numeric
//!    interpretation.
//!
//! Anything else is a [`TypeError`].

use super::to_text::ToTextNode;
use super::{Node, SourceLocation};
use crate::cache::{CacheSnapshot, Resolution, Specialization, SpecializationCache};
use crate::config::RuntimeConfig;
use crate::error::{EvalError, EvalResult, TypeError};
use crate::value::{Repr, Value};
use log::debug;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Operation name reported by this node
pub const OPERATION: &str = "+";

/// Implementations the add node can install
#[derive(Debug, Clone, PartialEq)]
pub enum AddSpecialization {
    FixedWidth,
    ArbitraryPrecision,
    ForeignNumeric { left: Repr, right: Repr },
    Concat,
}

impl fmt::Display for AddSpecialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddSpecialization::FixedWidth => write!(f, "FixedWidth"),
            AddSpecialization::ArbitraryPrecision => write!(f, "ArbitraryPrecision"),
            AddSpecialization::ForeignNumeric { left, right } => {
                write!(f, "ForeignNumeric({left}, {right})")
            }
            AddSpecialization::Concat => write!(f, "Concat"),
        }
    }
}

impl Specialization for AddSpecialization {
    type Operands = (Value, Value);

    fn accepts(&self, (left, right): &(Value, Value)) -> bool {
        match self {
            AddSpecialization::FixedWidth => {
                matches!((left, right), (Value::Int(_), Value::Int(_)))
            }
            AddSpecialization::ArbitraryPrecision => {
                left.is_native_integer() && right.is_native_integer()
            }
            AddSpecialization::ForeignNumeric {
                left: left_repr,
                right: right_repr,
            } => {
                left.has_repr(left_repr)
                    && right.has_repr(right_repr)
                    && left.fits_in_big_integer()
                    && right.fits_in_big_integer()
            }
            AddSpecialization::Concat => left.is_text() || right.is_text(),
        }
    }

    fn is_limited(&self) -> bool {
        matches!(self, AddSpecialization::ForeignNumeric { .. })
    }

    fn replaces(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (
                AddSpecialization::ForeignNumeric { .. },
                AddSpecialization::ArbitraryPrecision
            )
        )
    }
}

/// Most general numeric state an add call site has reached.
///
/// Ordered: a call site only ever moves to a greater state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum AddState {
    Uninitialized,
    FixedWidth,
    ArbitraryPrecision,
    ForeignNumeric,
    Generic,
}

/// Result of running one specialization
enum Step {
    Done(Value),
    /// The specialization's assumption failed; retire it and re-dispatch
    Rewrite,
}

fn specialize(
    (left, right): &(Value, Value),
    retired: &[AddSpecialization],
) -> Option<AddSpecialization> {
    if left.is_text() || right.is_text() {
        return Some(AddSpecialization::Concat);
    }
    if matches!((left, right), (Value::Int(_), Value::Int(_)))
        && !retired.contains(&AddSpecialization::FixedWidth)
    {
        return Some(AddSpecialization::FixedWidth);
    }
    if left.is_native_integer()
        && right.is_native_integer()
        && !retired.contains(&AddSpecialization::ArbitraryPrecision)
    {
        return Some(AddSpecialization::ArbitraryPrecision);
    }
    if left.fits_in_big_integer() && right.fits_in_big_integer() {
        return Some(AddSpecialization::ForeignNumeric {
            left: left.repr(),
            right: right.repr(),
        });
    }
    None
}

/// The `+` operation at one call site
#[derive(Debug, Clone)]
pub struct AddNode {
    cache: SpecializationCache<AddSpecialization>,
    left_text: ToTextNode,
    right_text: ToTextNode,
    location: Option<SourceLocation>,
}

impl AddNode {
    pub fn new(config: &RuntimeConfig) -> Self {
        AddNode {
            cache: SpecializationCache::new(OPERATION, config.add_limit),
            left_text: ToTextNode::new(config),
            right_text: ToTextNode::new(config),
            location: None,
        }
    }

    /// Attach the call site's source location, reported in type errors
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Move the call site, e.g. when a driver reuses it for a new line
    pub fn set_location(&mut self, location: Option<SourceLocation>) {
        self.location = location;
    }

    /// Add two values
    pub fn execute(&mut self, left: Value, right: Value) -> EvalResult<Value> {
        let operands = (left, right);
        loop {
            let spec = match self.cache.resolve(&operands, specialize) {
                Resolution::Cached(spec) | Resolution::Installed(spec) => spec,
                Resolution::Generic => return self.execute_generic(&operands),
                Resolution::Unsupported => return Err(self.type_error(operands)),
            };
            match self.run(&spec, &operands)? {
                Step::Done(value) => return Ok(value),
                Step::Rewrite => {
                    debug!("{OPERATION}: {spec} overflowed, rewriting call site");
                    self.cache.retire(&spec);
                }
            }
        }
    }

    fn run(&mut self, spec: &AddSpecialization, operands: &(Value, Value)) -> EvalResult<Step> {
        let (left, right) = operands;
        match spec {
            AddSpecialization::FixedWidth => match (left, right) {
                (Value::Int(a), Value::Int(b)) => Ok(match a.checked_add(*b) {
                    Some(sum) => Step::Done(Value::Int(sum)),
                    None => Step::Rewrite,
                }),
                _ => Err(mismatch(spec, operands)),
            },
            AddSpecialization::ArbitraryPrecision => match (left.widen(), right.widen()) {
                (Some(a), Some(b)) => Ok(Step::Done(Value::BigInt(a + b))),
                _ => Err(mismatch(spec, operands)),
            },
            AddSpecialization::ForeignNumeric { .. } => {
                let sum = left.big_integer(OPERATION)? + right.big_integer(OPERATION)?;
                Ok(Step::Done(Value::BigInt(sum)))
            }
            AddSpecialization::Concat => self.concat(left, right).map(Step::Done),
        }
    }

    /// Uncached dispatch once the admission limit is spent
    fn execute_generic(&mut self, operands: &(Value, Value)) -> EvalResult<Value> {
        let (left, right) = operands;
        if left.is_text() || right.is_text() {
            return self.concat(left, right);
        }
        if left.fits_in_big_integer() && right.fits_in_big_integer() {
            let sum = left.big_integer(OPERATION)? + right.big_integer(OPERATION)?;
            return Ok(Value::BigInt(sum));
        }
        Err(self.type_error(operands.clone()))
    }

    fn concat(&mut self, left: &Value, right: &Value) -> EvalResult<Value> {
        let left = self.left_text.execute(left)?;
        let right = self.right_text.execute(right)?;
        let mut joined = String::with_capacity(left.len() + right.len());
        joined.push_str(&left);
        joined.push_str(&right);
        Ok(Value::Text(Arc::from(joined)))
    }

    fn type_error(&self, (left, right): (Value, Value)) -> EvalError {
        TypeError::new(OPERATION, vec![left, right])
            .at(self.location.clone())
            .into()
    }

    /// Most general numeric state reached so far
    pub fn state(&self) -> AddState {
        if self.cache.is_generic() {
            return AddState::Generic;
        }
        let seen = |spec: &AddSpecialization| {
            self.cache.contains(spec) || self.cache.is_retired(spec)
        };
        let foreign = |spec: &AddSpecialization| {
            matches!(spec, AddSpecialization::ForeignNumeric { .. })
        };
        if self.cache.entries().iter().any(foreign) || self.cache.retired().iter().any(foreign) {
            AddState::ForeignNumeric
        } else if seen(&AddSpecialization::ArbitraryPrecision)
            || self.cache.is_retired(&AddSpecialization::FixedWidth)
        {
            AddState::ArbitraryPrecision
        } else if seen(&AddSpecialization::FixedWidth) {
            AddState::FixedWidth
        } else {
            AddState::Uninitialized
        }
    }

    pub fn cache(&self) -> &SpecializationCache<AddSpecialization> {
        &self.cache
    }
}

fn mismatch(spec: &AddSpecialization, (left, right): &(Value, Value)) -> EvalError {
    EvalError::unreachable(
        OPERATION,
        format!("{spec} ran on {} and {}", left.kind(), right.kind()),
    )
}

impl Default for AddNode {
    fn default() -> Self {
        Self::new(&RuntimeConfig::default())
    }
}

impl Node for AddNode {
    fn operation(&self) -> &'static str {
        OPERATION
    }

    fn snapshot(&self) -> CacheSnapshot {
        self.cache.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interop::host::{HostBigInteger, HostInteger, HostNull, HostString};
    use crate::interop::{Foreign, ForeignObject, Unsupported};
    use crate::value::Kind;
    use num_bigint::BigInt;

    fn host_int(n: i64) -> Value {
        Value::Foreign(Foreign::new(HostInteger(n)))
    }

    fn big(s: &str) -> BigInt {
        s.parse().unwrap()
    }

    #[test]
    fn test_fixed_width_fast_path() {
        let mut node = AddNode::default();
        assert_eq!(node.execute(Value::Int(2), Value::Int(3)).unwrap(), Value::Int(5));
        assert_eq!(node.execute(Value::Int(-7), Value::Int(7)).unwrap(), Value::Int(0));
        assert_eq!(node.state(), AddState::FixedWidth);
        assert_eq!(node.cache().entries(), &[AddSpecialization::FixedWidth]);
    }

    #[test]
    fn test_overflow_rewrites_to_arbitrary_precision() {
        let mut node = AddNode::default();
        node.execute(Value::Int(1), Value::Int(1)).unwrap();

        let sum = node.execute(Value::Int(i64::MAX), Value::Int(1)).unwrap();
        assert_eq!(sum, Value::BigInt(big("9223372036854775808")));
        assert_eq!(node.state(), AddState::ArbitraryPrecision);
        assert!(node.cache().is_retired(&AddSpecialization::FixedWidth));

        // Never back to fixed width, even for small operands
        assert_eq!(node.execute(Value::Int(1), Value::Int(2)).unwrap(), Value::big(3));
        assert_eq!(node.state(), AddState::ArbitraryPrecision);
    }

    #[test]
    fn test_negative_overflow() {
        let mut node = AddNode::default();
        let sum = node.execute(Value::Int(i64::MIN), Value::Int(-1)).unwrap();
        assert_eq!(sum, Value::BigInt(big("-9223372036854775809")));
    }

    #[test]
    fn test_first_call_overflow_installs_both() {
        let mut node = AddNode::default();
        node.execute(Value::Int(i64::MAX), Value::Int(i64::MAX)).unwrap();
        let snapshot = node.snapshot();
        assert_eq!(snapshot.specializations, vec!["ArbitraryPrecision"]);
        assert_eq!(snapshot.retired, vec!["FixedWidth"]);
        assert_eq!(snapshot.installs, 2);
    }

    #[test]
    fn test_mixed_int_and_bigint_widen() {
        let mut node = AddNode::default();
        let sum = node.execute(Value::Int(5), Value::big(big("100000000000000000000"))).unwrap();
        assert_eq!(sum, Value::BigInt(big("100000000000000000005")));
        // No fixed-width entry was ever needed
        assert_eq!(node.cache().entries(), &[AddSpecialization::ArbitraryPrecision]);
    }

    #[test]
    fn test_bigint_result_is_never_narrowed() {
        let mut node = AddNode::default();
        let sum = node.execute(Value::big(1), Value::big(2)).unwrap();
        assert_eq!(sum.kind(), Kind::BigInt);
    }

    #[test]
    fn test_foreign_numeric_replaces_arbitrary_precision() {
        let mut node = AddNode::default();
        node.execute(Value::big(1), Value::Int(1)).unwrap();
        assert_eq!(node.state(), AddState::ArbitraryPrecision);

        let sum = node.execute(host_int(40), Value::Int(2)).unwrap();
        assert_eq!(sum, Value::big(42));
        assert_eq!(node.state(), AddState::ForeignNumeric);
        assert!(node.cache().is_retired(&AddSpecialization::ArbitraryPrecision));
        assert!(!node.cache().contains(&AddSpecialization::ArbitraryPrecision));

        // Native big integers now take a limited entry of their own
        node.execute(Value::big(1), Value::big(1)).unwrap();
        assert_eq!(node.cache().limited_install_count(), 2);
    }

    #[test]
    fn test_foreign_numeric_keeps_fixed_width() {
        let mut node = AddNode::default();
        node.execute(Value::Int(1), Value::Int(1)).unwrap();
        node.execute(host_int(1), host_int(2)).unwrap();
        assert_eq!(node.execute(Value::Int(3), Value::Int(4)).unwrap(), Value::Int(7));
    }

    #[test]
    fn test_foreign_big_integer_operands() {
        let mut node = AddNode::default();
        let left = Value::Foreign(Foreign::new(HostBigInteger(big("18446744073709551616"))));
        let sum = node.execute(left, Value::Int(-1)).unwrap();
        assert_eq!(sum, Value::BigInt(big("18446744073709551615")));
    }

    #[test]
    fn test_concat_order_preserving() {
        let mut node = AddNode::default();
        assert_eq!(node.execute(Value::text("a"), Value::Int(1)).unwrap(), Value::text("a1"));
        assert_eq!(node.execute(Value::Int(1), Value::text("a")).unwrap(), Value::text("1a"));
        assert_eq!(node.cache().entries(), &[AddSpecialization::Concat]);
        assert_eq!(node.state(), AddState::Uninitialized);
    }

    #[test]
    fn test_concat_coerces_every_kind() {
        let mut node = AddNode::default();
        let cases = [
            (Value::Null, "x:null"),
            (Value::Bool(false), "x:false"),
            (Value::big(-1), "x:-1"),
            (Value::callable("fac"), "x:fac"),
            (Value::Foreign(Foreign::new(HostNull)), "x:null"),
        ];
        for (value, expected) in cases {
            assert_eq!(node.execute(Value::text("x:"), value).unwrap(), Value::text(expected));
        }
    }

    #[test]
    fn test_text_wins_over_foreign_numeric() {
        let mut node = AddNode::default();
        assert_eq!(node.execute(Value::text("n="), host_int(5)).unwrap(), Value::text("n=5"));
        assert_eq!(node.cache().limited_install_count(), 0);
    }

    #[test]
    fn test_foreign_text_is_not_concatenated() {
        let mut node = AddNode::default();
        let left = Value::Foreign(Foreign::new(HostString("a".into())));
        let err = node.execute(left, Value::Int(1)).unwrap_err();
        assert!(err.is_type_error());
    }

    #[test]
    fn test_type_error_operands() {
        let mut node = AddNode::default();
        match node.execute(Value::Bool(true), Value::Int(1)).unwrap_err() {
            EvalError::Type(err) => {
                assert_eq!(err.operation, "+");
                assert_eq!(err.operands, vec![Value::Bool(true), Value::Int(1)]);
                assert_eq!(err.location, None);
            }
            other => panic!("expected type error, got {other:?}"),
        }
        // Type errors install nothing
        assert_eq!(node.cache().install_count(), 0);
    }

    #[test]
    fn test_type_error_carries_location() {
        let mut node = AddNode::default().with_location(SourceLocation::new("a.vk", 2, 9));
        let err = node.execute(Value::Null, Value::Null).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Type error at a.vk line 2 col 9: operation \"+\" not defined for NULL, NULL"
        );
    }

    #[test]
    fn test_admission_limit_collapses_to_generic() {
        #[derive(Debug)]
        struct Tagged(&'static str, i64);
        impl ForeignObject for Tagged {
            fn representation(&self) -> &str {
                self.0
            }
            fn fits_in_big_integer(&self) -> bool {
                true
            }
            fn as_big_integer(&self) -> Result<BigInt, Unsupported> {
                Ok(BigInt::from(self.1))
            }
            fn display_string(&self) -> String {
                self.1.to_string()
            }
        }

        let mut node = AddNode::new(&RuntimeConfig::new().add_limit(2));
        for (i, repr) in ["a", "b", "c", "d"].into_iter().enumerate() {
            let value = Value::Foreign(Foreign::new(Tagged(repr, i as i64)));
            assert_eq!(node.execute(value, Value::Int(10)).unwrap(), Value::big(10 + i as i64));
        }
        assert_eq!(node.state(), AddState::Generic);
        assert_eq!(node.cache().limited_install_count(), 2);
        assert!(node.cache().entries().is_empty());

        // The generic path still adds, concatenates and rejects
        assert_eq!(node.execute(Value::Int(1), Value::Int(1)).unwrap(), Value::big(2));
        assert_eq!(node.execute(Value::text("a"), Value::Int(1)).unwrap(), Value::text("a1"));
        assert!(node.execute(Value::Bool(true), Value::Int(1)).unwrap_err().is_type_error());
        assert!(node.cache().entries().is_empty());
    }

    #[test]
    fn test_broken_facade_is_unreachable() {
        #[derive(Debug)]
        struct Liar;
        impl ForeignObject for Liar {
            fn representation(&self) -> &str {
                "test.Liar"
            }
            fn fits_in_big_integer(&self) -> bool {
                true
            }
            fn display_string(&self) -> String {
                "liar".to_string()
            }
        }

        let mut node = AddNode::default();
        let err = node
            .execute(Value::Foreign(Foreign::new(Liar)), Value::Int(1))
            .unwrap_err();
        assert!(matches!(err, EvalError::Unreachable { operation: "+", .. }));
    }

    #[test]
    fn test_state_is_monotonic() {
        let mut node = AddNode::default();
        let mut last = node.state();
        let inputs = [
            (Value::Int(1), Value::Int(2)),
            (Value::text("a"), Value::Int(2)),
            (Value::Int(i64::MAX), Value::Int(2)),
            (Value::Int(1), Value::Int(2)),
            (host_int(1), Value::Int(2)),
            (Value::Int(1), Value::Int(2)),
        ];
        for (left, right) in inputs {
            node.execute(left, right).unwrap();
            let state = node.state();
            assert!(state >= last, "{state:?} < {last:?}");
            last = state;
        }
        assert_eq!(last, AddState::ForeignNumeric);
    }

    #[test]
    fn test_specialization_display() {
        let spec = AddSpecialization::ForeignNumeric {
            left: Repr::Native(Kind::Int),
            right: Repr::Foreign(Arc::from("host.Integer")),
        };
        assert_eq!(spec.to_string(), "ForeignNumeric(Int64, host.Integer)");
    }
}
