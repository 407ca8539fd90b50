//! Stock host objects
//!
//! Minimal implementations of the capability table for values a host
//! runtime typically hands over: integers, big integers, strings, its own
//! null and opaque objects.

use super::{ForeignObject, Unsupported};
use num_bigint::BigInt;
use num_traits::ToPrimitive;

/// Host-side 64-bit integer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostInteger(pub i64);

impl ForeignObject for HostInteger {
    fn representation(&self) -> &str {
        "host.Integer"
    }

    fn fits_in_integer(&self) -> bool {
        true
    }

    fn fits_in_big_integer(&self) -> bool {
        true
    }

    fn as_integer(&self) -> Result<i64, Unsupported> {
        Ok(self.0)
    }

    fn as_big_integer(&self) -> Result<BigInt, Unsupported> {
        Ok(BigInt::from(self.0))
    }

    fn meta_name(&self) -> Option<String> {
        Some("host.Integer".to_string())
    }

    fn display_string(&self) -> String {
        self.0.to_string()
    }
}

/// Host-side arbitrary-precision integer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostBigInteger(pub BigInt);

impl ForeignObject for HostBigInteger {
    fn representation(&self) -> &str {
        "host.BigInteger"
    }

    fn fits_in_integer(&self) -> bool {
        self.0.to_i64().is_some()
    }

    fn fits_in_big_integer(&self) -> bool {
        true
    }

    fn as_integer(&self) -> Result<i64, Unsupported> {
        self.0.to_i64().ok_or(Unsupported::new("as_integer"))
    }

    fn as_big_integer(&self) -> Result<BigInt, Unsupported> {
        Ok(self.0.clone())
    }

    fn meta_name(&self) -> Option<String> {
        Some("host.BigInteger".to_string())
    }

    fn display_string(&self) -> String {
        self.0.to_string()
    }
}

/// Host-side string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostString(pub String);

impl ForeignObject for HostString {
    fn representation(&self) -> &str {
        "host.String"
    }

    fn is_text(&self) -> bool {
        true
    }

    fn as_text(&self) -> Result<String, Unsupported> {
        Ok(self.0.clone())
    }

    fn meta_name(&self) -> Option<String> {
        Some("host.String".to_string())
    }

    fn display_string(&self) -> String {
        self.0.clone()
    }
}

/// The host runtime's own null
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostNull;

impl ForeignObject for HostNull {
    fn representation(&self) -> &str {
        "host.Null"
    }

    fn is_null(&self) -> bool {
        true
    }

    fn display_string(&self) -> String {
        "null".to_string()
    }
}

/// Object with no capabilities beyond a class name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostObject {
    class: String,
}

impl HostObject {
    pub fn new(class: impl Into<String>) -> Self {
        HostObject {
            class: class.into(),
        }
    }
}

impl ForeignObject for HostObject {
    fn representation(&self) -> &str {
        &self.class
    }

    fn meta_name(&self) -> Option<String> {
        Some(self.class.clone())
    }

    fn display_string(&self) -> String {
        format!("{}@object", self.class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_probes_are_consistent() {
        let n = HostInteger(-9);
        assert!(n.fits_in_integer());
        assert_eq!(n.as_integer(), Ok(-9));
        assert!(n.fits_in_big_integer());
        assert_eq!(n.as_big_integer(), Ok(BigInt::from(-9)));
        assert!(!n.is_text());
        assert!(!n.is_null());
    }

    #[test]
    fn test_big_integer_fits_in_integer_only_when_small() {
        let small = HostBigInteger(BigInt::from(12));
        assert!(small.fits_in_integer());
        assert_eq!(small.as_integer(), Ok(12));

        let huge = HostBigInteger(BigInt::from(i64::MAX) * BigInt::from(4));
        assert!(!huge.fits_in_integer());
        assert!(huge.as_integer().is_err());
        assert!(huge.fits_in_big_integer());
    }

    #[test]
    fn test_string_probes() {
        let s = HostString("abc".to_string());
        assert!(s.is_text());
        assert_eq!(s.as_text(), Ok("abc".to_string()));
        assert!(!s.fits_in_integer());
    }

    #[test]
    fn test_null_and_object() {
        assert!(HostNull.is_null());
        assert_eq!(HostNull.meta_name(), None);
        let object = HostObject::new("Point");
        assert_eq!(object.representation(), "Point");
        assert_eq!(object.display_string(), "Point@object");
        assert!(!object.fits_in_big_integer());
    }
}
