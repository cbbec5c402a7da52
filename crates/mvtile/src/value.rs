//! Property value types.

use alloc::collections::BTreeMap;
use alloc::string::String;
use core::fmt;

/// Resolved feature properties, keyed by property name.
pub type Map = BTreeMap<String, Value>;

/// One entry of a layer's value dictionary.
///
/// The wire format stores one of seven scalar encodings per value; both
/// float widths decode to [`Double`] and the signed integer encodings both
/// decode to [`Int`].
///
/// [`Double`]: Value::Double
/// [`Int`]: Value::Int
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(String),
    Double(f64),
    Int(i64),
    Uint(u64),
    Bool(bool),
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::Uint(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl Value {
    /// Returns the string content if the value is [`String`].
    ///
    /// [`String`]: Value::String
    ///
    /// # Examples
    ///
    /// ```
    /// use mvtile::Value;
    ///
    /// assert_eq!(Value::from("water").as_str(), Some("water"));
    /// assert_eq!(Value::Bool(true).as_str(), None);
    /// ```
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns a float rendition of any numeric variant.
    ///
    /// # Examples
    ///
    /// ```
    /// use mvtile::Value;
    ///
    /// assert_eq!(Value::Int(-3).as_f64(), Some(-3.0));
    /// assert_eq!(Value::from("water").as_f64(), None);
    /// ```
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        #[allow(clippy::cast_precision_loss)]
        match self {
            Self::Double(n) => Some(*n),
            Self::Int(n) => Some(*n as f64),
            Self::Uint(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Returns the boolean content if the value is [`Bool`].
    ///
    /// [`Bool`]: Value::Bool
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s:?}"),
            Self::Double(n) => write!(f, "{n}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Uint(n) => write!(f, "{n}"),
            Self::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
        }
    }
}
