//! Scalar values flowing through query execution.
//!
//! This module provides the [`Value`] enum, which represents all scalar
//! value types produced and consumed by the execution core.
//!
//! # Example
//!
//! ```
//! use latticedb_core::Value;
//!
//! let name: Value = "Alice".into();
//! let age: Value = 30i64.into();
//! let score: Value = 95.5f64.into();
//! let active: Value = true.into();
//!
//! assert_eq!(name.as_str(), Some("Alice"));
//! assert_eq!(age.as_int(), Some(30));
//! assert_eq!(score.as_float(), Some(95.5));
//! assert_eq!(active.as_bool(), Some(true));
//! ```

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::tag::TypeTag;

/// A scalar value.
///
/// Rows are ordered sequences of values; session variables are named values.
/// Values are immutable by convention: once a row is produced, its values
/// are never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Null/missing value
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int64(i64),
    /// 64-bit floating point number
    Float64(f64),
    /// UTF-8 string
    Text(String),
    /// Raw bytes
    Bytes(Vec<u8>),
}

impl Value {
    /// Returns `true` if the value is null.
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the type tag for this value.
    #[must_use]
    pub const fn type_tag(&self) -> TypeTag {
        match self {
            Self::Null => TypeTag::Null,
            Self::Bool(_) => TypeTag::Bool,
            Self::Int64(_) => TypeTag::Int64,
            Self::Float64(_) => TypeTag::Float64,
            Self::Text(_) => TypeTag::Text,
            Self::Bytes(_) => TypeTag::Bytes,
        }
    }

    /// Returns the value as a boolean if it is one.
    #[inline]
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as an integer if it is one.
    #[inline]
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int64(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float if it is one.
    #[inline]
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float64(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the value as a string slice if it is text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a byte slice if it is bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Compares two values, coercing between integer and float.
    ///
    /// Returns `None` when either side is null or the types are not
    /// comparable. SQL comparison semantics (null never compares equal to
    /// anything, including null) are built on top of this by the expression
    /// library.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Null, _) | (_, Self::Null) => None,
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Int64(a), Self::Int64(b)) => Some(a.cmp(b)),
            (Self::Float64(a), Self::Float64(b)) => a.partial_cmp(b),
            (Self::Int64(a), Self::Float64(b)) => (*a as f64).partial_cmp(b),
            (Self::Float64(a), Self::Int64(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Bytes(a), Self::Bytes(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int64(i) => write!(f, "{i}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Bytes(b) => write!(f, "{} bytes", b.len()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int64(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int64(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float64(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}
