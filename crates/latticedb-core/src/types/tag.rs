//! Type tags for runtime value classification.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::value::Value;

/// The declared type of a value or column.
///
/// Every [`Value`] carries exactly one tag, and every schema column declares
/// the tag its values must carry. `Null` is both a tag and a value: an unset
/// session variable or a missing column reads back as `(TypeTag::Null,
/// Value::Null)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    /// The null/absent type.
    Null,
    /// Boolean.
    Bool,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// UTF-8 string.
    Text,
    /// Raw bytes.
    Bytes,
}

impl TypeTag {
    /// Returns `true` if this is the null tag.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if a value may appear under a column declared with
    /// this tag.
    ///
    /// `Value::Null` is accepted by every tag; whether the column actually
    /// permits nulls is the schema's nullability concern, not the tag's.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        value.is_null() || value.type_tag() == self
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int64 => "int64",
            Self::Float64 => "float64",
            Self::Text => "text",
            Self::Bytes => "bytes",
        };
        write!(f, "{name}")
    }
}
