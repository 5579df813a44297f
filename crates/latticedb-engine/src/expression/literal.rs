//! Literal values as expressions.

use std::fmt;
use std::sync::Arc;

use latticedb_core::{TypeTag, Value};

use super::{ExprRef, Expression};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::row::Row;

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    value: Value,
}

impl Literal {
    /// Creates a literal expression.
    #[must_use]
    pub fn new(value: impl Into<Value>) -> Self {
        Self { value: value.into() }
    }

    /// Wraps the literal for use in an expression tree.
    #[must_use]
    pub fn expr(value: impl Into<Value>) -> ExprRef {
        Arc::new(Self::new(value))
    }

    /// Returns the literal value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }
}

impl Expression for Literal {
    fn name(&self) -> &'static str {
        "Literal"
    }

    fn resolved(&self) -> bool {
        true
    }

    fn type_tag(&self) -> TypeTag {
        self.value.type_tag()
    }

    fn is_nullable(&self) -> bool {
        self.value.is_null()
    }

    fn children(&self) -> Vec<ExprRef> {
        Vec::new()
    }

    fn with_children(&self, children: Vec<ExprRef>) -> Result<ExprRef> {
        if !children.is_empty() {
            return Err(Error::unsupported("with_children", self.name()));
        }
        Ok(Arc::new(self.clone()))
    }

    fn eval(&self, _ctx: &Context, _row: &Row) -> Result<Value> {
        Ok(self.value.clone())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::Text(s) => write!(f, "{s:?}"),
            other => write!(f, "{other}"),
        }
    }
}
