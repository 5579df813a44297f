//! Column aliases.

use std::fmt;
use std::sync::Arc;

use latticedb_core::{TypeTag, Value};

use super::{ExprRef, Expression};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::row::Row;

/// Renames the column produced by a sub-expression.
///
/// Evaluation is a pass-through; only [`column_name`](Expression::column_name)
/// changes.
#[derive(Debug, Clone)]
pub struct Alias {
    child: ExprRef,
    name: String,
}

impl Alias {
    /// Creates an alias over an expression.
    #[must_use]
    pub fn new(child: ExprRef, name: impl Into<String>) -> Self {
        Self { child, name: name.into() }
    }

    /// Wraps the alias for use in an expression tree.
    #[must_use]
    pub fn expr(child: ExprRef, name: impl Into<String>) -> ExprRef {
        Arc::new(Self::new(child, name))
    }

    /// Returns the aliased expression.
    #[must_use]
    pub fn child(&self) -> &ExprRef {
        &self.child
    }
}

impl Expression for Alias {
    fn name(&self) -> &'static str {
        "Alias"
    }

    fn resolved(&self) -> bool {
        self.child.resolved()
    }

    fn type_tag(&self) -> TypeTag {
        self.child.type_tag()
    }

    fn is_nullable(&self) -> bool {
        self.child.is_nullable()
    }

    fn children(&self) -> Vec<ExprRef> {
        vec![Arc::clone(&self.child)]
    }

    fn with_children(&self, mut children: Vec<ExprRef>) -> Result<ExprRef> {
        if children.len() != 1 {
            return Err(Error::unsupported("with_children", self.name()));
        }
        let child = children.pop().unwrap_or_else(|| Arc::clone(&self.child));
        Ok(Arc::new(Self { child, name: self.name.clone() }))
    }

    fn eval(&self, ctx: &Context, row: &Row) -> Result<Value> {
        self.child.eval(ctx, row)
    }

    fn column_name(&self) -> String {
        self.name.clone()
    }
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} AS {}", self.child, self.name)
    }
}
