//! Binary comparison expressions.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use latticedb_core::{CoreError, TypeTag, Value};

use super::{ExprRef, Expression};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::row::Row;

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl ComparisonOp {
    /// Maps an ordering between two operands to the comparison outcome.
    #[must_use]
    pub const fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => matches!(ordering, Ordering::Equal),
            Self::NotEq => !matches!(ordering, Ordering::Equal),
            Self::Lt => matches!(ordering, Ordering::Less),
            Self::LtEq => !matches!(ordering, Ordering::Greater),
            Self::Gt => matches!(ordering, Ordering::Greater),
            Self::GtEq => !matches!(ordering, Ordering::Less),
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
        };
        f.write_str(symbol)
    }
}

/// Compares two sub-expressions.
///
/// Follows SQL three-valued logic for nulls: if either operand evaluates to
/// null the comparison evaluates to null, not false. Operands of
/// incomparable types (e.g. text against int) are an evaluation error.
#[derive(Debug, Clone)]
pub struct Comparison {
    op: ComparisonOp,
    left: ExprRef,
    right: ExprRef,
}

impl Comparison {
    /// Creates a comparison between two expressions.
    #[must_use]
    pub fn new(op: ComparisonOp, left: ExprRef, right: ExprRef) -> Self {
        Self { op, left, right }
    }

    /// Wraps the comparison for use in an expression tree.
    #[must_use]
    pub fn expr(op: ComparisonOp, left: ExprRef, right: ExprRef) -> ExprRef {
        Arc::new(Self::new(op, left, right))
    }

    /// Returns the operator.
    #[must_use]
    pub const fn op(&self) -> ComparisonOp {
        self.op
    }

    /// Returns the left operand.
    #[must_use]
    pub fn left(&self) -> &ExprRef {
        &self.left
    }

    /// Returns the right operand.
    #[must_use]
    pub fn right(&self) -> &ExprRef {
        &self.right
    }
}

impl Expression for Comparison {
    fn name(&self) -> &'static str {
        "Comparison"
    }

    fn resolved(&self) -> bool {
        self.left.resolved() && self.right.resolved()
    }

    fn type_tag(&self) -> TypeTag {
        TypeTag::Bool
    }

    fn is_nullable(&self) -> bool {
        self.left.is_nullable() || self.right.is_nullable()
    }

    fn children(&self) -> Vec<ExprRef> {
        vec![Arc::clone(&self.left), Arc::clone(&self.right)]
    }

    fn with_children(&self, mut children: Vec<ExprRef>) -> Result<ExprRef> {
        if children.len() != 2 {
            return Err(Error::unsupported("with_children", self.name()));
        }
        let right = children.pop().unwrap_or_else(|| Arc::clone(&self.right));
        let left = children.pop().unwrap_or_else(|| Arc::clone(&self.left));
        Ok(Arc::new(Self { op: self.op, left, right }))
    }

    fn eval(&self, ctx: &Context, row: &Row) -> Result<Value> {
        let left = self.left.eval(ctx, row)?;
        let right = self.right.eval(ctx, row)?;
        if left.is_null() || right.is_null() {
            return Ok(Value::Null);
        }
        match left.compare(&right) {
            Some(ordering) => Ok(Value::Bool(self.op.holds(ordering))),
            None => Err(CoreError::type_mismatch(left.type_tag().to_string(), right.type_tag().to_string()).into()),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.left, self.op, self.right)
    }
}
