//! Scalar expression trees.
//!
//! An [`Expression`] is a polymorphic scalar computation evaluated against
//! a [`Row`] to produce a [`Value`]. Expressions compose into trees
//! (literals, column references, comparisons, aliases) and support the same
//! bottom-up rewrite contract as plan nodes; see
//! [`transform_expr_up`](crate::transform::transform_expr_up).

mod alias;
mod column;
mod comparison;
mod literal;

pub use alias::Alias;
pub use column::{GetField, UnresolvedColumn};
pub use comparison::{Comparison, ComparisonOp};
pub use literal::Literal;

use std::fmt;
use std::sync::Arc;

use latticedb_core::{TypeTag, Value};

use crate::context::Context;
use crate::error::Result;
use crate::row::Row;

/// A shared expression reference.
///
/// Expressions are immutable after construction; rewrites build new trees
/// and share unchanged subtrees.
pub type ExprRef = Arc<dyn Expression>;

/// A scalar computation over a row.
pub trait Expression: fmt::Debug + fmt::Display + Send + Sync {
    /// Returns the expression kind name.
    fn name(&self) -> &'static str;

    /// Returns `true` iff every reference in this expression and its
    /// sub-expressions is bound to a concrete source.
    fn resolved(&self) -> bool;

    /// Returns the type this expression evaluates to.
    fn type_tag(&self) -> TypeTag;

    /// Returns whether evaluation may produce null.
    fn is_nullable(&self) -> bool;

    /// Returns the direct sub-expressions.
    fn children(&self) -> Vec<ExprRef>;

    /// Rebuilds this expression with new sub-expressions.
    ///
    /// This is the rewrite surface used by
    /// [`transform_expr_up`](crate::transform::transform_expr_up); the
    /// expression itself is never mutated.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Unsupported`](crate::error::Error::Unsupported)
    /// fault when called with the wrong number of children.
    fn with_children(&self, children: Vec<ExprRef>) -> Result<ExprRef>;

    /// Evaluates the expression against a row.
    ///
    /// # Errors
    ///
    /// Returns an error when the expression is unresolved or evaluation
    /// fails (e.g. incomparable operand types).
    fn eval(&self, ctx: &Context, row: &Row) -> Result<Value>;

    /// Returns the column name this expression contributes to a schema.
    fn column_name(&self) -> String {
        self.to_string()
    }
}
