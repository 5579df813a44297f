//! Row filtering.

use std::sync::Arc;

use latticedb_core::Value;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::expression::{ExprRef, Expression as _};
use crate::iter::{BoxedRowIter, RowIter};
use crate::node::{Node, NodeRef};
use crate::plan::ensure_resolved;
use crate::row::{Row, SchemaRef};

/// Keeps only the rows whose predicate evaluates to `true`.
///
/// Rows where the predicate is `false` or null are skipped; a predicate
/// that produces any non-boolean, non-null value is an execution error.
#[derive(Debug, Clone)]
pub struct Filter {
    predicate: ExprRef,
    child: NodeRef,
}

impl Filter {
    /// Creates a filter over a child node.
    #[must_use]
    pub fn new(predicate: ExprRef, child: NodeRef) -> Self {
        Self { predicate, child }
    }

    /// Wraps the filter for use in a plan tree.
    #[must_use]
    pub fn node(predicate: ExprRef, child: NodeRef) -> NodeRef {
        Arc::new(Self::new(predicate, child))
    }

    /// Returns the filter predicate.
    #[must_use]
    pub fn predicate(&self) -> &ExprRef {
        &self.predicate
    }
}

impl Node for Filter {
    fn name(&self) -> &'static str {
        "Filter"
    }

    fn resolved(&self) -> bool {
        self.predicate.resolved() && self.child.resolved()
    }

    fn schema(&self) -> SchemaRef {
        self.child.schema()
    }

    fn children(&self) -> Vec<NodeRef> {
        vec![Arc::clone(&self.child)]
    }

    fn with_children(&self, mut children: Vec<NodeRef>) -> Result<NodeRef> {
        if children.len() != 1 {
            return Err(Error::unsupported("with_children", self.name()));
        }
        let child = children.pop().unwrap_or_else(|| Arc::clone(&self.child));
        Ok(Arc::new(Self { predicate: Arc::clone(&self.predicate), child }))
    }

    fn expressions(&self) -> Vec<ExprRef> {
        vec![Arc::clone(&self.predicate)]
    }

    fn with_expressions(&self, mut expressions: Vec<ExprRef>) -> Result<NodeRef> {
        if expressions.len() != 1 {
            return Err(Error::unsupported("with_expressions", self.name()));
        }
        let predicate = expressions.pop().unwrap_or_else(|| Arc::clone(&self.predicate));
        Ok(Arc::new(Self { predicate, child: Arc::clone(&self.child) }))
    }

    fn row_iter(&self, ctx: &Context) -> Result<BoxedRowIter> {
        ensure_resolved(self)?;
        Ok(Box::new(FilterIter {
            ctx: ctx.clone(),
            predicate: Arc::clone(&self.predicate),
            child: self.child.row_iter(ctx)?,
            exhausted: false,
        }))
    }

    fn describe(&self) -> String {
        format!("Filter [{}]", self.predicate)
    }
}

struct FilterIter {
    ctx: Context,
    predicate: ExprRef,
    child: BoxedRowIter,
    exhausted: bool,
}

impl RowIter for FilterIter {
    fn next(&mut self) -> Result<Row> {
        loop {
            if self.exhausted || self.ctx.is_cancelled() {
                self.exhausted = true;
                return Err(Error::EndOfRows);
            }
            let row = match self.child.next() {
                Ok(row) => row,
                Err(err) if err.is_end_of_rows() => {
                    self.exhausted = true;
                    return Err(err);
                }
                Err(err) => return Err(err),
            };
            match self.predicate.eval(&self.ctx, &row)? {
                Value::Bool(true) => return Ok(row),
                Value::Bool(false) | Value::Null => {}
                other => {
                    return Err(Error::execution(format!(
                        "filter predicate produced non-boolean value {other}"
                    )))
                }
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        self.exhausted = true;
        self.child.close()
    }
}

#[cfg(test)]
mod tests {
    use latticedb_core::TypeTag;

    use super::*;
    use crate::expression::{Comparison, ComparisonOp, GetField, Literal};
    use crate::iter::drain;
    use crate::plan::Values;
    use crate::row::{Column, Schema};
    use crate::session::Session;

    fn test_context() -> Context {
        Context::new(Session::new("127.0.0.1:0", "test", 0).into_ref())
    }

    fn numbers(values: &[Option<i64>]) -> NodeRef {
        let schema = Schema::new(vec![Column::new("n", TypeTag::Int64)]);
        let rows = values
            .iter()
            .map(|v| Row::new(vec![v.map_or(Value::Null, Value::Int64)]))
            .collect();
        Values::node(schema, rows)
    }

    #[test]
    fn keeps_only_matching_rows() {
        let predicate = Comparison::expr(
            ComparisonOp::Gt,
            GetField::expr(0, "n", TypeTag::Int64, true),
            Literal::expr(2i64),
        );
        let plan = Filter::node(predicate, numbers(&[Some(1), Some(3), Some(5)]));
        let rows = drain(plan.row_iter(&test_context()).expect("iter")).expect("drain");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn null_predicate_skips_the_row() {
        let predicate = Comparison::expr(
            ComparisonOp::Gt,
            GetField::expr(0, "n", TypeTag::Int64, true),
            Literal::expr(0i64),
        );
        let plan = Filter::node(predicate, numbers(&[Some(1), None, Some(2)]));
        let rows = drain(plan.row_iter(&test_context()).expect("iter")).expect("drain");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn non_boolean_predicate_is_an_error() {
        let plan = Filter::node(Literal::expr(42i64), numbers(&[Some(1)]));
        let mut iter = plan.row_iter(&test_context()).expect("iter");
        let err = iter.next().expect_err("non-boolean");
        assert!(matches!(err, Error::Execution(_)));
    }

    #[test]
    fn unresolved_predicate_refuses_to_bind() {
        let predicate = crate::expression::UnresolvedColumn::expr("n");
        let plan = Filter::node(predicate, numbers(&[Some(1)]));
        assert!(matches!(
            plan.row_iter(&test_context()),
            Err(Error::Unresolved(_))
        ));
    }
}
