//! Column projection.

use std::sync::Arc;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::expression::{ExprRef, Expression as _};
use crate::iter::{BoxedRowIter, RowIter};
use crate::node::{Node, NodeRef};
use crate::plan::ensure_resolved;
use crate::row::{Column, Row, Schema, SchemaRef};

/// Evaluates a list of expressions per input row, producing one output
/// column per expression.
///
/// The output schema is derived from the expressions: each contributes its
/// [`column_name`](crate::expression::Expression::column_name), type and
/// nullability. Deriving the schema of an unresolved projection yields an
/// empty schema; callers gate on [`resolved`](Node::resolved) first.
#[derive(Debug, Clone)]
pub struct Project {
    exprs: Vec<ExprRef>,
    child: NodeRef,
}

impl Project {
    /// Creates a projection over a child node.
    #[must_use]
    pub fn new(exprs: Vec<ExprRef>, child: NodeRef) -> Self {
        Self { exprs, child }
    }

    /// Wraps the projection for use in a plan tree.
    #[must_use]
    pub fn node(exprs: Vec<ExprRef>, child: NodeRef) -> NodeRef {
        Arc::new(Self::new(exprs, child))
    }
}

impl Node for Project {
    fn name(&self) -> &'static str {
        "Project"
    }

    fn resolved(&self) -> bool {
        self.exprs.iter().all(|e| e.resolved()) && self.child.resolved()
    }

    fn schema(&self) -> SchemaRef {
        if !self.resolved() {
            return Arc::new(Schema::empty());
        }
        let columns = self
            .exprs
            .iter()
            .map(|e| {
                let column = Column::new(e.column_name(), e.type_tag());
                if e.is_nullable() {
                    column
                } else {
                    column.not_null()
                }
            })
            .collect();
        Arc::new(Schema::new(columns))
    }

    fn children(&self) -> Vec<NodeRef> {
        vec![Arc::clone(&self.child)]
    }

    fn with_children(&self, mut children: Vec<NodeRef>) -> Result<NodeRef> {
        if children.len() != 1 {
            return Err(Error::unsupported("with_children", self.name()));
        }
        let child = children.pop().unwrap_or_else(|| Arc::clone(&self.child));
        Ok(Arc::new(Self { exprs: self.exprs.clone(), child }))
    }

    fn expressions(&self) -> Vec<ExprRef> {
        self.exprs.clone()
    }

    fn with_expressions(&self, expressions: Vec<ExprRef>) -> Result<NodeRef> {
        if expressions.len() != self.exprs.len() {
            return Err(Error::unsupported("with_expressions", self.name()));
        }
        Ok(Arc::new(Self { exprs: expressions, child: Arc::clone(&self.child) }))
    }

    fn row_iter(&self, ctx: &Context) -> Result<BoxedRowIter> {
        ensure_resolved(self)?;
        Ok(Box::new(ProjectIter {
            ctx: ctx.clone(),
            exprs: self.exprs.clone(),
            child: self.child.row_iter(ctx)?,
            exhausted: false,
        }))
    }

    fn describe(&self) -> String {
        let names: Vec<String> = self.exprs.iter().map(|e| e.column_name()).collect();
        format!("Project [{}]", names.join(", "))
    }
}

struct ProjectIter {
    ctx: Context,
    exprs: Vec<ExprRef>,
    child: BoxedRowIter,
    exhausted: bool,
}

impl RowIter for ProjectIter {
    fn next(&mut self) -> Result<Row> {
        if self.exhausted || self.ctx.is_cancelled() {
            self.exhausted = true;
            return Err(Error::EndOfRows);
        }
        let row = match self.child.next() {
            Ok(row) => row,
            Err(err) => {
                if err.is_end_of_rows() {
                    self.exhausted = true;
                }
                return Err(err);
            }
        };
        let mut values = Vec::with_capacity(self.exprs.len());
        for expr in &self.exprs {
            values.push(expr.eval(&self.ctx, &row)?);
        }
        Ok(Row::new(values))
    }

    fn close(&mut self) -> Result<()> {
        self.exhausted = true;
        self.child.close()
    }
}
