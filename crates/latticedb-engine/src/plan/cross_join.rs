//! Cartesian product of two inputs.

use std::sync::Arc;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::expression::ExprRef;
use crate::iter::{BoxedRowIter, RowIter};
use crate::node::{Node, NodeRef};
use crate::plan::ensure_resolved;
use crate::row::{Row, SchemaRef};

/// Produces every pairing of a left row with a right row.
///
/// Nested-loop execution: the left side is streamed, and the right side is
/// re-executed from its plan node once per left row. The output schema is
/// the left schema followed by the right schema.
#[derive(Debug, Clone)]
pub struct CrossJoin {
    left: NodeRef,
    right: NodeRef,
}

impl CrossJoin {
    /// Creates a cross join of two nodes.
    #[must_use]
    pub fn new(left: NodeRef, right: NodeRef) -> Self {
        Self { left, right }
    }

    /// Wraps the join for use in a plan tree.
    #[must_use]
    pub fn node(left: NodeRef, right: NodeRef) -> NodeRef {
        Arc::new(Self::new(left, right))
    }
}

impl Node for CrossJoin {
    fn name(&self) -> &'static str {
        "CrossJoin"
    }

    fn resolved(&self) -> bool {
        self.left.resolved() && self.right.resolved()
    }

    fn schema(&self) -> SchemaRef {
        Arc::new(self.left.schema().concat(&self.right.schema()))
    }

    fn children(&self) -> Vec<NodeRef> {
        vec![Arc::clone(&self.left), Arc::clone(&self.right)]
    }

    fn with_children(&self, mut children: Vec<NodeRef>) -> Result<NodeRef> {
        if children.len() != 2 {
            return Err(Error::unsupported("with_children", self.name()));
        }
        let right = children.pop().unwrap_or_else(|| Arc::clone(&self.right));
        let left = children.pop().unwrap_or_else(|| Arc::clone(&self.left));
        Ok(Arc::new(Self { left, right }))
    }

    fn with_expressions(&self, expressions: Vec<ExprRef>) -> Result<NodeRef> {
        if !expressions.is_empty() {
            return Err(Error::unsupported("with_expressions", self.name()));
        }
        Ok(Arc::new(self.clone()))
    }

    fn row_iter(&self, ctx: &Context) -> Result<BoxedRowIter> {
        ensure_resolved(self)?;
        Ok(Box::new(CrossJoinIter {
            ctx: ctx.clone(),
            left: self.left.row_iter(ctx)?,
            right_node: Arc::clone(&self.right),
            current_left: None,
            right: None,
            exhausted: false,
            failed: false,
        }))
    }
}

struct CrossJoinIter {
    ctx: Context,
    left: BoxedRowIter,
    right_node: NodeRef,
    current_left: Option<Row>,
    right: Option<BoxedRowIter>,
    exhausted: bool,
    failed: bool,
}

impl CrossJoinIter {
    fn fail(&mut self, err: Error) -> Error {
        self.failed = true;
        err
    }
}

impl RowIter for CrossJoinIter {
    fn next(&mut self) -> Result<Row> {
        loop {
            // A genuine failure latches: later pulls must not read as clean
            // exhaustion.
            if self.failed {
                return Err(Error::execution("cross join aborted by an earlier failure"));
            }
            if self.exhausted || self.ctx.is_cancelled() {
                self.exhausted = true;
                return Err(Error::EndOfRows);
            }

            if self.current_left.is_none() {
                match self.left.next() {
                    Ok(row) => {
                        self.current_left = Some(row);
                        match self.right_node.row_iter(&self.ctx) {
                            Ok(right) => self.right = Some(right),
                            Err(err) => return Err(self.fail(err)),
                        }
                    }
                    Err(err) if err.is_end_of_rows() => {
                        self.exhausted = true;
                        return Err(err);
                    }
                    Err(err) => return Err(self.fail(err)),
                }
            }

            let Some(right) = self.right.as_mut() else {
                self.exhausted = true;
                return Err(Error::EndOfRows);
            };
            match right.next() {
                Ok(right_row) => {
                    let left_row = self.current_left.clone().unwrap_or_default();
                    return Ok(left_row.concat(&right_row));
                }
                Err(err) if err.is_end_of_rows() => {
                    // Right side drained for this left row; advance the left.
                    if let Some(mut right) = self.right.take() {
                        if let Err(err) = right.close() {
                            return Err(self.fail(err));
                        }
                    }
                    self.current_left = None;
                }
                Err(err) => return Err(self.fail(err)),
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        self.exhausted = true;
        let left_result = self.left.close();
        if let Some(mut right) = self.right.take() {
            right.close()?;
        }
        left_result
    }
}
