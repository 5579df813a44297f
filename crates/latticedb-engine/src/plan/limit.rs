//! Row count limiting.

use std::sync::Arc;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::expression::ExprRef;
use crate::iter::{BoxedRowIter, RowIter};
use crate::node::{Node, NodeRef};
use crate::plan::ensure_resolved;
use crate::row::{Row, SchemaRef};

/// Passes through at most `limit` rows after skipping `offset`.
///
/// Once the limit is reached the iterator reports exhaustion without
/// pulling further from its child; the child is only released on `close`.
#[derive(Debug, Clone)]
pub struct Limit {
    limit: u64,
    offset: u64,
    child: NodeRef,
}

impl Limit {
    /// Creates a limit over a child node.
    #[must_use]
    pub fn new(limit: u64, offset: u64, child: NodeRef) -> Self {
        Self { limit, offset, child }
    }

    /// Wraps the limit for use in a plan tree.
    #[must_use]
    pub fn node(limit: u64, offset: u64, child: NodeRef) -> NodeRef {
        Arc::new(Self::new(limit, offset, child))
    }

    /// Returns the maximum number of rows produced.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Returns the number of leading rows skipped.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }
}

impl Node for Limit {
    fn name(&self) -> &'static str {
        "Limit"
    }

    fn resolved(&self) -> bool {
        self.child.resolved()
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
        Ok(Arc::new(Self { limit: self.limit, offset: self.offset, child }))
    }

    fn with_expressions(&self, expressions: Vec<ExprRef>) -> Result<NodeRef> {
        if !expressions.is_empty() {
            return Err(Error::unsupported("with_expressions", self.name()));
        }
        Ok(Arc::new(self.clone()))
    }

    fn row_iter(&self, ctx: &Context) -> Result<BoxedRowIter> {
        ensure_resolved(self)?;
        Ok(Box::new(LimitIter {
            ctx: ctx.clone(),
            child: self.child.row_iter(ctx)?,
            remaining_skip: self.offset,
            remaining: self.limit,
            exhausted: false,
        }))
    }

    fn describe(&self) -> String {
        if self.offset == 0 {
            format!("Limit [{}]", self.limit)
        } else {
            format!("Limit [{} offset {}]", self.limit, self.offset)
        }
    }
}

struct LimitIter {
    ctx: Context,
    child: BoxedRowIter,
    remaining_skip: u64,
    remaining: u64,
    exhausted: bool,
}

impl RowIter for LimitIter {
    fn next(&mut self) -> Result<Row> {
        loop {
            if self.exhausted || self.remaining == 0 || self.ctx.is_cancelled() {
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
            if self.remaining_skip > 0 {
                self.remaining_skip -= 1;
                continue;
            }
            self.remaining -= 1;
            return Ok(row);
        }
    }

    fn close(&mut self) -> Result<()> {
        self.exhausted = true;
        self.child.close()
    }
}
