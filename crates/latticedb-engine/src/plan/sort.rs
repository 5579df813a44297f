//! Row ordering.

use std::cmp::Ordering;
use std::sync::Arc;

use latticedb_core::Value;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::expression::{ExprRef, Expression as _};
use crate::iter::{BoxedRowIter, RowIter, RowsIter};
use crate::node::{Node, NodeRef};
use crate::plan::ensure_resolved;
use crate::row::{Row, SchemaRef};

/// One sort criterion.
#[derive(Debug, Clone)]
pub struct SortField {
    expr: ExprRef,
    ascending: bool,
}

impl SortField {
    /// Creates an ascending sort criterion.
    #[must_use]
    pub fn asc(expr: ExprRef) -> Self {
        Self { expr, ascending: true }
    }

    /// Creates a descending sort criterion.
    #[must_use]
    pub fn desc(expr: ExprRef) -> Self {
        Self { expr, ascending: false }
    }

    /// Returns the sort key expression.
    #[must_use]
    pub fn expr(&self) -> &ExprRef {
        &self.expr
    }

    /// Returns whether the criterion is ascending.
    #[must_use]
    pub const fn is_ascending(&self) -> bool {
        self.ascending
    }

    fn compare(&self, left: &Value, right: &Value) -> Ordering {
        // Nulls order before every non-null value; incomparable pairs are
        // treated as equal so the sort stays total.
        let ordering = match (left.is_null(), right.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => left.compare(right).unwrap_or(Ordering::Equal),
        };
        if self.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    }
}

/// Sorts the child's rows by a list of criteria.
///
/// Blocking: the first pull materializes the full child output, computes
/// sort keys once per row, and sorts stably. Later criteria break ties left
/// by earlier ones.
#[derive(Debug, Clone)]
pub struct Sort {
    fields: Vec<SortField>,
    child: NodeRef,
}

impl Sort {
    /// Creates a sort over a child node.
    #[must_use]
    pub fn new(fields: Vec<SortField>, child: NodeRef) -> Self {
        Self { fields, child }
    }

    /// Wraps the sort for use in a plan tree.
    #[must_use]
    pub fn node(fields: Vec<SortField>, child: NodeRef) -> NodeRef {
        Arc::new(Self::new(fields, child))
    }
}

impl Node for Sort {
    fn name(&self) -> &'static str {
        "Sort"
    }

    fn resolved(&self) -> bool {
        self.fields.iter().all(|f| f.expr.resolved()) && self.child.resolved()
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
        Ok(Arc::new(Self { fields: self.fields.clone(), child }))
    }

    fn expressions(&self) -> Vec<ExprRef> {
        self.fields.iter().map(|f| Arc::clone(&f.expr)).collect()
    }

    fn with_expressions(&self, expressions: Vec<ExprRef>) -> Result<NodeRef> {
        if expressions.len() != self.fields.len() {
            return Err(Error::unsupported("with_expressions", self.name()));
        }
        let fields = self
            .fields
            .iter()
            .zip(expressions)
            .map(|(field, expr)| SortField { expr, ascending: field.ascending })
            .collect();
        Ok(Arc::new(Self { fields, child: Arc::clone(&self.child) }))
    }

    fn row_iter(&self, ctx: &Context) -> Result<BoxedRowIter> {
        ensure_resolved(self)?;
        Ok(Box::new(SortIter {
            ctx: ctx.clone(),
            fields: self.fields.clone(),
            child: Some(self.child.row_iter(ctx)?),
            sorted: None,
        }))
    }

    fn describe(&self) -> String {
        let keys: Vec<String> = self
            .fields
            .iter()
            .map(|f| {
                let direction = if f.ascending { "asc" } else { "desc" };
                format!("{} {direction}", f.expr)
            })
            .collect();
        format!("Sort [{}]", keys.join(", "))
    }
}

struct SortIter {
    ctx: Context,
    fields: Vec<SortField>,
    child: Option<BoxedRowIter>,
    sorted: Option<RowsIter>,
}

impl SortIter {
    fn materialize(&mut self) -> Result<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        let mut keyed: Vec<(Vec<Value>, Row)> = Vec::new();
        loop {
            match child.next() {
                Ok(row) => {
                    let mut keys = Vec::with_capacity(self.fields.len());
                    for field in &self.fields {
                        keys.push(field.expr.eval(&self.ctx, &row)?);
                    }
                    keyed.push((keys, row));
                }
                Err(err) if err.is_end_of_rows() => break,
                Err(err) => {
                    let _ = child.close();
                    return Err(err);
                }
            }
        }
        child.close()?;

        keyed.sort_by(|(a, _), (b, _)| {
            for (field, (left, right)) in self.fields.iter().zip(a.iter().zip(b.iter())) {
                match field.compare(left, right) {
                    Ordering::Equal => {}
                    other => return other,
                }
            }
            Ordering::Equal
        });

        let rows = keyed.into_iter().map(|(_, row)| row).collect();
        self.sorted = Some(RowsIter::new(self.ctx.clone(), rows));
        Ok(())
    }
}

impl RowIter for SortIter {
    fn next(&mut self) -> Result<Row> {
        if self.ctx.is_cancelled() {
            return Err(Error::EndOfRows);
        }
        if self.sorted.is_none() {
            self.materialize()?;
        }
        match self.sorted.as_mut() {
            Some(sorted) => sorted.next(),
            None => Err(Error::EndOfRows),
        }
    }

    fn close(&mut self) -> Result<()> {
        // Both sides close unconditionally; a child failure must not leave
        // the materialized rows open.
        let child_result = match self.child.take() {
            Some(mut child) => child.close(),
            None => Ok(()),
        };
        if let Some(sorted) = self.sorted.as_mut() {
            sorted.close()?;
        }
        child_result
    }
}
