//! In-memory row source.

use std::sync::Arc;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::expression::ExprRef;
use crate::iter::{BoxedRowIter, RowIter};
use crate::node::{Node, NodeRef};
use crate::plan::ensure_resolved;
use crate::row::{Row, Schema, SchemaRef};

/// A leaf node producing a fixed set of in-memory rows.
///
/// Rows are validated against the schema lazily, one per pull, so a bad row
/// surfaces as an execution error at the point it would be produced.
#[derive(Debug, Clone)]
pub struct Values {
    schema: SchemaRef,
    rows: Vec<Row>,
}

impl Values {
    /// Creates a row source over the given rows.
    #[must_use]
    pub fn new(schema: Schema, rows: Vec<Row>) -> Self {
        Self { schema: Arc::new(schema), rows }
    }

    /// Wraps the source for use in a plan tree.
    #[must_use]
    pub fn node(schema: Schema, rows: Vec<Row>) -> NodeRef {
        Arc::new(Self::new(schema, rows))
    }

    /// Returns the number of rows this source holds.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

impl Node for Values {
    fn name(&self) -> &'static str {
        "Values"
    }

    fn resolved(&self) -> bool {
        true
    }

    fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    fn children(&self) -> Vec<NodeRef> {
        Vec::new()
    }

    fn with_children(&self, children: Vec<NodeRef>) -> Result<NodeRef> {
        if !children.is_empty() {
            return Err(Error::unsupported("with_children", self.name()));
        }
        Ok(Arc::new(self.clone()))
    }

    fn with_expressions(&self, expressions: Vec<ExprRef>) -> Result<NodeRef> {
        if !expressions.is_empty() {
            return Err(Error::unsupported("with_expressions", self.name()));
        }
        Ok(Arc::new(self.clone()))
    }

    fn row_iter(&self, ctx: &Context) -> Result<BoxedRowIter> {
        ensure_resolved(self)?;
        Ok(Box::new(ValuesIter {
            ctx: ctx.clone(),
            schema: Arc::clone(&self.schema),
            rows: self.rows.clone().into_iter(),
            exhausted: false,
        }))
    }

    fn describe(&self) -> String {
        format!("Values [{} rows]", self.rows.len())
    }
}

struct ValuesIter {
    ctx: Context,
    schema: SchemaRef,
    rows: std::vec::IntoIter<Row>,
    exhausted: bool,
}

impl RowIter for ValuesIter {
    fn next(&mut self) -> Result<Row> {
        if self.exhausted || self.ctx.is_cancelled() {
            self.exhausted = true;
            return Err(Error::EndOfRows);
        }
        match self.rows.next() {
            Some(row) => {
                self.schema.validate_row(&row)?;
                Ok(row)
            }
            None => {
                self.exhausted = true;
                Err(Error::EndOfRows)
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        self.exhausted = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use latticedb_core::{TypeTag, Value};

    use super::*;
    use crate::iter::drain;
    use crate::row::Column;
    use crate::session::Session;

    fn test_context() -> Context {
        Context::new(Session::new("127.0.0.1:0", "test", 0).into_ref())
    }

    fn int_schema() -> Schema {
        Schema::new(vec![Column::new("n", TypeTag::Int64).not_null()])
    }

    #[test]
    fn yields_all_rows() {
        let rows: Vec<Row> = (1..=3).map(|i| Row::new(vec![Value::Int64(i)])).collect();
        let node = Values::node(int_schema(), rows);
        let iter = node.row_iter(&test_context()).expect("iter");
        assert_eq!(drain(iter).expect("drain").len(), 3);
    }

    #[test]
    fn rejects_row_that_violates_schema() {
        let rows = vec![
            Row::new(vec![Value::Int64(1)]),
            Row::new(vec![Value::Text("oops".into())]),
        ];
        let node = Values::node(int_schema(), rows);
        let mut iter = node.row_iter(&test_context()).expect("iter");
        assert!(iter.next().is_ok());
        let err = iter.next().expect_err("bad row");
        assert!(!err.is_end_of_rows());
    }

    #[test]
    fn empty_source_is_immediately_exhausted() {
        let node = Values::node(int_schema(), Vec::new());
        let mut iter = node.row_iter(&test_context()).expect("iter");
        assert!(iter.next().expect_err("empty").is_end_of_rows());
    }
}
