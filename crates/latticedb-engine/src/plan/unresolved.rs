//! Unresolved table references.

use std::sync::Arc;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::expression::ExprRef;
use crate::iter::BoxedRowIter;
use crate::node::{Node, NodeRef};
use crate::row::{Schema, SchemaRef};

/// A table reference the analyzer has not yet bound to a source.
///
/// Reports `resolved() == false` and an empty schema; binding it for
/// execution is an error. The analyzer replaces it with a concrete source
/// node before a plan runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedTable {
    name: String,
}

impl UnresolvedTable {
    /// Creates an unresolved reference to the named table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Wraps the reference for use in a plan tree.
    #[must_use]
    pub fn node(name: impl Into<String>) -> NodeRef {
        Arc::new(Self::new(name))
    }

    /// Returns the referenced table name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.name
    }
}

impl Node for UnresolvedTable {
    fn name(&self) -> &'static str {
        "UnresolvedTable"
    }

    fn resolved(&self) -> bool {
        false
    }

    fn schema(&self) -> SchemaRef {
        Arc::new(Schema::empty())
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

    fn row_iter(&self, _ctx: &Context) -> Result<BoxedRowIter> {
        tracing::debug!(table = %self.name, "attempted to execute unresolved table");
        Err(Error::unresolved(format!("table {} is not resolved", self.name)))
    }

    fn describe(&self) -> String {
        format!("UnresolvedTable [{}]", self.name)
    }
}
