//! Column reference expressions.
//!
//! [`UnresolvedColumn`] is what the parser produces: a name, possibly
//! qualified, with no binding. The analyzer replaces it with a [`GetField`]
//! bound to a position in the input schema; only then can the expression
//! evaluate.

use std::fmt;
use std::sync::Arc;

use latticedb_core::{TypeTag, Value};

use super::{ExprRef, Expression};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::row::Row;

/// A column reference bound to a position in the input row.
#[derive(Debug, Clone, PartialEq)]
pub struct GetField {
    index: usize,
    name: String,
    table: Option<String>,
    type_tag: TypeTag,
    nullable: bool,
}

impl GetField {
    /// Creates a bound column reference.
    #[must_use]
    pub fn new(index: usize, name: impl Into<String>, type_tag: TypeTag, nullable: bool) -> Self {
        Self { index, name: name.into(), table: None, type_tag, nullable }
    }

    /// Sets the source table qualifier.
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Wraps the reference for use in an expression tree.
    #[must_use]
    pub fn expr(index: usize, name: impl Into<String>, type_tag: TypeTag, nullable: bool) -> ExprRef {
        Arc::new(Self::new(index, name, type_tag, nullable))
    }

    /// Returns the bound row position.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns the column name.
    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.name
    }
}

impl Expression for GetField {
    fn name(&self) -> &'static str {
        "GetField"
    }

    fn resolved(&self) -> bool {
        true
    }

    fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    fn is_nullable(&self) -> bool {
        self.nullable
    }

    fn children(&self) -> Vec<ExprRef> {
        Vec::new()
    }

    fn with_children(&self, children: Vec<ExprRef>) -> Result<ExprRef> {
        if !children.is_empty() {
            return Err(Error::unsupported("with_children", self.name()));
        }
        Ok(Arc::new(self.clone()))
    }

    fn eval(&self, _ctx: &Context, row: &Row) -> Result<Value> {
        row.get(self.index).cloned().ok_or_else(|| {
            Error::execution(format!(
                "column {} (index {}) out of range for row of {} values",
                self.name,
                self.index,
                row.len()
            ))
        })
    }

    fn column_name(&self) -> String {
        self.name.clone()
    }
}

impl fmt::Display for GetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{table}.{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A column reference the analyzer has not yet bound.
///
/// Evaluating or deriving a type from an unresolved column is an error;
/// the node holding it reports `resolved() == false` until the analyzer
/// substitutes a [`GetField`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedColumn {
    name: String,
    table: Option<String>,
}

impl UnresolvedColumn {
    /// Creates an unqualified unresolved column.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), table: None }
    }

    /// Creates a table-qualified unresolved column.
    #[must_use]
    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self { name: name.into(), table: Some(table.into()) }
    }

    /// Wraps the reference for use in an expression tree.
    #[must_use]
    pub fn expr(name: impl Into<String>) -> ExprRef {
        Arc::new(Self::new(name))
    }

    /// Returns the column name.
    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.name
    }
}

impl Expression for UnresolvedColumn {
    fn name(&self) -> &'static str {
        "UnresolvedColumn"
    }

    fn resolved(&self) -> bool {
        false
    }

    fn type_tag(&self) -> TypeTag {
        TypeTag::Null
    }

    fn is_nullable(&self) -> bool {
        true
    }

    fn children(&self) -> Vec<ExprRef> {
        Vec::new()
    }

    fn with_children(&self, children: Vec<ExprRef>) -> Result<ExprRef> {
        if !children.is_empty() {
            return Err(Error::unsupported("with_children", self.name()));
        }
        Ok(Arc::new(self.clone()))
    }

    fn eval(&self, _ctx: &Context, _row: &Row) -> Result<Value> {
        Err(Error::unresolved(format!("column {self} is not resolved")))
    }

    fn column_name(&self) -> String {
        self.name.clone()
    }
}

impl fmt::Display for UnresolvedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{table}.{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}
