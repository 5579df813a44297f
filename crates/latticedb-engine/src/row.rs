//! Row and schema types for query execution.
//!
//! This module defines the [`Row`] type used as the unit of data flowing
//! between plan operators, and the [`Schema`] describing the columns a node
//! produces.

use std::fmt;
use std::sync::Arc;

use latticedb_core::{CoreError, TypeTag, Value};

use crate::error::Result;

/// A column descriptor in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name.
    name: String,
    /// Source table, if the column originates from one.
    table: Option<String>,
    /// Declared value type.
    type_tag: TypeTag,
    /// Whether null values are permitted.
    nullable: bool,
}

impl Column {
    /// Creates a nullable column with the given name and type.
    #[must_use]
    pub fn new(name: impl Into<String>, type_tag: TypeTag) -> Self {
        Self { name: name.into(), table: None, type_tag, nullable: true }
    }

    /// Sets the source table.
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Marks the column as non-nullable.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Returns the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the source table, if any.
    #[must_use]
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Returns the declared type.
    #[must_use]
    pub const fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    /// Returns whether the column permits nulls.
    #[must_use]
    pub const fn nullable(&self) -> bool {
        self.nullable
    }

    /// Returns `true` if a value may legally appear under this column.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        if value.is_null() {
            return self.nullable;
        }
        self.type_tag.accepts(value)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{table}.{} {}", self.name, self.type_tag),
            None => write!(f, "{} {}", self.name, self.type_tag),
        }
    }
}

/// The ordered column descriptors a plan node produces.
///
/// A schema is derivable from a node without executing it, and every row the
/// node produces must satisfy it: same length, and each value accepted by
/// its positional column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Creates a schema from column descriptors.
    #[must_use]
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Creates an empty schema.
    #[must_use]
    pub const fn empty() -> Self {
        Self { columns: Vec::new() }
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the schema has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the column descriptors in order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the column at an index.
    #[must_use]
    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Returns the index of the first column with the given name.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Creates a projection of this schema with only the given columns.
    #[must_use]
    pub fn project(&self, indices: &[usize]) -> Self {
        let columns =
            indices.iter().filter_map(|&i| self.columns.get(i).cloned()).collect();
        Self { columns }
    }

    /// Creates a new schema by appending another schema's columns.
    ///
    /// Used by join operators whose output is the concatenation of both
    /// inputs.
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());
        Self { columns }
    }

    /// Checks a row against this schema.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the lengths differ, or a type
    /// mismatch when a value is not accepted by its column.
    pub fn validate_row(&self, row: &Row) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(CoreError::validation(format!(
                "row has {} values, schema has {} columns",
                row.len(),
                self.columns.len()
            ))
            .into());
        }
        for (column, value) in self.columns.iter().zip(row.values()) {
            if !column.accepts(value) {
                return Err(CoreError::type_mismatch(
                    column.type_tag().to_string(),
                    value.type_tag().to_string(),
                )
                .into());
            }
        }
        Ok(())
    }
}

impl From<Vec<Column>> for Schema {
    fn from(columns: Vec<Column>) -> Self {
        Self::new(columns)
    }
}

/// A shared schema reference, as held by plan nodes and iterators.
pub type SchemaRef = Arc<Schema>;

/// A row of values.
///
/// Rows are immutable once produced: operators build new rows rather than
/// mutating ones they received.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    /// Creates a row from values.
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Returns the values in order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Returns the number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the row has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value at an index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Creates a new row containing only the given positions.
    #[must_use]
    pub fn project(&self, indices: &[usize]) -> Self {
        let values = indices.iter().filter_map(|&i| self.values.get(i).cloned()).collect();
        Self { values }
    }

    /// Creates a new row by appending another row's values.
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        let mut values = self.values.clone();
        values.extend(other.values.iter().cloned());
        Self { values }
    }

    /// Consumes the row and returns the values.
    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

impl FromIterator<Value> for Row {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users_schema() -> Schema {
        Schema::new(vec![
            Column::new("id", TypeTag::Int64).with_table("users").not_null(),
            Column::new("name", TypeTag::Text).with_table("users"),
        ])
    }

    #[test]
    fn schema_lookup() {
        let schema = users_schema();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.index_of("id"), Some(0));
        assert_eq!(schema.index_of("name"), Some(1));
        assert_eq!(schema.index_of("missing"), None);
    }

    #[test]
    fn schema_concat() {
        let left = users_schema();
        let right = Schema::new(vec![Column::new("total", TypeTag::Float64)]);
        let joined = left.concat(&right);
        assert_eq!(joined.len(), 3);
        assert_eq!(joined.column_at(2).map(Column::name), Some("total"));
    }

    #[test]
    fn validate_row_accepts_matching() {
        let schema = users_schema();
        let row = Row::new(vec![Value::Int64(1), Value::Text("Alice".into())]);
        assert!(schema.validate_row(&row).is_ok());
    }

    #[test]
    fn validate_row_accepts_null_in_nullable() {
        let schema = users_schema();
        let row = Row::new(vec![Value::Int64(1), Value::Null]);
        assert!(schema.validate_row(&row).is_ok());
    }

    #[test]
    fn validate_row_rejects_null_in_not_null() {
        let schema = users_schema();
        let row = Row::new(vec![Value::Null, Value::Null]);
        assert!(schema.validate_row(&row).is_err());
    }

    #[test]
    fn validate_row_rejects_length_mismatch() {
        let schema = users_schema();
        let row = Row::new(vec![Value::Int64(1)]);
        assert!(schema.validate_row(&row).is_err());
    }

    #[test]
    fn validate_row_rejects_wrong_type() {
        let schema = users_schema();
        let row = Row::new(vec![Value::Text("1".into()), Value::Null]);
        assert!(schema.validate_row(&row).is_err());
    }

    #[test]
    fn row_project_and_concat() {
        let row = Row::new(vec![Value::Int64(1), Value::Int64(2), Value::Int64(3)]);
        let projected = row.project(&[2, 0]);
        assert_eq!(projected.values(), &[Value::Int64(3), Value::Int64(1)]);

        let joined = projected.concat(&Row::new(vec![Value::Null]));
        assert_eq!(joined.len(), 3);
    }
}
