//! Query plan nodes.
//!
//! A [`Node`] is one operator in a query plan tree. Nodes are immutable
//! after construction; rewrites build new trees through
//! [`with_children`](Node::with_children) and
//! [`with_expressions`](Node::with_expressions) while sharing unchanged
//! subtrees. Execution binds a node to a
//! [`Context`](crate::context::Context) through
//! [`row_iter`](Node::row_iter), producing a pull-based
//! [`RowIter`](crate::iter::RowIter).

use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::context::Context;
use crate::error::Result;
use crate::expression::ExprRef;
use crate::iter::BoxedRowIter;
use crate::row::SchemaRef;

/// A shared plan node reference.
pub type NodeRef = Arc<dyn Node>;

/// One operator in a query plan tree.
pub trait Node: fmt::Debug + Send + Sync {
    /// Returns the operator kind name, e.g. `"Filter"`.
    fn name(&self) -> &'static str;

    /// Returns `true` iff this node and everything beneath it (children and
    /// expressions) is bound to concrete sources.
    fn resolved(&self) -> bool;

    /// Returns the schema of the rows this node produces.
    fn schema(&self) -> SchemaRef;

    /// Returns the direct child nodes.
    fn children(&self) -> Vec<NodeRef>;

    /// Rebuilds this node with new children.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Unsupported`](crate::error::Error::Unsupported)
    /// fault when called with the wrong number of children.
    fn with_children(&self, children: Vec<NodeRef>) -> Result<NodeRef>;

    /// Returns the expressions this node holds directly (not those of its
    /// children). Nodes without expressions return an empty vec.
    fn expressions(&self) -> Vec<ExprRef> {
        Vec::new()
    }

    /// Rebuilds this node with new expressions, in the order
    /// [`expressions`](Node::expressions) returned them.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Unsupported`](crate::error::Error::Unsupported)
    /// fault when called with the wrong number of expressions.
    fn with_expressions(&self, expressions: Vec<ExprRef>) -> Result<NodeRef>;

    /// Binds this node to a context and starts execution.
    ///
    /// Construction is lazy: no rows are produced and no side effects run
    /// before the first [`next`](crate::iter::RowIter::next) on the result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unresolved`](crate::error::Error::Unresolved) when
    /// the node or anything beneath it is unresolved, or a setup failure.
    fn row_iter(&self, ctx: &Context) -> Result<BoxedRowIter>;

    /// Returns the one-line description used in plan display.
    fn describe(&self) -> String {
        self.name().to_string()
    }
}

/// Renders a plan tree as an indented multi-line string.
///
/// ```text
/// Project [name]
/// └── Filter [(age >= 18)]
///     └── Values [3 rows]
/// ```
#[must_use]
pub fn display_tree(node: &NodeRef) -> String {
    let mut out = String::new();
    write_tree(node, "", true, true, &mut out);
    out
}

fn write_tree(node: &NodeRef, prefix: &str, is_root: bool, is_last: bool, out: &mut String) {
    if is_root {
        let _ = writeln!(out, "{}", node.describe());
    } else {
        let connector = if is_last { "└── " } else { "├── " };
        let _ = writeln!(out, "{prefix}{connector}{}", node.describe());
    }
    let children = node.children();
    let child_prefix = if is_root {
        String::new()
    } else if is_last {
        format!("{prefix}    ")
    } else {
        format!("{prefix}│   ")
    };
    let last = children.len().saturating_sub(1);
    for (i, child) in children.iter().enumerate() {
        write_tree(child, &child_prefix, false, i == last, out);
    }
}

#[cfg(test)]
mod tests {
    use latticedb_core::{TypeTag, Value};

    use super::*;
    use crate::expression::{Comparison, ComparisonOp, GetField, Literal};
    use crate::plan::{Filter, Project, Values};
    use crate::row::{Column, Row, Schema};

    fn people() -> NodeRef {
        let schema = Schema::new(vec![
            Column::new("name", TypeTag::Text).not_null(),
            Column::new("age", TypeTag::Int64).not_null(),
        ]);
        Values::node(
            schema,
            vec![
                Row::new(vec![Value::from("ada"), Value::Int64(36)]),
                Row::new(vec![Value::from("lin"), Value::Int64(17)]),
            ],
        )
    }

    #[test]
    fn display_tree_shows_nesting() {
        let predicate = Comparison::expr(
            ComparisonOp::GtEq,
            GetField::expr(1, "age", TypeTag::Int64, false),
            Literal::expr(18i64),
        );
        let plan = Project::node(
            vec![GetField::expr(0, "name", TypeTag::Text, false)],
            Filter::node(predicate, people()),
        );

        let rendered = display_tree(&plan);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Project"));
        assert!(lines[1].starts_with("└── Filter"));
        assert!(lines[2].starts_with("    └── Values"));
    }
}
