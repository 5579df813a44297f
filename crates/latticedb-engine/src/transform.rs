//! Bottom-up plan and expression rewrites.
//!
//! Each transform visits a tree children-first, applies a caller-supplied
//! rewrite to every node exactly once, and rebuilds only along paths where
//! something changed. Subtrees the rewrite leaves alone are shared with the
//! input tree, so a rewrite that changes nothing returns the original tree
//! unchanged.

use std::sync::Arc;

use crate::error::Result;
use crate::expression::{ExprRef, Expression as _};
use crate::node::{Node as _, NodeRef};

/// Rewrites a plan tree bottom-up.
///
/// `f` is called on every node, children before parents, and sees each
/// node's already-rewritten children. Returning the input node unchanged
/// (by identity) keeps the subtree shared.
///
/// # Errors
///
/// Propagates the first error from `f` or from a node rebuild; on error the
/// input tree is untouched.
pub fn transform_up<F>(node: &NodeRef, f: &F) -> Result<NodeRef>
where
    F: Fn(NodeRef) -> Result<NodeRef>,
{
    let children = node.children();
    let mut rewritten = Vec::with_capacity(children.len());
    let mut changed = false;
    for child in &children {
        let new_child = transform_up(child, f)?;
        changed |= !Arc::ptr_eq(child, &new_child);
        rewritten.push(new_child);
    }
    let node = if changed { node.with_children(rewritten)? } else { Arc::clone(node) };
    f(node)
}

/// Rewrites an expression tree bottom-up.
///
/// Same contract as [`transform_up`], applied to expressions.
///
/// # Errors
///
/// Propagates the first error from `f` or from an expression rebuild.
pub fn transform_expr_up<F>(expr: &ExprRef, f: &F) -> Result<ExprRef>
where
    F: Fn(ExprRef) -> Result<ExprRef>,
{
    let children = expr.children();
    let mut rewritten = Vec::with_capacity(children.len());
    let mut changed = false;
    for child in &children {
        let new_child = transform_expr_up(child, f)?;
        changed |= !Arc::ptr_eq(child, &new_child);
        rewritten.push(new_child);
    }
    let expr = if changed { expr.with_children(rewritten)? } else { Arc::clone(expr) };
    f(expr)
}

/// Rewrites every expression held by every node in a plan tree, bottom-up
/// on both axes: each node's expressions are themselves transformed with
/// [`transform_expr_up`], and child nodes are visited before their parents.
///
/// # Errors
///
/// Propagates the first error from `f` or from a rebuild.
pub fn transform_expressions_up<F>(node: &NodeRef, f: &F) -> Result<NodeRef>
where
    F: Fn(ExprRef) -> Result<ExprRef>,
{
    transform_up(node, &|node: NodeRef| {
        let exprs = node.expressions();
        if exprs.is_empty() {
            return Ok(node);
        }
        let mut rewritten = Vec::with_capacity(exprs.len());
        let mut changed = false;
        for expr in &exprs {
            let new_expr = transform_expr_up(expr, f)?;
            changed |= !Arc::ptr_eq(expr, &new_expr);
            rewritten.push(new_expr);
        }
        if changed {
            node.with_expressions(rewritten)
        } else {
            Ok(node)
        }
    })
}
