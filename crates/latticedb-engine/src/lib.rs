//! Query execution engine for LatticeDB.
//!
//! # Overview
//!
//! This crate provides the execution core shared by every query front end:
//! plan trees ([`Node`]), scalar expressions ([`Expression`]), bottom-up
//! rewrites ([`transform_up`]), the pull-based row protocol ([`RowIter`]),
//! per-connection state ([`Session`]), and the per-query [`Context`] that
//! carries cancellation through execution.
//!
//! # Example
//!
//! ```
//! use latticedb_core::{TypeTag, Value};
//! use latticedb_engine::expression::{Comparison, ComparisonOp, GetField, Literal};
//! use latticedb_engine::plan::{Filter, Values};
//! use latticedb_engine::row::{Column, Row, Schema};
//! use latticedb_engine::{drain, Context, Session};
//!
//! let schema = Schema::new(vec![Column::new("n", TypeTag::Int64).not_null()]);
//! let source = Values::node(
//!     schema,
//!     (1..=5).map(|i| Row::new(vec![Value::Int64(i)])).collect(),
//! );
//! let plan = Filter::node(
//!     Comparison::expr(
//!         ComparisonOp::Gt,
//!         GetField::expr(0, "n", TypeTag::Int64, false),
//!         Literal::expr(3i64),
//!     ),
//!     source,
//! );
//!
//! let ctx = Context::new(Session::new("127.0.0.1:0", "example", 0).into_ref());
//! let rows = drain(plan.row_iter(&ctx)?)?;
//! assert_eq!(rows.len(), 2);
//! # Ok::<(), latticedb_engine::Error>(())
//! ```
//!
//! # Modules
//!
//! - [`row`]: rows, columns and schemas
//! - [`session`]: per-connection state, variables and warnings
//! - [`context`]: per-query cancellation and session access
//! - [`iter`]: the pull-based row iteration protocol
//! - [`expression`]: scalar expression trees
//! - [`node`]: the plan node contract and plan display
//! - [`transform`]: bottom-up plan and expression rewrites
//! - [`plan`]: concrete plan operators

#![deny(clippy::unwrap_used)]

pub mod context;
pub mod error;
pub mod expression;
pub mod iter;
pub mod node;
pub mod plan;
pub mod row;
pub mod session;
pub mod transform;

pub use context::{CancellationToken, Context};
pub use error::{Error, Result};
pub use expression::{ExprRef, Expression};
pub use iter::{drain, BoxedRowIter, RowIter};
pub use node::{display_tree, Node, NodeRef};
pub use row::{Column, Row, Schema, SchemaRef};
pub use session::{Session, SessionRef, Warning, WarningLevel};
pub use transform::{transform_expr_up, transform_expressions_up, transform_up};
