//! Plan operators.
//!
//! Each operator implements [`Node`](crate::node::Node) and pairs it with a
//! [`RowIter`](crate::iter::RowIter) that executes it. Execution follows the
//! pull protocol throughout: iterators check cancellation on every pull,
//! surface the end-of-rows sentinel exactly once per exhaustion, and close
//! idempotently.

mod cross_join;
mod filter;
mod limit;
mod project;
mod sort;
mod unresolved;
mod values;

pub use cross_join::CrossJoin;
pub use filter::Filter;
pub use limit::Limit;
pub use project::Project;
pub use sort::{Sort, SortField};
pub use unresolved::UnresolvedTable;
pub use values::Values;

use crate::error::{Error, Result};
use crate::node::Node;

/// Rejects execution of a plan that still contains unresolved pieces.
///
/// Called at the top of every operator's `row_iter`; binding an unresolved
/// tree is a setup error, not something to discover mid-stream.
pub(crate) fn ensure_resolved(node: &dyn Node) -> Result<()> {
    if node.resolved() {
        Ok(())
    } else {
        Err(Error::unresolved(format!("cannot execute unresolved plan node {}", node.name())))
    }
}
