//! The pull-based row iteration protocol.
//!
//! A [`RowIter`] is produced by binding a plan node to a
//! [`Context`](crate::context::Context) and is driven by repeated
//! [`next`](RowIter::next) calls until it returns the
//! [`EndOfRows`](crate::error::Error::EndOfRows) sentinel.
//!
//! # State machine
//!
//! An iterator is *ready* after construction, becomes *exhausted* when
//! `next` first returns `EndOfRows` (every later call returns the same
//! sentinel), and is *closed* after [`close`](RowIter::close). `close` is
//! callable from any state, including before the first `next`, and every
//! in-tree implementation makes it idempotent.
//!
//! # Cancellation
//!
//! `next` checks the bound context's cancellation signal on every call, not
//! only the first: once the context is cancelled, `next` returns
//! `EndOfRows` even if more data was available. A caller that needs to
//! distinguish "ran out of data" from "was cancelled" must consult
//! [`Context::is_cancelled`](crate::context::Context::is_cancelled) after
//! seeing the sentinel; the protocol deliberately reports both the same
//! way.

use crate::context::Context;
use crate::error::{Error, Result};
use crate::row::Row;

/// An iterator producing rows one pull at a time.
///
/// Execution is lazy: constructing an iterator performs no work and no side
/// effects before the first `next` call. Composite iterators (joins, sorts,
/// limits) must propagate `close` to all child iterators even on early
/// abort, and must surface a child's `EndOfRows` rather than retrying it.
pub trait RowIter: Send {
    /// Returns the next row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EndOfRows`] on exhaustion or when the bound context
    /// is cancelled; any other error is a genuine failure and propagates
    /// unchanged through composite iterators.
    fn next(&mut self) -> Result<Row>;

    /// Releases any held resources.
    ///
    /// # Errors
    ///
    /// Returns an error if a resource could not be released. Implementations
    /// in this crate are idempotent: closing twice is a no-op.
    fn close(&mut self) -> Result<()>;
}

/// A boxed row iterator for dynamic dispatch.
pub type BoxedRowIter = Box<dyn RowIter>;

/// A row iterator over an in-memory batch of rows.
///
/// Used by leaf operators that already hold their rows and by operators
/// that materialize (e.g. sort). Checks the context on every `next`.
pub struct RowsIter {
    ctx: Context,
    rows: std::vec::IntoIter<Row>,
    exhausted: bool,
}

impl RowsIter {
    /// Creates an iterator over the given rows, bound to a context.
    #[must_use]
    pub fn new(ctx: Context, rows: Vec<Row>) -> Self {
        Self { ctx, rows: rows.into_iter(), exhausted: false }
    }
}

impl RowIter for RowsIter {
    fn next(&mut self) -> Result<Row> {
        if self.exhausted || self.ctx.is_cancelled() {
            self.exhausted = true;
            return Err(Error::EndOfRows);
        }
        match self.rows.next() {
            Some(row) => Ok(row),
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

/// Drives an iterator to exhaustion, collecting its rows.
///
/// Guarantees `close` runs on every exit path: normal exhaustion, failure,
/// and cancellation (which surfaces as exhaustion). This is the reference
/// pull loop for callers that want all rows at once.
///
/// # Errors
///
/// Returns the first non-sentinel error from `next` or `close`.
pub fn drain(mut iter: BoxedRowIter) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    loop {
        match iter.next() {
            Ok(row) => rows.push(row),
            Err(err) if err.is_end_of_rows() => break,
            Err(err) => {
                // Best effort: the pull failed, but resources still have to go.
                let _ = iter.close();
                return Err(err);
            }
        }
    }
    iter.close()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use latticedb_core::Value;

    use super::*;
    use crate::session::Session;

    fn test_context() -> Context {
        Context::new(Session::new("127.0.0.1:0", "test", 0).into_ref())
    }

    fn three_rows() -> Vec<Row> {
        (1..=3).map(|i| Row::new(vec![Value::Int64(i)])).collect()
    }

    #[test]
    fn rows_iter_yields_then_eof() {
        let mut iter = RowsIter::new(test_context(), three_rows());
        assert!(iter.next().is_ok());
        assert!(iter.next().is_ok());
        assert!(iter.next().is_ok());

        let err = iter.next().expect_err("exhausted");
        assert!(err.is_end_of_rows());

        // Idempotent after exhaustion.
        assert!(iter.next().expect_err("still exhausted").is_end_of_rows());
    }

    #[test]
    fn rows_iter_observes_cancellation_mid_stream() {
        let ctx = test_context();
        let mut iter = RowsIter::new(ctx.clone(), three_rows());
        assert!(iter.next().is_ok());

        ctx.cancel();
        let err = iter.next().expect_err("cancelled");
        assert!(err.is_end_of_rows());
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn close_before_next_is_safe() {
        let mut iter = RowsIter::new(test_context(), three_rows());
        assert!(iter.close().is_ok());
        assert!(iter.close().is_ok());
        assert!(iter.next().expect_err("closed").is_end_of_rows());
    }

    #[test]
    fn drain_collects_all_rows() {
        let iter = RowsIter::new(test_context(), three_rows());
        let rows = drain(Box::new(iter)).expect("drain");
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn drain_on_cancelled_context_is_empty() {
        let ctx = test_context();
        ctx.cancel();
        let iter = RowsIter::new(ctx, three_rows());
        let rows = drain(Box::new(iter)).expect("drain");
        assert!(rows.is_empty());
    }
}
