//! Error types for query execution.

use thiserror::Error;

/// Errors produced by the execution core.
#[derive(Debug, Error)]
pub enum Error {
    /// The end-of-rows sentinel.
    ///
    /// Not a true failure: every row iterator returns this from
    /// [`RowIter::next`](crate::iter::RowIter::next) once it is exhausted,
    /// and again on every subsequent call. A cancelled context produces the
    /// same sentinel; see the iterator protocol documentation for how to
    /// tell the two apart.
    #[error("end of rows")]
    EndOfRows,

    /// A plan node or expression has unbound references and cannot execute.
    #[error("not resolved: {0}")]
    Unresolved(String),

    /// A genuine runtime failure during execution.
    #[error("execution error: {0}")]
    Execution(String),

    /// A contract violation: an operation was invoked on a node or
    /// expression that does not support it. Indicates a malformed tree, not
    /// a runtime data condition.
    #[error("unsupported operation: {operation} on {target}")]
    Unsupported {
        /// The operation that was attempted.
        operation: String,
        /// The node or expression kind it was attempted on.
        target: String,
    },

    /// A type error from the core value layer.
    #[error(transparent)]
    Core(#[from] latticedb_core::CoreError),
}

/// Result type for execution operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates an execution error.
    #[must_use]
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Creates an unresolved error.
    #[must_use]
    pub fn unresolved(message: impl Into<String>) -> Self {
        Self::Unresolved(message.into())
    }

    /// Creates an unsupported-operation error.
    #[must_use]
    pub fn unsupported(operation: impl Into<String>, target: impl Into<String>) -> Self {
        Self::Unsupported { operation: operation.into(), target: target.into() }
    }

    /// Returns `true` if this error is the end-of-rows sentinel.
    ///
    /// Callers must use this (or a pattern match on [`Error::EndOfRows`]) to
    /// distinguish exhaustion from failure; the sentinel is never wrapped.
    #[must_use]
    pub const fn is_end_of_rows(&self) -> bool {
        matches!(self, Self::EndOfRows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_of_rows_is_recognized() {
        assert!(Error::EndOfRows.is_end_of_rows());
        assert!(!Error::execution("boom").is_end_of_rows());
        assert!(!Error::unresolved("t").is_end_of_rows());
    }

    #[test]
    fn unsupported_display() {
        let err = Error::unsupported("with_children", "Values");
        assert_eq!(err.to_string(), "unsupported operation: with_children on Values");
    }

    #[test]
    fn core_error_converts() {
        let core = latticedb_core::CoreError::type_mismatch("bool", "text");
        let err = Error::from(core);
        assert!(err.to_string().contains("type mismatch"));
    }
}
