//! Execution context for query execution.
//!
//! A [`Context`] is the cancellation- and deadline-aware handle threaded
//! explicitly through every execution call. It is created per query (or per
//! sub-operation), is cheap to construct and clone, and carries exactly one
//! shared [`Session`](crate::session::Session) reference.
//!
//! Cancellation is cooperative: iterators poll [`Context::is_cancelled`] on
//! every [`next`](crate::iter::RowIter::next) call, so a cancel becomes
//! observable at the next poll rather than instantaneously. Cancellation is
//! never ambient state; it travels only through contexts passed down the
//! call tree.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError};
use std::time::Instant;

use latticedb_core::{TypeTag, Value};

use crate::session::{SessionRef, Warning};

/// A cancellation flag for query execution, derivable from a parent.
///
/// Cancelling a token cancels every token derived from it; cancelling a
/// derived token never affects its parent or siblings. A token may also
/// carry a deadline, which counts as cancellation once passed.
///
/// Tokens are cheap to clone and may be shared between threads to allow
/// cancellation from outside the execution thread.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<TokenInner>,
}

#[derive(Debug, Default)]
struct TokenInner {
    cancelled: AtomicBool,
    deadline: Option<Instant>,
    parent: Option<CancellationToken>,
}

impl CancellationToken {
    /// Creates a root token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a root token with a deadline.
    #[must_use]
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            inner: Arc::new(TokenInner {
                cancelled: AtomicBool::new(false),
                deadline: Some(deadline),
                parent: None,
            }),
        }
    }

    /// Derives a child token.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            inner: Arc::new(TokenInner {
                cancelled: AtomicBool::new(false),
                deadline: None,
                parent: Some(self.clone()),
            }),
        }
    }

    /// Derives a child token with a deadline.
    ///
    /// The child observes whichever is tighter: its own deadline or any
    /// deadline on the parent chain.
    #[must_use]
    pub fn child_with_deadline(&self, deadline: Instant) -> Self {
        Self {
            inner: Arc::new(TokenInner {
                cancelled: AtomicBool::new(false),
                deadline: Some(deadline),
                parent: Some(self.clone()),
            }),
        }
    }

    /// Cancels this token and everything derived from it.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }

    /// Checks whether this token is cancelled, directly, by deadline, or
    /// through its parent chain.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        if self.inner.cancelled.load(Ordering::SeqCst) {
            return true;
        }
        if let Some(deadline) = self.inner.deadline {
            if Instant::now() >= deadline {
                return true;
            }
        }
        self.inner.parent.as_ref().is_some_and(Self::is_cancelled)
    }
}

/// Per-query execution handle.
///
/// Wraps one [`CancellationToken`] and references exactly one session. A
/// context does not outlive or duplicate its session; it shares it with the
/// connection that owns it.
///
/// Cloning a context shares the same token and session, so a row iterator
/// holding a clone observes cancellation of the original.
#[derive(Debug, Clone)]
pub struct Context {
    token: CancellationToken,
    session: SessionRef,
    index_hints: HashSet<String>,
}

impl Context {
    /// Creates a context for a query with a fresh root token.
    #[must_use]
    pub fn new(session: SessionRef) -> Self {
        Self { token: CancellationToken::new(), session, index_hints: HashSet::new() }
    }

    /// Creates a context whose token is derived from a parent signal.
    ///
    /// The protocol layer uses this to tie per-query contexts to a
    /// connection-level cancellation signal.
    #[must_use]
    pub fn with_parent(session: SessionRef, parent: &CancellationToken) -> Self {
        Self { token: parent.child(), session, index_hints: HashSet::new() }
    }

    /// Attaches a deadline, deriving a new token under the current one.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.token = self.token.child_with_deadline(deadline);
        self
    }

    /// Adds an index-lookup hint for the optimizer/storage boundary.
    #[must_use]
    pub fn with_index_hint(mut self, index: impl Into<String>) -> Self {
        self.index_hints.insert(index.into());
        self
    }

    /// Derives a child context for a sub-operation.
    ///
    /// Cancelling this context cancels the child; cancelling the child
    /// never affects this context or its other children.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child(),
            session: Arc::clone(&self.session),
            index_hints: self.index_hints.clone(),
        }
    }

    /// Cancels this context and all contexts derived from it.
    pub fn cancel(&self) {
        tracing::debug!(session = self.session_id(), "query context cancelled");
        self.token.cancel();
    }

    /// Polls the cancellation signal without blocking.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Returns the cancellation token.
    #[must_use]
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Returns the shared session reference.
    #[must_use]
    pub fn session(&self) -> SessionRef {
        Arc::clone(&self.session)
    }

    /// Returns the index hints attached to this context.
    #[must_use]
    pub fn index_hints(&self) -> &HashSet<String> {
        &self.index_hints
    }

    /// Returns `true` if the given index was hinted.
    #[must_use]
    pub fn has_index_hint(&self, index: &str) -> bool {
        self.index_hints.contains(index)
    }

    /// Appends a warning to the session log.
    pub fn warn(&self, warning: Warning) {
        self.lock_session(|session| session.warn(warning));
    }

    /// Sets a session variable.
    pub fn set_variable(&self, name: impl Into<String>, type_tag: TypeTag, value: Value) {
        let name = name.into();
        self.lock_session(|session| session.set(name, type_tag, value));
    }

    /// Gets a session variable.
    #[must_use]
    pub fn get_variable(&self, name: &str) -> (TypeTag, Value) {
        self.lock_session(|session| session.get(name))
    }

    fn session_id(&self) -> u64 {
        self.lock_session(|session| session.id())
    }

    fn lock_session<R>(&self, f: impl FnOnce(&mut crate::session::Session) -> R) -> R {
        let mut guard = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}
