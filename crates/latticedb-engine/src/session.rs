//! Per-connection session state.
//!
//! A [`Session`] is created once per client connection by the protocol
//! layer, mutated for the connection's lifetime, and discarded on
//! disconnect. It owns the connection's typed variables, its warning log,
//! and its immutable identity.
//!
//! Sessions are never shared across connections. A single connection drives
//! its session sequentially, so the only locking is the [`Mutex`] that lets
//! a [`Context`](crate::context::Context) reference the session from query
//! execution.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use latticedb_core::{TypeTag, Value};

/// Process-wide connection id counter.
static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// A shared session reference.
///
/// Contexts hold one of these; they reference the session, never own or
/// duplicate it.
pub type SessionRef = Arc<Mutex<Session>>;

/// The severity of a [`Warning`], mirroring protocol-level read-back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningLevel {
    /// Informational note.
    Note,
    /// Non-fatal warning.
    Warning,
    /// An error reported as a warning (e.g. by an IGNORE clause).
    Error,
}

impl fmt::Display for WarningLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Note => "Note",
            Self::Warning => "Warning",
            Self::Error => "Error",
        };
        write!(f, "{name}")
    }
}

/// A non-fatal diagnostic accumulated on a session.
///
/// Warnings are immutable once created: appended to the session log, never
/// mutated, and never propagated as errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// Severity level.
    pub level: WarningLevel,
    /// Numeric warning code.
    pub code: u32,
    /// Human-readable message.
    pub message: String,
}

impl Warning {
    /// Creates a warning at [`WarningLevel::Warning`].
    #[must_use]
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self { level: WarningLevel::Warning, code, message: message.into() }
    }

    /// Sets the severity level.
    #[must_use]
    pub const fn with_level(mut self, level: WarningLevel) -> Self {
        self.level = level;
        self
    }
}

/// Mutable per-connection state.
///
/// # Identity
///
/// The connection id, client address, client name, and capability marker
/// are fixed at construction and immutable afterwards.
///
/// # Variables
///
/// Variables are name → `(TypeTag, Value)` pairs. Reading a name that was
/// never set returns `(TypeTag::Null, Value::Null)` rather than an error,
/// and setting a name replaces tag and value together as one pair.
#[derive(Debug)]
pub struct Session {
    id: u64,
    client_addr: String,
    client_name: String,
    capabilities: u32,
    variables: HashMap<String, (TypeTag, Value)>,
    warnings: Vec<Warning>,
    max_warnings: Option<usize>,
}

impl Session {
    /// Creates a session for a new client connection.
    ///
    /// The connection id is assigned from a process-wide counter.
    #[must_use]
    pub fn new(
        client_addr: impl Into<String>,
        client_name: impl Into<String>,
        capabilities: u32,
    ) -> Self {
        Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            client_addr: client_addr.into(),
            client_name: client_name.into(),
            capabilities,
            variables: HashMap::new(),
            warnings: Vec::new(),
            max_warnings: None,
        }
    }

    /// Bounds the warning log; once full, the oldest entries are dropped.
    #[must_use]
    pub const fn with_max_warnings(mut self, max: usize) -> Self {
        self.max_warnings = Some(max);
        self
    }

    /// Wraps the session for sharing with contexts.
    #[must_use]
    pub fn into_ref(self) -> SessionRef {
        Arc::new(Mutex::new(self))
    }

    /// Returns the connection id.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Returns the client address.
    #[must_use]
    pub fn client_addr(&self) -> &str {
        &self.client_addr
    }

    /// Returns the client name.
    #[must_use]
    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    /// Returns the protocol capability marker.
    #[must_use]
    pub const fn capabilities(&self) -> u32 {
        self.capabilities
    }

    /// Sets a session variable, replacing tag and value as one pair.
    pub fn set(&mut self, name: impl Into<String>, type_tag: TypeTag, value: Value) {
        self.variables.insert(name.into(), (type_tag, value));
    }

    /// Gets a session variable.
    ///
    /// A name that was never set reads back as `(TypeTag::Null,
    /// Value::Null)`.
    #[must_use]
    pub fn get(&self, name: &str) -> (TypeTag, Value) {
        self.variables
            .get(name)
            .cloned()
            .unwrap_or((TypeTag::Null, Value::Null))
    }

    /// Appends a warning to the log.
    pub fn warn(&mut self, warning: Warning) {
        if let Some(max) = self.max_warnings {
            while self.warnings.len() >= max {
                self.warnings.remove(0);
            }
        }
        self.warnings.push(warning);
    }

    /// Returns the warnings, most recently added first.
    ///
    /// The latest warning is always at index 0. This ordering is part of
    /// the contract the protocol layer relies on when reporting warnings
    /// after query completion.
    #[must_use]
    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings.iter().rev().cloned().collect()
    }

    /// Returns the number of accumulated warnings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Clears the warning log.
    pub fn clear_warnings(&mut self) {
        self.warnings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_variable_reads_null() {
        let session = Session::new("127.0.0.1:3306", "client", 1);
        assert_eq!(session.get("foo"), (TypeTag::Null, Value::Null));
    }

    #[test]
    fn set_then_get_roundtrip() {
        let mut session = Session::new("127.0.0.1:3306", "client", 1);
        session.set("foo", TypeTag::Int64, Value::Int64(1));
        assert_eq!(session.get("foo"), (TypeTag::Int64, Value::Int64(1)));
    }

    #[test]
    fn set_replaces_pair() {
        let mut session = Session::new("127.0.0.1:3306", "client", 1);
        session.set("foo", TypeTag::Int64, Value::Int64(1));
        session.set("foo", TypeTag::Text, Value::Text("one".into()));
        assert_eq!(session.get("foo"), (TypeTag::Text, Value::Text("one".into())));
    }

    #[test]
    fn warnings_reverse_chronological() {
        let mut session = Session::new("127.0.0.1:3306", "client", 1);
        assert!(session.warnings().is_empty());

        session.warn(Warning::new(1, "first"));
        session.warn(Warning::new(2, "second"));
        session.warn(Warning::new(3, "third"));

        let warnings = session.warnings();
        assert_eq!(warnings.len(), 3);
        assert_eq!(warnings[0].code, 3);
        assert_eq!(warnings[1].code, 2);
        assert_eq!(warnings[2].code, 1);
        assert_eq!(session.warning_count(), 3);
    }

    #[test]
    fn warning_bound_drops_oldest() {
        let mut session = Session::new("addr", "client", 0).with_max_warnings(2);
        session.warn(Warning::new(1, "a"));
        session.warn(Warning::new(2, "b"));
        session.warn(Warning::new(3, "c"));

        let warnings = session.warnings();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].code, 3);
        assert_eq!(warnings[1].code, 2);
    }

    #[test]
    fn identity_is_assigned() {
        let a = Session::new("addr-a", "a", 7);
        let b = Session::new("addr-b", "b", 7);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.client_addr(), "addr-a");
        assert_eq!(a.client_name(), "a");
        assert_eq!(a.capabilities(), 7);
    }
}
