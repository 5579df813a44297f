//! `LatticeDB` Core
//!
//! This crate provides the fundamental value types shared by every layer of
//! `LatticeDB`: the storage adapters, the expression library, and the query
//! execution core.
//!
//! # Overview
//!
//! - **Values**: [`Value`] enum covering the scalar types that flow through
//!   query execution
//! - **Type tags**: [`TypeTag`] pairing every value with its declared type
//! - **Errors**: [`CoreError`] for type mismatches and validation failures
//!
//! # Example
//!
//! ```
//! use latticedb_core::{TypeTag, Value};
//!
//! // Create values via From trait
//! let name: Value = "Alice".into();
//! let age: Value = 30i64.into();
//!
//! // Every value knows its type tag
//! assert_eq!(name.type_tag(), TypeTag::Text);
//! assert_eq!(age.type_tag(), TypeTag::Int64);
//!
//! // Null is a value of its own, paired with the Null tag
//! assert!(Value::Null.is_null());
//! assert_eq!(Value::Null.type_tag(), TypeTag::Null);
//! ```
//!
//! # Modules
//!
//! - [`types`] - Core data types ([`Value`], [`TypeTag`])
//! - [`error`] - Error types ([`CoreError`])

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::CoreError;
pub use types::{TypeTag, Value};
