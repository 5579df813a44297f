//! Core data types.

mod tag;
mod value;

pub use tag::TypeTag;
pub use value::Value;
