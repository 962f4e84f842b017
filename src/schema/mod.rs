//! Schema module defines the message schemas that descriptors are built from.
//!
//! Schemas are plain data (usually loaded from YAML) describing named
//! messages, their fields and field types. They are validated once and then
//! shared, read-only, by every descriptor and message built from them.

mod elements;
mod validation;

pub use elements::*;
pub use validation::*;
