//! Message module - Descriptors and dynamic messages built from a schema.
//!
//! This is the reflection layer field masks operate on: look fields up by
//! name, test presence, read, replace and clear field values, and create
//! nested messages on demand.

mod codec;
mod descriptor;
mod dynamic;
mod parser;

pub use codec::*;
pub use descriptor::*;
pub use dynamic::*;
pub use parser::*;
