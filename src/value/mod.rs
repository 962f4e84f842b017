//! Value module - In-memory representation of message field contents.

mod value;

pub use value::*;
