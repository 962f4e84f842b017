//! Fieldmask module - Field masks select which fields an update touches.
//!
//! A mask is anything implementing [`FieldMask`]. [`Mask`] is a plain path
//! list with a shallow presence check and is what [`all`] produces.
//! [`SchemaMask`] checks nested paths against a message type up front.

mod mask;
mod path;
mod schema_mask;

pub use mask::*;
pub use path::*;
pub use schema_mask::*;
