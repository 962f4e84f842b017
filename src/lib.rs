//! # protomask
//!
//! Partial updates of schema-described messages driven by field masks.
//!
//! A field mask names the fields of a message that an update touches,
//! as dotted paths such as `price.discount.full_price`. Applying a mask
//! copies each named field from an update message onto a target message,
//! clearing it on the target when the update does not hold a value.
//!
//! ## Modules
//!
//! - [`schema`] - Message schema definitions and their validation
//! - [`value`] - Field values stored in messages
//! - [`message`] - Descriptors, dynamic messages and their YAML/JSON encoding
//! - [`fieldmask`] - The field mask capability and concrete masks
//! - [`update`] - Applying a field mask from an update message onto a target
//!
//! ## Example
//!
//! ```
//! use protomask::{update, Parser, SchemaMask};
//!
//! let parser = Parser::new(
//!     r#"
//! messages:
//! - name: Book
//!   fields:
//!   - name: name
//!     type: {scalar: string}
//!   - name: price
//!     type: {message: Price}
//! - name: Price
//!   fields:
//!   - name: cents
//!     type: {scalar: int64}
//! "#,
//! )
//! .unwrap();
//! let book = parser.type_by_name("Book");
//!
//! let mut target = book.from_yaml("{name: Don Quixote}").unwrap();
//! let source = book.from_yaml("{price: {cents: 1500}}").unwrap();
//! let mask = SchemaMask::new(target.descriptor(), ["price.cents"]).unwrap();
//!
//! update(&mut target, &source, &mask).unwrap();
//! assert_eq!(target.to_json().unwrap(), r#"{"name":"Don Quixote","price":{"cents":1500}}"#);
//! ```

pub mod fieldmask;
pub mod message;
pub mod schema;
pub mod update;
pub mod value;

#[cfg(test)]
mod testdata;

pub use fieldmask::{all, FieldMask, Mask, SchemaMask};
pub use message::{DynamicMessage, FieldDescriptor, MessageDescriptor, MessageType, Parser};
pub use schema::Schema;
pub use update::{update, UpdateError, Updater, UpdaterBuilder};
pub use value::Value;
