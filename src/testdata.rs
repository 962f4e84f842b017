//! Shared schema and helpers for tests.

use crate::message::{DynamicMessage, Parser};

pub(crate) const BOOK_SCHEMA_YAML: &str = r#"messages:
- name: Book
  fields:
  - name: id
    type:
      scalar: int64
  - name: name
    type:
      scalar: string
  - name: price
    type:
      message: Price
  - name: subtitle
    optional: true
    type:
      scalar: string
  - name: tags
    type:
      list:
        scalar: string
  - name: stock
    type:
      map:
        key: string
        value:
          scalar: int32
  - name: editions
    type:
      list:
        message: Price
- name: Price
  fields:
  - name: cents
    type:
      scalar: int64
  - name: discount
    type:
      message: Discount
- name: Discount
  fields:
  - name: full_price
    type:
      message: Price
  - name: expires_at
    type:
      scalar: int64
- name: Error
  fields:
  - name: message
    type:
      scalar: string
- name: PriceReply
  fields:
  - name: price
    oneof: response
    type:
      message: Price
  - name: error
    oneof: response
    type:
      message: Error
"#;

pub(crate) fn parser() -> Parser {
    Parser::new(BOOK_SCHEMA_YAML).expect("book schema should parse")
}

/// Parses a message of the named type. All messages built through this
/// helper share one schema per call, so use [`messages`] when a test needs
/// several messages of compatible types.
pub(crate) fn message(type_name: &str, yaml: &str) -> DynamicMessage {
    parser()
        .type_by_name(type_name)
        .from_yaml(yaml)
        .unwrap_or_else(|e| panic!("failed to parse {}: {}", type_name, e))
}

pub(crate) fn book(yaml: &str) -> DynamicMessage {
    message("Book", yaml)
}

/// Parses several messages of the same type against one shared schema.
pub(crate) fn messages<const N: usize>(type_name: &str, docs: [&str; N]) -> [DynamicMessage; N] {
    let message_type = parser().type_by_name(type_name);
    docs.map(|yaml| {
        message_type
            .from_yaml(yaml)
            .unwrap_or_else(|e| panic!("failed to parse {}: {}", type_name, e))
    })
}
