//! Dynamic, descriptor-driven message instances.

use super::descriptor::{FieldDescriptor, MessageDescriptor};
use crate::value::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// FieldError is returned when a value cannot be stored in a field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{field}: type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("{field} is not a field of {message}")]
    ForeignField { field: String, message: String },

    #[error("{message} has no field named '{field}'")]
    UnknownField { message: String, field: String },
}

/// DynamicMessage is a message instance whose layout is given by a
/// [`MessageDescriptor`] at runtime.
///
/// Only populated fields are stored. Storage is normalized on write, so
/// presence can be answered by looking a field up:
///
/// - fields without presence are cleared when set to their zero value,
///   and lists and maps are cleared when set empty;
/// - setting a oneof member clears the other members of its group.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicMessage {
    descriptor: MessageDescriptor,
    fields: BTreeMap<usize, Value>,
}

impl DynamicMessage {
    /// Creates an empty message of the given type.
    pub fn new(descriptor: MessageDescriptor) -> Self {
        DynamicMessage {
            descriptor,
            fields: BTreeMap::new(),
        }
    }

    /// Returns the descriptor of this message's type.
    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.descriptor
    }

    /// Returns true if no field is populated.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns true if the field is populated on this message.
    pub fn has(&self, field: &FieldDescriptor) -> bool {
        self.owns(field) && self.fields.contains_key(&field.index())
    }

    /// Returns the value of a populated field.
    pub fn get(&self, field: &FieldDescriptor) -> Option<&Value> {
        if !self.owns(field) {
            return None;
        }
        self.fields.get(&field.index())
    }

    /// Returns the value of a populated field for in-place modification.
    ///
    /// Writes through this reference bypass normalization and type checks.
    pub fn get_mut(&mut self, field: &FieldDescriptor) -> Option<&mut Value> {
        if !self.owns(field) {
            return None;
        }
        self.fields.get_mut(&field.index())
    }

    /// Returns the nested message stored in a populated message field.
    pub fn get_message(&self, field: &FieldDescriptor) -> Option<&DynamicMessage> {
        self.get(field).and_then(Value::as_message)
    }

    /// Returns the nested message stored in a populated message field.
    pub fn get_message_mut(&mut self, field: &FieldDescriptor) -> Option<&mut DynamicMessage> {
        self.get_mut(field).and_then(Value::as_message_mut)
    }

    /// Returns the nested message stored in a message field, first assigning
    /// a new empty message to the field if it is not populated.
    ///
    /// Returns None if the field is not a singular message field.
    pub fn get_message_or_insert(&mut self, field: &FieldDescriptor) -> Option<&mut DynamicMessage> {
        if !self.owns(field) {
            return None;
        }
        if !self.has(field) {
            let nested = self.new_field(field)?;
            tracing::trace!(field = %field.full_name(), "initializing nested message");
            self.clear_oneof_siblings(field);
            self.fields.insert(field.index(), Value::Message(nested));
        }
        self.get_message_mut(field)
    }

    /// Creates a new empty message of a message field's type, without
    /// assigning it.
    pub fn new_field(&self, field: &FieldDescriptor) -> Option<DynamicMessage> {
        field.message_type().map(DynamicMessage::new)
    }

    /// Replaces the value of a field.
    ///
    /// Zero values clear fields without presence, and setting a oneof member
    /// makes it the active member of its group.
    pub fn set(&mut self, field: &FieldDescriptor, value: Value) -> Result<(), FieldError> {
        if !self.owns(field) {
            return Err(FieldError::ForeignField {
                field: field.full_name(),
                message: self.descriptor.name().to_string(),
            });
        }
        if !field.is_compatible(&value) {
            return Err(FieldError::TypeMismatch {
                field: field.full_name(),
                expected: field.field_type().describe(),
                actual: value.type_name(),
            });
        }

        if !field.has_presence() && value.is_default() {
            self.fields.remove(&field.index());
            return Ok(());
        }
        self.clear_oneof_siblings(field);
        self.fields.insert(field.index(), value);
        Ok(())
    }

    /// Resets a field to not populated.
    pub fn clear(&mut self, field: &FieldDescriptor) {
        if self.owns(field) {
            self.fields.remove(&field.index());
        }
    }

    /// Returns the populated fields and their values in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (FieldDescriptor, &Value)> + '_ {
        self.fields.iter().filter_map(move |(index, value)| {
            self.descriptor.field(*index).map(|field| (field, value))
        })
    }

    /// Returns the value of a populated field, looked up by name.
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        let field = self.descriptor.field_by_name(name)?;
        self.get(&field)
    }

    /// Replaces the value of a field, looked up by name.
    pub fn set_by_name(&mut self, name: &str, value: impl Into<Value>) -> Result<(), FieldError> {
        let field = self.field_named(name)?;
        self.set(&field, value.into())
    }

    /// Resets a field, looked up by name, to not populated.
    pub fn clear_by_name(&mut self, name: &str) -> Result<(), FieldError> {
        let field = self.field_named(name)?;
        self.clear(&field);
        Ok(())
    }

    fn field_named(&self, name: &str) -> Result<FieldDescriptor, FieldError> {
        self.descriptor
            .field_by_name(name)
            .ok_or_else(|| FieldError::UnknownField {
                message: self.descriptor.name().to_string(),
                field: name.to_string(),
            })
    }

    fn owns(&self, field: &FieldDescriptor) -> bool {
        field.parent() == &self.descriptor
    }

    fn clear_oneof_siblings(&mut self, field: &FieldDescriptor) {
        let Some(oneof) = field.containing_oneof() else {
            return;
        };
        let siblings: Vec<usize> = self
            .descriptor
            .fields()
            .filter(|f| f.index() != field.index() && f.containing_oneof() == Some(oneof))
            .map(|f| f.index())
            .collect();
        for index in siblings {
            self.fields.remove(&index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_and_get() {
        let mut book = testdata::book("{}");
        book.set_by_name("id", 1605i64).unwrap();
        book.set_by_name("name", "Don Quixote").unwrap();

        assert_eq!(book.get_by_name("id"), Some(&Value::I64(1605)));
        assert_eq!(book.get_by_name("name"), Some(&Value::from("Don Quixote")));
        assert_eq!(book.get_by_name("price"), None);
    }

    #[test]
    fn test_set_type_mismatch() {
        let mut book = testdata::book("{}");
        let err = book.set_by_name("id", "1605").unwrap_err();
        assert_eq!(
            err,
            FieldError::TypeMismatch {
                field: "Book.id".to_string(),
                expected: "int64".to_string(),
                actual: "string".to_string(),
            }
        );
        assert!(book.is_empty());

        assert!(matches!(
            book.set_by_name("isbn", "x"),
            Err(FieldError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_foreign_field() {
        let mut book = testdata::book("{}");
        let price = testdata::parser().type_by_name("Price").descriptor().unwrap();
        let cents = price.field_by_name("cents").unwrap();
        assert!(matches!(
            book.set(&cents, Value::I64(1)),
            Err(FieldError::ForeignField { .. })
        ));
        assert!(!book.has(&cents));
        assert_eq!(book.get(&cents), None);
    }

    #[test]
    fn test_implicit_presence_zero_value_clears() {
        let mut book = testdata::book("{id: 1605, name: Don Quixote, tags: [classic]}");
        book.set_by_name("id", 0i64).unwrap();
        book.set_by_name("tags", Value::List(vec![])).unwrap();

        assert_eq!(book.get_by_name("id"), None);
        assert_eq!(book.get_by_name("tags"), None);
        assert_eq!(book.get_by_name("name"), Some(&Value::from("Don Quixote")));
    }

    #[test]
    fn test_explicit_presence_keeps_zero_value() {
        let mut book = testdata::book("{}");
        book.set_by_name("subtitle", "").unwrap();
        assert_eq!(book.get_by_name("subtitle"), Some(&Value::from("")));

        let price = book.descriptor().field_by_name("price").unwrap();
        let empty_price = book.new_field(&price).unwrap();
        book.set(&price, Value::Message(empty_price)).unwrap();
        assert!(book.get_by_name("price").is_some());
    }

    #[test]
    fn test_oneof_switches_case() {
        let mut reply = testdata::message("PriceReply", "{error: {message: unknown price}}");
        let price_field = reply.descriptor().field_by_name("price").unwrap();
        let mut price = reply.new_field(&price_field).unwrap();
        price.set_by_name("cents", 1500i64).unwrap();
        reply.set(&price_field, Value::Message(price.clone())).unwrap();

        assert_eq!(reply.get_by_name("error"), None);
        assert_eq!(reply.get_by_name("price"), Some(&Value::Message(price)));
    }

    #[test]
    fn test_clear() {
        let mut book = testdata::book("{id: 1605, price: {cents: 1500}}");
        book.clear_by_name("price").unwrap();
        assert_eq!(book.get_by_name("price"), None);
        assert_eq!(book.get_by_name("id"), Some(&Value::I64(1605)));
    }

    #[test]
    fn test_get_message_or_insert() {
        let mut book = testdata::book("{}");
        let price = book.descriptor().field_by_name("price").unwrap();
        let id = book.descriptor().field_by_name("id").unwrap();

        let nested = book.get_message_or_insert(&price).unwrap();
        assert!(nested.is_empty());
        nested.set_by_name("cents", 1500i64).unwrap();

        assert!(book.get_message_or_insert(&id).is_none());
        assert_eq!(
            book.get_message(&price).unwrap().get_by_name("cents"),
            Some(&Value::I64(1500))
        );

        // An already populated message is returned as is.
        let again = book.get_message_or_insert(&price).unwrap();
        assert_eq!(again.get_by_name("cents"), Some(&Value::I64(1500)));
    }

    #[test]
    fn test_fields_in_schema_order() {
        let mut book = testdata::book("{}");
        book.set_by_name("tags", Value::List(vec![Value::from("classic")]))
            .unwrap();
        book.set_by_name("name", "Don Quixote").unwrap();
        book.set_by_name("id", 1605i64).unwrap();

        let names: Vec<String> = book.fields().map(|(f, _)| f.name().to_string()).collect();
        assert_eq!(names, vec!["id", "name", "tags"]);
    }

    #[test]
    fn test_new_field() {
        let book = testdata::book("{}");
        let price = book.descriptor().field_by_name("price").unwrap();
        let nested = book.new_field(&price).unwrap();
        assert_eq!(nested.descriptor().name(), "Price");
        assert!(!book.has(&price));
    }
}
