//! Message and field descriptors compiled from a validated schema.

use crate::schema::{FieldDef, FieldType, MessageDef, Scalar, Schema, TypeKind};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// MessageDescriptor describes one message type of a schema.
///
/// Descriptors are cheap handles into a shared schema; two descriptors are
/// equal only if they point at the same message of the same schema instance.
#[derive(Clone)]
pub struct MessageDescriptor {
    schema: Arc<Schema>,
    index: usize,
}

/// FieldDescriptor describes one field of a message type.
#[derive(Clone, PartialEq)]
pub struct FieldDescriptor {
    parent: MessageDescriptor,
    index: usize,
}

/// Kind classifies a field by how its value is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Scalar(Scalar),
    Message,
    List,
    Map,
}

impl MessageDescriptor {
    /// Returns the descriptor of the named message, if the schema defines it.
    ///
    /// The schema must have passed [`Schema::validate`].
    pub(crate) fn new(schema: Arc<Schema>, name: &str) -> Option<Self> {
        let index = schema.find_message(name)?;
        Some(MessageDescriptor { schema, index })
    }

    /// Returns the message name.
    pub fn name(&self) -> &str {
        &self.def().name
    }

    /// Returns all fields of this message in schema order.
    pub fn fields(&self) -> impl Iterator<Item = FieldDescriptor> + '_ {
        (0..self.def().fields.len()).map(move |index| FieldDescriptor {
            parent: self.clone(),
            index,
        })
    }

    /// Looks up a field by its exact name.
    pub fn field_by_name(&self, name: &str) -> Option<FieldDescriptor> {
        self.def().find_field(name).map(|index| FieldDescriptor {
            parent: self.clone(),
            index,
        })
    }

    /// Returns the field at the given schema position.
    pub fn field(&self, index: usize) -> Option<FieldDescriptor> {
        (index < self.def().fields.len()).then(|| FieldDescriptor {
            parent: self.clone(),
            index,
        })
    }

    pub(crate) fn def(&self) -> &MessageDef {
        &self.schema.messages[self.index]
    }

    /// Returns the descriptor of another message of the same schema.
    pub(crate) fn sibling(&self, name: &str) -> Option<MessageDescriptor> {
        MessageDescriptor::new(self.schema.clone(), name)
    }
}

impl PartialEq for MessageDescriptor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.schema, &other.schema) && self.index == other.index
    }
}

impl Eq for MessageDescriptor {}

impl fmt::Debug for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MessageDescriptor").field(&self.name()).finish()
    }
}

impl fmt::Display for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FieldDescriptor {
    /// Returns the field name.
    pub fn name(&self) -> &str {
        &self.def().name
    }

    /// Returns the position of this field in its message.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the message this field belongs to.
    pub fn parent(&self) -> &MessageDescriptor {
        &self.parent
    }

    /// Returns the qualified name, e.g. `Book.price`.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.parent.name(), self.name())
    }

    /// Returns the declared type.
    pub fn field_type(&self) -> &FieldType {
        &self.def().field_type
    }

    /// Returns how values of this field are stored.
    pub fn kind(&self) -> Kind {
        match self.field_type().kind() {
            Some(TypeKind::Scalar(s)) => Kind::Scalar(s),
            Some(TypeKind::Message(_)) => Kind::Message,
            Some(TypeKind::List(_)) => Kind::List,
            Some(TypeKind::Map(_)) => Kind::Map,
            None => unreachable!("validated schemas only contain well formed field types"),
        }
    }

    /// Returns true if this is a singular message field.
    pub fn is_message(&self) -> bool {
        self.kind() == Kind::Message
    }

    pub fn is_list(&self) -> bool {
        self.kind() == Kind::List
    }

    pub fn is_map(&self) -> bool {
        self.kind() == Kind::Map
    }

    /// Returns the name of the oneof group containing this field.
    pub fn containing_oneof(&self) -> Option<&str> {
        self.def().oneof.as_deref()
    }

    /// Returns true if the field distinguishes "set to the zero value" from
    /// "not set". Fields without presence are cleared by zero values.
    pub fn has_presence(&self) -> bool {
        self.is_message() || self.def().oneof.is_some() || self.def().optional
    }

    /// Returns the descriptor of a singular message field's type.
    pub fn message_type(&self) -> Option<MessageDescriptor> {
        match self.field_type().kind() {
            Some(TypeKind::Message(name)) => self.parent.sibling(name),
            _ => None,
        }
    }

    /// Returns true if the value may be stored in this field.
    pub fn is_compatible(&self, value: &Value) -> bool {
        value_matches(&self.parent, self.field_type(), value)
    }

    fn def(&self) -> &FieldDef {
        &self.parent.def().fields[self.index]
    }
}

fn value_matches(scope: &MessageDescriptor, field_type: &FieldType, value: &Value) -> bool {
    match (field_type.kind(), value) {
        (Some(TypeKind::Scalar(s)), _) => value.matches_scalar(s),
        (Some(TypeKind::Message(name)), Value::Message(m)) => {
            scope.sibling(name).as_ref() == Some(m.descriptor())
        }
        (Some(TypeKind::List(element)), Value::List(items)) => items
            .iter()
            .all(|item| !item.is_list() && !item.is_map() && value_matches(scope, element, item)),
        (Some(TypeKind::Map(map)), Value::Map(entries)) => entries.iter().all(|(key, item)| {
            key.matches_scalar(map.key)
                && !item.is_list()
                && !item.is_map()
                && value_matches(scope, &map.value, item)
        }),
        _ => false,
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldDescriptor")
            .field(&self.full_name())
            .finish()
    }
}
