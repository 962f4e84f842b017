//! Core schema elements and message definitions.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Schema is a list of named message definitions.
///
/// Message and field names are indexed on first lookup, so a schema should be
/// considered immutable once it has been searched.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<MessageDef>,

    #[serde(skip)]
    message_map: OnceCell<HashMap<String, usize>>,
}

impl Clone for Schema {
    fn clone(&self) -> Self {
        Schema {
            messages: self.messages.clone(),
            message_map: OnceCell::new(),
        }
    }
}

/// MessageDef is a named record type made of uniquely named fields.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MessageDef {
    pub name: String,

    /// Fields in declaration order. This is the order used when ranging over
    /// the populated fields of a message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDef>,

    #[serde(skip)]
    field_map: OnceCell<HashMap<String, usize>>,
}

impl Clone for MessageDef {
    fn clone(&self) -> Self {
        MessageDef {
            name: self.name.clone(),
            fields: self.fields.clone(),
            field_map: OnceCell::new(),
        }
    }
}

/// FieldDef pairs a field name with its declared type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Name of the oneof group this field belongs to. Members of the same
    /// group are mutually exclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oneof: Option<String>,

    /// Optional scalars track presence explicitly, so a default value is
    /// still considered populated.
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// FieldType declares the type of a field. Exactly one member must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scalar: Option<Scalar>,

    /// Name of a message defined in the same schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Repeated field of the given element type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<Box<FieldType>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<Box<MapType>>,
}

/// MapType describes a map field. Keys are always scalars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapType {
    pub key: Scalar,
    pub value: FieldType,
}

/// Scalar (AKA "primitive") value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scalar {
    Bool,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Float,
    Double,
    String,
    Bytes,
    /// Enum values are carried as their number.
    Enum,
}

impl Scalar {
    /// Returns the name used for this scalar in schema documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scalar::Bool => "bool",
            Scalar::Int32 => "int32",
            Scalar::Int64 => "int64",
            Scalar::Uint32 => "uint32",
            Scalar::Uint64 => "uint64",
            Scalar::Float => "float",
            Scalar::Double => "double",
            Scalar::String => "string",
            Scalar::Bytes => "bytes",
            Scalar::Enum => "enum",
        }
    }

    /// Returns true if values of this scalar may be used as map keys.
    pub fn is_valid_map_key(&self) -> bool {
        !matches!(
            self,
            Scalar::Float | Scalar::Double | Scalar::Bytes | Scalar::Enum
        )
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// TypeKind is a borrowed view of a well formed FieldType.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind<'a> {
    Scalar(Scalar),
    Message(&'a str),
    List(&'a FieldType),
    Map(&'a MapType),
}

impl FieldType {
    /// Creates a scalar field type.
    pub fn scalar(scalar: Scalar) -> Self {
        FieldType {
            scalar: Some(scalar),
            ..Default::default()
        }
    }

    /// Creates a message field type.
    pub fn message(name: impl Into<String>) -> Self {
        FieldType {
            message: Some(name.into()),
            ..Default::default()
        }
    }

    /// Creates a repeated field type.
    pub fn list(element: FieldType) -> Self {
        FieldType {
            list: Some(Box::new(element)),
            ..Default::default()
        }
    }

    /// Creates a map field type.
    pub fn map(key: Scalar, value: FieldType) -> Self {
        FieldType {
            map: Some(Box::new(MapType { key, value })),
            ..Default::default()
        }
    }

    /// Returns the kind of this type, or None unless exactly one member is set.
    pub fn kind(&self) -> Option<TypeKind<'_>> {
        match (&self.scalar, &self.message, &self.list, &self.map) {
            (Some(s), None, None, None) => Some(TypeKind::Scalar(*s)),
            (None, Some(m), None, None) => Some(TypeKind::Message(m)),
            (None, None, Some(l), None) => Some(TypeKind::List(l)),
            (None, None, None, Some(m)) => Some(TypeKind::Map(m)),
            _ => None,
        }
    }

    /// Returns a short human readable description, used in error messages.
    pub fn describe(&self) -> String {
        match self.kind() {
            Some(TypeKind::Scalar(s)) => s.to_string(),
            Some(TypeKind::Message(m)) => m.to_string(),
            Some(TypeKind::List(e)) => format!("list<{}>", e.describe()),
            Some(TypeKind::Map(m)) => format!("map<{}, {}>", m.key, m.value.describe()),
            None => "<invalid>".to_string(),
        }
    }
}

impl Schema {
    /// Creates a schema with the given message definitions.
    pub fn with_messages(messages: Vec<MessageDef>) -> Self {
        Schema {
            messages,
            message_map: OnceCell::new(),
        }
    }

    /// Returns the index of the named message, if it exists.
    pub fn find_message(&self, name: &str) -> Option<usize> {
        let map = self.message_map.get_or_init(|| {
            self.messages
                .iter()
                .enumerate()
                .map(|(i, m)| (m.name.clone(), i))
                .collect()
        });
        map.get(name).copied()
    }

    /// Returns the named message definition, if it exists.
    pub fn message(&self, name: &str) -> Option<&MessageDef> {
        self.find_message(name).map(|i| &self.messages[i])
    }
}

impl MessageDef {
    /// Creates a message definition with the given fields.
    pub fn with_fields(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        MessageDef {
            name: name.into(),
            fields,
            field_map: OnceCell::new(),
        }
    }

    /// Returns the index of the named field, if it exists.
    pub fn find_field(&self, name: &str) -> Option<usize> {
        let map = self.field_map.get_or_init(|| {
            self.fields
                .iter()
                .enumerate()
                .map(|(i, f)| (f.name.clone(), i))
                .collect()
        });
        map.get(name).copied()
    }
}

impl FieldDef {
    /// Creates a field definition.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        FieldDef {
            name: name.into(),
            field_type,
            ..Default::default()
        }
    }

    /// Places the field into a oneof group.
    pub fn in_oneof(mut self, oneof: impl Into<String>) -> Self {
        self.oneof = Some(oneof.into());
        self
    }

    /// Marks the field as tracking presence explicitly.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_serialization() {
        assert_eq!(serde_json::to_string(&Scalar::Int64).unwrap(), "\"int64\"");
        assert_eq!(serde_json::to_string(&Scalar::Uint32).unwrap(), "\"uint32\"");
        assert_eq!(serde_json::to_string(&Scalar::Bytes).unwrap(), "\"bytes\"");
        assert_eq!(Scalar::Double.to_string(), "double");
    }

    #[test]
    fn test_field_type_kind() {
        assert_eq!(
            FieldType::scalar(Scalar::String).kind(),
            Some(TypeKind::Scalar(Scalar::String))
        );
        assert_eq!(
            FieldType::message("Price").kind(),
            Some(TypeKind::Message("Price"))
        );
        assert!(matches!(
            FieldType::list(FieldType::scalar(Scalar::Int32)).kind(),
            Some(TypeKind::List(_))
        ));
        assert_eq!(FieldType::default().kind(), None);

        let ambiguous = FieldType {
            scalar: Some(Scalar::Bool),
            message: Some("Price".to_string()),
            ..Default::default()
        };
        assert_eq!(ambiguous.kind(), None);
    }

    #[test]
    fn test_field_type_describe() {
        let t = FieldType::map(Scalar::String, FieldType::list(FieldType::message("Price")));
        assert_eq!(t.describe(), "map<string, list<Price>>");
    }

    #[test]
    fn test_schema_from_yaml() {
        let schema: Schema = serde_yaml::from_str(
            r#"messages:
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
  - name: tags
    type:
      list:
        scalar: string
"#,
        )
        .unwrap();

        assert_eq!(schema.find_message("Price"), Some(0));
        assert_eq!(schema.find_message("Discount"), Some(1));
        assert_eq!(schema.find_message("Book"), None);

        let price = schema.message("Price").unwrap();
        assert_eq!(price.find_field("discount"), Some(1));
        assert_eq!(price.find_field("Cents"), None);
        assert_eq!(
            price.fields[1].field_type,
            FieldType::message("Discount")
        );
    }

    #[test]
    fn test_clone_resets_index() {
        let schema = Schema::with_messages(vec![MessageDef::with_fields(
            "Error",
            vec![FieldDef::new("message", FieldType::scalar(Scalar::String))],
        )]);
        assert!(schema.find_message("Error").is_some());

        let copy = schema.clone();
        assert_eq!(copy.find_message("Error"), Some(0));
        assert_eq!(copy.messages[0].find_field("message"), Some(0));
    }
}
