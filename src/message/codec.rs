//! JSON/YAML document encoding of dynamic messages.
//!
//! Documents use field names as keys. Nested messages are objects, lists are
//! arrays and map keys are always strings. Bytes are arrays of octets; a
//! string is accepted too and taken as its UTF-8 encoding. `null` leaves a
//! field unset.

use super::descriptor::{FieldDescriptor, MessageDescriptor};
use super::dynamic::{DynamicMessage, FieldError};
use crate::schema::{FieldType, Scalar, TypeKind};
use crate::value::{MapKey, Value};
use serde_json::{Map as JsonMap, Number, Value as Json};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// DecodeError represents an error while reading a message document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("failed to parse document: {message}")]
    Syntax { message: String },

    #[error("unknown message type: {name}")]
    UnknownMessage { name: String },

    #[error("{path}: unknown field")]
    UnknownField { path: String },

    #[error("{path}: type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("{path}: more than one member of oneof '{oneof}' is set")]
    MultipleOneofMembers { path: String, oneof: String },

    #[error(transparent)]
    Field(#[from] FieldError),
}

impl DecodeError {
    /// Creates a syntax error.
    pub fn syntax(message: impl Into<String>) -> Self {
        DecodeError::Syntax {
            message: message.into(),
        }
    }

    fn mismatch(path: &str, expected: impl Into<String>, actual: &Json) -> Self {
        let path = if path.is_empty() { ROOT } else { path };
        DecodeError::TypeMismatch {
            path: path.to_string(),
            expected: expected.into(),
            actual: json_type(actual).to_string(),
        }
    }
}

/// Path reported for errors on the document itself.
const ROOT: &str = "<root>";

fn json_type(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}

/// Decodes a message of the given type from a JSON value. An empty (null)
/// document decodes to an empty message.
pub fn decode_message(descriptor: &MessageDescriptor, doc: &Json) -> Result<DynamicMessage, DecodeError> {
    if doc.is_null() {
        return Ok(DynamicMessage::new(descriptor.clone()));
    }
    decode_at(descriptor, doc, "")
}

fn decode_at(descriptor: &MessageDescriptor, doc: &Json, path: &str) -> Result<DynamicMessage, DecodeError> {
    let object = doc
        .as_object()
        .ok_or_else(|| DecodeError::mismatch(path, descriptor.name(), doc))?;

    let mut message = DynamicMessage::new(descriptor.clone());
    let mut active_oneofs: HashMap<String, String> = HashMap::new();

    for (name, value) in object {
        let field_path = join(path, name);
        let field = descriptor
            .field_by_name(name)
            .ok_or_else(|| DecodeError::UnknownField {
                path: field_path.clone(),
            })?;
        if value.is_null() {
            continue;
        }

        if let Some(oneof) = field.containing_oneof() {
            if active_oneofs.insert(oneof.to_string(), name.clone()).is_some() {
                return Err(DecodeError::MultipleOneofMembers {
                    path: field_path,
                    oneof: oneof.to_string(),
                });
            }
        }

        let decoded = decode_field(&field, value, &field_path)?;
        message.set(&field, decoded)?;
    }
    Ok(message)
}

fn decode_field(field: &FieldDescriptor, value: &Json, path: &str) -> Result<Value, DecodeError> {
    decode_typed(field.parent(), field.field_type(), value, path)
}

fn decode_typed(
    scope: &MessageDescriptor,
    field_type: &FieldType,
    value: &Json,
    path: &str,
) -> Result<Value, DecodeError> {
    match field_type.kind() {
        Some(TypeKind::Scalar(scalar)) => decode_scalar(scalar, value, path),
        Some(TypeKind::Message(name)) => {
            let nested = scope
                .sibling(name)
                .ok_or_else(|| DecodeError::UnknownMessage {
                    name: name.to_string(),
                })?;
            decode_at(&nested, value, path).map(Value::Message)
        }
        Some(TypeKind::List(element)) => {
            let items = value
                .as_array()
                .ok_or_else(|| DecodeError::mismatch(path, field_type.describe(), value))?;
            items
                .iter()
                .enumerate()
                .map(|(i, item)| decode_typed(scope, element, item, &format!("{}[{}]", path, i)))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List)
        }
        Some(TypeKind::Map(map)) => {
            let entries = value
                .as_object()
                .ok_or_else(|| DecodeError::mismatch(path, field_type.describe(), value))?;
            let mut out = BTreeMap::new();
            for (key, item) in entries {
                let entry_path = format!("{}[{}]", path, key);
                let key = MapKey::parse(map.key, key).ok_or_else(|| DecodeError::TypeMismatch {
                    path: entry_path.clone(),
                    expected: format!("{} key", map.key),
                    actual: "string".to_string(),
                })?;
                out.insert(key, decode_typed(scope, &map.value, item, &entry_path)?);
            }
            Ok(Value::Map(out))
        }
        None => Err(DecodeError::mismatch(path, field_type.describe(), value)),
    }
}

fn decode_scalar(scalar: Scalar, value: &Json, path: &str) -> Result<Value, DecodeError> {
    let mismatch = || DecodeError::mismatch(path, scalar.as_str(), value);
    let decoded = match scalar {
        Scalar::Bool => value.as_bool().map(Value::Bool),
        Scalar::Int32 => integer(value).and_then(|i| i32::try_from(i).ok()).map(Value::I32),
        Scalar::Int64 => integer(value).map(Value::I64),
        Scalar::Uint32 => unsigned(value).and_then(|u| u32::try_from(u).ok()).map(Value::U32),
        Scalar::Uint64 => unsigned(value).map(Value::U64),
        Scalar::Float => float(value)
            .filter(|f| !f.is_finite() || (*f as f32).is_finite())
            .map(|f| Value::F32(f as f32)),
        Scalar::Double => float(value).map(Value::F64),
        Scalar::String => value.as_str().map(|s| Value::String(s.to_string())),
        Scalar::Bytes => bytes(value).map(Value::Bytes),
        Scalar::Enum => integer(value)
            .and_then(|i| i32::try_from(i).ok())
            .map(Value::EnumNumber),
    };
    decoded.ok_or_else(mismatch)
}

// 64-bit integers may be quoted, as in the protobuf JSON mapping.
fn integer(value: &Json) -> Option<i64> {
    match value {
        Json::Number(n) => n.as_i64(),
        Json::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn unsigned(value: &Json) -> Option<u64> {
    match value {
        Json::Number(n) => n.as_u64(),
        Json::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn float(value: &Json) -> Option<f64> {
    match value {
        Json::Number(n) => n.as_f64(),
        Json::String(s) => match s.as_str() {
            "NaN" => Some(f64::NAN),
            "Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            _ => None,
        },
        _ => None,
    }
}

fn bytes(value: &Json) -> Option<Vec<u8>> {
    match value {
        Json::String(s) => Some(s.as_bytes().to_vec()),
        Json::Array(items) => items
            .iter()
            .map(|i| i.as_u64().and_then(|b| u8::try_from(b).ok()))
            .collect(),
        _ => None,
    }
}

/// Encodes a message as a JSON value. Unpopulated fields are omitted.
pub fn encode_message(message: &DynamicMessage) -> Json {
    let mut object = JsonMap::new();
    for (field, value) in message.fields() {
        object.insert(field.name().to_string(), encode_value(value));
    }
    Json::Object(object)
}

fn encode_value(value: &Value) -> Json {
    match value {
        Value::Bool(b) => Json::Bool(*b),
        Value::I32(i) | Value::EnumNumber(i) => Json::from(*i),
        Value::I64(i) => Json::from(*i),
        Value::U32(u) => Json::from(*u),
        Value::U64(u) => Json::from(*u),
        Value::F32(f) => encode_float(f64::from(*f)),
        Value::F64(f) => encode_float(*f),
        Value::String(s) => Json::String(s.clone()),
        Value::Bytes(b) => Json::Array(b.iter().map(|o| Json::from(*o)).collect()),
        Value::Message(m) => encode_message(m),
        Value::List(items) => Json::Array(items.iter().map(encode_value).collect()),
        Value::Map(entries) => Json::Object(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), encode_value(v)))
                .collect(),
        ),
    }
}

fn encode_float(f: f64) -> Json {
    match Number::from_f64(f) {
        Some(n) => Json::Number(n),
        None if f.is_nan() => Json::String("NaN".to_string()),
        None if f > 0.0 => Json::String("Infinity".to_string()),
        None => Json::String("-Infinity".to_string()),
    }
}

impl DynamicMessage {
    /// Encodes this message as a JSON value.
    pub fn to_json_value(&self) -> Json {
        encode_message(self)
    }

    /// Serializes this message to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_json_value())
    }

    /// Serializes this message to a YAML string.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.to_json_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn book_descriptor() -> MessageDescriptor {
        testdata::parser().type_by_name("Book").descriptor().unwrap()
    }

    #[test]
    fn test_decode_nested() {
        let book = decode_message(
            &book_descriptor(),
            &json!({
                "id": "1605",
                "name": "Don Quixote",
                "price": {"cents": 1500, "discount": {"expires_at": 1700000000}},
                "tags": ["classic", "novel"],
                "stock": {"eu": 3, "us": 0}
            }),
        )
        .unwrap();

        assert_eq!(book.get_by_name("id"), Some(&Value::I64(1605)));
        let price = book.get_by_name("price").unwrap().as_message().unwrap();
        assert_eq!(price.get_by_name("cents"), Some(&Value::I64(1500)));
        let discount = price.get_by_name("discount").unwrap().as_message().unwrap();
        assert_eq!(discount.get_by_name("expires_at"), Some(&Value::I64(1700000000)));
        assert_eq!(
            book.get_by_name("tags").unwrap().as_list().unwrap().len(),
            2
        );
        assert_eq!(
            book.get_by_name("stock").unwrap().as_map().unwrap().get(&MapKey::from("us")),
            Some(&Value::I32(0))
        );
    }

    #[test]
    fn test_decode_null_and_zero() {
        let book = decode_message(&book_descriptor(), &json!({"id": 0, "price": null})).unwrap();
        assert!(book.is_empty());
    }

    #[test]
    fn test_decode_errors() {
        let desc = book_descriptor();
        assert_eq!(
            decode_message(&desc, &json!({"price": {"dollars": 15}})),
            Err(DecodeError::UnknownField {
                path: "price.dollars".to_string()
            })
        );
        assert_eq!(
            decode_message(&desc, &json!({"id": "abc"})),
            Err(DecodeError::TypeMismatch {
                path: "id".to_string(),
                expected: "int64".to_string(),
                actual: "string".to_string(),
            })
        );
        assert!(matches!(
            decode_message(&desc, &json!({"tags": ["a", 1]})),
            Err(DecodeError::TypeMismatch { path, .. }) if path == "tags[1]"
        ));
        assert!(matches!(
            decode_message(&desc, &json!([])),
            Err(DecodeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_decode_empty_document() {
        let desc = book_descriptor();
        let book = decode_message(&desc, &Json::Null).unwrap();
        assert!(book.is_empty());
        assert_eq!(book.descriptor(), &desc);

        let book = testdata::parser().type_by_name("Book").from_yaml("").unwrap();
        assert!(book.is_empty());
    }

    #[test]
    fn test_decode_root_mismatch() {
        let err = decode_message(&book_descriptor(), &json!([])).unwrap_err();
        assert_eq!(err.to_string(), "<root>: type mismatch: expected Book, got array");
    }

    #[test]
    fn test_decode_float_range() {
        assert_eq!(
            decode_scalar(Scalar::Float, &json!(1.5), "weight"),
            Ok(Value::F32(1.5))
        );
        assert_eq!(
            decode_scalar(Scalar::Float, &json!(1e300), "weight"),
            Err(DecodeError::TypeMismatch {
                path: "weight".to_string(),
                expected: "float".to_string(),
                actual: "number".to_string(),
            })
        );
        assert_eq!(
            decode_scalar(Scalar::Float, &json!("Infinity"), "weight"),
            Ok(Value::F32(f32::INFINITY))
        );
        assert_eq!(
            decode_scalar(Scalar::Double, &json!(1e300), "weight"),
            Ok(Value::F64(1e300))
        );
    }

    #[test]
    fn test_field_error_is_not_rewrapped() {
        let err: DecodeError = FieldError::UnknownField {
            message: "Book".to_string(),
            field: "isbn".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Book has no field named 'isbn'");
    }

    #[test]
    fn test_decode_oneof_conflict() {
        let reply = testdata::parser().type_by_name("PriceReply").descriptor().unwrap();
        let err = decode_message(
            &reply,
            &json!({"price": {"cents": 1}, "error": {"message": "unknown price"}}),
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::MultipleOneofMembers { oneof, .. } if oneof == "response"));
    }

    #[test]
    fn test_encode() {
        let book = testdata::book(
            "{id: 1605, name: Don Quixote, price: {cents: 1500}, stock: {eu: 3}}",
        );
        assert_eq!(
            book.to_json_value(),
            json!({
                "id": 1605,
                "name": "Don Quixote",
                "price": {"cents": 1500},
                "stock": {"eu": 3}
            })
        );
    }

    #[test]
    fn test_encode_special_floats() {
        assert_eq!(encode_float(f64::NAN), json!("NaN"));
        assert_eq!(encode_float(f64::NEG_INFINITY), json!("-Infinity"));
        assert_eq!(encode_float(1.5), json!(1.5));
    }
}
