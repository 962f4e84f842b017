//! Core value types and operations.

use crate::message::DynamicMessage;
use crate::schema::Scalar;
use std::collections::BTreeMap;
use std::fmt;

/// Value is the content of a single message field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
    EnumNumber(i32),
    Message(DynamicMessage),
    List(Vec<Value>),
    Map(BTreeMap<MapKey, Value>),
}

/// MapKey is the key of a map field entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    String(String),
}

impl Value {
    /// Returns the zero value of a scalar type.
    pub fn default_for(scalar: Scalar) -> Value {
        match scalar {
            Scalar::Bool => Value::Bool(false),
            Scalar::Int32 => Value::I32(0),
            Scalar::Int64 => Value::I64(0),
            Scalar::Uint32 => Value::U32(0),
            Scalar::Uint64 => Value::U64(0),
            Scalar::Float => Value::F32(0.0),
            Scalar::Double => Value::F64(0.0),
            Scalar::String => Value::String(String::new()),
            Scalar::Bytes => Value::Bytes(Vec::new()),
            Scalar::Enum => Value::EnumNumber(0),
        }
    }

    /// Returns true if this is the zero value of its type.
    ///
    /// Empty lists and maps are zero values, messages never are.
    pub fn is_default(&self) -> bool {
        match self {
            Value::Bool(b) => !*b,
            Value::I32(i) | Value::EnumNumber(i) => *i == 0,
            Value::I64(i) => *i == 0,
            Value::U32(u) => *u == 0,
            Value::U64(u) => *u == 0,
            Value::F32(f) => *f == 0.0 && f.is_sign_positive(),
            Value::F64(f) => *f == 0.0 && f.is_sign_positive(),
            Value::String(s) => s.is_empty(),
            Value::Bytes(b) => b.is_empty(),
            Value::Message(_) => false,
            Value::List(l) => l.is_empty(),
            Value::Map(m) => m.is_empty(),
        }
    }

    /// Returns true if this value holds the given scalar type.
    pub fn matches_scalar(&self, scalar: Scalar) -> bool {
        matches!(
            (self, scalar),
            (Value::Bool(_), Scalar::Bool)
                | (Value::I32(_), Scalar::Int32)
                | (Value::I64(_), Scalar::Int64)
                | (Value::U32(_), Scalar::Uint32)
                | (Value::U64(_), Scalar::Uint64)
                | (Value::F32(_), Scalar::Float)
                | (Value::F64(_), Scalar::Double)
                | (Value::String(_), Scalar::String)
                | (Value::Bytes(_), Scalar::Bytes)
                | (Value::EnumNumber(_), Scalar::Enum)
        )
    }

    /// Returns the name of this value's type, used in error messages.
    pub fn type_name(&self) -> String {
        match self {
            Value::Bool(_) => "bool".to_string(),
            Value::I32(_) => "int32".to_string(),
            Value::I64(_) => "int64".to_string(),
            Value::U32(_) => "uint32".to_string(),
            Value::U64(_) => "uint64".to_string(),
            Value::F32(_) => "float".to_string(),
            Value::F64(_) => "double".to_string(),
            Value::String(_) => "string".to_string(),
            Value::Bytes(_) => "bytes".to_string(),
            Value::EnumNumber(_) => "enum".to_string(),
            Value::Message(m) => m.descriptor().name().to_string(),
            Value::List(_) => "list".to_string(),
            Value::Map(_) => "map".to_string(),
        }
    }

    pub fn is_message(&self) -> bool {
        matches!(self, Value::Message(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::U32(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U64(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::F32(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_enum_number(&self) -> Option<i32> {
        match self {
            Value::EnumNumber(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&DynamicMessage> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_message_mut(&mut self) -> Option<&mut DynamicMessage> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<MapKey, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::I32(i)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::I64(i)
    }
}

impl From<u32> for Value {
    fn from(u: u32) -> Self {
        Value::U32(u)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::U64(u)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::F32(f)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::F64(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DynamicMessage> for Value {
    fn from(m: DynamicMessage) -> Self {
        Value::Message(m)
    }
}

impl MapKey {
    /// Returns true if this key holds the given scalar type.
    pub fn matches_scalar(&self, scalar: Scalar) -> bool {
        matches!(
            (self, scalar),
            (MapKey::Bool(_), Scalar::Bool)
                | (MapKey::I32(_), Scalar::Int32)
                | (MapKey::I64(_), Scalar::Int64)
                | (MapKey::U32(_), Scalar::Uint32)
                | (MapKey::U64(_), Scalar::Uint64)
                | (MapKey::String(_), Scalar::String)
        )
    }

    /// Parses a key of the given scalar type from its textual form.
    pub fn parse(scalar: Scalar, text: &str) -> Option<MapKey> {
        match scalar {
            Scalar::Bool => text.parse().ok().map(MapKey::Bool),
            Scalar::Int32 => text.parse().ok().map(MapKey::I32),
            Scalar::Int64 => text.parse().ok().map(MapKey::I64),
            Scalar::Uint32 => text.parse().ok().map(MapKey::U32),
            Scalar::Uint64 => text.parse().ok().map(MapKey::U64),
            Scalar::String => Some(MapKey::String(text.to_string())),
            _ => None,
        }
    }
}

impl From<&str> for MapKey {
    fn from(s: &str) -> Self {
        MapKey::String(s.to_string())
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Bool(b) => write!(f, "{}", b),
            MapKey::I32(i) => write!(f, "{}", i),
            MapKey::I64(i) => write!(f, "{}", i),
            MapKey::U32(u) => write!(f, "{}", u),
            MapKey::U64(u) => write!(f, "{}", u),
            MapKey::String(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        for scalar in [
            Scalar::Bool,
            Scalar::Int32,
            Scalar::Int64,
            Scalar::Uint32,
            Scalar::Uint64,
            Scalar::Float,
            Scalar::Double,
            Scalar::String,
            Scalar::Bytes,
            Scalar::Enum,
        ] {
            let v = Value::default_for(scalar);
            assert!(v.is_default(), "{} default should be a zero value", scalar);
            assert!(v.matches_scalar(scalar));
        }

        assert!(!Value::I64(1605).is_default());
        assert!(!Value::String("Don Quixote".into()).is_default());
        assert!(!Value::F64(-0.0).is_default());
        assert!(Value::List(vec![]).is_default());
        assert!(Value::Map(BTreeMap::new()).is_default());
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::from(1500i64).as_i64(), Some(1500));
        assert_eq!(Value::from(7i32).as_i64(), None);
        assert_eq!(Value::from("name").as_str(), Some("name"));
        assert_eq!(Value::Bytes(vec![1, 2]).as_bytes(), Some(&[1u8, 2][..]));
        assert_eq!(Value::EnumNumber(3).as_enum_number(), Some(3));
        assert!(Value::List(vec![Value::Bool(true)]).is_list());
        assert!(Value::Bool(true).as_message().is_none());
    }

    #[test]
    fn test_map_key_parse() {
        assert_eq!(MapKey::parse(Scalar::Int32, "-4"), Some(MapKey::I32(-4)));
        assert_eq!(MapKey::parse(Scalar::Uint64, "-4"), None);
        assert_eq!(MapKey::parse(Scalar::Bool, "true"), Some(MapKey::Bool(true)));
        assert_eq!(MapKey::parse(Scalar::String, "eu"), Some(MapKey::from("eu")));
        assert_eq!(MapKey::parse(Scalar::Double, "1.5"), None);
    }

    #[test]
    fn test_map_key_ordering() {
        let mut keys = vec![MapKey::from("b"), MapKey::from("a"), MapKey::from("c")];
        keys.sort();
        assert_eq!(
            keys.iter().map(|k| k.to_string()).collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
    }
}
