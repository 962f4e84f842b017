//! Structural validation of schemas.

use super::elements::{FieldDef, MessageDef, Schema, TypeKind};
use std::collections::HashSet;
use thiserror::Error;

/// SchemaError describes why a schema cannot be used to build descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("failed to parse schema: {message}")]
    Parse { message: String },

    #[error("message names must not be empty")]
    EmptyMessageName,

    #[error("duplicate message: {name}")]
    DuplicateMessage { name: String },

    #[error("{message}: field names must not be empty")]
    EmptyFieldName { message: String },

    #[error("{message}: duplicate field: {field}")]
    DuplicateField { message: String, field: String },

    #[error("{message}.{field}: invalid type: {reason}")]
    InvalidType {
        message: String,
        field: String,
        reason: String,
    },

    #[error("{message}.{field}: unknown message type: {target}")]
    UnknownMessage {
        message: String,
        field: String,
        target: String,
    },

    #[error("{message}.{field}: invalid oneof member: {reason}")]
    InvalidOneofMember {
        message: String,
        field: String,
        reason: String,
    },
}

impl SchemaError {
    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        SchemaError::Parse {
            message: message.into(),
        }
    }

    fn invalid_type(message: &MessageDef, field: &FieldDef, reason: impl Into<String>) -> Self {
        SchemaError::InvalidType {
            message: message.name.clone(),
            field: field.name.clone(),
            reason: reason.into(),
        }
    }

    fn invalid_oneof_member(
        message: &MessageDef,
        field: &FieldDef,
        reason: impl Into<String>,
    ) -> Self {
        SchemaError::InvalidOneofMember {
            message: message.name.clone(),
            field: field.name.clone(),
            reason: reason.into(),
        }
    }
}

impl Schema {
    /// Validate checks that every message and field is well formed and that
    /// all message references resolve within this schema.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut names = HashSet::new();
        for message in &self.messages {
            if message.name.is_empty() {
                return Err(SchemaError::EmptyMessageName);
            }
            if !names.insert(message.name.as_str()) {
                return Err(SchemaError::DuplicateMessage {
                    name: message.name.clone(),
                });
            }
        }

        for message in &self.messages {
            self.validate_message(message)?;
        }
        Ok(())
    }

    fn validate_message(&self, message: &MessageDef) -> Result<(), SchemaError> {
        let mut fields = HashSet::new();
        for field in &message.fields {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyFieldName {
                    message: message.name.clone(),
                });
            }
            if !fields.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    message: message.name.clone(),
                    field: field.name.clone(),
                });
            }
            self.validate_field(message, field)?;
        }
        Ok(())
    }

    fn validate_field(&self, message: &MessageDef, field: &FieldDef) -> Result<(), SchemaError> {
        let kind = field
            .field_type
            .kind()
            .ok_or_else(|| SchemaError::invalid_type(message, field, "exactly one of scalar, message, list or map must be set"))?;

        match kind {
            TypeKind::Scalar(_) => {}
            TypeKind::Message(target) => self.check_message_ref(message, field, target)?,
            TypeKind::List(element) => match element.kind() {
                Some(TypeKind::Scalar(_)) => {}
                Some(TypeKind::Message(target)) => self.check_message_ref(message, field, target)?,
                Some(TypeKind::List(_)) | Some(TypeKind::Map(_)) => {
                    return Err(SchemaError::invalid_type(
                        message,
                        field,
                        "list elements must be scalars or messages",
                    ))
                }
                None => {
                    return Err(SchemaError::invalid_type(
                        message,
                        field,
                        "list element type is malformed",
                    ))
                }
            },
            TypeKind::Map(map) => {
                if !map.key.is_valid_map_key() {
                    return Err(SchemaError::invalid_type(
                        message,
                        field,
                        format!("{} is not a valid map key", map.key),
                    ));
                }
                match map.value.kind() {
                    Some(TypeKind::Scalar(_)) => {}
                    Some(TypeKind::Message(target)) => {
                        self.check_message_ref(message, field, target)?
                    }
                    Some(TypeKind::List(_)) | Some(TypeKind::Map(_)) => {
                        return Err(SchemaError::invalid_type(
                            message,
                            field,
                            "map values must be scalars or messages",
                        ))
                    }
                    None => {
                        return Err(SchemaError::invalid_type(
                            message,
                            field,
                            "map value type is malformed",
                        ))
                    }
                }
            }
        }

        if field.oneof.is_some() {
            if matches!(kind, TypeKind::List(_) | TypeKind::Map(_)) {
                return Err(SchemaError::invalid_oneof_member(
                    message,
                    field,
                    "lists and maps cannot be part of a oneof",
                ));
            }
            if field.optional {
                return Err(SchemaError::invalid_oneof_member(
                    message,
                    field,
                    "oneof members cannot be marked optional",
                ));
            }
        } else if field.optional && !matches!(kind, TypeKind::Scalar(_)) {
            return Err(SchemaError::invalid_type(
                message,
                field,
                "only scalar fields can be marked optional",
            ));
        }
        Ok(())
    }

    fn check_message_ref(
        &self,
        message: &MessageDef,
        field: &FieldDef,
        target: &str,
    ) -> Result<(), SchemaError> {
        if self.find_message(target).is_none() {
            return Err(SchemaError::UnknownMessage {
                message: message.name.clone(),
                field: field.name.clone(),
                target: target.to_string(),
            });
        }
        Ok(())
    }
}
