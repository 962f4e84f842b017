//! Parser for creating descriptors and messages from YAML schemas and documents.

use super::codec::{decode_message, DecodeError};
use super::descriptor::MessageDescriptor;
use super::dynamic::DynamicMessage;
use crate::schema::{Schema, SchemaError};
use std::sync::Arc;

/// Parser owns a validated schema and hands out message types from it.
///
/// Every message type produced by the same parser shares one schema
/// instance, so their descriptors compare equal.
#[derive(Debug, Clone)]
pub struct Parser {
    schema: Arc<Schema>,
}

impl Parser {
    /// Creates a new parser from a YAML schema string.
    pub fn new(schema_yaml: &str) -> Result<Parser, SchemaError> {
        let schema: Schema =
            serde_yaml::from_str(schema_yaml).map_err(|e| SchemaError::parse(e.to_string()))?;
        Parser::from_schema(schema)
    }

    /// Creates a new parser from an in-memory schema.
    pub fn from_schema(schema: Schema) -> Result<Parser, SchemaError> {
        schema.validate()?;
        Ok(Parser {
            schema: Arc::new(schema),
        })
    }

    /// Returns the schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the message names of this schema in declaration order.
    pub fn type_names(&self) -> Vec<&str> {
        self.schema.messages.iter().map(|m| m.name.as_str()).collect()
    }

    /// Returns a MessageType helper for the given message name.
    pub fn type_by_name(&self, name: &str) -> MessageType {
        MessageType {
            schema: self.schema.clone(),
            name: name.to_string(),
        }
    }
}

/// MessageType allows for easy production of messages of one type.
#[derive(Debug, Clone)]
pub struct MessageType {
    schema: Arc<Schema>,
    name: String,
}

impl MessageType {
    /// Returns the message name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the type is defined in the schema.
    pub fn is_valid(&self) -> bool {
        self.schema.find_message(&self.name).is_some()
    }

    /// Returns the descriptor of this type.
    pub fn descriptor(&self) -> Result<MessageDescriptor, DecodeError> {
        MessageDescriptor::new(self.schema.clone(), &self.name).ok_or_else(|| {
            DecodeError::UnknownMessage {
                name: self.name.clone(),
            }
        })
    }

    /// Creates an empty message of this type.
    pub fn new_message(&self) -> Result<DynamicMessage, DecodeError> {
        self.descriptor().map(DynamicMessage::new)
    }

    /// Parses a YAML document into a message.
    pub fn from_yaml(&self, yaml: &str) -> Result<DynamicMessage, DecodeError> {
        let doc: serde_json::Value =
            serde_yaml::from_str(yaml).map_err(|e| DecodeError::syntax(e.to_string()))?;
        self.from_value(&doc)
    }

    /// Parses a JSON document into a message.
    pub fn from_json(&self, json: &str) -> Result<DynamicMessage, DecodeError> {
        let doc: serde_json::Value =
            serde_json::from_str(json).map_err(|e| DecodeError::syntax(e.to_string()))?;
        self.from_value(&doc)
    }

    /// Creates a message from an already parsed document.
    pub fn from_value(&self, doc: &serde_json::Value) -> Result<DynamicMessage, DecodeError> {
        decode_message(&self.descriptor()?, doc)
    }
}
