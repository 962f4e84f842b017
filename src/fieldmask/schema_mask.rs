//! Masks checked against a message type.

use super::mask::FieldMask;
use super::path::check_path;
use crate::message::{DynamicMessage, MessageDescriptor};
use crate::update::UpdateError;

/// SchemaMask is a mask whose paths were checked against a message type.
///
/// Paths may be nested. Unlike [`Mask`](super::Mask), validity does not
/// depend on which fields are populated: a SchemaMask is valid for every
/// message whose type has all of its paths.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaMask {
    descriptor: MessageDescriptor,
    paths: Vec<String>,
}

impl SchemaMask {
    /// Creates a mask for the given message type, failing on the first path
    /// the type does not have.
    pub fn new<I, S>(descriptor: &MessageDescriptor, paths: I) -> Result<Self, UpdateError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths = paths.into_iter().map(Into::into).collect::<Vec<String>>();
        for path in &paths {
            check_path(descriptor, path)?;
        }
        Ok(SchemaMask {
            descriptor: descriptor.clone(),
            paths,
        })
    }

    /// Returns the message type the paths were checked against.
    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.descriptor
    }
}

impl FieldMask for SchemaMask {
    fn paths(&self) -> &[String] {
        &self.paths
    }

    fn is_valid(&self, message: Option<&DynamicMessage>) -> bool {
        let Some(message) = message else {
            return false;
        };
        if message.descriptor() == &self.descriptor {
            return true;
        }
        // Same-named types from another schema are checked path by path.
        self.paths
            .iter()
            .all(|path| check_path(message.descriptor(), path).is_ok())
    }
}
