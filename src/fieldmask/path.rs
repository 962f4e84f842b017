//! Dotted field paths.

use crate::message::MessageDescriptor;
use crate::update::UpdateError;

/// Splits a dotted path into its field name segments.
///
/// Only the empty path is rejected here; empty segments such as in `a..b`
/// fail later as unknown fields.
pub fn split_path(path: &str) -> Result<Vec<&str>, UpdateError> {
    if path.is_empty() {
        return Err(UpdateError::InvalidPath);
    }
    Ok(path.split('.').collect())
}

/// Checks that a path names a field of the given message type, descending
/// through singular message fields only.
pub fn check_path(descriptor: &MessageDescriptor, path: &str) -> Result<(), UpdateError> {
    let segments = split_path(path)?;
    let mut current = descriptor.clone();
    for (i, name) in segments.iter().enumerate() {
        let field = current
            .field_by_name(name)
            .ok_or_else(|| UpdateError::unknown_field(&segments[..=i]))?;
        if i + 1 == segments.len() {
            break;
        }
        current = field
            .message_type()
            .ok_or_else(|| UpdateError::unsupported_nested_type(&segments[..=i]))?;
    }
    Ok(())
}
