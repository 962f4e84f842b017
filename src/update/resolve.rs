//! Property resolution: walking a dotted path down to the field it names.

use super::error::UpdateError;
use crate::message::{DynamicMessage, FieldDescriptor};

/// Cursor is a position inside a message tree that can move into nested
/// messages.
///
/// Shared cursors only read and never create messages. Exclusive cursors
/// create missing nested messages when asked to materialize them.
pub(crate) trait Cursor: Sized {
    fn message(&self) -> &DynamicMessage;

    /// Moves into the nested message stored in `field`, or returns None if
    /// it is not set and cannot be materialized.
    fn descend(self, field: &FieldDescriptor, materialize: bool) -> Option<Self>;
}

impl<'a> Cursor for &'a DynamicMessage {
    fn message(&self) -> &DynamicMessage {
        self
    }

    fn descend(self, field: &FieldDescriptor, _materialize: bool) -> Option<Self> {
        self.get_message(field)
    }
}

impl<'a> Cursor for &'a mut DynamicMessage {
    fn message(&self) -> &DynamicMessage {
        self
    }

    fn descend(self, field: &FieldDescriptor, materialize: bool) -> Option<Self> {
        if materialize {
            self.get_message_or_insert(field)
        } else {
            self.get_message_mut(field)
        }
    }
}

/// Property is the message holding the field named by the last path segment,
/// together with that field.
pub(crate) struct Property<C> {
    pub(crate) message: C,
    pub(crate) field: FieldDescriptor,
}

/// Resolves a split path against `root`.
///
/// Returns `Ok(None)` when an intermediate message is not set and
/// `materialize` is off: there is nothing further down the chain to act on.
pub(crate) fn resolve<C: Cursor>(
    root: C,
    segments: &[&str],
    materialize: bool,
) -> Result<Option<Property<C>>, UpdateError> {
    let Some((last, parents)) = segments.split_last() else {
        return Err(UpdateError::InvalidPath);
    };

    let mut current = root;
    for (i, name) in parents.iter().enumerate() {
        let field = current
            .message()
            .descriptor()
            .field_by_name(name)
            .ok_or_else(|| UpdateError::unknown_field(&segments[..=i]))?;

        // Lists and maps are never traversed, only replaced as a whole.
        if !field.is_message() {
            return Err(UpdateError::unsupported_nested_type(&segments[..=i]));
        }

        current = match current.descend(&field, materialize) {
            Some(next) => next,
            None => {
                tracing::trace!(path = %segments[..=i].join("."), "intermediate message not set");
                return Ok(None);
            }
        };
    }

    let field = current
        .message()
        .descriptor()
        .field_by_name(last)
        .ok_or_else(|| UpdateError::unknown_field(segments))?;
    Ok(Some(Property {
        message: current,
        field,
    }))
}
