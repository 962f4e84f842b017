//! Updater applies field masks to messages.

use super::error::UpdateError;
use super::resolve::{resolve, Property};
use crate::fieldmask::{split_path, FieldMask};
use crate::message::DynamicMessage;

/// Update replaces the fields of `target` named by `mask` with the values
/// they have in `update`.
///
/// Paths may be nested (e.g. `price.discount.full_price`). When the update
/// holds a value for a nested path whose parents are not set on the target,
/// the parents are created empty first. When the update does not hold a
/// value, the target field is cleared; if its parents are not set there is
/// nothing to clear and the path is skipped. Paths into map or list values
/// are not supported.
///
/// The update is applied path by path: on error, the paths before the
/// failing one stay applied. Use an atomic [`Updater`] to avoid that.
pub fn update<M>(target: &mut DynamicMessage, update: &DynamicMessage, mask: &M) -> Result<(), UpdateError>
where
    M: FieldMask + ?Sized,
{
    Updater::new().apply(target, update, mask)
}

/// UpdaterBuilder is a builder for creating an Updater.
#[derive(Debug, Clone, Default)]
pub struct UpdaterBuilder {
    atomic: bool,
}

impl UpdaterBuilder {
    /// Creates a new UpdaterBuilder.
    pub fn new() -> Self {
        UpdaterBuilder::default()
    }

    /// Sets whether the update is staged on a copy of the target and only
    /// committed once every path was applied.
    pub fn atomic(mut self, value: bool) -> Self {
        self.atomic = value;
        self
    }

    /// Builds the Updater.
    pub fn build(self) -> Updater {
        Updater {
            atomic: self.atomic,
        }
    }
}

/// Updater applies field mask updates with configurable commit behavior.
#[derive(Debug, Clone, Default)]
pub struct Updater {
    atomic: bool,
}

impl Updater {
    /// Creates an Updater that applies paths in place.
    pub fn new() -> Self {
        Updater::default()
    }

    /// Creates a new UpdaterBuilder.
    pub fn builder() -> UpdaterBuilder {
        UpdaterBuilder::new()
    }

    /// Returns true if updates leave the target untouched on error.
    pub fn is_atomic(&self) -> bool {
        self.atomic
    }

    /// Applies `mask` from `update` onto `target`. See [`update`].
    pub fn apply<M>(
        &self,
        target: &mut DynamicMessage,
        update: &DynamicMessage,
        mask: &M,
    ) -> Result<(), UpdateError>
    where
        M: FieldMask + ?Sized,
    {
        if !self.atomic {
            return apply_paths(target, update, mask);
        }

        let mut staged = target.clone();
        apply_paths(&mut staged, update, mask)?;
        *target = staged;
        Ok(())
    }
}

fn apply_paths<M>(target: &mut DynamicMessage, update: &DynamicMessage, mask: &M) -> Result<(), UpdateError>
where
    M: FieldMask + ?Sized,
{
    if !mask.is_valid(Some(&*target)) {
        return Err(UpdateError::InvalidFieldMask);
    }
    if target.descriptor() != update.descriptor() {
        return Err(UpdateError::MessageTypeMismatch {
            expected: target.descriptor().name().to_string(),
            actual: update.descriptor().name().to_string(),
        });
    }

    for path in mask.paths() {
        let segments = split_path(path)?;

        // The update side is only read, so its parents are never created.
        let value = resolve(update, &segments, false)?
            .and_then(|Property { message, field }| message.get(&field).cloned());

        let Some(Property { message, field }) = resolve(&mut *target, &segments, value.is_some())?
        else {
            tracing::debug!(path = %path, "parent not set, nothing to clear");
            continue;
        };

        match value {
            Some(value) => {
                tracing::debug!(path = %path, "replacing field");
                message.set(&field, value)?;
            }
            None => {
                tracing::debug!(path = %path, "clearing field");
                message.clear(&field);
            }
        }
    }
    Ok(())
}
