//! Update module - Applies field masks from an update message onto a target.

mod error;
mod resolve;
mod updater;


pub use error::*;
pub use updater::*;
