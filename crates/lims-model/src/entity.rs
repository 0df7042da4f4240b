//! Entity traits shared by every mirrored record family

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A backend-owned record the client mirrors in memory
///
/// The client never mints ids: every entity arrives from the backend with
/// its identity already assigned.
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    /// Typed identifier
    type Id: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static;

    /// Human-readable family name, used in log fields
    const KIND: &'static str;

    /// Identity of this record
    fn id(&self) -> &Self::Id;
}

/// Entity with a mutable lifecycle status
///
/// Batch status updates patch the status in place instead of replacing the
/// whole record.
pub trait HasStatus: Entity {
    /// Status value type
    type Status: Clone + PartialEq + Debug + Send + Sync + 'static;

    /// Current status
    fn status(&self) -> &Self::Status;

    /// Overwrite the status in place
    fn set_status(&mut self, status: Self::Status);
}
