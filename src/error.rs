use thiserror::Error;

/// Errors reported by checked map and cursor operations.
///
/// Misusing a cursor boundary or looking up an absent key through a checked
/// accessor yields one of these instead of a panic.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum MapError {
    /// The cursor is at a position with no entry to dereference, or the
    /// requested step would leave the valid range.
    #[error("invalid cursor position")]
    InvalidCursor,

    /// The key is not present in the map.
    #[error("key not found")]
    KeyNotFound,
}
