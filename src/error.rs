//! Error taxonomy shared by `Buffer` and `HashTable`.

use std::collections::TryReserveError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// `at`/`at_mut` was asked for a key the table does not hold.
    #[error("key not found")]
    NotFound,
    /// Slot storage could not be obtained from the allocator.
    #[error("slot storage allocation failed: {0}")]
    AllocationFailure(#[from] TryReserveError),
    /// The growth target `(len + 1) * 2` does not fit in `usize`.
    #[error("requested capacity overflows usize")]
    CapacityOverflow,
}
