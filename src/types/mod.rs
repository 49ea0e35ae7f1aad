#![forbid(unsafe_code)]
//! Shared identifiers and the crate-wide error type.

use std::fmt;

use serde::Serialize;

/// Physical append position of a record in the record area.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct SlotId(pub u16);

impl SlotId {
    /// Returns the slot as a `usize` suitable for offset arithmetic.
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors surfaced by the record store.
///
/// Every variant aborts only the operation that produced it; the caller's
/// session stays usable.
#[derive(thiserror::Error, Debug)]
pub enum PhoneDbError {
    /// Underlying file I/O failed for a reason other than a short read.
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    /// The operation needs an open database and none is loaded.
    #[error("no database is open")]
    NoDatabase,
    /// The file exists but does not hold a header yet.
    #[error("database is not initialized")]
    Uninitialized,
    /// The header or record area is shorter than it claims to be.
    #[error("corruption: {0}")]
    Corrupted(&'static str),
    /// The order map already holds `capacity` entries.
    #[error("index full: capacity {capacity} reached")]
    IndexFull {
        /// Fixed number of order-map entries.
        capacity: usize,
    },
    /// Insert input did not split into exactly two non-empty fields.
    #[error("bad format: {0}")]
    BadFormat(String),
    /// A record field does not fit its fixed on-disk width.
    #[error("field `{field}` is {len} bytes (max {max})")]
    FieldTooLong {
        /// Name of the offending field.
        field: &'static str,
        /// Encoded length of the supplied value.
        len: usize,
        /// Longest value the field can hold.
        max: usize,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PhoneDbError>;
