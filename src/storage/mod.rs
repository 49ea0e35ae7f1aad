//! On-disk representation of a phonebook database.
//!
//! Covers the fixed-width record codec, the file layout (count, order map,
//! record area) and the options applied when opening a file.

/// Header and record-area access.
pub mod layout;

/// Open-time options.
pub mod options;

/// Fixed-width record codec.
pub mod record;

pub use layout::{Layout, HEADER_LEN};
pub use options::{DatabaseOptions, Synchronous};
pub use record::{Record, FIELD_MAX_LEN, RECORD_LEN};
