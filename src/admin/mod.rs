#![forbid(unsafe_code)]

//! Inspection tools for database files.
//!
//! Neither tool repairs anything; they only describe what is on disk.

mod error;
mod stats;
mod util;
mod verify;

/// Error types for administrative operations.
pub use error::{AdminError, Result};

/// Size and occupancy reporting.
pub use stats::{stats, stats_for, StatsReport};

/// Structural integrity checks.
///
/// Reports order-map permutation errors, length mismatches left by an
/// interrupted insert, and out-of-order keys.
pub use verify::{
    verify, verify_database, VerifyCounts, VerifyFinding, VerifyLevel, VerifyReport,
    VerifySeverity,
};

pub use util::open_existing;
