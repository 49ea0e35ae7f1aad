//! Low-level primitives for building the storage engine.

/// Positioned file I/O abstractions.
///
/// Every byte the store reads or writes goes through [`io::FileIo`].
pub mod io;
