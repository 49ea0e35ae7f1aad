#![forbid(unsafe_code)]

//! Command-line front-end helpers.
//!
//! The binary owns the prompt loop and rendering; this module only holds the
//! line grammar so that it can be tested without spawning a process.

/// Shell line grammar.
pub mod command;

pub use command::Command;
