//! A small persistent phonebook.
//!
//! One file holds a fixed-capacity sorted index (the order map) followed by an
//! append-only area of fixed-width records. Records are appended in arrival
//! order and listed in phone order; inserting only rewrites the index.

#![warn(missing_docs)]

pub mod admin;
pub mod cli;
pub mod db;
pub mod index;
pub mod primitives;
pub mod storage;
pub mod types;

pub use db::{Database, InsertOutcome, ListedRecord, Listing, Session};
pub use storage::{DatabaseOptions, Record, Synchronous};
pub use types::{PhoneDbError, Result, SlotId};
