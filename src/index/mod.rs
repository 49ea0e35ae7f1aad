#![forbid(unsafe_code)]
//! Sorted index over the append-only record area.
//!
//! The index is a permutation of physical slots ordered by phone number. It
//! never moves record bytes; inserting a record only rewrites the permutation.

mod locator;
mod order_map;

pub use locator::{insertion_point, lower_bound, RecordSource};
pub use order_map::{OrderMap, ORDER_MAP_CAPACITY};
