#![forbid(unsafe_code)]
//! Binary search over the order map.
//!
//! Keys live in the record area, so every probe dereferences a slot and reads
//! one record. A failed read aborts the search.

use tracing::debug;

use crate::index::OrderMap;
use crate::storage::layout::Layout;
use crate::storage::record::Record;
use crate::types::{Result, SlotId};

/// Anything that can resolve a physical slot to its record.
pub trait RecordSource {
    /// Reads the record stored in `slot`.
    fn record_at_slot(&self, slot: SlotId) -> Result<Record>;
}

impl RecordSource for Layout {
    fn record_at_slot(&self, slot: SlotId) -> Result<Record> {
        self.read_record_at_slot(slot)
    }
}

/// Position at which a record with `key` must be inserted.
///
/// Moves right while `key >= probe`, so the result sits after every existing
/// record with an equal key.
pub fn insertion_point<S: RecordSource + ?Sized>(
    source: &S,
    map: &OrderMap,
    key: &[u8],
) -> Result<usize> {
    partition(source, map, |probe| key >= probe)
}

/// First position whose key is not less than `key`.
pub fn lower_bound<S: RecordSource + ?Sized>(
    source: &S,
    map: &OrderMap,
    key: &[u8],
) -> Result<usize> {
    partition(source, map, |probe| key > probe)
}

fn partition<S, F>(source: &S, map: &OrderMap, go_right: F) -> Result<usize>
where
    S: RecordSource + ?Sized,
    F: Fn(&[u8]) -> bool,
{
    let slots = map.slots();
    let (mut l, mut r) = (0usize, slots.len());
    while l < r {
        let mid = l + (r - l) / 2;
        let probe = source.record_at_slot(slots[mid])?;
        debug!(mid, slot = %slots[mid], "locator.probe");
        if go_right(probe.key()) {
            l = mid + 1;
        } else {
            r = mid;
        }
    }
    Ok(l)
}
