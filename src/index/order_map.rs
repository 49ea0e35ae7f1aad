#![forbid(unsafe_code)]

use crate::types::{PhoneDbError, Result, SlotId};

/// Fixed number of entries the order map can hold.
pub const ORDER_MAP_CAPACITY: usize = 1024;

/// In-memory copy of the on-disk order map.
///
/// `slots[p]` is the physical slot of the record at sorted position `p` for
/// `p < len()`. Entries past the logical size are padding: they are carried
/// through rewrites unchanged so the persisted array keeps its fixed width.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderMap {
    size: usize,
    slots: Box<[SlotId]>,
}

impl Default for OrderMap {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderMap {
    /// Empty map with all-zero padding.
    pub fn new() -> Self {
        Self {
            size: 0,
            slots: vec![SlotId::default(); ORDER_MAP_CAPACITY].into_boxed_slice(),
        }
    }

    /// Rebuilds a map from a logical size and the full-capacity slot array.
    pub fn from_parts(size: usize, slots: impl IntoIterator<Item = SlotId>) -> Result<Self> {
        let slots: Box<[SlotId]> = slots.into_iter().collect();
        if slots.len() != ORDER_MAP_CAPACITY {
            return Err(PhoneDbError::Corrupted("order map has wrong width"));
        }
        if size > ORDER_MAP_CAPACITY {
            return Err(PhoneDbError::Corrupted("record count exceeds index capacity"));
        }
        Ok(Self { size, slots })
    }

    /// Number of records indexed.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns true once every entry is in use.
    pub fn is_full(&self) -> bool {
        self.size == ORDER_MAP_CAPACITY
    }

    /// Entries still available.
    pub fn remaining(&self) -> usize {
        ORDER_MAP_CAPACITY - self.size
    }

    /// Slot holding the record at sorted `position`.
    pub fn slot_at(&self, position: usize) -> Option<SlotId> {
        self.slots().get(position).copied()
    }

    /// Slots in sorted order, logical part only.
    pub fn slots(&self) -> &[SlotId] {
        &self.slots[..self.size]
    }

    /// All `ORDER_MAP_CAPACITY` entries, padding included.
    pub fn raw_slots(&self) -> &[SlotId] {
        &self.slots
    }

    /// Slot the next appended record will occupy.
    pub fn next_slot(&self) -> Result<SlotId> {
        u16::try_from(self.size)
            .map(SlotId)
            .map_err(|_| PhoneDbError::IndexFull {
                capacity: ORDER_MAP_CAPACITY,
            })
    }

    /// Places `slot` at sorted `position`, shifting later entries right.
    ///
    /// The final array element is dropped to keep the width fixed; it is
    /// always padding because the map is not full.
    pub fn insert_at(&mut self, position: usize, slot: SlotId) -> Result<()> {
        if self.is_full() {
            return Err(PhoneDbError::IndexFull {
                capacity: ORDER_MAP_CAPACITY,
            });
        }
        if position > self.size {
            return Err(PhoneDbError::Corrupted("insertion position past logical size"));
        }
        self.slots.copy_within(position..ORDER_MAP_CAPACITY - 1, position + 1);
        self.slots[position] = slot;
        self.size += 1;
        Ok(())
    }
}
