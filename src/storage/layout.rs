#![forbid(unsafe_code)]
//! Byte layout of a database file.
//!
//! ```text
//! offset 0                      count: u16 LE
//! offset 2                      order map: ORDER_MAP_CAPACITY x u16 LE
//! offset HEADER_LEN             record area: RECORD_LEN bytes per slot, append order
//! ```
//!
//! The order map is always written at full capacity so the record area starts
//! at a fixed offset regardless of how many records exist.

use std::io::ErrorKind;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::index::{OrderMap, ORDER_MAP_CAPACITY};
use crate::primitives::io::{FileIo, StdFileIo};
use crate::storage::options::{DatabaseOptions, Synchronous};
use crate::storage::record::{Record, RECORD_LEN};
use crate::types::{PhoneDbError, Result, SlotId};

/// Width of the record count field.
pub const COUNT_LEN: usize = 2;
/// Width of one order-map entry.
pub const SLOT_LEN: usize = 2;
/// Total size of count plus the full order map.
pub const HEADER_LEN: usize = COUNT_LEN + ORDER_MAP_CAPACITY * SLOT_LEN;

const COUNT: Range<usize> = 0..COUNT_LEN;

/// Owns every positioned read and write against the database file.
#[derive(Clone)]
pub struct Layout {
    io: Arc<dyn FileIo>,
    synchronous: Synchronous,
}

impl std::fmt::Debug for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layout")
            .field("synchronous", &self.synchronous)
            .finish_non_exhaustive()
    }
}

impl Layout {
    /// Wraps an already opened file.
    pub fn new(io: Arc<dyn FileIo>, synchronous: Synchronous) -> Self {
        Self { io, synchronous }
    }

    /// Opens or creates the file at `path`.
    pub fn open(path: impl AsRef<Path>, opts: &DatabaseOptions) -> Result<Self> {
        let io = StdFileIo::open(path)?;
        Ok(Self::new(Arc::new(io), opts.synchronous))
    }

    /// Byte offset at which `slot` is stored.
    pub fn record_offset(slot: SlotId) -> u64 {
        (HEADER_LEN + slot.index() * RECORD_LEN) as u64
    }

    /// File length a consistent database with `size` records has.
    pub fn expected_len(size: usize) -> u64 {
        (HEADER_LEN + size * RECORD_LEN) as u64
    }

    /// Current length of the backing file.
    pub fn file_len(&self) -> Result<u64> {
        self.io.len()
    }

    /// Reads the record count and the full order map.
    ///
    /// Returns [`PhoneDbError::Uninitialized`] when the file cannot even hold
    /// the count field, and [`PhoneDbError::Corrupted`] when the order map is
    /// cut short or the count exceeds capacity.
    pub fn load_header(&self) -> Result<OrderMap> {
        let len = self.io.len()?;
        if len < COUNT_LEN as u64 {
            return Err(PhoneDbError::Uninitialized);
        }
        if len < HEADER_LEN as u64 {
            return Err(PhoneDbError::Corrupted("order map truncated"));
        }
        let mut buf = vec![0u8; HEADER_LEN];
        self.io
            .read_at(0, &mut buf)
            .map_err(|err| short_read_as(err, "order map truncated"))?;

        let size = usize::from(u16::from_le_bytes([buf[COUNT][0], buf[COUNT][1]]));
        if size > ORDER_MAP_CAPACITY {
            return Err(PhoneDbError::Corrupted("record count exceeds index capacity"));
        }
        let slots = buf[COUNT_LEN..]
            .chunks_exact(SLOT_LEN)
            .map(|raw| SlotId(u16::from_le_bytes([raw[0], raw[1]])));
        OrderMap::from_parts(size, slots)
    }

    /// Decodes the record stored in `slot`.
    pub fn read_record_at_slot(&self, slot: SlotId) -> Result<Record> {
        let mut buf = [0u8; RECORD_LEN];
        self.io
            .read_at(Self::record_offset(slot), &mut buf)
            .map_err(|err| short_read_as(err, "record area truncated"))?;
        Ok(Record::decode(&buf))
    }

    /// Overwrites the count and the whole order map.
    pub fn write_header(&self, map: &OrderMap) -> Result<()> {
        let size = u16::try_from(map.len())
            .map_err(|_| PhoneDbError::Corrupted("record count exceeds index capacity"))?;
        let mut buf = Vec::with_capacity(HEADER_LEN);
        buf.extend_from_slice(&size.to_le_bytes());
        for slot in map.raw_slots() {
            buf.extend_from_slice(&slot.0.to_le_bytes());
        }
        debug_assert_eq!(buf.len(), HEADER_LEN);
        debug!(size = map.len(), "layout.write_header");
        self.io.write_at(0, &buf)
    }

    /// Writes one record at the current end of file and returns the offset
    /// it landed at.
    pub fn append_record(&self, record: &Record) -> Result<u64> {
        self.append_encoded(&record.encode()?)
    }

    /// Same as [`Layout::append_record`] for a block that is already encoded.
    pub fn append_encoded(&self, encoded: &[u8; RECORD_LEN]) -> Result<u64> {
        let off = self.io.len()?;
        debug!(off, "layout.append_record");
        self.io.write_at(off, encoded)?;
        Ok(off)
    }

    /// Cuts the file back to the end of the header, dropping every record.
    pub fn truncate_to_current_length(&self) -> Result<()> {
        self.io.truncate(HEADER_LEN as u64)
    }

    /// Makes the preceding writes durable according to the configured level.
    pub fn flush(&self) -> Result<()> {
        if self.synchronous.syncs_on_write() {
            self.io.sync_all()?;
        }
        Ok(())
    }

    /// Final sync before the file is released. Only [`Synchronous::Normal`]
    /// has deferred writes to settle here.
    pub fn sync_on_close(&self) -> Result<()> {
        if self.synchronous.syncs_on_close() {
            self.io.sync_all()?;
        }
        Ok(())
    }
}

fn short_read_as(err: PhoneDbError, what: &'static str) -> PhoneDbError {
    match err {
        PhoneDbError::Io(inner) if inner.kind() == ErrorKind::UnexpectedEof => {
            PhoneDbError::Corrupted(what)
        }
        other => other,
    }
}
