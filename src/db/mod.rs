#![forbid(unsafe_code)]
//! Record store operations: insert, sorted listing, lookup, reinitialize.

mod session;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::index::{insertion_point, lower_bound, OrderMap, ORDER_MAP_CAPACITY};
use crate::storage::layout::Layout;
use crate::storage::options::DatabaseOptions;
use crate::storage::record::Record;
use crate::types::{PhoneDbError, Result, SlotId};

pub use session::{parse_insert_args, Session};

/// Where an inserted record ended up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct InsertOutcome {
    /// Sorted position of the new record.
    pub position: usize,
    /// Physical slot the record was appended to.
    pub slot: SlotId,
    /// Record count after the insert.
    pub size: usize,
}

/// One record produced by a listing or lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListedRecord {
    /// Sorted position, 0-based.
    pub position: usize,
    /// Physical slot.
    pub slot: SlotId,
    /// Decoded record.
    #[serde(flatten)]
    pub record: Record,
}

/// Result of a full sorted scan.
///
/// A record read failure stops the scan but keeps what was read so far; the
/// failure is reported alongside the partial entries.
#[derive(Debug)]
pub struct Listing {
    /// Record count stored in the header.
    pub declared: usize,
    /// Records read, in ascending key order.
    pub entries: Vec<ListedRecord>,
    /// Read error that cut the scan short.
    pub failure: Option<PhoneDbError>,
}

impl Listing {
    /// Returns true if every declared record was read.
    pub fn is_complete(&self) -> bool {
        self.failure.is_none() && self.entries.len() == self.declared
    }

    /// Iterates over the records only.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.entries.iter().map(|entry| &entry.record)
    }
}

/// Handle to one database file.
#[derive(Debug)]
pub struct Database {
    layout: Layout,
    path: Option<PathBuf>,
}

impl Database {
    /// Opens or creates the file at `path`. The file is not initialized here.
    pub fn open(path: impl AsRef<Path>, opts: &DatabaseOptions) -> Result<Self> {
        let path = path.as_ref();
        let layout = Layout::open(path, opts)?;
        Ok(Self {
            layout,
            path: Some(path.to_path_buf()),
        })
    }

    /// Wraps an existing layout, e.g. one backed by a custom [`FileIo`].
    ///
    /// [`FileIo`]: crate::primitives::io::FileIo
    pub fn from_layout(layout: Layout) -> Self {
        Self { layout, path: None }
    }

    /// Path the database was opened from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Underlying layout manager.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Reads the order map fresh from the file.
    pub fn order_map(&self) -> Result<OrderMap> {
        self.layout.load_header()
    }

    /// Number of records stored.
    pub fn len(&self) -> Result<usize> {
        Ok(self.layout.load_header()?.len())
    }

    /// Returns true if no record is stored.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Stores `record` at its sorted position.
    ///
    /// The header is rewritten before the record is appended. If the process
    /// dies in between, the header references a slot that does not exist yet;
    /// nothing here repairs that, but `admin::verify` reports it.
    pub fn insert(&self, record: &Record) -> Result<InsertOutcome> {
        let encoded = record.encode()?;
        let mut map = self.layout.load_header()?;
        if map.is_full() {
            warn!(capacity = ORDER_MAP_CAPACITY, "db.insert.index_full");
            return Err(PhoneDbError::IndexFull {
                capacity: ORDER_MAP_CAPACITY,
            });
        }

        let position = insertion_point(&self.layout, &map, record.key())?;
        let slot = map.next_slot()?;
        map.insert_at(position, slot)?;
        debug!(position, %slot, "db.insert.located");

        self.layout.write_header(&map)?;
        self.layout.append_encoded(&encoded)?;
        self.layout.flush()?;

        info!(position, %slot, size = map.len(), "db.insert.completed");
        Ok(InsertOutcome {
            position,
            slot,
            size: map.len(),
        })
    }

    /// Reads every record in ascending phone order.
    ///
    /// Header failures are returned as errors. Record failures end the scan
    /// early and are stored in [`Listing::failure`].
    pub fn list(&self) -> Result<Listing> {
        let map = self.layout.load_header()?;
        let mut entries = Vec::with_capacity(map.len());
        let mut failure = None;
        for (position, &slot) in map.slots().iter().enumerate() {
            match self.layout.read_record_at_slot(slot) {
                Ok(record) => entries.push(ListedRecord {
                    position,
                    slot,
                    record,
                }),
                Err(err) => {
                    warn!(position, %slot, error = %err, "db.list.degraded");
                    failure = Some(err);
                    break;
                }
            }
        }
        Ok(Listing {
            declared: map.len(),
            entries,
            failure,
        })
    }

    /// Every record whose phone equals `phone`, in insertion order.
    pub fn find(&self, phone: &str) -> Result<Vec<ListedRecord>> {
        let map = self.layout.load_header()?;
        let key = phone.as_bytes();
        let start = lower_bound(&self.layout, &map, key)?;
        let end = insertion_point(&self.layout, &map, key)?.max(start);
        let mut hits = Vec::with_capacity(end - start);
        for (position, &slot) in map.slots()[start..end].iter().enumerate() {
            hits.push(ListedRecord {
                position: start + position,
                slot,
                record: self.layout.read_record_at_slot(slot)?,
            });
        }
        debug!(phone, hits = hits.len(), "db.find.completed");
        Ok(hits)
    }

    /// Resets the file to an empty, initialized database.
    ///
    /// Every stored record is discarded.
    pub fn reinitialize(&self) -> Result<()> {
        self.layout.write_header(&OrderMap::new())?;
        self.layout.truncate_to_current_length()?;
        self.layout.flush()?;
        info!(
            path = self.path.as_ref().map(|p| p.display().to_string()),
            "db.reinitialize.completed"
        );
        Ok(())
    }

    /// Releases the file, first syncing writes a deferred durability level
    /// left behind.
    pub fn close(self) -> Result<()> {
        self.layout.sync_on_close()?;
        debug!(
            path = self.path.as_ref().map(|p| p.display().to_string()),
            "db.close"
        );
        Ok(())
    }
}
