use std::path::Path;

use serde::Serialize;

use crate::db::Database;
use crate::index::ORDER_MAP_CAPACITY;
use crate::storage::layout::{Layout, HEADER_LEN};
use crate::storage::options::DatabaseOptions;
use crate::storage::record::RECORD_LEN;

use crate::admin::util::open_existing;
use crate::admin::Result;

/// Size and occupancy figures for one database file.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    /// Path the figures were taken from, when known.
    pub path: Option<String>,
    /// Records stored.
    pub size: usize,
    /// Fixed order-map capacity.
    pub capacity: usize,
    /// Inserts still possible.
    pub free_slots: usize,
    /// Bytes taken by count plus order map.
    pub header_bytes: u64,
    /// Bytes per record.
    pub record_bytes: u64,
    /// Actual file length.
    pub file_bytes: u64,
    /// File length implied by the header.
    pub expected_file_bytes: u64,
}

/// Opens the database at `path` and gathers statistics.
pub fn stats(path: impl AsRef<Path>, opts: &DatabaseOptions) -> Result<StatsReport> {
    let db = open_existing(path.as_ref(), opts)?;
    stats_for(&db)
}

/// Gathers statistics for an open database.
pub fn stats_for(db: &Database) -> Result<StatsReport> {
    let map = db.order_map()?;
    Ok(StatsReport {
        path: db.path().map(|p| p.display().to_string()),
        size: map.len(),
        capacity: ORDER_MAP_CAPACITY,
        free_slots: map.remaining(),
        header_bytes: HEADER_LEN as u64,
        record_bytes: RECORD_LEN as u64,
        file_bytes: db.layout().file_len()?,
        expected_file_bytes: Layout::expected_len(map.len()),
    })
}
