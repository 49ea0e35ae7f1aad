#![allow(missing_docs)]

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use phonedb::{
    admin::{verify_database, VerifyLevel},
    primitives::io::{FileIo, StdFileIo},
    storage::{Layout, HEADER_LEN, RECORD_LEN},
    Database, DatabaseOptions, PhoneDbError, Record, Result, Session, Synchronous,
};
use tempfile::tempdir;

fn set_len(path: &Path, len: u64) {
    OpenOptions::new()
        .write(true)
        .open(path)
        .unwrap()
        .set_len(len)
        .unwrap();
}

fn seeded(path: &Path) -> Result<Database> {
    let db = Database::open(path, &DatabaseOptions::default())?;
    db.reinitialize()?;
    for (name, phone) in [("Alice", "555-0100"), ("Bob", "555-0050"), ("Cara", "555-0100")] {
        db.insert(&Record::new(name, phone)?)?;
    }
    Ok(db)
}

/// Lets the first `allowed` writes through, then fails every later one.
struct FailAfter {
    inner: StdFileIo,
    allowed: usize,
    writes: AtomicUsize,
}

impl FileIo for FailAfter {
    fn read_at(&self, off: u64, dst: &mut [u8]) -> Result<()> {
        self.inner.read_at(off, dst)
    }

    fn write_at(&self, off: u64, src: &[u8]) -> Result<()> {
        if self.writes.fetch_add(1, Ordering::SeqCst) >= self.allowed {
            return Err(io::Error::new(io::ErrorKind::Other, "injected write failure").into());
        }
        self.inner.write_at(off, src)
    }

    fn sync_all(&self) -> Result<()> {
        self.inner.sync_all()
    }

    fn len(&self) -> Result<u64> {
        self.inner.len()
    }

    fn truncate(&self, len: u64) -> Result<()> {
        self.inner.truncate(len)
    }
}

#[test]
fn header_cut_below_count_is_uninitialized() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("c.db");
    let db = seeded(&path)?;
    set_len(&path, 1);
    assert!(matches!(db.list(), Err(PhoneDbError::Uninitialized)));
    Ok(())
}

#[test]
fn header_cut_inside_order_map_is_corrupted() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("c.db");
    let db = seeded(&path)?;
    set_len(&path, (HEADER_LEN - 1) as u64);

    assert!(matches!(db.list(), Err(PhoneDbError::Corrupted(_))));
    assert!(matches!(
        db.insert(&Record::new("Dan", "1")?),
        Err(PhoneDbError::Corrupted(_))
    ));
    assert!(matches!(db.find("555-0100"), Err(PhoneDbError::Corrupted(_))));
    Ok(())
}

#[test]
fn missing_records_abort_the_search() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("c.db");
    let db = seeded(&path)?;
    set_len(&path, HEADER_LEN as u64);

    let before = std::fs::read(&path)?;
    assert!(matches!(
        db.insert(&Record::new("Dan", "555-0075")?),
        Err(PhoneDbError::Corrupted(_))
    ));
    assert_eq!(std::fs::read(&path)?, before, "failed search writes nothing");
    Ok(())
}

#[test]
fn interrupted_insert_leaves_a_detectable_gap() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("gap.db");
    seeded(&path)?;

    // Header rewrite succeeds, record append fails.
    let io = FailAfter {
        inner: StdFileIo::open(&path)?,
        allowed: 1,
        writes: AtomicUsize::new(0),
    };
    let crashed = Database::from_layout(Layout::new(Arc::new(io), Synchronous::Full));
    let err = crashed.insert(&Record::new("Dan", "555-0000")?).unwrap_err();
    assert!(matches!(err, PhoneDbError::Io(_)));

    let db = Database::open(&path, &DatabaseOptions::default())?;
    assert_eq!(db.len()?, 4, "header already counts the lost record");
    assert_eq!(
        std::fs::metadata(&path)?.len(),
        (HEADER_LEN + 3 * RECORD_LEN) as u64
    );

    // The new slot sorts first and has no bytes behind it.
    let listing = db.list()?;
    assert!(listing.entries.is_empty());
    assert!(matches!(listing.failure, Some(PhoneDbError::Corrupted(_))));

    let report =
        verify_database(&db, VerifyLevel::Fast).expect("verify runs on a gapped file");
    assert!(!report.success);
    assert!(report
        .findings
        .iter()
        .any(|finding| finding.message.contains("128 bytes short")));
    assert_eq!(report.counts.declared_records, 4);
    Ok(())
}

#[test]
fn session_reports_corruption_and_keeps_going() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("s.db");
    seeded(&path)?;
    set_len(&path, (HEADER_LEN + RECORD_LEN) as u64);

    let mut session = Session::default();
    session.open(&path)?;
    let listing = session.list()?;
    assert_eq!(listing.declared, 3);
    assert!(listing.entries.len() < 3);

    session.reinitialize()?;
    session.insert("Eve 555-0999")?;
    assert!(session.list()?.is_complete());
    Ok(())
}
