use std::path::Path;

use tracing::{info, warn};

use crate::db::{Database, InsertOutcome, ListedRecord, Listing};
use crate::storage::options::DatabaseOptions;
use crate::storage::record::Record;
use crate::types::{PhoneDbError, Result};

/// Splits `"<name> <phone>"` into a record.
///
/// Tokens are separated by spaces; runs of spaces count as one separator.
/// Anything other than exactly two tokens is [`PhoneDbError::BadFormat`].
pub fn parse_insert_args(args: &str) -> Result<Record> {
    let mut tokens = args.split(' ').filter(|token| !token.is_empty());
    let (Some(name), Some(phone), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(PhoneDbError::BadFormat(format!(
            "expected `<name> <phone>`, got {args:?}"
        )));
    };
    Record::new(name, phone)
}

/// Command-loop state: at most one open database.
///
/// Every operation re-reads the header from disk, so nothing cached here can
/// go stale between commands.
#[derive(Debug, Default)]
pub struct Session {
    opts: DatabaseOptions,
    current: Option<Database>,
}

impl Session {
    /// Session with nothing open.
    pub fn new(opts: DatabaseOptions) -> Self {
        Self {
            opts,
            current: None,
        }
    }

    /// Opens or creates `path`, closing whatever was open before.
    ///
    /// On failure no database stays loaded.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<&Database> {
        let path = path.as_ref();
        if let Err(err) = self.close() {
            warn!(error = %err, "session.close_failed");
        }
        match Database::open(path, &self.opts) {
            Ok(db) => {
                info!(path = %path.display(), "session.open");
                let db = self.current.insert(db);
                Ok(&*db)
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "session.open_failed");
                Err(err)
            }
        }
    }

    /// Closes the open database. Returns false if nothing was open.
    ///
    /// The database is unloaded even when its final sync fails.
    pub fn close(&mut self) -> Result<bool> {
        match self.current.take() {
            Some(db) => db.close().map(|()| true),
            None => Ok(false),
        }
    }

    /// Returns true if a database is loaded.
    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// The loaded database, or [`PhoneDbError::NoDatabase`].
    pub fn database(&self) -> Result<&Database> {
        self.current.as_ref().ok_or(PhoneDbError::NoDatabase)
    }

    /// Parses `args` and inserts the record.
    ///
    /// Malformed input is rejected before the open database is consulted.
    pub fn insert(&self, args: &str) -> Result<InsertOutcome> {
        let record = parse_insert_args(args)?;
        self.database()?.insert(&record)
    }

    /// Full sorted listing of the open database.
    pub fn list(&self) -> Result<Listing> {
        self.database()?.list()
    }

    /// Records with the given phone number.
    pub fn find(&self, phone: &str) -> Result<Vec<ListedRecord>> {
        self.database()?.find(phone)
    }

    /// Wipes and initializes the open database.
    pub fn reinitialize(&self) -> Result<()> {
        self.database()?.reinitialize()
    }
}
