use std::path::Path;

use crate::db::Database;
use crate::storage::options::DatabaseOptions;

use crate::admin::error::{AdminError, Result};

/// Opens an existing database for inspection.
///
/// Unlike [`Database::open`], a missing file is an error instead of being
/// created.
pub fn open_existing(path: &Path, opts: &DatabaseOptions) -> Result<Database> {
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(AdminError::missing_database(path))
        }
        Err(err) => return Err(err.into()),
    };
    if !meta.is_file() {
        return Err(AdminError::NotAFile(path.to_path_buf()));
    }
    Ok(Database::open(path, opts)?)
}
