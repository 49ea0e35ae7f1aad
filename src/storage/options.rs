use serde::{Deserialize, Serialize};

/// Durability level applied after each mutating operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Synchronous {
    /// `fsync` the file before the operation returns.
    #[default]
    Full,
    /// Skip the per-operation `fsync` and sync once when the database is
    /// closed. Writes are still issued before returning, so later reads in
    /// the same process observe them.
    Normal,
    /// Never `fsync`; durability is left entirely to the OS.
    Off,
}

impl Synchronous {
    /// Returns true if every mutation must end with an `fsync`.
    pub fn syncs_on_write(self) -> bool {
        matches!(self, Synchronous::Full)
    }

    /// Returns true if closing the database must `fsync` the writes that
    /// were left unsynced.
    pub fn syncs_on_close(self) -> bool {
        matches!(self, Synchronous::Normal)
    }
}

/// Options applied when opening a database file.
#[derive(Clone, Debug, Default)]
pub struct DatabaseOptions {
    /// Durability level for mutating operations.
    pub synchronous: Synchronous,
}

impl DatabaseOptions {
    /// Overrides the durability level.
    pub fn synchronous(mut self, synchronous: Synchronous) -> Self {
        self.synchronous = synchronous;
        self
    }
}
