//! The shared sled database handle.
//!
//! One [`KeystoneDb`] backs all three stores. sled gives us lock-free
//! concurrent reads, serialized writes, and atomic per-tree batches, which
//! is exactly the concurrency contract the engine promises: one writer,
//! many readers, snapshot-consistent lookups.

use std::path::Path;

use crate::error::Result;

/// Handle to the embedded key-value store.
///
/// Cheap to clone (sled handles are `Arc`s internally) and safe to share
/// across threads. Stores open their own named trees from it; the handle
/// itself holds no ledger semantics.
#[derive(Debug, Clone)]
pub struct KeystoneDb {
    db: sled::Db,
}

impl KeystoneDb {
    /// Open or create a database at the given filesystem path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(KeystoneDb {
            db: sled::open(path)?,
        })
    }

    /// A temporary database that is dropped with the handle. Ideal for
    /// tests: no filesystem residue, no cleanup.
    pub fn open_temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(KeystoneDb { db })
    }

    /// Open (creating if needed) a named tree.
    pub fn tree(&self, name: &str) -> Result<sled::Tree> {
        Ok(self.db.open_tree(name)?)
    }

    /// Block until all pending writes are durable on disk.
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}
