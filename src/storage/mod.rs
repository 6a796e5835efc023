//! # Storage
//!
//! Persistence for blocks, transactions, and the data-key index. The ledger
//! logic in [`crate::chain`] never touches a database directly. It speaks
//! to three small capability traits, and this module ships one sled-backed
//! implementation of each:
//!
//! ```text
//! mod.rs         — BlockStorage / TxStorage / DataKeyIndex traits
//! db.rs          — KeystoneDb: the shared sled handle (open, temp, trees)
//! block_store.rs — SledBlockStorage: blocks + genesis/last/exec pointers
//! tx_store.rs    — SledTxStorage: transactions by digest, atomic batches
//! index.rs       — SledDataKeyIndex: data key → (tx digest, output index)
//! ```
//!
//! ## Key layout
//!
//! All three stores share one database, separated by trees named under a
//! caller-chosen root:
//!
//! | Tree          | Key                    | Value                          |
//! |---------------|------------------------|--------------------------------|
//! | `<root>/blk`  | digest raw bytes       | `bincode(Block)`               |
//! | `<root>/blk`  | `genesis`/`last`/`exec`| digest raw bytes (pointer)     |
//! | `<root>/tx`   | digest raw bytes       | `bincode(Tx)`                  |
//! | `<root>/idx`  | data-key bytes         | index (u32 BE) ‖ digest raw    |
//!
//! Digest keys always start with the algorithm tag (`sha256:`…), so pointer
//! keys can share the block tree without colliding, and a prefix scan on the
//! tag enumerates exactly the blocks.

pub mod block_store;
pub mod db;
pub mod index;
pub mod tx_store;

use crate::block::Block;
use crate::error::Result;
use crate::transaction::Tx;
use crate::types::{DataKey, Digest};

pub use block_store::SledBlockStorage;
pub use db::KeystoneDb;
pub use index::SledDataKeyIndex;
pub use tx_store::SledTxStorage;

/// Persistence of ledger blocks and the chain pointers.
///
/// The trait stores and retrieves; it enforces nothing about linkage or
/// validity beyond digest uniqueness. Chain rules live in
/// [`crate::chain::BlockStore`].
pub trait BlockStorage {
    /// Fetch a block by its digest.
    fn get(&self, id: &Digest) -> Result<Block>;

    /// Whether a block with this digest is stored.
    fn exists(&self, id: &Digest) -> bool;

    /// Store a block keyed by its recomputed header digest. Fails with
    /// [`LedgerError::BlockExists`](crate::error::LedgerError::BlockExists)
    /// if already present.
    fn add(&self, block: &Block) -> Result<Digest>;

    /// Delete a block.
    fn remove(&self, id: &Digest) -> Result<()>;

    /// The genesis block pointer and block, if initialized.
    fn genesis(&self) -> Result<Option<(Digest, Block)>>;

    /// The last committed block pointer and block, if initialized.
    fn last(&self) -> Result<Option<(Digest, Block)>>;

    /// The last executed block pointer and block, if initialized.
    fn last_exec(&self) -> Result<Option<(Digest, Block)>>;

    /// Point `genesis` at an already-stored block.
    fn set_genesis(&self, id: &Digest) -> Result<()>;

    /// Point `last` at an already-stored block.
    fn set_last(&self, id: &Digest) -> Result<()>;

    /// Point `exec` at an already-stored block.
    fn set_last_exec(&self, id: &Digest) -> Result<()>;

    /// Visit every stored block. The callback's error stops the scan and is
    /// returned.
    fn iter(&self, f: &mut dyn FnMut(Digest, Block) -> Result<()>) -> Result<()>;
}

/// Persistence of transactions.
pub trait TxStorage {
    /// Fetch a transaction by its digest.
    fn get(&self, id: &Digest) -> Result<Tx>;

    /// Store a single transaction keyed by its digest.
    fn set(&self, tx: &Tx) -> Result<()>;

    /// Store a batch of transactions in one atomic write.
    fn set_batch(&self, txs: &[Tx]) -> Result<()>;

    /// Visit every stored transaction. The callback's error stops the scan
    /// and is returned.
    fn iter(&self, f: &mut dyn FnMut(Tx) -> Result<()>) -> Result<()>;
}

/// The data-key index: each key maps to the latest `(tx digest, output
/// index)` that wrote it. Writes are last-wins by construction.
pub trait DataKeyIndex {
    /// Look up the latest location of a data key.
    fn get(&self, key: &DataKey) -> Result<Option<(Digest, i32)>>;

    /// Point a data key at an output.
    fn set(&self, key: &DataKey, tx_id: &Digest, index: i32) -> Result<()>;

    /// Visit every indexed key under `prefix` (byte-wise). The callback
    /// returns `false` to stop early.
    fn iter(&self, prefix: &DataKey, f: &mut dyn FnMut(DataKey, Digest, i32) -> bool)
        -> Result<()>;
}
