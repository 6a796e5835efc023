//! Ledger rules over block storage: genesis installation, linkage-checked
//! appends, and next-block templates.
//!
//! [`SledBlockStorage`](crate::storage::SledBlockStorage) (or any other
//! [`BlockStorage`]) stores whatever it is handed; this layer is where the
//! chain's shape is enforced: heights that step by one, nonces that never
//! go backwards, previous-block digests that actually match.

use chrono::Utc;
use tracing::debug;

use crate::block::{Block, BlockHeader};
use crate::error::{LedgerError, Result};
use crate::storage::BlockStorage;
use crate::types::Digest;

/// Chain-linkage logic over a [`BlockStorage`] implementation.
pub struct BlockStore<S: BlockStorage> {
    store: S,
}

impl<S: BlockStorage> BlockStore<S> {
    /// Wrap a storage backend.
    pub fn new(store: S) -> Self {
        BlockStore { store }
    }

    /// Direct access to the underlying storage.
    pub fn storage(&self) -> &S {
        &self.store
    }

    /// Install the genesis block. Fails with
    /// [`LedgerError::GenesisAlreadySet`] if the ledger already has one.
    ///
    /// On success the block is stored and all three pointers (`genesis`,
    /// `last`, `exec`) point at it.
    pub fn set_genesis(&self, genesis: &Block) -> Result<Digest> {
        if self.store.genesis()?.is_some() {
            return Err(LedgerError::GenesisAlreadySet);
        }

        let gid = self.store.add(genesis)?;
        self.store.set_genesis(&gid)?;
        self.store.set_last(&gid)?;
        self.store.set_last_exec(&gid)?;

        debug!(genesis = %gid, "genesis block installed");
        Ok(gid)
    }

    /// Store a block after checking its linkage against the current last
    /// block. Does **not** advance the `last` pointer; that is what commit
    /// is for.
    pub fn append(&self, block: &Block) -> Result<Digest> {
        self.check_prev_height_nonce(&block.header)?;
        let id = self.store.add(block)?;
        debug!(block = %id, height = block.height(), "block appended");
        Ok(id)
    }

    /// A draft block templated on the current last block: next height, next
    /// nonce, previous-block digest filled in, current wall-clock timestamp.
    pub fn next_block(&self) -> Result<Block> {
        let (lid, last) = self
            .store
            .last()?
            .ok_or(LedgerError::ChainNotInitialized)?;

        let mut block = Block::new();
        block.header = BlockHeader {
            height: last.header.height + 1,
            prev_block: lid,
            timestamp: Utc::now().timestamp_nanos_opt().unwrap_or_default(),
            nonce: last.header.nonce + 1,
            ..Default::default()
        };
        Ok(block)
    }

    /// Check a header's linkage against the current last block. Cheap
    /// integer comparisons run before the digest comparison.
    pub fn check_prev_height_nonce(&self, header: &BlockHeader) -> Result<()> {
        let (lid, last) = self
            .store
            .last()?
            .ok_or(LedgerError::ChainNotInitialized)?;

        if header.height != last.header.height + 1 {
            return Err(LedgerError::HeightMismatch);
        }
        if header.nonce < last.header.nonce {
            return Err(LedgerError::InvalidNonce);
        }
        if header.prev_block != lid {
            return Err(LedgerError::PrevBlockMismatch);
        }
        Ok(())
    }
}
