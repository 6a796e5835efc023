//! # The Chain
//!
//! Ledger orchestration: everything between "here is a signed block" and
//! "the data-key index reflects it".
//!
//! ```text
//! mod.rs         — ChainConfig + the Blockchain façade
//! block_store.rs — linkage rules: genesis, append, next-block templates
//! tx_store.rs    — spent checks, unspent scans, data-key indexing
//! validate.rs    — block signature quorum + per-input authorization
//! ```
//!
//! ## Append/commit protocol
//!
//! Adding to the ledger is a two-step handshake with the consensus layer:
//!
//! 1. [`Blockchain::append`] validates the block and its transactions and
//!    *stores* them, but the `last` pointer does not move. The block is on
//!    disk, not yet canonical.
//! 2. [`Blockchain::commit`] re-checks the linkage against the current last
//!    block, advances `last`, and indexes every output's data key. Only now
//!    do the block's outputs become visible through
//!    [`Blockchain::get_txo_by_data_key`].
//!
//! Genesis is the exception: [`Blockchain::set_genesis`] commits atomically
//! (pointers and index in one call), and a later `commit` of the genesis
//! digest is an idempotent no-op. Committing an already-committed block
//! re-runs only the index writes, which are last-wins and safe to repeat.
//!
//! ## Concurrency
//!
//! The engine is single-writer: one actor calls `append`/`commit`/
//! `set_last_exec`. Reads may run concurrently with the writer; sled's
//! snapshot reads keep them consistent. There are no internal threads, no
//! caches to invalidate, and nothing to cancel.

pub mod block_store;
pub mod tx_store;
pub mod validate;

use tracing::info;

use crate::block::{Block, BlockHeader};
use crate::crypto::hash::Hasher;
use crate::crypto::keys::Curve;
use crate::error::{LedgerError, Result};
use crate::storage::{
    BlockStorage, DataKeyIndex, KeystoneDb, SledBlockStorage, SledDataKeyIndex, SledTxStorage,
    TxStorage,
};
use crate::transaction::{Tx, TxInput, TxOutput};
use crate::types::{DataKey, Digest};

pub use block_store::BlockStore;
pub use tx_store::TxStore;

/// Consensus-supplied header validation hook, run before anything else in
/// block validation. This is where a consensus layer checks N/S/Q bounds,
/// proposer identity, signer membership, whatever its rules are.
pub type BlockValidator = Box<dyn Fn(&BlockHeader) -> Result<()> + Send + Sync>;

// ---------------------------------------------------------------------------
// ChainConfig
// ---------------------------------------------------------------------------

/// Everything a [`Blockchain`] needs: the hash function, the signing curve,
/// and the three storage backends.
pub struct ChainConfig<B, T, I> {
    /// Hash function for every digest the ledger produces.
    pub hasher: Hasher,
    /// Curve for every signature the ledger verifies.
    pub curve: Curve,
    /// Block persistence.
    pub block_storage: B,
    /// Transaction persistence.
    pub tx_storage: T,
    /// Data-key index.
    pub data_key_index: I,
}

impl ChainConfig<SledBlockStorage, SledTxStorage, SledDataKeyIndex> {
    /// The common sled-backed configuration: all three stores under `root`
    /// in one database, with the default hasher and curve.
    pub fn sled(db: &KeystoneDb, root: &str) -> Result<Self> {
        let hasher = Hasher::default();
        Ok(ChainConfig {
            hasher,
            curve: Curve::default(),
            block_storage: SledBlockStorage::new(db, root, hasher)?,
            tx_storage: SledTxStorage::new(db, root)?,
            data_key_index: SledDataKeyIndex::new(db, root)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Blockchain
// ---------------------------------------------------------------------------

/// The ledger façade: validation plus storage orchestration, consensus not
/// included. A consensus layer drives this type; this type never chooses
/// leaders or resolves forks.
pub struct Blockchain<B: BlockStorage, T: TxStorage, I: DataKeyIndex> {
    pub(crate) hasher: Hasher,
    pub(crate) curve: Curve,
    pub(crate) validator: BlockValidator,
    pub(crate) blocks: BlockStore<B>,
    pub(crate) txs: TxStore<T, I>,
}

impl<B: BlockStorage, T: TxStorage, I: DataKeyIndex> Blockchain<B, T, I> {
    /// Build a ledger from its configuration. Header validation starts as a
    /// no-op; install a consensus hook with
    /// [`set_block_validator`](Self::set_block_validator).
    pub fn new(config: ChainConfig<B, T, I>) -> Self {
        Blockchain {
            hasher: config.hasher,
            curve: config.curve,
            validator: Box::new(|_| Ok(())),
            blocks: BlockStore::new(config.block_storage),
            txs: TxStore::new(config.tx_storage, config.data_key_index),
        }
    }

    /// Install the consensus-specific header validator.
    pub fn set_block_validator(&mut self, validator: BlockValidator) {
        self.validator = validator;
    }

    /// The configured hash function.
    pub fn hasher(&self) -> Hasher {
        self.hasher
    }

    /// The configured signing curve.
    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// The genesis block, if the ledger is initialized.
    pub fn genesis(&self) -> Result<Option<Block>> {
        Ok(self.blocks.storage().genesis()?.map(|(_, b)| b))
    }

    /// The last committed block, if the ledger is initialized.
    pub fn last(&self) -> Result<Option<Block>> {
        Ok(self.blocks.storage().last()?.map(|(_, b)| b))
    }

    /// The last executed block, if the ledger is initialized.
    pub fn last_exec(&self) -> Result<Option<Block>> {
        Ok(self.blocks.storage().last_exec()?.map(|(_, b)| b))
    }

    /// A draft block templated on the current last block.
    pub fn next_block(&self) -> Result<Block> {
        self.blocks.next_block()
    }

    /// A fresh input spending the given data key's latest output.
    pub fn new_tx_input(&self, key: &DataKey) -> Result<TxInput> {
        self.txs.new_tx_input(key)
    }

    /// Validate and install the genesis block with its transactions.
    ///
    /// Genesis commits atomically: the block is stored, all three chain
    /// pointers point at it, and its outputs are indexed. No separate
    /// `commit` required (though one is harmless).
    pub fn set_genesis(&self, genesis: &Block, txs: &[Tx]) -> Result<Digest> {
        self.validate_block(genesis, txs)?;
        let gid = self.blocks.set_genesis(genesis)?;
        self.txs.index_txos(txs)?;
        info!(genesis = %gid, txs = txs.len(), "genesis committed");
        Ok(gid)
    }

    /// Validate the block and its transactions and store both. The supplied
    /// transactions must match the block's digest list positionally. The
    /// `last` pointer does not move until [`commit`](Self::commit).
    pub fn append(&self, block: &Block, txs: &[Tx]) -> Result<Digest> {
        self.validate_block(block, txs)?;
        self.blocks.append(block)
    }

    /// Make an appended block canonical: verify it extends the current last
    /// block, advance `last`, and index every output of every transaction
    /// in it.
    ///
    /// Committing the current last block again is an idempotent re-index,
    /// so a caller that lost track after a partial failure can simply
    /// re-issue the commit.
    pub fn commit(&self, id: &Digest) -> Result<()> {
        let block = self.blocks.storage().get(id)?;

        let (lid, _) = self
            .blocks
            .storage()
            .last()?
            .ok_or(LedgerError::ChainNotInitialized)?;

        if *id != lid {
            if block.header.prev_block != lid {
                return Err(LedgerError::PrevBlockMismatch);
            }
            self.blocks.storage().set_last(id)?;
        }

        self.index_block_txos(&block)?;
        info!(block = %id, height = block.height(), "block committed");
        Ok(())
    }

    /// Mark the given block as the last one whose side effects have been
    /// applied externally. A bare pointer write, no validation.
    pub fn set_last_exec(&self, id: &Digest) -> Result<()> {
        self.blocks.storage().set_last_exec(id)
    }

    /// Resolve and authorize the output referenced by an input, running the
    /// same authorization and signature checks as block validation.
    pub fn get_txo(&self, input: &TxInput) -> Result<TxOutput> {
        self.validate_reg_input(input)
    }

    /// The latest output recorded for a data key.
    pub fn get_txo_by_data_key(&self, key: &DataKey) -> Result<TxOutput> {
        let (tx, index) = self.txs.data_key_tx(key)?;
        tx.outputs
            .into_iter()
            .nth(index as usize)
            .ok_or(LedgerError::InvalidOutputIndex(index))
    }

    /// Index the outputs of every transaction in a stored block.
    fn index_block_txos(&self, block: &Block) -> Result<()> {
        let mut txs = Vec::with_capacity(block.tx_digests.len());
        for tid in &block.tx_digests {
            txs.push(self.txs.storage().get(tid)?);
        }
        self.txs.index_txos(&txs)
    }
}
