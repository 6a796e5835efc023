//! sled-backed transaction storage.
//!
//! Transactions are keyed by their raw digest bytes in the `<root>/tx`
//! tree. Batch writes go through a single `sled::Batch`, so a block's
//! transactions land atomically, all or none.

use crate::error::{LedgerError, Result};
use crate::storage::{KeystoneDb, TxStorage};
use crate::transaction::Tx;
use crate::types::Digest;

/// [`TxStorage`] over a sled tree.
#[derive(Debug, Clone)]
pub struct SledTxStorage {
    tree: sled::Tree,
}

impl SledTxStorage {
    /// Open the transaction tree under `root` (tree name `<root>/tx`).
    pub fn new(db: &KeystoneDb, root: &str) -> Result<Self> {
        Ok(SledTxStorage {
            tree: db.tree(&format!("{root}/tx"))?,
        })
    }
}

impl TxStorage for SledTxStorage {
    fn get(&self, id: &Digest) -> Result<Tx> {
        match self.tree.get(id.as_bytes())? {
            Some(raw) => Ok(bincode::deserialize(&raw)?),
            None => Err(LedgerError::TxNotFound(id.clone())),
        }
    }

    fn set(&self, tx: &Tx) -> Result<()> {
        self.tree
            .insert(tx.digest.as_bytes(), bincode::serialize(tx)?)?;
        Ok(())
    }

    fn set_batch(&self, txs: &[Tx]) -> Result<()> {
        let mut batch = sled::Batch::default();
        for tx in txs {
            batch.insert(tx.digest.as_bytes(), bincode::serialize(tx)?);
        }
        self.tree.apply_batch(batch)?;
        Ok(())
    }

    fn iter(&self, f: &mut dyn FnMut(Tx) -> Result<()>) -> Result<()> {
        for entry in self.tree.iter() {
            let (_, value) = entry?;
            f(bincode::deserialize(&value)?)?;
        }
        Ok(())
    }
}
