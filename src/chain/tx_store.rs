//! Ledger rules over transaction storage and the data-key index: spent
//! checks, unspent scans, and output indexing.
//!
//! Spentness is a property of the whole store (an output is spent the
//! moment any stored input references it), so the checks here are full
//! scans. The engine keeps no spent-set cache on purpose: every lookup
//! reflects exactly what is stored, and the single-writer contract keeps
//! the scan consistent.

use std::collections::{HashMap, HashSet};

use crate::error::{LedgerError, Result};
use crate::storage::{DataKeyIndex, TxStorage};
use crate::transaction::{Tx, TxInput};
use crate::types::{DataKey, Digest, PublicKey};

/// Transaction-level ledger logic over a [`TxStorage`] and a
/// [`DataKeyIndex`].
pub struct TxStore<T: TxStorage, I: DataKeyIndex> {
    txs: T,
    index: I,
}

impl<T: TxStorage, I: DataKeyIndex> TxStore<T, I> {
    /// Wrap the storage backends.
    pub fn new(txs: T, index: I) -> Self {
        TxStore { txs, index }
    }

    /// Direct access to transaction storage.
    pub fn storage(&self) -> &T {
        &self.txs
    }

    /// Direct access to the data-key index.
    pub fn index(&self) -> &I {
        &self.index
    }

    /// Persist a batch after checking that no non-base input references an
    /// already-consumed output. The batch write itself is atomic.
    pub fn set_batch(&self, txs: &[Tx]) -> Result<()> {
        let unspent = self.find_unspent()?;

        for tx in txs {
            for input in &tx.inputs {
                if input.is_base() {
                    continue;
                }
                let spendable = input
                    .reference
                    .as_ref()
                    .map(|r| unspent.contains_key(r))
                    .unwrap_or(false);
                if !spendable {
                    return Err(LedgerError::TxAlreadySpent);
                }
            }
        }

        self.txs.set_batch(txs)
    }

    /// All stored transactions whose outputs are not referenced by any
    /// stored input.
    pub fn find_unspent(&self) -> Result<HashMap<Digest, Tx>> {
        let mut unspent: HashMap<Digest, Tx> = HashMap::new();
        let mut spent: HashSet<Digest> = HashSet::new();

        self.txs.iter(&mut |tx| {
            if !spent.contains(&tx.digest) {
                unspent.insert(tx.digest.clone(), tx.clone());
            }

            if tx.is_base() {
                return Ok(());
            }

            for input in &tx.inputs {
                if let Some(reference) = &input.reference {
                    spent.insert(reference.clone());
                    unspent.remove(reference);
                }
            }
            Ok(())
        })?;

        Ok(unspent)
    }

    /// The subset of [`find_unspent`](Self::find_unspent) whose every
    /// output authorizes `pk`.
    pub fn find_utx(&self, pk: &PublicKey) -> Result<HashMap<Digest, Tx>> {
        let mut unspent = self.find_unspent()?;
        unspent.retain(|_, tx| tx.outputs.iter().all(|txo| txo.has_public_key(pk)));
        Ok(unspent)
    }

    /// The latest transaction and output index recorded for a data key:
    /// the key's current state.
    pub fn data_key_tx(&self, key: &DataKey) -> Result<(Tx, i32)> {
        let (tx_id, index) = self
            .index
            .get(key)?
            .ok_or_else(|| LedgerError::DataKeyNotFound(key.clone()))?;
        let tx = self.txs.get(&tx_id)?;
        Ok((tx, index))
    }

    /// A fresh input spending the data key's latest output, pre-populated
    /// with that output's public keys and sized for their signatures.
    pub fn new_tx_input(&self, key: &DataKey) -> Result<TxInput> {
        let (tx, index) = self.data_key_tx(key)?;
        let txo = tx
            .outputs
            .get(index as usize)
            .ok_or(LedgerError::InvalidOutputIndex(index))?;
        Ok(TxInput::new(
            Some(tx.digest.clone()),
            index,
            txo.pub_keys.clone(),
        ))
    }

    /// Point the index at every output of every transaction, in order.
    /// Later writes overwrite earlier ones, which is exactly how the index
    /// tracks the latest state per key.
    pub fn index_txos(&self, txs: &[Tx]) -> Result<()> {
        for tx in txs {
            for (i, txo) in tx.outputs.iter().enumerate() {
                self.index.set(&txo.data_key, &tx.digest, i as i32)?;
            }
        }
        Ok(())
    }
}
