//! Block and transaction validation.
//!
//! The pipeline runs cheapest-first and stops at the first failure:
//!
//! 1. The consensus-supplied header validator.
//! 2. Signature quorum: at least `S` of the block's signature slots must
//!    verify against the header hash.
//! 3. Transaction membership: the supplied transactions must match the
//!    block's digest list position by position.
//! 4. Per-transaction input validation (authorization + multi-sig logic).
//! 5. Batch persistence: if the store rejects the batch (double spend),
//!    the block is never written.
//!
//! ## Quorum counting
//!
//! Empty signature slots are skipped: a block signed by 2 of 5 signers is
//! fine if `S = 2`. *Invalid* signatures are also skipped rather than
//! raising: a malformed signature simply contributes nothing, and the sum
//! decides. A block with `S` valid signatures and one corrupted one still
//! commits; the corruption is logged and ignored.

use tracing::warn;

use crate::block::Block;
use crate::error::{LedgerError, Result};
use crate::storage::{BlockStorage, DataKeyIndex, TxStorage};
use crate::transaction::{Tx, TxInput, TxOutput};
use crate::types::DataKey;

use super::Blockchain;

impl<B: BlockStorage, T: TxStorage, I: DataKeyIndex> Blockchain<B, T, I> {
    /// Run the full validation pipeline and persist the transaction batch.
    pub(crate) fn validate_block(&self, block: &Block, txs: &[Tx]) -> Result<()> {
        (self.validator)(&block.header)?;

        if !self.verify_block_signatures(block) {
            return Err(LedgerError::SignatureVerificationFailed);
        }

        // Positional match: the caller supplies txs in block order.
        for (i, tid) in block.tx_digests.iter().enumerate() {
            if txs.get(i).map(|tx| &tx.digest) != Some(tid) {
                return Err(LedgerError::TxNotInBlock);
            }
        }

        for tx in txs {
            self.validate_tx(tx)?;
        }

        self.txs.set_batch(txs)
    }

    /// Count valid signatures over the header hash and compare against the
    /// required `S`. Unsigned and invalid slots are skipped, never fatal.
    pub(crate) fn verify_block_signatures(&self, block: &Block) -> bool {
        let header_hash = block.header.hash(self.hasher);
        let mut valid: i32 = 0;

        for (signer, signature) in block.header.signers.iter().zip(&block.signatures) {
            if signature.is_empty() {
                continue;
            }
            if self.curve.verify(signer, &header_hash, signature) {
                valid += 1;
            } else {
                warn!(signer = %signer, "skipping invalid block signature");
            }
        }

        valid >= block.header.s
    }

    /// Validate every input of a transaction.
    pub(crate) fn validate_tx(&self, tx: &Tx) -> Result<()> {
        for input in &tx.inputs {
            if input.is_base() {
                self.validate_base_input(input)?;
            } else {
                self.validate_reg_input(input)?;
            }
        }
        Ok(())
    }

    /// A base input creates an entity: if it names a data key (second
    /// argument, by convention), that key must not exist yet. Base inputs
    /// with fewer arguments create nothing and pass unconditionally.
    pub(crate) fn validate_base_input(&self, input: &TxInput) -> Result<()> {
        if input.args.len() < 2 {
            return Ok(());
        }

        let key = DataKey::from(input.args[1].clone());
        if self.txs.index().get(&key)?.is_some() {
            return Err(LedgerError::DataKeyExists(key));
        }
        Ok(())
    }

    /// Validate a regular input against its referenced output: every listed
    /// public key must be authorized by the output, and the output's unlock
    /// logic decides how many of their signatures must verify.
    ///
    /// Signature counting mirrors the block quorum: an invalid signature is
    /// not an error, it just does not count.
    pub(crate) fn validate_reg_input(&self, input: &TxInput) -> Result<TxOutput> {
        let reference = input.reference.as_ref().ok_or(LedgerError::BaseTxInput)?;
        let tx_ref = self.txs.storage().get(reference)?;
        let txo = tx_ref
            .outputs
            .get(input.index as usize)
            .ok_or(LedgerError::InvalidOutputIndex(input.index))?;

        let digest = input.hash(self.hasher);
        let mut valid: u8 = 0;

        for (pk, signature) in input.pub_keys.iter().zip(&input.signatures) {
            // Authorization is unconditional; signatures only count toward
            // the unlock logic below.
            if !txo.has_public_key(pk) {
                return Err(LedgerError::NotAuthorized);
            }
            if self.curve.verify(pk, &digest, signature) {
                valid += 1;
            }
        }

        if let Some(required) = txo.required_signatures() {
            if valid < required {
                return Err(LedgerError::RequiresMoreSignatures);
            }
        }

        Ok(txo.clone())
    }
}
