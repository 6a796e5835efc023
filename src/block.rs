//! # Blocks
//!
//! A block is a signed, ordered bundle of transaction digests, chained to
//! its parent through `prev_block`. Blocks do not embed transactions: they
//! commit to them through a flat root hash over the ordered digest list,
//! and the transactions travel and persist separately.
//!
//! ## Signer model
//!
//! The header names the block's signer set up front. `signatures` on the
//! block runs parallel to `header.signers`: slot `i` holds the signature by
//! signer `i` over the header hash, or stays empty until that signer signs.
//! The parallel layout is an invariant every mutation here preserves:
//! adding a signer adds a slot, replacing the signer set resets every slot.
//!
//! `N` is the expected signer count, `S` the number of valid signatures
//! required to accept the block, and `Q` the commit quorum consumed by an
//! external consensus layer. The engine enforces `S` during validation and
//! carries `N` and `Q` for the consensus hook.
//!
//! ## Header hash
//!
//! The canonical preimage is fixed big-endian, no padding, no length
//! prefixes: `height (u32) | prev_block raw | timestamp (i64) | nonce (u64)
//! | root raw | signer_0 … signer_{n-1} | proposer_index (i32) | N (u8) |
//! S (i32) | Q (i32)`, where "raw" digest bytes include the algorithm tag.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::crypto::hash::Hasher;
use crate::error::{LedgerError, Result};
use crate::transaction::Tx;
use crate::types::{Digest, PublicKey};

// ---------------------------------------------------------------------------
// BlockHeader
// ---------------------------------------------------------------------------

/// Block metadata and chain linkage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Block height. Genesis is 0.
    pub height: u32,
    /// Header digest of the parent block; the zero digest for genesis.
    pub prev_block: Digest,
    /// Creation timestamp, Unix nanoseconds.
    pub timestamp: i64,
    /// Monotone block nonce. Genesis starts at 1; each block's nonce must
    /// be at least its parent's.
    pub nonce: u64,
    /// Flat hash over the ordered transaction digest list.
    pub root: Digest,
    /// The block's signer set, in signature-slot order.
    pub signers: Vec<PublicKey>,
    /// Index of the proposer within `signers`.
    pub proposer_index: i32,
    /// Expected signer count.
    pub n: u8,
    /// Valid signatures required to accept the block.
    pub s: i32,
    /// Commits required by the external consensus layer.
    pub q: i32,
}

impl BlockHeader {
    /// The proposer's public key, if the signer set is populated.
    pub fn proposer(&self) -> Option<&PublicKey> {
        usize::try_from(self.proposer_index)
            .ok()
            .and_then(|i| self.signers.get(i))
    }

    /// True once the signer set has grown to the expected count `N`.
    pub fn has_signers(&self) -> bool {
        usize::from(self.n) == self.signers.len()
    }

    /// Position of `pk` in the signer set.
    pub fn signer_index(&self, pk: &PublicKey) -> Option<usize> {
        self.signers.iter().position(|s| s == pk)
    }

    /// Canonical header digest (see the module docs for the exact layout).
    /// This is the block's identity and what every signer signs.
    pub fn hash(&self, hasher: Hasher) -> Digest {
        let mut preimage = Vec::new();
        preimage.extend_from_slice(&self.height.to_be_bytes());
        preimage.extend_from_slice(self.prev_block.as_bytes());
        preimage.extend_from_slice(&self.timestamp.to_be_bytes());
        preimage.extend_from_slice(&self.nonce.to_be_bytes());
        preimage.extend_from_slice(self.root.as_bytes());
        for signer in &self.signers {
            preimage.extend_from_slice(signer.as_bytes());
        }
        preimage.extend_from_slice(&self.proposer_index.to_be_bytes());
        preimage.push(self.n);
        preimage.extend_from_slice(&self.s.to_be_bytes());
        preimage.extend_from_slice(&self.q.to_be_bytes());
        Digest::compute(hasher, &preimage)
    }
}

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// A block: header, ordered transaction digests, and the signature slots
/// parallel to the header's signer set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Block {
    /// Metadata, linkage, and signer set.
    pub header: BlockHeader,
    /// Digests of the transactions in this block, in order.
    pub tx_digests: Vec<Digest>,
    /// `signatures[i]` is signer `i`'s signature over the header hash, or
    /// empty while unsigned.
    pub signatures: Vec<Vec<u8>>,
    /// The block digest. Empty until [`set_hash`](Self::set_hash).
    pub digest: Digest,
}

/// Flat root over an ordered digest list: the hash of the concatenated raw
/// digest bytes. Not a Merkle tree: reordering the list changes the root.
pub fn tx_root(digests: &[Digest], hasher: Hasher) -> Digest {
    let mut preimage = Vec::new();
    for digest in digests {
        preimage.extend_from_slice(digest.as_bytes());
    }
    Digest::compute(hasher, &preimage)
}

impl Block {
    /// An empty draft block stamped with the current time.
    pub fn new() -> Self {
        Block {
            header: BlockHeader {
                timestamp: Utc::now().timestamp_nanos_opt().unwrap_or_default(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// A draft genesis block over the given transactions: height 0, nonce 1,
    /// previous block set to the zero digest.
    ///
    /// The caller still assigns signers, computes the hash, and collects
    /// signatures before submitting it.
    pub fn genesis(txs: &mut [Tx], hasher: Hasher) -> Result<Self> {
        let mut blk = Block::new();
        blk.header.nonce = 1;
        blk.header.prev_block = Digest::zero(hasher);
        blk.set_txs(txs, hasher)?;
        Ok(blk)
    }

    /// Block height.
    pub fn height(&self) -> u32 {
        self.header.height
    }

    /// Number of filled signature slots. Distinct from `S`, which is the
    /// number *required*.
    pub fn signature_count(&self) -> i32 {
        self.signatures.iter().filter(|s| !s.is_empty()).count() as i32
    }

    /// True once exactly `S` signature slots are filled.
    pub fn has_signatures(&self) -> bool {
        self.signature_count() == self.header.s
    }

    /// True if the proposer's slot is filled.
    pub fn proposer_signed(&self) -> bool {
        usize::try_from(self.header.proposer_index)
            .ok()
            .and_then(|i| self.signatures.get(i))
            .map(|s| !s.is_empty())
            .unwrap_or(false)
    }

    /// Append a signer, growing the signature slots to match.
    pub fn add_signer(&mut self, pk: PublicKey) {
        self.header.signers.push(pk);
        self.signatures.push(Vec::new());
    }

    /// Replace the signer set, resetting every signature slot.
    pub fn set_signers(&mut self, signers: Vec<PublicKey>) {
        self.signatures = vec![Vec::new(); signers.len()];
        self.header.signers = signers;
    }

    /// Mark `pk` as the proposer, appending it to the signer set first if
    /// it is not already a member.
    pub fn set_proposer(&mut self, pk: PublicKey) {
        match self.header.signer_index(&pk) {
            Some(i) => self.header.proposer_index = i as i32,
            None => {
                self.add_signer(pk);
                self.header.proposer_index = (self.header.signers.len() - 1) as i32;
            }
        }
    }

    /// Store `signature` in the slot belonging to signer `pk`.
    ///
    /// Fails with [`LedgerError::SignerNotInBlock`] for unknown keys and
    /// [`LedgerError::SignerAlreadySigned`] for a filled slot; a signer
    /// never overwrites its own signature. The signature itself is taken on
    /// trust here; the block validator verifies it.
    pub fn sign(&mut self, pk: &PublicKey, signature: Vec<u8>) -> Result<()> {
        let i = self
            .header
            .signer_index(pk)
            .ok_or(LedgerError::SignerNotInBlock)?;
        if !self.signatures[i].is_empty() {
            return Err(LedgerError::SignerAlreadySigned);
        }
        self.signatures[i] = signature;
        Ok(())
    }

    /// Record the transactions' digests in the block, finalizing any
    /// transaction whose digest has not been computed yet.
    pub fn set_txs(&mut self, txs: &mut [Tx], hasher: Hasher) -> Result<()> {
        self.tx_digests = Vec::with_capacity(txs.len());
        for tx in txs {
            if tx.digest.is_empty() {
                tx.set_digest(hasher)?;
            }
            self.tx_digests.push(tx.digest.clone());
        }
        Ok(())
    }

    /// Compute the transaction root and the block digest.
    pub fn set_hash(&mut self, hasher: Hasher) {
        self.header.root = tx_root(&self.tx_digests, hasher);
        self.digest = self.header.hash(hasher);
    }
}
