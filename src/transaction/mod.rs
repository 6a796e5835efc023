//! # Transactions
//!
//! UTXO-style transactions over data keys. A transaction consumes outputs
//! (via [`TxInput`]) and produces new ones (via [`TxOutput`]); the latest
//! output per data key *is* the current state of that entity.
//!
//! ```text
//! mod.rs    — TxHeader + Tx: canonical data hash and transaction digest
//! input.rs  — TxInput: output references, multi-sig slots, args
//! output.rs — TxOutput: data key, unlock keys, opaque payload
//! ```
//!
//! ## Identity
//!
//! A transaction's digest is `Hash(header)`, where the header commits to
//! the inputs and outputs through `data_digest = Hash(inputs… ‖ outputs…)`
//! over their canonical bincode encodings, and `data_size` is the total
//! encoded length. Computing the digest is an explicit step
//! ([`Tx::set_digest`]) so drafts can be assembled incrementally; stores and
//! blocks only ever see finalized transactions.

pub mod input;
pub mod output;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::crypto::hash::Hasher;
use crate::error::Result;
use crate::types::{Digest, PublicKey};

pub use input::{TxInput, BASE_INPUT_INDEX};
pub use output::TxOutput;

// ---------------------------------------------------------------------------
// TxHeader
// ---------------------------------------------------------------------------

/// Transaction metadata: creation time plus the commitment to the payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TxHeader {
    /// Creation timestamp, Unix nanoseconds.
    pub timestamp: i64,
    /// Digest over the canonical encodings of all inputs and outputs.
    pub data_digest: Digest,
    /// Total encoded length of all inputs and outputs, in bytes.
    pub data_size: i64,
}

impl TxHeader {
    /// Canonical header digest: `timestamp (i64 BE) | data_digest raw |
    /// data_size (i64 BE)`. This is the transaction's identity.
    pub fn hash(&self, hasher: Hasher) -> Digest {
        let mut preimage = Vec::new();
        preimage.extend_from_slice(&self.timestamp.to_be_bytes());
        preimage.extend_from_slice(self.data_digest.as_bytes());
        preimage.extend_from_slice(&self.data_size.to_be_bytes());
        Digest::compute(hasher, &preimage)
    }
}

// ---------------------------------------------------------------------------
// Tx
// ---------------------------------------------------------------------------

/// A transaction: header, inputs, outputs, and (once computed) its digest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Tx {
    /// Metadata and payload commitment.
    pub header: TxHeader,
    /// Outputs being consumed.
    pub inputs: Vec<TxInput>,
    /// Outputs being produced.
    pub outputs: Vec<TxOutput>,
    /// The transaction digest. Empty until [`set_digest`](Self::set_digest).
    pub digest: Digest,
}

impl Tx {
    /// An empty draft transaction stamped with the current time.
    pub fn new() -> Self {
        Tx {
            header: TxHeader {
                timestamp: Utc::now().timestamp_nanos_opt().unwrap_or_default(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// A base transaction: one input referencing nothing, carrying the
    /// given public keys. This is how new entities are created.
    pub fn base(pub_keys: Vec<PublicKey>) -> Self {
        let mut tx = Tx::new();
        tx.add_input(TxInput::new(None, BASE_INPUT_INDEX, pub_keys));
        tx
    }

    /// Append an input.
    pub fn add_input(&mut self, input: TxInput) {
        self.inputs.push(input);
    }

    /// Append an output.
    pub fn add_output(&mut self, output: TxOutput) {
        self.outputs.push(output);
    }

    /// True if this transaction's first input is a base input.
    pub fn is_base(&self) -> bool {
        self.inputs.first().map(TxInput::is_base).unwrap_or(false)
    }

    /// Hash the canonical encodings of every input and output, updating
    /// `data_size` in the header and returning the payload digest.
    pub fn data_hash(&mut self, hasher: Hasher) -> Result<Digest> {
        let mut preimage = Vec::new();
        for input in &self.inputs {
            preimage.extend_from_slice(&bincode::serialize(input)?);
        }
        for output in &self.outputs {
            preimage.extend_from_slice(&bincode::serialize(output)?);
        }
        self.header.data_size = preimage.len() as i64;
        Ok(Digest::compute(hasher, &preimage))
    }

    /// Finalize the transaction: commit the payload into the header and
    /// compute the transaction digest.
    pub fn set_digest(&mut self, hasher: Hasher) -> Result<()> {
        self.header.data_digest = self.data_hash(hasher)?;
        self.digest = self.header.hash(hasher);
        Ok(())
    }
}
