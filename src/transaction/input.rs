//! Transaction inputs: references to outputs plus the proof of the right
//! to spend them.
//!
//! An input names an output by `(referenced tx digest, output index)` and
//! carries the public keys attempting the spend, one signature slot per key,
//! and a trailing list of free-form arguments. A *base* input references
//! nothing (`reference = None`, `index = -1`) and is how new entities enter
//! the ledger; its arguments carry the [`DataKey`](crate::types::DataKey)
//! being created.

use serde::{Deserialize, Serialize};

use crate::crypto::hash::Hasher;
use crate::error::{LedgerError, Result};
use crate::types::{Digest, PublicKey};

/// Output index used by base inputs, which reference no output.
pub const BASE_INPUT_INDEX: i32 = -1;

/// A transaction input.
///
/// `signatures` runs parallel to `pub_keys`: `signatures[i]` is the
/// signature by `pub_keys[i]` over [`TxInput::hash`], or empty while that
/// key has not signed yet. `args` always follows every signature slot and
/// never moves when keys are added.
///
/// Signatures are *not* part of the input hash; they sign it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TxInput {
    /// Digest of the transaction whose output is being spent. `None` for
    /// base inputs.
    pub reference: Option<Digest>,
    /// Index of the referenced output, or [`BASE_INPUT_INDEX`] for base
    /// inputs.
    pub index: i32,
    /// Public keys attempting the spend.
    pub pub_keys: Vec<PublicKey>,
    /// One signature slot per public key. Empty slot = unsigned.
    pub signatures: Vec<Vec<u8>>,
    /// Free-form arguments, after all signature slots. Base inputs use
    /// `args[1]` to carry the data key being created.
    pub args: Vec<Vec<u8>>,
}

impl TxInput {
    /// An input spending `reference`'s output at `index`, with one empty
    /// signature slot per public key.
    pub fn new(reference: Option<Digest>, index: i32, pub_keys: Vec<PublicKey>) -> Self {
        let signatures = vec![Vec::new(); pub_keys.len()];
        TxInput {
            reference,
            index,
            pub_keys,
            signatures,
            args: Vec::new(),
        }
    }

    /// A base input carrying only arguments. Used to seed genesis entities.
    pub fn base(args: Vec<Vec<u8>>) -> Self {
        TxInput {
            reference: None,
            index: BASE_INPUT_INDEX,
            pub_keys: Vec::new(),
            signatures: Vec::new(),
            args,
        }
    }

    /// True if this input references no output.
    pub fn is_base(&self) -> bool {
        self.reference.is_none() && self.index == BASE_INPUT_INDEX
    }

    /// Canonical input digest: `reference | index (i32 BE) | pub_keys… |
    /// args…`. This is what each listed public key signs.
    pub fn hash(&self, hasher: Hasher) -> Digest {
        let mut preimage = Vec::new();
        if let Some(reference) = &self.reference {
            preimage.extend_from_slice(reference.as_bytes());
        }
        preimage.extend_from_slice(&self.index.to_be_bytes());
        for pk in &self.pub_keys {
            preimage.extend_from_slice(pk.as_bytes());
        }
        for arg in &self.args {
            preimage.extend_from_slice(arg);
        }
        Digest::compute(hasher, &preimage)
    }

    /// Position of `pk` in the input's key list.
    pub fn pub_key_index(&self, pk: &PublicKey) -> Option<usize> {
        self.pub_keys.iter().position(|p| p == pk)
    }

    /// Store `signature` in the slot belonging to `pk`.
    ///
    /// Fails with [`LedgerError::NotAuthorized`] if `pk` is not one of the
    /// input's public keys. The signature is stored as given; verification
    /// happens during block validation.
    pub fn sign(&mut self, pk: &PublicKey, signature: Vec<u8>) -> Result<()> {
        let i = self.pub_key_index(pk).ok_or(LedgerError::NotAuthorized)?;
        self.signatures[i] = signature;
        Ok(())
    }

    /// Add a public key (and its empty signature slot) if not already
    /// present. Returns whether the key was added. Arguments stay strictly
    /// after the signature slots.
    pub fn add_pub_key(&mut self, pk: PublicKey) -> bool {
        if self.pub_key_index(&pk).is_some() {
            return false;
        }
        self.pub_keys.push(pk);
        self.signatures.push(Vec::new());
        true
    }

    /// Append arguments after all signature slots.
    pub fn add_args(&mut self, args: impl IntoIterator<Item = Vec<u8>>) {
        self.args.extend(args);
    }
}
