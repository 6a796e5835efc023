//! Algorithm-tagged content hashes.
//!
//! Every identifier in the ledger (block IDs, transaction IDs, previous-block
//! links) is a [`Digest`]: the raw hash bytes prefixed with the name of the
//! algorithm that produced them, joined by a single `:`. The tag travels with
//! the bytes everywhere, including on disk and inside hash preimages, so two
//! ledgers configured with different hash functions can never confuse each
//! other's identifiers: the tags differ, therefore the digests differ.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::hash::Hasher;
use crate::error::LedgerError;

/// A content hash tagged with its algorithm: `algo ':' hash-bytes`.
///
/// The canonical textual form is `algo:hex(hash)`. Equality is byte equality
/// over the full tagged form: digests made by different algorithms never
/// compare equal, even in the (astronomically unlikely) event their hash
/// bytes collide.
///
/// A default-constructed digest is empty; the engine uses emptiness to mean
/// "not yet computed" on draft blocks and transactions.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Digest(Vec<u8>);

impl Digest {
    /// Tag `hash` with `algo`.
    pub fn new(algo: &str, hash: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(algo.len() + 1 + hash.len());
        bytes.extend_from_slice(algo.as_bytes());
        bytes.push(b':');
        bytes.extend_from_slice(hash);
        Digest(bytes)
    }

    /// Hash `data` with `hasher` and return the tagged digest.
    pub fn compute(hasher: Hasher, data: &[u8]) -> Self {
        Digest::new(hasher.name(), &hasher.digest(data))
    }

    /// The all-zero digest for the given hasher. Used as the previous-block
    /// link of a genesis block.
    pub fn zero(hasher: Hasher) -> Self {
        Digest::new(hasher.name(), &vec![0u8; hasher.size()])
    }

    /// Reconstruct a digest from its raw tagged bytes, exactly as stored.
    ///
    /// No validation is performed; this is for reading back values the
    /// engine itself wrote (pointer keys, index entries).
    pub fn from_raw(bytes: impl Into<Vec<u8>>) -> Self {
        Digest(bytes.into())
    }

    /// Parse the canonical `algo:hex` textual form.
    pub fn parse(s: &str) -> Result<Self, LedgerError> {
        let sep = match s.find(':') {
            // The algorithm tag must be non-empty.
            Some(i) if i > 0 => i,
            _ => return Err(LedgerError::MalformedDigest(s.to_string())),
        };
        let hash = hex::decode(&s[sep + 1..])
            .map_err(|_| LedgerError::MalformedDigest(s.to_string()))?;
        Ok(Digest::new(&s[..sep], &hash))
    }

    /// The algorithm tag, or `""` for an empty digest.
    pub fn algorithm(&self) -> &str {
        match self.0.iter().position(|&b| b == b':') {
            Some(i) => std::str::from_utf8(&self.0[..i]).unwrap_or(""),
            None => "",
        }
    }

    /// The raw hash bytes without the algorithm tag.
    pub fn hash_bytes(&self) -> &[u8] {
        match self.0.iter().position(|&b| b == b':') {
            Some(i) => &self.0[i + 1..],
            None => &[],
        }
    }

    /// The full tagged bytes (`algo ':' hash`), as used in hash preimages
    /// and storage keys.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// True for a default-constructed digest that has never been computed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm(), hex::encode(self.hash_bytes()))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "Digest(empty)");
        }
        let hex_str = hex::encode(self.hash_bytes());
        let short = &hex_str[..hex_str.len().min(16)];
        write!(f, "Digest({}:{}…)", self.algorithm(), short)
    }
}
