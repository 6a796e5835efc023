//! Raw public key bytes.
//!
//! The engine treats public keys as opaque byte strings: the uncompressed
//! curve point `X || Y` with no format tag. Parsing the bytes back into a
//! curve point is the job of [`Curve`](crate::crypto::keys::Curve) at
//! verification time; everywhere else (signer lists, output unlock sets,
//! hash preimages) the bytes are compared and concatenated as-is.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::hash::Hasher;
use crate::types::Digest;

/// An uncompressed public key as raw `X || Y` bytes.
///
/// Equality is byte equality. The length is fixed per curve (64 bytes for
/// the 256-bit curves the engine ships with), but the type does not enforce
/// it; a malformed key simply never verifies.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PublicKey(Vec<u8>);

impl PublicKey {
    /// Wrap raw `X || Y` bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        PublicKey(bytes.into())
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Byte length of the key.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the key carries no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Content hash of the key bytes under the given hasher.
    pub fn digest(&self, hasher: Hasher) -> Digest {
        Digest::compute(hasher, &self.0)
    }
}

impl From<&[u8]> for PublicKey {
    fn from(bytes: &[u8]) -> Self {
        PublicKey(bytes.to_vec())
    }
}

impl From<Vec<u8>> for PublicKey {
    fn from(bytes: Vec<u8>) -> Self {
        PublicKey(bytes)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = hex::encode(&self.0);
        write!(f, "PublicKey({}…)", &hex_str[..hex_str.len().min(16)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_byte_equality() {
        let a = PublicKey::new(vec![1u8; 64]);
        let b = PublicKey::new(vec![1u8; 64]);
        let c = PublicKey::new(vec![2u8; 64]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn digest_is_tagged_with_hasher() {
        let pk = PublicKey::new(vec![9u8; 64]);
        let d = pk.digest(Hasher::Sha256);
        assert_eq!(d.algorithm(), "sha256");
        assert_eq!(d.hash_bytes().len(), 32);
    }

    #[test]
    fn display_is_hex() {
        let pk = PublicKey::new(vec![0xAB, 0xCD]);
        assert_eq!(pk.to_string(), "abcd");
    }
}
