//! # ECDSA Keypairs
//!
//! Signing and verification for block signers and output owners. The curve
//! is injected, not hardcoded: a ledger picks its [`Curve`] once and every
//! keypair, signer list, and verification call flows through it.
//!
//! ## Wire formats
//!
//! The byte formats are deliberately primitive. Fixed-length halves, no
//! ASN.1 on the wire, no format negotiation:
//!
//! - **Public keys** are the raw uncompressed point `X || Y` (64 bytes for
//!   the 256-bit curves). No SEC1 `0x04` tag; the curve is ledger-wide
//!   configuration, so the tag would carry zero information.
//! - **Signatures** are `r || s`, each scalar occupying exactly half the
//!   signature. Fixed length per curve, so verification can split a
//!   signature without any framing.
//!
//! Private keys persist as SEC1 ASN.1 DER (RFC 5915), the standard
//! EC-private-key encoding that every other toolchain can read.
//!
//! ## What signs what
//!
//! Keypairs sign *digests*, never raw messages. The engine hashes headers
//! and inputs itself (see the canonical preimages in [`crate::block`] and
//! [`crate::transaction`]) and hands the 32 hash bytes to [`KeyPair::sign`].
//! Signing is deterministic (RFC 6979), so there is no nonce-reuse footgun
//! waiting in a badly seeded RNG.

use std::fmt;
use std::path::Path;

use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::elliptic_curve::generic_array::GenericArray;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::hash::Hasher;
use crate::types::{Digest, PublicKey};

/// Length of an untagged uncompressed point (`X || Y`) on a 256-bit curve.
const UNTAGGED_POINT_LEN: usize = 64;

/// Errors that can occur during key operations.
///
/// Deliberately terse: error messages about key material are a leak
/// waiting to happen.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The secret key bytes could not be decoded as SEC1 DER on any
    /// supported curve.
    #[error("invalid secret key encoding")]
    InvalidSecretKey,

    /// Signing failed (empty digest or scalar arithmetic error).
    #[error("signing failed")]
    Signing,

    /// Reading or writing a key file failed.
    #[error("key file i/o: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Curve
// ---------------------------------------------------------------------------

/// The elliptic curve a ledger signs with.
///
/// Verification lives here rather than on [`KeyPair`] because validators
/// only ever hold public key *bytes* (from signer lists and outputs), never
/// a keypair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Curve {
    /// NIST P-256 (secp256r1). The default.
    #[default]
    P256,
    /// secp256k1, for deployments interoperating with that ecosystem.
    Secp256k1,
}

impl Curve {
    /// Curve name.
    pub fn name(&self) -> &'static str {
        match self {
            Curve::P256 => "p256",
            Curve::Secp256k1 => "secp256k1",
        }
    }

    /// Field size in bits.
    pub fn bit_size(&self) -> usize {
        256
    }

    /// Signature length in bytes (`r || s`).
    pub fn signature_size(&self) -> usize {
        UNTAGGED_POINT_LEN
    }

    /// Public key length in bytes (`X || Y`).
    pub fn public_key_size(&self) -> usize {
        UNTAGGED_POINT_LEN
    }

    /// Verify an `r || s` signature over a digest under raw `X || Y` public
    /// key bytes.
    ///
    /// Returns `false` for malformed keys, malformed signatures, and honest
    /// verification failures alike. Block validation counts valid signatures
    /// toward a quorum and must not abort on one bad byte string, so the
    /// distinction is useless to every caller this has.
    pub fn verify(&self, pk: &PublicKey, digest: &Digest, signature: &[u8]) -> bool {
        match self {
            Curve::P256 => verify_p256(pk.as_bytes(), digest.hash_bytes(), signature),
            Curve::Secp256k1 => verify_k256(pk.as_bytes(), digest.hash_bytes(), signature),
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn verify_p256(pk: &[u8], prehash: &[u8], signature: &[u8]) -> bool {
    if pk.len() != UNTAGGED_POINT_LEN {
        return false;
    }
    let point = p256::EncodedPoint::from_untagged_bytes(GenericArray::from_slice(pk));
    let Ok(key) = p256::ecdsa::VerifyingKey::from_encoded_point(&point) else {
        return false;
    };
    let Ok(sig) = p256::ecdsa::Signature::from_slice(signature) else {
        return false;
    };
    key.verify_prehash(prehash, &sig).is_ok()
}

fn verify_k256(pk: &[u8], prehash: &[u8], signature: &[u8]) -> bool {
    if pk.len() != UNTAGGED_POINT_LEN {
        return false;
    }
    let point = k256::EncodedPoint::from_untagged_bytes(GenericArray::from_slice(pk));
    let Ok(key) = k256::ecdsa::VerifyingKey::from_encoded_point(&point) else {
        return false;
    };
    let Ok(sig) = k256::ecdsa::Signature::from_slice(signature) else {
        return false;
    };
    key.verify_prehash(prehash, &sig).is_ok()
}

// ---------------------------------------------------------------------------
// KeyPair
// ---------------------------------------------------------------------------

/// Per-curve secret key material.
enum Secret {
    P256(p256::ecdsa::SigningKey),
    Secp256k1(k256::ecdsa::SigningKey),
}

/// An ECDSA keypair bound to the ledger's curve and hash function.
///
/// The public half is kept pre-serialized as raw `X || Y` bytes, the form
/// every signer list and output stores, so the point is encoded once at
/// construction instead of on every comparison.
pub struct KeyPair {
    curve: Curve,
    hasher: Hasher,
    secret: Secret,
    public_key: PublicKey,
}

impl KeyPair {
    /// Generate a fresh keypair on `curve` using the OS cryptographic RNG.
    pub fn generate(curve: Curve, hasher: Hasher) -> Self {
        let secret = match curve {
            Curve::P256 => Secret::P256(p256::ecdsa::SigningKey::random(&mut OsRng)),
            Curve::Secp256k1 => Secret::Secp256k1(k256::ecdsa::SigningKey::random(&mut OsRng)),
        };
        Self::from_secret(secret, curve, hasher)
    }

    fn from_secret(secret: Secret, curve: Curve, hasher: Hasher) -> Self {
        let public_key = match &secret {
            Secret::P256(sk) => {
                let point = sk.verifying_key().to_encoded_point(false);
                // Strip the SEC1 0x04 tag; the engine carries untagged X || Y.
                PublicKey::new(point.as_bytes()[1..].to_vec())
            }
            Secret::Secp256k1(sk) => {
                let point = sk.verifying_key().to_encoded_point(false);
                PublicKey::new(point.as_bytes()[1..].to_vec())
            }
        };
        KeyPair {
            curve,
            hasher,
            secret,
            public_key,
        }
    }

    /// The raw `X || Y` public key bytes.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The curve this keypair signs on.
    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// The hash function this keypair was configured with.
    pub fn hasher(&self) -> Hasher {
        self.hasher
    }

    /// Algorithm tag, e.g. `ecdsa256`.
    pub fn algorithm(&self) -> String {
        format!("ecdsa{}", self.curve.bit_size())
    }

    /// Sign a digest, returning the fixed-length `r || s` signature bytes.
    ///
    /// Only the digest's hash bytes are signed; the algorithm tag is
    /// ledger-wide configuration, already pinned by every stored digest.
    pub fn sign(&self, digest: &Digest) -> Result<Vec<u8>, KeyError> {
        match &self.secret {
            Secret::P256(sk) => {
                let sig: p256::ecdsa::Signature = sk
                    .sign_prehash(digest.hash_bytes())
                    .map_err(|_| KeyError::Signing)?;
                Ok(sig.to_bytes().to_vec())
            }
            Secret::Secp256k1(sk) => {
                let sig: k256::ecdsa::Signature = sk
                    .sign_prehash(digest.hash_bytes())
                    .map_err(|_| KeyError::Signing)?;
                Ok(sig.to_bytes().to_vec())
            }
        }
    }

    /// Verify a signature over a digest against this keypair's own public key.
    pub fn verify(&self, digest: &Digest, signature: &[u8]) -> bool {
        self.curve.verify(&self.public_key, digest, signature)
    }

    /// Write the private key to `path` as SEC1 ASN.1 DER (RFC 5915).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), KeyError> {
        let der = match &self.secret {
            Secret::P256(sk) => p256::SecretKey::from_bytes(&sk.to_bytes())
                .map_err(|_| KeyError::InvalidSecretKey)?
                .to_sec1_der()
                .map_err(|_| KeyError::InvalidSecretKey)?,
            Secret::Secp256k1(sk) => k256::SecretKey::from_bytes(&sk.to_bytes())
                .map_err(|_| KeyError::InvalidSecretKey)?
                .to_sec1_der()
                .map_err(|_| KeyError::InvalidSecretKey)?,
        };
        std::fs::write(path, der.as_slice())?;
        Ok(())
    }

    /// Load a private key previously written by [`save`](Self::save).
    ///
    /// RFC 5915 embeds the curve OID, so the curve is recovered from the
    /// file rather than passed in.
    pub fn load(path: impl AsRef<Path>, hasher: Hasher) -> Result<Self, KeyError> {
        let der = std::fs::read(path)?;
        if let Ok(secret) = p256::SecretKey::from_sec1_der(&der) {
            let sk = p256::ecdsa::SigningKey::from(secret);
            return Ok(Self::from_secret(Secret::P256(sk), Curve::P256, hasher));
        }
        if let Ok(secret) = k256::SecretKey::from_sec1_der(&der) {
            let sk = k256::ecdsa::SigningKey::from(secret);
            return Ok(Self::from_secret(
                Secret::Secp256k1(sk),
                Curve::Secp256k1,
                hasher,
            ));
        }
        Err(KeyError::InvalidSecretKey)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Secret key material stays out of debug output.
        write!(f, "KeyPair({}, pub={})", self.curve, self.public_key)
    }
}
