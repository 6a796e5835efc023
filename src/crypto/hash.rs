//! Hash functions available to the ledger.
//!
//! The engine never hardcodes a hash algorithm: every digest it produces is
//! tagged with the algorithm that made it, and the algorithm itself is
//! injected through [`Hasher`]. Two functions are supported:
//!
//! - **SHA-256** — the default. Universally available, universally
//!   understood, and the algorithm most deployments will interoperate with.
//! - **BLAKE3** — considerably faster on modern hardware with the same
//!   256-bit output. Pick it when every peer runs this implementation.
//!
//! Both produce 32-byte digests, so blocks and transactions are the same
//! size either way. Callers assemble a preimage buffer and hash it in one
//! shot; the engine has no streaming use case large enough to justify an
//! incremental API.

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;

/// A named hash function with a fixed output size.
///
/// The variant a ledger is configured with determines the `algo` tag on every
/// [`Digest`](crate::types::Digest) it produces. Mixing hashers within one
/// ledger is not supported: digests carry their algorithm precisely so that
/// such a mix-up fails equality checks instead of silently colliding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Hasher {
    /// SHA-256 (FIPS 180-4). The default.
    #[default]
    Sha256,
    /// BLAKE3, 32-byte output.
    Blake3,
}

impl Hasher {
    /// The algorithm name used as the digest tag.
    pub fn name(&self) -> &'static str {
        match self {
            Hasher::Sha256 => "sha256",
            Hasher::Blake3 => "blake3",
        }
    }

    /// Output size in bytes.
    pub fn size(&self) -> usize {
        match self {
            Hasher::Sha256 => 32,
            Hasher::Blake3 => 32,
        }
    }

    /// Hash `data` and return the raw digest bytes (untagged).
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            Hasher::Sha256 => Sha256::digest(data).to_vec(),
            Hasher::Blake3 => blake3::hash(data).as_bytes().to_vec(),
        }
    }

    /// Look up a hasher by its algorithm name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sha256" => Some(Hasher::Sha256),
            "blake3" => Some(Hasher::Blake3),
            _ => None,
        }
    }
}

impl fmt::Display for Hasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
