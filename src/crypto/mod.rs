//! # Cryptographic Primitives
//!
//! Everything security-relevant in the engine flows through this module:
//! the injected hash function and the injected signing curve. Both are thin,
//! type-safe wrappers over audited implementations (RustCrypto's `sha2`,
//! `blake3`, `p256`, `k256`). Nothing here rolls its own cryptography, and
//! nothing here should tempt you to.
//!
//! ```text
//! hash.rs — Hasher: named hash function (SHA-256 default, BLAKE3)
//! keys.rs — Curve + KeyPair: ECDSA over digests, SEC1 DER key files
//! ```

pub mod hash;
pub mod keys;

pub use hash::Hasher;
pub use keys::{Curve, KeyError, KeyPair};
