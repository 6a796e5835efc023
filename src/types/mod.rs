//! # Core Value Types
//!
//! The small, serializable identifiers everything else in the engine is
//! built from:
//!
//! ```text
//! digest.rs  — Digest: algorithm-tagged content hash (`algo:hash`)
//! datakey.rs — DataKey: stable entity identifier (`namespace:id`)
//! pubkey.rs  — PublicKey: raw uncompressed curve point (X || Y)
//! ```
//!
//! All three are owned byte newtypes with byte-wise equality. They appear in
//! hash preimages, storage keys, and wire values, so their byte layouts are
//! part of the persisted format and must never change silently.

pub mod datakey;
pub mod digest;
pub mod pubkey;

pub use datakey::DataKey;
pub use digest::Digest;
pub use pubkey::PublicKey;
