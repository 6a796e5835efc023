// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Keystone — Permissioned Ledger Engine
//!
//! An append-only chain of signed blocks whose payload is a set of
//! UTXO-style transactions keyed by stable **data keys**. Keystone is the
//! ledger core of a permissioned deployment: it models, validates, and
//! persists; it deliberately does not gossip, mine, or pick leaders.
//!
//! The mental model in one paragraph: every tracked entity has a
//! [`DataKey`]. Its state lives in transaction outputs; mutating the entity
//! means spending its latest output and producing a new one under the same
//! key. Blocks bundle transactions, a quorum of known signers signs each
//! block, and a data-key index always points at the latest output per key.
//! "What is the current state of `pallet:7`" is one lookup, while the full
//! history stays in the chain.
//!
//! ## Architecture
//!
//! - **types** — `Digest`, `DataKey`, `PublicKey`: the byte-level vocabulary.
//! - **crypto** — the injected hash function and ECDSA curve. Audited
//!   implementations only; nothing here is homegrown.
//! - **transaction** — inputs, outputs, multi-sig slots, canonical hashing.
//! - **block** — signer sets, signature slots, header hashing, chain linkage.
//! - **storage** — three small traits (`BlockStorage`, `TxStorage`,
//!   `DataKeyIndex`) and one sled-backed implementation of each.
//! - **chain** — the [`Blockchain`] façade: validate, append, commit, query.
//! - **error** — one matchable [`LedgerError`] taxonomy for everything.
//!
//! ## Trust model
//!
//! Blocks carry their signer set and an `S`-of-`N` quorum rule; outputs
//! carry their own unlock keys and required-signature count. The engine
//! verifies both. What it does *not* do is decide who may propose: that is
//! the consensus layer's job, exposed here as a pluggable header validator
//! ([`Blockchain::set_block_validator`]).
//!
//! ## Design Philosophy
//!
//! 1. Deterministic bytes everywhere: hash preimages are fixed big-endian
//!    layouts, storage values are canonical bincode. Same input, same
//!    digest, on every platform, forever.
//! 2. Errors are variants, not strings. A consensus layer must be able to
//!    match on [`LedgerError::PrevBlockMismatch`] and react.
//! 3. Single writer, honest reads. No internal threads, no caches to go
//!    stale, no lock hierarchies to document.

#![forbid(unsafe_code)]

pub mod block;
pub mod chain;
pub mod crypto;
pub mod error;
pub mod storage;
pub mod transaction;
pub mod types;

// The working set most users need, without memorizing the module tree.
pub use block::{Block, BlockHeader};
pub use chain::{BlockValidator, Blockchain, ChainConfig};
pub use crypto::{Curve, Hasher, KeyPair};
pub use error::{LedgerError, Result};
pub use storage::{
    BlockStorage, DataKeyIndex, KeystoneDb, SledBlockStorage, SledDataKeyIndex, SledTxStorage,
    TxStorage,
};
pub use transaction::{Tx, TxHeader, TxInput, TxOutput};
pub use types::{DataKey, Digest, PublicKey};
