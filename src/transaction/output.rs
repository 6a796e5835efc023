//! Transaction outputs: the current state of a tracked entity.
//!
//! An output binds a [`DataKey`] to whatever payload the application stores
//! under it, plus the access-control surface: which public keys may spend
//! (mutate) the entity next, and how many of them must sign to do so.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{DataKey, PublicKey};

/// A transaction output.
///
/// The engine interprets exactly two fields: `pub_keys` (who may spend this
/// output) and `logic[0]` (how many of them must sign). Everything else
/// (`counter`, `labels`, `metrics`, `tags`, `data`) is opaque application
/// payload carried through hashing and storage untouched.
///
/// Maps use `BTreeMap` because the output participates in the transaction's
/// canonical byte form; iteration order is part of the persisted format.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TxOutput {
    /// The entity this output is the latest state of.
    pub data_key: DataKey,
    /// Public keys allowed to spend this output. Empty means public: anyone
    /// may spend.
    pub pub_keys: Vec<PublicKey>,
    /// Unlock logic. Only `logic[0]` is interpreted today: the number of
    /// valid signatures required to spend. Trailing bytes are reserved.
    pub logic: Vec<u8>,
    /// Opaque application counter.
    pub counter: u64,
    /// Opaque application labels.
    pub labels: Vec<String>,
    /// Opaque application metrics.
    pub metrics: BTreeMap<String, f64>,
    /// Opaque application tags.
    pub tags: BTreeMap<String, String>,
    /// Opaque application payload bytes.
    pub data: Vec<u8>,
}

impl TxOutput {
    /// A bare output for the given data key.
    pub fn new(data_key: DataKey) -> Self {
        TxOutput {
            data_key,
            ..Default::default()
        }
    }

    /// Whether `pk` may spend this output.
    ///
    /// An output with no public keys is public: every key is authorized.
    pub fn has_public_key(&self, pk: &PublicKey) -> bool {
        if self.pub_keys.is_empty() {
            return true;
        }
        self.pub_keys.iter().any(|p| p == pk)
    }

    /// Set the number of signatures required to spend this output,
    /// preserving any trailing logic bytes.
    pub fn set_required_signatures(&mut self, count: u8) {
        if self.logic.is_empty() {
            self.logic.push(count);
        } else {
            self.logic[0] = count;
        }
    }

    /// The required signature count, if unlock logic is present.
    pub fn required_signatures(&self) -> Option<u8> {
        self.logic.first().copied()
    }

    /// Remove the first occurrence of `pk`, returning whether anything was
    /// removed.
    pub fn remove_public_key(&mut self, pk: &PublicKey) -> bool {
        match self.pub_keys.iter().position(|p| p == pk) {
            Some(i) => {
                self.pub_keys.remove(i);
                true
            }
            None => false,
        }
    }
}
