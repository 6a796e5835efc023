//! Stable logical identifiers for ledger-tracked entities.
//!
//! A [`DataKey`] names a *thing* the ledger tracks, not a cryptographic key.
//! Its successive outputs across transactions form the thing's history, and
//! the data-key index always points at the latest one. The format is
//! `namespace ':' id`, both halves opaque bytes, either allowed to be empty.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque entity key of the form `namespace:id`.
///
/// The first `:` splits the namespace from the identifier. A key with no
/// colon is all namespace. The store treats keys as plain byte strings;
/// only the accessors here know about the separator.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DataKey(Vec<u8>);

impl DataKey {
    /// Join `namespace` and `id` with a single `:`.
    pub fn new(namespace: impl AsRef<[u8]>, id: impl AsRef<[u8]>) -> Self {
        let (namespace, id) = (namespace.as_ref(), id.as_ref());
        let mut bytes = Vec::with_capacity(namespace.len() + 1 + id.len());
        bytes.extend_from_slice(namespace);
        bytes.push(b':');
        bytes.extend_from_slice(id);
        DataKey(bytes)
    }

    /// The namespace half: everything before the first `:`, or the whole key
    /// if there is no colon.
    pub fn namespace(&self) -> &[u8] {
        match self.0.iter().position(|&b| b == b':') {
            Some(i) => &self.0[..i],
            None => &self.0,
        }
    }

    /// The identifier half: everything after the first `:`, or empty if
    /// there is no colon.
    pub fn id(&self) -> &[u8] {
        match self.0.iter().position(|&b| b == b':') {
            Some(i) => &self.0[i + 1..],
            None => &[],
        }
    }

    /// The full key bytes as stored and indexed.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// True if the key has no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for DataKey {
    fn from(s: &str) -> Self {
        DataKey(s.as_bytes().to_vec())
    }
}

impl From<&[u8]> for DataKey {
    fn from(bytes: &[u8]) -> Self {
        DataKey(bytes.to_vec())
    }
}

impl From<Vec<u8>> for DataKey {
    fn from(bytes: Vec<u8>) -> Self {
        DataKey(bytes)
    }
}

impl fmt::Display for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataKey({})", String::from_utf8_lossy(&self.0))
    }
}
