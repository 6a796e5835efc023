//! sled-backed block storage.
//!
//! Blocks are keyed by their raw digest bytes in the `<root>/blk` tree. The
//! same tree holds three pointer entries (`genesis`, `last`, `exec`) whose
//! values are the digest bytes of the block they designate. Digest keys
//! always begin with the hasher's algorithm tag, so the pointers can never
//! collide with a block key, and a prefix scan on the tag visits exactly
//! the blocks.

use crate::block::Block;
use crate::crypto::hash::Hasher;
use crate::error::{LedgerError, Result};
use crate::storage::{BlockStorage, KeystoneDb};
use crate::types::Digest;

/// Pointer key for the genesis block digest.
const KEY_GENESIS: &[u8] = b"genesis";
/// Pointer key for the last committed block digest.
const KEY_LAST: &[u8] = b"last";
/// Pointer key for the last executed block digest.
const KEY_EXEC: &[u8] = b"exec";

/// [`BlockStorage`] over a sled tree.
#[derive(Debug, Clone)]
pub struct SledBlockStorage {
    tree: sled::Tree,
    hasher: Hasher,
}

impl SledBlockStorage {
    /// Open the block tree under `root` (tree name `<root>/blk`).
    pub fn new(db: &KeystoneDb, root: &str, hasher: Hasher) -> Result<Self> {
        Ok(SledBlockStorage {
            tree: db.tree(&format!("{root}/blk"))?,
            hasher,
        })
    }

    /// Resolve a pointer entry to its digest and block.
    fn pointer(&self, key: &[u8]) -> Result<Option<(Digest, Block)>> {
        let Some(raw) = self.tree.get(key)? else {
            return Ok(None);
        };
        let id = Digest::from_raw(raw.to_vec());
        let block = self.get(&id)?;
        Ok(Some((id, block)))
    }

    fn set_pointer(&self, key: &[u8], id: &Digest) -> Result<()> {
        self.tree.insert(key, id.as_bytes())?;
        Ok(())
    }
}

impl BlockStorage for SledBlockStorage {
    fn get(&self, id: &Digest) -> Result<Block> {
        match self.tree.get(id.as_bytes())? {
            Some(raw) => Ok(bincode::deserialize(&raw)?),
            None => Err(LedgerError::BlockNotFound(id.clone())),
        }
    }

    fn exists(&self, id: &Digest) -> bool {
        matches!(self.tree.contains_key(id.as_bytes()), Ok(true))
    }

    fn add(&self, block: &Block) -> Result<Digest> {
        // Key by the recomputed header digest so the key is always the true
        // content address, whatever the block's digest field claims.
        let id = block.header.hash(self.hasher);
        if self.exists(&id) {
            return Err(LedgerError::BlockExists);
        }
        self.tree.insert(id.as_bytes(), bincode::serialize(block)?)?;
        Ok(id)
    }

    fn remove(&self, id: &Digest) -> Result<()> {
        self.tree.remove(id.as_bytes())?;
        Ok(())
    }

    fn genesis(&self) -> Result<Option<(Digest, Block)>> {
        self.pointer(KEY_GENESIS)
    }

    fn last(&self) -> Result<Option<(Digest, Block)>> {
        self.pointer(KEY_LAST)
    }

    fn last_exec(&self) -> Result<Option<(Digest, Block)>> {
        self.pointer(KEY_EXEC)
    }

    fn set_genesis(&self, id: &Digest) -> Result<()> {
        self.set_pointer(KEY_GENESIS, id)
    }

    fn set_last(&self, id: &Digest) -> Result<()> {
        self.set_pointer(KEY_LAST, id)
    }

    fn set_last_exec(&self, id: &Digest) -> Result<()> {
        self.set_pointer(KEY_EXEC, id)
    }

    fn iter(&self, f: &mut dyn FnMut(Digest, Block) -> Result<()>) -> Result<()> {
        // Block keys all start with "<algo>:"; pointer keys never do.
        let prefix = format!("{}:", self.hasher.name());
        for entry in self.tree.scan_prefix(prefix.as_bytes()) {
            let (key, value) = entry?;
            let block: Block = bincode::deserialize(&value)?;
            f(Digest::from_raw(key.to_vec()), block)?;
        }
        Ok(())
    }
}
