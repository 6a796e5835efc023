//! sled-backed data-key index.
//!
//! Maps each data key to the latest `(tx digest, output index)` that wrote
//! it, in the `<root>/idx` tree. Values are the 4-byte big-endian output
//! index followed by the raw digest bytes; keys are the data-key bytes
//! verbatim, so byte-wise prefix scans group keys by namespace for free.

use crate::error::Result;
use crate::storage::{DataKeyIndex, KeystoneDb};
use crate::types::{DataKey, Digest};

/// [`DataKeyIndex`] over a sled tree.
#[derive(Debug, Clone)]
pub struct SledDataKeyIndex {
    tree: sled::Tree,
}

impl SledDataKeyIndex {
    /// Open the index tree under `root` (tree name `<root>/idx`).
    pub fn new(db: &KeystoneDb, root: &str) -> Result<Self> {
        Ok(SledDataKeyIndex {
            tree: db.tree(&format!("{root}/idx"))?,
        })
    }

    fn encode(tx_id: &Digest, index: i32) -> Vec<u8> {
        let mut value = Vec::with_capacity(4 + tx_id.as_bytes().len());
        value.extend_from_slice(&(index as u32).to_be_bytes());
        value.extend_from_slice(tx_id.as_bytes());
        value
    }

    fn decode(value: &[u8]) -> (Digest, i32) {
        let mut be = [0u8; 4];
        be.copy_from_slice(&value[..4]);
        (Digest::from_raw(value[4..].to_vec()), u32::from_be_bytes(be) as i32)
    }
}

impl DataKeyIndex for SledDataKeyIndex {
    fn get(&self, key: &DataKey) -> Result<Option<(Digest, i32)>> {
        Ok(self.tree.get(key.as_bytes())?.map(|v| Self::decode(&v)))
    }

    fn set(&self, key: &DataKey, tx_id: &Digest, index: i32) -> Result<()> {
        self.tree
            .insert(key.as_bytes(), Self::encode(tx_id, index))?;
        Ok(())
    }

    fn iter(
        &self,
        prefix: &DataKey,
        f: &mut dyn FnMut(DataKey, Digest, i32) -> bool,
    ) -> Result<()> {
        for entry in self.tree.scan_prefix(prefix.as_bytes()) {
            let (key, value) = entry?;
            let (tx_id, index) = Self::decode(&value);
            if !f(DataKey::from(key.to_vec()), tx_id, index) {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::Hasher;

    fn index() -> SledDataKeyIndex {
        let db = KeystoneDb::open_temporary().unwrap();
        SledDataKeyIndex::new(&db, "test").unwrap()
    }

    #[test]
    fn set_get_round_trip() {
        let idx = index();
        let key = DataKey::from("pallet:7");
        let id = Digest::compute(Hasher::Sha256, b"tx");

        assert!(idx.get(&key).unwrap().is_none());

        idx.set(&key, &id, 3).unwrap();
        let (got_id, got_i) = idx.get(&key).unwrap().unwrap();
        assert_eq!(got_id, id);
        assert_eq!(got_i, 3);
    }

    #[test]
    fn later_writes_win() {
        let idx = index();
        let key = DataKey::from("pallet:7");
        let first = Digest::compute(Hasher::Sha256, b"tx1");
        let second = Digest::compute(Hasher::Sha256, b"tx2");

        idx.set(&key, &first, 0).unwrap();
        idx.set(&key, &second, 1).unwrap();

        let (got_id, got_i) = idx.get(&key).unwrap().unwrap();
        assert_eq!(got_id, second);
        assert_eq!(got_i, 1);
    }

    #[test]
    fn prefix_iteration() {
        let idx = index();
        let zero = Digest::zero(Hasher::Sha256);

        idx.set(&DataKey::from("ball"), &zero, 0).unwrap();
        for i in 0..5 {
            let key = DataKey::from(format!("nums:{i}").as_str());
            idx.set(&key, &zero, i).unwrap();
        }

        let mut all = 0;
        idx.iter(&DataKey::from(""), &mut |_, _, _| {
            all += 1;
            true
        })
        .unwrap();
        assert_eq!(all, 6);

        let mut nums = 0;
        idx.iter(&DataKey::from("nums"), &mut |key, _, _| {
            assert_eq!(key.namespace(), b"nums");
            nums += 1;
            true
        })
        .unwrap();
        assert_eq!(nums, 5);
    }

    #[test]
    fn iteration_stops_when_callback_returns_false() {
        let idx = index();
        let zero = Digest::zero(Hasher::Sha256);
        for i in 0..5 {
            idx.set(&DataKey::from(format!("k:{i}").as_str()), &zero, i)
                .unwrap();
        }

        let mut visited = 0;
        idx.iter(&DataKey::from(""), &mut |_, _, _| {
            visited += 1;
            visited < 2
        })
        .unwrap();
        assert_eq!(visited, 2);
    }
}
