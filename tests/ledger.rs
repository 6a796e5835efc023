//! End-to-end tests for the ledger engine.
//!
//! These exercise the full lifecycle: keypair generation, genesis
//! installation, block building, signature quorums, multi-sig spends,
//! data-key uniqueness, and the append/commit handshake. Every test stands
//! alone on its own temporary database: no shared state, no ordering
//! dependencies.

use keystone_ledger::chain::ChainConfig;
use keystone_ledger::{
    Block, Blockchain, Curve, DataKey, Hasher, KeyPair, KeystoneDb, LedgerError, PublicKey,
    SledBlockStorage, SledDataKeyIndex, SledTxStorage, Tx, TxInput, TxOutput,
};

type SledChain = Blockchain<SledBlockStorage, SledTxStorage, SledDataKeyIndex>;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// A fresh ledger over a temporary database, plus a signing keypair.
fn setup() -> (SledChain, KeyPair) {
    let db = KeystoneDb::open_temporary().expect("temp db");
    let chain = Blockchain::new(ChainConfig::sled(&db, "ledger").expect("config"));
    let keypair = KeyPair::generate(Curve::P256, Hasher::Sha256);
    (chain, keypair)
}

/// A finalized base transaction creating one output under `data_key`,
/// spendable by `owners`.
fn creation_tx(chain: &SledChain, data_key: &str, owners: Vec<PublicKey>) -> Tx {
    let mut tx = Tx::base(vec![]);
    let mut txo = TxOutput::new(DataKey::from(data_key));
    txo.pub_keys = owners;
    tx.add_output(txo);
    tx.set_digest(chain.hasher()).expect("tx digest");
    tx
}

/// Sign a block with `kp` after hashing it: proposer, quorum of one.
fn seal_block(chain: &SledChain, blk: &mut Block, kp: &KeyPair) {
    blk.set_proposer(kp.public_key().clone());
    blk.header.n = 1;
    blk.header.s = 1;
    blk.set_hash(chain.hasher());

    let header_hash = blk.header.hash(chain.hasher());
    let signature = kp.sign(&header_hash).expect("sign header");
    blk.sign(kp.public_key(), signature).expect("store signature");
}

/// Install a genesis block creating `data_key`, returning its transactions.
fn install_genesis(chain: &SledChain, kp: &KeyPair, data_key: &str) -> Vec<Tx> {
    let mut txs = vec![creation_tx(chain, data_key, vec![])];
    let mut genesis = Block::genesis(&mut txs, chain.hasher()).expect("genesis draft");
    seal_block(chain, &mut genesis, kp);
    chain.set_genesis(&genesis, &txs).expect("set genesis");
    txs
}

/// Build, seal, and append a block over `txs`, returning its digest.
fn append_block(chain: &SledChain, kp: &KeyPair, txs: &[Tx]) -> keystone_ledger::Digest {
    let mut blk = chain.next_block().expect("next block template");
    let mut owned = txs.to_vec();
    blk.set_txs(&mut owned, chain.hasher()).expect("set txs");
    seal_block(chain, &mut blk, kp);
    chain.append(&blk, txs).expect("append")
}

// ---------------------------------------------------------------------------
// 1. Genesis round-trip
// ---------------------------------------------------------------------------

#[test]
fn genesis_round_trip() {
    let (chain, kp) = setup();

    let mut txs = vec![creation_tx(&chain, "test:key", vec![])];
    let mut genesis = Block::genesis(&mut txs, chain.hasher()).unwrap();

    // Signing before the key is a signer must fail.
    let header_hash = genesis.header.hash(chain.hasher());
    let early_sig = kp.sign(&header_hash).unwrap();
    assert!(matches!(
        genesis.sign(kp.public_key(), early_sig),
        Err(LedgerError::SignerNotInBlock)
    ));

    seal_block(&chain, &mut genesis, &kp);
    let gid = chain.set_genesis(&genesis, &txs).unwrap();

    // The genesis pointer resolves to the block we installed.
    let stored = chain.genesis().unwrap().expect("genesis present");
    assert_eq!(stored.header.hash(chain.hasher()), gid);
    assert_eq!(chain.last().unwrap().unwrap().height(), 0);

    // Genesis committed atomically: the data key is already queryable.
    let txo = chain
        .get_txo_by_data_key(&DataKey::from("test:key"))
        .unwrap();
    assert_eq!(txo.data_key, DataKey::from("test:key"));
}

// ---------------------------------------------------------------------------
// 2. Linkage rejection
// ---------------------------------------------------------------------------

#[test]
fn linkage_rejection() {
    let (chain, kp) = setup();
    install_genesis(&chain, &kp, "test:key");

    // Height 1 committed, so the parent has nonce 2.
    let id1 = append_block(&chain, &kp, &[creation_tx(&chain, "test:k1", vec![])]);
    chain.commit(&id1).unwrap();

    // Nonce going backwards.
    let mut bad = chain.next_block().unwrap();
    bad.header.nonce = 1;
    seal_block(&chain, &mut bad, &kp);
    assert!(matches!(
        chain.append(&bad, &[]),
        Err(LedgerError::InvalidNonce)
    ));

    // Wrong height.
    bad.header.height = 0;
    seal_block_rehash(&chain, &mut bad, &kp);
    assert!(matches!(
        chain.append(&bad, &[]),
        Err(LedgerError::HeightMismatch)
    ));

    // Correct height and nonce, wrong previous digest.
    let mut wrong_prev = chain.next_block().unwrap();
    wrong_prev.header.prev_block = keystone_ledger::Digest::zero(chain.hasher());
    seal_block(&chain, &mut wrong_prev, &kp);
    assert!(matches!(
        chain.append(&wrong_prev, &[]),
        Err(LedgerError::PrevBlockMismatch)
    ));
}

/// Re-seal a block whose header was mutated after the first seal.
fn seal_block_rehash(chain: &SledChain, blk: &mut Block, kp: &KeyPair) {
    blk.set_signers(vec![]);
    seal_block(chain, blk, kp);
}

// ---------------------------------------------------------------------------
// 3. Double sign
// ---------------------------------------------------------------------------

#[test]
fn double_sign_preserves_first_signature() {
    let (chain, kp_a) = setup();
    let kp_b = KeyPair::generate(Curve::P256, Hasher::Sha256);

    let mut blk = Block::new();
    blk.set_signers(vec![kp_a.public_key().clone(), kp_b.public_key().clone()]);
    blk.set_hash(chain.hasher());

    let header_hash = blk.header.hash(chain.hasher());
    let sig1 = kp_a.sign(&header_hash).unwrap();
    blk.sign(kp_a.public_key(), sig1.clone()).unwrap();

    let sig2 = kp_a.sign(&header_hash).unwrap();
    assert!(matches!(
        blk.sign(kp_a.public_key(), sig2),
        Err(LedgerError::SignerAlreadySigned)
    ));
    assert_eq!(blk.signatures[0], sig1);
    assert_eq!(blk.signature_count(), 1);
}

// ---------------------------------------------------------------------------
// 4. Multi-sig spend
// ---------------------------------------------------------------------------

/// A chain whose genesis created `asset:1` owned by `kp` with a one-signature
/// unlock requirement, ready to be spent.
fn setup_with_locked_output() -> (SledChain, KeyPair) {
    let (chain, kp) = setup();

    let mut tx = Tx::base(vec![]);
    let mut txo = TxOutput::new(DataKey::from("asset:1"));
    txo.pub_keys = vec![kp.public_key().clone()];
    txo.set_required_signatures(1);
    tx.add_output(txo);
    tx.set_digest(chain.hasher()).unwrap();

    let mut txs = vec![tx];
    let mut genesis = Block::genesis(&mut txs, chain.hasher()).unwrap();
    seal_block(&chain, &mut genesis, &kp);
    chain.set_genesis(&genesis, &txs).unwrap();
    (chain, kp)
}

/// A transaction spending `asset:1` with the given input.
fn spend_tx(chain: &SledChain, input: TxInput) -> Tx {
    let mut tx = Tx::new();
    tx.add_input(input);
    tx.add_output(TxOutput::new(DataKey::from("asset:1")));
    tx.set_digest(chain.hasher()).unwrap();
    tx
}

#[test]
fn multisig_spend_with_valid_signature() {
    let (chain, kp) = setup_with_locked_output();

    let mut input = chain.new_tx_input(&DataKey::from("asset:1")).unwrap();
    let input_hash = input.hash(chain.hasher());
    let signature = kp.sign(&input_hash).unwrap();
    input.sign(kp.public_key(), signature).unwrap();

    let tx = spend_tx(&chain, input);
    let id = append_block(&chain, &kp, std::slice::from_ref(&tx));
    chain.commit(&id).unwrap();

    // The index now points at the spend's output.
    let latest = chain.get_txo_by_data_key(&DataKey::from("asset:1")).unwrap();
    assert!(latest.pub_keys.is_empty());
}

#[test]
fn multisig_spend_with_empty_signature_slot() {
    let (chain, kp) = setup_with_locked_output();

    // The input lists the right key but never signs.
    let input = chain.new_tx_input(&DataKey::from("asset:1")).unwrap();
    let tx = spend_tx(&chain, input);

    let mut blk = chain.next_block().unwrap();
    let mut owned = vec![tx.clone()];
    blk.set_txs(&mut owned, chain.hasher()).unwrap();
    seal_block(&chain, &mut blk, &kp);

    assert!(matches!(
        chain.append(&blk, &[tx]),
        Err(LedgerError::RequiresMoreSignatures)
    ));
}

#[test]
fn multisig_spend_with_unauthorized_key() {
    let (chain, kp) = setup_with_locked_output();
    let intruder = KeyPair::generate(Curve::P256, Hasher::Sha256);

    let (reference, index) = {
        let mut input = chain.new_tx_input(&DataKey::from("asset:1")).unwrap();
        (input.reference.take().unwrap(), input.index)
    };

    // An input presenting a key the output does not list.
    let mut input = TxInput::new(
        Some(reference),
        index,
        vec![intruder.public_key().clone()],
    );
    let input_hash = input.hash(chain.hasher());
    let signature = intruder.sign(&input_hash).unwrap();
    input.sign(intruder.public_key(), signature).unwrap();

    let tx = spend_tx(&chain, input);
    let mut blk = chain.next_block().unwrap();
    let mut owned = vec![tx.clone()];
    blk.set_txs(&mut owned, chain.hasher()).unwrap();
    seal_block(&chain, &mut blk, &kp);

    assert!(matches!(
        chain.append(&blk, &[tx]),
        Err(LedgerError::NotAuthorized)
    ));
}

// ---------------------------------------------------------------------------
// 5. Data-key uniqueness
// ---------------------------------------------------------------------------

#[test]
fn base_tx_cannot_recreate_existing_key() {
    let (chain, kp) = setup();
    install_genesis(&chain, &kp, "test:key");

    // A base transaction claiming the already-indexed key.
    let mut dup = Tx::base(vec![]);
    dup.inputs[0].add_args([b"create".to_vec(), b"test:key".to_vec()]);
    dup.add_output(TxOutput::new(DataKey::from("test:key")));
    dup.set_digest(chain.hasher()).unwrap();

    let mut blk = chain.next_block().unwrap();
    let mut owned = vec![dup.clone()];
    blk.set_txs(&mut owned, chain.hasher()).unwrap();
    seal_block(&chain, &mut blk, &kp);

    match chain.append(&blk, &[dup]) {
        Err(LedgerError::DataKeyExists(key)) => {
            assert_eq!(key, DataKey::from("test:key"));
        }
        other => panic!("expected DataKeyExists, got {other:?}"),
    }

    // A fresh key sails through.
    let mut fresh = Tx::base(vec![]);
    fresh.inputs[0].add_args([b"create".to_vec(), b"test:key1".to_vec()]);
    fresh.add_output(TxOutput::new(DataKey::from("test:key1")));
    fresh.set_digest(chain.hasher()).unwrap();

    let id = append_block(&chain, &kp, std::slice::from_ref(&fresh));
    chain.commit(&id).unwrap();
    assert!(chain
        .get_txo_by_data_key(&DataKey::from("test:key1"))
        .is_ok());
}

// ---------------------------------------------------------------------------
// 6. Commit advances last
// ---------------------------------------------------------------------------

#[test]
fn commit_advances_last_and_indexes_outputs() {
    let (chain, kp) = setup();
    install_genesis(&chain, &kp, "test:key");
    let genesis_digest = chain
        .genesis()
        .unwrap()
        .unwrap()
        .header
        .hash(chain.hasher());

    let tx = creation_tx(&chain, "cargo:42", vec![]);
    let id = append_block(&chain, &kp, std::slice::from_ref(&tx));

    // Appended but not committed: last is still genesis, and the new key is
    // not visible yet.
    assert_eq!(
        chain.last().unwrap().unwrap().header.hash(chain.hasher()),
        genesis_digest
    );
    assert!(matches!(
        chain.get_txo_by_data_key(&DataKey::from("cargo:42")),
        Err(LedgerError::DataKeyNotFound(_))
    ));

    chain.commit(&id).unwrap();

    assert_eq!(
        chain.last().unwrap().unwrap().header.hash(chain.hasher()),
        id
    );
    assert!(chain.get_txo_by_data_key(&DataKey::from("cargo:42")).is_ok());
}

#[test]
fn recommitting_the_same_block_is_idempotent() {
    let (chain, kp) = setup();
    install_genesis(&chain, &kp, "test:key");

    let tx = creation_tx(&chain, "cargo:42", vec![]);
    let id = append_block(&chain, &kp, std::slice::from_ref(&tx));
    chain.commit(&id).unwrap();
    chain.commit(&id).unwrap();

    assert_eq!(
        chain.last().unwrap().unwrap().header.hash(chain.hasher()),
        id
    );
}

#[test]
fn committing_genesis_again_is_a_no_op() {
    let (chain, kp) = setup();
    install_genesis(&chain, &kp, "test:key");
    let gid = chain
        .genesis()
        .unwrap()
        .unwrap()
        .header
        .hash(chain.hasher());

    chain.commit(&gid).unwrap();
    assert_eq!(
        chain.last().unwrap().unwrap().header.hash(chain.hasher()),
        gid
    );
}

#[test]
fn committing_an_unknown_block_fails() {
    let (chain, kp) = setup();
    install_genesis(&chain, &kp, "test:key");

    let bogus = keystone_ledger::Digest::zero(chain.hasher());
    assert!(matches!(
        chain.commit(&bogus),
        Err(LedgerError::BlockNotFound(_))
    ));
}

// ---------------------------------------------------------------------------
// Pointer bookkeeping
// ---------------------------------------------------------------------------

#[test]
fn set_last_exec_is_a_bare_pointer_write() {
    let (chain, kp) = setup();
    install_genesis(&chain, &kp, "test:key");

    let tx = creation_tx(&chain, "cargo:42", vec![]);
    let id = append_block(&chain, &kp, std::slice::from_ref(&tx));
    chain.commit(&id).unwrap();

    // Exec still trails at genesis until the caller advances it.
    assert_eq!(chain.last_exec().unwrap().unwrap().height(), 0);

    chain.set_last_exec(&id).unwrap();
    assert_eq!(
        chain
            .last_exec()
            .unwrap()
            .unwrap()
            .header
            .hash(chain.hasher()),
        id
    );
}

// ---------------------------------------------------------------------------
// get_txo authorization
// ---------------------------------------------------------------------------

#[test]
fn get_txo_runs_input_checks() {
    let (chain, kp) = setup_with_locked_output();

    // Unsigned input: resolving the output demands the unlock logic.
    let input = chain.new_tx_input(&DataKey::from("asset:1")).unwrap();
    assert!(matches!(
        chain.get_txo(&input),
        Err(LedgerError::RequiresMoreSignatures)
    ));

    // Signed input resolves.
    let mut input = chain.new_tx_input(&DataKey::from("asset:1")).unwrap();
    let input_hash = input.hash(chain.hasher());
    let signature = kp.sign(&input_hash).unwrap();
    input.sign(kp.public_key(), signature).unwrap();

    let txo = chain.get_txo(&input).unwrap();
    assert_eq!(txo.data_key, DataKey::from("asset:1"));
}
