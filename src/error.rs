//! Error types for the ledger engine.
//!
//! Every fallible operation in the crate returns a [`LedgerError`]. The enum
//! is exhaustive over the engine's failure modes so callers can match on the
//! exact condition (a consensus layer reacts very differently to
//! [`LedgerError::HeightMismatch`] than to [`LedgerError::NotAuthorized`])
//! instead of string-probing error messages.

use thiserror::Error;

use crate::crypto::keys::KeyError;
use crate::types::{DataKey, Digest};

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur while building, validating, or persisting blocks
/// and transactions.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The block did not reach the required number of valid signatures (`S`).
    #[error("signature verification failed")]
    SignatureVerificationFailed,

    /// A public key tried to unlock an output that does not list it.
    #[error("not authorized")]
    NotAuthorized,

    /// A signer signed a block but is not one of the block's signers.
    #[error("signer not in block")]
    SignerNotInBlock,

    /// A signer tried to sign a block it already signed.
    #[error("signer already signed")]
    SignerAlreadySigned,

    /// The output's unlock logic demands more valid signatures than supplied.
    #[error("requires more signatures")]
    RequiresMoreSignatures,

    /// A base transaction tried to create a data key that already exists.
    #[error("data key exists: {0}")]
    DataKeyExists(DataKey),

    /// No output is indexed under the given data key.
    #[error("data key not found: {0}")]
    DataKeyNotFound(DataKey),

    /// The block height does not follow the current last block.
    #[error("height mismatch")]
    HeightMismatch,

    /// The block nonce went backwards relative to the current last block.
    #[error("invalid nonce")]
    InvalidNonce,

    /// The block's previous-block digest does not match the current last block.
    #[error("previous block mismatch")]
    PrevBlockMismatch,

    /// The supplied transactions do not positionally match the block's
    /// transaction digest list.
    #[error("tx not in block")]
    TxNotInBlock,

    /// An input references an output that has already been consumed.
    #[error("tx already spent")]
    TxAlreadySpent,

    /// A block with the same digest is already stored.
    #[error("block exists")]
    BlockExists,

    /// No block is stored under the given digest.
    #[error("block not found: {0}")]
    BlockNotFound(Digest),

    /// No transaction is stored under the given digest.
    #[error("tx not found: {0}")]
    TxNotFound(Digest),

    /// A genesis block has already been set for this ledger.
    #[error("genesis block already set")]
    GenesisAlreadySet,

    /// The ledger has no genesis block yet, so there is no last block to
    /// build on.
    #[error("chain not initialized")]
    ChainNotInitialized,

    /// A base input has no referenced output to resolve.
    #[error("base transaction input")]
    BaseTxInput,

    /// An input's output index does not exist on the referenced transaction.
    #[error("output index out of range: {0}")]
    InvalidOutputIndex(i32),

    /// A digest string could not be parsed (`algo:hex`).
    #[error("malformed digest: {0}")]
    MalformedDigest(String),

    /// The underlying key-value store failed.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// Serializing or deserializing a stored value failed.
    #[error("serialization error: {0}")]
    Codec(#[from] bincode::Error),

    /// A keypair operation failed.
    #[error("key error: {0}")]
    Key(#[from] KeyError),
}
