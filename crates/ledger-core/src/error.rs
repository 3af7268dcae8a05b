use thiserror::Error;

use crate::constants::MAX_DIFFICULTY;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("transaction must include from and to address")]
    InvalidTransaction,

    #[error("transaction amount must be greater than 0, got {amount}")]
    InvalidAmount { amount: i64 },

    #[error("insufficient balance for {address}: have {balance}, need {amount}")]
    InsufficientBalance {
        address: String,
        balance: i128,
        amount: i64,
    },

    #[error("mining was cancelled before a block was sealed")]
    MiningCancelled,

    #[error("a chain must contain at least the genesis block")]
    EmptyChain,

    #[error("difficulty {difficulty} exceeds the {} hex digits of a block hash", MAX_DIFFICULTY)]
    DifficultyOutOfRange { difficulty: u32 },

    #[error("stored chain is invalid: {0}")]
    InvalidChain(#[from] ChainFault),

    #[error("snapshot encoding error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("chain store error: {0}")]
    Store(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// First structural inconsistency found while scanning a chain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainFault {
    #[error("first block is not the canonical genesis block")]
    Genesis,

    #[error("block {index}: stored merkle root does not match the preceding blocks")]
    MerkleRoot { index: usize },

    #[error("block {index}: stored hash does not match its contents")]
    Hash { index: usize },

    #[error("block {index}: previous hash does not match its predecessor")]
    PreviousHash { index: usize },
}
