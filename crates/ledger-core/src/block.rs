use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::constants::{GENESIS_TIMESTAMP_MS, SENTINEL_HASH};
use crate::pow::{self, Seal};
use crate::transaction::Transaction;

/// A sealed batch of transactions linked to its predecessor by hash.
///
/// `hash` is materialized: it is only re-derived from the other fields on
/// explicit request ([`Block::calculate_hash`]), which is how tampering is
/// detected during validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub previous_hash: String,
    pub timestamp: i64,
    pub transactions: Vec<Transaction>,
    pub merkle_root: String,
    pub nonce: u64,
    pub hash: String,
}

impl Block {
    /// Builds an unmined block (`nonce = 0`) with its hash already computed.
    pub fn new(
        timestamp: i64,
        transactions: Vec<Transaction>,
        merkle_root: impl Into<String>,
        previous_hash: impl Into<String>,
    ) -> Self {
        let mut block = Self {
            previous_hash: previous_hash.into(),
            timestamp,
            transactions,
            merkle_root: merkle_root.into(),
            nonce: 0,
            hash: String::new(),
        };
        block.hash = block.calculate_hash();
        block
    }

    /// The canonical first block. Any change here invalidates every persisted chain.
    pub fn genesis() -> Self {
        Self::new(GENESIS_TIMESTAMP_MS, vec![], SENTINEL_HASH, SENTINEL_HASH)
    }

    /// Everything that goes into the hash except the nonce, pre-absorbed.
    pub fn preimage(&self) -> Preimage {
        let mut prefix = Sha256::new();
        prefix.update(self.previous_hash.as_bytes());
        prefix.update(self.timestamp.to_string());
        prefix.update(transactions_json(&self.transactions));
        Preimage {
            prefix,
            merkle_root: self.merkle_root.clone(),
        }
    }

    /// Re-derives the fingerprint from the current field values, ignoring `hash`.
    pub fn calculate_hash(&self) -> String {
        self.preimage().hash_with_nonce(self.nonce)
    }

    pub fn has_valid_hash(&self) -> bool {
        self.hash == self.calculate_hash()
    }

    pub fn with_seal(mut self, seal: Seal) -> Self {
        self.nonce = seal.nonce;
        self.hash = seal.hash;
        self
    }

    /// Runs the proof-of-work search to completion and returns the sealed block.
    pub fn mined(self, difficulty: u32) -> Self {
        let seal = pow::mine(&self, difficulty);
        info!("Block mined: {} (nonce {})", seal.hash, seal.nonce);
        self.with_seal(seal)
    }
}

/// Hashing state for one block with a variable nonce.
#[derive(Clone)]
pub struct Preimage {
    prefix: Sha256,
    merkle_root: String,
}

impl Preimage {
    pub fn hash_with_nonce(&self, nonce: u64) -> String {
        let mut hasher = self.prefix.clone();
        hasher.update(nonce.to_string());
        hasher.update(self.merkle_root.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Compact, order-preserving JSON of a transaction list.
fn transactions_json(txs: &[Transaction]) -> Vec<u8> {
    // Strings and integers only; serde_json cannot fail on this shape.
    serde_json::to_vec(txs).expect("transaction list serializes to JSON")
}
