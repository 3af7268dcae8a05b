//! Append-only proof-of-work ledger.
//!
//! Transactions are admitted into a pending queue, sealed into hash-linked
//! blocks by a proof-of-work search, and balances are derived by replaying the
//! chain from its genesis block.

pub mod block;
pub mod blockchain;
pub mod constants;
pub mod error;
pub mod hash;
pub mod merkle;
pub mod pow;
pub mod shared;
pub mod store;
pub mod transaction;

pub use block::{Block, Preimage};
pub use blockchain::{Balance, Blockchain, ChainSnapshot};
pub use error::{ChainFault, LedgerError, Result};
pub use merkle::merkle_root;
pub use pow::{MiningMode, Seal};
pub use shared::SharedLedger;
pub use store::{ChainStore, MemoryStore};
pub use transaction::Transaction;
