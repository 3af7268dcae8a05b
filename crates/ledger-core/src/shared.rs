use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::block::Block;
use crate::blockchain::{Balance, Blockchain};
use crate::error::Result;
use crate::pow::MiningMode;
use crate::store::ChainStore;
use crate::transaction::Transaction;

/// Cloneable handle for using one [`Blockchain`] from several threads.
///
/// Admission and sealing share the write lock, so a seal can never drop or
/// duplicate a transaction admitted concurrently. Reads share the read lock
/// and wait out any seal in progress.
#[derive(Clone, Debug, Default)]
pub struct SharedLedger {
    inner: Arc<RwLock<Blockchain>>,
}

impl SharedLedger {
    pub fn new(chain: Blockchain) -> Self {
        Self {
            inner: Arc::new(RwLock::new(chain)),
        }
    }

    pub fn add_transaction(&self, tx: Transaction) -> Result<()> {
        self.inner.write().add_transaction(tx)
    }

    pub fn push_pending(&self, tx: Transaction) {
        self.inner.write().push_pending(tx);
    }

    /// Seals the pending queue, returning a copy of the new block.
    pub fn seal_pending(&self, mode: MiningMode, cancel: &AtomicBool) -> Result<Block> {
        let mut chain = self.inner.write();
        chain.seal_pending_with(mode, cancel).cloned()
    }

    pub fn balance_of(&self, address: &str) -> Balance {
        self.inner.read().balance_of(address)
    }

    pub fn balances_through_block(&self, count: usize) -> BTreeMap<String, i128> {
        self.inner.read().balances_through_block(count)
    }

    pub fn is_chain_valid(&self) -> bool {
        self.inner.read().is_chain_valid()
    }

    pub fn block_count(&self) -> usize {
        self.inner.read().block_count()
    }

    pub fn save<S: ChainStore + ?Sized>(&self, store: &S) -> Result<()> {
        self.inner.read().save(store)
    }

    /// Runs `f` against the chain under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&Blockchain) -> R) -> R {
        f(&self.inner.read())
    }
}
