use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use tracing::{debug, info, warn};

use crate::block::Block;
use crate::constants::{DEFAULT_DIFFICULTY, MAX_DIFFICULTY};
use crate::error::{ChainFault, LedgerError, Result};
use crate::merkle::merkle_root;
use crate::pow::MiningMode;
use crate::store::ChainStore;
use crate::transaction::{now_millis, Transaction};

/// Replayed balance of one address.
///
/// `min` and `max` are the low and high watermarks of the running balance,
/// sampled after every transaction touching the address. Both stay `None`
/// for an address no transaction has touched. Replay accumulates in `i128`,
/// so no sequence of `i64` amounts can overflow it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub amount: i128,
    pub min: Option<i128>,
    pub max: Option<i128>,
}

/// Persisted form of a chain. Pending transactions are not part of it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub difficulty: u32,
    pub chain: Vec<Block>,
}

/// Single-writer ledger: the sealed chain plus the queue awaiting the next block.
#[derive(Clone, Debug)]
pub struct Blockchain {
    chain: Vec<Block>,
    difficulty: u32,
    pending: Vec<Transaction>,
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new(DEFAULT_DIFFICULTY)
    }
}

impl Blockchain {
    /// A fresh chain holding only the genesis block.
    pub fn new(difficulty: u32) -> Self {
        Self {
            chain: vec![Self::create_genesis_block()],
            difficulty,
            pending: Vec::new(),
        }
    }

    /// Rebuilds a chain from previously sealed blocks.
    ///
    /// The supplied first block is kept as-is rather than replaced by the
    /// canonical genesis; a corrupted one is caught by [`Self::is_chain_valid`].
    pub fn from_parts(chain: Vec<Block>, difficulty: u32) -> Result<Self> {
        if chain.is_empty() {
            return Err(LedgerError::EmptyChain);
        }
        if difficulty > MAX_DIFFICULTY {
            return Err(LedgerError::DifficultyOutOfRange { difficulty });
        }
        Ok(Self {
            chain,
            difficulty,
            pending: Vec::new(),
        })
    }

    pub fn create_genesis_block() -> Block {
        Block::genesis()
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.chain.get(index)
    }

    /// Number of sealed blocks, genesis included. Never zero.
    pub fn block_count(&self) -> usize {
        self.chain.len()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn pending_transactions(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn latest_block(&self) -> &Block {
        self.chain
            .last()
            .expect("chain always holds at least the genesis block")
    }

    /// Queues a transaction without running the admission checks.
    /// Used for emission, where the sender has no balance to draw from.
    pub fn push_pending(&mut self, tx: Transaction) {
        debug!(from = %tx.from, to = %tx.to, amount = tx.amount, "transaction queued without admission");
        self.pending.push(tx);
    }

    /// Admission gate: validates `tx` against the sealed chain and queues it.
    ///
    /// The sender's balance is replayed from sealed blocks only, so transactions
    /// still waiting in the queue are not counted against it.
    pub fn add_transaction(&mut self, tx: Transaction) -> Result<()> {
        if let Err(err) = self.admit(&tx) {
            warn!(from = %tx.from, to = %tx.to, amount = tx.amount, "transaction rejected: {err}");
            return Err(err);
        }
        debug!(from = %tx.from, to = %tx.to, amount = tx.amount, "transaction added");
        self.pending.push(tx);
        Ok(())
    }

    fn admit(&self, tx: &Transaction) -> Result<()> {
        if tx.from.is_empty() || tx.to.is_empty() {
            return Err(LedgerError::InvalidTransaction);
        }
        if tx.amount <= 0 {
            return Err(LedgerError::InvalidAmount { amount: tx.amount });
        }
        let balance = self.balance_of(&tx.from).amount;
        if balance < i128::from(tx.amount) {
            return Err(LedgerError::InsufficientBalance {
                address: tx.from.clone(),
                balance,
                amount: tx.amount,
            });
        }
        Ok(())
    }

    /// Replays every sealed block in order to derive the balance of `address`.
    pub fn balance_of(&self, address: &str) -> Balance {
        let mut balance = Balance::default();
        for tx in self.chain.iter().flat_map(|b| &b.transactions) {
            if !tx.touches(address) {
                continue;
            }
            if tx.from == address {
                balance.amount -= i128::from(tx.amount);
            }
            if tx.to == address {
                balance.amount += i128::from(tx.amount);
            }
            let now = balance.amount;
            balance.min = Some(balance.min.map_or(now, |m| m.min(now)));
            balance.max = Some(balance.max.map_or(now, |m| m.max(now)));
        }
        balance
    }

    /// Net delta of every address mentioned in the first `count` blocks.
    pub fn balances_through_block(&self, count: usize) -> BTreeMap<String, i128> {
        let mut balances = BTreeMap::new();
        let upto = count.min(self.chain.len());
        for tx in self.chain[..upto].iter().flat_map(|b| &b.transactions) {
            let amount = i128::from(tx.amount);
            *balances.entry(tx.from.clone()).or_insert(0) -= amount;
            *balances.entry(tx.to.clone()).or_insert(0) += amount;
        }
        balances
    }

    /// Merkle root over the hashes of every sealed block.
    pub fn merkle_root(&self) -> String {
        self.merkle_root_of_prefix(self.chain.len())
    }

    /// Merkle root over the hashes of `chain[..len]`.
    pub fn merkle_root_of_prefix(&self, len: usize) -> String {
        let upto = len.min(self.chain.len());
        let hashes: Vec<String> = self.chain[..upto].iter().map(|b| b.hash.clone()).collect();
        merkle_root(&hashes)
    }

    /// The next block before mining. Its merkle root summarizes the blocks
    /// already sealed, never the candidate itself.
    fn candidate_block(&self) -> Block {
        Block::new(
            now_millis(),
            self.pending.clone(),
            self.merkle_root(),
            self.latest_block().hash.clone(),
        )
    }

    fn append(&mut self, block: Block) -> &Block {
        info!(
            index = self.chain.len(),
            txs = block.transactions.len(),
            nonce = block.nonce,
            "sealed block {}",
            block.hash
        );
        self.chain.push(block);
        self.pending.clear();
        self.latest_block()
    }

    /// Mines the pending queue into a new block and appends it. Runs until a
    /// nonce is found; see [`Self::seal_pending_with`] for a cancellable form.
    pub fn seal_pending(&mut self) -> &Block {
        let block = self.candidate_block().mined(self.difficulty);
        self.append(block)
    }

    /// Like [`Self::seal_pending`], but stops when `cancel` is raised. On
    /// cancellation the chain and the pending queue are left untouched.
    pub fn seal_pending_with(&mut self, mode: MiningMode, cancel: &AtomicBool) -> Result<&Block> {
        let candidate = self.candidate_block();
        let seal = mode
            .run(&candidate, self.difficulty, cancel)
            .ok_or(LedgerError::MiningCancelled)?;
        Ok(self.append(candidate.with_seal(seal)))
    }

    /// Scans the whole chain and reports the first inconsistency, if any.
    pub fn validate(&self) -> std::result::Result<(), ChainFault> {
        if self.chain[0] != Self::create_genesis_block() {
            return Err(ChainFault::Genesis);
        }

        let hashes: Vec<String> = self.chain.iter().map(|b| b.hash.clone()).collect();
        for (index, pair) in self.chain.windows(2).enumerate() {
            let (previous, current) = (&pair[0], &pair[1]);
            let index = index + 1;

            if current.merkle_root != merkle_root(&hashes[..index]) {
                return Err(ChainFault::MerkleRoot { index });
            }
            if !current.has_valid_hash() {
                return Err(ChainFault::Hash { index });
            }
            if current.previous_hash != previous.hash {
                return Err(ChainFault::PreviousHash { index });
            }
        }
        Ok(())
    }

    pub fn is_chain_valid(&self) -> bool {
        match self.validate() {
            Ok(()) => true,
            Err(fault) => {
                warn!("chain invalid: {fault}");
                false
            }
        }
    }

    pub fn to_snapshot(&self) -> ChainSnapshot {
        ChainSnapshot {
            difficulty: self.difficulty,
            chain: self.chain.clone(),
        }
    }

    pub fn from_snapshot(snapshot: ChainSnapshot) -> Result<Self> {
        Self::from_parts(snapshot.chain, snapshot.difficulty)
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.to_snapshot())?)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Self::from_snapshot(serde_json::from_slice(bytes)?)
    }

    pub fn save<S: ChainStore + ?Sized>(&self, store: &S) -> Result<()> {
        store.save(&self.to_json()?)?;
        info!(blocks = self.chain.len(), "chain saved");
        Ok(())
    }

    /// Reads the chain back from `store`; `None` if nothing was saved there.
    pub fn load<S: ChainStore + ?Sized>(store: &S) -> Result<Option<Self>> {
        match store.load()? {
            Some(bytes) => Ok(Some(Self::from_json(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Like [`Self::load`], but refuses a chain that fails [`Self::validate`].
    /// Use this before extending a stored chain.
    pub fn load_valid<S: ChainStore + ?Sized>(store: &S) -> Result<Option<Self>> {
        let Some(chain) = Self::load(store)? else {
            return Ok(None);
        };
        chain.validate()?;
        Ok(Some(chain))
    }
}
