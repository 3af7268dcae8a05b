//! Proof-of-work search over a block's nonce.
//!
//! Every search here is a pure function of the block's content and the
//! difficulty: the block is only read, and the winning nonce and hash come
//! back as a [`Seal`] for the caller to apply.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::block::Block;

/// Outcome of a successful search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Seal {
    pub nonce: u64,
    pub hash: String,
}

/// How the nonce space is walked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MiningMode {
    /// One thread, smallest satisfying nonce from the block's current nonce up.
    #[default]
    Sequential,
    /// Rayon split of the nonce space; returns whichever satisfying nonce is found first.
    Parallel,
}

impl MiningMode {
    pub fn run(self, block: &Block, difficulty: u32, cancel: &AtomicBool) -> Option<Seal> {
        match self {
            MiningMode::Sequential => mine_cancellable(block, difficulty, cancel),
            MiningMode::Parallel => mine_parallel(block, difficulty, cancel),
        }
    }
}

pub fn leading_zero_hex(hash: &str) -> u32 {
    hash.bytes().take_while(|b| *b == b'0').count() as u32
}

/// True when the first `difficulty` hex characters of `hash` are all `'0'`.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    leading_zero_hex(hash) >= difficulty
}

/// Increment the nonce until the block hash meets `difficulty`. No way out
/// other than success; pick a difficulty whose ~16^difficulty attempts are affordable.
pub fn mine(block: &Block, difficulty: u32) -> Seal {
    let preimage = block.preimage();
    let mut nonce = block.nonce;
    loop {
        let hash = preimage.hash_with_nonce(nonce);
        if meets_difficulty(&hash, difficulty) {
            return Seal { nonce, hash };
        }
        nonce = nonce.wrapping_add(1);
    }
}

/// Same walk as [`mine`], giving up with `None` once `cancel` is raised.
pub fn mine_cancellable(block: &Block, difficulty: u32, cancel: &AtomicBool) -> Option<Seal> {
    let preimage = block.preimage();
    let mut nonce = block.nonce;
    loop {
        if cancel.load(Ordering::Relaxed) {
            return None;
        }
        let hash = preimage.hash_with_nonce(nonce);
        if meets_difficulty(&hash, difficulty) {
            return Some(Seal { nonce, hash });
        }
        nonce = nonce.wrapping_add(1);
    }
}

/// Searches nonces in parallel until a hash meets `difficulty` or `cancel` is raised.
pub fn mine_parallel(block: &Block, difficulty: u32, cancel: &AtomicBool) -> Option<Seal> {
    let preimage = block.preimage();

    // A raised flag also satisfies the predicate so every worker stops promptly.
    let nonce = (block.nonce..u64::MAX).into_par_iter().find_any(|nonce| {
        cancel.load(Ordering::Relaxed)
            || meets_difficulty(&preimage.hash_with_nonce(*nonce), difficulty)
    })?;

    let hash = preimage.hash_with_nonce(nonce);
    meets_difficulty(&hash, difficulty).then_some(Seal { nonce, hash })
}
