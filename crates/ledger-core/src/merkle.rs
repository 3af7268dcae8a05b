//! Pairwise reduction of block fingerprints into a single root.

use crate::constants::SENTINEL_HASH;
use crate::hash::hash_pair;

/// Compute the merkle root of a list of hex fingerprints.
///
/// Pairs are combined as `sha256(left ‖ right)`. An unpaired last element is
/// carried up to the next level unchanged rather than hashed with itself.
/// Returns the sentinel `"0"` for an empty list.
pub fn merkle_root(hashes: &[String]) -> String {
    let Some(first) = hashes.first() else {
        return SENTINEL_HASH.to_string();
    };
    if hashes.len() == 1 {
        return first.clone();
    }

    let mut level = hashes.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => hash_pair(left, right),
                _ => pair[0].clone(),
            })
            .collect();
    }
    level.swap_remove(0)
}
