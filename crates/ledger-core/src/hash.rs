//! SHA-256 helpers producing lowercase hex fingerprints.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of `bytes`.
pub fn sha256_hex(bytes: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(bytes.as_ref()))
}

/// Parent fingerprint of two children: the digest of their hex forms concatenated.
pub fn hash_pair(left: &str, right: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::HASH_HEX_SIZE;

    #[test]
    fn sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(sha256_hex(b"").len(), HASH_HEX_SIZE);
    }

    #[test]
    fn hash_pair_is_digest_of_concatenation() {
        assert_eq!(hash_pair("ab", "c"), sha256_hex("abc"));
        assert_ne!(hash_pair("a", "b"), hash_pair("b", "a"));
    }
}
