pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const DEFAULT_DIFFICULTY: u32 = 2;
pub const MAX_DIFFICULTY: u32 = HASH_HEX_SIZE as u32;
/// Stand-in for "no predecessor" and "no merkle root" in the genesis block.
pub const SENTINEL_HASH: &str = "0";
/// 1945-01-01T00:00:00Z in milliseconds since the Unix epoch.
pub const GENESIS_TIMESTAMP_MS: i64 = -788_918_400_000;
