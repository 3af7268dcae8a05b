use anyhow::{Context, Result};
use ledger_core::ChainStore;
use sled::Db;
use std::path::Path;
use tracing::{debug, info};

const TREE_CHAIN: &str = "chain";
const KEY_SNAPSHOT: &[u8] = b"snapshot";

#[derive(Clone)]
pub struct SledStore {
  db: Db,
}

impl SledStore {
  pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
    let path = path.as_ref();
    let db = sled::open(path)
      .with_context(|| format!("opening sled store at {}", path.display()))?;
    info!(path = %path.display(), "sled store opened");
    Ok(Self { db })
  }

  /// A store that lives in memory and is discarded on drop.
  pub fn open_temporary() -> Result<Self> {
    let db = sled::Config::new().temporary(true).open()?;
    Ok(Self { db })
  }

  fn chain_tree(&self) -> Result<sled::Tree> {
    Ok(self.db.open_tree(TREE_CHAIN)?)
  }

  /// Drops the saved snapshot, if any.
  pub fn clear(&self) -> Result<()> {
    self.chain_tree()?.clear()?;
    self.db.flush()?;
    Ok(())
  }

  /// Flushes outstanding writes to disk.
  pub fn close(&self) -> Result<()> {
    self.db.flush()?;
    Ok(())
  }
}

impl ChainStore for SledStore {
  fn load(&self) -> Result<Option<Vec<u8>>> {
    let blob = self.chain_tree()?.get(KEY_SNAPSHOT)?;
    Ok(blob.map(|ivec| ivec.to_vec()))
  }

  fn save(&self, bytes: &[u8]) -> Result<()> {
    self.chain_tree()?.insert(KEY_SNAPSHOT, bytes)?;
    self.db.flush()?;
    debug!(bytes = bytes.len(), "snapshot written to sled");
    Ok(())
  }
}
