use anyhow::{Context, Result};
use ledger_core::ChainStore;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_FILE_NAME: &str = "chain.json";

/// Keeps the snapshot in a single file, replaced atomically on save.
#[derive(Clone, Debug)]
pub struct FileStore {
  path: PathBuf,
}

impl FileStore {
  pub fn new<P: Into<PathBuf>>(path: P) -> Self {
    Self { path: path.into() }
  }

  /// `<dir>/chain.json`
  pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
    Self::new(dir.as_ref().join(DEFAULT_FILE_NAME))
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl ChainStore for FileStore {
  fn load(&self) -> Result<Option<Vec<u8>>> {
    match fs::read(&self.path) {
      Ok(bytes) => Ok(Some(bytes)),
      Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
      Err(err) => Err(err).with_context(|| format!("reading {}", self.path.display())),
    }
  }

  fn save(&self, bytes: &[u8]) -> Result<()> {
    if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
      fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let tmp = self.path.with_extension("tmp");
    fs::write(&tmp, bytes).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, &self.path)
      .with_context(|| format!("replacing {}", self.path.display()))?;
    debug!(path = %self.path.display(), bytes = bytes.len(), "snapshot written");
    Ok(())
  }
}
