use anyhow::Result;
use parking_lot::Mutex;

/// Storage collaborator holding the serialized chain as one opaque blob.
/// This lives in `ledger-core` so the chain can load and save itself
/// without depending on any particular backend.
pub trait ChainStore: Send + Sync {
    /// The last saved blob, or `None` if nothing has been saved yet.
    fn load(&self) -> Result<Option<Vec<u8>>>;
    fn save(&self, bytes: &[u8]) -> Result<()>;
}

/// Process-local store, mostly useful in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blob: Mutex<Option<Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChainStore for MemoryStore {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.blob.lock().clone())
    }

    fn save(&self, bytes: &[u8]) -> Result<()> {
        *self.blob.lock() = Some(bytes.to_vec());
        Ok(())
    }
}
