#![allow(dead_code)]

use std::fs;

use ledger_core::{Blockchain, Transaction};
use ledger_storage::{FileStore, SledStore};
use tempfile::{tempdir, TempDir};

pub fn create_temp_store() -> (TempDir, SledStore) {
    // Create a temporary directory for the sled database
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let db_path = temp_dir.path().to_path_buf();
    (
        temp_dir,
        SledStore::open(db_path).expect("Failed to open SledStore"),
    )
}

pub fn create_temp_file_store() -> (TempDir, FileStore) {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let store = FileStore::in_dir(temp_dir.path());
    (temp_dir, store)
}

pub fn teardown_store(temp_dir: TempDir, store: SledStore) {
    let db_path = temp_dir.path().to_path_buf();
    store.clear().expect("Failed to clear the store");
    drop(store);
    temp_dir.close().expect("Failed to delete temp dir");
    let _ = fs::remove_dir_all(&db_path);
    // Verify the directory is removed
    assert!(!db_path.exists(), "Database directory should be removed");
}

/// Genesis, an emission of 100 to wallet-1, then 40 from wallet-1 to wallet-2.
pub fn two_wallet_chain() -> Blockchain {
    let mut coin = Blockchain::new(1);
    coin.push_pending(Transaction::new("emission", "wallet-1", 100));
    coin.seal_pending();
    coin.add_transaction(Transaction::new("wallet-1", "wallet-2", 40))
        .expect("wallet-1 was funded");
    coin.seal_pending();
    coin
}
