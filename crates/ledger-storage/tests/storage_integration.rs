mod helpers;

use helpers::{create_temp_file_store, create_temp_store, teardown_store, two_wallet_chain};
use ledger_core::{Blockchain, ChainStore, Transaction};
use ledger_storage::{FileStore, SledStore};
use std::fs;
use std::sync::Arc;

#[tokio::test]
async fn test_sled_round_trip() -> anyhow::Result<()> {
    let (temp_dir, store) = create_temp_store();
    assert!(store.load()?.is_none());

    let coin = two_wallet_chain();
    coin.save(&store)?;

    let restored = Blockchain::load(&store)?.expect("snapshot should exist");
    assert_eq!(restored.chain(), coin.chain());
    assert_eq!(restored.balance_of("wallet-1").amount, 60);
    assert_eq!(restored.balance_of("wallet-2").amount, 40);
    assert!(restored.is_chain_valid());

    teardown_store(temp_dir, store);
    Ok(())
}

#[tokio::test]
async fn test_sled_persistence_across_reopen() -> anyhow::Result<()> {
    let (temp_dir, store) = create_temp_store();
    let db_path = temp_dir.path().to_path_buf();
    let coin = two_wallet_chain();
    coin.save(&store)?;
    store.close()?;
    // `store` dropped here -> lock released
    drop(store);

    let store = SledStore::open(&db_path)?;
    let restored = Blockchain::load(&store)?.expect("snapshot should survive reopen");
    assert_eq!(restored.block_count(), 3);
    assert!(restored.is_chain_valid());

    teardown_store(temp_dir, store);
    Ok(())
}

#[tokio::test]
async fn test_sled_save_overwrites_previous_snapshot() -> anyhow::Result<()> {
    let store = SledStore::open_temporary()?;
    let mut coin = two_wallet_chain();
    coin.save(&store)?;

    coin.add_transaction(Transaction::new("wallet-2", "wallet-3", 5))?;
    coin.seal_pending();
    coin.save(&store)?;

    let restored = Blockchain::load(&store)?.expect("snapshot should exist");
    assert_eq!(restored.block_count(), 4);
    assert_eq!(restored.balance_of("wallet-3").amount, 5);
    Ok(())
}

#[tokio::test]
async fn test_sled_clear() -> anyhow::Result<()> {
    let store = SledStore::open_temporary()?;
    store.save(b"opaque")?;
    assert_eq!(store.load()?.as_deref(), Some(&b"opaque"[..]));
    store.clear()?;
    assert!(store.load()?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_sled_concurrent_readers() -> anyhow::Result<()> {
    let store = Arc::new(SledStore::open_temporary()?);
    two_wallet_chain().save(&*store)?;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = Arc::clone(&store);
        handles.push(tokio::task::spawn_blocking(move || {
            let coin = Blockchain::load(&*store).unwrap().unwrap();
            coin.is_chain_valid()
        }));
    }
    for handle in handles {
        assert!(handle.await?);
    }
    Ok(())
}

#[tokio::test]
async fn test_sled_corrupted_blob_is_reported() -> anyhow::Result<()> {
    let store = SledStore::open_temporary()?;
    store.save(&[0u8; 10])?;
    assert!(Blockchain::load(&store).is_err());
    Ok(())
}

#[tokio::test]
async fn test_file_round_trip() -> anyhow::Result<()> {
    let (temp_dir, store) = create_temp_file_store();
    assert!(store.load()?.is_none());

    let coin = two_wallet_chain();
    coin.save(&store)?;
    assert!(store.path().exists());

    // the blob is the pretty-printed JSON snapshot
    let text = fs::read_to_string(store.path())?;
    assert!(text.contains("\"previousHash\""));
    assert!(text.contains("\"difficulty\": 1"));

    let restored = Blockchain::load(&store)?.expect("snapshot should exist");
    assert_eq!(restored.chain(), coin.chain());
    assert!(restored.is_chain_valid());

    temp_dir.close()?;
    Ok(())
}

#[tokio::test]
async fn test_file_store_creates_parent_dirs() -> anyhow::Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let store = FileStore::in_dir(temp_dir.path().join("nested").join("data"));
    store.save(b"{}")?;
    assert_eq!(store.load()?, Some(b"{}".to_vec()));
    temp_dir.close()?;
    Ok(())
}

#[tokio::test]
async fn test_file_tampering_detected_after_load() -> anyhow::Result<()> {
    let (temp_dir, store) = create_temp_file_store();
    two_wallet_chain().save(&store)?;

    let text = fs::read_to_string(store.path())?;
    fs::write(store.path(), text.replacen("\"amount\": 40", "\"amount\": 4", 1))?;

    let tampered = Blockchain::load(&store)?.expect("snapshot should exist");
    assert!(!tampered.is_chain_valid());

    temp_dir.close()?;
    Ok(())
}
