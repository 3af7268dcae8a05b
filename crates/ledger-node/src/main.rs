mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use config::{NodeConfig, StoreKind};
use ledger_core::{Block, Blockchain, ChainStore, MiningMode, SharedLedger, Transaction};
use ledger_storage::{FileStore, SledStore};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const EMISSION: &str = "emission";
const WALLET_1: &str = "wallet-1";
const WALLET_2: &str = "wallet-2";

#[derive(Parser, Debug)]
#[command(name = "ledger-node")]
#[command(about = "Drive a single-writer proof-of-work ledger stored on disk")]
struct Args {
    /// TOML config file (defaults to ./ledger.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Data directory for the chain snapshot
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Storage backend
    #[arg(long, value_enum)]
    store: Option<StoreKind>,

    /// Leading zero hex digits required when creating a new chain
    #[arg(long)]
    difficulty: Option<u32>,

    /// Search nonces on every core
    #[arg(long)]
    parallel: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a fresh chain: emission to wallet-1, transfer 40 to wallet-2, save, reload
    Demo,
    /// Queue an emission (no admission checks) and seal it
    Emit {
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: i64,
    },
    /// Admit a transfer and seal it
    Transfer {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: i64,
    },
    /// Replayed balance of one address
    Balance { address: String },
    /// Net balances of every address in the first N blocks
    Balances {
        #[arg(long)]
        through: Option<usize>,
    },
    /// Check the whole chain for consistency
    Validate,
    /// Print the stored snapshot
    Show,
}

impl Args {
    fn node_config(&self) -> Result<NodeConfig> {
        let mut config = NodeConfig::load(self.config.as_deref())?;
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(store) = self.store {
            config.store = store;
        }
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if self.parallel {
            config.mining = MiningMode::Parallel;
        }
        config.validate()?;
        Ok(config)
    }
}

fn open_store(config: &NodeConfig) -> Result<Box<dyn ChainStore>> {
    let store: Box<dyn ChainStore> = match config.store {
        StoreKind::File => Box::new(FileStore::in_dir(&config.data_dir)),
        StoreKind::Sled => Box::new(SledStore::open(&config.data_dir)?),
    };
    Ok(store)
}

/// A stored chain that is about to be extended must validate first.
fn load_or_new(store: &dyn ChainStore, config: &NodeConfig) -> Result<Blockchain> {
    Ok(match Blockchain::load_valid(store)? {
        Some(chain) => chain,
        None => {
            info!(difficulty = config.difficulty, "no stored chain, starting from genesis");
            Blockchain::new(config.difficulty)
        }
    })
}

fn load_existing(store: &dyn ChainStore) -> Result<Blockchain> {
    Blockchain::load(store)?.context("no chain has been saved yet; run `demo` or `emit` first")
}

/// Raised by Ctrl-C; polled by the miner between nonces.
fn cancel_on_ctrl_c() -> Arc<AtomicBool> {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, abandoning the block being mined");
            flag.store(true, Ordering::Relaxed);
        }
    });
    cancel
}

/// Mines off the async runtime so the interrupt handler keeps running.
async fn seal(ledger: &SharedLedger, mode: MiningMode, cancel: &Arc<AtomicBool>) -> Result<Block> {
    let ledger = ledger.clone();
    let cancel = Arc::clone(cancel);
    let block = tokio::task::spawn_blocking(move || ledger.seal_pending(mode, &cancel)).await??;
    Ok(block)
}

async fn run_demo(store: &dyn ChainStore, config: &NodeConfig, cancel: &Arc<AtomicBool>) -> Result<()> {
    let ledger = SharedLedger::new(Blockchain::new(config.difficulty));

    ledger.push_pending(Transaction::new(EMISSION, WALLET_1, 100));
    seal(&ledger, config.mining, cancel).await?;

    ledger.add_transaction(Transaction::new(WALLET_1, WALLET_2, 40))?;
    seal(&ledger, config.mining, cancel).await?;

    println!("{}", serde_json::to_string_pretty(&ledger.balances_through_block(3))?);
    ledger.save(store)?;

    let restored = load_existing(store)?;
    info!(
        blocks = restored.block_count(),
        valid = restored.is_chain_valid(),
        "reloaded chain from store"
    );
    println!(
        "{WALLET_1}: {}, {WALLET_2}: {}",
        restored.balance_of(WALLET_1).amount,
        restored.balance_of(WALLET_2).amount
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.node_config()?;
    let store = open_store(&config)?;
    let cancel = cancel_on_ctrl_c();

    match args.cmd {
        Command::Demo => run_demo(store.as_ref(), &config, &cancel).await?,
        Command::Emit { to, amount } => {
            let ledger = SharedLedger::new(load_or_new(store.as_ref(), &config)?);
            ledger.push_pending(Transaction::new(EMISSION, to, amount));
            let block = seal(&ledger, config.mining, &cancel).await?;
            ledger.save(store.as_ref())?;
            println!("{}", block.hash);
        }
        Command::Transfer { from, to, amount } => {
            let chain = Blockchain::load_valid(store.as_ref())?
                .context("no chain has been saved yet; run `demo` or `emit` first")?;
            let ledger = SharedLedger::new(chain);
            ledger.add_transaction(Transaction::new(from, to, amount))?;
            let block = seal(&ledger, config.mining, &cancel).await?;
            ledger.save(store.as_ref())?;
            println!("{}", block.hash);
        }
        Command::Balance { address } => {
            let chain = load_existing(store.as_ref())?;
            println!("{}", serde_json::to_string_pretty(&chain.balance_of(&address))?);
        }
        Command::Balances { through } => {
            let chain = load_existing(store.as_ref())?;
            let count = through.unwrap_or_else(|| chain.block_count());
            println!(
                "{}",
                serde_json::to_string_pretty(&chain.balances_through_block(count))?
            );
        }
        Command::Validate => {
            let chain = load_existing(store.as_ref())?;
            if let Err(fault) = chain.validate() {
                bail!("chain is invalid: {fault}");
            }
            println!("chain of {} blocks is valid", chain.block_count());
        }
        Command::Show => {
            let chain = load_existing(store.as_ref())?;
            println!("{}", serde_json::to_string_pretty(&chain.to_snapshot())?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::MemoryStore;

    #[test]
    fn load_or_new_starts_fresh_on_empty_store() {
        let store = MemoryStore::new();
        let config = NodeConfig::default();
        let chain = load_or_new(&store, &config).unwrap();
        assert_eq!(chain.block_count(), 1);
        assert_eq!(chain.difficulty(), config.difficulty);
    }

    #[test]
    fn load_or_new_refuses_to_extend_tampered_chain() {
        let store = MemoryStore::new();
        let mut chain = Blockchain::new(1);
        chain.push_pending(Transaction::new(EMISSION, WALLET_1, 100));
        chain.seal_pending();
        chain.save(&store).unwrap();
        assert!(load_or_new(&store, &NodeConfig::default()).is_ok());

        let mut snapshot = chain.to_snapshot();
        snapshot.chain[1].transactions[0].to = WALLET_2.into();
        store.save(&serde_json::to_vec(&snapshot).unwrap()).unwrap();

        let err = load_or_new(&store, &NodeConfig::default()).unwrap_err();
        assert!(err.to_string().contains("stored chain is invalid"), "{err}");
    }
}
