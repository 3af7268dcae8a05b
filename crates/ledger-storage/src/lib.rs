//! Storage collaborators for `ledger-core`.
//!
//! Both backends implement [`ledger_core::ChainStore`] and keep the chain as
//! one opaque blob; they never look inside it.

pub mod file_store;
pub mod sled_store;

pub use file_store::FileStore;
pub use sled_store::SledStore;
