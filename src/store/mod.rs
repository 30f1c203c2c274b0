//! Store module
//!
//! Persistence layer for accounts, entries and transfers.
//! Row-level queries plus transactional orchestration over PostgreSQL.

mod error;
pub mod models;
mod queries;
mod transfer;
mod tx;

pub use error::StoreError;
pub use models::{Account, Entry, ListParams, Transfer};
pub use queries::{Queries, TxQueries};
pub use transfer::{lock_order, LockOrder, TransferTxParams, TransferTxResult};
pub use tx::{Store, TxContext};
