//! simple_bank Library
//!
//! Transactional money transfers over PostgreSQL: row-level queries, a
//! transaction executor and the transfer orchestrator, plus a thin HTTP API.

pub mod api;
pub mod handlers;
pub mod store;

pub mod config;
pub mod db;
mod error;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use store::{Store, StoreError, TransferTxParams, TransferTxResult, TxContext};
