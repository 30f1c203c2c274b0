//! Command Handlers module
//!
//! Validate incoming commands and call into the store.

mod account_handler;
mod commands;
mod transfer_handler;

#[cfg(test)]
mod tests;

pub use account_handler::AccountHandler;
pub use commands::*;
pub use transfer_handler::TransferHandler;
