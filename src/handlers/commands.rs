//! Command definitions
//!
//! Commands represent intentions to change the system state.

use serde::{Deserialize, Serialize};

/// Currencies accounts may be opened in
pub const SUPPORTED_CURRENCIES: &[&str] = &["USD", "EUR", "CAD"];

/// Check if a currency code is supported
pub fn is_supported_currency(currency: &str) -> bool {
    SUPPORTED_CURRENCIES.contains(&currency)
}

// =========================================================================
// CreateAccountCommand
// =========================================================================

/// Command to open a new account with zero balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountCommand {
    pub owner: String,
    pub currency: String,
}

impl CreateAccountCommand {
    pub fn new(owner: String, currency: String) -> Self {
        Self { owner, currency }
    }
}

// =========================================================================
// TransferCommand
// =========================================================================

/// Command to transfer money between accounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferCommand {
    pub from_account_id: i64,
    pub to_account_id: i64,
    /// Amount in the smallest currency unit
    pub amount: i64,
    /// Both accounts must hold this currency
    pub currency: String,
}

impl TransferCommand {
    pub fn new(from_account_id: i64, to_account_id: i64, amount: i64, currency: String) -> Self {
        Self {
            from_account_id,
            to_account_id,
            amount,
            currency,
        }
    }
}
