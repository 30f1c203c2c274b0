//! Account Handler
//!
//! Opens new accounts with a zero balance.

use crate::error::AppError;
use crate::store::models::CreateAccountParams;
use crate::store::{Account, Store};

use super::{is_supported_currency, CreateAccountCommand};

/// Handler for account creation
pub struct AccountHandler {
    store: Store,
}

impl AccountHandler {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Execute the create account command
    pub async fn create(&self, command: CreateAccountCommand) -> Result<Account, AppError> {
        let owner = command.owner.trim();
        if owner.is_empty() {
            return Err(AppError::InvalidRequest("owner must not be empty".to_string()));
        }

        if !is_supported_currency(&command.currency) {
            return Err(AppError::InvalidRequest(format!(
                "unsupported currency: {}",
                command.currency
            )));
        }

        let account = self
            .store
            .queries()
            .await?
            .create_account(CreateAccountParams {
                owner: owner.to_string(),
                balance: 0,
                currency: command.currency,
            })
            .await?;

        tracing::info!(
            account_id = account.id,
            currency = %account.currency,
            "Account created"
        );

        Ok(account)
    }
}
