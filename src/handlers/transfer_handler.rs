//! Transfer Handler
//!
//! Validates transfer requests and hands them to the store.

use crate::error::AppError;
use crate::store::{Store, StoreError, TransferTxParams, TransferTxResult, TxContext};

use super::{is_supported_currency, TransferCommand};

// =========================================================================
// TransferHandler
// =========================================================================

/// Handler for money transfers
pub struct TransferHandler {
    store: Store,
}

impl TransferHandler {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Execute the transfer command
    pub async fn execute(
        &self,
        command: TransferCommand,
        context: &TxContext,
    ) -> Result<TransferTxResult, AppError> {
        validate(&command)?;

        // Both accounts must exist and hold the requested currency
        self.check_account(command.from_account_id, &command.currency)
            .await?;
        self.check_account(command.to_account_id, &command.currency)
            .await?;

        let result = self
            .store
            .transfer_tx(
                context,
                TransferTxParams {
                    from_account_id: command.from_account_id,
                    to_account_id: command.to_account_id,
                    amount: command.amount,
                },
            )
            .await?;

        Ok(result)
    }

    async fn check_account(&self, account_id: i64, currency: &str) -> Result<(), AppError> {
        let account = match self.store.queries().await?.get_account(account_id).await {
            Ok(account) => account,
            Err(sqlx::Error::RowNotFound) => return Err(AppError::AccountNotFound(account_id)),
            Err(e) => return Err(AppError::Store(StoreError::Database(e))),
        };

        if account.currency != currency {
            return Err(AppError::CurrencyMismatch {
                account_id,
                expected: currency.to_string(),
                found: account.currency,
            });
        }

        Ok(())
    }
}

/// Checks that need no database access
fn validate(command: &TransferCommand) -> Result<(), AppError> {
    if command.amount <= 0 {
        return Err(AppError::InvalidRequest(format!(
            "amount must be positive (got {})",
            command.amount
        )));
    }

    if command.from_account_id == command.to_account_id {
        return Err(AppError::SameAccountTransfer);
    }

    if !is_supported_currency(&command.currency) {
        return Err(AppError::InvalidRequest(format!(
            "unsupported currency: {}",
            command.currency
        )));
    }

    Ok(())
}
