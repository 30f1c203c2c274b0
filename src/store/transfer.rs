//! Transfer Orchestrator
//!
//! Moves money between two accounts as one unit of work: a transfer row,
//! two balancing entries and two atomic balance updates.

use futures::FutureExt;
use serde::{Deserialize, Serialize};

use super::models::{
    Account, AddAccountBalanceParams, CreateEntryParams, CreateTransferParams, Entry, Transfer,
};
use super::queries::TxQueries;
use super::tx::{Store, TxContext};
use super::StoreError;

/// Input of a money transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTxParams {
    pub from_account_id: i64,
    pub to_account_id: i64,
    /// Positive amount in the smallest currency unit
    pub amount: i64,
}

/// Everything written by a committed transfer, as seen inside its transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTxResult {
    pub transfer: Transfer,
    pub from_account: Account,
    pub to_account: Account,
    pub from_entry: Entry,
    pub to_entry: Entry,
}

/// Which side of a transfer has its balance row locked first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOrder {
    SourceFirst,
    DestinationFirst,
}

/// Balance updates always go in ascending account id order, whatever the
/// direction of the transfer. Equal ids touch a single row, source first.
pub fn lock_order(from_account_id: i64, to_account_id: i64) -> LockOrder {
    if from_account_id <= to_account_id {
        LockOrder::SourceFirst
    } else {
        LockOrder::DestinationFirst
    }
}

impl Store {
    // =========================================================================
    // transfer_tx
    // =========================================================================

    /// Perform a money transfer.
    ///
    /// Creates the transfer record, adds both account entries and updates
    /// both balances within a single database transaction. Any failing step
    /// rolls back everything and its error is returned as is.
    ///
    /// Amount and account existence are not validated here; an unknown
    /// account fails the first statement that touches it.
    ///
    /// Other code paths that update two account balances in one transaction
    /// must follow the same ascending-id order, or they can deadlock with
    /// concurrent transfers.
    pub async fn transfer_tx(
        &self,
        ctx: &TxContext,
        arg: TransferTxParams,
    ) -> Result<TransferTxResult, StoreError> {
        let tx_name = ctx.name().unwrap_or("-").to_string();

        let result = self
            .exec_tx(ctx, move |mut q| {
                async move {
                    tracing::debug!(tx_name = %tx_name, "create transfer");
                    let transfer = q
                        .create_transfer(CreateTransferParams {
                            from_account_id: arg.from_account_id,
                            to_account_id: arg.to_account_id,
                            amount: arg.amount,
                        })
                        .await?;

                    tracing::debug!(tx_name = %tx_name, "create entry 1");
                    let from_entry = q
                        .create_entry(CreateEntryParams {
                            account_id: arg.from_account_id,
                            amount: -arg.amount,
                        })
                        .await?;

                    tracing::debug!(tx_name = %tx_name, "create entry 2");
                    let to_entry = q
                        .create_entry(CreateEntryParams {
                            account_id: arg.to_account_id,
                            amount: arg.amount,
                        })
                        .await?;

                    let (from_account, to_account) =
                        match lock_order(arg.from_account_id, arg.to_account_id) {
                            LockOrder::SourceFirst => {
                                add_money(
                                    &mut q,
                                    &tx_name,
                                    arg.from_account_id,
                                    -arg.amount,
                                    arg.to_account_id,
                                    arg.amount,
                                )
                                .await?
                            }
                            LockOrder::DestinationFirst => {
                                let (to_account, from_account) = add_money(
                                    &mut q,
                                    &tx_name,
                                    arg.to_account_id,
                                    arg.amount,
                                    arg.from_account_id,
                                    -arg.amount,
                                )
                                .await?;
                                (from_account, to_account)
                            }
                        };

                    Ok::<_, StoreError>(TransferTxResult {
                        transfer,
                        from_account,
                        to_account,
                        from_entry,
                        to_entry,
                    })
                }
                .boxed()
            })
            .await?;

        tracing::info!(
            transfer_id = result.transfer.id,
            from_account_id = arg.from_account_id,
            to_account_id = arg.to_account_id,
            amount = arg.amount,
            "Transfer committed"
        );

        Ok(result)
    }
}

/// Apply two balance deltas in the given order, returning the updated
/// accounts in the same order.
async fn add_money(
    q: &mut TxQueries<'_>,
    tx_name: &str,
    account_id1: i64,
    amount1: i64,
    account_id2: i64,
    amount2: i64,
) -> Result<(Account, Account), StoreError> {
    tracing::debug!(tx_name = %tx_name, account_id = account_id1, "update account 1");
    let account1 = q
        .add_account_balance(AddAccountBalanceParams {
            id: account_id1,
            amount: amount1,
        })
        .await?;

    tracing::debug!(tx_name = %tx_name, account_id = account_id2, "update account 2");
    let account2 = q
        .add_account_balance(AddAccountBalanceParams {
            id: account_id2,
            amount: amount2,
        })
        .await?;

    Ok((account1, account2))
}
