//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::handlers::{AccountHandler, CreateAccountCommand, TransferCommand, TransferHandler};
use crate::store::{Account, Entry, ListParams, Transfer, TransferTxResult, TxContext};

use super::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    pub owner: String,
    pub currency: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
    pub currency: String,
}

/// 1-based page selection for list endpoints
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page_id")]
    pub page_id: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page_id() -> i64 {
    1
}

fn default_page_size() -> i64 {
    10
}

const MIN_PAGE_SIZE: i64 = 5;
const MAX_PAGE_SIZE: i64 = 100;

impl PageQuery {
    fn to_params(&self) -> Result<ListParams, AppError> {
        if self.page_id < 1 {
            return Err(AppError::InvalidRequest("page_id must be at least 1".to_string()));
        }
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(AppError::InvalidRequest(format!(
                "page_size must be between {} and {}",
                MIN_PAGE_SIZE, MAX_PAGE_SIZE
            )));
        }
        ListParams::page(self.page_id, self.page_size)
            .ok_or_else(|| AppError::InvalidRequest("page_id is too large".to_string()))
    }
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        // Accounts
        .route("/accounts", post(create_account).get(list_accounts))
        .route("/accounts/:account_id", get(get_account).delete(delete_account))
        .route("/accounts/:account_id/entries", get(list_account_entries))
        // Entries
        .route("/entries/:entry_id", get(get_entry))
        // Transfers
        .route("/transfers", post(transfer).get(list_transfers))
        .route("/transfers/:transfer_id", get(get_transfer))
}

/// Map a missing row to the given not-found error
fn not_found(err: sqlx::Error, missing: AppError) -> AppError {
    match err {
        sqlx::Error::RowNotFound => missing,
        other => AppError::Database(other),
    }
}

// =========================================================================
// Accounts
// =========================================================================

/// Open a new account
async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<Account>), AppError> {
    let handler = AccountHandler::new(state.store);

    let account = handler
        .create(CreateAccountCommand::new(request.owner, request.currency))
        .await?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// Get account by ID
async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
) -> Result<Json<Account>, AppError> {
    let account = state
        .store
        .queries()
        .await?
        .get_account(account_id)
        .await
        .map_err(|e| not_found(e, AppError::AccountNotFound(account_id)))?;

    Ok(Json(account))
}

/// List accounts page by page
async fn list_accounts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Account>>, AppError> {
    let params = query.to_params()?;
    let accounts = state.store.queries().await?.list_accounts(params).await?;

    Ok(Json(accounts))
}

/// Delete an account. Fails with 409 while entries or transfers reference it.
async fn delete_account(
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let mut queries = state.store.queries().await?;

    queries
        .get_account(account_id)
        .await
        .map_err(|e| not_found(e, AppError::AccountNotFound(account_id)))?;
    queries.delete_account(account_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Ledger entries of one account
async fn list_account_entries(
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Entry>>, AppError> {
    let params = query.to_params()?;
    let entries = state
        .store
        .queries()
        .await?
        .list_entries_by_account(account_id, params)
        .await?;

    Ok(Json(entries))
}

// =========================================================================
// Entries
// =========================================================================

/// Get entry by ID
async fn get_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<i64>,
) -> Result<Json<Entry>, AppError> {
    let entry = state
        .store
        .queries()
        .await?
        .get_entry(entry_id)
        .await
        .map_err(|e| not_found(e, AppError::EntryNotFound(entry_id)))?;

    Ok(Json(entry))
}

// =========================================================================
// Transfers
// =========================================================================

/// Transfer money between accounts
async fn transfer(
    State(state): State<AppState>,
    Extension(context): Extension<TxContext>,
    Json(request): Json<TransferRequest>,
) -> Result<(StatusCode, Json<TransferTxResult>), AppError> {
    let handler = TransferHandler::new(state.store);

    let command = TransferCommand::new(
        request.from_account_id,
        request.to_account_id,
        request.amount,
        request.currency,
    );

    let result = handler.execute(command, &context).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

/// Get transfer by ID
async fn get_transfer(
    State(state): State<AppState>,
    Path(transfer_id): Path<i64>,
) -> Result<Json<Transfer>, AppError> {
    let transfer = state
        .store
        .queries()
        .await?
        .get_transfer(transfer_id)
        .await
        .map_err(|e| not_found(e, AppError::TransferNotFound(transfer_id)))?;

    Ok(Json(transfer))
}

/// List transfers page by page
async fn list_transfers(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Transfer>>, AppError> {
    let params = query.to_params()?;
    let transfers = state.store.queries().await?.list_transfers(params).await?;

    Ok(Json(transfers))
}
