//! Row models
//!
//! Persisted entities and the parameter structs used by the row accessor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bank account. `balance` is in the smallest currency unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub owner: String,
    pub balance: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// Immutable ledger line: one signed delta applied to one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Entry {
    pub id: i64,
    pub account_id: i64,
    /// Negative for the sending side, positive for the receiving side
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// Record of a positive amount moved between two accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Transfer {
    pub id: i64,
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

// =========================================================================
// Parameters
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountParams {
    pub owner: String,
    pub balance: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UpdateAccountParams {
    pub id: i64,
    pub balance: i64,
}

/// Signed delta added to an account balance in a single statement
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AddAccountBalanceParams {
    pub id: i64,
    pub amount: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CreateEntryParams {
    pub account_id: i64,
    pub amount: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UpdateEntryParams {
    pub id: i64,
    pub amount: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CreateTransferParams {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UpdateTransferParams {
    pub id: i64,
    pub amount: i64,
}

/// Limit/offset pagination for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    pub limit: i64,
    pub offset: i64,
}

impl ListParams {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    /// Build from a 1-based page number and page size.
    /// `None` when the offset does not fit in an `i64`.
    pub fn page(page_id: i64, page_size: i64) -> Option<Self> {
        let offset = page_id.max(1).checked_sub(1)?.checked_mul(page_size)?;
        Some(Self {
            limit: page_size,
            offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_page() {
        let params = ListParams::page(3, 10);
        assert_eq!(params, Some(ListParams::new(10, 20)));

        // Page numbers below 1 clamp to the first page
        assert_eq!(ListParams::page(0, 5).map(|p| p.offset), Some(0));
        assert_eq!(ListParams::page(i64::MIN, 5).map(|p| p.offset), Some(0));
    }

    #[test]
    fn test_list_params_page_offset_overflow() {
        assert_eq!(ListParams::page(i64::MAX, 100), None);
        assert_eq!(
            ListParams::page(i64::MAX, 1),
            Some(ListParams::new(1, i64::MAX - 1))
        );
    }

    #[test]
    fn test_account_serialize() {
        let account = Account {
            id: 7,
            owner: "alice".to_string(),
            balance: -15,
            currency: "EUR".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["balance"], -15);
        assert_eq!(json["currency"], "EUR");
    }
}
