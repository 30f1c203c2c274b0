//! Row Accessor
//!
//! Per-entity create/get/update/delete/list queries. A `Queries` value is
//! bound to one connection: either a pooled connection (ambient path) or the
//! connection borrowed from an open transaction.

use std::ops::DerefMut;

use sqlx::PgConnection;

use super::models::{
    Account, AddAccountBalanceParams, CreateAccountParams, CreateEntryParams,
    CreateTransferParams, Entry, ListParams, Transfer, UpdateAccountParams, UpdateEntryParams,
    UpdateTransferParams,
};

/// Row-level data access over a single Postgres connection
#[derive(Debug)]
pub struct Queries<C> {
    conn: C,
}

/// Row accessor bound to a connection borrowed from an open transaction
pub type TxQueries<'c> = Queries<&'c mut PgConnection>;

impl<C> Queries<C>
where
    C: DerefMut<Target = PgConnection>,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    /// Give back the underlying connection handle
    pub fn into_inner(self) -> C {
        self.conn
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    pub async fn create_account(
        &mut self,
        arg: CreateAccountParams,
    ) -> Result<Account, sqlx::Error> {
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (owner, balance, currency)
            VALUES ($1, $2, $3)
            RETURNING id, owner, balance, currency, created_at
            "#,
        )
        .bind(&arg.owner)
        .bind(arg.balance)
        .bind(&arg.currency)
        .fetch_one(&mut *self.conn)
        .await
    }

    pub async fn get_account(&mut self, id: i64) -> Result<Account, sqlx::Error> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, owner, balance, currency, created_at
            FROM accounts
            WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_one(&mut *self.conn)
        .await
    }

    /// Read an account and hold its row lock until the transaction ends.
    /// `NO KEY UPDATE` keeps foreign-key inserts into entries/transfers unblocked.
    pub async fn get_account_for_update(&mut self, id: i64) -> Result<Account, sqlx::Error> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, owner, balance, currency, created_at
            FROM accounts
            WHERE id = $1
            LIMIT 1
            FOR NO KEY UPDATE
            "#,
        )
        .bind(id)
        .fetch_one(&mut *self.conn)
        .await
    }

    pub async fn list_accounts(&mut self, arg: ListParams) -> Result<Vec<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, owner, balance, currency, created_at
            FROM accounts
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(arg.limit)
        .bind(arg.offset)
        .fetch_all(&mut *self.conn)
        .await
    }

    /// Overwrite an account balance. Not used by the transfer path.
    pub async fn update_account(
        &mut self,
        arg: UpdateAccountParams,
    ) -> Result<Account, sqlx::Error> {
        sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET balance = $2
            WHERE id = $1
            RETURNING id, owner, balance, currency, created_at
            "#,
        )
        .bind(arg.id)
        .bind(arg.balance)
        .fetch_one(&mut *self.conn)
        .await
    }

    /// Add a signed delta to an account balance in one statement and
    /// return the updated row. The row lock is taken by the UPDATE itself.
    pub async fn add_account_balance(
        &mut self,
        arg: AddAccountBalanceParams,
    ) -> Result<Account, sqlx::Error> {
        sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET balance = balance + $2
            WHERE id = $1
            RETURNING id, owner, balance, currency, created_at
            "#,
        )
        .bind(arg.id)
        .bind(arg.amount)
        .fetch_one(&mut *self.conn)
        .await
    }

    pub async fn delete_account(&mut self, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        Ok(())
    }

    // =========================================================================
    // Entries
    // =========================================================================

    pub async fn create_entry(&mut self, arg: CreateEntryParams) -> Result<Entry, sqlx::Error> {
        sqlx::query_as::<_, Entry>(
            r#"
            INSERT INTO entries (account_id, amount)
            VALUES ($1, $2)
            RETURNING id, account_id, amount, created_at
            "#,
        )
        .bind(arg.account_id)
        .bind(arg.amount)
        .fetch_one(&mut *self.conn)
        .await
    }

    pub async fn get_entry(&mut self, id: i64) -> Result<Entry, sqlx::Error> {
        sqlx::query_as::<_, Entry>(
            r#"
            SELECT id, account_id, amount, created_at
            FROM entries
            WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_one(&mut *self.conn)
        .await
    }

    pub async fn list_entries(&mut self, arg: ListParams) -> Result<Vec<Entry>, sqlx::Error> {
        sqlx::query_as::<_, Entry>(
            r#"
            SELECT id, account_id, amount, created_at
            FROM entries
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(arg.limit)
        .bind(arg.offset)
        .fetch_all(&mut *self.conn)
        .await
    }

    pub async fn list_entries_by_account(
        &mut self,
        account_id: i64,
        arg: ListParams,
    ) -> Result<Vec<Entry>, sqlx::Error> {
        sqlx::query_as::<_, Entry>(
            r#"
            SELECT id, account_id, amount, created_at
            FROM entries
            WHERE account_id = $1
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(account_id)
        .bind(arg.limit)
        .bind(arg.offset)
        .fetch_all(&mut *self.conn)
        .await
    }

    pub async fn update_entry(&mut self, arg: UpdateEntryParams) -> Result<Entry, sqlx::Error> {
        sqlx::query_as::<_, Entry>(
            r#"
            UPDATE entries
            SET amount = $2
            WHERE id = $1
            RETURNING id, account_id, amount, created_at
            "#,
        )
        .bind(arg.id)
        .bind(arg.amount)
        .fetch_one(&mut *self.conn)
        .await
    }

    pub async fn delete_entry(&mut self, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM entries WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        Ok(())
    }

    // =========================================================================
    // Transfers
    // =========================================================================

    pub async fn create_transfer(
        &mut self,
        arg: CreateTransferParams,
    ) -> Result<Transfer, sqlx::Error> {
        sqlx::query_as::<_, Transfer>(
            r#"
            INSERT INTO transfers (from_account_id, to_account_id, amount)
            VALUES ($1, $2, $3)
            RETURNING id, from_account_id, to_account_id, amount, created_at
            "#,
        )
        .bind(arg.from_account_id)
        .bind(arg.to_account_id)
        .bind(arg.amount)
        .fetch_one(&mut *self.conn)
        .await
    }

    pub async fn get_transfer(&mut self, id: i64) -> Result<Transfer, sqlx::Error> {
        sqlx::query_as::<_, Transfer>(
            r#"
            SELECT id, from_account_id, to_account_id, amount, created_at
            FROM transfers
            WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_one(&mut *self.conn)
        .await
    }

    pub async fn list_transfers(&mut self, arg: ListParams) -> Result<Vec<Transfer>, sqlx::Error> {
        sqlx::query_as::<_, Transfer>(
            r#"
            SELECT id, from_account_id, to_account_id, amount, created_at
            FROM transfers
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(arg.limit)
        .bind(arg.offset)
        .fetch_all(&mut *self.conn)
        .await
    }

    pub async fn update_transfer(
        &mut self,
        arg: UpdateTransferParams,
    ) -> Result<Transfer, sqlx::Error> {
        sqlx::query_as::<_, Transfer>(
            r#"
            UPDATE transfers
            SET amount = $2
            WHERE id = $1
            RETURNING id, from_account_id, to_account_id, amount, created_at
            "#,
        )
        .bind(arg.id)
        .bind(arg.amount)
        .fetch_one(&mut *self.conn)
        .await
    }

    pub async fn delete_transfer(&mut self, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM transfers WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        Ok(())
    }
}
