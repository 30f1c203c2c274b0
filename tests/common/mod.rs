//! Common test utilities

#![allow(dead_code)]

use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};

use simple_bank::store::models::CreateAccountParams;
use simple_bank::store::{Account, Store};

/// Table definitions used by the tests
const SCHEMA: &str = include_str!("schema.sql");

/// Advisory lock serializing schema creation across parallel tests
const SCHEMA_LOCK_KEY: i64 = 0x5349_4d50_4c45;

/// Connect to the test database and make sure the tables exist.
///
/// Tests never truncate: each one works on freshly created random accounts.
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(12)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    let mut conn = pool.acquire().await.expect("Failed to acquire connection");

    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *conn)
        .await
        .expect("Failed to take schema lock");

    (&mut *conn)
        .execute(SCHEMA)
        .await
        .expect("Failed to create schema");

    sqlx::query("SELECT pg_advisory_unlock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *conn)
        .await
        .expect("Failed to release schema lock");

    drop(conn);
    pool
}

pub async fn setup_store() -> Store {
    Store::new(setup_test_db().await)
}

/// Random owner name
pub fn random_owner() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

/// Random amount of money
pub fn random_money() -> i64 {
    rand::thread_rng().gen_range(100..=1000)
}

/// Random supported currency code
pub fn random_currency() -> String {
    ["USD", "EUR", "CAD"]
        .choose(&mut rand::thread_rng())
        .map(|c| c.to_string())
        .unwrap_or_else(|| "USD".to_string())
}

pub fn random_account_params() -> CreateAccountParams {
    CreateAccountParams {
        owner: random_owner(),
        balance: random_money(),
        currency: random_currency(),
    }
}

/// Create an account with random owner, balance and currency
pub async fn create_random_account(store: &Store) -> Account {
    let arg = random_account_params();

    let account = store
        .queries()
        .await
        .unwrap()
        .create_account(arg.clone())
        .await
        .unwrap();

    assert_eq!(account.owner, arg.owner);
    assert_eq!(account.balance, arg.balance);
    assert_eq!(account.currency, arg.currency);
    assert!(account.id > 0);

    account
}

/// Create an account with the given balance
pub async fn create_account_with_balance(store: &Store, balance: i64) -> Account {
    store
        .queries()
        .await
        .unwrap()
        .create_account(CreateAccountParams {
            owner: random_owner(),
            balance,
            currency: "USD".to_string(),
        })
        .await
        .unwrap()
}
