//! Transfer Load Tool
//!
//! Runs concurrent transfers in alternating directions between two fresh
//! accounts and reports throughput and final balances.
//!
//! Run with: cargo run --bin transfer_load --release -- --transfers 1000 --amount 10

use std::str::FromStr;
use std::time::Instant;

use simple_bank::store::models::CreateAccountParams;
use simple_bank::{db, Config, Store, TransferTxParams, TxContext};

const INITIAL_BALANCE: i64 = 1_000_000;

fn arg_value<T: FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "simple_bank=warn".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let transfer_count: usize = arg_value(&args, "--transfers").unwrap_or(1000);
    let amount: i64 = arg_value(&args, "--amount").unwrap_or(10);

    let config = Config::from_env()?;

    println!("Load Test - {} transfers of {} between two accounts", transfer_count, amount);
    println!("Connecting to database...");

    let pool = db::connect(&config).await?;
    let store = Store::new(pool);

    let mut queries = store.queries().await?;
    let mut accounts = Vec::with_capacity(2);
    for _ in 0..2 {
        let account = queries
            .create_account(CreateAccountParams {
                owner: format!("load-{}", uuid::Uuid::new_v4()),
                balance: INITIAL_BALANCE,
                currency: "USD".to_string(),
            })
            .await?;
        accounts.push(account);
    }
    drop(queries);
    let (account1, account2) = (accounts[0].clone(), accounts[1].clone());

    let start = Instant::now();
    let mut handles = Vec::with_capacity(transfer_count);

    for i in 0..transfer_count {
        let store = store.clone();
        let (from_account_id, to_account_id) = if i % 2 == 1 {
            (account2.id, account1.id)
        } else {
            (account1.id, account2.id)
        };

        handles.push(tokio::spawn(async move {
            let ctx = TxContext::new().with_name(format!("tx {}", i + 1));
            store
                .transfer_tx(
                    &ctx,
                    TransferTxParams {
                        from_account_id,
                        to_account_id,
                        amount,
                    },
                )
                .await
        }));
    }

    let mut success_count = 0u64;
    let mut failures = Vec::new();
    for handle in handles {
        match handle.await? {
            Ok(_) => success_count += 1,
            Err(e) => failures.push(e.to_string()),
        }
    }

    let elapsed = start.elapsed();
    let rate = success_count as f64 / elapsed.as_secs_f64();

    let mut queries = store.queries().await?;
    let final1 = queries.get_account(account1.id).await?;
    let final2 = queries.get_account(account2.id).await?;

    println!("\n=== Load Test Results ===");
    println!("Total transfers: {}", transfer_count);
    println!("Successful: {}", success_count);
    println!("Failed: {}", failures.len());
    for failure in failures.iter().take(5) {
        println!("  {}", failure);
    }
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Rate: {:.0} transfers/sec", rate);
    println!(
        "Balances: account {} = {}, account {} = {}",
        final1.id, final1.balance, final2.id, final2.balance
    );
    if final1.balance + final2.balance != 2 * INITIAL_BALANCE {
        println!("WARNING: total balance changed");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_arg_value_parses_flags() {
        let args = args(&["transfer_load", "--transfers", "20", "--amount", "-5"]);
        assert_eq!(arg_value::<usize>(&args, "--transfers"), Some(20));
        assert_eq!(arg_value::<i64>(&args, "--amount"), Some(-5));
        assert_eq!(arg_value::<usize>(&args, "--missing"), None);
    }

    #[test]
    fn test_negative_transfer_count_rejected() {
        let args = args(&["transfer_load", "--transfers", "-3"]);
        assert_eq!(arg_value::<usize>(&args, "--transfers"), None);
    }
}
