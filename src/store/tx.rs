//! Transaction Executor
//!
//! Runs a unit of work inside one database transaction: commit on success,
//! rollback on failure, and a composite error when the rollback fails too.

use std::future::Future;
use std::time::Duration;

use futures::future::BoxFuture;
use sqlx::pool::PoolConnection;
use sqlx::{Connection, PgPool, Postgres};
use tokio::sync::watch;
use tokio::time::Instant;

use super::queries::{Queries, TxQueries};
use super::StoreError;

/// Upper bound on the side request that cancels an interrupted statement
const CANCEL_TIMEOUT: Duration = Duration::from_secs(1);

/// Per-call context for a unit of work.
///
/// Carries an optional trace label (logged as `tx_name`), an optional
/// deadline and an optional cancellation flag. Any of them may be absent.
#[derive(Debug, Clone, Default)]
pub struct TxContext {
    name: Option<String>,
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

impl TxContext {
    /// Create an empty context (no label, no deadline, not cancellable)
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a trace label
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Fail with `DeadlineExceeded` if the work is still running at `deadline`
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline relative to now. A timeout too large to represent leaves
    /// the context without a deadline.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    /// Fail with `Cancelled` once the watched flag becomes `true`
    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether a deadline or cancellation flag can stop the work
    pub fn is_interruptible(&self) -> bool {
        self.deadline.is_some() || self.cancel.is_some()
    }

    /// Drive `fut` until it completes, the deadline passes or the caller cancels.
    /// On interruption `fut` is dropped before returning.
    async fn run<F: Future>(&self, fut: F) -> Result<F::Output, StoreError> {
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        let cancelled = async {
            match self.cancel.clone() {
                // A dropped sender can never cancel
                Some(mut rx) => {
                    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => Err(StoreError::Cancelled),
            _ = deadline => Err(StoreError::DeadlineExceeded),
            output = fut => Ok(output),
        }
    }
}

/// Transactional store: the row accessor plus transaction orchestration.
///
/// Ad hoc row access goes through [`Store::queries`]; atomic multi-row work
/// goes through [`Store::exec_tx`] and the operations built on it.
#[derive(Debug, Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    /// Create a new Store with a database pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Row accessor bound to a pooled connection, outside any transaction
    pub async fn queries(&self) -> Result<Queries<PoolConnection<Postgres>>, StoreError> {
        let conn = self.pool.acquire().await?;
        Ok(Queries::new(conn))
    }

    // =========================================================================
    // exec_tx
    // =========================================================================

    /// Execute `work` within a database transaction.
    ///
    /// - begin fails: `TransactionStart`
    /// - work succeeds: commit, or `Commit` if the commit fails
    /// - work fails: rollback and return the work error unchanged, or
    ///   `Rollback` wrapping it if the rollback fails as well
    ///
    /// Deadline and cancellation from `ctx` count as work failures. They may
    /// fire while a statement is still running on the server (blocked on a
    /// row lock, say), so that statement is cancelled and the connection is
    /// closed instead of waiting on it. Postgres rolls back the transaction
    /// of a closed session.
    pub async fn exec_tx<T, F>(&self, ctx: &TxContext, work: F) -> Result<T, StoreError>
    where
        T: Send,
        F: for<'c> FnOnce(TxQueries<'c>) -> BoxFuture<'c, Result<T, StoreError>> + Send,
    {
        let tx_name = ctx.name().unwrap_or("-");

        let mut conn = ctx
            .run(self.pool.acquire())
            .await?
            .map_err(StoreError::TransactionStart)?;

        let mut tx = conn.begin().await.map_err(StoreError::TransactionStart)?;

        let backend_pid = if ctx.is_interruptible() {
            let pid: i32 = sqlx::query_scalar("SELECT pg_backend_pid()")
                .fetch_one(&mut *tx)
                .await
                .map_err(StoreError::TransactionStart)?;
            Some(pid)
        } else {
            None
        };

        tracing::debug!(tx_name = %tx_name, "transaction started");

        let outcome = ctx
            .run(work(Queries::new(&mut *tx)))
            .await
            .and_then(|result| result);

        match outcome {
            Ok(value) => {
                tx.commit().await.map_err(StoreError::Commit)?;
                tracing::debug!(tx_name = %tx_name, "transaction committed");
                Ok(value)
            }
            Err(err) if err.is_interrupted() => {
                // Queues a ROLLBACK without waiting on the connection
                drop(tx);

                if let Some(pid) = backend_pid {
                    self.cancel_backend(pid, tx_name).await;
                }

                if let Err(close) = conn.close().await {
                    tracing::error!(
                        tx_name = %tx_name,
                        error = %err,
                        close_error = %close,
                        "Closing interrupted transaction failed"
                    );
                    return Err(StoreError::Rollback {
                        source: Box::new(err),
                        rollback: close,
                    });
                }

                tracing::debug!(tx_name = %tx_name, error = %err, "transaction abandoned");
                Err(err)
            }
            Err(err) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::error!(
                        tx_name = %tx_name,
                        error = %err,
                        rollback_error = %rollback,
                        "Rollback failed, store may need manual inspection"
                    );
                    return Err(StoreError::Rollback {
                        source: Box::new(err),
                        rollback,
                    });
                }

                tracing::debug!(tx_name = %tx_name, error = %err, "transaction rolled back");
                Err(err)
            }
        }
    }

    /// Ask the server to cancel whatever statement `pid` is running.
    /// Best effort: the session is closed right after either way.
    async fn cancel_backend(&self, pid: i32, tx_name: &str) {
        let cancel = sqlx::query_scalar::<_, bool>("SELECT pg_cancel_backend($1)")
            .bind(pid)
            .fetch_one(&self.pool);

        match tokio::time::timeout(CANCEL_TIMEOUT, cancel).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                tracing::warn!(tx_name = %tx_name, pid, error = %e, "Backend cancel failed");
            }
            Err(_) => {
                tracing::warn!(tx_name = %tx_name, pid, "Backend cancel timed out");
            }
        }
    }
}
