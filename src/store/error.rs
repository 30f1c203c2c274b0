//! Store Errors
//!
//! Error types for transactional store operations.

/// Errors that can occur while running work against the store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not open a transaction
    #[error("Failed to begin transaction: {0}")]
    TransactionStart(#[source] sqlx::Error),

    /// All writes succeeded but the commit did not
    #[error("Failed to commit transaction: {0}")]
    Commit(#[source] sqlx::Error),

    /// The unit of work failed and so did the rollback
    #[error("tx err: {source}, rollback err: {rollback}")]
    Rollback {
        source: Box<StoreError>,
        rollback: sqlx::Error,
    },

    /// Row accessor error, propagated verbatim
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The caller's deadline elapsed before the work finished
    #[error("Deadline exceeded")]
    DeadlineExceeded,

    /// The caller cancelled the work while it was in flight
    #[error("Operation cancelled")]
    Cancelled,
}

impl StoreError {
    /// The unit-of-work error, looking through a failed rollback
    pub fn original(&self) -> &StoreError {
        match self {
            StoreError::Rollback { source, .. } => source.original(),
            other => other,
        }
    }

    /// Check if the failing step hit a missing row
    pub fn is_not_found(&self) -> bool {
        matches!(self.original(), StoreError::Database(sqlx::Error::RowNotFound))
    }

    /// Check if the store may hold a half-undone transaction
    pub fn is_rollback_failure(&self) -> bool {
        matches!(self, StoreError::Rollback { .. })
    }

    /// Check if the work stopped because of the caller's deadline or cancellation
    pub fn is_interrupted(&self) -> bool {
        matches!(
            self.original(),
            StoreError::DeadlineExceeded | StoreError::Cancelled
        )
    }
}
