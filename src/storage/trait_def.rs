use crate::models::VisitRecord;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database unavailable: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Append-only log of visits
#[async_trait]
pub trait VisitStore: Send + Sync {
    /// Create the backing table if absent. Safe to call on every start.
    async fn init(&self) -> StorageResult<()>;

    /// Persist a new visit stamped with the current time and return its id
    async fn append(&self, ip: &str, country: &str, city: &str) -> StorageResult<i64>;

    /// Every visit, most recent first
    async fn all(&self) -> StorageResult<Vec<VisitRecord>>;

    /// Close the underlying connection pool
    async fn close(&self);
}

pub(crate) fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}
