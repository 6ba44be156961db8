pub mod postgres;
pub mod sqlite;
pub mod trait_def;

pub use postgres::PostgresVisitStore;
pub use sqlite::SqliteVisitStore;
pub use trait_def::{StorageError, StorageResult, VisitStore};

use anyhow::Context;
use std::sync::Arc;
use tracing::info;

use crate::config::{DatabaseBackend, DatabaseConfig};

/// Open the configured backend and make sure its schema exists
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn VisitStore>> {
    let store: Arc<dyn VisitStore> = match config.backend {
        DatabaseBackend::Sqlite => {
            info!("Using SQLite storage: {}", config.url);
            Arc::new(
                SqliteVisitStore::new(&config.url, config.max_connections)
                    .await
                    .with_context(|| format!("Failed to open SQLite database at {}", config.url))?,
            )
        }
        DatabaseBackend::Postgres => {
            info!("Using PostgreSQL storage: {}", config.url);
            Arc::new(
                PostgresVisitStore::new(&config.url, config.max_connections)
                    .await
                    .context("Failed to connect to PostgreSQL")?,
            )
        }
    };

    store
        .init()
        .await
        .context("Failed to initialize visit table")?;

    Ok(store)
}
