use crate::models::VisitRecord;
use crate::storage::trait_def::now_unix;
use crate::storage::{StorageResult, VisitStore};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;

pub struct SqliteVisitStore {
    pool: Arc<SqlitePool>,
}

impl SqliteVisitStore {
    /// Connect to `database_url`, creating the database file if it does not exist.
    ///
    /// An in-memory database (`sqlite::memory:`) is private to each connection,
    /// so use `max_connections = 1` with it.
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl VisitStore for SqliteVisitStore {
    async fn init(&self) -> StorageResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS visits (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ip TEXT NOT NULL,
                country TEXT NOT NULL,
                city TEXT NOT NULL,
                visit_time INTEGER NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_visit_time ON visits(visit_time)")
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn append(&self, ip: &str, country: &str, city: &str) -> StorageResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO visits (ip, country, city, visit_time)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(ip)
        .bind(country)
        .bind(city)
        .bind(now_unix())
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn all(&self) -> StorageResult<Vec<VisitRecord>> {
        let visits = sqlx::query_as::<_, VisitRecord>(
            r#"
            SELECT id, ip, country, city, visit_time
            FROM visits
            ORDER BY visit_time DESC, id DESC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(visits)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
