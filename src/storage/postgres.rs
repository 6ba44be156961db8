use crate::models::VisitRecord;
use crate::storage::trait_def::now_unix;
use crate::storage::{StorageResult, VisitStore};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;

pub struct PostgresVisitStore {
    pool: Arc<PgPool>,
}

impl PostgresVisitStore {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl VisitStore for PostgresVisitStore {
    async fn init(&self) -> StorageResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS visits (
                id BIGSERIAL PRIMARY KEY,
                ip TEXT NOT NULL,
                country TEXT NOT NULL,
                city TEXT NOT NULL,
                visit_time BIGINT NOT NULL
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
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO visits (ip, country, city, visit_time)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(ip)
        .bind(country)
        .bind(city)
        .bind(now_unix())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(id)
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
