use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One recorded request for the tracked image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct VisitRecord {
    pub id: i64,
    pub ip: String,
    pub country: String,
    pub city: String,
    /// Unix timestamp (seconds, UTC) assigned by the store
    pub visit_time: i64,
}

impl VisitRecord {
    /// Visit time rendered as `YYYY-MM-DD HH:MM:SS` (UTC)
    pub fn visit_time_display(&self) -> String {
        chrono::DateTime::from_timestamp(self.visit_time, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| self.visit_time.to_string())
    }
}
