//! Optional lookup cache
//!
//! Wraps any [`GeoLookup`] with a bounded moka cache. Concurrent lookups of the
//! same address share one upstream request. Failures are not cached, so the
//! next visit from that address tries again.

use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use crate::analytics::geoip::{GeoError, GeoLookup};
use crate::analytics::models::GeoLocation;

pub struct CachedLookup {
    inner: Arc<dyn GeoLookup>,
    cache: Cache<String, GeoLocation>,
}

impl CachedLookup {
    pub fn new(inner: Arc<dyn GeoLookup>, max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self { inner, cache }
    }
}

#[async_trait]
impl GeoLookup for CachedLookup {
    async fn lookup(&self, ip: &str) -> Result<GeoLocation, GeoError> {
        self.cache
            .try_get_with(ip.to_string(), self.inner.lookup(ip))
            .await
            .map_err(GeoError::Shared)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
