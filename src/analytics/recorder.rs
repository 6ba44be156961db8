//! Records one visit: resolve the address, then append it to the store

use std::sync::Arc;
use tracing::debug;

use crate::analytics::geoip::GeoResolver;
use crate::analytics::ip_extractor::anonymize_ip_str;
use crate::storage::{StorageResult, VisitStore};

pub struct VisitRecorder {
    resolver: GeoResolver,
    store: Arc<dyn VisitStore>,
    ip_anonymization: bool,
}

impl VisitRecorder {
    pub fn new(resolver: GeoResolver, store: Arc<dyn VisitStore>) -> Self {
        Self {
            resolver,
            store,
            ip_anonymization: false,
        }
    }

    /// Store truncated addresses. Geolocation still uses the full address.
    pub fn with_ip_anonymization(mut self, enabled: bool) -> Self {
        self.ip_anonymization = enabled;
        self
    }

    /// Record a visit from `ip` and return the new record id.
    ///
    /// Geolocation never fails; storage errors are returned to the caller.
    pub async fn record(&self, ip: &str) -> StorageResult<i64> {
        let location = self.resolver.resolve(ip).await;

        let stored_ip = if self.ip_anonymization {
            anonymize_ip_str(ip)
        } else {
            ip.to_string()
        };

        let id = self
            .store
            .append(&stored_ip, &location.country, &location.city)
            .await?;

        debug!(id, ip = %stored_ip, country = %location.country, city = %location.city, "visit recorded");
        Ok(id)
    }
}
