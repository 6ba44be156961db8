//! Visitor geolocation
//!
//! [`GeoLookup`] implementations talk to an actual data source and may fail.
//! [`GeoResolver`] sits in front of them, answers loopback addresses itself
//! and turns every failure into the `unknown` sentinel so callers never see
//! an error.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::analytics::cached::CachedLookup;
use crate::analytics::ip_api::IpApiLookup;
use crate::analytics::maxmind::MaxMindLookup;
use crate::analytics::models::GeoLocation;
use crate::config::{GeoConfig, GeoProvider};

/// Addresses answered locally without any lookup
pub const LOOPBACK_ADDRESSES: [&str; 3] = ["127.0.0.1", "::1", "localhost"];

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("geolocation request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("geolocation response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("geolocation service rejected the query: {0}")]
    Rejected(String),
    #[error("geolocation response has neither country nor city")]
    MissingFields,
    #[error("'{0}' is not an IP address")]
    InvalidAddress(String),
    #[error("GeoIP database error: {0}")]
    Database(String),
    #[error(transparent)]
    Shared(Arc<GeoError>),
}

/// A source of geolocation data
#[async_trait]
pub trait GeoLookup: Send + Sync {
    async fn lookup(&self, ip: &str) -> Result<GeoLocation, GeoError>;

    fn name(&self) -> &'static str;
}

/// Outcome of resolving one address
#[derive(Debug)]
pub enum Resolution {
    /// Loopback address, answered without a lookup
    Local,
    Located(GeoLocation),
    /// The lookup failed; the visit is recorded with sentinels
    Fallback(GeoError),
}

impl Resolution {
    pub fn into_location(self) -> GeoLocation {
        match self {
            Resolution::Local => GeoLocation::local(),
            Resolution::Located(location) => location,
            Resolution::Fallback(_) => GeoLocation::unknown(),
        }
    }
}

pub fn is_loopback(ip: &str) -> bool {
    LOOPBACK_ADDRESSES.iter().any(|candidate| *candidate == ip)
}

#[derive(Clone)]
pub struct GeoResolver {
    lookup: Arc<dyn GeoLookup>,
}

impl GeoResolver {
    pub fn new(lookup: Arc<dyn GeoLookup>) -> Self {
        Self { lookup }
    }

    /// Name of the underlying data source
    pub fn provider_name(&self) -> &'static str {
        self.lookup.name()
    }

    /// Build the lookup chain described by `config`
    pub fn from_config(config: &GeoConfig) -> anyhow::Result<Self> {
        let lookup: Arc<dyn GeoLookup> = match config.provider {
            GeoProvider::IpApi => Arc::new(IpApiLookup::new(
                &config.api_url,
                Duration::from_millis(config.timeout_ms),
            )?),
            GeoProvider::MaxMind => {
                let path = config.city_db_path.as_deref().ok_or_else(|| {
                    anyhow::anyhow!("a City database path is required for the maxmind provider")
                })?;
                Arc::new(MaxMindLookup::new(path)?)
            }
        };

        let lookup: Arc<dyn GeoLookup> = match &config.cache {
            Some(cache) => {
                info!(
                    "GeoIP cache enabled (max {} entries, ttl {}s)",
                    cache.max_entries, cache.ttl_secs
                );
                Arc::new(CachedLookup::new(
                    lookup,
                    cache.max_entries,
                    Duration::from_secs(cache.ttl_secs),
                ))
            }
            None => lookup,
        };

        info!("Using {} geolocation provider", lookup.name());
        Ok(Self::new(lookup))
    }

    /// Resolve `ip`, keeping the reason for a fallback
    pub async fn resolve_detailed(&self, ip: &str) -> Resolution {
        if is_loopback(ip) {
            return Resolution::Local;
        }

        match self.lookup.lookup(ip).await {
            Ok(location) => Resolution::Located(location),
            Err(err) => Resolution::Fallback(err),
        }
    }

    /// Resolve `ip` to a location; failures yield `unknown`/`unknown`
    pub async fn resolve(&self, ip: &str) -> GeoLocation {
        let resolution = self.resolve_detailed(ip).await;
        if let Resolution::Fallback(ref err) = resolution {
            warn!(ip = %ip, provider = self.lookup.name(), error = %err, "geolocation failed, recording as unknown");
        }
        resolution.into_location()
    }
}
