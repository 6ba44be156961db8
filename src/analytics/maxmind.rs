//! Offline lookup using a MaxMind GeoLite2/GeoIP2 City database
//!
//! The database is memory-mapped once and shared by all requests.

use async_trait::async_trait;
use anyhow::{Context, Result};
use maxminddb::{geoip2, Mmap, Reader};
use std::net::IpAddr;
use std::sync::Arc;

use crate::analytics::geoip::{GeoError, GeoLookup};
use crate::analytics::models::{GeoLocation, UNKNOWN};

#[derive(Clone)]
pub struct MaxMindLookup {
    city_reader: Arc<Reader<Mmap>>,
}

impl MaxMindLookup {
    /// Open the City database at `city_path`
    pub fn new(city_path: &str) -> Result<Self> {
        let reader = unsafe { Reader::open_mmap(city_path) }
            .with_context(|| format!("Failed to open GeoIP City database at {}", city_path))?;
        Ok(Self {
            city_reader: Arc::new(reader),
        })
    }

    fn parse_addr(ip: &str) -> Result<IpAddr, GeoError> {
        ip.parse::<IpAddr>()
            .map_err(|_| GeoError::InvalidAddress(ip.to_string()))
    }

    fn lookup_addr(&self, ip: IpAddr) -> Result<GeoLocation, GeoError> {
        let result = self
            .city_reader
            .lookup(ip)
            .map_err(|e| GeoError::Database(e.to_string()))?;

        let city = result
            .decode::<geoip2::City>()
            .map_err(|e| GeoError::Database(e.to_string()))?
            .ok_or(GeoError::MissingFields)?;

        let country = city.country.names.english.map(|s| s.to_string());
        let city_name = city.city.names.english.map(|s| s.to_string());

        if country.is_none() && city_name.is_none() {
            return Err(GeoError::MissingFields);
        }

        Ok(GeoLocation {
            country: country.unwrap_or_else(|| UNKNOWN.to_string()),
            city: city_name.unwrap_or_else(|| UNKNOWN.to_string()),
        })
    }
}

#[async_trait]
impl GeoLookup for MaxMindLookup {
    async fn lookup(&self, ip: &str) -> Result<GeoLocation, GeoError> {
        let addr = Self::parse_addr(ip)?;
        self.lookup_addr(addr)
    }

    fn name(&self) -> &'static str {
        "maxmind"
    }
}
