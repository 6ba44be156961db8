//! Data models for analytics

use serde::{Deserialize, Serialize};

/// Placeholder for a country or city that could not be resolved
pub const UNKNOWN: &str = "unknown";

/// Country recorded for loopback visitors
pub const LOCAL_COUNTRY: &str = "local";

/// City recorded for loopback visitors
pub const LOCAL_CITY: &str = "localhost";

/// Geographic location derived from a visitor address.
///
/// Both fields are always populated; missing data is represented by the
/// sentinel strings above.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeoLocation {
    pub country: String,
    pub city: String,
}

impl GeoLocation {
    pub fn new(country: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            city: city.into(),
        }
    }

    /// Location used for loopback addresses
    pub fn local() -> Self {
        Self::new(LOCAL_COUNTRY, LOCAL_CITY)
    }

    /// Location used when resolution fails
    pub fn unknown() -> Self {
        Self::new(UNKNOWN, UNKNOWN)
    }
}
