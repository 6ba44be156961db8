//! Lookup against an ip-api.com compatible JSON service
//!
//! Successful answers look like `{"status":"success","country":"Japan","city":"Tokyo",...}`,
//! refusals like `{"status":"fail","message":"private range"}`.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::trace;

use crate::analytics::geoip::{GeoError, GeoLookup};
use crate::analytics::models::{GeoLocation, UNKNOWN};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IpApiResponse {
    status: Option<String>,
    message: Option<String>,
    country: Option<String>,
    city: Option<String>,
}

pub struct IpApiLookup {
    client: reqwest::Client,
    /// Request URL with an `{ip}` placeholder
    url_template: String,
}

impl IpApiLookup {
    /// Every request is bounded by `timeout`; there are no retries.
    pub fn new(url_template: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url_template: url_template.to_string(),
        })
    }

    fn url_for(&self, ip: &str) -> String {
        self.url_template.replace("{ip}", ip)
    }
}

/// Extract a location from a response body.
///
/// A missing or empty country or city becomes `unknown`; a body with neither is an error.
pub fn parse_response(body: &str) -> Result<GeoLocation, GeoError> {
    let response: IpApiResponse = serde_json::from_str(body)?;

    if response.status.as_deref() == Some("fail") {
        return Err(GeoError::Rejected(
            response.message.unwrap_or_else(|| "no reason given".to_string()),
        ));
    }

    let non_empty = |field: Option<String>| field.filter(|value| !value.trim().is_empty());
    let country = non_empty(response.country);
    let city = non_empty(response.city);

    if country.is_none() && city.is_none() {
        return Err(GeoError::MissingFields);
    }

    Ok(GeoLocation {
        country: country.unwrap_or_else(|| UNKNOWN.to_string()),
        city: city.unwrap_or_else(|| UNKNOWN.to_string()),
    })
}

#[async_trait]
impl GeoLookup for IpApiLookup {
    async fn lookup(&self, ip: &str) -> Result<GeoLocation, GeoError> {
        let body = self
            .client
            .get(self.url_for(ip))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let location = parse_response(&body)?;
        trace!(ip = %ip, country = %location.country, city = %location.city, "ip-api lookup");
        Ok(location)
    }

    fn name(&self) -> &'static str {
        "ip-api"
    }
}
