//! Visitor logging pipeline
//!
//! Extract the client address, resolve it to a country and city, append the
//! visit to the store, and summarize the log for the admin report.

pub mod aggregator;
pub mod cached;
pub mod geoip;
pub mod ip_api;
pub mod ip_extractor;
pub mod maxmind;
pub mod models;
pub mod recorder;

pub use aggregator::{summarize, VisitSummary};
pub use cached::CachedLookup;
pub use geoip::{GeoError, GeoLookup, GeoResolver, Resolution};
pub use ip_api::IpApiLookup;
pub use ip_extractor::extract_client_ip;
pub use maxmind::MaxMindLookup;
pub use models::GeoLocation;
pub use recorder::VisitRecorder;
