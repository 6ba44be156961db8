//! Client IP extraction from HTTP headers
//!
//! The extracted value is kept as text: whatever the visitor's proxy chain
//! reports is recorded verbatim, with no validation.

use axum::http::HeaderMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tracing::warn;

use crate::config::TrustedProxyMode;

/// Extract the client address for a request
///
/// # Arguments
/// * `headers` - HTTP request headers
/// * `socket_ip` - The socket remote address (fallback)
/// * `mode` - Which forwarding headers to trust
pub fn extract_client_ip(headers: &HeaderMap, socket_ip: IpAddr, mode: TrustedProxyMode) -> String {
    let from_headers = match mode {
        TrustedProxyMode::Standard => extract_forwarded_for(headers),
        TrustedProxyMode::Cloudflare => extract_cloudflare_ip(headers).or_else(|| {
            warn!("CF-Connecting-IP header missing in Cloudflare mode");
            extract_forwarded_for(headers)
        }),
        TrustedProxyMode::None => None,
    };

    from_headers.unwrap_or_else(|| socket_ip.to_string())
}

/// Extract the address from Cloudflare's CF-Connecting-IP header
fn extract_cloudflare_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("cf-connecting-ip")
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// First (leftmost) entry of X-Forwarded-For, the address the first proxy saw
fn extract_forwarded_for(headers: &HeaderMap) -> Option<String> {
    let xff = headers.get("x-forwarded-for")?.to_str().ok()?;

    xff.split(',')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Anonymize an IP address by truncating to network prefix
///
/// - IPv4: Truncate to /24 (zero last octet)
/// - IPv6: Truncate to /48 (zero last 80 bits)
pub fn anonymize_ip(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V4(addr) => {
            let octets = addr.octets();
            IpAddr::V4(Ipv4Addr::new(octets[0], octets[1], octets[2], 0))
        }
        IpAddr::V6(addr) => {
            let segments = addr.segments();
            IpAddr::V6(Ipv6Addr::new(
                segments[0],
                segments[1],
                segments[2],
                0,
                0,
                0,
                0,
                0,
            ))
        }
    }
}

/// Anonymize a textual address. Text that is not an IP address is returned unchanged.
pub fn anonymize_ip_str(ip: &str) -> String {
    match ip.parse::<IpAddr>() {
        Ok(addr) => anonymize_ip(addr).to_string(),
        Err(_) => ip.to_string(),
    }
}
