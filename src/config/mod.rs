use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub geo: GeoConfig,
    pub client_ip: ClientIpConfig,
    pub asset: AssetConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Sqlite,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeoProvider {
    /// ip-api.com compatible JSON service
    IpApi,
    /// Local MaxMind GeoLite2/GeoIP2 City database
    MaxMind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoConfig {
    pub provider: GeoProvider,
    /// Lookup URL with an `{ip}` placeholder
    pub api_url: String,
    pub timeout_ms: u64,
    pub city_db_path: Option<String>,
    /// Lookup cache; `None` resolves every visit afresh
    pub cache: Option<GeoCacheConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoCacheConfig {
    pub max_entries: u64,
    pub ttl_secs: u64,
}

/// Which request headers are trusted to carry the visitor's address
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustedProxyMode {
    /// Leftmost X-Forwarded-For entry, then the socket address
    #[default]
    Standard,
    /// CF-Connecting-IP, then X-Forwarded-For, then the socket address
    Cloudflare,
    /// Socket address only
    None,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientIpConfig {
    pub trusted_proxy_mode: TrustedProxyMode,
    pub ip_anonymization: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Path to the image served on the tracked route
    /// If None, uses the embedded image
    pub image_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    pub api_keys: Vec<String>,
}

impl GeoConfig {
    pub const DEFAULT_API_URL: &'static str = "http://ip-api.com/json/{ip}";
    pub const DEFAULT_TIMEOUT_MS: u64 = 3000;
}

impl GeoCacheConfig {
    const fn default_max_entries() -> u64 {
        10_000
    }

    const fn default_ttl_secs() -> u64 {
        15 * 60
    }
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend_str =
            std::env::var("DATABASE_BACKEND").unwrap_or_else(|_| "sqlite".to_string());

        let backend = match backend_str.to_lowercase().as_str() {
            "sqlite" => DatabaseBackend::Sqlite,
            "postgres" | "postgresql" => DatabaseBackend::Postgres,
            other => {
                tracing::warn!(
                    "Unknown DATABASE_BACKEND '{other}', falling back to 'sqlite'. Supported values: sqlite, postgres"
                );
                DatabaseBackend::Sqlite
            }
        };

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://./imgbed.db".to_string());

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let provider = match std::env::var("GEO_PROVIDER")
            .unwrap_or_else(|_| "ip-api".to_string())
            .to_lowercase()
            .as_str()
        {
            "ip-api" | "ipapi" => GeoProvider::IpApi,
            "maxmind" => GeoProvider::MaxMind,
            other => {
                tracing::warn!(
                    "Unknown GEO_PROVIDER '{other}', falling back to 'ip-api'. Supported values: ip-api, maxmind"
                );
                GeoProvider::IpApi
            }
        };

        let city_db_path = std::env::var("GEOIP_CITY_DB_PATH").ok();
        if provider == GeoProvider::MaxMind && city_db_path.is_none() {
            anyhow::bail!("GEOIP_CITY_DB_PATH must be set when GEO_PROVIDER=maxmind");
        }

        let api_url =
            std::env::var("GEO_API_URL").unwrap_or_else(|_| GeoConfig::DEFAULT_API_URL.to_string());
        let timeout_ms = std::env::var("GEO_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(GeoConfig::DEFAULT_TIMEOUT_MS);

        let cache = if env_flag("GEO_CACHE_ENABLED") {
            Some(GeoCacheConfig {
                max_entries: std::env::var("GEO_CACHE_MAX_ENTRIES")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or_else(GeoCacheConfig::default_max_entries),
                ttl_secs: std::env::var("GEO_CACHE_TTL_SECS")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or_else(GeoCacheConfig::default_ttl_secs),
            })
        } else {
            None
        };

        let trusted_proxy_mode = match std::env::var("TRUSTED_PROXY_MODE")
            .unwrap_or_else(|_| "standard".to_string())
            .to_lowercase()
            .as_str()
        {
            "standard" => TrustedProxyMode::Standard,
            "cloudflare" => TrustedProxyMode::Cloudflare,
            "none" => TrustedProxyMode::None,
            other => {
                tracing::warn!(
                    "Unknown TRUSTED_PROXY_MODE '{other}', falling back to 'standard'. Supported values: standard, cloudflare, none"
                );
                TrustedProxyMode::Standard
            }
        };

        let api_keys = std::env::var("ADMIN_API_KEYS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Config {
            database: DatabaseConfig {
                backend,
                url: database_url,
                max_connections,
            },
            server: ServerConfig { host, port },
            geo: GeoConfig {
                provider,
                api_url,
                timeout_ms,
                city_db_path,
                cache,
            },
            client_ip: ClientIpConfig {
                trusted_proxy_mode,
                ip_anonymization: env_flag("IP_ANONYMIZATION"),
            },
            asset: AssetConfig {
                image_path: std::env::var("IMAGE_PATH").ok(),
            },
            admin: AdminConfig { api_keys },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that touch the process environment
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const KEYS: [&str; 16] = [
        "DATABASE_BACKEND",
        "DATABASE_URL",
        "DATABASE_MAX_CONNECTIONS",
        "HOST",
        "PORT",
        "GEO_PROVIDER",
        "GEO_API_URL",
        "GEO_TIMEOUT_MS",
        "GEOIP_CITY_DB_PATH",
        "GEO_CACHE_ENABLED",
        "GEO_CACHE_MAX_ENTRIES",
        "GEO_CACHE_TTL_SECS",
        "TRUSTED_PROXY_MODE",
        "IP_ANONYMIZATION",
        "IMAGE_PATH",
        "ADMIN_API_KEYS",
    ];

    /// Load the config with exactly `vars` set
    fn load_with(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for key in KEYS {
            std::env::remove_var(key);
        }
        for (key, value) in vars {
            std::env::set_var(key, value);
        }
        let config = Config::from_env();
        for (key, _) in vars {
            std::env::remove_var(key);
        }
        config
    }

    #[test]
    fn test_defaults() {
        let config = load_with(&[]).unwrap();

        assert!(matches!(config.database.backend, DatabaseBackend::Sqlite));
        assert_eq!(config.database.url, "sqlite://./imgbed.db");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.geo.provider, GeoProvider::IpApi);
        assert_eq!(config.geo.api_url, "http://ip-api.com/json/{ip}");
        assert_eq!(config.geo.timeout_ms, 3000);
        assert!(config.geo.city_db_path.is_none());
        assert!(config.geo.cache.is_none(), "lookup cache is opt-in");
        assert_eq!(config.client_ip.trusted_proxy_mode, TrustedProxyMode::Standard);
        assert!(!config.client_ip.ip_anonymization);
        assert!(config.asset.image_path.is_none());
        assert!(config.admin.api_keys.is_empty());
    }

    #[test]
    fn test_cache_enabled_with_defaults() {
        let config = load_with(&[("GEO_CACHE_ENABLED", "true")]).unwrap();
        let cache = config.geo.cache.unwrap();
        assert_eq!(cache.max_entries, 10_000);
        assert_eq!(cache.ttl_secs, 900);

        let config = load_with(&[
            ("GEO_CACHE_ENABLED", "1"),
            ("GEO_CACHE_MAX_ENTRIES", "42"),
            ("GEO_CACHE_TTL_SECS", "7"),
        ])
        .unwrap();
        let cache = config.geo.cache.unwrap();
        assert_eq!(cache.max_entries, 42);
        assert_eq!(cache.ttl_secs, 7);
    }

    #[test]
    fn test_flag_values() {
        for value in ["true", "TRUE", "1", "yes"] {
            let config = load_with(&[("IP_ANONYMIZATION", value)]).unwrap();
            assert!(config.client_ip.ip_anonymization, "{value} should enable");
        }
        for value in ["false", "0", "no", "on", ""] {
            let config = load_with(&[("IP_ANONYMIZATION", value)]).unwrap();
            assert!(!config.client_ip.ip_anonymization, "{value} should not enable");
        }
    }

    #[test]
    fn test_unknown_modes_fall_back() {
        let config = load_with(&[
            ("DATABASE_BACKEND", "mysql"),
            ("GEO_PROVIDER", "ipinfo"),
            ("TRUSTED_PROXY_MODE", "akamai"),
        ])
        .unwrap();

        assert!(matches!(config.database.backend, DatabaseBackend::Sqlite));
        assert_eq!(config.geo.provider, GeoProvider::IpApi);
        assert_eq!(config.client_ip.trusted_proxy_mode, TrustedProxyMode::Standard);
    }

    #[test]
    fn test_explicit_values() {
        let config = load_with(&[
            ("DATABASE_BACKEND", "PostgreSQL"),
            ("DATABASE_URL", "postgres://localhost/visits"),
            ("PORT", "8081"),
            ("TRUSTED_PROXY_MODE", "cloudflare"),
            ("ADMIN_API_KEYS", " alpha , ,beta"),
            ("IMAGE_PATH", "/srv/pixel.png"),
        ])
        .unwrap();

        assert!(matches!(config.database.backend, DatabaseBackend::Postgres));
        assert_eq!(config.database.url, "postgres://localhost/visits");
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.client_ip.trusted_proxy_mode, TrustedProxyMode::Cloudflare);
        assert_eq!(config.admin.api_keys, vec!["alpha".to_string(), "beta".to_string()]);
        assert_eq!(config.asset.image_path.as_deref(), Some("/srv/pixel.png"));
    }

    #[test]
    fn test_maxmind_requires_db_path() {
        let err = load_with(&[("GEO_PROVIDER", "maxmind")]).unwrap_err();
        assert!(err.to_string().contains("GEOIP_CITY_DB_PATH"));

        let config = load_with(&[
            ("GEO_PROVIDER", "maxmind"),
            ("GEOIP_CITY_DB_PATH", "/data/GeoLite2-City.mmdb"),
        ])
        .unwrap();
        assert_eq!(config.geo.provider, GeoProvider::MaxMind);
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        assert!(load_with(&[("PORT", "http")]).is_err());
    }
}
