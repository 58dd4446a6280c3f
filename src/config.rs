use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::{AppError, Result};
use crate::providers::{ProviderId, ProviderRegistry};

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub log_db_path: PathBuf,
    pub auth_username: String,
    pub auth_password: String,
    pub http_timeout: Duration,
    pub endpoint_overrides: Vec<(ProviderId, Url)>,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, `env::var` in production.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| AppError::ConfigError(format!("{} must be set", key)))
        };

        let auth_username = required("AUTH_USERNAME")?;
        let auth_password = required("AUTH_PASSWORD")?;

        // Load server configuration with defaults
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("PORT").unwrap_or_else(|| "3000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let log_db_path = lookup("LOG_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("logs").join("user_logs.db"));

        let http_timeout = match lookup("HTTP_TIMEOUT_SECS") {
            Some(secs) => secs
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| AppError::ConfigError(format!("Invalid HTTP_TIMEOUT_SECS: {}", secs)))?,
            None => Duration::from_secs(30),
        };

        let mut endpoint_overrides = Vec::new();
        for id in ProviderId::ALL {
            let key = endpoint_var(id);
            if let Some(raw) = lookup(&key) {
                let endpoint = Url::parse(&raw)
                    .map_err(|e| AppError::ConfigError(format!("Invalid {}: {}", key, e)))?;
                endpoint_overrides.push((id, endpoint));
            }
        }

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            log_db_path,
            auth_username,
            auth_password,
            http_timeout,
            endpoint_overrides,
        })
    }

    /// The default registry with any configured endpoint overrides applied.
    pub fn registry(&self) -> ProviderRegistry {
        self.endpoint_overrides
            .iter()
            .fold(ProviderRegistry::default(), |registry, (id, endpoint)| {
                registry.with_endpoint(*id, endpoint.clone())
            })
    }
}

/// `DEEPAI_ENDPOINT`, `MEANINGCLOUD_ENDPOINT`, ...
fn endpoint_var(id: ProviderId) -> String {
    format!("{}_ENDPOINT", id.name().to_ascii_uppercase())
}
