use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;

use crate::error::{AppError, Result};
use crate::session::SessionLimits;

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub backend_url: String,
    pub request_timeout: Option<Duration>,
    pub session_limits: SessionLimits,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_url = lookup("BACKEND_URL").unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        let backend_url = parse_backend_url(&backend_url)?;

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("PORT").unwrap_or_else(|| "3000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let request_timeout = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw
                    .parse::<u64>()
                    .map_err(|e| AppError::ConfigError(format!("Invalid request timeout: {}", e)))?;
                if secs == 0 {
                    return Err(AppError::ConfigError("Request timeout must be positive".to_string()));
                }
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let defaults = SessionLimits::default();
        let idle_timeout = match lookup("SESSION_IDLE_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse::<u64>()
                    .map_err(|e| AppError::ConfigError(format!("Invalid session idle timeout: {}", e)))?,
            ),
            None => defaults.idle_timeout,
        };
        let max_sessions = match lookup("MAX_SESSIONS") {
            Some(raw) => {
                let max = raw
                    .parse::<usize>()
                    .map_err(|e| AppError::ConfigError(format!("Invalid session limit: {}", e)))?;
                if max == 0 {
                    return Err(AppError::ConfigError("Session limit must be positive".to_string()));
                }
                max
            }
            None => defaults.max_sessions,
        };

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            backend_url,
            request_timeout,
            session_limits: SessionLimits { idle_timeout, max_sessions },
        })
    }
}

/// Validates the backend base URL and strips any trailing slash so paths can be appended.
fn parse_backend_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw.trim()).map_err(|e| AppError::ConfigError(format!("Invalid backend URL: {}", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url.as_str().trim_end_matches('/').to_string()),
        other => Err(AppError::ConfigError(format!("Unsupported backend URL scheme: {}", other))),
    }
}
