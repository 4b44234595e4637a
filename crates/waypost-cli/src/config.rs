//! Server configuration

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;
use waypost_store::DEFAULT_STORAGE_ROOT;

/// Server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Directory all buckets live under
    pub storage_root: PathBuf,
    /// Rate limit (requests per second per client)
    pub rate_limit_rps: u32,
    /// Proxies whose `X-Forwarded-For` names the client
    pub trusted_proxies: Vec<IpAddr>,
    /// Maximum upload request body size (bytes)
    pub max_upload_size: usize,
    /// Enable CORS
    pub cors_enabled: bool,
    /// Age after which an unpromoted staged upload is removed (seconds)
    pub staging_ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            storage_root: PathBuf::from(DEFAULT_STORAGE_ROOT),
            rate_limit_rps: 100,
            trusted_proxies: Vec::new(),
            max_upload_size: 50 * 1024 * 1024, // 50 MB
            cors_enabled: true,
            staging_ttl_secs: 24 * 60 * 60,
        }
    }
}

impl ServerConfig {
    /// Get the bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Staged upload lifetime
    pub fn staging_ttl(&self) -> Duration {
        Duration::from_secs(self.staging_ttl_secs)
    }
}
