//! Service configuration with validation and environment loading.

use serde::{Deserialize, Serialize};
use std::net::ToSocketAddrs;
use std::time::Duration;
use tracing::warn;

use callgate_bus::DEFAULT_SUBSCRIBER_CAPACITY;

/// Main service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Address the listener binds, e.g. `127.0.0.1:8083`. Port 0 asks
    /// the OS for a free port (the handle reports the bound address).
    pub listen_addr: String,

    /// ACL document: a JSON object mapping consumer name to an array of
    /// `/<service>/<method-or-*>` permission entries.
    pub acl: String,

    /// Events each admin subscriber may buffer before deliveries are
    /// dropped for it.
    pub subscriber_capacity: usize,

    /// Idle interval between SSE keep-alive comments, in seconds.
    pub sse_keep_alive_secs: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8083".to_string(),
            acl: "{}".to_string(),
            subscriber_capacity: DEFAULT_SUBSCRIBER_CAPACITY,
            sse_keep_alive_secs: 15,
        }
    }
}

impl GateConfig {
    /// Validate configuration.
    ///
    /// The ACL document itself is validated separately when the access
    /// policy is parsed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // The bind resolves hostnames, so validation must accept
        // everything it does: `localhost:8083` is a valid address.
        let resolves = self
            .listen_addr
            .to_socket_addrs()
            .map(|mut addrs| addrs.next().is_some())
            .unwrap_or(false);
        if !resolves {
            return Err(ConfigError::InvalidListenAddr(self.listen_addr.clone()));
        }

        if self.subscriber_capacity == 0 {
            return Err(ConfigError::InvalidCapacity);
        }

        if self.sse_keep_alive_secs == 0 {
            return Err(ConfigError::InvalidKeepAlive);
        }

        Ok(())
    }

    /// SSE keep-alive interval as a `Duration`.
    #[must_use]
    pub fn sse_keep_alive(&self) -> Duration {
        Duration::from_secs(self.sse_keep_alive_secs)
    }

    /// Load configuration from the environment.
    ///
    /// - `CALLGATE_LISTEN` - listen address
    /// - `CALLGATE_ACL` - inline ACL JSON (takes precedence)
    /// - `CALLGATE_ACL_FILE` - path to an ACL JSON file
    /// - `CALLGATE_SUBSCRIBER_CAPACITY` - per-subscriber queue size
    /// - `CALLGATE_KEEP_ALIVE_SECS` - SSE keep-alive interval
    ///
    /// An unreadable ACL file is fatal; the service must never start
    /// with a policy other than the one configured.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("CALLGATE_LISTEN") {
            config.listen_addr = addr;
        }

        match (
            std::env::var("CALLGATE_ACL"),
            std::env::var("CALLGATE_ACL_FILE"),
        ) {
            (Ok(acl), _) => config.acl = acl,
            (_, Ok(path)) => {
                config.acl = std::fs::read_to_string(&path)
                    .map_err(|e| ConfigError::AclFile(format!("{path}: {e}")))?;
            }
            _ => {}
        }

        if let Ok(value) = std::env::var("CALLGATE_SUBSCRIBER_CAPACITY") {
            match value.parse() {
                Ok(n) => config.subscriber_capacity = n,
                Err(_) => warn!("CALLGATE_SUBSCRIBER_CAPACITY must be a positive integer"),
            }
        }

        if let Ok(value) = std::env::var("CALLGATE_KEEP_ALIVE_SECS") {
            match value.parse() {
                Ok(n) => config.sse_keep_alive_secs = n,
                Err(_) => warn!("CALLGATE_KEEP_ALIVE_SECS must be a positive integer"),
            }
        }

        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Listen address does not resolve as host:port
    #[error("invalid listen address: {0}")]
    InvalidListenAddr(String),
    /// Subscriber queue capacity of zero
    #[error("subscriber capacity must be at least 1")]
    InvalidCapacity,
    /// Keep-alive interval of zero
    #[error("keep-alive interval must be at least 1 second")]
    InvalidKeepAlive,
    /// ACL file could not be read
    #[error("unreadable ACL file: {0}")]
    AclFile(String),
}
