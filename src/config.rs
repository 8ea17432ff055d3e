use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::discovery::Identity;
use crate::time::SyncPolicy;
use crate::time::sync::NTP_PORT;

/// Environment variable naming the YAML config file.
pub const CONFIG_ENV: &str = "CARDSERVE_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub time: TimeConfig,
    pub discovery: DiscoveryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Address put into links and discovery replies; defaults to the
    /// listener's own address
    pub advertise_ip: Option<Ipv4Addr>,
    pub buffer_size: usize,
    pub request_timeout_secs: u64,
    pub headers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub root: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// `host:port` of the NTP server
    pub server: String,
    pub bind_addr: String,
    pub resync_interval_secs: u64,
    /// Added to network time, e.g. the timezone
    pub offset_secs: i32,
    pub retries: u32,
    pub reply_window_ms: u64,
    pub lease_retries: u32,
    pub maintenance_tick_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub bind_addr: String,
    pub prefix: String,
    pub description: String,
    pub http_port: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:80".to_string(),
            advertise_ip: None,
            buffer_size: 255,
            request_timeout_secs: 30,
            headers: vec!["content-length".to_string()],
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./card"),
        }
    }
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            server: format!("65.55.21.23:{NTP_PORT}"),
            bind_addr: "0.0.0.0:0".to_string(),
            resync_interval_secs: 2 * 3600,
            offset_secs: 2 * 3600,
            retries: 2,
            reply_window_ms: 3000,
            lease_retries: 3,
            maintenance_tick_ms: 1000,
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8221".to_string(),
            prefix: "web/js".to_string(),
            description: "cardserve".to_string(),
            http_port: 80,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl TimeConfig {
    pub fn policy(&self) -> SyncPolicy {
        SyncPolicy {
            resync_interval: Duration::from_secs(self.resync_interval_secs),
            reply_window: Duration::from_millis(self.reply_window_ms),
            retries: self.retries,
            lease_attempts: self.lease_retries,
        }
    }

    pub fn maintenance_tick(&self) -> Duration {
        Duration::from_millis(self.maintenance_tick_ms.max(1))
    }
}

impl DiscoveryConfig {
    pub fn identity(&self) -> Identity {
        Identity {
            prefix: self.prefix.clone(),
            description: self.description.clone(),
        }
    }
}

impl Config {
    /// Defaults, overridden by the file named in `CARDSERVE_CONFIG` and the
    /// `LISTEN` variable.
    ///
    /// A config file that cannot be read is reported and ignored; one that
    /// does not parse is an error.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => match std::fs::read_to_string(&path) {
                Ok(content) => Self::from_yaml(&content)
                    .with_context(|| format!("invalid config file {path}"))?,
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "cannot read config, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        };

        if let Ok(listen) = std::env::var("LISTEN") {
            cfg.server.listen_addr = listen;
        }

        Ok(cfg)
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}
