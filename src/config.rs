use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/client.json";
pub const DEFAULT_API_BASE: &str = "https://api.redlinelegal.ca";
pub const DEFAULT_DATABASE_PATH: &str = "data/client.db";
pub const API_BASE_ENV: &str = "REDLINE_API_BASE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base: String,
    pub database_path: String,
    pub sessions_poll_secs: u64,
    pub admin_history_poll_secs: u64,
    pub visitor_history_poll_secs: u64,
    /// Unset or 0 means requests wait for the OS-level timeout.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            sessions_poll_secs: 6,
            admin_history_poll_secs: 3,
            visitor_history_poll_secs: 4,
            request_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    pub fn sessions_poll(&self) -> Duration {
        poll_interval(self.sessions_poll_secs)
    }

    pub fn admin_history_poll(&self) -> Duration {
        poll_interval(self.admin_history_poll_secs)
    }

    pub fn visitor_history_poll(&self) -> Duration {
        poll_interval(self.visitor_history_poll_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// `REDLINE_API_BASE` wins over the file.
    pub fn apply_env(&mut self) {
        if let Ok(base) = std::env::var(API_BASE_ENV) {
            self.override_api_base(&base);
        }
    }

    pub fn override_api_base(&mut self, base: &str) {
        let base = base.trim();
        if base.is_empty() {
            return;
        }
        self.api_base = base.to_string();
    }
}

fn poll_interval(secs: u64) -> Duration {
    Duration::from_secs(secs.max(1))
}

pub fn load_config(path: &str) -> ClientConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<ClientConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                ClientConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            ClientConfig::default()
        }
    }
}
