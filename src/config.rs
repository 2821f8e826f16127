// Configuration for the media center remote
//
// The client block may live under "services" -> "remote" (shared configuration
// file with the media center server) or at the top level of a standalone file.

use std::fs;
use std::path::Path;
use std::time::Duration;
use log::debug;
use serde::{Serialize, Deserialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::channel::ChannelOptions;
use crate::helpers::endpoint::websocket_endpoint;
use crate::logging::LoggingConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid server address '{server}': {reason}")]
    InvalidServer { server: String, reason: String },

    #[error("Unsupported URL scheme '{0}', expected http(s) or ws(s)")]
    UnsupportedScheme(String),
}

/// Helper function to get a configuration section with backward compatibility
///
/// Looks for the section in the "services" subtree first and falls back to a
/// top-level entry.
///
/// # Example
/// ```rust
/// use serde_json::json;
/// use mediaremote::config::get_service_config;
///
/// let config = json!({ "services": { "remote": { "server": "http://tv:5000/" } } });
/// assert_eq!(get_service_config(&config, "remote").unwrap()["server"], "http://tv:5000/");
///
/// let old_config = json!({ "remote": { "server": "http://tv:5000/" } });
/// assert!(get_service_config(&old_config, "remote").is_some());
/// ```
pub fn get_service_config<'a>(config: &'a Value, service_name: &str) -> Option<&'a Value> {
    if let Some(service_config) = config.get("services").and_then(|s| s.get(service_name)) {
        debug!("Found {} configuration in services section", service_name);
        return Some(service_config);
    }

    if let Some(service_config) = config.get(service_name) {
        debug!("Found {} configuration at top level (legacy structure)", service_name);
        return Some(service_config);
    }

    debug!("No {} configuration found in either services section or top level", service_name);
    None
}

/// Remote client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Origin of the media center web interface
    #[serde(default = "default_server")]
    pub server: String,

    /// Resource of the player command channel, relative to the server
    #[serde(default = "default_command_path")]
    pub command_path: String,

    /// Resource of the event channel, relative to the server
    #[serde(default = "default_events_path")]
    pub events_path: String,

    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    #[serde(default = "default_volume_debounce_ms")]
    pub volume_debounce_ms: u64,

    /// How long one-shot commands wait for the command channel to open
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

fn default_server() -> String {
    "http://localhost:5000/".to_string()
}

fn default_command_path() -> String {
    "ws/remote/".to_string()
}

fn default_events_path() -> String {
    "ws/events/".to_string()
}

fn default_reconnect_delay_ms() -> u64 {
    500
}

fn default_volume_debounce_ms() -> u64 {
    100
}

fn default_connect_timeout_ms() -> u64 {
    5000
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            server: default_server(),
            command_path: default_command_path(),
            events_path: default_events_path(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            volume_debounce_ms: default_volume_debounce_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            logging: None,
        }
    }
}

impl ClientConfig {
    /// Load the configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Read the "remote" section, or treat the whole document as the client
    /// configuration when there is none
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let section = get_service_config(value, "remote").unwrap_or(value);
        Ok(serde_json::from_value(section.clone())?)
    }

    pub fn command_endpoint(&self) -> Result<Url, ConfigError> {
        websocket_endpoint(&self.server, &self.command_path)
    }

    pub fn events_endpoint(&self) -> Result<Url, ConfigError> {
        websocket_endpoint(&self.server, &self.events_path)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn volume_debounce(&self) -> Duration {
        Duration::from_millis(self.volume_debounce_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn channel_options(&self) -> ChannelOptions {
        ChannelOptions {
            reconnect_delay: self.reconnect_delay(),
        }
    }
}
