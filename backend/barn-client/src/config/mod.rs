use crate::DEFAULT_SERVER_ADDRESS;
use crate::error::config::ConfigError;

use common::{ErrorLocation, RedactedSecret};

use std::env;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use url::Url;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_VERSION: u32 = 1;
const CONFIG_DIR_NAME: &str = "jsonbarn";
const DEFAULT_DEPLOYMENT: &str = "jsonbarn";
const DEFAULT_RETRY_INTERVAL_MS: u64 = 10;
const DEFAULT_MAX_RETRY_ELAPSED_MS: u64 = 5_000;

pub const CONFIG_DIR_ENV: &str = "BARN_CONFIG_DIR";
pub const PASSWORD_ENV: &str = "BARN_PASSWORD";

// ============================================
// ENUMS WITH DEFAULTS
// ============================================

/// What happens to the subscription registry when the transport closes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPolicy {
    /// Forget every subscription; the next session starts empty.
    #[default]
    Clear,
    /// Keep the registry and re-request each bucket when the next transport opens.
    Replay,
}

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SenderConfig {
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
    #[serde(default = "default_max_retry_elapsed_ms")]
    pub max_retry_elapsed_ms: u64,
}

impl SenderConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn max_retry_elapsed(&self) -> Duration {
        Duration::from_millis(self.max_retry_elapsed_ms)
    }
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            retry_interval_ms: default_retry_interval_ms(),
            max_retry_elapsed_ms: default_max_retry_elapsed_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct SubscriptionConfig {
    #[serde(default)]
    pub on_disconnect: SubscriptionPolicy,
}

/// Stored login. The password is read from the file (or [`PASSWORD_ENV`]) but
/// never written back by [`ClientConfig::save`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: Option<RedactedSecret>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_deployment")]
    pub deployment: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub sender: SenderConfig,

    #[serde(default)]
    pub subscriptions: SubscriptionConfig,

    #[serde(default)]
    pub credentials: Option<Credentials>,

    #[serde(default)]
    pub watch_buckets: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            deployment: default_deployment(),
            server: ServerConfig::default(),
            sender: SenderConfig::default(),
            subscriptions: SubscriptionConfig::default(),
            credentials: None,
            watch_buckets: Vec::new(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_deployment() -> String {
    DEFAULT_DEPLOYMENT.to_string()
}
fn default_address() -> String {
    DEFAULT_SERVER_ADDRESS.to_string()
}
fn default_retry_interval_ms() -> u64 {
    DEFAULT_RETRY_INTERVAL_MS
}
fn default_max_retry_elapsed_ms() -> u64 {
    DEFAULT_MAX_RETRY_ELAPSED_MS
}

// ============================================
// IMPLEMENTATION
// ============================================

impl ClientConfig {
    /// Configuration for a named deployment, everything else at defaults.
    pub fn for_deployment(deployment: impl Into<String>) -> Self {
        Self {
            deployment: deployment.into(),
            ..Self::default()
        }
    }

    /// Load config from {config_dir}/config.json.
    ///
    /// # Returns
    ///
    /// Returns `Ok(ClientConfig)` if loaded successfully or defaults if the file is missing.
    /// Returns `Err(ConfigError)` if the file exists but is corrupted/invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {e}");
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let mut config: ClientConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {e}");
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.apply_password_env();
        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/config.json using atomic write.
    ///
    /// Uses temp file + rename so a crash never leaves a half-written file.
    /// Passwords are not persisted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation, directory creation, serialization,
    /// write or rename fails.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{CONFIG_FILE_NAME}.tmp"));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid version: {} (expected 1-{CONFIG_VERSION})",
                    self.version
                ),
            });
        }

        if self.deployment.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "deployment cannot be empty".to_string(),
            });
        }

        parse_transport_address(&self.server.address).map_err(|reason| {
            ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason,
            }
        })?;

        if self.sender.retry_interval_ms == 0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "sender.retry_interval_ms must be greater than zero".to_string(),
            });
        }

        if self.sender.max_retry_elapsed_ms < self.sender.retry_interval_ms {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "sender.max_retry_elapsed_ms ({}) must be at least retry_interval_ms ({})",
                    self.sender.max_retry_elapsed_ms, self.sender.retry_interval_ms
                ),
            });
        }

        if let Some(credentials) = &self.credentials {
            if credentials.username.is_empty() {
                return Err(ConfigError::ValidationError {
                    location: ErrorLocation::from(Location::caller()),
                    reason: "credentials.username cannot be empty".to_string(),
                });
            }
        }

        if self.watch_buckets.iter().any(|bucket| bucket.is_empty()) {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "watch_buckets cannot contain an empty bucket name".to_string(),
            });
        }

        Ok(())
    }

    fn apply_password_env(&mut self) {
        if let (Some(credentials), Ok(password)) = (self.credentials.as_mut(), env::var(PASSWORD_ENV))
        {
            debug!("Using password from {PASSWORD_ENV}");
            credentials.password = Some(RedactedSecret::new(password));
        }
    }
}

/// Parse a transport address, accepting only `ws://` and `wss://` URLs.
pub fn parse_transport_address(address: &str) -> Result<Url, String> {
    let url = Url::parse(address).map_err(|e| format!("Invalid address '{address}': {e}"))?;
    match url.scheme() {
        "ws" | "wss" => Ok(url),
        scheme => Err(format!(
            "Invalid address '{address}': scheme must be ws or wss, got {scheme}"
        )),
    }
}

/// Resolve the configuration directory.
///
/// Loads a `.env` file if present, then honours [`CONFIG_DIR_ENV`], falling
/// back to `{platform config dir}/jsonbarn`.
pub fn resolve_config_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded environment from {}", path.display());
    }

    if let Ok(dir) = env::var(CONFIG_DIR_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .ok_or_else(|| ConfigError::DirectoryNotFound {
            location: ErrorLocation::from(Location::caller()),
            reason: format!("No platform config directory and {CONFIG_DIR_ENV} is not set"),
        })
}
