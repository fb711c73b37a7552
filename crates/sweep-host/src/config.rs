//! Host configuration file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sweep_types::{
    ClearingDefaults, DEFAULT_BATCH_DELAY_MS, DEFAULT_BATCH_SIZE, DEFAULT_SINCE_WINDOW_MS,
};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "SWEEP_DATA_DIR";

/// Complete host configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub clearing: ClearingConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Defaults for clear requests that leave pacing or scope unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearingConfig {
    /// Categories per removal call.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Pause between two removal calls of the same partition.
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
    /// How far back removal reaches.
    #[serde(default = "default_since_window_ms")]
    pub since_window_ms: u64,
    /// Reload the cleared domain's tabs afterwards.
    #[serde(default = "default_true")]
    pub auto_refresh: bool,
}

/// Native-messaging channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Timeout for each call into the extension. 0 = wait forever.
    #[serde(default)]
    pub call_timeout_ms: u64,
    /// Largest frame the host may send to the extension.
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
}

/// Automatic rule scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory. Empty = platform default.
    #[serde(default)]
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// "trace" | "debug" | "info" | "warn" | "error". `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_batch_delay_ms() -> u64 {
    DEFAULT_BATCH_DELAY_MS
}

fn default_since_window_ms() -> u64 {
    DEFAULT_SINCE_WINDOW_MS
}

fn default_true() -> bool {
    true
}

fn default_max_message_bytes() -> usize {
    1024 * 1024
}

fn default_check_interval() -> u64 {
    3600
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ClearingConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            since_window_ms: default_since_window_ms(),
            auto_refresh: true,
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: 0,
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval_secs: default_check_interval(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ClearingConfig {
    pub fn defaults(&self) -> ClearingDefaults {
        ClearingDefaults {
            batch_size: self.batch_size,
            batch_delay_ms: self.batch_delay_ms,
            since_window_ms: self.since_window_ms,
            auto_refresh: self.auto_refresh,
        }
    }
}

impl HostConfig {
    /// Load from `config.toml` in the data directory, or defaults if absent.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Ok(Self::parse(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn data_dir(&self) -> PathBuf {
        if self.storage.data_dir.is_empty() {
            Self::default_data_dir()
        } else {
            PathBuf::from(&self.storage.data_dir)
        }
    }

    fn config_path() -> PathBuf {
        Self::default_data_dir().join("config.toml")
    }

    /// `$SWEEP_DATA_DIR`, else a per-platform directory under the home dir.
    fn default_data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            return PathBuf::from(dir);
        }
        #[cfg(target_os = "macos")]
        {
            home_fallback("Library/Application Support/Sweep")
        }
        #[cfg(target_os = "windows")]
        {
            home_fallback("Sweep")
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            home_fallback(".sweep")
        }
    }
}

fn home_fallback(subpath: &str) -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(|h| PathBuf::from(h).join(subpath))
        .unwrap_or_else(|_| std::env::temp_dir().join("sweep"))
}
