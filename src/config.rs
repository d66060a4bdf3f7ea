use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main MCB configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub log_level: LogLevel,
    pub paths: PathsConfig,
    pub qci: QciConfig,
    pub bridge: BridgeConfig,
}

/// Log verbosity
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }

    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Saved network snapshot (JSON)
    pub state: PathBuf,
    /// Root of the bridge JSONL logs
    pub bridge: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QciConfig {
    /// Coherence given to agents registered without an explicit level
    pub default_coherence: f64,
    /// Base used by `qci signal` when none is given
    pub signal_base: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub enabled: bool,
}

impl Default for PathsConfig {
    fn default() -> Self {
        let mcb_dir = Config::mcb_dir();

        Self {
            state: mcb_dir.join("state").join("network.json"),
            bridge: mcb_dir.join("bridge"),
        }
    }
}

impl Default for QciConfig {
    fn default() -> Self {
        Self {
            default_coherence: 0.5,
            signal_base: 1.0,
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Check MCB_CONFIG env var
        if let Ok(env_path) = std::env::var("MCB_CONFIG") {
            let path = PathBuf::from(env_path);
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from MCB_CONFIG: {}", e);
                    }
                }
            }
        }

        // Try MCB_DIR/mcb.yaml
        if let Ok(mcb_dir) = std::env::var("MCB_DIR") {
            let path = PathBuf::from(mcb_dir).join("mcb.yaml");
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from MCB_DIR: {}", e);
                    }
                }
            }
        }

        // Try ~/.config/mcb/mcb.yaml
        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("mcb").join("mcb.yaml");
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        // Try ./mcb.yaml (for development)
        let local_config = PathBuf::from("mcb.yaml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load local config: {}", e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Get the MCB directory (where state and bridge logs live)
    pub fn mcb_dir() -> PathBuf {
        std::env::var("MCB_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("mcb"))
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }

    pub fn state_path(&self) -> PathBuf {
        Self::expand_path(&self.paths.state)
    }

    pub fn bridge_path(&self) -> PathBuf {
        Self::expand_path(&self.paths.bridge)
    }
}
