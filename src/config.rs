//! Application configuration
//!
//! Handles loading and managing configuration from config.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::volume::CopyMode;

/// Global application config
static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Get the global application config
pub fn get_config() -> &'static AppConfig {
    APP_CONFIG.get_or_init(AppConfig::load)
}

/// Root application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub temp: TempConfig,
}

/// Where to find hfsutils and how to drive it
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct EngineConfig {
    /// Directory containing hmount, hdir, hcopy, ... (`PATH` lookup if unset)
    #[serde(default)]
    pub tool_dir: Option<PathBuf>,
    /// Default translation for copying files onto a volume
    #[serde(default)]
    pub copy_mode: CopyMode,
}

/// Temporary files created while copying streams
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TempConfig {
    #[serde(default = "default_temp_suffix")]
    pub suffix: String,
}

pub fn default_temp_suffix() -> String {
    ".bin".to_string()
}

impl Default for TempConfig {
    fn default() -> Self {
        Self {
            suffix: default_temp_suffix(),
        }
    }
}

impl AppConfig {
    /// Load configuration from config.json
    pub fn load() -> Self {
        // Try to load from current directory first
        if let Ok(config) = Self::load_from_path("config.json") {
            log::info!("Loaded config from ./config.json");
            return config;
        }

        // Try to load from executable directory
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let config_path = exe_dir.join("config.json");
                if let Ok(config) = Self::load_from_path(&config_path) {
                    log::info!("Loaded config from {}", config_path.display());
                    return config;
                }
            }
        }

        log::info!("No config.json found, using defaults");
        Self::default()
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }
}
