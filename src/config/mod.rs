use crate::media::CookieBrowser;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const APP_DIR: &str = "QuickTube";
pub const LOG_FILE: &str = "log.txt";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: Option<String>,
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub bin_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub cookie_browser: Option<CookieBrowser>,
    pub tools: ToolsConfig,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    pub fn get_logging_format(&self) -> &str {
        self.logging.format.as_deref().unwrap_or("text")
    }

    pub fn log_path(&self) -> PathBuf {
        self.logging
            .file
            .clone()
            .unwrap_or_else(|| config_dir().join(LOG_FILE))
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.tools.bin_dir.clone().unwrap_or_else(user_bin_dir)
    }
}

fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Per-user directory for history, logs and the config file.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| home().join(".config"))
        .join(APP_DIR)
}

/// Where updated tool binaries are installed.
pub fn user_bin_dir() -> PathBuf {
    if cfg!(target_os = "linux") {
        home().join(".local").join("bin").join("quicktube_tools")
    } else {
        config_dir().join("bin")
    }
}

/// Locate the config file: explicit flag, then `QUICKTUBE_CONFIG`, then the
/// XDG and per-OS config directories.
pub fn find_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var("QUICKTUBE_CONFIG") {
        return Some(PathBuf::from(path));
    }

    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        let config_path = Path::new(&xdg_config_home)
            .join("quicktube")
            .join("config.toml");
        if config_path.exists() {
            return Some(config_path);
        }
    }

    let config_path = config_dir().join("config.toml");
    if config_path.exists() {
        return Some(config_path);
    }

    None
}
