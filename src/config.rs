use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

pub const DEFAULT_API_BASE: &str = "http://localhost:8001/api";
pub const DEFAULT_DOUBLE_CLICK_MS: u64 = 250;
pub const DEFAULT_LOG_FILTER: &str = "info";

pub const API_BASE_ENV: &str = "FILE_BROWSER_API_BASE";
pub const DOUBLE_CLICK_ENV: &str = "FILE_BROWSER_DOUBLE_CLICK_MS";
pub const LOG_ENV: &str = "FILE_BROWSER_LOG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrowserConfig {
    pub api_base: String,
    pub double_click_ms: u64,
    pub log_filter: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            double_click_ms: DEFAULT_DOUBLE_CLICK_MS,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// `<config dir>/file-browser/config.json`, or `None` when the platform has no home.
pub fn config_file_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "file-browser").map(|dirs| dirs.config_dir().join("config.json"))
}

impl BrowserConfig {
    /// Config file (if any) plus environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(config_file_path().as_deref())?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// A missing file yields the defaults. Unknown keys are ignored.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        let config: Self = serde_json::from_str(&raw).map_err(|err| {
            AppError::Config(format!("invalid config file {}: {err}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `FILE_BROWSER_*` values returned by `lookup`. Blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(api_base) = value(API_BASE_ENV) {
            self.api_base = api_base.trim().to_string();
        }
        if let Some(ms) = value(DOUBLE_CLICK_ENV) {
            self.double_click_ms = ms.trim().parse().map_err(|_| {
                AppError::Config(format!("{DOUBLE_CLICK_ENV} must be a number of milliseconds, got '{ms}'"))
            })?;
        }
        if let Some(filter) = value(LOG_ENV) {
            self.log_filter = filter;
        }
        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if self.api_base.trim().is_empty() {
            return Err(AppError::Config("apiBase cannot be empty".to_string()));
        }
        if self.double_click_ms == 0 {
            return Err(AppError::Config(
                "doubleClickMs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn double_click_window(&self) -> Duration {
        Duration::from_millis(self.double_click_ms)
    }
}
