//! Polling budget configuration.
//!
//! Settings load in the usual precedence order: env vars > config file >
//! defaults. Client implementations embed a [`BuildSettings`] and expose it
//! through `PollTimings`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::{DEFAULT_BUILD_INTERVAL_SECS, DEFAULT_BUILD_TIMEOUT_SECS};

/// Per-client polling budget: total wait time and pause between polls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSettings {
    #[serde(default = "default_build_timeout_secs")]
    pub build_timeout_secs: u64,
    #[serde(default = "default_build_interval_secs")]
    pub build_interval_secs: u64,
}

fn default_build_timeout_secs() -> u64 {
    DEFAULT_BUILD_TIMEOUT_SECS
}

fn default_build_interval_secs() -> u64 {
    DEFAULT_BUILD_INTERVAL_SECS
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            build_timeout_secs: DEFAULT_BUILD_TIMEOUT_SECS,
            build_interval_secs: DEFAULT_BUILD_INTERVAL_SECS,
        }
    }
}

impl BuildSettings {
    pub fn build_timeout(&self) -> Duration {
        Duration::from_secs(self.build_timeout_secs)
    }

    pub fn build_interval(&self) -> Duration {
        Duration::from_secs(self.build_interval_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.build_timeout_secs == 0 {
            return Err(anyhow::anyhow!("build_timeout_secs must be greater than 0"));
        }

        if self.build_interval_secs == 0 {
            return Err(anyhow::anyhow!(
                "build_interval_secs must be greater than 0"
            ));
        }

        if self.build_interval_secs > self.build_timeout_secs {
            return Err(anyhow::anyhow!(
                "build_interval_secs ({}) must not exceed build_timeout_secs ({})",
                self.build_interval_secs,
                self.build_timeout_secs
            ));
        }

        Ok(())
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(timeout_str) = std::env::var("CLOUDWAIT_BUILD_TIMEOUT") {
            if let Ok(timeout_secs) = timeout_str.parse::<u64>() {
                self.build_timeout_secs = timeout_secs;
            }
        }

        if let Ok(interval_str) = std::env::var("CLOUDWAIT_BUILD_INTERVAL") {
            if let Ok(interval_secs) = interval_str.parse::<u64>() {
                self.build_interval_secs = interval_secs;
            }
        }
    }
}

/// Load settings: env vars > config file > defaults.
pub fn load_settings(config_path: Option<&str>) -> Result<BuildSettings> {
    let mut settings = BuildSettings::default();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            let file_content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {path}"))?;

            settings = toml::from_str(&file_content)
                .with_context(|| format!("Failed to parse config file: {path}"))?;

            log::info!("Loaded waiter settings from file: {path}");
        } else {
            log::info!("Config file not found: {path}, using defaults");
        }
    }

    settings.apply_env_overrides();

    settings
        .validate()
        .with_context(|| "Waiter settings validation failed")?;

    log::debug!("Final waiter settings: {settings:?}");

    Ok(settings)
}
