// src/config/app.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::DEFAULT_MAX_POST_LENGTH;
use crate::remote::{RemoteMode, ENV_REMOTE_MODE};

pub const DEFAULT_CONFIG_PATH: &str = "config/app.toml";
pub const ENV_CONFIG_PATH: &str = "CIVIC_CONFIG_PATH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" | "pretty" | "text" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => bail!("unsupported log format: {other}"),
        }
    }
}

/// Application settings. Every field has a default, so a partial TOML file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app_name: String,
    pub app_version: String,
    pub environment: String,
    pub api_host: String,
    pub api_port: u16,
    /// Twitter-style character limit.
    pub max_post_length: usize,
    pub log_level: String,
    pub log_format: LogFormat,
    pub remote_analyzer: RemoteMode,
    pub metrics_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "CivicGPT".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
            api_host: "0.0.0.0".to_string(),
            api_port: 8000,
            max_post_length: DEFAULT_MAX_POST_LENGTH,
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
            remote_analyzer: RemoteMode::Disabled,
            metrics_enabled: false,
        }
    }
}

impl Settings {
    /// Load settings:
    /// 1) $CIVIC_CONFIG_PATH (must exist when set)
    /// 2) config/app.toml (optional)
    /// 3) env overrides on top
    pub fn load() -> Result<Self> {
        let mut settings = match std::env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                let path = PathBuf::from(p);
                if !path.exists() {
                    return Err(anyhow!(
                        "{ENV_CONFIG_PATH} points to non-existent path {}",
                        path.display()
                    ));
                }
                Self::from_file(&path)?
            }
            Err(_) => {
                let path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };

        settings.apply_env()?;
        settings.validate()?;
        Ok(settings)
    }

    fn from_file(path: &PathBuf) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing settings from {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(s)?;
        Ok(settings)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(v) = env_var("APP_NAME") {
            self.app_name = v;
        }
        if let Some(v) = env_var("ENVIRONMENT") {
            self.environment = v;
        }
        if let Some(v) = env_var("API_HOST") {
            self.api_host = v;
        }
        if let Some(v) = env_var("API_PORT") {
            self.api_port = v
                .parse()
                .with_context(|| format!("API_PORT is not a valid port: {v}"))?;
        }
        if let Some(v) = env_var("MAX_POST_LENGTH") {
            self.max_post_length = v
                .parse()
                .with_context(|| format!("MAX_POST_LENGTH is not a number: {v}"))?;
        }
        if let Some(v) = env_var("LOG_LEVEL") {
            self.log_level = v;
        }
        if let Some(v) = env_var("LOG_FORMAT") {
            self.log_format = v.parse()?;
        }
        if let Some(v) = env_var(ENV_REMOTE_MODE) {
            self.remote_analyzer = v.parse()?;
        }
        if let Some(v) = env_var("METRICS_ENABLED") {
            self.metrics_enabled = matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.max_post_length == 0 {
            bail!("max_post_length must be at least 1");
        }
        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

/// Non-empty env var, trimmed.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
