//! Configuration Management
//!
//! Handles persistent configuration storage for ddmap. Environment variables
//! take precedence over the stored file.

use crate::datadog::auth::{API_KEY_ENV, APP_KEY_ENV};
use crate::datadog::client::DEFAULT_API_URL;
use crate::datadog::DatadogCredentials;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const SITE_ENV: &str = "DD_SITE";
pub const HOST_ENV: &str = "DD_HOST";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Datadog site, e.g. `datadoghq.eu`
    #[serde(default)]
    pub site: Option<String>,
    /// Full API host; wins over `site`
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub app_key: Option<String>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ddmap").join("config.json"))
    }

    /// Load configuration from disk, then apply environment overrides
    pub fn load() -> Self {
        let mut config = Self::load_file();
        config.apply_env(|name| std::env::var(name).ok());
        config
    }

    fn load_file() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
                tracing::warn!("ignoring unreadable config {:?}: {}", path, err);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Overlay values found through `lookup` (normally the process environment)
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(v) = lookup(API_KEY_ENV) {
            self.api_key = Some(v);
        }
        if let Some(v) = lookup(APP_KEY_ENV) {
            self.app_key = Some(v);
        }
        if let Some(v) = lookup(SITE_ENV) {
            self.site = Some(v);
        }
        if let Some(v) = lookup(HOST_ENV) {
            self.api_url = Some(v);
        }
    }

    /// Get effective API host (api_url > site > datadoghq.com)
    pub fn effective_api_url(&self) -> String {
        if let Some(url) = &self.api_url {
            return url.trim_end_matches('/').to_string();
        }
        match &self.site {
            Some(site) => format!("https://api.{}", site.trim_matches('/')),
            None => DEFAULT_API_URL.to_string(),
        }
    }

    /// Both keys, or an error naming the first one missing
    pub fn credentials(&self) -> Result<DatadogCredentials> {
        let Some(api_key) = &self.api_key else {
            bail!("no API key configured. Set {} or api_key in the config file", API_KEY_ENV);
        };
        let Some(app_key) = &self.app_key else {
            bail!(
                "no application key configured. Set {} or app_key in the config file",
                APP_KEY_ENV
            );
        };
        Ok(DatadogCredentials::new(api_key.clone(), app_key.clone()))
    }
}
