// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Connection settings for the WAPI server.
//!
//! Settings come from a YAML (or JSON) file and may be overridden by environment variables:
//!
//! | Field | Environment | Default |
//! |---|---|---|
//! | `url` | `WAPI_URL` | required |
//! | `username` | `WAPI_USERNAME` | required |
//! | `password` | `WAPI_PASSWORD` | empty |
//! | `verify_server_cert` | | `false` |
//! | `timeout_secs` | | `30` |
//! | `wapi_version` | | `v2.13.1` |
//! | `page_size` | | `1000` (clamped to 1–1000) |
//!
//! ```yaml
//! url: https://grid-master.example.com
//! username: admin
//! password: infoblox
//! verify_server_cert: true
//! ```

use std::fmt;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::constants::{
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_WAPI_VERSION, ENV_WAPI_PASSWORD, ENV_WAPI_URL,
    ENV_WAPI_USERNAME, MAX_PAGE_SIZE,
};

/// WAPI connection settings.
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server URL, e.g. `https://grid-master.example.com`
    #[serde(default)]
    pub url: String,

    /// Account used for HTTP basic authentication
    #[serde(default)]
    pub username: String,

    /// Password for `username`
    #[serde(default)]
    pub password: String,

    /// Verify the server's TLS certificate
    #[serde(default)]
    pub verify_server_cert: bool,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// WAPI version segment, e.g. `v2.13.1`
    #[serde(default = "default_wapi_version")]
    pub wapi_version: String,

    /// Objects requested per page when listing
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_wapi_version() -> String {
    DEFAULT_WAPI_VERSION.to_string()
}

fn default_page_size() -> usize {
    MAX_PAGE_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            password: String::new(),
            verify_server_cert: false,
            timeout_secs: default_timeout_secs(),
            wapi_version: default_wapi_version(),
            page_size: default_page_size(),
        }
    }
}

// Keep the password out of logs and panic messages
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("verify_server_cert", &self.verify_server_cert)
            .field("timeout_secs", &self.timeout_secs)
            .field("wapi_version", &self.wapi_version)
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl Config {
    /// Load settings from an optional file, apply environment overrides and validate.
    ///
    /// # Arguments
    ///
    /// * `path` - YAML or JSON settings file; when `None`, settings come from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the resulting settings
    /// are incomplete.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        debug!(
            url = %config.url,
            username = %config.username,
            verify_server_cert = config.verify_server_cert,
            wapi_version = %config.wapi_version,
            "Loaded WAPI configuration"
        );

        Ok(config)
    }

    /// Parse a settings file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Parse settings from YAML text. JSON is valid YAML and is accepted too.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid YAML or contains unknown fields.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut config: Self = serde_yaml::from_str(text)?;
        config.page_size = config.page_size.clamp(1, MAX_PAGE_SIZE);
        Ok(config)
    }

    /// Override fields from environment-style lookups. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_WAPI_URL) {
            self.url = url;
        }
        if let Some(username) = get(ENV_WAPI_USERNAME) {
            self.username = username;
        }
        if let Some(password) = get(ENV_WAPI_PASSWORD) {
            self.password = password;
        }
    }

    /// Check that the settings are usable.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` or `username` is empty, `url` is not a valid URL, or the
    /// timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            bail!("WAPI server url is not configured (set `url` or {ENV_WAPI_URL})");
        }
        if self.username.trim().is_empty() {
            bail!("WAPI username is not configured (set `username` or {ENV_WAPI_USERNAME})");
        }
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be greater than zero");
        }
        url::Url::parse(&crate::wapi::client::build_api_url(&self.url, &self.wapi_version))
            .with_context(|| format!("Invalid WAPI server url: {}", self.url))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
