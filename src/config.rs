// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Application configuration management.
//!
//! Configuration is stored as TOML through `confy`. The gateway URL can be
//! overridden by the `LAPDOG_API_URL` environment variable or on the command
//! line.

use std::time::Duration;

use lapdog_client::{ClientConfig, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "lapdog-dashboard";
const CONFIG_NAME: &str = "config";

/// Environment variable overriding the configured gateway URL.
pub const API_URL_ENV: &str = "LAPDOG_API_URL";

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the local API gateway
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout in seconds (0 disables the timeout)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Seconds between dashboard refreshes in watch mode
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

// Default value functions for serde
fn default_api_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_refresh_interval_secs() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating it with defaults if missing
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, CONFIG_NAME, self)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    /// Resolve the gateway URL: command line, then environment, then config.
    pub fn resolve_api_url(&self, cli_url: Option<&str>) -> String {
        resolve_api_url(cli_url, std::env::var(API_URL_ENV).ok().as_deref(), &self.api_url)
    }

    /// Per-request timeout, `None` when disabled.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// Refresh interval for watch mode, never shorter than one second.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    /// Build the client configuration for the resolved gateway URL.
    pub fn client_config(&self, cli_url: Option<&str>) -> ClientConfig {
        ClientConfig {
            base_url: self.resolve_api_url(cli_url),
            request_timeout: self.request_timeout(),
        }
    }
}

fn resolve_api_url(cli: Option<&str>, env: Option<&str>, configured: &str) -> String {
    [cli, env]
        .into_iter()
        .flatten()
        .find(|url| !url.is_empty())
        .unwrap_or(configured)
        .to_string()
}
