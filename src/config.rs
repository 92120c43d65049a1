//! Configuration loading and persistence.
//!
//! Values come from defaults, then `config.json` in the config directory,
//! then `WEBSHELL_*` environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::permission::PermissionState;

/// Configuration for the host shell.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Remote page loaded into the embedded browser surface at launch.
    pub start_url: String,
    /// Build-time experience identifier that scopes push tokens.
    pub experience_id: String,
    /// Delay in milliseconds before the status bar style is reapplied after
    /// a theme change.
    pub theme_settle_delay_ms: u64,
    /// Overrides the host-derived device identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Report a non-live (simulated) device.
    pub simulated: bool,
    /// Token issued by the headless push service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_token: Option<String>,
    /// Initial OS permission state reported by the headless permission service.
    pub permission: PermissionState,
    /// Whether the headless permission prompt grants the request.
    pub grant_on_request: bool,
    /// HTTP timeout in seconds for backend calls.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_url: "https://eodiro.com".to_string(),
            experience_id: "@payw/eodiro".to_string(),
            theme_settle_delay_ms: 1200,
            device_id: None,
            simulated: false,
            push_token: None,
            permission: PermissionState::Undetermined,
            grant_on_request: true,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Returns the configuration directory path, creating it if necessary.
    ///
    /// Directory selection priority:
    /// 1. `explicit` (the `--config-dir` flag)
    /// 2. `WEBSHELL_CONFIG_DIR` env var
    /// 3. `WEBSHELL_ENV=test`: `<tmp>/webshell-test`
    /// 4. Default: platform config dir (macOS: ~/Library/Application Support/webshell)
    pub fn config_dir(explicit: Option<&Path>) -> Result<PathBuf> {
        let dir = if let Some(dir) = explicit {
            dir.to_path_buf()
        } else if let Ok(dir) = std::env::var("WEBSHELL_CONFIG_DIR") {
            PathBuf::from(dir)
        } else if crate::env::is_test_mode() {
            std::env::temp_dir().join("webshell-test")
        } else {
            dirs::config_dir()
                .context("Could not determine config directory")?
                .join("webshell")
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
        Ok(dir)
    }

    /// Loads configuration from `config.json` in [`Self::config_dir`], with
    /// environment variable overrides.
    ///
    /// A missing file yields defaults; an unreadable or invalid one is an error.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let mut config = Self::load_from_file(&Self::config_dir(dir)?)?.unwrap_or_default();
        config.apply_env_overrides();
        Ok(config)
    }

    fn load_from_file(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join("config.json");
        if !config_path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;
        Ok(Some(config))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(start_url) = std::env::var("WEBSHELL_START_URL") {
            self.start_url = start_url;
        }

        if let Ok(experience_id) = std::env::var("WEBSHELL_EXPERIENCE_ID") {
            self.experience_id = experience_id;
        }

        if let Ok(device_id) = std::env::var("WEBSHELL_DEVICE_ID") {
            self.device_id = Some(device_id);
        }

        if let Ok(push_token) = std::env::var("WEBSHELL_PUSH_TOKEN") {
            self.push_token = Some(push_token);
        }

        if let Ok(simulated) = std::env::var("WEBSHELL_SIMULATED") {
            self.simulated = matches!(simulated.as_str(), "1" | "true" | "yes");
        }

        if let Ok(permission) = std::env::var("WEBSHELL_PERMISSION") {
            match permission.parse() {
                Ok(state) => self.permission = state,
                Err(e) => log::warn!("Ignoring WEBSHELL_PERMISSION: {e}"),
            }
        }
    }

    /// Persists the configuration into [`Self::config_dir`]. Returns the file written.
    pub fn save(&self, dir: Option<&Path>) -> Result<PathBuf> {
        let config_path = Self::config_dir(dir)?.join("config.json");
        fs::write(&config_path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;

        #[cfg(unix)]
        fs::set_permissions(&config_path, fs::Permissions::from_mode(0o600))?;

        Ok(config_path)
    }

    /// Theme settle delay as a [`std::time::Duration`].
    pub fn theme_settle_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.theme_settle_delay_ms)
    }
}
