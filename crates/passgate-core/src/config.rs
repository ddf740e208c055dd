//! Verifier configuration loading and management.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CoreError;

/// Full configuration for a Passgate verifier.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VerifierConfig {
    /// How the verifier presents itself in disclosure requests.
    #[serde(default)]
    pub request: RequestConfig,

    /// QR code rendering options.
    #[serde(default)]
    pub qr: QrConfig,

    /// Eligibility policy.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Verifier name shown on the holder's device.
    #[serde(default = "default_display_name")]
    pub display_name: String,
    /// Logo reference shown next to the name.
    #[serde(default = "default_logo_ref")]
    pub logo_ref: String,
    /// Accept development credentials.
    #[serde(default)]
    pub dev_mode: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrConfig {
    /// Rendered width in pixels.
    #[serde(default = "default_qr_width")]
    pub width: u32,
    /// Quiet-zone margin in modules.
    #[serde(default = "default_qr_margin")]
    pub margin: u32,
    /// Foreground colour.
    #[serde(default = "default_qr_dark")]
    pub dark: String,
    /// Background colour.
    #[serde(default = "default_qr_light")]
    pub light: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Minimum age in whole years for the age check to pass.
    #[serde(default = "default_minimum_age")]
    pub minimum_age: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_display_name() -> String {
    "Identity Verifier".into()
}
fn default_logo_ref() -> String {
    "https://zkpassport.id/logo.png".into()
}
fn default_qr_width() -> u32 {
    300
}
fn default_qr_margin() -> u32 {
    2
}
fn default_qr_dark() -> String {
    "#000000".into()
}
fn default_qr_light() -> String {
    "#FFFFFF".into()
}
fn default_minimum_age() -> u32 {
    18
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            display_name: default_display_name(),
            logo_ref: default_logo_ref(),
            dev_mode: false,
        }
    }
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            width: default_qr_width(),
            margin: default_qr_margin(),
            dark: default_qr_dark(),
            light: default_qr_light(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            minimum_age: default_minimum_age(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl VerifierConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("read {}: {}", path.display(), e)))?;
        Self::from_toml(&contents)
    }

    /// Parse config from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self, CoreError> {
        toml::from_str(contents).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| CoreError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| CoreError::Config(format!("create {}: {}", parent.display(), e)))?;
            }
        }
        std::fs::write(path, contents)
            .map_err(|e| CoreError::Config(format!("write {}: {}", path.display(), e)))
    }
}
