use serde::{Deserialize, Serialize};

use passgate_core::config::QrConfig;

/// QR rendering failure.
#[derive(Debug, thiserror::Error)]
#[error("QR render failed: {0}")]
pub struct RenderError(pub String);

/// How the request URL is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrOptions {
    pub width: u32,
    pub margin: u32,
    pub dark: String,
    pub light: String,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self::from(&QrConfig::default())
    }
}

impl From<&QrConfig> for QrOptions {
    fn from(config: &QrConfig) -> Self {
        Self {
            width: config.width,
            margin: config.margin,
            dark: config.dark.clone(),
            light: config.light.clone(),
        }
    }
}

/// Draws a request URL somewhere the holder can scan it.
pub trait QrRenderer: Send + Sync {
    fn render(&self, url: &str, options: &QrOptions) -> Result<(), RenderError>;
}
