//! Plugin settings, stored as JSON next to the rest of the game settings.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ngx_upscaler_core::{AppIdentity, QualityTier};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpscalerSettings {
    /// App id NVIDIA issued for this title. 0 if unused.
    pub app_id: u32,
    /// Project id for project-scoped init. Empty if unused.
    pub project_id: String,
    /// Delay SDK initialization until the upscaler is first used.
    pub lazy_init: bool,
    /// Quality the plugin starts with.
    pub quality: QualityTier,
    pub sharpness: f32,
}

impl Default for UpscalerSettings {
    fn default() -> Self {
        Self {
            app_id: 0,
            project_id: String::new(),
            lazy_init: true,
            quality: QualityTier::Balanced,
            sharpness: 0.0,
        }
    }
}

impl UpscalerSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid upscaler settings")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write settings to {}", path.display()))
    }

    /// Identity handed to the SDK; the engine version is this crate's.
    pub fn identity(&self) -> AppIdentity {
        AppIdentity {
            app_id: u64::from(self.app_id),
            project_id: self.project_id.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            ..AppIdentity::default()
        }
    }
}
