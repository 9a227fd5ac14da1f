/// Coverage viewer configuration: load, save, and sanitize.
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::CoveragePalette;

/// Gutter identifier installed while coverage view is active.
pub const DEFAULT_GUTTER_ID: &str = "coverage-gutter";

/// Upper bound for the simulated coverage retrieval delay.
const MAX_LOAD_DELAY_MS: u64 = 10_000;

/// Top-level viewer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    pub palette: CoveragePalette,
    pub gutter_id: String,
    /// Delay before a coverage lookup settles, in milliseconds (0 = next tick).
    pub load_delay_ms: u64,
    pub font_size: f32,
    /// Re-enable coverage view at startup when the saved view state asks for it.
    pub restore_view: bool,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            palette: CoveragePalette::default(),
            gutter_id: DEFAULT_GUTTER_ID.to_string(),
            load_delay_ms: 0,
            font_size: 14.0,
            restore_view: true,
        }
    }
}

impl CoverageConfig {
    /// Returns the config file path: exe directory + `covgutter.json`.
    pub fn config_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|d| d.join("covgutter.json")))
            .unwrap_or_else(|| PathBuf::from("covgutter.json"))
    }

    /// Loads config from `path`, creating a default file if it doesn't exist.
    /// Returns defaults on any error (missing file, parse error, etc.).
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str::<CoverageConfig>(&contents) {
                    Ok(mut config) => {
                        config.sanitize();
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {}: {e}", path.display());
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {}: {e}", path.display());
                }
            }
            // Don't overwrite a broken file
            Self::default()
        } else {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                tracing::warn!("Failed to create default config at {}: {e}", path.display());
            }
            config
        }
    }

    /// Saves config to `path` as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_delay_ms)
    }

    /// Clamps values to valid ranges and resets invalid fields.
    pub fn sanitize(&mut self) {
        self.font_size = self.font_size.clamp(6.0, 72.0);
        self.load_delay_ms = self.load_delay_ms.min(MAX_LOAD_DELAY_MS);
        if self.gutter_id.trim().is_empty() {
            self.gutter_id = DEFAULT_GUTTER_ID.to_string();
        }
    }
}
