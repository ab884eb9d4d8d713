//! Engine tuning knobs.
//!
//! Stored as `settings.json` in the OS config directory. Every field carries a
//! default, so a partial file is valid and a missing or broken file falls back
//! to [`EngineConfig::default`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, TimelineError};

/// Thresholds, timings and lane geometry used by the timeline engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Horizontal zoom. Must be non-zero.
    pub px_per_day: u32,
    /// Height of one bar track.
    pub track_height: f32,
    /// Vertical gap above every track.
    pub lane_gap: f32,
    /// Width of the resize hit-zone at each bar edge.
    pub edge_hit_zone: f32,
    /// Two presses on the same bar closer than this open the edit dialog.
    pub double_click_ms: u64,
    /// A bar press becomes a drag after this long without a second press.
    pub drag_start_delay_ms: u64,
    /// Lifetime of the cached content left offset. Zero reads layout every time.
    pub offset_cache_ms: u64,
    /// How many times to try mounting the preview surface before giving up.
    pub preview_mount_attempts: u32,
    pub preview_mount_interval_ms: u64,
    /// Delay between a calendar window change and centering on today.
    pub auto_center_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            px_per_day: 6,
            track_height: 28.0,
            lane_gap: 6.0,
            edge_hit_zone: 8.0,
            double_click_ms: 300,
            drag_start_delay_ms: 100,
            offset_cache_ms: 16,
            preview_mount_attempts: 10,
            preview_mount_interval_ms: 100,
            auto_center_delay_ms: 50,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.px_per_day == 0 {
            return Err(TimelineError::invalid_config("px_per_day must be greater than 0"));
        }
        if !(self.track_height > 0.0) {
            return Err(TimelineError::invalid_config("track_height must be positive"));
        }
        if !(self.lane_gap >= 0.0) {
            return Err(TimelineError::invalid_config("lane_gap must not be negative"));
        }
        if !(self.edge_hit_zone >= 0.0) {
            return Err(TimelineError::invalid_config("edge_hit_zone must not be negative"));
        }
        Ok(())
    }

    pub fn double_click_threshold(&self) -> Duration {
        Duration::from_millis(self.double_click_ms)
    }

    pub fn drag_start_delay(&self) -> Duration {
        Duration::from_millis(self.drag_start_delay_ms)
    }

    pub fn offset_cache_ttl(&self) -> Duration {
        Duration::from_millis(self.offset_cache_ms)
    }

    pub fn preview_mount_interval(&self) -> Duration {
        Duration::from_millis(self.preview_mount_interval_ms)
    }

    pub fn auto_center_delay(&self) -> Duration {
        Duration::from_millis(self.auto_center_delay_ms)
    }

    /// Parse and validate a config from a JSON file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}

/// Location of `settings.json`, if the platform has a config directory.
pub fn config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "PhaseTimeline")
        .map(|dirs| dirs.config_dir().join("settings.json"))
}

/// Load the user's config, falling back to defaults when it is absent or bad.
pub fn load() -> EngineConfig {
    let Some(path) = config_path() else {
        return EngineConfig::default();
    };
    if !path.exists() {
        return EngineConfig::default();
    }
    match EngineConfig::load_from(&path) {
        Ok(config) => config,
        Err(e) => {
            warn!("ignoring {}: {}", path.display(), e);
            EngineConfig::default()
        }
    }
}
