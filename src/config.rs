//! Tunable constants for layout, easing and gesture handling.
//!
//! Every field has a default, so a config file only needs to name the values
//! it overrides.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A width breakpoint: viewports narrower than `max_width` default to `visible_keys`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub max_width: f64,
    pub visible_keys: f64,
}

/// Layout limits and proportions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub min_visible_keys: f64,
    pub max_visible_keys: f64,
    /// Sorted by `max_width`, first match wins
    pub breakpoints: Vec<Breakpoint>,
    /// Visible keys for widths beyond the last breakpoint
    pub fallback_visible_keys: f64,
    /// Keyboard strip height as a fraction of the container height
    pub keyboard_height_ratio: f64,
    pub min_keyboard_height: f64,
    /// Upper bound on the strip as a fraction of the container height
    pub max_keyboard_fraction: f64,
    /// Overscroll margin as a fraction of the viewport width
    pub overscroll_fraction: f64,
    /// Accidental key width relative to a natural key
    pub accidental_width_ratio: f64,
    /// Accidental key height relative to the strip
    pub accidental_height_ratio: f64,
    /// Accidental note block width relative to a natural lane
    pub accidental_block_ratio: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_visible_keys: 5.0,
            max_visible_keys: 52.0,
            breakpoints: vec![
                Breakpoint { max_width: 700.0, visible_keys: 8.0 },
                Breakpoint { max_width: 1200.0, visible_keys: 12.0 },
                Breakpoint { max_width: 1600.0, visible_keys: 16.0 },
            ],
            fallback_visible_keys: 16.0,
            keyboard_height_ratio: 0.2,
            min_keyboard_height: 24.0,
            max_keyboard_fraction: 0.5,
            overscroll_fraction: 0.1,
            accidental_width_ratio: 0.6,
            accidental_height_ratio: 0.62,
            accidental_block_ratio: 0.8,
        }
    }
}

impl LayoutConfig {
    /// Default visible key count for a container width
    pub fn breakpoint_keys(&self, width: f64) -> f64 {
        self.breakpoints
            .iter()
            .find(|bp| width < bp.max_width)
            .map(|bp| bp.visible_keys)
            .unwrap_or(self.fallback_visible_keys)
    }
}

/// Easing curve for the pan animator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatorConfig {
    pub exponent: f64,
    pub divisor: f64,
    /// Remaining distance at or below which the animator snaps to its target
    pub snap_distance: f64,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            exponent: 1.5,
            divisor: 600.0,
            snap_distance: 1.0,
        }
    }
}

/// Thresholds for pointer gestures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Midpoint drift (px) before a pinch also pans
    pub pinch_dead_zone: f64,
    /// Input silence (ms) after which a wheel burst counts as finished
    pub wheel_settle_ms: f64,
    /// Visible keys added per pixel of vertical wheel delta
    pub wheel_zoom_rate: f64,
    /// Finger distance (px) below which a pinch is ignored
    pub min_pinch_distance: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pinch_dead_zone: 5.0,
            wheel_settle_ms: 30.0,
            wheel_zoom_rate: 0.01,
            min_pinch_distance: 10.0,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub animator: AnimatorConfig,
    pub gesture: GestureConfig,
}

impl Config {
    /// Load a config file, falling back to defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the layout cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let layout = &self.layout;
        if !(layout.min_visible_keys > 0.0
            && layout.min_visible_keys <= layout.max_visible_keys
            && layout.max_visible_keys.is_finite())
        {
            return Err(ConfigError::Invalid(format!(
                "visible key window [{}, {}] is empty",
                layout.min_visible_keys, layout.max_visible_keys
            )));
        }
        if !(layout.overscroll_fraction >= 0.0 && layout.overscroll_fraction.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "overscroll_fraction {} must be non-negative",
                layout.overscroll_fraction
            )));
        }
        if !(layout.min_keyboard_height >= 0.0 && layout.min_keyboard_height.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "min_keyboard_height {} must be non-negative",
                layout.min_keyboard_height
            )));
        }
        if !(layout.max_keyboard_fraction > 0.0 && layout.max_keyboard_fraction <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "max_keyboard_fraction {} must be in (0, 1]",
                layout.max_keyboard_fraction
            )));
        }
        if self.animator.divisor <= 0.0 {
            return Err(ConfigError::Invalid("animator divisor must be positive".into()));
        }
        Ok(())
    }
}

/// Default config path (~/.config/keyroll/config.json)
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("keyroll")
        .join("config.json")
}
