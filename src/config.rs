// src/config.rs

//! Configuration structures for `stepsort`.
//!
//! Every level carries `#[serde(default)]`, so a configuration file only needs
//! to mention the settings it changes. The process-wide instance is `CONFIG`,
//! loaded on first use from the file named by `STEPSORT_CONFIG` if that
//! variable is set.

use crate::controls::{ControlParams, Visibility};
use crate::sorter::Algorithm;
use anyhow::{Context, Result};
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming a JSON configuration file.
pub const CONFIG_ENV_VAR: &str = "STEPSORT_CONFIG";

/// Process-wide configuration.
pub static CONFIG: Lazy<Config> = Lazy::new(Config::load_or_default);

// --- Top-Level Configuration Structure ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Array size limits.
    pub session: SessionConfig,
    /// Initial values for the control surface.
    pub controls: ControlDefaults,
    /// Frame pacing.
    pub pacing: PacingConfig,
}

impl Config {
    /// Reads a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Loads from `$STEPSORT_CONFIG`, falling back to defaults.
    pub fn load_or_default() -> Self {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => match Config::load(Path::new(&path)) {
                Ok(config) => {
                    info!("Config: loaded {}", Path::new(&path).display());
                    config
                }
                Err(e) => {
                    warn!("Config: {:#}; using defaults", e);
                    Config::default()
                }
            },
            None => Config::default(),
        }
    }

    /// The control bundle a fresh control surface starts with.
    pub fn control_params(&self) -> ControlParams {
        let mut visibility = Visibility::QUERIES;
        visibility.set(Visibility::SWAPS, self.controls.show_swaps);
        visibility.set(Visibility::COMPARISONS, self.controls.show_comparisons);
        visibility.set(Visibility::ANIMATE_SWAPS, self.pacing.animate_swaps);
        ControlParams {
            algorithm: self.controls.algorithm,
            pivot_alpha: self.controls.pivot_alpha,
            random_pivot: self.controls.random_pivot,
            steps: self.controls.steps,
            base_interval_secs: self.pacing.base_interval_secs,
            visibility,
            shuffle_strength: self.controls.shuffle_strength,
            seed: None,
        }
    }
}

// --- Session Configuration ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Largest element count `reset` accepts.
    pub max_elements: usize,
    /// Element count of a new session.
    pub default_elements: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            max_elements: 2000,
            default_elements: 50,
        }
    }
}

// --- Control Defaults ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlDefaults {
    pub algorithm: Algorithm,
    pub pivot_alpha: f64,
    pub random_pivot: bool,
    pub steps: i64,
    pub shuffle_strength: f64,
    pub show_swaps: bool,
    pub show_comparisons: bool,
}

impl Default for ControlDefaults {
    fn default() -> Self {
        ControlDefaults {
            algorithm: Algorithm::QuickSort,
            pivot_alpha: 1.0,
            random_pivot: false,
            steps: 1,
            shuffle_strength: 0.1,
            show_swaps: true,
            show_comparisons: false,
        }
    }
}

// --- Pacing Configuration ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Seconds each frame is held before the next unit runs.
    pub base_interval_secs: f64,
    /// Stretch the delay of long-distance swaps.
    pub animate_swaps: bool,
}

impl Default for PacingConfig {
    fn default() -> Self {
        PacingConfig {
            base_interval_secs: 0.05,
            animate_swaps: false,
        }
    }
}
