//! Engine configuration
//!
//! Explicit, validated configuration structs; loadable from JSON.

use crate::error::{LabelError, Result};
use crate::scoring::ScoringConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Deduplication settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupConfig {
    /// Detections overlapping a kept one beyond this IoU are suppressed.
    pub iou_threshold: f64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            iou_threshold: 0.45,
        }
    }
}

impl DedupConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(LabelError::Config(format!(
                "iou_threshold must be in [0, 1], got {}",
                self.iou_threshold
            )));
        }
        Ok(())
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub dedup: DedupConfig,
    /// Minimum reported confidence accepted from full-image collaborators.
    #[serde(default = "default_reported_conf_threshold")]
    pub reported_conf_threshold: f64,
}

fn default_reported_conf_threshold() -> f64 {
    0.5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            dedup: DedupConfig::default(),
            reported_conf_threshold: default_reported_conf_threshold(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.scoring.validate()?;
        self.dedup.validate()?;
        if !(0.0..=1.0).contains(&self.reported_conf_threshold) {
            return Err(LabelError::Config(format!(
                "reported_conf_threshold must be in [0, 1], got {}",
                self.reported_conf_threshold
            )));
        }
        Ok(())
    }
}
