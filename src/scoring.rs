//! Candidate scoring
//!
//! Blends per-region visual signals with taxonomy-resolution confidence
//! into a final scored `Detection`, or rejects the region outright.

use crate::detection::{BoundingBox, Detection, ReportedDetection, SignalScores};
use crate::error::{LabelError, Result};
use crate::resolver::ServiceNameResolver;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Share of the final confidence carried by the visual signals; the rest
/// comes from taxonomy-resolution confidence.
const VISUAL_BLEND_WEIGHT: f64 = 0.7;
const TAXONOMY_BLEND_WEIGHT: f64 = 0.3;

/// Per-signal weights and the acceptance threshold.
///
/// Weights are expected to sum to 1.0 by convention; that is warned
/// about, not enforced, since callers may deliberately under-weight a
/// disabled collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub embedding_weight: f64,
    pub keypoint_weight: f64,
    pub ocr_weight: f64,
    /// Regions whose weighted signal sum falls below this are dropped
    /// before resolution.
    pub accept_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            embedding_weight: 0.6,
            keypoint_weight: 0.3,
            ocr_weight: 0.1,
            accept_threshold: 0.5,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, w) in [
            ("embedding_weight", self.embedding_weight),
            ("keypoint_weight", self.keypoint_weight),
            ("ocr_weight", self.ocr_weight),
        ] {
            if !(0.0..=1.0).contains(&w) {
                return Err(LabelError::Config(format!(
                    "{} must be in [0, 1], got {}",
                    name, w
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.accept_threshold) {
            return Err(LabelError::Config(format!(
                "accept_threshold must be in [0, 1], got {}",
                self.accept_threshold
            )));
        }
        let sum = self.embedding_weight + self.keypoint_weight + self.ocr_weight;
        if (sum - 1.0).abs() > 1e-6 {
            warn!("Signal weights sum to {} rather than 1.0", sum);
        }
        Ok(())
    }
}

/// Scores proposed regions against the taxonomy.
pub struct CandidateScorer {
    resolver: ServiceNameResolver,
    config: ScoringConfig,
}

impl CandidateScorer {
    pub fn new(resolver: ServiceNameResolver, config: ScoringConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { resolver, config })
    }

    pub fn resolver(&self) -> &ServiceNameResolver {
        &self.resolver
    }

    /// Score one proposed region.
    ///
    /// Returns `None` when the weighted signal sum falls below the accept
    /// threshold; that is an expected, frequent outcome, not an error.
    /// Otherwise the raw candidate label is resolved and the final confidence is
    /// `raw_score * 0.7 + taxonomy_confidence * 0.3`, rounded to four
    /// decimal places.
    pub fn score(
        &self,
        bbox: BoundingBox,
        signals: &SignalScores,
        raw_label: &str,
    ) -> Option<Detection> {
        let raw_score = self.config.embedding_weight * signals.embedding_similarity
            + self.config.keypoint_weight * signals.keypoint_match_ratio
            + self.config.ocr_weight * signals.ocr_bonus;

        if raw_score < self.config.accept_threshold {
            return None;
        }

        let (label, taxonomy_confidence) = self.resolver.resolve(raw_label);
        let confidence =
            round4(raw_score * VISUAL_BLEND_WEIGHT + taxonomy_confidence * TAXONOMY_BLEND_WEIGHT);

        Some(Detection {
            bbox,
            label,
            confidence,
        })
    }

    /// Accept a detection reported wholesale by a full-image collaborator.
    ///
    /// The reported bbox is clamped into image bounds, the label resolved,
    /// and the final confidence is the lesser of the reported confidence
    /// and the taxonomy score. Sub-threshold reports are dropped.
    pub fn accept_reported(
        &self,
        reported: &ReportedDetection,
        image_width: u32,
        image_height: u32,
        conf_threshold: f64,
    ) -> Option<Detection> {
        if reported.confidence < conf_threshold {
            return None;
        }

        let (label, taxonomy_score) = self.resolver.resolve(reported.name.trim());
        let [x, y, w, h] = reported.bbox;
        let bbox = BoundingBox::clamped(x, y, w, h, image_width, image_height);
        let confidence = round4(reported.confidence.min(taxonomy_score));

        Some(Detection {
            bbox,
            label,
            confidence,
        })
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
