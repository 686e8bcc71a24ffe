//! Per-image labeling pipeline
//!
//! Wires the scorer and the deduplicator together: every proposed region
//! of an image is scored, then the surviving detections are collapsed by
//! non-maximum suppression. Region proposal itself and the vision models
//! producing the signals are external collaborators.

use crate::config::EngineConfig;
use crate::dedup::deduplicate;
use crate::detection::{BoundingBox, Detection, ImageResult, ReportedDetection, SignalScores};
use crate::error::Result;
use crate::resolver::ServiceNameResolver;
use crate::scoring::CandidateScorer;
use crate::taxonomy::TaxonomyIndex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// One proposed region with its collaborator signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionProposal {
    pub bbox: BoundingBox,
    /// Raw candidate label from the retrieval collaborator (icon metadata
    /// service name, OCR text, etc).
    pub label: String,
    #[serde(flatten)]
    pub signals: SignalScores,
}

/// All proposed regions of one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageProposals {
    pub image_path: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub regions: Vec<RegionProposal>,
    /// Detections reported wholesale by a full-image collaborator,
    /// bypassing per-region scoring.
    #[serde(default)]
    pub reported: Vec<ReportedDetection>,
}

/// The labeling engine: taxonomy-backed scoring plus deduplication.
pub struct LabelEngine {
    scorer: CandidateScorer,
    config: EngineConfig,
}

impl LabelEngine {
    pub fn new(taxonomy: Arc<TaxonomyIndex>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let scorer = CandidateScorer::new(
            ServiceNameResolver::new(taxonomy),
            config.scoring.clone(),
        )?;
        Ok(Self { scorer, config })
    }

    pub fn scorer(&self) -> &CandidateScorer {
        &self.scorer
    }

    /// Score a set of proposed regions and deduplicate the survivors.
    ///
    /// The complete candidate set must be passed in one call; suppression
    /// needs to see every overlapping detection at once.
    pub fn label_regions(&self, regions: &[RegionProposal]) -> Vec<Detection> {
        let scored: Vec<Detection> = regions
            .iter()
            .filter_map(|r| self.scorer.score(r.bbox, &r.signals, &r.label))
            .collect();
        deduplicate(&scored, self.config.dedup.iou_threshold)
    }

    /// Label one image: scored regions plus collaborator-reported
    /// detections, deduplicated together.
    pub fn label_image(&self, image: &ImageProposals) -> ImageResult {
        let mut scored: Vec<Detection> = image
            .regions
            .iter()
            .filter_map(|r| self.scorer.score(r.bbox, &r.signals, &r.label))
            .collect();
        scored.extend(image.reported.iter().filter_map(|r| {
            self.scorer.accept_reported(
                r,
                image.width,
                image.height,
                self.config.reported_conf_threshold,
            )
        }));

        let detections = deduplicate(&scored, self.config.dedup.iou_threshold);
        info!(
            "{}: {} regions -> {} detections",
            image.image_path,
            image.regions.len() + image.reported.len(),
            detections.len()
        );

        ImageResult {
            image_path: image.image_path.clone(),
            width: image.width,
            height: image.height,
            detections,
        }
    }
}
