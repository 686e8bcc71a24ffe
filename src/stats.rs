//! Run statistics
//!
//! Aggregate counts over a labeling run, for quick dataset QA.

use crate::detection::ImageResult;
use itertools::Itertools;
use serde::Serialize;
use std::collections::BTreeMap;

/// Detection counts bucketed by confidence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfidenceBands {
    /// `confidence >= 0.8`
    pub high: usize,
    /// `0.5 <= confidence < 0.8`
    pub medium: usize,
    /// `confidence < 0.5`
    pub low: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    pub total_images: usize,
    pub total_detections: usize,
    /// Mean detections per image; 0 when there are no images.
    pub detection_rate: f64,
    /// Detections per resolved label, sorted by label.
    pub label_counts: BTreeMap<String, usize>,
    pub confidence: ConfidenceBands,
}

/// Summarize a labeling run.
pub fn summarize(results: &[ImageResult]) -> RunStats {
    let total_images = results.len();
    let detections = || results.iter().flat_map(|r| &r.detections);
    let total_detections = detections().count();

    let label_counts: BTreeMap<String, usize> = detections()
        .counts_by(|d| d.label.clone())
        .into_iter()
        .collect();

    let mut confidence = ConfidenceBands::default();
    for d in detections() {
        if d.confidence >= 0.8 {
            confidence.high += 1;
        } else if d.confidence >= 0.5 {
            confidence.medium += 1;
        } else {
            confidence.low += 1;
        }
    }

    RunStats {
        total_images,
        total_detections,
        detection_rate: if total_images > 0 {
            total_detections as f64 / total_images as f64
        } else {
            0.0
        },
        label_counts,
        confidence,
    }
}
