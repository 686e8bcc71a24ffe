//! Detection data model

use serde::{Deserialize, Serialize};

/// Axis-aligned box in pixel coordinates, `width`/`height` > 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Clamp collaborator-reported coordinates into image bounds.
    ///
    /// Negative or oversized values are pulled inside `[0, image_dim]`;
    /// width and height are floored at 1 so the box never degenerates.
    pub fn clamped(
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        image_width: u32,
        image_height: u32,
    ) -> Self {
        let x = x.clamp(0, i64::from(image_width)) as u32;
        let y = y.clamp(0, i64::from(image_height)) as u32;
        let width = width.clamp(1, i64::from(image_width.saturating_sub(x)).max(1)) as u32;
        let height = height.clamp(1, i64::from(image_height.saturating_sub(y)).max(1)) as u32;
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A located, labeled candidate that survived scoring.
///
/// `label` is the resolved canonical service name, or empty if resolution
/// was rejected. `confidence` is always in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub label: String,
    pub confidence: f64,
}

/// Per-region signal scores from the vision collaborators, each in
/// `[0, 1]`. A collaborator that was skipped contributes 0.0 so the
/// configured weights keep their meaning.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SignalScores {
    #[serde(default)]
    pub embedding_similarity: f64,
    #[serde(default)]
    pub keypoint_match_ratio: f64,
    #[serde(default)]
    pub ocr_bonus: f64,
}

/// A raw detection reported by a full-image collaborator (e.g. a vision
/// LLM), before taxonomy normalization and bounds clamping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportedDetection {
    pub name: String,
    /// `[x, y, width, height]`, possibly out of image bounds.
    pub bbox: [i64; 4],
    pub confidence: f64,
}

/// Final per-image output: the deduplicated detection set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageResult {
    pub image_path: String,
    pub width: u32,
    pub height: u32,
    pub detections: Vec<Detection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_into_image_bounds() {
        let b = BoundingBox::clamped(-10, 5, 2000, 50, 640, 480);
        assert_eq!(b, BoundingBox::new(0, 5, 640, 50));

        let b = BoundingBox::clamped(600, 470, 100, 100, 640, 480);
        assert_eq!(b, BoundingBox::new(600, 470, 40, 10));
    }

    #[test]
    fn clamped_box_never_degenerates() {
        let b = BoundingBox::clamped(640, 480, 0, -5, 640, 480);
        assert!(b.width >= 1 && b.height >= 1);
    }
}
