//! Detection deduplication
//!
//! Greedy non-maximum suppression: overlapping detections collapse to the
//! highest-confidence member of each cluster.

use crate::detection::{BoundingBox, Detection};

/// Guards the IoU denominator against zero-area degenerate pairs.
const IOU_EPSILON: f64 = 1e-6;

/// Intersection-over-union of two boxes with inclusive edges.
///
/// Box edges count as covered pixels, so a `(x, y, w, h)` box has area
/// `(w + 1) * (h + 1)`; this keeps single-pixel boxes from degenerating
/// to zero area.
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let (ax1, ay1) = (f64::from(a.x), f64::from(a.y));
    let (ax2, ay2) = (f64::from(a.x + a.width), f64::from(a.y + a.height));
    let (bx1, by1) = (f64::from(b.x), f64::from(b.y));
    let (bx2, by2) = (f64::from(b.x + b.width), f64::from(b.y + b.height));

    let inter_w = (ax2.min(bx2) - ax1.max(bx1) + 1.0).max(0.0);
    let inter_h = (ay2.min(by2) - ay1.max(by1) + 1.0).max(0.0);
    let inter = inter_w * inter_h;

    let area_a = (ax2 - ax1 + 1.0) * (ay2 - ay1 + 1.0);
    let area_b = (bx2 - bx1 + 1.0) * (by2 - by1 + 1.0);

    inter / (area_a + area_b - inter + IOU_EPSILON)
}

/// Collapse overlapping detections, keeping the highest-confidence member
/// of every overlapping cluster.
///
/// Greedy: detections are visited by descending confidence; each kept
/// detection suppresses every remaining one whose IoU with it exceeds
/// `iou_threshold`. Survivors come back sorted by confidence descending,
/// ties broken by original insertion order.
pub fn deduplicate(detections: &[Detection], iou_threshold: f64) -> Vec<Detection> {
    if detections.is_empty() {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..detections.len()).collect();
    order.sort_by(|&a, &b| {
        detections[b]
            .confidence
            .partial_cmp(&detections[a].confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut suppressed = vec![false; detections.len()];
    let mut kept = Vec::new();

    for (pos, &i) in order.iter().enumerate() {
        if suppressed[i] {
            continue;
        }
        kept.push(detections[i].clone());
        for &j in &order[pos + 1..] {
            if !suppressed[j] && iou(&detections[i].bbox, &detections[j].bbox) > iou_threshold {
                suppressed[j] = true;
            }
        }
    }

    // `order` is a stable descending sort, so `kept` is already in the
    // required output order.
    kept
}
