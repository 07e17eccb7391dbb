//! Per-frame detection input for the tracker.

use crate::tracker::bbox::BBox;

/// One detection as reported by the upstream detector/tracker for a single frame.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Detection {
    /// Bounding box in frame pixel coordinates
    pub bbox: BBox,
    /// Class label assigned by the detector for this frame
    pub class_label: String,
    /// Detection confidence score in [0, 1]
    pub confidence: f32,
    /// Tracker-assigned id; may break or be reused across gaps
    pub track_id: u64,
}

impl Detection {
    pub fn new(
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        class_label: impl Into<String>,
        confidence: f32,
        track_id: u64,
    ) -> Self {
        Self {
            bbox: BBox::from_tlbr(x1, y1, x2, y2),
            class_label: class_label.into(),
            confidence,
            track_id,
        }
    }

    pub fn from_bbox(
        bbox: BBox,
        class_label: impl Into<String>,
        confidence: f32,
        track_id: u64,
    ) -> Self {
        Self {
            bbox,
            class_label: class_label.into(),
            confidence,
            track_id,
        }
    }
}
