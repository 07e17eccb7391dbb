//! Builder for creating Detection objects from various box formats.

use crate::tracker::{BBox, Detection};

/// Builder for creating `Detection` objects from various input formats.
///
/// Float coordinates are rounded to the nearest pixel.
#[derive(Debug, Clone, Default)]
pub struct DetectionBuilder {
    bbox: BBox,
    class_label: String,
    confidence: f32,
    track_id: u64,
}

impl DetectionBuilder {
    /// Create a new detection builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bounding box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.bbox = BBox::from_tlbr(px(x1), px(y1), px(x2), px(y2));
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.tlbr(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0)
    }

    /// Set bounding box in TLWH format (left, top, width, height).
    pub fn tlwh(self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.tlbr(x, y, x + w, y + h)
    }

    pub fn class_label(mut self, label: impl Into<String>) -> Self {
        self.class_label = label.into();
        self
    }

    /// Set the confidence score.
    pub fn confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn track_id(mut self, track_id: u64) -> Self {
        self.track_id = track_id;
        self
    }

    /// Build the final `Detection`.
    pub fn build(self) -> Detection {
        Detection::from_bbox(self.bbox, self.class_label, self.confidence, self.track_id)
    }
}

#[inline]
fn px(v: f32) -> i32 {
    v.round() as i32
}
