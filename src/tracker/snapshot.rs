//! Best-crop selection for tracked objects.

use log::debug;
use ndarray::{Array3, ArrayView3, s};

use crate::error::CropError;
use crate::tracker::bbox::BBox;

/// The highest-confidence crop seen for a track.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Detection confidence of the frame the crop came from
    pub confidence: f32,
    /// Source frame index
    pub frame_index: u64,
    /// Cropped pixels, height x width x channels
    pub crop: Array3<u8>,
}

/// Decides when a detection's crop should replace a track's stored snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotSelector {
    confidence_threshold: f32,
    min_frames_seen: u32,
    margin: f32,
}

impl SnapshotSelector {
    pub fn new(confidence_threshold: f32, min_frames_seen: u32, margin: f32) -> Self {
        Self {
            confidence_threshold,
            min_frames_seen,
            margin,
        }
    }

    /// Whether a detection with `confidence` on a track seen `frames_seen`
    /// times beats `current`.
    ///
    /// Equal confidence never replaces, so the stored confidence can only grow.
    pub fn should_replace(
        &self,
        current: Option<&Snapshot>,
        confidence: f32,
        frames_seen: u32,
    ) -> bool {
        confidence >= self.confidence_threshold
            && frames_seen >= self.min_frames_seen
            && current.is_none_or(|best| confidence > best.confidence)
    }

    /// Offer a detection to `slot`; returns true if the slot was replaced.
    ///
    /// A crop that collapses to zero area is skipped and the previous snapshot,
    /// if any, is kept.
    pub fn offer(
        &self,
        slot: &mut Option<Snapshot>,
        frame: ArrayView3<'_, u8>,
        bbox: BBox,
        confidence: f32,
        frames_seen: u32,
        frame_index: u64,
    ) -> bool {
        if !self.should_replace(slot.as_ref(), confidence, frames_seen) {
            return false;
        }

        match crop_with_margin(frame, bbox, self.margin) {
            Ok(crop) => {
                *slot = Some(Snapshot {
                    confidence,
                    frame_index,
                    crop,
                });
                true
            }
            Err(err) => {
                debug!("Skipping snapshot on frame {}: {}", frame_index, err);
                false
            }
        }
    }
}

/// Crop `frame` to `bbox` grown by `margin` of its size on every side,
/// clamped to the frame bounds.
pub fn crop_with_margin(
    frame: ArrayView3<'_, u8>,
    bbox: BBox,
    margin: f32,
) -> Result<Array3<u8>, CropError> {
    let (height, width, _) = frame.dim();
    let region = bbox.expand(margin).clamp_to(width as u32, height as u32);

    if region.is_empty() {
        return Err(CropError::InvalidCrop {
            x1: region.x1,
            y1: region.y1,
            x2: region.x2,
            y2: region.y2,
        });
    }

    // clamp_to guarantees non-negative coordinates within the frame
    let (x1, y1, x2, y2) = (
        region.x1 as usize,
        region.y1 as usize,
        region.x2 as usize,
        region.y2 as usize,
    );
    Ok(frame.slice(s![y1..y2, x1..x2, ..]).to_owned())
}
