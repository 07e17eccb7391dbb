//! One-time promotion of tracks from provisional to confirmed.

use std::collections::HashMap;

use log::debug;

use crate::tracker::track_record::TrackRecord;
use crate::tracker::track_state::{Confirmation, TrackState};

/// Emitted exactly once per confirmed track.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmedEvent {
    pub track_id: u64,
    pub class_label: String,
    pub ordinal: u32,
    pub confidence: f32,
    pub frame_index: u64,
}

/// Counts a track as a unique object once it has been seen in
/// `min_frames_to_count` frames.
///
/// Ordinals are handed out per class from a running counter. They are never
/// reused, even when an earlier track of the same class is later reaped.
#[derive(Debug, Clone)]
pub struct ConfirmationPolicy {
    min_frames_to_count: u32,
    ordinals: HashMap<String, u32>,
}

impl ConfirmationPolicy {
    pub fn new(min_frames_to_count: u32) -> Self {
        Self {
            min_frames_to_count,
            ordinals: HashMap::new(),
        }
    }

    /// Check `record` right after an observation and confirm it if due.
    pub fn evaluate(
        &mut self,
        record: &mut TrackRecord,
        confidence: f32,
        frame_index: u64,
    ) -> Option<ConfirmedEvent> {
        if record.is_confirmed() || record.frames_seen < self.min_frames_to_count {
            return None;
        }
        let class_label = record.resolved_class()?.to_owned();

        let counter = self.ordinals.entry(class_label.clone()).or_insert(0);
        *counter += 1;
        let ordinal = *counter;

        record.state = TrackState::Confirmed(Confirmation {
            class_label: class_label.clone(),
            ordinal,
            frame_index,
            confidence,
        });
        debug!(
            "Confirmed track {} as {}_{} on frame {} (conf {:.2})",
            record.track_id, class_label, ordinal, frame_index, confidence
        );

        Some(ConfirmedEvent {
            track_id: record.track_id,
            class_label,
            ordinal,
            confidence,
            frame_index,
        })
    }

    /// Number of tracks confirmed so far for `class_label`.
    pub fn confirmed_count(&self, class_label: &str) -> u32 {
        self.ordinals.get(class_label).copied().unwrap_or(0)
    }
}
