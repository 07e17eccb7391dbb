//! Accumulated state for a single tracker id.

use std::collections::VecDeque;

use crate::tracker::bbox::BBox;
use crate::tracker::class_votes::ClassVotes;
use crate::tracker::snapshot::Snapshot;
use crate::tracker::track_state::{Confirmation, TrackState};

/// Everything the engine knows about one tracker id.
///
/// Records are owned by the [`TrackStore`](crate::TrackStore); the snapshot
/// crop lives inside the record and is replaced wholesale when a better one
/// turns up.
#[derive(Debug, Clone)]
pub struct TrackRecord {
    /// Tracker-assigned id
    pub track_id: u64,
    /// Provisional or confirmed
    pub state: TrackState,
    /// Number of frames in which this id was observed
    pub frames_seen: u32,
    /// Frames since the id was last observed
    pub consecutive_misses: u32,
    /// Frame on which the id was first observed
    pub first_seen_frame: u64,
    /// Frame on which the id was most recently observed
    pub last_seen_frame: u64,
    /// Highest detection confidence over all observations
    pub peak_confidence: f32,
    /// Best crop seen so far, if any
    pub best_snapshot: Option<Snapshot>,
    class_votes: ClassVotes,
    recent_boxes: VecDeque<BBox>,
    recent_boxes_capacity: usize,
}

impl TrackRecord {
    /// Create an empty record; counters start at zero until the first observation.
    pub fn new(track_id: u64, first_seen_frame: u64, recent_boxes_capacity: usize) -> Self {
        Self {
            track_id,
            state: TrackState::Provisional,
            frames_seen: 0,
            consecutive_misses: 0,
            first_seen_frame,
            last_seen_frame: first_seen_frame,
            peak_confidence: 0.0,
            best_snapshot: None,
            class_votes: ClassVotes::new(),
            recent_boxes: VecDeque::with_capacity(recent_boxes_capacity),
            recent_boxes_capacity,
        }
    }

    /// Fold one observation into the record.
    pub fn observe(&mut self, class_label: &str, confidence: f32, bbox: BBox, frame_index: u64) {
        self.frames_seen += 1;
        self.consecutive_misses = 0;
        self.last_seen_frame = frame_index;
        self.peak_confidence = self.peak_confidence.max(confidence);
        self.class_votes.record(class_label);

        self.recent_boxes.push_back(bbox);
        while self.recent_boxes.len() > self.recent_boxes_capacity {
            self.recent_boxes.pop_front();
        }
    }

    pub fn mark_missed(&mut self) {
        self.consecutive_misses += 1;
    }

    /// Majority class over every observation so far.
    pub fn resolved_class(&self) -> Option<&str> {
        self.class_votes.resolve()
    }

    pub fn class_votes(&self) -> &ClassVotes {
        &self.class_votes
    }

    /// The last few boxes, oldest first.
    pub fn recent_boxes(&self) -> impl ExactSizeIterator<Item = &BBox> {
        self.recent_boxes.iter()
    }

    pub fn is_confirmed(&self) -> bool {
        self.state.is_confirmed()
    }

    pub fn confirmation(&self) -> Option<&Confirmation> {
        self.state.confirmation()
    }
}
