//! In-memory table of live track records.

use std::collections::{BTreeMap, BTreeSet};

use log::trace;

use crate::tracker::bbox::BBox;
use crate::tracker::track_record::TrackRecord;

/// Live track records keyed by tracker id.
///
/// A record exists from the first observation of its id until it is evicted
/// for staying unseen longer than `max_consecutive_misses` frames.
#[derive(Debug, Clone)]
pub struct TrackStore {
    records: BTreeMap<u64, TrackRecord>,
    max_consecutive_misses: u32,
    recent_boxes_capacity: usize,
}

impl TrackStore {
    pub fn new(max_consecutive_misses: u32, recent_boxes_capacity: usize) -> Self {
        Self {
            records: BTreeMap::new(),
            max_consecutive_misses,
            recent_boxes_capacity,
        }
    }

    /// Record an observation of `track_id`, creating its record if needed.
    pub fn observe(
        &mut self,
        track_id: u64,
        class_label: &str,
        confidence: f32,
        bbox: BBox,
        frame_index: u64,
    ) -> &mut TrackRecord {
        let capacity = self.recent_boxes_capacity;
        let record = self
            .records
            .entry(track_id)
            .or_insert_with(|| TrackRecord::new(track_id, frame_index, capacity));
        record.observe(class_label, confidence, bbox, frame_index);
        trace!(
            "Track {} seen as {} (conf {:.2}, frames_seen {})",
            track_id, class_label, confidence, record.frames_seen
        );
        record
    }

    /// Count a frame in which `track_id` was not observed. Unknown ids are ignored.
    pub fn tick_absent(&mut self, track_id: u64) {
        if let Some(record) = self.records.get_mut(&track_id) {
            record.mark_missed();
        }
    }

    /// Tick every live id that is not in `seen`.
    pub fn tick_absent_except(&mut self, seen: &BTreeSet<u64>) {
        for (id, record) in self.records.iter_mut() {
            if !seen.contains(id) {
                record.mark_missed();
            }
        }
    }

    /// Remove every record that has been missing too long and return their ids.
    pub fn evict_stale(&mut self) -> BTreeSet<u64> {
        self.take_stale().into_iter().map(|r| r.track_id).collect()
    }

    /// Remove and return the stale records themselves, in id order.
    pub fn take_stale(&mut self) -> Vec<TrackRecord> {
        let max_misses = self.max_consecutive_misses;
        let stale: Vec<u64> = self
            .records
            .values()
            .filter(|r| r.consecutive_misses > max_misses)
            .map(|r| r.track_id)
            .collect();

        stale
            .into_iter()
            .filter_map(|id| self.records.remove(&id))
            .collect()
    }

    pub fn get(&self, track_id: u64) -> Option<&TrackRecord> {
        self.records.get(&track_id)
    }

    pub fn contains(&self, track_id: u64) -> bool {
        self.records.contains_key(&track_id)
    }

    /// Records in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &TrackRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
