//! Frame-by-frame inventory tracking.

use std::collections::BTreeSet;

use log::debug;
use ndarray::ArrayView3;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::tracker::confirmation::{ConfirmationPolicy, ConfirmedEvent};
use crate::tracker::detection::Detection;
use crate::tracker::snapshot::{Snapshot, SnapshotSelector};
use crate::tracker::track_record::TrackRecord;
use crate::tracker::track_state::Confirmation;
use crate::tracker::track_store::TrackStore;

/// Configuration for the [`InventoryTracker`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Observations needed before a track counts as a unique object
    pub min_frames_to_count: u32,
    /// Absent frames tolerated before a track is forgotten
    pub max_consecutive_misses: u32,
    /// Detector-level confidence cutoff, forwarded to the detection source
    pub confidence_threshold: f32,
    /// Minimum confidence for a crop to become a snapshot
    pub snapshot_confidence_threshold: f32,
    /// Labels that are never tracked
    pub excluded_classes: BTreeSet<String>,
    /// How many recent boxes each track keeps
    pub recent_boxes_capacity: usize,
    /// Margin added around a box when cropping, as a fraction of its size
    pub snapshot_margin: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            min_frames_to_count: 3,
            max_consecutive_misses: 5,
            confidence_threshold: 0.55,
            snapshot_confidence_threshold: 0.55,
            excluded_classes: BTreeSet::from(["person".to_owned()]),
            recent_boxes_capacity: 10,
            snapshot_margin: 0.1,
        }
    }
}

impl TrackerConfig {
    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_frames_to_count == 0 {
            return Err(ConfigError::invalid("min_frames_to_count", "must be at least 1"));
        }
        for (field, value) in [
            ("confidence_threshold", self.confidence_threshold),
            ("snapshot_confidence_threshold", self.snapshot_confidence_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::invalid(field, format!("{value} is outside [0, 1]")));
            }
        }
        if self.recent_boxes_capacity == 0 {
            return Err(ConfigError::invalid("recent_boxes_capacity", "must be at least 1"));
        }
        if self.snapshot_margin.is_nan() || self.snapshot_margin < 0.0 {
            return Err(ConfigError::invalid(
                "snapshot_margin",
                format!("{} is negative", self.snapshot_margin),
            ));
        }
        Ok(())
    }

    pub fn is_excluded(&self, class_label: &str) -> bool {
        self.excluded_classes.contains(class_label)
    }
}

/// What happened to the track table on one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutcome {
    /// Tracks confirmed on this frame
    pub confirmed: Vec<ConfirmedEvent>,
    /// Ids whose snapshot was replaced on this frame
    pub snapshots_updated: Vec<u64>,
    /// Ids reaped at the end of this frame
    pub reaped: BTreeSet<u64>,
}

/// A confirmed track as seen by the inventory assembler.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmedTrack<'a> {
    pub record: &'a TrackRecord,
    pub confirmation: &'a Confirmation,
    /// Whether the record has already been reaped from the live table
    pub reaped: bool,
}

impl<'a> ConfirmedTrack<'a> {
    pub fn track_id(&self) -> u64 {
        self.record.track_id
    }

    pub fn snapshot(&self) -> Option<&'a Snapshot> {
        self.record.best_snapshot.as_ref()
    }
}

/// Turns noisy per-frame detections into confirmed, deduplicated tracks with
/// a best snapshot each.
///
/// Confirmed records that go stale are moved into an archive rather than
/// dropped, so [`InventoryTracker::confirmed_tracks`] reports every object
/// confirmed during the stream, not only those still in view at the end.
pub struct InventoryTracker {
    config: TrackerConfig,
    store: TrackStore,
    policy: ConfirmationPolicy,
    selector: SnapshotSelector,
    archive: Vec<TrackRecord>,
    frames_processed: u64,
}

impl InventoryTracker {
    pub fn new(config: TrackerConfig) -> Self {
        let store = TrackStore::new(config.max_consecutive_misses, config.recent_boxes_capacity);
        let policy = ConfirmationPolicy::new(config.min_frames_to_count);
        let selector = SnapshotSelector::new(
            config.snapshot_confidence_threshold,
            config.min_frames_to_count,
            config.snapshot_margin,
        );
        Self {
            config,
            store,
            policy,
            selector,
            archive: Vec::new(),
            frames_processed: 0,
        }
    }

    /// Process all detections of one frame.
    ///
    /// `frame` is the decoded image (height x width x channels) the detections
    /// refer to; it is only read when a snapshot is taken.
    pub fn update(
        &mut self,
        frame_index: u64,
        frame: ArrayView3<'_, u8>,
        detections: &[Detection],
    ) -> FrameOutcome {
        self.frames_processed += 1;
        let mut outcome = FrameOutcome::default();
        let mut seen = BTreeSet::new();

        // Step 1: fold detections into their records
        for det in detections {
            if self.config.is_excluded(&det.class_label) {
                continue;
            }
            if !seen.insert(det.track_id) {
                debug!(
                    "Ignoring repeated detection of track {} on frame {}",
                    det.track_id, frame_index
                );
                continue;
            }

            let record = self.store.observe(
                det.track_id,
                &det.class_label,
                det.confidence,
                det.bbox,
                frame_index,
            );

            // Step 2: confirmation
            if let Some(event) = self.policy.evaluate(record, det.confidence, frame_index) {
                outcome.confirmed.push(event);
            }

            // Step 3: snapshot selection, on every observation
            let frames_seen = record.frames_seen;
            if self.selector.offer(
                &mut record.best_snapshot,
                frame,
                det.bbox,
                det.confidence,
                frames_seen,
                frame_index,
            ) {
                debug!(
                    "New best snapshot for track {} on frame {} (conf {:.2})",
                    det.track_id, frame_index, det.confidence
                );
                outcome.snapshots_updated.push(det.track_id);
            }
        }

        // Step 4: misses, then reaping
        self.store.tick_absent_except(&seen);
        outcome.reaped = self.reap();

        outcome
    }

    fn reap(&mut self) -> BTreeSet<u64> {
        let mut reaped = BTreeSet::new();
        for record in self.store.take_stale() {
            reaped.insert(record.track_id);
            if record.is_confirmed() {
                debug!("Archiving stale confirmed track {}", record.track_id);
                self.archive.push(record);
            } else {
                debug!(
                    "Reaped unconfirmed track {} after {} frames seen{}",
                    record.track_id,
                    record.frames_seen,
                    if record.best_snapshot.is_some() {
                        ", discarding its snapshot"
                    } else {
                        ""
                    }
                );
            }
        }
        reaped
    }

    /// Every confirmed track so far, reaped or live, ordered by track id and
    /// then by confirmation frame.
    pub fn confirmed_tracks(&self) -> Vec<ConfirmedTrack<'_>> {
        let archived = self.archive.iter().map(|r| (r, true));
        let live = self.store.iter().map(|r| (r, false));

        let mut tracks: Vec<ConfirmedTrack<'_>> = archived
            .chain(live)
            .filter_map(|(record, reaped)| {
                record.confirmation().map(|confirmation| ConfirmedTrack {
                    record,
                    confirmation,
                    reaped,
                })
            })
            .collect();
        tracks.sort_by_key(|t| (t.record.track_id, t.confirmation.frame_index));
        tracks
    }

    /// Live (not yet reaped) tracks.
    pub fn store(&self) -> &TrackStore {
        &self.store
    }

    /// Confirmed tracks that have been reaped from the live table.
    pub fn archived(&self) -> &[TrackRecord] {
        &self.archive
    }

    pub fn policy(&self) -> &ConfirmationPolicy {
        &self.policy
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }
}
