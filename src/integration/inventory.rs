//! Final inventory assembly at end of stream.

use std::collections::{BTreeMap, HashMap};

use log::{info, warn};
use ndarray::Array3;
use serde::Serialize;

use crate::error::AppraisalError;
use crate::integration::appraiser::{Appraisal, Appraiser};
use crate::integration::encoding::encode_jpeg;
use crate::tracker::{ConfirmedTrack, InventoryTracker};

/// One unique item in the final inventory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryItem {
    /// Class locked in when the track was confirmed
    #[serde(rename = "class")]
    pub class_label: String,
    pub track_id: u64,
    /// Highest detection confidence over the track's lifetime
    #[serde(rename = "confidence")]
    pub peak_confidence: f32,
    pub first_seen_frame: u64,
    pub confirmed_frame: u64,
    /// Confidence of the snapshot that was appraised
    #[serde(rename = "best_confidence")]
    pub snapshot_confidence: f32,
    pub snapshot_frame: u64,
    pub estimated_name: String,
    /// `None` when the appraisal failed
    pub estimated_price: Option<u32>,
    /// Snapshot pixels, height x width x channels
    #[serde(skip)]
    pub snapshot: Array3<u8>,
}

/// Per-class totals for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSummary {
    pub class_label: String,
    pub item_count: usize,
    /// Items with a known price
    pub priced_count: usize,
    pub total_value: u64,
    pub average_price: Option<f64>,
}

/// Items keyed by `"{class}_{ordinal}"` plus aggregate totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Inventory {
    pub items: BTreeMap<String, InventoryItem>,
    /// Sum of all known prices
    pub total_value: u64,
    pub item_count: usize,
}

impl Inventory {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&InventoryItem> {
        self.items.get(key)
    }

    /// Totals per class, ordered by class label.
    pub fn summary(&self) -> Vec<ClassSummary> {
        let mut by_class: BTreeMap<&str, ClassSummary> = BTreeMap::new();
        for item in self.items.values() {
            let entry = by_class
                .entry(item.class_label.as_str())
                .or_insert_with(|| ClassSummary {
                    class_label: item.class_label.clone(),
                    item_count: 0,
                    priced_count: 0,
                    total_value: 0,
                    average_price: None,
                });
            entry.item_count += 1;
            if let Some(price) = item.estimated_price {
                entry.priced_count += 1;
                entry.total_value += u64::from(price);
            }
        }

        by_class
            .into_values()
            .map(|mut s| {
                s.average_price =
                    (s.priced_count > 0).then(|| s.total_value as f64 / s.priced_count as f64);
                s
            })
            .collect()
    }

    /// Write the inventory to the log, one line per item.
    pub fn log_summary(&self) {
        for class in self.summary() {
            info!("{}: {} items", class.class_label, class.item_count);
            for item in self.items.values().filter(|i| i.class_label == class.class_label) {
                match item.estimated_price {
                    Some(price) => info!("  - {}: ${}", item.estimated_name, price),
                    None => info!("  - {}: price not available", item.estimated_name),
                }
            }
        }
        info!("Total unique items: {}", self.item_count);
        info!("Total estimated value: ${}", self.total_value);
    }
}

/// Joins confirmed tracks with their snapshots and appraisals.
pub struct InventoryAssembler<A: Appraiser> {
    appraiser: A,
}

impl<A: Appraiser> InventoryAssembler<A> {
    pub fn new(appraiser: A) -> Self {
        Self { appraiser }
    }

    /// Build the inventory from everything `tracker` has confirmed so far.
    ///
    /// The tracker is only read, so this can run at any point of the stream.
    pub fn assemble_from(&mut self, tracker: &InventoryTracker) -> Inventory {
        self.assemble(&tracker.confirmed_tracks())
    }

    /// Build the inventory from confirmed tracks ordered by track id.
    ///
    /// Keys number the tracks of each class by that order, counting tracks
    /// that have no snapshot; those tracks are then left out, so a key
    /// sequence may have gaps. A failed appraisal falls back to the class
    /// label with no price and does not affect other items.
    pub fn assemble(&mut self, tracks: &[ConfirmedTrack<'_>]) -> Inventory {
        let mut inventory = Inventory::default();
        let mut ranks: HashMap<&str, u32> = HashMap::new();

        for track in tracks {
            let class_label = track.confirmation.class_label.as_str();
            let rank = ranks.entry(class_label).or_insert(0);
            *rank += 1;
            let key = format!("{}_{}", class_label, rank);

            let Some(snapshot) = track.snapshot() else {
                continue;
            };

            let (estimated_name, estimated_price) = match self.appraise(&snapshot.crop) {
                Ok(Appraisal { name, price }) => (name, Some(price)),
                Err(err) => {
                    warn!(
                        "Error estimating price for {} (ID: {}): {}",
                        class_label,
                        track.track_id(),
                        err
                    );
                    (class_label.to_owned(), None)
                }
            };

            if let Some(price) = estimated_price {
                inventory.total_value += u64::from(price);
            }
            inventory.items.insert(
                key,
                InventoryItem {
                    class_label: class_label.to_owned(),
                    track_id: track.track_id(),
                    peak_confidence: track.record.peak_confidence,
                    first_seen_frame: track.record.first_seen_frame,
                    confirmed_frame: track.confirmation.frame_index,
                    snapshot_confidence: snapshot.confidence,
                    snapshot_frame: snapshot.frame_index,
                    estimated_name,
                    estimated_price,
                    snapshot: snapshot.crop.clone(),
                },
            );
        }

        inventory.item_count = inventory.items.len();
        inventory
    }

    fn appraise(&mut self, crop: &Array3<u8>) -> Result<Appraisal, AppraisalError> {
        let jpeg = encode_jpeg(crop)?;
        self.appraiser.appraise(&jpeg)
    }

    pub fn appraiser(&self) -> &A {
        &self.appraiser
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{Detection, TrackerConfig};

    struct FixedAppraiser {
        calls: usize,
    }

    impl Appraiser for FixedAppraiser {
        fn appraise(&mut self, jpeg: &[u8]) -> Result<Appraisal, AppraisalError> {
            self.calls += 1;
            assert!(!jpeg.is_empty());
            Ok(Appraisal {
                name: "Wooden chair".to_string(),
                price: 80,
            })
        }
    }

    fn tracker_with(tracks: &[(u64, &str, f32)], frames: u64) -> InventoryTracker {
        let mut tracker = InventoryTracker::new(TrackerConfig::default());
        let frame = Array3::from_elem((100, 100, 3), 90u8);
        for i in 1..=frames {
            let dets: Vec<Detection> = tracks
                .iter()
                .map(|&(id, label, conf)| Detection::new(10, 10, 40, 40, label, conf, id))
                .collect();
            tracker.update(i, frame.view(), &dets);
        }
        tracker
    }

    #[test]
    fn test_keys_rank_by_track_id_within_class() {
        let tracker = tracker_with(&[(9, "chair", 0.9), (2, "chair", 0.9), (5, "tv", 0.9)], 3);
        let mut assembler = InventoryAssembler::new(FixedAppraiser { calls: 0 });
        let inventory = assembler.assemble_from(&tracker);

        assert_eq!(inventory.item_count, 3);
        assert_eq!(inventory.get("chair_1").unwrap().track_id, 2);
        assert_eq!(inventory.get("chair_2").unwrap().track_id, 9);
        assert_eq!(inventory.get("tv_1").unwrap().track_id, 5);
        assert_eq!(inventory.total_value, 240);
        assert_eq!(assembler.appraiser().calls, 3);
    }

    #[test]
    fn test_track_without_snapshot_is_skipped() {
        // 0.5 confirms the track but never clears the snapshot threshold
        let tracker = tracker_with(&[(1, "lamp", 0.5)], 4);
        assert_eq!(tracker.confirmed_tracks().len(), 1);

        let mut assembler = InventoryAssembler::new(FixedAppraiser { calls: 0 });
        let inventory = assembler.assemble_from(&tracker);
        assert!(inventory.is_empty());
        assert_eq!(inventory.total_value, 0);
        assert_eq!(assembler.appraiser().calls, 0);
    }

    #[test]
    fn test_failed_appraisal_falls_back_to_class() {
        let tracker = tracker_with(&[(1, "tv", 0.9), (2, "couch", 0.9)], 3);
        let mut assembler = InventoryAssembler::new(|_: &[u8]| {
            Err::<Appraisal, _>(AppraisalError::backend("quota exceeded"))
        });
        let inventory = assembler.assemble_from(&tracker);

        assert_eq!(inventory.item_count, 2);
        let tv = inventory.get("tv_1").unwrap();
        assert_eq!(tv.estimated_name, "tv");
        assert_eq!(tv.estimated_price, None);
        assert_eq!(inventory.total_value, 0);
    }

    #[test]
    fn test_summary_averages_known_prices() {
        let tracker = tracker_with(&[(1, "chair", 0.9), (2, "chair", 0.9)], 3);
        let mut prices = vec![Ok(100), Err(())].into_iter();
        let mut assembler = InventoryAssembler::new(move |_: &[u8]| match prices.next() {
            Some(Ok(price)) => Ok(Appraisal {
                name: "Chair".to_string(),
                price,
            }),
            _ => Err(AppraisalError::malformed("no answer")),
        });
        let inventory = assembler.assemble_from(&tracker);

        let summary = inventory.summary();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].item_count, 2);
        assert_eq!(summary[0].priced_count, 1);
        assert_eq!(summary[0].average_price, Some(100.0));
        assert_eq!(inventory.total_value, 100);
    }

    #[test]
    fn test_serialized_item_omits_pixels() {
        let tracker = tracker_with(&[(4, "tv", 0.9)], 3);
        let mut assembler = InventoryAssembler::new(FixedAppraiser { calls: 0 });
        let inventory = assembler.assemble_from(&tracker);

        let json = serde_json::to_value(&inventory).unwrap();
        let item = &json["items"]["tv_1"];
        assert_eq!(item["class"], "tv");
        assert_eq!(item["track_id"], 4);
        assert_eq!(item["estimated_price"], 80);
        assert!(item.get("snapshot").is_none());
        assert_eq!(json["item_count"], 1);
    }
}
