use std::collections::BTreeSet;

use ndarray::Array3;
use shelfcount::{
    Appraisal, AppraisalError, Detection, DetectionBuilder, InventoryAssembler, InventoryTracker,
    TrackerConfig,
};

fn frame() -> Array3<u8> {
    Array3::from_shape_fn((240, 320, 3), |(y, x, c)| ((x + y + c * 40) % 256) as u8)
}

fn det(track_id: u64, label: &str, confidence: f32) -> Detection {
    Detection::new(100, 60, 180, 160, label, confidence, track_id)
}

fn appraise(_: &[u8]) -> Result<Appraisal, AppraisalError> {
    Ok(Appraisal {
        name: "Dining chair".to_string(),
        price: 60,
    })
}

#[test]
fn test_single_track_best_snapshot() {
    let mut tracker = InventoryTracker::new(TrackerConfig::default());
    let frame = frame();

    let confidences = [0.5, 0.6, 0.7, 0.4];
    let mut confirmed_on = None;
    for (i, conf) in confidences.into_iter().enumerate() {
        let index = i as u64 + 1;
        let outcome = tracker.update(index, frame.view(), &[det(1, "chair", conf)]);
        if !outcome.confirmed.is_empty() {
            confirmed_on = Some(index);
        }
        // frame 2 clears the threshold but the track is still too young
        if index == 2 {
            assert!(tracker.store().get(1).unwrap().best_snapshot.is_none());
        }
    }

    assert_eq!(confirmed_on, Some(3));
    let snapshot = tracker.store().get(1).unwrap().best_snapshot.as_ref().unwrap();
    assert_eq!(snapshot.confidence, 0.7);
    assert_eq!(snapshot.frame_index, 3);
    // 80x100 box grows by 8px and 10px on each side
    assert_eq!(snapshot.crop.dim(), (120, 96, 3));
}

#[test]
fn test_snapshot_improves_after_confirmation() {
    let mut tracker = InventoryTracker::new(TrackerConfig::default());
    let frame = frame();

    let confidences = [0.9, 0.9, 0.6, 0.7, 0.7, 0.65, 0.8];
    let mut best = Vec::new();
    for (i, conf) in confidences.into_iter().enumerate() {
        tracker.update(i as u64 + 1, frame.view(), &[det(5, "tv", conf)]);
        if let Some(s) = &tracker.store().get(5).unwrap().best_snapshot {
            best.push((s.confidence, s.frame_index));
        }
    }

    // never replaced by an equal or lower confidence
    assert_eq!(best.first(), Some(&(0.6, 3)));
    assert!(best.windows(2).all(|w| w[1].0 >= w[0].0));
    assert_eq!(best.last(), Some(&(0.8, 7)));
    assert!(best.contains(&(0.7, 4)));
    assert!(!best.contains(&(0.7, 5)));
}

#[test]
fn test_stale_confirmed_track_is_kept_in_inventory() {
    let mut tracker = InventoryTracker::new(TrackerConfig::default());
    let frame = frame();

    for i in 1..=3 {
        tracker.update(i, frame.view(), &[det(7, "couch", 0.9)]);
    }
    let mut reaped_on = None;
    for i in 4..=10 {
        let outcome = tracker.update(i, frame.view(), &[]);
        if outcome.reaped.contains(&7) {
            reaped_on = Some(i);
        }
    }

    // six misses exceed the limit of five
    assert_eq!(reaped_on, Some(9));
    assert!(!tracker.store().contains(7));

    let inventory = InventoryAssembler::new(appraise).assemble_from(&tracker);
    let item = inventory.get("couch_1").unwrap();
    assert_eq!(item.track_id, 7);
    assert_eq!(item.snapshot_frame, 3);
}

#[test]
fn test_short_lived_track_is_never_counted() {
    let mut tracker = InventoryTracker::new(TrackerConfig::default());
    let frame = frame();

    tracker.update(1, frame.view(), &[det(3, "tv", 0.95)]);
    tracker.update(2, frame.view(), &[det(3, "tv", 0.95)]);
    for i in 3..=9 {
        tracker.update(i, frame.view(), &[]);
    }

    assert!(tracker.store().is_empty());
    assert!(tracker.confirmed_tracks().is_empty());
    let inventory = InventoryAssembler::new(appraise).assemble_from(&tracker);
    assert!(inventory.is_empty());
    assert_eq!(inventory.total_value, 0);
}

#[test]
fn test_gap_within_tolerance_keeps_counting() {
    let mut tracker = InventoryTracker::new(TrackerConfig::default());
    let frame = frame();

    tracker.update(1, frame.view(), &[det(2, "tv", 0.9)]);
    tracker.update(2, frame.view(), &[det(2, "tv", 0.9)]);
    for i in 3..=7 {
        tracker.update(i, frame.view(), &[]);
    }
    let outcome = tracker.update(8, frame.view(), &[det(2, "tv", 0.9)]);

    assert_eq!(outcome.confirmed.len(), 1);
    assert_eq!(outcome.confirmed[0].frame_index, 8);
}

#[test]
fn test_class_tie_resolves_to_first_label() {
    let mut tracker = InventoryTracker::new(TrackerConfig {
        min_frames_to_count: 4,
        ..TrackerConfig::default()
    });
    let frame = frame();

    let labels = ["chair", "table", "table", "chair"];
    let mut events = Vec::new();
    for (i, label) in labels.into_iter().enumerate() {
        let outcome = tracker.update(i as u64 + 1, frame.view(), &[det(1, label, 0.8)]);
        events.extend(outcome.confirmed);
    }

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].class_label, "chair");
}

#[test]
fn test_confirmation_not_revised_by_later_votes() {
    let mut tracker = InventoryTracker::new(TrackerConfig::default());
    let frame = frame();

    for i in 1..=3 {
        tracker.update(i, frame.view(), &[det(1, "chair", 0.8)]);
    }
    for i in 4..=10 {
        let outcome = tracker.update(i, frame.view(), &[det(1, "bench", 0.8)]);
        assert!(outcome.confirmed.is_empty());
    }

    let record = tracker.store().get(1).unwrap();
    assert_eq!(record.resolved_class(), Some("bench"));
    let confirmation = record.confirmation().unwrap();
    assert_eq!(confirmation.class_label, "chair");
    assert_eq!(confirmation.ordinal, 1);

    let inventory = InventoryAssembler::new(appraise).assemble_from(&tracker);
    let keys: Vec<_> = inventory.items.keys().cloned().collect();
    assert_eq!(keys, vec!["chair_1".to_string()]);
}

#[test]
fn test_excluded_class_never_tracked() {
    let mut tracker = InventoryTracker::new(TrackerConfig::default());
    let frame = frame();

    for i in 1..=10 {
        let outcome = tracker.update(i, frame.view(), &[det(11, "person", 0.99)]);
        assert!(outcome.confirmed.is_empty());
    }

    assert!(tracker.store().is_empty());
    let inventory = InventoryAssembler::new(appraise).assemble_from(&tracker);
    assert!(inventory.is_empty());
}

#[test]
fn test_drain_is_idempotent() {
    let mut tracker = InventoryTracker::new(TrackerConfig::default());
    let frame = frame();

    for i in 1..=6 {
        let dets = vec![det(1, "chair", 0.8), det(2, "chair", 0.7), det(3, "tv", 0.9)];
        tracker.update(i, frame.view(), &dets);
    }

    let mut assembler = InventoryAssembler::new(appraise);
    let first = assembler.assemble_from(&tracker);
    let second = assembler.assemble_from(&tracker);

    assert_eq!(first, second);
    assert_eq!(first.item_count, 3);
    assert_eq!(first.total_value, 180);
}

#[test]
fn test_reused_id_after_reap_is_counted_again() {
    let mut tracker = InventoryTracker::new(TrackerConfig::default());
    let frame = frame();

    for i in 1..=3 {
        tracker.update(i, frame.view(), &[det(4, "lamp", 0.9)]);
    }
    for i in 4..=9 {
        tracker.update(i, frame.view(), &[]);
    }
    for i in 10..=12 {
        tracker.update(i, frame.view(), &[det(4, "lamp", 0.9)]);
    }

    let tracks = tracker.confirmed_tracks();
    assert_eq!(tracks.len(), 2);
    let ordinals: BTreeSet<u32> = tracks.iter().map(|t| t.confirmation.ordinal).collect();
    assert_eq!(ordinals, BTreeSet::from([1, 2]));

    let inventory = InventoryAssembler::new(appraise).assemble_from(&tracker);
    assert_eq!(inventory.get("lamp_1").unwrap().confirmed_frame, 3);
    assert_eq!(inventory.get("lamp_2").unwrap().confirmed_frame, 12);
}

#[test]
fn test_extreme_boxes_do_not_disturb_other_tracks() {
    let mut tracker = InventoryTracker::new(TrackerConfig::default());
    let frame = frame();

    let unbounded = DetectionBuilder::new()
        .tlbr(f32::NEG_INFINITY, 10.0, f32::INFINITY, 40.0)
        .class_label("rug")
        .confidence(0.8)
        .track_id(3)
        .build();
    for i in 1..=3 {
        let dets = vec![
            Detection::new(-1_500_000_000, 0, 1_500_000_000, 5, "tv", 0.9, 1),
            det(2, "chair", 0.9),
            unbounded.clone(),
        ];
        tracker.update(i, frame.view(), &dets);
    }

    assert_eq!(tracker.confirmed_tracks().len(), 3);
    let wide = tracker.store().get(1).unwrap().best_snapshot.as_ref().unwrap();
    assert_eq!(wide.crop.dim(), (5, 320, 3));
    let rug = tracker.store().get(3).unwrap().best_snapshot.as_ref().unwrap();
    assert_eq!(rug.crop.dim(), (36, 320, 3));
    let chair = tracker.store().get(2).unwrap().best_snapshot.as_ref().unwrap();
    assert_eq!(chair.crop.dim(), (120, 96, 3));
}
