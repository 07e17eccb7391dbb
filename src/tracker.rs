mod bbox;
mod class_votes;
mod confirmation;
mod detection;
mod engine;
mod snapshot;
mod track_record;
mod track_state;
mod track_store;

pub use bbox::BBox;
pub use class_votes::ClassVotes;
pub use confirmation::{ConfirmationPolicy, ConfirmedEvent};
pub use detection::Detection;
pub use engine::{ConfirmedTrack, FrameOutcome, InventoryTracker, TrackerConfig};
pub use snapshot::{Snapshot, SnapshotSelector, crop_with_margin};
pub use track_record::TrackRecord;
pub use track_state::{Confirmation, TrackState};
pub use track_store::TrackStore;
