//! Track stabilization and snapshot selection for video inventories.
//!
//! Raw per-frame detections carry a tracker id that flickers, breaks and
//! changes class label. The [`InventoryTracker`] folds those detections into
//! per-id records, confirms each id once it has been seen often enough, keeps
//! the best crop it has seen of every confirmed id, and forgets ids that have
//! been gone for too long. At the end of the stream the
//! [`InventoryAssembler`] turns what was confirmed into an appraised
//! inventory.

pub mod error;
pub mod integration;
pub mod tracker;

pub use error::{AppraisalError, ConfigError, CropError, PersistenceError, PipelineError};
pub use integration::{
    Appraisal, Appraiser, ClassSummary, DetectionBuilder, DetectionSource, DirectorySink,
    FrameDetections, Inventory, InventoryAssembler, InventoryItem, InventoryPipeline,
    InventorySink, PipelineConfig, parse_appraisal_response,
};
pub use tracker::{
    BBox, ClassVotes, Confirmation, ConfirmationPolicy, ConfirmedEvent, ConfirmedTrack, Detection,
    FrameOutcome, InventoryTracker, Snapshot, SnapshotSelector, TrackRecord, TrackState,
    TrackStore, TrackerConfig,
};
