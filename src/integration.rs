//! Integration module for connecting the tracker to its collaborators.
//!
//! The tracker itself performs no I/O. This module defines the seams around
//! it: a [`DetectionSource`] that supplies decoded frames with tracker output,
//! an [`Appraiser`] that names and prices snapshots, and an [`InventorySink`]
//! that stores the final result. [`InventoryPipeline`] wires them together.

mod appraiser;
mod builder;
mod encoding;
mod inventory;
mod persistence;
mod pipeline;
mod source;

pub use appraiser::{Appraisal, Appraiser, MAX_PRICE, parse_appraisal_response};
pub use builder::DetectionBuilder;
pub use encoding::{encode_jpeg, to_dynamic_image};
pub use inventory::{ClassSummary, Inventory, InventoryAssembler, InventoryItem};
pub use persistence::{DirectorySink, InventorySink, METADATA_FILE};
pub use pipeline::{InventoryPipeline, PipelineConfig};
pub use source::{DetectionSource, FrameDetections};
