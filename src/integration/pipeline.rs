//! InventoryPipeline for combining a detection source with the tracker and appraisal.

use log::info;
use serde::Deserialize;

use crate::error::{ConfigError, PipelineError};
use crate::integration::appraiser::Appraiser;
use crate::integration::inventory::{Inventory, InventoryAssembler};
use crate::integration::persistence::InventorySink;
use crate::integration::source::{DetectionSource, FrameDetections};
use crate::tracker::{FrameOutcome, InventoryTracker, TrackerConfig};

/// Configuration for [`InventoryPipeline`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub tracker: TrackerConfig,
    /// Process every n-th frame read from the source
    pub frame_stride: u32,
    /// Log progress every n processed frames; 0 disables it
    pub progress_interval: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            frame_stride: 1,
            progress_interval: 10,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_stride == 0 {
            return Err(ConfigError::invalid("frame_stride", "must be at least 1"));
        }
        self.tracker.validate()
    }
}

/// Runs a detection source through the tracker and assembles the inventory
/// once the source is exhausted.
///
/// Everything happens on the caller's thread, one frame at a time. If the
/// source fails mid-stream the tracker is left consistent and
/// [`InventoryPipeline::drain`] still reports what was confirmed so far.
pub struct InventoryPipeline<D: DetectionSource, A: Appraiser> {
    source: D,
    tracker: InventoryTracker,
    assembler: InventoryAssembler<A>,
    frame_stride: u32,
    progress_interval: u64,
    frames_read: u64,
}

impl<D: DetectionSource, A: Appraiser> InventoryPipeline<D, A> {
    /// Create a new pipeline with the given source, appraiser and config.
    pub fn new(mut source: D, appraiser: A, config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        source.set_confidence_threshold(config.tracker.confidence_threshold);
        Ok(Self {
            source,
            tracker: InventoryTracker::new(config.tracker),
            assembler: InventoryAssembler::new(appraiser),
            frame_stride: config.frame_stride,
            progress_interval: config.progress_interval,
            frames_read: 0,
        })
    }

    /// Create a new pipeline with default configuration.
    pub fn with_default_config(mut source: D, appraiser: A) -> Self {
        let config = TrackerConfig::default();
        source.set_confidence_threshold(config.confidence_threshold);
        Self {
            source,
            tracker: InventoryTracker::new(config),
            assembler: InventoryAssembler::new(appraiser),
            frame_stride: 1,
            progress_interval: 10,
            frames_read: 0,
        }
    }

    /// Feed one frame to the tracker directly, bypassing the source and stride.
    pub fn process_frame(&mut self, frame: &FrameDetections) -> FrameOutcome {
        self.tracker
            .update(frame.frame_index, frame.pixels.view(), &frame.detections)
    }

    /// Consume the source to its end, then assemble the inventory.
    pub fn run(&mut self) -> Result<Inventory, PipelineError<D::Error>> {
        self.run_with_progress(|_, _| {})
    }

    /// Like [`run`](Self::run), calling `progress(frame_index, total_frames)`
    /// after every processed frame.
    pub fn run_with_progress<F>(
        &mut self,
        mut progress: F,
    ) -> Result<Inventory, PipelineError<D::Error>>
    where
        F: FnMut(u64, Option<u64>),
    {
        let total_frames = self.source.total_frames_hint();

        while let Some(frame) = self.source.next_frame().map_err(PipelineError::Source)? {
            self.frames_read += 1;
            if (self.frames_read - 1) % u64::from(self.frame_stride) != 0 {
                continue;
            }

            self.process_frame(&frame);
            progress(frame.frame_index, total_frames);

            let processed = self.tracker.frames_processed();
            if self.progress_interval > 0 && processed % self.progress_interval == 0 {
                match total_frames {
                    Some(total) if total > 0 => info!(
                        "Processing: {:.1}% (frame {}/{})",
                        frame.frame_index as f64 / total as f64 * 100.0,
                        frame.frame_index,
                        total
                    ),
                    _ => info!("Processing: frame {}", frame.frame_index),
                }
            }
        }

        info!(
            "Source exhausted after {} frames ({} processed)",
            self.frames_read,
            self.tracker.frames_processed()
        );
        let inventory = self.drain();
        inventory.log_summary();
        Ok(inventory)
    }

    /// Run to the end of the source and hand the inventory to `sink`.
    pub fn run_into<S: InventorySink>(
        &mut self,
        sink: &mut S,
    ) -> Result<Inventory, PipelineError<D::Error>> {
        let inventory = self.run()?;
        sink.persist(&inventory)?;
        Ok(inventory)
    }

    /// Assemble the inventory from what has been confirmed so far.
    ///
    /// Does not modify the tracker; calling it twice gives the same result
    /// as long as the appraiser is deterministic.
    pub fn drain(&mut self) -> Inventory {
        self.assembler.assemble_from(&self.tracker)
    }

    /// Get a reference to the underlying source.
    pub fn source(&self) -> &D {
        &self.source
    }

    /// Get a mutable reference to the underlying source.
    pub fn source_mut(&mut self) -> &mut D {
        &mut self.source
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &InventoryTracker {
        &self.tracker
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }
}
