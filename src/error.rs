//! Error types shared across the crate.

use thiserror::Error;

/// A crop region that collapsed to nothing after clamping to the frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CropError {
    #[error("crop region ({x1}, {y1})-({x2}, {y2}) has zero area after clamping")]
    InvalidCrop { x1: i32, y1: i32, x2: i32, y2: i32 },
}

/// Failure to obtain a `(name, price)` pair for one snapshot.
#[derive(Error, Debug)]
pub enum AppraisalError {
    #[error("malformed appraisal response: {0}")]
    Malformed(String),

    #[error("appraised price {0} is outside [0, 1000000]")]
    PriceOutOfRange(i64),

    #[error("appraisal response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] image::ImageError),

    #[error("appraisal backend failed: {0}")]
    Backend(String),
}

impl AppraisalError {
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Self::Malformed(msg.into())
    }

    pub fn backend<S: Into<String>>(msg: S) -> Self {
        Self::Backend(msg.into())
    }
}

/// Failure while handing the final inventory to a persistence backend.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("inventory rejected: {0}")]
    Rejected(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid<S: Into<String>>(field: &'static str, reason: S) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by [`crate::InventoryPipeline`].
///
/// Source errors are passed through untouched; the tracker state is still
/// consistent and drainable when one is returned.
#[derive(Error, Debug)]
pub enum PipelineError<E> {
    #[error("detection source failed: {0}")]
    Source(E),

    #[error("persistence failed: {0}")]
    Persistence(#[from] PersistenceError),
}
