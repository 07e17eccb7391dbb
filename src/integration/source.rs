//! Trait for the upstream detector/tracker that feeds frames in.

use ndarray::Array3;

use crate::tracker::Detection;

/// One decoded frame together with the tracker output for it.
#[derive(Debug, Clone)]
pub struct FrameDetections {
    /// 1-based index of the frame in the source video
    pub frame_index: u64,
    /// Decoded pixels, height x width x 3 (RGB)
    pub pixels: Array3<u8>,
    /// Detections for this frame, possibly empty
    pub detections: Vec<Detection>,
}

impl FrameDetections {
    pub fn new(frame_index: u64, pixels: Array3<u8>, detections: Vec<Detection>) -> Self {
        Self {
            frame_index,
            pixels,
            detections,
        }
    }
}

/// A video decoder plus detector/tracker, yielding one frame at a time.
///
/// # Example
///
/// ```ignore
/// use shelfcount::{DetectionSource, FrameDetections};
///
/// struct MyTracker {
///     // decoder and model here
/// }
///
/// impl DetectionSource for MyTracker {
///     type Error = std::io::Error;
///
///     fn next_frame(&mut self) -> Result<Option<FrameDetections>, Self::Error> {
///         // Decode, run detection and tracking, return None at end of stream
///         Ok(None)
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for decoding or detection failures.
    type Error;

    /// Read the next frame and its detections.
    ///
    /// Returns `Ok(None)` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<FrameDetections>, Self::Error>;

    /// Total number of frames in the stream, if known.
    fn total_frames_hint(&self) -> Option<u64> {
        None
    }

    /// Minimum confidence the detector should report. Called once before the
    /// first frame is read.
    fn set_confidence_threshold(&mut self, _threshold: f32) {}
}

impl<I> DetectionSource for I
where
    I: Iterator<Item = FrameDetections>,
{
    type Error = std::convert::Infallible;

    fn next_frame(&mut self) -> Result<Option<FrameDetections>, Self::Error> {
        Ok(self.next())
    }

    fn total_frames_hint(&self) -> Option<u64> {
        self.size_hint().1.map(|n| n as u64)
    }
}
