//! Hand-landmark source contract.

use async_trait::async_trait;

use pinchzoom_common::error::PinchzoomResult;
use pinchzoom_hand_model::detection::DetectionResult;

use crate::camera::VideoFrame;

/// Produces hand landmarks for a frame.
///
/// `detect` takes `&mut self`, so a caller cannot start a second detection
/// until the previous future has resolved. The result always belongs to the
/// frame that was passed in.
///
/// Implementations honor their [`DetectorConfig`](pinchzoom_common::config::DetectorConfig):
/// at most `max_hands` hands, none scored below `min_detection_confidence`.
#[async_trait(?Send)]
pub trait LandmarkSource {
    async fn detect(&mut self, frame: &VideoFrame) -> PinchzoomResult<DetectionResult>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

#[async_trait(?Send)]
impl<T: LandmarkSource + ?Sized> LandmarkSource for Box<T> {
    async fn detect(&mut self, frame: &VideoFrame) -> PinchzoomResult<DetectionResult> {
        (**self).detect(frame).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
