//! Detector that replays a recorded detection log.

use std::path::Path;

use async_trait::async_trait;

use pinchzoom_common::config::DetectorConfig;
use pinchzoom_common::error::{PinchzoomError, PinchzoomResult};
use pinchzoom_hand_model::detection::{parse_detections, DetectionResult};

use crate::camera::VideoFrame;
use crate::detector::LandmarkSource;

/// Serves one recorded [`DetectionResult`] per call, in order.
///
/// Once the log is exhausted it reports no hand, or starts over when
/// looping is enabled.
#[derive(Debug, Clone)]
pub struct ReplayLandmarkSource {
    detections: Vec<DetectionResult>,
    position: usize,
    looping: bool,
    config: DetectorConfig,
}

impl ReplayLandmarkSource {
    /// Build from JSONL text.
    pub fn from_jsonl(jsonl: &str, config: DetectorConfig) -> PinchzoomResult<Self> {
        let detections = parse_detections(jsonl)
            .map_err(|e| PinchzoomError::invalid_landmarks(e.to_string()))?;
        Ok(Self {
            detections,
            position: 0,
            looping: false,
            config,
        })
    }

    /// Load a JSONL detection log from disk.
    pub fn open(path: &Path, config: DetectorConfig) -> PinchzoomResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let source = Self::from_jsonl(&content, config)?;
        tracing::info!(
            path = %path.display(),
            detections = source.len(),
            "Loaded detection log"
        );
        Ok(source)
    }

    /// Start over from the first entry after the last one.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Entries left before the log is exhausted (ignores looping).
    pub fn remaining(&self) -> usize {
        self.detections.len().saturating_sub(self.position)
    }
}

#[async_trait(?Send)]
impl LandmarkSource for ReplayLandmarkSource {
    async fn detect(&mut self, _frame: &VideoFrame) -> PinchzoomResult<DetectionResult> {
        if self.position >= self.detections.len() {
            if !self.looping || self.detections.is_empty() {
                return Ok(DetectionResult::empty());
            }
            tracing::debug!("Detection log exhausted, looping");
            self.position = 0;
        }

        let detection = self.detections[self.position].clone();
        self.position += 1;

        Ok(detection
            .filter_by_confidence(self.config.min_detection_confidence)
            .limit_hands(self.config.max_hands))
    }

    fn name(&self) -> &str {
        "replay"
    }
}
