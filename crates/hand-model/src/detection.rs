//! Per-frame detector output.
//!
//! The wire schema follows the common hand-pose model result shape:
//!
//! ```json
//! { "multiHandLandmarks": [[{"x":0.4,"y":0.6,"z":0.0}, ...21]],
//!   "multiHandedness": [{"label":"Right","score":0.97}] }
//! ```
//!
//! Both keys are optional. Recorded sessions are stored as JSONL, one
//! result per line; lines starting with `#` are comments.

use serde::{Deserialize, Serialize};

use crate::landmark::HandLandmarks;
use crate::ModelError;

/// Which hand the detector believes it saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandSide {
    Left,
    Right,
}

/// Classification attached to a detected hand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Handedness {
    pub label: HandSide,
    /// Detector confidence in `[0.0, 1.0]`.
    pub score: f64,
}

/// Landmarks for zero or more hands detected in one frame.
///
/// `multi_handedness[i]`, when present, describes `multi_hand_landmarks[i]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectionResult {
    pub multi_hand_landmarks: Vec<HandLandmarks>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub multi_handedness: Vec<Handedness>,
}

impl DetectionResult {
    /// A frame where no hand was found.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A frame with exactly one hand.
    pub fn single(hand: HandLandmarks) -> Self {
        Self {
            multi_hand_landmarks: vec![hand],
            multi_handedness: Vec::new(),
        }
    }

    /// Whether at least one hand is present.
    pub fn has_hand(&self) -> bool {
        !self.multi_hand_landmarks.is_empty()
    }

    pub fn hand_count(&self) -> usize {
        self.multi_hand_landmarks.len()
    }

    /// The hand that drives the zoom (the first one reported).
    pub fn primary_hand(&self) -> Option<&HandLandmarks> {
        self.multi_hand_landmarks.first()
    }

    pub fn hands(&self) -> &[HandLandmarks] {
        &self.multi_hand_landmarks
    }

    /// Keep at most `max_hands` hands.
    pub fn limit_hands(mut self, max_hands: usize) -> Self {
        self.multi_hand_landmarks.truncate(max_hands);
        self.multi_handedness.truncate(max_hands);
        self
    }

    /// Drop hands whose handedness score is below `min_confidence`.
    ///
    /// Hands without a handedness entry are kept.
    pub fn filter_by_confidence(self, min_confidence: f64) -> Self {
        let DetectionResult {
            multi_hand_landmarks,
            multi_handedness,
        } = self;

        let mut hands = Vec::with_capacity(multi_hand_landmarks.len());
        let mut handedness = Vec::with_capacity(multi_handedness.len());
        for (i, hand) in multi_hand_landmarks.into_iter().enumerate() {
            match multi_handedness.get(i) {
                Some(h) if h.score < min_confidence => continue,
                Some(h) => {
                    hands.push(hand);
                    handedness.push(*h);
                }
                None => hands.push(hand),
            }
        }

        Self {
            multi_hand_landmarks: hands,
            multi_handedness: handedness,
        }
    }
}

/// Parse a JSONL detection log.
pub fn parse_detections(jsonl: &str) -> Result<Vec<DetectionResult>, ModelError> {
    jsonl
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line, text)| {
            serde_json::from_str(text).map_err(|source| ModelError::ParseError { line, source })
        })
        .collect()
}
