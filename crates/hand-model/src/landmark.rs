//! Hand landmark types.
//!
//! A detected hand is a fixed set of 21 keypoints, indexed by
//! [`HandLandmark`]. Points are normalized: `(0.0, 0.0)` is the top-left
//! and `(1.0, 1.0)` the bottom-right of the source frame.

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Number of keypoints in a single hand.
pub const HAND_LANDMARK_COUNT: usize = 21;

/// A single normalized keypoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Horizontal position (normalized).
    pub x: f64,
    /// Vertical position (normalized).
    pub y: f64,
    /// Depth relative to the wrist; smaller is closer to the camera.
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Euclidean distance to another point in the image plane.
    ///
    /// Depth is ignored.
    pub fn distance_to(&self, other: &Landmark) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Linear interpolation between two points.
    pub fn lerp(a: &Landmark, b: &Landmark, t: f64) -> Landmark {
        let t = t.clamp(0.0, 1.0);
        Landmark {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
            z: a.z + (b.z - a.z) * t,
        }
    }
}

/// Named keypoint indices of a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum HandLandmark {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexFingerMcp = 5,
    IndexFingerPip = 6,
    IndexFingerDip = 7,
    IndexFingerTip = 8,
    MiddleFingerMcp = 9,
    MiddleFingerPip = 10,
    MiddleFingerDip = 11,
    MiddleFingerTip = 12,
    RingFingerMcp = 13,
    RingFingerPip = 14,
    RingFingerDip = 15,
    RingFingerTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

impl HandLandmark {
    /// Position of this keypoint in a landmark list.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Skeleton edges between keypoints, used for the overlay.
pub const HAND_CONNECTIONS: [(HandLandmark, HandLandmark); 21] = {
    use HandLandmark::*;
    [
        (Wrist, ThumbCmc),
        (ThumbCmc, ThumbMcp),
        (ThumbMcp, ThumbIp),
        (ThumbIp, ThumbTip),
        (Wrist, IndexFingerMcp),
        (IndexFingerMcp, IndexFingerPip),
        (IndexFingerPip, IndexFingerDip),
        (IndexFingerDip, IndexFingerTip),
        (IndexFingerMcp, MiddleFingerMcp),
        (MiddleFingerMcp, MiddleFingerPip),
        (MiddleFingerPip, MiddleFingerDip),
        (MiddleFingerDip, MiddleFingerTip),
        (MiddleFingerMcp, RingFingerMcp),
        (RingFingerMcp, RingFingerPip),
        (RingFingerPip, RingFingerDip),
        (RingFingerDip, RingFingerTip),
        (RingFingerMcp, PinkyMcp),
        (Wrist, PinkyMcp),
        (PinkyMcp, PinkyPip),
        (PinkyPip, PinkyDip),
        (PinkyDip, PinkyTip),
    ]
};

/// The 21 keypoints of one detected hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct HandLandmarks {
    points: Vec<Landmark>,
}

impl HandLandmarks {
    /// Build a hand from exactly [`HAND_LANDMARK_COUNT`] points.
    pub fn from_points(points: Vec<Landmark>) -> Result<Self, ModelError> {
        if points.len() != HAND_LANDMARK_COUNT {
            return Err(ModelError::LandmarkCount {
                expected: HAND_LANDMARK_COUNT,
                actual: points.len(),
            });
        }
        Ok(Self { points })
    }

    pub fn get(&self, landmark: HandLandmark) -> &Landmark {
        &self.points[landmark.index()]
    }

    pub fn points(&self) -> &[Landmark] {
        &self.points
    }

    /// Normalized distance between the thumb tip and the index fingertip.
    pub fn pinch_distance(&self) -> f64 {
        self.get(HandLandmark::ThumbTip)
            .distance_to(self.get(HandLandmark::IndexFingerTip))
    }

    /// Iterate over skeleton edges as point pairs.
    pub fn connections(&self) -> impl Iterator<Item = (&Landmark, &Landmark)> + '_ {
        HAND_CONNECTIONS
            .iter()
            .map(move |(a, b)| (self.get(*a), self.get(*b)))
    }
}

impl TryFrom<Vec<Landmark>> for HandLandmarks {
    type Error = ModelError;

    fn try_from(points: Vec<Landmark>) -> Result<Self, Self::Error> {
        Self::from_points(points)
    }
}

impl From<HandLandmarks> for Vec<Landmark> {
    fn from(hand: HandLandmarks) -> Self {
        hand.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_hand() -> Vec<Landmark> {
        (0..HAND_LANDMARK_COUNT)
            .map(|i| Landmark::new(0.3 + i as f64 * 0.01, 0.5))
            .collect()
    }

    #[test]
    fn test_landmark_distance() {
        let a = Landmark::new(0.3, 0.5);
        let b = Landmark::new(0.35, 0.5);
        assert!((a.distance_to(&b) - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_distance_ignores_depth() {
        let a = Landmark { x: 0.0, y: 0.0, z: -0.5 };
        let b = Landmark { x: 0.0, y: 0.1, z: 0.5 };
        assert!((a.distance_to(&b) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_hand_requires_21_points() {
        let mut points = flat_hand();
        points.pop();
        let err = HandLandmarks::from_points(points).unwrap_err();
        assert!(matches!(
            err,
            ModelError::LandmarkCount {
                expected: 21,
                actual: 20
            }
        ));
    }

    #[test]
    fn test_pinch_distance_uses_thumb_and_index_tips() {
        let mut points = flat_hand();
        points[HandLandmark::ThumbTip.index()] = Landmark::new(0.3, 0.5);
        points[HandLandmark::IndexFingerTip.index()] = Landmark::new(0.3, 0.7);
        let hand = HandLandmarks::from_points(points).unwrap();
        assert!((hand.pinch_distance() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_connections_cover_every_landmark() {
        let mut seen = [false; HAND_LANDMARK_COUNT];
        for (a, b) in HAND_CONNECTIONS {
            seen[a.index()] = true;
            seen[b.index()] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_deserialize_rejects_short_hand() {
        let json = r#"[{"x":0.1,"y":0.2,"z":0.0}]"#;
        assert!(serde_json::from_str::<HandLandmarks>(json).is_err());
    }

    #[test]
    fn test_missing_depth_defaults_to_zero() {
        let point: Landmark = serde_json::from_str(r#"{"x":0.1,"y":0.2}"#).unwrap();
        assert_eq!(point.z, 0.0);
    }
}
