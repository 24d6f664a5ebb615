//! PinchZoom Hand Model
//!
//! Defines the data contracts shared by the pipeline:
//! - **Landmarks:** Normalized hand keypoints and the 21-point hand skeleton
//! - **Detections:** Per-frame detector output in the hand-pose wire schema
//! - **Viewport:** Centered crop rectangles derived from a zoom factor
//!
//! Landmark coordinates are normalized to `[0.0, 1.0]` relative to the
//! frame they were detected in.

pub mod detection;
pub mod landmark;
pub mod viewport;

pub use detection::*;
pub use landmark::*;
pub use viewport::*;

/// Errors raised while building model values from untrusted input.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("expected {expected} hand landmarks, got {actual}")]
    LandmarkCount { expected: usize, actual: usize },

    #[error("Parse error on line {line}: {source}")]
    ParseError {
        line: usize,
        source: serde_json::Error,
    },
}
