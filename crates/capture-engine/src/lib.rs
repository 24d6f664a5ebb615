//! PinchZoom Capture Engine
//!
//! Contracts for the two collaborators that feed the render loop, plus
//! in-tree implementations that run without hardware:
//!
//! ```text
//! ┌──────────────────┐  open + play   ┌──────────────┐
//! │  CameraProvider  │ ─────────────▶ │ VideoSource  │──── VideoFrame ───┐
//! └──────────────────┘                └──────────────┘                   │
//!                                                                        ▼
//!                                     ┌────────────────┐  detect   ┌────────────┐
//!                                     │ LandmarkSource │ ◀──────── │ RenderLoop │
//!                                     └────────────────┘ ────────▶ └────────────┘
//!                                                    DetectionResult
//! ```
//!
//! - [`synthetic`]: test-pattern camera and a scripted pinch detector
//! - [`replay`]: detector that replays a recorded JSONL session

pub mod camera;
pub mod detector;
pub mod replay;
pub mod synthetic;

pub use camera::*;
pub use detector::*;
