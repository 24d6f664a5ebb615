//! PinchZoom Render Engine
//!
//! Turns live camera frames and hand landmarks into a zoomed, mirrored
//! display, one frame per refresh.
//!
//! # Per-frame pipeline
//!
//! ```text
//! VideoSource ──► current frame ──┬──► LandmarkSource.detect (awaited)
//!                                 │              │
//!                                 │              ▼
//!                                 │        ZoomEstimator.update
//!                                 │              │
//!                                 ▼              ▼
//!                         Crop (frame / zoom) ◄──┘
//!                                 │
//!                                 ├── mirror transform
//!                                 ├── scaled image
//!                                 └── landmark overlay
//!                                          │
//!                                          ▼
//!                                   DisplaySurface ──► FrameReport
//! ```

pub mod compositor;
pub mod render_loop;
pub mod report;
pub mod surface;

pub use compositor::{compose_frame, draw_composition, FrameComposition, HandOverlay, OverlayPalette};
pub use render_loop::{FrameReport, LoopState, RenderLoop, RenderStats, TickOutcome};
pub use report::{FrameReportWriter, ReportHeader};
pub use surface::{Color, DisplaySurface, ImageSurface};
