//! PinchZoom Processing Core
//!
//! Turns per-frame hand detections into a zoom factor:
//! - **Pinch mapping:** thumb/index fingertip distance, scaled to frame
//!   pixels and divided by a sensitivity, clamped to the zoom range
//! - **Decay:** exponential return toward the unzoomed view while no hand
//!   is visible
//!
//! This crate is pure computation: no I/O, no platform dependencies.

pub mod zoom;

pub use zoom::{estimate_zoom, ZoomEstimator, ZoomFactor, ZoomSource};
