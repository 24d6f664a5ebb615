//! Hardware-free camera and detector.
//!
//! [`SyntheticCamera`] serves a test pattern with a moving marker, and
//! [`ScriptedPinchSource`] reports a hand whose thumb and index fingertip
//! open and close on a fixed schedule, with gaps where no hand is visible.

use std::f64::consts::PI;

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

use pinchzoom_common::clock::StreamClock;
use pinchzoom_common::config::{CameraConfig, DetectorConfig};
use pinchzoom_common::error::{PinchzoomError, PinchzoomResult};
use pinchzoom_hand_model::detection::{DetectionResult, HandSide, Handedness};
use pinchzoom_hand_model::landmark::{HandLandmarks, Landmark};

use crate::camera::{CameraError, CameraProvider, ReadyState, VideoFrame, VideoSource};
use crate::detector::LandmarkSource;

const GRID_SPACING: usize = 80;
const MARKER_RADIUS: i32 = 20;
const ORBIT_STEP_RADIANS: f64 = 0.05;

/// Camera provider backed by [`SyntheticVideo`].
#[derive(Debug, Clone, Default)]
pub struct SyntheticCamera {
    failure: Option<CameraError>,
    require_interaction: bool,
    frame_limit: Option<u64>,
}

impl SyntheticCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `open` fail with `error`.
    pub fn failing(error: CameraError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Block playback until [`SyntheticVideo::grant_interaction`] is called.
    pub fn requiring_interaction(mut self) -> Self {
        self.require_interaction = true;
        self
    }

    /// End the stream after `frames` frames.
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }
}

#[async_trait(?Send)]
impl CameraProvider for SyntheticCamera {
    type Source = SyntheticVideo;

    async fn open(&mut self, constraints: &CameraConfig) -> Result<SyntheticVideo, CameraError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        if constraints.width == 0 || constraints.height == 0 {
            return Err(CameraError::Unsupported {
                message: format!(
                    "cannot produce a {}x{} stream",
                    constraints.width, constraints.height
                ),
            });
        }

        let mut video = SyntheticVideo::new(constraints.width, constraints.height);
        video.autoplay_allowed = !self.require_interaction;
        video.frame_limit = self.frame_limit;
        Ok(video)
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

/// A generated video stream. Starts with metadata loaded and paused.
#[derive(Debug)]
pub struct SyntheticVideo {
    width: u32,
    height: u32,
    background: RgbaImage,
    ready_state: ReadyState,
    paused: bool,
    ended: bool,
    autoplay_allowed: bool,
    frame_limit: Option<u64>,
    frames_served: u64,
    clock: Option<StreamClock>,
}

impl SyntheticVideo {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: test_pattern(width, height),
            ready_state: ReadyState::HaveMetadata,
            paused: true,
            ended: false,
            autoplay_allowed: true,
            frame_limit: None,
            frames_served: 0,
            clock: None,
        }
    }

    /// Record the user gesture that unblocks playback.
    pub fn grant_interaction(&mut self) {
        self.autoplay_allowed = true;
    }

    /// End the stream now.
    pub fn end(&mut self) {
        self.ended = true;
        self.paused = true;
    }

    pub fn frames_served(&self) -> u64 {
        self.frames_served
    }

    /// Clock behind frame timestamps; started by the first successful `play()`.
    pub fn clock(&self) -> Option<&StreamClock> {
        self.clock.as_ref()
    }
}

impl VideoSource for SyntheticVideo {
    fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn is_ended(&self) -> bool {
        self.ended
    }

    fn video_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn play(&mut self) -> Result<(), CameraError> {
        if self.ended {
            return Err(CameraError::Stream {
                message: "stream has ended".to_string(),
            });
        }
        if !self.autoplay_allowed {
            return Err(CameraError::AutoplayBlocked {
                message: "play() requires a user gesture".to_string(),
            });
        }
        self.paused = false;
        self.ready_state = ReadyState::HaveEnoughData;
        self.clock.get_or_insert_with(StreamClock::start);
        Ok(())
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn current_frame(&mut self) -> PinchzoomResult<VideoFrame> {
        if !self.is_playable() {
            return Err(PinchzoomError::camera("no frame available"));
        }

        let index = self.frames_served;
        let mut image = self.background.clone();
        let angle = index as f64 * ORBIT_STEP_RADIANS;
        let radius = f64::from(self.width.min(self.height)) * 0.3;
        let mx = f64::from(self.width) / 2.0 + radius * angle.cos();
        let my = f64::from(self.height) / 2.0 + radius * angle.sin();
        draw_filled_circle_mut(
            &mut image,
            (mx as i32, my as i32),
            MARKER_RADIUS / 2,
            Rgba([255, 220, 60, 255]),
        );

        self.frames_served += 1;
        if self.frame_limit.is_some_and(|limit| self.frames_served >= limit) {
            tracing::debug!(frames = self.frames_served, "Synthetic stream reached its frame limit");
            self.end();
        }

        Ok(VideoFrame {
            index,
            timestamp_ns: self.clock.as_ref().map(|c| c.elapsed_ns()).unwrap_or(0),
            image,
        })
    }
}

/// Grid with corner and center markers, so crops and mirroring are visible.
pub fn test_pattern(width: u32, height: u32) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(width, height, Rgba([40, 40, 50, 255]));
    let line_color = Rgba([80, 80, 90, 255]);
    let (w, h) = (width as f32, height as f32);

    for x in (0..width).step_by(GRID_SPACING) {
        draw_line_segment_mut(&mut img, (x as f32, 0.0), (x as f32, h), line_color);
    }
    for y in (0..height).step_by(GRID_SPACING) {
        draw_line_segment_mut(&mut img, (0.0, y as f32), (w, y as f32), line_color);
    }

    // Red marks the top-left corner so a mirrored frame is easy to spot.
    let inset = MARKER_RADIUS + 10;
    let (wi, hi) = (width as i32, height as i32);
    let corners = [
        ((inset, inset), Rgba([255, 50, 50, 255])),
        ((wi - inset, inset), Rgba([50, 50, 255, 255])),
        ((wi - inset, hi - inset), Rgba([50, 50, 255, 255])),
        ((inset, hi - inset), Rgba([50, 50, 255, 255])),
    ];
    for (center, color) in corners {
        draw_filled_circle_mut(&mut img, center, MARKER_RADIUS, color);
    }

    draw_filled_circle_mut(&mut img, (wi / 2, hi / 2), 30, Rgba([50, 255, 50, 255]));

    img
}

/// Timing and geometry of the scripted pinch.
#[derive(Debug, Clone)]
pub struct PinchScript {
    /// Frames per cycle with a visible hand (one full open/close).
    pub present_frames: u64,
    /// Frames per cycle with no hand.
    pub absent_frames: u64,
    /// Fingertip distance when closed (normalized).
    pub min_distance: f64,
    /// Fingertip distance when fully open (normalized).
    pub max_distance: f64,
    /// Midpoint between the fingertips (normalized).
    pub center: (f64, f64),
    /// Handedness score attached to each reported hand.
    pub score: f64,
}

impl Default for PinchScript {
    fn default() -> Self {
        Self {
            present_frames: 120,
            absent_frames: 45,
            min_distance: 0.04,
            max_distance: 0.5,
            center: (0.5, 0.5),
            score: 0.95,
        }
    }
}

impl PinchScript {
    /// Fingertip distance on `frame` of the cycle, or `None` in the gap.
    pub fn distance_at(&self, frame: u64) -> Option<f64> {
        let cycle = (self.present_frames + self.absent_frames).max(1);
        let phase = frame % cycle;
        if phase >= self.present_frames {
            return None;
        }
        let t = phase as f64 / self.present_frames as f64;
        let open = (1.0 - (2.0 * PI * t).cos()) / 2.0;
        Some(self.min_distance + (self.max_distance - self.min_distance) * open)
    }
}

/// Detector that follows a [`PinchScript`] and ignores pixel content.
#[derive(Debug, Clone)]
pub struct ScriptedPinchSource {
    script: PinchScript,
    config: DetectorConfig,
    calls: u64,
}

impl ScriptedPinchSource {
    pub fn new(script: PinchScript, config: DetectorConfig) -> Self {
        Self {
            script,
            config,
            calls: 0,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(PinchScript::default(), DetectorConfig::default())
    }

    /// Number of detections served.
    pub fn calls(&self) -> u64 {
        self.calls
    }
}

#[async_trait(?Send)]
impl LandmarkSource for ScriptedPinchSource {
    async fn detect(&mut self, frame: &VideoFrame) -> PinchzoomResult<DetectionResult> {
        // Inference is asynchronous in real detectors; give the executor a turn.
        tokio::task::yield_now().await;

        if frame.width() == 0 || frame.height() == 0 {
            return Err(PinchzoomError::detection(format!(
                "frame {} has no pixels",
                frame.index
            )));
        }

        let frame = self.calls;
        self.calls += 1;

        let Some(distance) = self.script.distance_at(frame) else {
            return Ok(DetectionResult::empty());
        };

        let result = DetectionResult {
            multi_hand_landmarks: vec![pinch_hand(self.script.center, distance)?],
            multi_handedness: vec![Handedness {
                label: HandSide::Right,
                score: self.script.score,
            }],
        };

        Ok(result
            .filter_by_confidence(self.config.min_detection_confidence)
            .limit_hands(self.config.max_hands))
    }

    fn name(&self) -> &str {
        "scripted-pinch"
    }
}

/// An upright right hand with thumb and index tips `distance` apart,
/// centered horizontally on `center`.
pub fn pinch_hand(center: (f64, f64), distance: f64) -> PinchzoomResult<HandLandmarks> {
    let (cx, cy) = center;
    let at = |x: f64, y: f64| Landmark::new(x.clamp(0.0, 1.0), y.clamp(0.0, 1.0));
    let chain = |mcp: Landmark, tip: Landmark| {
        [
            mcp,
            Landmark::lerp(&mcp, &tip, 1.0 / 3.0),
            Landmark::lerp(&mcp, &tip, 2.0 / 3.0),
            tip,
        ]
    };

    let wrist = at(cx, cy + 0.25);
    let thumb_tip = at(cx - distance / 2.0, cy);
    let thumb_cmc = Landmark::lerp(&wrist, &thumb_tip, 0.25);
    let thumb = chain(thumb_cmc, thumb_tip);
    let index = chain(at(cx + 0.03, cy + 0.12), at(cx + distance / 2.0, cy));
    let middle = chain(at(cx + 0.07, cy + 0.12), at(cx + 0.09, cy - 0.05));
    let ring = chain(at(cx + 0.11, cy + 0.13), at(cx + 0.14, cy - 0.02));
    let pinky = chain(at(cx + 0.14, cy + 0.15), at(cx + 0.18, cy + 0.03));

    let mut points = Vec::with_capacity(21);
    points.push(wrist);
    for finger in [thumb, index, middle, ring, pinky] {
        points.extend(finger);
    }

    HandLandmarks::from_points(points).map_err(|e| PinchzoomError::invalid_landmarks(e.to_string()))
}
