//! Per-refresh render loop.
//!
//! Each cycle grabs the current video frame, awaits landmarks for it,
//! updates the zoom and redraws the surface. Cycles are paced by a tokio
//! interval at the display refresh rate and do nothing while the video is
//! not playable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::MissedTickBehavior;

use pinchzoom_capture_engine::camera::VideoSource;
use pinchzoom_capture_engine::detector::LandmarkSource;
use pinchzoom_common::config::DisplayConfig;
use pinchzoom_common::error::{PinchzoomError, PinchzoomResult};
use pinchzoom_hand_model::viewport::CropRect;
use pinchzoom_processing_core::zoom::{ZoomEstimator, ZoomFactor, ZoomSource};

use crate::compositor::{compose_frame, draw_composition, OverlayPalette};
use crate::surface::DisplaySurface;

/// Lifecycle of a [`RenderLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    /// Waiting for a playable video (metadata, resume).
    Idle,
    /// Rendering one frame per refresh.
    Playing,
    /// Torn down; cannot be restarted.
    Terminated,
}

/// What one rendered cycle produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub frame_index: u64,
    pub timestamp_ns: u64,
    pub zoom: f64,
    pub crop: CropRect,
    pub hand_detected: bool,

    /// Fingertip distance in source pixels, when a hand drove the zoom.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinch_distance_px: Option<f64>,
}

/// Outcome of a single cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The video was not playable; nothing was drawn.
    Idle,
    Rendered(FrameReport),
}

/// Running totals over a loop's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderStats {
    pub rendered_frames: u64,
    pub idle_ticks: u64,
    pub hand_frames: u64,
    pub last_zoom: Option<f64>,
}

/// Drives a video source, a landmark source and a display surface.
pub struct RenderLoop<V, L, S> {
    video: V,
    detector: L,
    surface: S,
    estimator: ZoomEstimator,
    zoom: ZoomFactor,
    display: DisplayConfig,
    palette: OverlayPalette,
    state: LoopState,
    stats: RenderStats,
    stop_flag: Arc<AtomicBool>,
}

impl<V, L, S> RenderLoop<V, L, S>
where
    V: VideoSource,
    L: LandmarkSource,
    S: DisplaySurface,
{
    /// Build a loop. Fails if the overlay colors cannot be parsed.
    pub fn new(
        video: V,
        detector: L,
        surface: S,
        estimator: ZoomEstimator,
        display: DisplayConfig,
    ) -> PinchzoomResult<Self> {
        let palette = OverlayPalette::from_style(&display.overlay)?;
        let zoom = estimator.initial();
        Ok(Self {
            video,
            detector,
            surface,
            estimator,
            zoom,
            display,
            palette,
            state: LoopState::Idle,
            stats: RenderStats::default(),
            stop_flag: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn zoom(&self) -> ZoomFactor {
        self.zoom
    }

    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn video(&self) -> &V {
        &self.video
    }

    /// Mutable access to the video, e.g. to resume after a user gesture.
    pub fn video_mut(&mut self) -> &mut V {
        &mut self.video
    }

    pub fn detector(&self) -> &L {
        &self.detector
    }

    /// Shared flag; setting it makes [`run`](Self::run) return at the next
    /// refresh.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_flag)
    }

    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    /// Run one cycle.
    pub async fn tick(&mut self) -> PinchzoomResult<TickOutcome> {
        if self.state == LoopState::Terminated {
            return Err(PinchzoomError::render("render loop already terminated"));
        }

        if !self.video.is_playable() {
            self.transition(LoopState::Idle);
            self.stats.idle_ticks += 1;
            return Ok(TickOutcome::Idle);
        }
        self.transition(LoopState::Playing);

        let frame = self.video.current_frame()?;
        let detection = self.detector.detect(&frame).await?;

        let (video_width, video_height) = self.video.video_size();
        let source = self
            .estimator
            .update(&mut self.zoom, &detection, f64::from(video_width));

        let composition = compose_frame(
            (video_width, video_height),
            self.zoom.value(),
            &detection,
            self.surface.size(),
            &self.display,
        );
        draw_composition(&mut self.surface, &frame.image, &composition, &self.palette)?;

        let pinch_distance_px = match source {
            ZoomSource::Pinch { distance_px } => Some(distance_px),
            ZoomSource::Decay => None,
        };
        let report = FrameReport {
            frame_index: frame.index,
            timestamp_ns: frame.timestamp_ns,
            zoom: self.zoom.value(),
            crop: composition.crop,
            hand_detected: pinch_distance_px.is_some(),
            pinch_distance_px,
        };

        self.stats.rendered_frames += 1;
        if report.hand_detected {
            self.stats.hand_frames += 1;
        }
        self.stats.last_zoom = Some(report.zoom);

        tracing::trace!(
            frame = report.frame_index,
            zoom = report.zoom,
            hand = report.hand_detected,
            "Rendered frame"
        );
        Ok(TickOutcome::Rendered(report))
    }

    /// Render once per refresh until stopped or `max_frames` frames were
    /// rendered, then tear down.
    ///
    /// `on_frame` sees every report together with the freshly drawn surface.
    /// Idle cycles do not count toward the budget.
    pub async fn run<F>(&mut self, max_frames: Option<u64>, mut on_frame: F) -> PinchzoomResult<RenderStats>
    where
        F: FnMut(&FrameReport, &S) -> PinchzoomResult<()>,
    {
        if self.state == LoopState::Terminated {
            return Err(PinchzoomError::render("render loop already terminated"));
        }

        let hz = self.display.refresh_hz.max(1);
        let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / f64::from(hz)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            refresh_hz = hz,
            detector = self.detector.name(),
            max_frames = ?max_frames,
            "Render loop started"
        );

        let mut rendered = 0u64;
        let result = loop {
            if self.stop_flag.load(Ordering::SeqCst) {
                tracing::info!("Stop requested");
                break Ok(());
            }
            if max_frames.is_some_and(|max| rendered >= max) {
                break Ok(());
            }

            interval.tick().await;

            match self.tick().await {
                Ok(TickOutcome::Rendered(report)) => {
                    rendered += 1;
                    if let Err(e) = on_frame(&report, &self.surface) {
                        break Err(e);
                    }
                }
                Ok(TickOutcome::Idle) => {}
                Err(e) => break Err(e),
            }
        };

        self.transition(LoopState::Terminated);
        tracing::info!(
            rendered = self.stats.rendered_frames,
            idle = self.stats.idle_ticks,
            hand_frames = self.stats.hand_frames,
            "Render loop finished"
        );

        result.map(|()| self.stats.clone())
    }

    fn transition(&mut self, next: LoopState) {
        if self.state == next {
            return;
        }
        match next {
            LoopState::Playing => tracing::info!(from = ?self.state, "Playback active, rendering"),
            LoopState::Idle => tracing::info!(from = ?self.state, "Video not playable, idling"),
            LoopState::Terminated => tracing::info!(from = ?self.state, "Render loop terminated"),
        }
        self.state = next;
    }
}
