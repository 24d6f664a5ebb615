//! Run the pinch-to-zoom render loop.

use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

use tokio::io::AsyncBufReadExt;

use pinchzoom_capture_engine::camera::{start_camera, CameraStartup, StartupStatus, VideoSource};
use pinchzoom_capture_engine::detector::LandmarkSource;
use pinchzoom_capture_engine::replay::ReplayLandmarkSource;
use pinchzoom_capture_engine::synthetic::{PinchScript, ScriptedPinchSource, SyntheticCamera, SyntheticVideo};
use pinchzoom_common::clock::{RateController, StreamClock};
use pinchzoom_common::config::{AppConfig, DisplayConfig};
use pinchzoom_processing_core::zoom::ZoomEstimator;
use pinchzoom_render_engine::{FrameReportWriter, ImageSurface, RenderLoop, ReportHeader};

pub struct RunOptions {
    pub frames: Option<u64>,
    pub replay: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub snapshot_every: f64,
    pub report: Option<PathBuf>,
}

pub async fn run(config: AppConfig, options: RunOptions) -> anyhow::Result<()> {
    config.validate()?;
    let estimator = ZoomEstimator::new(config.zoom)?;

    let detector: Box<dyn LandmarkSource> = match &options.replay {
        Some(path) => Box::new(ReplayLandmarkSource::open(path, config.detector.clone())?),
        None => Box::new(ScriptedPinchSource::new(
            PinchScript::default(),
            config.detector.clone(),
        )),
    };

    println!("Starting camera...");
    let mut camera = SyntheticCamera::new();
    let startup = start_camera(&mut camera, &config.camera).await;
    let status = startup.status();
    for line in status_lines(&status) {
        if status.error_visible {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    let video = match startup {
        CameraStartup::Ready(video) => video,
        CameraStartup::AwaitingInteraction { source, .. } => wait_for_interaction(source).await?,
        CameraStartup::Failed { reason } => {
            eprintln!("  {reason}");
            return Err(reason.into());
        }
    };

    let (video_width, video_height) = video.video_size();
    println!("  Camera: {video_width}x{video_height}");
    println!(
        "  Display: {}x{} @ {}Hz (mirror: {}, landmarks: {})",
        config.display.width,
        config.display.height,
        config.display.refresh_hz,
        config.display.mirror,
        config.display.draw_landmarks
    );
    println!("  Detector: {}", detector.name());
    println!();

    let mut report_writer = match &options.report {
        Some(path) => Some(FrameReportWriter::new(
            path.clone(),
            &report_header(&video, &config.display),
        )?),
        None => None,
    };

    let mut snapshots = SnapshotWriter::new(options.output.as_deref(), options.snapshot_every);

    let surface = ImageSurface::new(config.display.width, config.display.height);
    let mut render = RenderLoop::new(video, detector, surface, estimator, config.display.clone())?;

    let stop = render.stop_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.store(true, Ordering::SeqCst);
        }
    });

    println!("Press Ctrl+C to stop...");
    let stats = render
        .run(options.frames, |report, surface| {
            if let Some(writer) = report_writer.as_mut() {
                writer.write_report(report)?;
            }
            snapshots.maybe_save(report.frame_index, report.timestamp_ns, surface)?;
            Ok(())
        })
        .await?;

    if let Some(writer) = report_writer.as_mut() {
        writer.flush()?;
        println!("Frame report: {}", writer.path().display());
    }

    println!();
    println!("Rendered frames: {}", stats.rendered_frames);
    println!("Frames with a hand: {}", stats.hand_frames);
    println!("Idle refreshes: {}", stats.idle_ticks);
    if let Some(zoom) = stats.last_zoom {
        println!("Final zoom: {zoom:.3}");
    }
    if snapshots.saved > 0 {
        println!("Snapshots written: {}", snapshots.saved);
    }

    Ok(())
}

/// Console rendering of the startup indicators.
fn status_lines(status: &StartupStatus) -> Vec<String> {
    let mut lines = Vec::new();
    if status.loader_visible {
        lines.push(
            status
                .loader_text
                .clone()
                .unwrap_or_else(|| "Starting camera...".to_string()),
        );
    }
    if status.error_visible {
        lines.push("Error accessing camera".to_string());
    }
    if status.display_visible {
        lines.push("Camera ready".to_string());
    }
    lines
}

/// Header stamped with the epoch of the clock that timestamps the frames.
fn report_header(video: &SyntheticVideo, display: &DisplayConfig) -> ReportHeader {
    let epoch_wall = match video.clock() {
        Some(clock) => clock.epoch_wall().to_string(),
        None => StreamClock::start().epoch_wall().to_string(),
    };
    ReportHeader::new(epoch_wall, display.width, display.height)
}

/// The terminal stand-in for the click that unblocks playback.
async fn wait_for_interaction(mut video: SyntheticVideo) -> anyhow::Result<SyntheticVideo> {
    println!("(press Enter)");
    let mut line = String::new();
    tokio::io::BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;

    video.grant_interaction();
    video.play()?;
    tracing::info!("Playback started after user interaction");
    Ok(video)
}

struct SnapshotWriter {
    dir: Option<PathBuf>,
    rate: RateController,
    saved: u64,
}

impl SnapshotWriter {
    fn new(dir: Option<&Path>, every_secs: f64) -> Self {
        Self {
            dir: dir.map(Path::to_path_buf),
            rate: RateController::with_interval_ns(StreamClock::secs_to_ns(every_secs.max(0.0))),
            saved: 0,
        }
    }

    fn maybe_save(
        &mut self,
        frame_index: u64,
        now_ns: u64,
        surface: &ImageSurface,
    ) -> pinchzoom_common::error::PinchzoomResult<()> {
        let Some(dir) = &self.dir else {
            return Ok(());
        };
        if !self.rate.should_tick(now_ns) {
            return Ok(());
        }

        let path = dir.join(format!("frame-{frame_index:06}.png"));
        surface.save_png(&path)?;
        self.saved += 1;
        tracing::debug!(path = %path.display(), "Saved snapshot");
        Ok(())
    }
}
