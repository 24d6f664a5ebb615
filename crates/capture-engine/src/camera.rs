//! Camera acquisition and video source contracts.

use async_trait::async_trait;
use image::RgbaImage;

use pinchzoom_common::config::CameraConfig;
use pinchzoom_common::error::{PinchzoomError, PinchzoomResult};

/// Text shown in place of the loading message when playback needs a user
/// gesture before it may start.
pub const AUTOPLAY_INSTRUCTION: &str = "Click to start the camera";

/// How much media a video source has buffered.
///
/// Ordered: a source can render once it reaches [`ReadyState::HaveCurrentData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    /// Nothing known about the stream yet.
    HaveNothing,
    /// Dimensions are known; no frame is available.
    HaveMetadata,
    /// The current frame is available.
    HaveCurrentData,
    /// The current and at least the next frame are available.
    HaveFutureData,
    /// Enough data buffered to play through.
    HaveEnoughData,
}

/// A single decoded video frame.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Sequential frame number since playback started.
    pub index: u64,

    /// Monotonic nanoseconds since the stream started.
    pub timestamp_ns: u64,

    /// RGBA pixels at the video's intrinsic size.
    pub image: RgbaImage,
}

impl VideoFrame {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// A playable live video stream.
pub trait VideoSource {
    /// Current buffering level.
    fn ready_state(&self) -> ReadyState;

    fn is_paused(&self) -> bool;

    fn is_ended(&self) -> bool;

    /// Intrinsic `(width, height)`; `(0, 0)` until metadata is loaded.
    fn video_size(&self) -> (u32, u32);

    /// Start or resume playback.
    fn play(&mut self) -> Result<(), CameraError>;

    fn pause(&mut self);

    /// Grab the frame currently being presented.
    fn current_frame(&mut self) -> PinchzoomResult<VideoFrame>;

    /// Whether a frame can be rendered right now.
    fn is_playable(&self) -> bool {
        self.ready_state() >= ReadyState::HaveCurrentData && !self.is_paused() && !self.is_ended()
    }
}

/// Something that can hand out a camera stream.
///
/// `open` resolves once the stream's metadata is loaded, so the returned
/// source reports at least [`ReadyState::HaveMetadata`].
#[async_trait(?Send)]
pub trait CameraProvider {
    type Source: VideoSource;

    async fn open(&mut self, constraints: &CameraConfig) -> Result<Self::Source, CameraError>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}

/// Ways camera startup can fail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CameraError {
    #[error("Camera permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("No camera device found: {message}")]
    NoDevice { message: String },

    #[error("Camera unsupported in this environment: {message}")]
    Unsupported { message: String },

    #[error("Playback blocked until user interaction: {message}")]
    AutoplayBlocked { message: String },

    #[error("Camera stream error: {message}")]
    Stream { message: String },
}

impl From<CameraError> for PinchzoomError {
    fn from(err: CameraError) -> Self {
        PinchzoomError::camera(err.to_string())
    }
}

/// Result of [`start_camera`].
#[derive(Debug)]
pub enum CameraStartup<S> {
    /// Stream is playing.
    Ready(S),

    /// Stream is open but playback needs a user gesture; call
    /// [`VideoSource::play`] again once one happens.
    AwaitingInteraction { source: S, message: String },

    /// Startup failed for good. No retry is attempted.
    Failed { reason: CameraError },
}

/// What the status area should show for a startup outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupStatus {
    pub loader_visible: bool,
    pub loader_text: Option<String>,
    pub error_visible: bool,
    pub display_visible: bool,
}

impl<S> CameraStartup<S> {
    pub fn status(&self) -> StartupStatus {
        match self {
            CameraStartup::Ready(_) => StartupStatus {
                loader_visible: false,
                loader_text: None,
                error_visible: false,
                display_visible: true,
            },
            CameraStartup::AwaitingInteraction { message, .. } => StartupStatus {
                loader_visible: true,
                loader_text: Some(message.clone()),
                error_visible: false,
                display_visible: false,
            },
            CameraStartup::Failed { .. } => StartupStatus {
                loader_visible: false,
                loader_text: None,
                error_visible: true,
                display_visible: false,
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, CameraStartup::Ready(_))
    }
}

/// Open the camera and start playback.
///
/// Errors never escape: they are logged and folded into the returned
/// [`CameraStartup`].
pub async fn start_camera<P: CameraProvider>(
    provider: &mut P,
    constraints: &CameraConfig,
) -> CameraStartup<P::Source> {
    tracing::info!(
        provider = provider.name(),
        facing_mode = ?constraints.facing_mode,
        width = constraints.width,
        height = constraints.height,
        "Requesting camera stream"
    );

    let mut source = match provider.open(constraints).await {
        Ok(source) => source,
        Err(reason) => {
            tracing::error!(error = %reason, "Error accessing camera");
            return CameraStartup::Failed { reason };
        }
    };

    let (width, height) = source.video_size();
    tracing::info!(width, height, "Camera metadata loaded");

    match source.play() {
        Ok(()) => {
            tracing::info!("Camera playback started");
            CameraStartup::Ready(source)
        }
        Err(CameraError::AutoplayBlocked { message }) => {
            tracing::warn!(%message, "Autoplay blocked, waiting for user interaction");
            CameraStartup::AwaitingInteraction {
                source,
                message: AUTOPLAY_INSTRUCTION.to_string(),
            }
        }
        Err(reason) => {
            tracing::error!(error = %reason, "Error starting camera playback");
            CameraStartup::Failed { reason }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct StubVideo {
        playing: bool,
        play_result: Result<(), CameraError>,
    }

    impl VideoSource for StubVideo {
        fn ready_state(&self) -> ReadyState {
            if self.playing {
                ReadyState::HaveEnoughData
            } else {
                ReadyState::HaveMetadata
            }
        }

        fn is_paused(&self) -> bool {
            !self.playing
        }

        fn is_ended(&self) -> bool {
            false
        }

        fn video_size(&self) -> (u32, u32) {
            (640, 480)
        }

        fn play(&mut self) -> Result<(), CameraError> {
            self.play_result.clone()?;
            self.playing = true;
            Ok(())
        }

        fn pause(&mut self) {
            self.playing = false;
        }

        fn current_frame(&mut self) -> PinchzoomResult<VideoFrame> {
            Ok(VideoFrame {
                index: 0,
                timestamp_ns: 0,
                image: RgbaImage::new(640, 480),
            })
        }
    }

    struct StubProvider {
        open_result: Result<(), CameraError>,
        play_result: Result<(), CameraError>,
    }

    #[async_trait(?Send)]
    impl CameraProvider for StubProvider {
        type Source = StubVideo;

        async fn open(&mut self, _constraints: &CameraConfig) -> Result<StubVideo, CameraError> {
            self.open_result.clone()?;
            Ok(StubVideo {
                playing: false,
                play_result: self.play_result.clone(),
            })
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    #[tokio::test]
    async fn test_start_camera_ready() {
        let mut provider = StubProvider {
            open_result: Ok(()),
            play_result: Ok(()),
        };
        let startup = start_camera(&mut provider, &CameraConfig::default()).await;
        let status = startup.status();
        assert!(status.display_visible);
        assert!(!status.loader_visible);
        match startup {
            CameraStartup::Ready(source) => assert!(source.is_playable()),
            other => panic!("expected ready, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_permission_denied_shows_error() {
        let mut provider = StubProvider {
            open_result: Err(CameraError::PermissionDenied {
                message: "user dismissed prompt".into(),
            }),
            play_result: Ok(()),
        };
        let startup = start_camera(&mut provider, &CameraConfig::default()).await;
        let status = startup.status();
        assert!(status.error_visible);
        assert!(!status.loader_visible);
        assert!(!status.display_visible);
        assert!(matches!(
            startup,
            CameraStartup::Failed {
                reason: CameraError::PermissionDenied { .. }
            }
        ));
    }

    #[tokio::test]
    async fn test_autoplay_block_asks_for_interaction() {
        let mut provider = StubProvider {
            open_result: Ok(()),
            play_result: Err(CameraError::AutoplayBlocked {
                message: "NotAllowedError".into(),
            }),
        };
        let startup = start_camera(&mut provider, &CameraConfig::default()).await;
        let status = startup.status();
        assert!(status.loader_visible);
        assert!(!status.error_visible);
        assert_eq!(status.loader_text.as_deref(), Some(AUTOPLAY_INSTRUCTION));
        match startup {
            CameraStartup::AwaitingInteraction { source, .. } => assert!(!source.is_playable()),
            other => panic!("expected awaiting interaction, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stream_failure_during_play_is_fatal() {
        let mut provider = StubProvider {
            open_result: Ok(()),
            play_result: Err(CameraError::Stream {
                message: "track ended".into(),
            }),
        };
        let startup = start_camera(&mut provider, &CameraConfig::default()).await;
        assert!(startup.status().error_visible);
        assert!(!startup.is_ready());
    }

    #[test]
    fn test_ready_state_ordering() {
        assert!(ReadyState::HaveMetadata < ReadyState::HaveCurrentData);
        assert!(ReadyState::HaveEnoughData > ReadyState::HaveCurrentData);
    }

    #[test]
    fn test_camera_error_converts() {
        let err: PinchzoomError = CameraError::NoDevice {
            message: "none".into(),
        }
        .into();
        assert!(matches!(err, PinchzoomError::Camera { .. }));
    }
}
