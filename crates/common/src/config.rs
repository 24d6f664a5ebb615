//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PinchzoomError, PinchzoomResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Camera stream request.
    pub camera: CameraConfig,

    /// Hand-landmark detector options.
    pub detector: DetectorConfig,

    /// Pinch-to-zoom mapping parameters.
    pub zoom: ZoomConfig,

    /// Display surface and overlay settings.
    pub display: DisplayConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Which camera the stream should come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FacingMode {
    /// Front-facing ("selfie") camera.
    #[default]
    User,
    /// Rear camera.
    Environment,
}

/// Camera stream constraints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub facing_mode: FacingMode,
    pub width: u32,
    pub height: u32,
}

/// Options passed to the landmark source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Maximum number of hands reported per frame.
    pub max_hands: usize,

    /// Hands scored below this are dropped.
    pub min_detection_confidence: f64,

    /// Confidence needed to keep tracking a hand between frames.
    pub min_tracking_confidence: f64,
}

/// Parameters of the distance-to-zoom mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    /// Pixel distance between fingertips that corresponds to 1x zoom.
    pub sensitivity: f64,

    /// Lower zoom bound (unzoomed view).
    pub min_zoom: f64,

    /// Upper zoom bound.
    pub max_zoom: f64,

    /// Fraction of the remaining distance to `min_zoom` covered per frame
    /// while no hand is visible.
    pub decay_rate: f64,
}

/// Display surface and overlay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,

    /// Render loop cadence in Hz.
    pub refresh_hz: u32,

    /// Flip the output horizontally so it behaves like a mirror.
    pub mirror: bool,

    /// Draw detected landmarks and the hand skeleton.
    pub draw_landmarks: bool,

    pub overlay: OverlayStyle,
}

/// Colors and sizes used for the landmark overlay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    /// Skeleton color as `#RRGGBB`.
    pub connector_color: String,
    pub connector_width: u32,
    /// Landmark point color as `#RRGGBB`.
    pub point_color: String,
    pub point_radius: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "pinchzoom=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::User,
            width: 640,
            height: 480,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_hands: 1,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
        }
    }
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            sensitivity: 100.0,
            min_zoom: 1.0,
            max_zoom: 3.0,
            decay_rate: 0.1,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            refresh_hz: 60,
            mirror: true,
            draw_landmarks: true,
            overlay: OverlayStyle::default(),
        }
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            connector_color: "#00FF00".to_string(),
            connector_width: 2,
            point_color: "#FF0000".to_string(),
            point_radius: 2,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl ZoomConfig {
    /// Check the bounds and rates are usable.
    pub fn validate(&self) -> PinchzoomResult<()> {
        let all_finite = [
            self.sensitivity,
            self.min_zoom,
            self.max_zoom,
            self.decay_rate,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !all_finite {
            return Err(PinchzoomError::config("zoom parameters must be finite"));
        }
        if self.sensitivity <= 0.0 {
            return Err(PinchzoomError::config(format!(
                "zoom sensitivity must be positive, got {}",
                self.sensitivity
            )));
        }
        if self.min_zoom <= 0.0 || self.min_zoom > self.max_zoom {
            return Err(PinchzoomError::config(format!(
                "zoom bounds must satisfy 0 < min <= max, got [{}, {}]",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.decay_rate <= 0.0 || self.decay_rate > 1.0 {
            return Err(PinchzoomError::config(format!(
                "zoom decay rate must be in (0, 1], got {}",
                self.decay_rate
            )));
        }
        Ok(())
    }
}

impl OverlayStyle {
    pub fn connector_rgba(&self) -> PinchzoomResult<[u8; 4]> {
        parse_hex_color(&self.connector_color)
    }

    pub fn point_rgba(&self) -> PinchzoomResult<[u8; 4]> {
        parse_hex_color(&self.point_color)
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path. Errors are returned, not masked.
    pub fn load_from(path: &Path) -> PinchzoomResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(&config_path, json)?;
        Ok(config_path)
    }

    /// Validate everything the pipeline depends on.
    pub fn validate(&self) -> PinchzoomResult<()> {
        self.zoom.validate()?;
        if self.display.width == 0 || self.display.height == 0 {
            return Err(PinchzoomError::config("display size must be non-zero"));
        }
        if self.display.refresh_hz == 0 {
            return Err(PinchzoomError::config("display refresh rate must be non-zero"));
        }
        if self.detector.max_hands == 0 {
            return Err(PinchzoomError::config("detector must track at least one hand"));
        }
        self.display.overlay.connector_rgba()?;
        self.display.overlay.point_rgba()?;
        Ok(())
    }
}

/// Parse `#RRGGBB` (or `#RRGGBBAA`) into RGBA bytes.
pub fn parse_hex_color(value: &str) -> PinchzoomResult<[u8; 4]> {
    let hex = value.strip_prefix('#').unwrap_or(value);
    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return Err(PinchzoomError::config(format!("invalid color '{value}'")));
    }

    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|_| PinchzoomError::config(format!("invalid color '{value}'")))
    };

    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Ok([channel(0)?, channel(2)?, channel(4)?, alpha])
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("pinchzoom").join("config.json")
}
