//! Error types shared across PinchZoom crates.

/// Top-level error type for PinchZoom operations.
#[derive(Debug, thiserror::Error)]
pub enum PinchzoomError {
    #[error("Camera error: {message}")]
    Camera { message: String },

    #[error("Detection error: {message}")]
    Detection { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid landmarks: {message}")]
    InvalidLandmarks { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using PinchzoomError.
pub type PinchzoomResult<T> = Result<T, PinchzoomError>;

impl PinchzoomError {
    pub fn camera(msg: impl Into<String>) -> Self {
        Self::Camera {
            message: msg.into(),
        }
    }

    pub fn detection(msg: impl Into<String>) -> Self {
        Self::Detection {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn invalid_landmarks(msg: impl Into<String>) -> Self {
        Self::InvalidLandmarks {
            message: msg.into(),
        }
    }
}
