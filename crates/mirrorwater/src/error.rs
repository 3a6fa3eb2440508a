//! Error types for the mirrorwater facade.

use thiserror::Error;

/// The main error type for mirrorwater operations.
#[derive(Error, Debug)]
pub enum MirrorwaterError {
    /// Configuration or wave-parameter error.
    #[error(transparent)]
    Water(#[from] mirrorwater_core::WaterError),

    /// GPU setup or frame error.
    #[error(transparent)]
    Render(#[from] mirrorwater_render::RenderError),

    /// Saving a rendered frame failed.
    #[error("failed to save image: {0}")]
    Screenshot(#[from] mirrorwater_render::ScreenshotError),

    /// The windowing event loop could not start.
    #[error("event loop error: {0}")]
    EventLoop(String),

    /// A malformed command-line value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// A specialized Result type for mirrorwater operations.
pub type Result<T> = std::result::Result<T, MirrorwaterError>;
