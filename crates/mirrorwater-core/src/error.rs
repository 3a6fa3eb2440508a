//! Error types for mirrorwater.

use thiserror::Error;

/// The main error type for mirrorwater core operations.
#[derive(Error, Debug)]
pub enum WaterError {
    /// A wave key other than `wave1`..`wave3` was given.
    #[error("unknown wave '{0}' (expected wave1, wave2 or wave3)")]
    UnknownWave(String),

    /// A wave field other than direction, steepness or wavelength was given.
    #[error("unknown wave field '{0}' (expected direction, steepness or wavelength)")]
    UnknownWaveField(String),

    /// A colour string could not be parsed.
    #[error("invalid colour '{0}' (expected #rgb or #rrggbb)")]
    InvalidColor(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for mirrorwater core operations.
pub type Result<T> = std::result::Result<T, WaterError>;
