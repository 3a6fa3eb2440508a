//! Core abstractions for mirrorwater.
//!
//! This crate holds everything that does not touch the GPU:
//! - [`wave`]: the Gerstner wave field and its GPU packing
//! - [`WaveSimulationState`] and its clamped update API
//! - [`FrameClock`] with resize-safe re-basing
//! - [`WaterRenderConfig`], the visual knob snapshot
//! - [`FloatingBody`] for objects riding the surface

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod buoyancy;
pub mod clock;
pub mod config;
pub mod error;
pub mod simulation;
pub mod wave;

pub use buoyancy::FloatingBody;
pub use clock::{FrameClock, MonotonicClock, TimeSource};
pub use config::{parse_hex_color, WaterRenderConfig};
pub use error::{Result, WaterError};
pub use simulation::WaveSimulationState;
pub use wave::{
    evaluate, WaveComponent, WaveKey, WaveParam, WaveSample, WaveSet, WaveSetPatch, WaveUniform,
    WAVE_COUNT,
};

// Re-export glam types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};
