//! mirrorwater: an animated Gerstner-wave water surface with real-time planar reflections.
//!
//! # Quick Start
//!
//! ```no_run
//! use mirrorwater::*;
//!
//! fn main() -> Result<()> {
//!     let viewer = Viewer::new(WaterRenderConfig::default(), WaveSimulationState::default());
//!     run(viewer, 1280, 720)
//! }
//! ```
//!
//! # Frame order
//!
//! Each displayed frame runs, in order: [`FrameClock::tick`], the reflection
//! pass through the mirrored camera, the parameter sync into the water
//! uniforms, and the visible pass. Resizes re-base the clock so the wave
//! animation continues without a jump.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]

mod app;
mod cli;
mod demo;
mod error;
mod headless;
mod viewer;

pub use app::{run, App};
pub use cli::{parse_wave_override, Args};
pub use demo::DemoScene;
pub use error::{MirrorwaterError, Result};
pub use headless::{render_to_file, render_to_image};
pub use viewer::Viewer;

// Re-export core types
pub use mirrorwater_core::{
    evaluate, parse_hex_color, FloatingBody, FrameClock, MonotonicClock, TimeSource,
    WaterRenderConfig, WaveComponent, WaveKey, WaveParam, WaveSample, WaveSet, WaveSetPatch,
    WaveSimulationState, Mat4, Vec2, Vec3, Vec4,
};

// Re-export render types
pub use mirrorwater_render::{
    Camera, Engine, MirroredCamera, ReflectionPlane, ReflectionRenderer, RenderError, Scene,
};
