//! Rendering backend for mirrorwater.
//!
//! This crate provides the wgpu-based side of the water:
//! - [`Engine`]: device setup, resize handling and the two-pass frame
//! - [`ReflectionRenderer`] and its [`ReflectionTarget`]
//! - [`ParameterBridge`], copying per-frame state into the water uniforms
//! - [`WaterSurface`], the tessellated plane and its WGSL program
//! - [`Scene`], the host scene graph with a held water handle

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

pub mod buffer;
pub mod camera;
pub mod engine;
pub mod error;
pub mod parameter_bridge;
pub mod reflection;
pub mod reflection_renderer;
pub mod reflection_target;
pub mod scene;
pub mod scene_render;
pub mod screenshot;
pub mod water_surface;

pub use camera::Camera;
pub use engine::Engine;
pub use error::{RenderError, RenderResult};
pub use parameter_bridge::{
    FrameInputs, ParameterBridge, ReflectionMatrices, UniformSchema, WaterUniforms,
};
pub use reflection::{MirroredCamera, ReflectionPlane};
pub use reflection_renderer::{ReflectionRenderer, DEFAULT_LOOK_TARGET};
pub use reflection_target::{ReflectionTarget, REFLECTION_COLOR_FORMAT, REFLECTION_DEPTH_FORMAT};
pub use scene::{MeshData, NodeId, NodeKind, Scene, SceneNode, SceneVertex};
pub use scene_render::{CameraUniforms, PassKind, SceneRenderer};
pub use screenshot::{encode_png, save_image, ScreenshotError};
pub use water_surface::{PlaneGeometry, WaterSurface, WaterVertex, WATER_SHADER};
