//! Per-frame synchronization of clock, configuration and reflection state into
//! the water shader's uniform block.

use glam::{Mat4, Vec3};
use mirrorwater_core::config::{
    DEFAULT_BLUR_RADIUS, DEFAULT_BLUR_STRENGTH, DEFAULT_TINT, DEFAULT_TRANSPARENCY,
};
use mirrorwater_core::{WaterRenderConfig, WaveSimulationState, WaveUniform, WAVE_COUNT};

use crate::error::{RenderError, RenderResult};
use crate::reflection::MirroredCamera;

const UNIFORM_STRUCT: &str = "WaterUniforms";

/// GPU representation of the water uniform block.
///
/// Field order matches `struct WaterUniforms` in `shaders/water.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct WaterUniforms {
    /// uRefProjectionMatrix
    pub ref_projection: [[f32; 4]; 4],
    /// uRefViewMatrix: the mirrored camera's world-to-view matrix.
    pub ref_view: [[f32; 4]; 4],
    pub waves: [WaveUniform; WAVE_COUNT],
    /// uBaseColor (rgb, w unused)
    pub base_color: [f32; 4],
    /// uTime
    pub time: f32,
    pub frequency: f32,
    pub amplitude: f32,
    pub pixelation: f32,
    pub reflectivity: f32,
    pub roughness: f32,
    pub roughness_scale: f32,
    pub transparency: f32,
    pub blur_radius: f32,
    pub blur_strength: f32,
    /// Reserved grazing-angle cutoff; forwarded, not yet shaded.
    pub max_reflect_angle_deg: f32,
    pub steepness_multiplier: f32,
    /// Simulated wave time driving the Gerstner displacement.
    pub wave_time: f32,
    /// 1.0 once the reflection map holds a rendered image.
    pub reflection_ready: f32,
    pub _padding: [f32; 2],
}

impl Default for WaterUniforms {
    fn default() -> Self {
        Self {
            ref_projection: Mat4::IDENTITY.to_cols_array_2d(),
            ref_view: Mat4::IDENTITY.to_cols_array_2d(),
            waves: [WaveUniform::default(); WAVE_COUNT],
            base_color: DEFAULT_TINT.extend(1.0).to_array(),
            time: 0.0,
            frequency: 0.0,
            amplitude: 0.0,
            pixelation: 1.0,
            reflectivity: 0.0,
            roughness: 0.0,
            roughness_scale: 1.0,
            transparency: DEFAULT_TRANSPARENCY,
            blur_radius: DEFAULT_BLUR_RADIUS,
            blur_strength: DEFAULT_BLUR_STRENGTH,
            max_reflect_angle_deg: 0.0,
            steepness_multiplier: 1.0,
            wave_time: 0.0,
            reflection_ready: 0.0,
            _padding: [0.0; 2],
        }
    }
}

/// Which optional uniforms a water shader program declares.
///
/// Resolved once when the program is built. A program lacking an optional
/// uniform keeps its slot as padding and the bridge leaves it untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct UniformSchema {
    pub base_color: bool,
    pub transparency: bool,
    pub blur_radius: bool,
    pub blur_strength: bool,
}

impl UniformSchema {
    /// Schema of a program exposing every optional uniform.
    pub const FULL: Self = Self {
        base_color: true,
        transparency: true,
        blur_radius: true,
        blur_strength: true,
    };

    /// Schema of a program exposing none of the optional uniforms.
    pub const REQUIRED_ONLY: Self = Self {
        base_color: false,
        transparency: false,
        blur_radius: false,
        blur_strength: false,
    };

    /// Reflects `struct WaterUniforms` out of a WGSL source.
    ///
    /// A program without that struct exposes no optional uniform.
    pub fn from_wgsl(source: &str) -> RenderResult<Self> {
        let module = naga::front::wgsl::parse_str(source)
            .map_err(|err| RenderError::ShaderParse(err.emit_to_string(source)))?;

        let members = module.types.iter().find_map(|(_, ty)| match &ty.inner {
            naga::TypeInner::Struct { members, .. }
                if ty.name.as_deref() == Some(UNIFORM_STRUCT) =>
            {
                Some(members)
            }
            _ => None,
        });
        let Some(members) = members else {
            log::warn!("shader declares no `{UNIFORM_STRUCT}` struct");
            return Ok(Self::REQUIRED_ONLY);
        };

        let declares = |name: &str| members.iter().any(|m| m.name.as_deref() == Some(name));
        Ok(Self {
            base_color: declares("base_color"),
            transparency: declares("transparency"),
            blur_radius: declares("blur_radius"),
            blur_strength: declares("blur_strength"),
        })
    }
}

/// Projection and world-to-view matrices of the mirrored camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReflectionMatrices {
    pub projection: Mat4,
    pub view: Mat4,
}

impl From<&MirroredCamera> for ReflectionMatrices {
    fn from(camera: &MirroredCamera) -> Self {
        Self {
            projection: camera.projection_matrix(),
            view: camera.view_matrix(),
        }
    }
}

/// Everything the bridge reads for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameInputs<'a> {
    /// Frame clock elapsed seconds.
    pub elapsed: f32,
    pub config: &'a WaterRenderConfig,
    pub simulation: &'a WaveSimulationState,
    /// `None` until the reflection pass has produced a camera.
    pub reflection: Option<ReflectionMatrices>,
    /// Whether the reflection map has been rendered into.
    pub reflection_ready: bool,
}

/// Copies a frame's inputs into the water uniform block.
#[derive(Debug, Clone)]
pub struct ParameterBridge {
    schema: UniformSchema,
    rejected_tint: Option<String>,
}

impl ParameterBridge {
    #[must_use]
    pub fn new(schema: UniformSchema) -> Self {
        Self {
            schema,
            rejected_tint: None,
        }
    }

    #[must_use]
    pub fn schema(&self) -> UniformSchema {
        self.schema
    }

    /// Writes the frame's values into `uniforms`.
    ///
    /// Optional uniforms are written only when the schema declares them and
    /// use the documented defaults when the config leaves them unset.
    pub fn sync(&mut self, uniforms: &mut WaterUniforms, inputs: &FrameInputs<'_>) {
        let config = inputs.config;

        uniforms.time = inputs.elapsed;
        uniforms.frequency = config.frequency;
        uniforms.amplitude = config.amplitude;
        uniforms.pixelation = config.pixelation;
        uniforms.reflectivity = config.reflectivity;
        uniforms.roughness = config.roughness;
        uniforms.roughness_scale = config.roughness_scale;
        uniforms.max_reflect_angle_deg = config.max_reflect_angle_deg.unwrap_or(0.0);

        uniforms.waves = inputs.simulation.waves().to_uniforms();
        uniforms.steepness_multiplier = inputs.simulation.steepness_multiplier();
        uniforms.wave_time = inputs.simulation.elapsed_time();

        if let Some(reflection) = inputs.reflection {
            uniforms.ref_projection = reflection.projection.to_cols_array_2d();
            uniforms.ref_view = reflection.view.to_cols_array_2d();
        }
        uniforms.reflection_ready = if inputs.reflection_ready { 1.0 } else { 0.0 };

        if self.schema.base_color {
            uniforms.base_color = self.resolve_tint(config).extend(1.0).to_array();
        }
        if self.schema.transparency {
            uniforms.transparency = config.transparency_or_default();
        }
        if self.schema.blur_radius {
            uniforms.blur_radius = config.blur_radius_or_default();
        }
        if self.schema.blur_strength {
            uniforms.blur_strength = config.blur_strength_or_default();
        }
    }

    fn resolve_tint(&mut self, config: &WaterRenderConfig) -> Vec3 {
        match config.tint_or_default() {
            Ok(color) => {
                self.rejected_tint = None;
                color
            }
            Err(err) => {
                // warn once per distinct bad value rather than every frame
                if self.rejected_tint.as_deref() != config.tint_color.as_deref() {
                    log::warn!("{err}; using default tint");
                    self.rejected_tint.clone_from(&config.tint_color);
                }
                DEFAULT_TINT
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs<'a>(
        config: &'a WaterRenderConfig,
        simulation: &'a WaveSimulationState,
    ) -> FrameInputs<'a> {
        FrameInputs {
            elapsed: 4.25,
            config,
            simulation,
            reflection: None,
            reflection_ready: false,
        }
    }

    #[test]
    fn test_uniforms_size_is_256() {
        assert_eq!(std::mem::size_of::<WaterUniforms>(), 256);
    }

    #[test]
    fn test_required_fields_forwarded() {
        let config = WaterRenderConfig::default();
        let sim = WaveSimulationState::default();
        let mut uniforms = WaterUniforms::default();
        ParameterBridge::new(UniformSchema::FULL).sync(&mut uniforms, &inputs(&config, &sim));
        assert_eq!(uniforms.time, 4.25);
        assert_eq!(uniforms.frequency, config.frequency);
        assert_eq!(uniforms.amplitude, config.amplitude);
        assert_eq!(uniforms.pixelation, config.pixelation);
        assert_eq!(uniforms.reflectivity, config.reflectivity);
        assert_eq!(uniforms.roughness, config.roughness);
        assert_eq!(uniforms.roughness_scale, config.roughness_scale);
        assert_eq!(uniforms.max_reflect_angle_deg, 30.0);
        assert_eq!(uniforms.waves, sim.waves().to_uniforms());
    }

    #[test]
    fn test_defaults_for_absent_optionals() {
        let config = WaterRenderConfig::default().required_only();
        let sim = WaveSimulationState::default();
        let mut uniforms = WaterUniforms::zeroed_for_test();
        ParameterBridge::new(UniformSchema::FULL).sync(&mut uniforms, &inputs(&config, &sim));
        assert_eq!(uniforms.transparency, DEFAULT_TRANSPARENCY);
        assert_eq!(uniforms.blur_radius, DEFAULT_BLUR_RADIUS);
        assert_eq!(uniforms.blur_strength, DEFAULT_BLUR_STRENGTH);
        assert_eq!(uniforms.base_color, DEFAULT_TINT.extend(1.0).to_array());
    }

    #[test]
    fn test_explicit_zero_is_not_defaulted() {
        let mut config = WaterRenderConfig::default();
        config.transparency = Some(0.0);
        config.blur_radius = Some(0.0);
        config.blur_strength = Some(0.0);
        let sim = WaveSimulationState::default();
        let mut uniforms = WaterUniforms::default();
        ParameterBridge::new(UniformSchema::FULL).sync(&mut uniforms, &inputs(&config, &sim));
        assert_eq!(uniforms.transparency, 0.0);
        assert_eq!(uniforms.blur_radius, 0.0);
        assert_eq!(uniforms.blur_strength, 0.0);
    }

    #[test]
    fn test_missing_optional_uniforms_are_untouched() {
        let config = WaterRenderConfig::default();
        let sim = WaveSimulationState::default();
        let mut uniforms = WaterUniforms::zeroed_for_test();
        ParameterBridge::new(UniformSchema::REQUIRED_ONLY)
            .sync(&mut uniforms, &inputs(&config, &sim));
        assert_eq!(uniforms.transparency, 0.0);
        assert_eq!(uniforms.blur_radius, 0.0);
        assert_eq!(uniforms.base_color, [0.0; 4]);
        assert_eq!(uniforms.frequency, config.frequency);
    }

    #[test]
    fn test_reflection_matrices_copied_when_present() {
        let config = WaterRenderConfig::default();
        let sim = WaveSimulationState::default();
        let mut frame = inputs(&config, &sim);
        let projection = Mat4::perspective_rh(1.0, 1.0, 0.1, 10.0);
        let view = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        frame.reflection = Some(ReflectionMatrices { projection, view });
        frame.reflection_ready = true;
        let mut uniforms = WaterUniforms::default();
        ParameterBridge::new(UniformSchema::FULL).sync(&mut uniforms, &frame);
        assert_eq!(uniforms.ref_projection, projection.to_cols_array_2d());
        assert_eq!(uniforms.ref_view, view.to_cols_array_2d());
        assert_eq!(uniforms.reflection_ready, 1.0);
    }

    #[test]
    fn test_bad_tint_falls_back() {
        let mut config = WaterRenderConfig::default();
        config.tint_color = Some("teal".to_string());
        let sim = WaveSimulationState::default();
        let mut uniforms = WaterUniforms::default();
        let mut bridge = ParameterBridge::new(UniformSchema::FULL);
        bridge.sync(&mut uniforms, &inputs(&config, &sim));
        assert_eq!(uniforms.base_color, DEFAULT_TINT.extend(1.0).to_array());
    }

    #[test]
    fn test_schema_from_shipped_shader() {
        let schema = UniformSchema::from_wgsl(include_str!("shaders/water.wgsl")).unwrap();
        assert_eq!(schema, UniformSchema::FULL);
    }

    #[test]
    fn test_schema_from_legacy_shader() {
        let source = r"
            struct WaterUniforms {
                ref_projection: mat4x4<f32>,
                ref_view: mat4x4<f32>,
                time: f32,
                _reserved_transparency: f32,
                blur_strength: f32,
            }
        ";
        let schema = UniformSchema::from_wgsl(source).unwrap();
        assert!(!schema.base_color);
        assert!(!schema.transparency);
        assert!(!schema.blur_radius);
        assert!(schema.blur_strength);
    }

    #[test]
    fn test_schema_reads_attributed_and_commented_members() {
        let source = r"
            struct WaterUniforms {
                ref_projection: mat4x4<f32>,
                // tint, rgb
                @align(16) base_color: vec4<f32>,
                transparency: f32, /* blur: off */
                @size(16) blur_radius: f32,
            }
        ";
        let schema = UniformSchema::from_wgsl(source).unwrap();
        assert!(schema.base_color);
        assert!(schema.transparency);
        assert!(schema.blur_radius);
        assert!(!schema.blur_strength);
    }

    #[test]
    fn test_schema_ignores_other_structs() {
        let source = r"
            struct Other {
                base_color: vec4<f32>,
            }
            struct WaterUniforms {
                time: f32,
            }
        ";
        assert_eq!(
            UniformSchema::from_wgsl(source).unwrap(),
            UniformSchema::REQUIRED_ONLY
        );
    }

    #[test]
    fn test_schema_without_uniform_struct() {
        let schema = UniformSchema::from_wgsl("fn noop() {}").unwrap();
        assert_eq!(schema, UniformSchema::REQUIRED_ONLY);
    }

    #[test]
    fn test_schema_rejects_invalid_wgsl() {
        let err = UniformSchema::from_wgsl("struct WaterUniforms { time f32 }").unwrap_err();
        assert!(matches!(err, RenderError::ShaderParse(_)));
    }

    impl WaterUniforms {
        fn zeroed_for_test() -> Self {
            bytemuck::Zeroable::zeroed()
        }
    }
}
