//! Water surface mesh and its shader program.
//!
//! The mesh is a flat tessellated plane; all wave motion happens in the
//! vertex stage, driven by the uniforms [`ParameterBridge`] writes.

use crate::buffer::{
    create_index_buffer, create_uniform_buffer, create_vertex_buffer, uniform_layout_entry,
    write_uniform,
};
use crate::error::RenderResult;
use crate::parameter_bridge::{FrameInputs, ParameterBridge, UniformSchema, WaterUniforms};
use crate::reflection_target::{ReflectionTarget, REFLECTION_COLOR_FORMAT};

/// WGSL source of the shipped water program.
pub const WATER_SHADER: &str = include_str!("shaders/water.wgsl");

/// Edge length of the water plane in world units.
pub const PLANE_SIZE: f32 = 20.0;
/// Subdivisions along each edge of the plane.
pub const PLANE_SEGMENTS: u32 = 200;
/// Rest height of the plane, just above the ground to avoid z-fighting.
pub const PLANE_HEIGHT: f32 = 0.01;

/// Vertex of the water plane.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct WaterVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Flat grid geometry in the XZ plane, centred on the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneGeometry {
    pub vertices: Vec<WaterVertex>,
    pub indices: Vec<u32>,
}

impl PlaneGeometry {
    #[must_use]
    pub fn new(size: f32, segments: u32, height: f32) -> Self {
        let segments = segments.max(1);
        let row = segments + 1;
        let step = size / segments as f32;
        let half = size * 0.5;

        let mut vertices = Vec::with_capacity((row * row) as usize);
        for j in 0..row {
            for i in 0..row {
                let u = i as f32 / segments as f32;
                let v = j as f32 / segments as f32;
                vertices.push(WaterVertex {
                    position: [-half + i as f32 * step, height, -half + j as f32 * step],
                    uv: [u, v],
                });
            }
        }

        let mut indices = Vec::with_capacity((segments * segments * 6) as usize);
        for j in 0..segments {
            for i in 0..segments {
                let a = j * row + i;
                let b = a + 1;
                let c = a + row;
                let d = c + 1;
                indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }

        Self { vertices, indices }
    }
}

impl Default for PlaneGeometry {
    fn default() -> Self {
        Self::new(PLANE_SIZE, PLANE_SEGMENTS, PLANE_HEIGHT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoundReflection {
    Placeholder,
    Target(u64),
}

/// GPU resources of the water surface.
pub struct WaterSurface {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    sampler: wgpu::Sampler,
    _placeholder_texture: wgpu::Texture,
    placeholder_view: wgpu::TextureView,
    bound: BoundReflection,
    uniforms: WaterUniforms,
    bridge: ParameterBridge,
}

impl WaterSurface {
    /// Builds the shipped water program.
    pub fn new(
        device: &wgpu::Device,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> RenderResult<Self> {
        Self::with_source(
            device,
            camera_bind_group_layout,
            color_format,
            depth_format,
            WATER_SHADER,
        )
    }

    /// Builds a water program from WGSL `source`.
    ///
    /// The program's optional uniforms are resolved here, once.
    pub fn with_source(
        device: &wgpu::Device,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        source: &str,
    ) -> RenderResult<Self> {
        let schema = UniformSchema::from_wgsl(source)?;
        log::debug!("water program schema: {schema:?}");

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Water Shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Water Bind Group Layout"),
            entries: &[
                uniform_layout_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
                // Reflection map
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Water Pipeline Layout"),
            bind_group_layouts: &[camera_bind_group_layout, &bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Water Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<WaterVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None, // double-sided
                ..wgpu::PrimitiveState::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_format,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let geometry = PlaneGeometry::default();
        let vertex_buffer =
            create_vertex_buffer(device, &geometry.vertices, Some("Water Vertex Buffer"));
        let index_buffer = create_index_buffer(device, &geometry.indices, Some("Water Index Buffer"));

        let uniforms = WaterUniforms::default();
        let uniform_buffer = create_uniform_buffer(device, &uniforms, Some("Water Uniform Buffer"));

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Reflection Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        // Bound until the first reflection target exists.
        let placeholder_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Reflection Placeholder"),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: REFLECTION_COLOR_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let placeholder_view =
            placeholder_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = Self::create_bind_group(
            device,
            &bind_group_layout,
            &uniform_buffer,
            &placeholder_view,
            &sampler,
        );

        Ok(Self {
            pipeline,
            bind_group_layout,
            bind_group,
            uniform_buffer,
            vertex_buffer,
            index_buffer,
            index_count: geometry.indices.len() as u32,
            sampler,
            _placeholder_texture: placeholder_texture,
            placeholder_view,
            bound: BoundReflection::Placeholder,
            uniforms,
            bridge: ParameterBridge::new(schema),
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniform_buffer: &wgpu::Buffer,
        reflection_view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Water Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(reflection_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    /// Generation of the bound reflection target, `None` while the placeholder is bound.
    pub fn bound_reflection(&self) -> Option<u64> {
        match self.bound {
            BoundReflection::Placeholder => None,
            BoundReflection::Target(generation) => Some(generation),
        }
    }

    /// Points the reflection map binding at `target`'s current color view.
    ///
    /// Rebuilds the bind group only when the target's backing texture changed.
    pub fn bind_reflection(&mut self, device: &wgpu::Device, target: Option<&ReflectionTarget>) {
        let wanted = match target {
            Some(t) if !t.is_disposed() => BoundReflection::Target(t.generation()),
            _ => BoundReflection::Placeholder,
        };
        if wanted == self.bound {
            return;
        }

        let view = match (wanted, target) {
            (BoundReflection::Target(_), Some(t)) => t.color_view(),
            _ => &self.placeholder_view,
        };
        self.bind_group = Self::create_bind_group(
            device,
            &self.bind_group_layout,
            &self.uniform_buffer,
            view,
            &self.sampler,
        );
        self.bound = wanted;
        log::debug!("water reflection binding now {wanted:?}");
    }

    /// Runs the parameter bridge and uploads the result.
    pub fn sync(&mut self, queue: &wgpu::Queue, inputs: &FrameInputs<'_>) {
        self.bridge.sync(&mut self.uniforms, inputs);
        write_uniform(queue, &self.uniform_buffer, &self.uniforms);
    }

    /// Records the water draw. Call after opaque geometry.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, camera_bind_group: &wgpu::BindGroup) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, camera_bind_group, &[]);
        pass.set_bind_group(1, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    /// The last uniform block written.
    pub fn uniforms(&self) -> &WaterUniforms {
        &self.uniforms
    }

    pub fn schema(&self) -> UniformSchema {
        self.bridge.schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_counts() {
        let plane = PlaneGeometry::new(20.0, 4, 0.01);
        assert_eq!(plane.vertices.len(), 25);
        assert_eq!(plane.indices.len(), 4 * 4 * 6);
    }

    #[test]
    fn test_plane_extent_and_height() {
        let plane = PlaneGeometry::default();
        let (mut min_x, mut max_x) = (f32::MAX, f32::MIN);
        for v in &plane.vertices {
            min_x = min_x.min(v.position[0]);
            max_x = max_x.max(v.position[0]);
            assert_eq!(v.position[1], PLANE_HEIGHT);
        }
        assert!((min_x + 10.0).abs() < 1e-4);
        assert!((max_x - 10.0).abs() < 1e-4);
        assert_eq!(
            plane.vertices.len(),
            ((PLANE_SEGMENTS + 1) * (PLANE_SEGMENTS + 1)) as usize
        );
    }

    #[test]
    fn test_plane_uv_corners() {
        let plane = PlaneGeometry::new(2.0, 2, 0.0);
        assert_eq!(plane.vertices[0].uv, [0.0, 0.0]);
        assert_eq!(plane.vertices[8].uv, [1.0, 1.0]);
    }

    #[test]
    fn test_plane_indices_in_range() {
        let plane = PlaneGeometry::new(5.0, 7, 0.0);
        let n = plane.vertices.len() as u32;
        assert!(plane.indices.iter().all(|&i| i < n));
    }
}
