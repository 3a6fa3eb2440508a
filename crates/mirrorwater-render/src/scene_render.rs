//! Opaque scene drawing shared by the reflection and visible passes.

use glam::{Mat4, Vec3};

use crate::buffer::{
    create_index_buffer, create_uniform_buffer, create_vertex_buffer, uniform_layout_entry,
    write_uniform,
};
use crate::reflection_target::REFLECTION_COLOR_FORMAT;
use crate::scene::{NodeKind, Scene, SceneVertex};

/// Camera uniforms for GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct CameraUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub _padding: f32,
}

impl Default for CameraUniforms {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY, Vec3::new(0.0, 0.0, 5.0))
    }
}

impl CameraUniforms {
    #[must_use]
    pub fn new(view: Mat4, proj: Mat4, position: Vec3) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            view_proj: (proj * view).to_cols_array_2d(),
            camera_pos: position.to_array(),
            _padding: 0.0,
        }
    }
}

/// Per-object uniforms: model transform and flat colour.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

/// Which pass a draw belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Offscreen pass through the mirrored camera.
    Reflection,
    /// The normal pass to the visible framebuffer.
    Visible,
}

struct NodeGpuData {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Draws the opaque nodes of a [`Scene`].
pub struct SceneRenderer {
    camera_bind_group_layout: wgpu::BindGroupLayout,
    object_bind_group_layout: wgpu::BindGroupLayout,
    visible_pipeline: wgpu::RenderPipeline,
    reflection_pipeline: wgpu::RenderPipeline,
    main_camera_buffer: wgpu::Buffer,
    main_camera_bind_group: wgpu::BindGroup,
    reflection_camera_buffer: wgpu::Buffer,
    reflection_camera_bind_group: wgpu::BindGroup,
    nodes: Vec<Option<NodeGpuData>>,
}

impl SceneRenderer {
    /// Creates pipelines for a visible target of `surface_format`.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera Bind Group Layout"),
                entries: &[uniform_layout_entry(
                    0,
                    wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                )],
            });
        let object_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Object Bind Group Layout"),
                entries: &[uniform_layout_entry(
                    0,
                    wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                )],
            });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout, &object_bind_group_layout],
            push_constant_ranges: &[],
        });

        let create_pipeline = |label: &str, format: wgpu::TextureFormat| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<SceneVertex>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
                    }],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..wgpu::PrimitiveState::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: depth_format,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };
        let visible_pipeline = create_pipeline("Scene Pipeline", surface_format);
        let reflection_pipeline = create_pipeline("Scene Reflection Pipeline", REFLECTION_COLOR_FORMAT);

        let create_camera = |label: &str| {
            let buffer = create_uniform_buffer(device, &CameraUniforms::default(), Some(label));
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &camera_bind_group_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            });
            (buffer, bind_group)
        };
        let (main_camera_buffer, main_camera_bind_group) = create_camera("Main Camera");
        let (reflection_camera_buffer, reflection_camera_bind_group) =
            create_camera("Reflection Camera");

        Self {
            camera_bind_group_layout,
            object_bind_group_layout,
            visible_pipeline,
            reflection_pipeline,
            main_camera_buffer,
            main_camera_bind_group,
            reflection_camera_buffer,
            reflection_camera_bind_group,
            nodes: Vec::new(),
        }
    }

    /// Layout of group 0, shared with the water program.
    pub fn camera_bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.camera_bind_group_layout
    }

    /// Camera bind group used by draws in `kind`.
    pub fn camera_bind_group(&self, kind: PassKind) -> &wgpu::BindGroup {
        match kind {
            PassKind::Reflection => &self.reflection_camera_bind_group,
            PassKind::Visible => &self.main_camera_bind_group,
        }
    }

    /// Uploads the camera used by draws in `kind`.
    pub fn write_camera(&self, queue: &wgpu::Queue, kind: PassKind, uniforms: &CameraUniforms) {
        let buffer = match kind {
            PassKind::Reflection => &self.reflection_camera_buffer,
            PassKind::Visible => &self.main_camera_buffer,
        };
        write_uniform(queue, buffer, uniforms);
    }

    /// Creates GPU data for new mesh nodes and refreshes every node's transform.
    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, scene: &Scene) {
        if self.nodes.len() < scene.len() {
            self.nodes.resize_with(scene.len(), || None);
        }

        for (id, node) in scene.iter() {
            let NodeKind::Mesh { mesh, color } = &node.kind else {
                continue;
            };
            let uniforms = ObjectUniforms {
                model: node.transform.to_cols_array_2d(),
                color: color.extend(1.0).to_array(),
            };

            if let Some(gpu) = &self.nodes[id.index()] {
                write_uniform(queue, &gpu.uniform_buffer, &uniforms);
                continue;
            }

            let label = format!("{} uniforms", node.name);
            let uniform_buffer = create_uniform_buffer(device, &uniforms, Some(&label));
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&label),
                layout: &self.object_bind_group_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });
            self.nodes[id.index()] = Some(NodeGpuData {
                vertex_buffer: create_vertex_buffer(device, &mesh.vertices, Some(&node.name)),
                index_buffer: create_index_buffer(device, &mesh.indices, Some(&node.name)),
                index_count: mesh.indices.len() as u32,
                uniform_buffer,
                bind_group,
            });
        }
    }

    /// Records draws for every visible mesh node.
    ///
    /// The water surface is drawn separately by its own program; a water node
    /// left visible during a reflection pass is reported and skipped.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, kind: PassKind, scene: &Scene) {
        pass.set_pipeline(match kind {
            PassKind::Reflection => &self.reflection_pipeline,
            PassKind::Visible => &self.visible_pipeline,
        });
        pass.set_bind_group(0, self.camera_bind_group(kind), &[]);

        for (id, node) in scene.iter() {
            if !node.visible {
                continue;
            }
            match node.kind {
                NodeKind::Water => {
                    if kind == PassKind::Reflection {
                        log::warn!("water node '{}' visible during reflection pass", node.name);
                    }
                }
                NodeKind::Mesh { .. } => {
                    let Some(Some(gpu)) = self.nodes.get(id.index()) else {
                        log::trace!("node '{}' not prepared; skipped", node.name);
                        continue;
                    };
                    pass.set_bind_group(1, &gpu.bind_group, &[]);
                    pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                    pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..gpu.index_count, 0, 0..1);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_uniforms_size() {
        assert_eq!(std::mem::size_of::<CameraUniforms>(), 64 * 3 + 16);
    }

    #[test]
    fn test_object_uniforms_size() {
        assert_eq!(std::mem::size_of::<ObjectUniforms>(), 80);
    }

    #[test]
    fn test_camera_uniforms_view_proj() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 2.0, 4.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(1.0, 1.5, 0.1, 100.0);
        let uniforms = CameraUniforms::new(view, proj, Vec3::new(0.0, 2.0, 4.0));
        assert_eq!(uniforms.view_proj, (proj * view).to_cols_array_2d());
        assert_eq!(uniforms.camera_pos, [0.0, 2.0, 4.0]);
    }
}
