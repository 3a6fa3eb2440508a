//! The rendering engine: device setup, resize handling and the two-pass frame.

use std::sync::Arc;

use mirrorwater_core::{WaterRenderConfig, WaveSimulationState};

use crate::camera::Camera;
use crate::error::{RenderError, RenderResult};
use crate::parameter_bridge::{FrameInputs, ReflectionMatrices};
use crate::reflection_renderer::{clear_color, ReflectionRenderer};
use crate::reflection_target::{ReflectionTarget, REFLECTION_DEPTH_FORMAT};
use crate::scene::Scene;
use crate::scene_render::{CameraUniforms, PassKind, SceneRenderer};
use crate::water_surface::WaterSurface;

/// Depth format of the visible pass.
pub const DEPTH_FORMAT: wgpu::TextureFormat = REFLECTION_DEPTH_FORMAT;

/// The main rendering engine backed by wgpu.
pub struct Engine {
    /// The wgpu instance.
    pub instance: wgpu::Instance,
    /// The wgpu adapter.
    pub adapter: wgpu::Adapter,
    /// The wgpu device.
    pub device: wgpu::Device,
    /// The wgpu queue.
    pub queue: wgpu::Queue,
    /// The render surface (None for headless).
    pub surface: Option<wgpu::Surface<'static>>,
    /// Surface configuration. Headless engines keep one for their offscreen format.
    pub surface_config: wgpu::SurfaceConfiguration,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    /// Main camera.
    pub camera: Camera,
    /// Current viewport width.
    pub width: u32,
    /// Current viewport height.
    pub height: u32,
    scene_renderer: SceneRenderer,
    water: WaterSurface,
    reflection: ReflectionRenderer,
}

impl Engine {
    /// Creates a render engine presenting to `window`.
    pub async fn new_windowed(window: Arc<winit::window::Window>) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..wgpu::InstanceDescriptor::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::AdapterCreationFailed)?;

        let (device, queue) = Self::request_device(&adapter, "mirrorwater device").await?;

        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::SurfaceConfigurationFailed)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        log::info!(
            "windowed engine on {} ({width}x{height}, {surface_format:?})",
            adapter.get_info().name
        );

        Self::assemble(
            instance,
            adapter,
            device,
            queue,
            Some(surface),
            surface_config,
        )
    }

    /// Creates a headless render engine drawing to an offscreen RGBA target.
    pub async fn new_headless(width: u32, height: u32) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..wgpu::InstanceDescriptor::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::AdapterCreationFailed)?;

        let (device, queue) = Self::request_device(&adapter, "mirrorwater device (headless)").await?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        log::info!(
            "headless engine on {} ({}x{})",
            adapter.get_info().name,
            surface_config.width,
            surface_config.height
        );

        Self::assemble(
            instance,
            adapter,
            device,
            queue,
            None,
            surface_config,
        )
    }

    async fn request_device(
        adapter: &wgpu::Adapter,
        label: &str,
    ) -> RenderResult<(wgpu::Device, wgpu::Queue)> {
        let pair = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some(label),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;
        Ok(pair)
    }

    fn assemble(
        instance: wgpu::Instance,
        adapter: wgpu::Adapter,
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface: Option<wgpu::Surface<'static>>,
        surface_config: wgpu::SurfaceConfiguration,
    ) -> RenderResult<Self> {
        let (width, height) = (surface_config.width, surface_config.height);
        let (depth_texture, depth_view) = Self::create_depth_texture(&device, width, height);

        let scene_renderer = SceneRenderer::new(&device, surface_config.format, DEPTH_FORMAT);
        let water = WaterSurface::new(
            &device,
            scene_renderer.camera_bind_group_layout(),
            surface_config.format,
            DEPTH_FORMAT,
        )?;

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            surface,
            surface_config,
            depth_texture,
            depth_view,
            camera: Camera::new(width as f32 / height as f32),
            width,
            height,
            scene_renderer,
            water,
            reflection: ReflectionRenderer::default(),
        })
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    /// Resizes the surface, depth buffer, camera aspect and reflection target.
    ///
    /// Empty sizes (a minimized window) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.width = width;
        self.height = height;
        self.surface_config.width = width;
        self.surface_config.height = height;

        if let Some(ref surface) = self.surface {
            surface.configure(&self.device, &self.surface_config);
        }

        let (depth_texture, depth_view) = Self::create_depth_texture(&self.device, width, height);
        self.depth_texture.destroy();
        self.depth_texture = depth_texture;
        self.depth_view = depth_view;

        self.camera.set_viewport(width, height);
        self.reflection.on_resize(&self.device, width, height);
        log::debug!("engine resized to {width}x{height}");
    }

    /// Returns the current viewport dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn reflection(&self) -> &ReflectionRenderer {
        &self.reflection
    }

    pub fn water_surface(&self) -> &WaterSurface {
        &self.water
    }

    /// Renders and presents one frame to the window surface.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    pub fn render_frame(
        &mut self,
        scene: &mut Scene,
        simulation: &WaveSimulationState,
        config: &WaterRenderConfig,
        elapsed: f32,
    ) -> RenderResult<()> {
        let surface = self.surface.as_ref().ok_or(RenderError::NoSurface)?;
        let output = match surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost or outdated; reconfiguring");
                self.resize(self.width, self.height);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface timeout");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let commands = self.encode_frame(scene, simulation, config, elapsed, &view);
        self.queue.submit(std::iter::once(commands));
        output.present();
        Ok(())
    }

    /// Renders one frame offscreen and returns its RGBA pixels, row by row from the top.
    pub fn render_to_rgba(
        &mut self,
        scene: &mut Scene,
        simulation: &WaveSimulationState,
        config: &WaterRenderConfig,
        elapsed: f32,
    ) -> RenderResult<Vec<u8>> {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Color Texture"),
            size: wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.surface_config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let commands = self.encode_frame(scene, simulation, config, elapsed, &view);
        self.queue.submit(std::iter::once(commands));

        let pixels = self.read_texture(&texture)?;
        texture.destroy();
        Ok(pixels)
    }

    /// Records the whole frame: reflection pass, parameter sync, visible pass.
    fn encode_frame(
        &mut self,
        scene: &mut Scene,
        simulation: &WaveSimulationState,
        config: &WaterRenderConfig,
        elapsed: f32,
        target: &wgpu::TextureView,
    ) -> wgpu::CommandBuffer {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        self.scene_renderer.prepare(&self.device, &self.queue, scene);

        // 1. mirrored pass into the reflection target
        let water = scene.water();
        self.reflection
            .ensure_target(&self.device, self.width, self.height);
        let mirrored = self.reflection.render(
            &self.queue,
            &mut encoder,
            &self.scene_renderer,
            scene,
            &self.camera,
            water,
        );

        // 2. uniforms for the water program
        let target_ready = self
            .reflection
            .target()
            .is_some_and(ReflectionTarget::is_populated);
        self.water.bind_reflection(&self.device, self.reflection.target());
        self.water.sync(
            &self.queue,
            &FrameInputs {
                elapsed,
                config,
                simulation,
                reflection: mirrored.as_ref().map(ReflectionMatrices::from),
                reflection_ready: target_ready,
            },
        );

        // 3. visible pass
        self.scene_renderer.write_camera(
            &self.queue,
            PassKind::Visible,
            &CameraUniforms::new(
                self.camera.view_matrix(),
                self.camera.projection_matrix(),
                self.camera.position,
            ),
        );
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Visible Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(scene.background)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.scene_renderer.draw(&mut pass, PassKind::Visible, scene);
            if water.is_some_and(|id| scene.is_visible(id)) {
                self.water
                    .draw(&mut pass, self.scene_renderer.camera_bind_group(PassKind::Visible));
            }
        }

        encoder.finish()
    }

    fn aligned_bytes_per_row(width: u32) -> u32 {
        let unaligned = width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        unaligned.div_ceil(align) * align
    }

    fn read_texture(&self, texture: &wgpu::Texture) -> RenderResult<Vec<u8>> {
        let bytes_per_row = Self::aligned_bytes_per_row(self.width);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback buffer"),
            size: u64::from(bytes_per_row) * u64::from(self.height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|_| RenderError::BufferMapFailed)?
            .map_err(|_| RenderError::BufferMapFailed)?;

        // strip row padding
        let data = slice.get_mapped_range();
        let row_bytes = (self.width * 4) as usize;
        let mut pixels = Vec::with_capacity(row_bytes * self.height as usize);
        for row in 0..self.height {
            let start = (row * bytes_per_row) as usize;
            pixels.extend_from_slice(&data[start..start + row_bytes]);
        }
        drop(data);
        buffer.unmap();

        Ok(pixels)
    }

    /// Releases the reflection target. Call from the host's shutdown path.
    pub fn dispose(&mut self) {
        self.reflection.dispose();
    }
}
