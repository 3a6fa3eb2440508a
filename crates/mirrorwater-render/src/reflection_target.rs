//! Offscreen color + depth target for the reflection pass.

/// Color format of the reflection image (standard dynamic range, sRGB).
pub const REFLECTION_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
/// Depth format of the reflection pass (no stencil).
pub const REFLECTION_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Offscreen render surface owned by the reflection renderer.
///
/// The target keeps its identity across resizes: `resize` swaps the backing
/// textures in place and bumps [`generation`](Self::generation) so bind
/// groups that reference the color view know to rebuild.
pub struct ReflectionTarget {
    color_texture: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    width: u32,
    height: u32,
    generation: u64,
    populated: bool,
    disposed: bool,
}

impl ReflectionTarget {
    /// Allocates a target of exactly `width` x `height` pixels.
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (color_texture, color_view, depth_texture, depth_view) =
            Self::create_textures(device, width, height);
        log::info!("reflection target created ({width}x{height})");
        Self {
            color_texture,
            color_view,
            depth_texture,
            depth_view,
            width,
            height,
            generation: 0,
            populated: false,
            disposed: false,
        }
    }

    fn create_textures(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> (wgpu::Texture, wgpu::TextureView, wgpu::Texture, wgpu::TextureView) {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let color_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Reflection Color Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: REFLECTION_COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Reflection Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: REFLECTION_DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

        (color_texture, color_view, depth_texture, depth_view)
    }

    /// Resizes the backing textures in place. A no-op when the size is unchanged.
    ///
    /// Contents are stale until the next reflection pass.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        debug_assert!(!self.disposed, "resize of a disposed reflection target");
        if (width, height) == (self.width, self.height) {
            return;
        }

        let (color_texture, color_view, depth_texture, depth_view) =
            Self::create_textures(device, width, height);
        self.color_texture.destroy();
        self.depth_texture.destroy();
        self.color_texture = color_texture;
        self.color_view = color_view;
        self.depth_texture = depth_texture;
        self.depth_view = depth_view;
        self.width = width;
        self.height = height;
        self.generation += 1;
        self.populated = false;
        log::debug!("reflection target resized to {width}x{height}");
    }

    /// Releases the GPU memory. Any later use is a caller ordering bug.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.color_texture.destroy();
        self.depth_texture.destroy();
        self.disposed = true;
        log::info!("reflection target disposed");
    }

    /// View of the reflection image, for sampling.
    pub fn color_view(&self) -> &wgpu::TextureView {
        debug_assert!(!self.disposed, "use of a disposed reflection target");
        &self.color_view
    }

    /// View of the depth buffer, for the reflection pass.
    pub fn depth_view(&self) -> &wgpu::TextureView {
        debug_assert!(!self.disposed, "use of a disposed reflection target");
        &self.depth_view
    }

    /// The color texture itself.
    pub fn color_texture(&self) -> &wgpu::Texture {
        debug_assert!(!self.disposed, "use of a disposed reflection target");
        &self.color_texture
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Incremented every time the backing textures are replaced.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a reflection pass has written the current backing textures.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    pub(crate) fn mark_populated(&mut self) {
        self.populated = true;
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Drop for ReflectionTarget {
    fn drop(&mut self) {
        self.dispose();
    }
}
