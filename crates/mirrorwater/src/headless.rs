//! Headless rendering API.
//!
//! Renders the demo scene to an image buffer or file without opening a
//! window. Useful for integration tests and batch screenshots.

use std::path::Path;

use pollster::FutureExt;

use mirrorwater_render::Engine;

use crate::viewer::Viewer;
use crate::Result;

/// Renders one frame of `viewer` at clock time `time` and returns RGBA pixels.
///
/// The returned buffer has `width * height * 4` bytes, row by row from the top.
pub fn render_to_image(viewer: &mut Viewer, width: u32, height: u32, time: f32) -> Result<Vec<u8>> {
    let _ = env_logger::try_init();

    let mut engine = Engine::new_headless(width, height).block_on()?;
    viewer.advance_to(time);
    let pixels = viewer.render_offscreen(&mut engine, time)?;
    engine.dispose();
    Ok(pixels)
}

/// Renders one frame and saves it as PNG or JPEG.
pub fn render_to_file(
    viewer: &mut Viewer,
    path: impl AsRef<Path>,
    width: u32,
    height: u32,
    time: f32,
) -> Result<()> {
    let pixels = render_to_image(viewer, width, height, time)?;
    mirrorwater_render::save_image(path, &pixels, width, height)?;
    Ok(())
}
