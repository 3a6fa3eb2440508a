//! Opens the interactive water scene. Drag to orbit, scroll to zoom.
//!
//! Run with: cargo run --example live_water

use mirrorwater::*;

fn main() -> Result<()> {
    let viewer = Viewer::new(WaterRenderConfig::default(), WaveSimulationState::default());
    run(viewer, 1280, 720)
}
