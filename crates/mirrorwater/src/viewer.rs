//! Per-frame state shared by the windowed app and headless rendering.

use mirrorwater_core::{WaterRenderConfig, WaveSimulationState};
use mirrorwater_render::{Engine, RenderResult};

use crate::demo::DemoScene;

/// The demo scene, the wave simulation and the visual configuration.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub demo: DemoScene,
    pub simulation: WaveSimulationState,
    pub config: WaterRenderConfig,
    last_elapsed: f32,
}

impl Viewer {
    #[must_use]
    pub fn new(config: WaterRenderConfig, simulation: WaveSimulationState) -> Self {
        let mut demo = DemoScene::new();
        demo.update(&simulation);
        Self {
            demo,
            simulation,
            config,
            last_elapsed: 0.0,
        }
    }

    /// Advances the simulation to clock time `elapsed` and updates riders.
    pub fn advance_to(&mut self, elapsed: f32) {
        self.simulation.advance_time(elapsed - self.last_elapsed);
        self.last_elapsed = elapsed;
        self.demo.update(&self.simulation);
    }

    /// Renders one frame to the engine's window.
    pub fn render(&mut self, engine: &mut Engine, elapsed: f32) -> RenderResult<()> {
        engine.render_frame(&mut self.demo.scene, &self.simulation, &self.config, elapsed)
    }

    /// Renders one frame offscreen and returns RGBA pixels.
    pub fn render_offscreen(&mut self, engine: &mut Engine, elapsed: f32) -> RenderResult<Vec<u8>> {
        engine.render_to_rgba(&mut self.demo.scene, &self.simulation, &self.config, elapsed)
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new(WaterRenderConfig::default(), WaveSimulationState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_scales_by_time_speed() {
        let mut viewer = Viewer::default();
        viewer.advance_to(2.0);
        assert!((viewer.simulation.elapsed_time() - 1.0).abs() < 1e-6);
        viewer.advance_to(3.0);
        assert!((viewer.simulation.elapsed_time() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_repeated_time_is_idle() {
        let mut viewer = Viewer::default();
        viewer.advance_to(1.0);
        let t = viewer.simulation.elapsed_time();
        viewer.advance_to(1.0);
        assert_eq!(viewer.simulation.elapsed_time(), t);
    }
}
