//! Renders a rougher sea to `storm_snapshot.png` without opening a window.
//!
//! Run with: cargo run --example storm_snapshot

use mirrorwater::*;

fn main() -> Result<()> {
    let mut simulation = WaveSimulationState::default();
    simulation.set_wave_set(
        &WaveSetPatch::default()
            .with(WaveKey::Wave1, WaveComponent::new(30.0, 0.02, 18.0))
            .with(WaveKey::Wave2, WaveComponent::new(290.0, 0.015, 11.0)),
    );
    simulation.set_steepness_multiplier(3.0);
    simulation.set_time_speed_multiplier(1.5);

    let config = WaterRenderConfig {
        amplitude: 0.2,
        roughness: 0.8,
        tint_color: Some("#2b4a5c".to_string()),
        transparency: None,
        ..WaterRenderConfig::default()
    };

    let mut viewer = Viewer::new(config, simulation);
    render_to_file(&mut viewer, "storm_snapshot.png", 1280, 720, 4.0)?;
    println!("wrote storm_snapshot.png");
    Ok(())
}
