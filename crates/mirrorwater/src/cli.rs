//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use mirrorwater_core::{WaterRenderConfig, WaveSimulationState};

use crate::{MirrorwaterError, Result};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "mirrorwater")]
#[command(about = "Gerstner-wave water with real-time planar reflections", long_about = None)]
pub struct Args {
    /// Water render configuration (JSON, camelCase keys)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Render a single frame to this image instead of opening a window
    #[arg(long, value_name = "FILE")]
    pub headless: Option<PathBuf>,

    /// Viewport width in pixels
    #[arg(long, default_value = "1280")]
    pub width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value = "720")]
    pub height: u32,

    /// Clock time of the headless frame
    #[arg(long, value_name = "SECONDS", default_value = "2.0")]
    pub time: f32,

    /// Global wave steepness multiplier (clamped to 0.1-10)
    #[arg(long, value_name = "FACTOR")]
    pub steepness: Option<f32>,

    /// Simulation speed multiplier (clamped to 0.1-5)
    #[arg(long, value_name = "FACTOR")]
    pub time_speed: Option<f32>,

    /// Wave parameter override, e.g. `wave2.direction=90` (repeatable)
    #[arg(long = "wave", value_name = "KEY.FIELD=VALUE")]
    pub waves: Vec<String>,
}

impl Args {
    /// Loads the config file, or the built-in defaults when none was given.
    pub fn load_config(&self) -> Result<WaterRenderConfig> {
        match &self.config {
            Some(path) => {
                log::info!("loading config from {}", path.display());
                Ok(WaterRenderConfig::from_json_file(path)?)
            }
            None => Ok(WaterRenderConfig::default()),
        }
    }

    /// Builds the wave simulation with every override applied in order.
    pub fn simulation(&self) -> Result<WaveSimulationState> {
        let mut simulation = WaveSimulationState::default();
        if let Some(steepness) = self.steepness {
            simulation.set_steepness_multiplier(steepness);
        }
        if let Some(speed) = self.time_speed {
            simulation.set_time_speed_multiplier(speed);
        }
        for text in &self.waves {
            let (key, field, value) = parse_wave_override(text)?;
            simulation.set_wave_param_by_name(key, field, value)?;
        }
        Ok(simulation)
    }
}

/// Splits `wave1.steepness=0.01` into its key, field and value.
pub fn parse_wave_override(text: &str) -> Result<(&str, &str, f32)> {
    let invalid = || MirrorwaterError::InvalidArgument(format!("expected KEY.FIELD=VALUE, got '{text}'"));
    let (target, value) = text.split_once('=').ok_or_else(invalid)?;
    let (key, field) = target.split_once('.').ok_or_else(invalid)?;
    let value = value.trim().parse::<f32>().map_err(|_| invalid())?;
    Ok((key.trim(), field.trim(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirrorwater_core::{WaveKey, WaveParam};

    #[test]
    fn test_parse_wave_override() {
        let (key, field, value) = parse_wave_override("wave2.direction=90").unwrap();
        assert_eq!((key, field, value), ("wave2", "direction", 90.0));
        assert!(parse_wave_override("wave2direction=90").is_err());
        assert!(parse_wave_override("wave2.direction").is_err());
        assert!(parse_wave_override("wave2.direction=fast").is_err());
    }

    #[test]
    fn test_args_build_simulation() {
        let args = Args::parse_from([
            "mirrorwater",
            "--steepness",
            "50",
            "--wave",
            "wave3.wavelength=12",
            "--wave",
            "wave3.wavelength=14",
        ]);
        let sim = args.simulation().unwrap();
        assert_eq!(sim.steepness_multiplier(), 10.0);
        assert_eq!(sim.waves().get(WaveKey::Wave3).get(WaveParam::Wavelength), 14.0);
    }

    #[test]
    fn test_unknown_wave_key_is_an_error() {
        let args = Args::parse_from(["mirrorwater", "--wave", "wave9.steepness=0.1"]);
        assert!(args.simulation().is_err());
    }

    #[test]
    fn test_defaults_without_config() {
        let args = Args::parse_from(["mirrorwater"]);
        assert_eq!(args.load_config().unwrap(), WaterRenderConfig::default());
        assert_eq!((args.width, args.height), (1280, 720));
        assert!(args.headless.is_none());
    }
}
