//! Wave simulation state owned by the host scene.

use std::ops::RangeInclusive;

use crate::wave::{self, WaveKey, WaveParam, WaveSample, WaveSet, WaveSetPatch};

/// Allowed range of the global steepness multiplier.
pub const STEEPNESS_MULTIPLIER_RANGE: RangeInclusive<f32> = 0.1..=10.0;

/// Allowed range of the global time speed multiplier.
pub const TIME_SPEED_MULTIPLIER_RANGE: RangeInclusive<f32> = 0.1..=5.0;

fn clamp_to(value: f32, range: &RangeInclusive<f32>) -> f32 {
    value.clamp(*range.start(), *range.end())
}

/// Waves, global multipliers and the simulated wave time.
///
/// Every update is a whole-value replacement or a clamped scalar write, so
/// the last writer for a field always wins.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveSimulationState {
    waves: WaveSet,
    steepness_multiplier: f32,
    time_speed_multiplier: f32,
    elapsed_time: f32,
}

impl Default for WaveSimulationState {
    fn default() -> Self {
        Self::new(WaveSet::default())
    }
}

impl WaveSimulationState {
    /// Creates a state with the given waves, multiplier 1, time speed 0.5 and zero time.
    #[must_use]
    pub fn new(waves: WaveSet) -> Self {
        Self {
            waves,
            steepness_multiplier: 1.0,
            time_speed_multiplier: 0.5,
            elapsed_time: 0.0,
        }
    }

    /// The current wave set.
    #[must_use]
    pub fn waves(&self) -> &WaveSet {
        &self.waves
    }

    #[must_use]
    pub fn steepness_multiplier(&self) -> f32 {
        self.steepness_multiplier
    }

    #[must_use]
    pub fn time_speed_multiplier(&self) -> f32 {
        self.time_speed_multiplier
    }

    /// Simulated wave time in seconds.
    #[must_use]
    pub fn elapsed_time(&self) -> f32 {
        self.elapsed_time
    }

    /// Sets one field of one wave.
    pub fn set_wave_param(&mut self, key: WaveKey, field: WaveParam, value: f32) {
        self.waves.get_mut(key).set(field, value);
    }

    /// Sets one field of one wave addressed by name, e.g. `("wave2", "wavelength")`.
    pub fn set_wave_param_by_name(&mut self, key: &str, field: &str, value: f32) -> crate::Result<()> {
        let key: WaveKey = key.parse()?;
        let field: WaveParam = field.parse()?;
        self.set_wave_param(key, field, value);
        Ok(())
    }

    /// Merges a partial wave set.
    pub fn set_wave_set(&mut self, patch: &WaveSetPatch) {
        self.waves.merge(patch);
    }

    /// Sets the steepness multiplier, clamped to `[0.1, 10]`.
    pub fn set_steepness_multiplier(&mut self, value: f32) {
        self.steepness_multiplier = clamp_to(value, &STEEPNESS_MULTIPLIER_RANGE);
    }

    /// Sets the time speed multiplier, clamped to `[0.1, 5]`.
    pub fn set_time_speed_multiplier(&mut self, value: f32) {
        self.time_speed_multiplier = clamp_to(value, &TIME_SPEED_MULTIPLIER_RANGE);
    }

    /// Advances wave time by `dt` real seconds scaled by the time speed multiplier.
    ///
    /// Negative deltas are ignored so wave time never runs backwards.
    pub fn advance_time(&mut self, dt: f32) {
        if dt > 0.0 {
            self.elapsed_time += dt * self.time_speed_multiplier;
        }
    }

    /// Samples the wave field at `(x, z)` for the current wave time.
    #[must_use]
    pub fn sample(&self, x: f32, z: f32) -> WaveSample {
        wave::evaluate(x, z, self.elapsed_time, &self.waves, self.steepness_multiplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wave::WaveComponent;

    #[test]
    fn test_steepness_multiplier_clamp() {
        let mut state = WaveSimulationState::default();
        state.set_steepness_multiplier(-5.0);
        assert_eq!(state.steepness_multiplier(), 0.1);
        state.set_steepness_multiplier(50.0);
        assert_eq!(state.steepness_multiplier(), 10.0);
        state.set_steepness_multiplier(2.5);
        assert_eq!(state.steepness_multiplier(), 2.5);
    }

    #[test]
    fn test_time_speed_multiplier_clamp() {
        let mut state = WaveSimulationState::default();
        state.set_time_speed_multiplier(0.0);
        assert_eq!(state.time_speed_multiplier(), 0.1);
        state.set_time_speed_multiplier(9.0);
        assert_eq!(state.time_speed_multiplier(), 5.0);
    }

    #[test]
    fn test_advance_time_scales_by_speed() {
        let mut state = WaveSimulationState::default();
        state.advance_time(2.0);
        assert!((state.elapsed_time() - 1.0).abs() < 1e-6);
        state.set_time_speed_multiplier(2.0);
        state.advance_time(0.5);
        assert!((state.elapsed_time() - 2.0).abs() < 1e-6);
        state.advance_time(-1.0);
        assert!((state.elapsed_time() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_set_wave_param_leaves_other_fields() {
        let mut state = WaveSimulationState::default();
        state.set_wave_param(WaveKey::Wave1, WaveParam::Wavelength, 12.0);
        let w = state.waves().wave1;
        assert_eq!(w.wavelength, 12.0);
        assert_eq!(w.direction, 45.0);
        assert_eq!(w.steepness, 0.008);
        assert_eq!(state.waves().wave2, WaveSet::default().wave2);
    }

    #[test]
    fn test_set_wave_param_by_name() {
        let mut state = WaveSimulationState::default();
        state.set_wave_param_by_name("wave3", "direction", 90.0).unwrap();
        assert_eq!(state.waves().wave3.direction, 90.0);
        assert!(state.set_wave_param_by_name("wave9", "direction", 1.0).is_err());
        assert!(state.set_wave_param_by_name("wave1", "phase", 1.0).is_err());
    }

    #[test]
    fn test_last_writer_wins() {
        let mut state = WaveSimulationState::default();
        state.set_wave_param(WaveKey::Wave2, WaveParam::Steepness, 0.5);
        state.set_wave_set(
            &WaveSetPatch::default().with(WaveKey::Wave2, WaveComponent::new(1.0, 0.01, 2.0)),
        );
        assert_eq!(state.waves().wave2.steepness, 0.01);
        state.set_wave_param(WaveKey::Wave2, WaveParam::Steepness, 0.3);
        assert_eq!(state.waves().wave2.steepness, 0.3);
    }

    #[test]
    fn test_sample_uses_state_time() {
        let mut state = WaveSimulationState::default();
        let at_zero = state.sample(0.0, 0.0);
        assert_eq!(at_zero.displacement.y, 0.0);
        state.advance_time(1.0);
        let later = state.sample(0.0, 0.0);
        assert!(later.displacement.y != 0.0);
    }
}
