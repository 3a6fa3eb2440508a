//! Objects riding the wave field.

use glam::{Mat4, Quat, Vec3};

use crate::simulation::WaveSimulationState;

/// A rigid object resting on the water at a fixed horizontal anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingBody {
    /// Rest position; `y` is the height above the undisturbed surface.
    pub anchor: Vec3,
    /// Scale applied to the sampled wave height.
    pub float_amplitude: f32,
    /// How far the body tilts toward the surface normal (0 = upright, 1 = fully aligned).
    pub tilt_response: f32,
}

impl FloatingBody {
    #[must_use]
    pub fn new(anchor: Vec3) -> Self {
        Self {
            anchor,
            float_amplitude: 1.0,
            tilt_response: 0.5,
        }
    }

    /// World transform for the current wave state.
    #[must_use]
    pub fn transform(&self, state: &WaveSimulationState) -> Mat4 {
        let sample = state.sample(self.anchor.x, self.anchor.z);
        let height = self.anchor.y + sample.displacement.y * self.float_amplitude;
        let up = Vec3::Y.lerp(sample.normal, self.tilt_response.clamp(0.0, 1.0));
        let rotation = Quat::from_rotation_arc(Vec3::Y, up.normalize_or(Vec3::Y));
        Mat4::from_rotation_translation(rotation, Vec3::new(self.anchor.x, height, self.anchor.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wave::WaveSet;

    #[test]
    fn test_calm_water_keeps_anchor() {
        let mut state = WaveSimulationState::new(WaveSet::default());
        for key in crate::wave::WaveKey::ALL {
            state.set_wave_param(key, crate::wave::WaveParam::Steepness, 0.0);
        }
        state.advance_time(3.0);
        let body = FloatingBody::new(Vec3::new(1.0, 0.1, -2.0));
        let m = body.transform(&state);
        let p = m.transform_point3(Vec3::ZERO);
        assert!((p - body.anchor).length() < 1e-6);
    }

    #[test]
    fn test_body_follows_wave_height() {
        let mut state = WaveSimulationState::default();
        state.set_steepness_multiplier(10.0);
        state.advance_time(1.7);
        let body = FloatingBody::new(Vec3::new(0.5, 0.0, 0.5));
        let expected = state.sample(0.5, 0.5).displacement.y;
        let p = body.transform(&state).transform_point3(Vec3::ZERO);
        assert!((p.y - expected).abs() < 1e-5);
    }
}
