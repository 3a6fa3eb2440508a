//! Gerstner wave field.
//!
//! The surface is the sum of a fixed number of trochoidal wave trains. Each
//! sample yields the horizontal and vertical displacement of a point on the
//! flat base plane together with the surface normal derived from the
//! analytic tangent and binormal.

use std::f32::consts::TAU;
use std::fmt;
use std::str::FromStr;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::WaterError;

/// Gravitational acceleration used for the deep-water dispersion relation.
pub const GRAVITY: f32 = 9.8;

/// Number of wave trains in a [`WaveSet`].
pub const WAVE_COUNT: usize = 3;

/// One trochoidal wave train.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveComponent {
    /// Travel direction in degrees, `[0, 360)`.
    pub direction: f32,
    /// Steepness before the global multiplier is applied (`>= 0`).
    pub steepness: f32,
    /// Crest-to-crest distance in world units (`> 0`).
    pub wavelength: f32,
}

impl WaveComponent {
    /// Creates a wave component.
    #[must_use]
    pub const fn new(direction: f32, steepness: f32, wavelength: f32) -> Self {
        Self {
            direction,
            steepness,
            wavelength,
        }
    }

    /// Unit vector of travel on the XZ plane.
    #[must_use]
    pub fn direction_vector(&self) -> Vec2 {
        let theta = self.direction.to_radians();
        Vec2::new(theta.sin(), -theta.cos())
    }

    /// Sets a single field.
    pub fn set(&mut self, field: WaveParam, value: f32) {
        match field {
            WaveParam::Direction => self.direction = value,
            WaveParam::Steepness => self.steepness = value,
            WaveParam::Wavelength => self.wavelength = value,
        }
    }

    /// Reads a single field.
    #[must_use]
    pub fn get(&self, field: WaveParam) -> f32 {
        match field {
            WaveParam::Direction => self.direction,
            WaveParam::Steepness => self.steepness,
            WaveParam::Wavelength => self.wavelength,
        }
    }
}

/// Names one of the three waves of a [`WaveSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaveKey {
    Wave1,
    Wave2,
    Wave3,
}

impl WaveKey {
    /// All keys in summation order.
    pub const ALL: [WaveKey; WAVE_COUNT] = [WaveKey::Wave1, WaveKey::Wave2, WaveKey::Wave3];

    /// Position of this wave in the summation order.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            WaveKey::Wave1 => 0,
            WaveKey::Wave2 => 1,
            WaveKey::Wave3 => 2,
        }
    }

    /// Key name as used by control layers.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            WaveKey::Wave1 => "wave1",
            WaveKey::Wave2 => "wave2",
            WaveKey::Wave3 => "wave3",
        }
    }
}

impl fmt::Display for WaveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WaveKey {
    type Err = WaterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wave1" => Ok(WaveKey::Wave1),
            "wave2" => Ok(WaveKey::Wave2),
            "wave3" => Ok(WaveKey::Wave3),
            other => Err(WaterError::UnknownWave(other.to_string())),
        }
    }
}

/// A field of a [`WaveComponent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaveParam {
    Direction,
    Steepness,
    Wavelength,
}

impl FromStr for WaveParam {
    type Err = WaterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direction" => Ok(WaveParam::Direction),
            "steepness" => Ok(WaveParam::Steepness),
            "wavelength" => Ok(WaveParam::Wavelength),
            other => Err(WaterError::UnknownWaveField(other.to_string())),
        }
    }
}

/// Ordered set of exactly three named waves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveSet {
    pub wave1: WaveComponent,
    pub wave2: WaveComponent,
    pub wave3: WaveComponent,
}

impl Default for WaveSet {
    fn default() -> Self {
        Self {
            wave1: WaveComponent::new(45.0, 0.008, 30.0),
            wave2: WaveComponent::new(306.0, 0.006, 20.0),
            wave3: WaveComponent::new(196.0, 0.007, 35.0),
        }
    }
}

impl WaveSet {
    /// Returns the wave with the given key.
    #[must_use]
    pub fn get(&self, key: WaveKey) -> &WaveComponent {
        match key {
            WaveKey::Wave1 => &self.wave1,
            WaveKey::Wave2 => &self.wave2,
            WaveKey::Wave3 => &self.wave3,
        }
    }

    /// Returns the wave with the given key mutably.
    pub fn get_mut(&mut self, key: WaveKey) -> &mut WaveComponent {
        match key {
            WaveKey::Wave1 => &mut self.wave1,
            WaveKey::Wave2 => &mut self.wave2,
            WaveKey::Wave3 => &mut self.wave3,
        }
    }

    /// Iterates the waves in summation order.
    pub fn iter(&self) -> impl Iterator<Item = &WaveComponent> {
        [&self.wave1, &self.wave2, &self.wave3].into_iter()
    }

    /// Applies a partial update; every present entry replaces the stored wave wholesale.
    pub fn merge(&mut self, patch: &WaveSetPatch) {
        for key in WaveKey::ALL {
            if let Some(wave) = patch.get(key) {
                *self.get_mut(key) = wave;
            }
        }
    }
}

/// Partial [`WaveSet`], as produced by a control layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveSetPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wave1: Option<WaveComponent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wave2: Option<WaveComponent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wave3: Option<WaveComponent>,
}

impl WaveSetPatch {
    /// Returns the entry for `key`, if present.
    #[must_use]
    pub fn get(&self, key: WaveKey) -> Option<WaveComponent> {
        match key {
            WaveKey::Wave1 => self.wave1,
            WaveKey::Wave2 => self.wave2,
            WaveKey::Wave3 => self.wave3,
        }
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(mut self, key: WaveKey, wave: WaveComponent) -> Self {
        match key {
            WaveKey::Wave1 => self.wave1 = Some(wave),
            WaveKey::Wave2 => self.wave2 = Some(wave),
            WaveKey::Wave3 => self.wave3 = Some(wave),
        }
        self
    }
}

/// Result of evaluating the wave field at one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveSample {
    /// Offset to add to the flat base position `(x, 0, z)`.
    pub displacement: Vec3,
    /// Unit surface normal.
    pub normal: Vec3,
}

impl WaveSample {
    /// Displaced world position of the base point `(x, 0, z)`.
    #[must_use]
    pub fn position(&self, x: f32, z: f32) -> Vec3 {
        Vec3::new(x, 0.0, z) + self.displacement
    }
}

/// Evaluates the wave field at horizontal position `(x, z)` and time `t`.
///
/// Pure: identical inputs always give identical outputs.
#[must_use]
pub fn evaluate(x: f32, z: f32, t: f32, waves: &WaveSet, steepness_multiplier: f32) -> WaveSample {
    let mut displacement = Vec3::ZERO;
    let mut tangent = Vec3::X;
    let mut binormal = Vec3::Z;
    let p = Vec2::new(x, z);

    for wave in waves.iter() {
        let s = wave.steepness * steepness_multiplier;
        let k = TAU / wave.wavelength;
        let c = (GRAVITY / k).sqrt();
        let d = wave.direction_vector();
        let f = k * (d.dot(p) - c * t);
        let a = s / k;
        let (sin_f, cos_f) = f.sin_cos();

        displacement.x += d.y * a * cos_f;
        displacement.y += a * sin_f;
        displacement.z += d.x * a * cos_f;

        tangent.x += -d.x * d.x * s * sin_f;
        tangent.y += d.x * s * cos_f;
        tangent.z += -d.x * d.y * s * sin_f;

        binormal.x += -d.x * d.y * s * sin_f;
        binormal.y += d.y * s * cos_f;
        binormal.z += -d.y * d.y * s * sin_f;
    }

    WaveSample {
        displacement,
        normal: binormal.cross(tangent).normalize(),
    }
}

/// GPU layout of one wave: direction in radians, steepness, wavelength, padding.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct WaveUniform {
    pub direction_rad: f32,
    pub steepness: f32,
    pub wavelength: f32,
    pub _padding: f32,
}

impl From<&WaveComponent> for WaveUniform {
    fn from(wave: &WaveComponent) -> Self {
        Self {
            direction_rad: wave.direction.to_radians(),
            steepness: wave.steepness,
            wavelength: wave.wavelength,
            _padding: 0.0,
        }
    }
}

impl WaveSet {
    /// Packs the set for upload to a uniform buffer.
    #[must_use]
    pub fn to_uniforms(&self) -> [WaveUniform; WAVE_COUNT] {
        [
            WaveUniform::from(&self.wave1),
            WaveUniform::from(&self.wave2),
            WaveUniform::from(&self.wave3),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn flat_set() -> WaveSet {
        WaveSet {
            wave1: WaveComponent::new(45.0, 0.0, 30.0),
            wave2: WaveComponent::new(306.0, 0.0, 20.0),
            wave3: WaveComponent::new(196.0, 0.0, 35.0),
        }
    }

    #[test]
    fn test_origin_at_time_zero_has_no_height() {
        let sample = evaluate(0.0, 0.0, 0.0, &WaveSet::default(), 1.0);
        assert_eq!(sample.displacement.y, 0.0);
    }

    #[test]
    fn test_flat_water_normal_is_up() {
        let sample = evaluate(3.0, -7.5, 12.0, &flat_set(), 1.0);
        assert_eq!(sample.displacement, Vec3::ZERO);
        assert_eq!(sample.normal, Vec3::Y);
    }

    #[test]
    fn test_single_wave_height_matches_closed_form() {
        let mut set = flat_set();
        set.wave1 = WaveComponent::new(90.0, 0.1, 10.0);
        let (x, z, t) = (1.3, 0.4, 0.75);
        let k = TAU / 10.0;
        let c = (GRAVITY / k).sqrt();
        // direction 90 degrees travels along +x
        let f = k * (x - c * t);
        let expected = 0.1 / k * f.sin();
        let sample = evaluate(x, z, t, &set, 1.0);
        assert!((sample.displacement.y - expected).abs() < 1e-5);
    }

    #[test]
    fn test_multiplier_scales_height() {
        let base = evaluate(2.0, 1.0, 0.3, &WaveSet::default(), 1.0);
        let doubled = evaluate(2.0, 1.0, 0.3, &WaveSet::default(), 2.0);
        assert!((doubled.displacement.y - 2.0 * base.displacement.y).abs() < 1e-6);
    }

    #[test]
    fn test_direction_vector() {
        let d = WaveComponent::new(0.0, 0.0, 1.0).direction_vector();
        assert!((d - Vec2::new(0.0, -1.0)).length() < 1e-6);
        let d = WaveComponent::new(90.0, 0.0, 1.0).direction_vector();
        assert!((d - Vec2::new(1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_merge_replaces_whole_wave() {
        let mut set = WaveSet::default();
        let patch = WaveSetPatch::default().with(WaveKey::Wave2, WaveComponent::new(10.0, 0.02, 5.0));
        set.merge(&patch);
        assert_eq!(set.wave2, WaveComponent::new(10.0, 0.02, 5.0));
        assert_eq!(set.wave1, WaveSet::default().wave1);
        assert_eq!(set.wave3, WaveSet::default().wave3);
    }

    #[test]
    fn test_parse_keys_and_fields() {
        assert_eq!("wave3".parse::<WaveKey>().unwrap(), WaveKey::Wave3);
        assert!("wave4".parse::<WaveKey>().is_err());
        assert_eq!("steepness".parse::<WaveParam>().unwrap(), WaveParam::Steepness);
        assert!("speed".parse::<WaveParam>().is_err());
    }

    #[test]
    fn test_patch_deserializes_partial_json() {
        let patch: WaveSetPatch =
            serde_json::from_str(r#"{"wave1":{"direction":10,"steepness":0.01,"wavelength":12}}"#)
                .unwrap();
        assert!(patch.wave1.is_some());
        assert!(patch.wave2.is_none());
    }

    #[test]
    fn test_uniform_packing() {
        let uniforms = WaveSet::default().to_uniforms();
        assert!((uniforms[0].direction_rad - 45f32.to_radians()).abs() < 1e-6);
        assert_eq!(uniforms[1].wavelength, 20.0);
        assert_eq!(std::mem::size_of::<WaveUniform>(), 16);
    }

    fn wave_strategy() -> impl Strategy<Value = WaveComponent> {
        (0.0f32..360.0, 0.0f32..0.02, 1.0f32..60.0)
            .prop_map(|(d, s, l)| WaveComponent::new(d, s, l))
    }

    proptest! {
        #[test]
        fn prop_normal_is_finite_unit(
            w1 in wave_strategy(),
            w2 in wave_strategy(),
            w3 in wave_strategy(),
            m in 0.1f32..10.0,
            x in -50.0f32..50.0,
            z in -50.0f32..50.0,
            t in 0.0f32..1000.0,
        ) {
            let set = WaveSet { wave1: w1, wave2: w2, wave3: w3 };
            let sample = evaluate(x, z, t, &set, m);
            prop_assert!(sample.normal.is_finite());
            prop_assert!((sample.normal.length() - 1.0).abs() < 1e-3);
            prop_assert!(sample.displacement.is_finite());
        }

        #[test]
        fn prop_evaluate_is_deterministic(
            w1 in wave_strategy(),
            x in -50.0f32..50.0,
            z in -50.0f32..50.0,
            t in 0.0f32..1000.0,
        ) {
            let set = WaveSet { wave1: w1, ..WaveSet::default() };
            let a = evaluate(x, z, t, &set, 1.0);
            let b = evaluate(x, z, t, &set, 1.0);
            prop_assert_eq!(a, b);
        }
    }
}
