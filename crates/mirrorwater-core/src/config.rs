//! Water appearance configuration.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WaterError};

/// Transparency used when the configuration leaves it unset.
pub const DEFAULT_TRANSPARENCY: f32 = 0.8;
/// Tint used when the configuration leaves it unset.
pub const DEFAULT_TINT: Vec3 = Vec3::new(0.12, 0.56, 1.0);
/// Blur radius (reflection texels) used when the configuration leaves it unset.
pub const DEFAULT_BLUR_RADIUS: f32 = 1.5;
/// Blur strength used when the configuration leaves it unset.
pub const DEFAULT_BLUR_STRENGTH: f32 = 0.7;

/// Snapshot of the visual knobs, as supplied by a control layer.
///
/// Ranges are guidance only. Out-of-range values degrade the look but are
/// passed through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterRenderConfig {
    /// Ripple frequency (0.1-10).
    pub frequency: f32,
    /// Ripple amplitude (0-0.5).
    pub amplitude: f32,
    /// Fragment quantization factor (0.5-4).
    pub pixelation: f32,
    /// Reflection contribution (0-1).
    pub reflectivity: f32,
    /// Reflection distortion (0-1).
    pub roughness: f32,
    /// Spatial scale of the distortion noise (0.1-5).
    pub roughness_scale: f32,
    /// Surface opacity (0-1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparency: Option<f32>,
    /// Tint as `#rrggbb`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tint_color: Option<String>,
    /// Reflection blur radius in texels (0-4).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur_radius: Option<f32>,
    /// Mix between sharp and blurred reflection (0-1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur_strength: Option<f32>,
    /// Reserved grazing-angle cutoff in degrees (0-89). Stored and forwarded only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_reflect_angle_deg: Option<f32>,
}

impl Default for WaterRenderConfig {
    fn default() -> Self {
        Self {
            frequency: 2.0,
            amplitude: 0.07,
            pixelation: 1.0,
            reflectivity: 0.7,
            roughness: 0.4,
            roughness_scale: 1.5,
            transparency: Some(0.9),
            tint_color: Some("#15bbeb".to_string()),
            blur_radius: Some(5.0),
            blur_strength: Some(1.0),
            max_reflect_angle_deg: Some(30.0),
        }
    }
}

impl WaterRenderConfig {
    /// Config with only the required knobs set.
    #[must_use]
    pub fn required_only(&self) -> Self {
        Self {
            transparency: None,
            tint_color: None,
            blur_radius: None,
            blur_strength: None,
            max_reflect_angle_deg: None,
            ..self.clone()
        }
    }

    /// Parses a JSON snapshot.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a JSON snapshot from disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serializes to pretty JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Transparency, or [`DEFAULT_TRANSPARENCY`] when unset.
    #[must_use]
    pub fn transparency_or_default(&self) -> f32 {
        self.transparency.unwrap_or(DEFAULT_TRANSPARENCY)
    }

    /// Parsed tint, or [`DEFAULT_TINT`] when unset.
    ///
    /// An unparsable colour string is an error rather than a silent fallback.
    pub fn tint_or_default(&self) -> Result<Vec3> {
        self.tint_color
            .as_deref()
            .map_or(Ok(DEFAULT_TINT), parse_hex_color)
    }

    /// Blur radius, or [`DEFAULT_BLUR_RADIUS`] when unset.
    #[must_use]
    pub fn blur_radius_or_default(&self) -> f32 {
        self.blur_radius.unwrap_or(DEFAULT_BLUR_RADIUS)
    }

    /// Blur strength, or [`DEFAULT_BLUR_STRENGTH`] when unset.
    #[must_use]
    pub fn blur_strength_or_default(&self) -> f32 {
        self.blur_strength.unwrap_or(DEFAULT_BLUR_STRENGTH)
    }
}

/// Parses `#rgb` or `#rrggbb` into a colour with components in `[0, 1]`.
pub fn parse_hex_color(text: &str) -> Result<Vec3> {
    let invalid = || WaterError::InvalidColor(text.to_string());
    let hex = text.trim().strip_prefix('#').ok_or_else(invalid)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    let (r, g, b) = match hex.len() {
        6 => (channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?),
        3 => {
            let short = |i: usize| channel(&hex[i..=i]).map(|v| v * 17);
            (short(0)?, short(1)?, short(2)?)
        }
        _ => return Err(invalid()),
    };

    Ok(Vec3::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WaterRenderConfig::default();
        assert_eq!(config.frequency, 2.0);
        assert_eq!(config.roughness_scale, 1.5);
        assert_eq!(config.blur_radius, Some(5.0));
        assert_eq!(config.max_reflect_angle_deg, Some(30.0));
    }

    #[test]
    fn test_defaults_apply_only_when_absent() {
        let mut config = WaterRenderConfig::default().required_only();
        assert_eq!(config.transparency_or_default(), DEFAULT_TRANSPARENCY);
        assert_eq!(config.blur_radius_or_default(), DEFAULT_BLUR_RADIUS);
        assert_eq!(config.blur_strength_or_default(), DEFAULT_BLUR_STRENGTH);
        assert_eq!(config.tint_or_default().unwrap(), DEFAULT_TINT);

        config.transparency = Some(0.0);
        config.blur_radius = Some(0.0);
        config.blur_strength = Some(0.0);
        assert_eq!(config.transparency_or_default(), 0.0);
        assert_eq!(config.blur_radius_or_default(), 0.0);
        assert_eq!(config.blur_strength_or_default(), 0.0);
    }

    #[test]
    fn test_parse_hex_color() {
        let c = parse_hex_color("#15bbeb").unwrap();
        assert!((c.x - 21.0 / 255.0).abs() < 1e-6);
        assert!((c.y - 187.0 / 255.0).abs() < 1e-6);
        assert!((c.z - 235.0 / 255.0).abs() < 1e-6);
        assert_eq!(parse_hex_color("#fff").unwrap(), Vec3::ONE);
        assert!(parse_hex_color("15bbeb").is_err());
        assert!(parse_hex_color("#12345").is_err());
        assert!(parse_hex_color("#gg0000").is_err());
    }

    #[test]
    fn test_json_uses_camel_case_and_optional_fields() {
        let config = WaterRenderConfig::from_json_str(
            r#"{
                "frequency": 1.0,
                "amplitude": 0.1,
                "pixelation": 2.0,
                "reflectivity": 0.5,
                "roughness": 0.2,
                "roughnessScale": 3.0,
                "maxReflectAngleDeg": 45
            }"#,
        )
        .unwrap();
        assert_eq!(config.roughness_scale, 3.0);
        assert_eq!(config.transparency, None);
        assert_eq!(config.max_reflect_angle_deg, Some(45.0));
    }

    #[test]
    fn test_json_missing_required_field_fails() {
        assert!(WaterRenderConfig::from_json_str(r#"{"frequency": 1.0}"#).is_err());
    }

    #[test]
    fn test_json_roundtrip_keeps_values() {
        let config = WaterRenderConfig::default();
        let json = config.to_json_string().unwrap();
        assert!(json.contains("tintColor"));
        assert_eq!(WaterRenderConfig::from_json_str(&json).unwrap(), config);
    }
}
