use std::f32::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Ambient and spot light parameters.
pub struct LightingOptions {
    /// Ambient light intensity.
    pub ambient: f32,
    /// Spot light position in world space.
    pub spot_position: [f32; 3],
    /// Point the spot light is aimed at.
    pub spot_target: [f32; 3],
    /// Spot cone half-angle in radians.
    pub spot_angle: f32,
    /// Fraction of the cone that fades out toward its edge (0..=1).
    pub spot_penumbra: f32,
    /// Distance falloff exponent; 0 disables falloff.
    pub spot_decay: f32,
    /// Spot light intensity.
    pub spot_intensity: f32,
    /// Whether the spot light casts shadows.
    pub cast_shadows: bool,
    /// Shadow map edge length in texels.
    pub shadow_map_size: u32,
    /// Depth bias applied to shadow comparisons.
    pub shadow_bias: f32,
}

impl Default for LightingOptions {
    fn default() -> Self {
        Self {
            ambient: FRAC_PI_2,
            spot_position: [-10.0, 20.0, 20.0],
            spot_target: [0.0; 3],
            spot_angle: 0.15,
            spot_penumbra: 1.0,
            spot_decay: 0.0,
            spot_intensity: 2.0,
            cast_shadows: true,
            shadow_map_size: 512,
            shadow_bias: 0.0005,
        }
    }
}
