use serde::{Deserialize, Serialize};

/// Tone mapping operator applied in the composite pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToneMapping {
    /// Clamp to [0, 1] after exposure.
    #[default]
    Clamp,
    /// ACES filmic curve.
    AcesFilmic,
}

impl ToneMapping {
    /// Shader-side selector.
    #[must_use]
    pub fn as_u32(self) -> u32 {
        match self {
            Self::Clamp => 0,
            Self::AcesFilmic => 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Ambient occlusion, bloom and tone mapping parameters.
pub struct PostProcessingOptions {
    /// Whether the SSAO pass runs.
    pub ssao_enabled: bool,
    /// SSAO sampling radius in view-space units.
    pub ao_radius: f32,
    /// SSAO darkening strength.
    pub ao_intensity: f32,
    /// Depth bias against self-occlusion.
    pub ao_bias: f32,
    /// Whether the bloom pass runs.
    pub bloom_enabled: bool,
    /// Luminance above which pixels bloom.
    pub bloom_threshold: f32,
    /// Width of the soft knee around the threshold.
    pub bloom_smoothing: f32,
    /// Number of mip levels in the bloom chain.
    pub bloom_levels: u32,
    /// Bloom contribution in the composite.
    pub bloom_intensity: f32,
    /// Linear exposure multiplier.
    pub exposure: f32,
    /// Tone mapping operator.
    pub tone_mapping: ToneMapping,
}

impl Default for PostProcessingOptions {
    fn default() -> Self {
        Self {
            ssao_enabled: true,
            ao_radius: 1.0,
            ao_intensity: 1.0,
            ao_bias: 0.025,
            bloom_enabled: true,
            bloom_threshold: 2.0,
            bloom_smoothing: 0.025,
            bloom_levels: 7,
            bloom_intensity: 2.0,
            exposure: 1.0,
            tone_mapping: ToneMapping::Clamp,
        }
    }
}
