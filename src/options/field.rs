use serde::{Deserialize, Serialize};

/// Hard ceiling on `max_stride`; 64³ is 262 144 instances.
pub const STRIDE_CEILING: u32 = 64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Cube lattice layout and cursor response.
pub struct FieldOptions {
    /// Spacing between neighbouring cubes as a fraction of the cube size.
    pub gap: f32,
    /// Cubes per lattice edge; the field holds `stride³` instances.
    pub stride: u32,
    /// Radius of cursor influence in world units.
    pub displacement: f32,
    /// Push strength multiplier.
    pub intensity: f32,
    /// Group rotation about +Y in radians per second.
    pub rotation_speed: f32,
    /// Largest stride the field accepts, from presets or the grow command.
    /// Capped at [`STRIDE_CEILING`].
    pub max_stride: u32,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            gap: 0.1,
            stride: 4,
            displacement: 3.0,
            intensity: 1.0,
            rotation_speed: 0.2,
            max_stride: 16,
        }
    }
}

impl FieldOptions {
    /// Upper bound on the stride.
    #[must_use]
    pub fn stride_limit(&self) -> u32 {
        self.max_stride.min(STRIDE_CEILING)
    }

    /// `stride` limited to [`stride_limit`](Self::stride_limit).
    #[must_use]
    pub fn clamped_stride(&self) -> u32 {
        self.stride.min(self.stride_limit())
    }

    /// Number of instances the lattice holds.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        (self.clamped_stride() as usize).pow(3)
    }
}
