//! The engine's complete interactive vocabulary.
//!
//! Every user-facing operation, whether triggered by a key press, a mouse
//! gesture, or a programmatic call, is represented as a `FieldCommand`.
//! Consumers construct commands and pass them to
//! [`FieldRenderEngine::execute`](super::FieldRenderEngine::execute).

use glam::Vec2;

// ── Commands ─────────────────────────────────────────────────────────────

/// A single operation the engine knows how to perform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldCommand {
    // Camera
    /// Orbit the camera by a pixel drag delta.
    RotateCamera {
        /// Drag delta in physical pixels.
        delta: Vec2,
    },
    /// Move the orbit target by a pixel drag delta.
    PanCamera {
        /// Drag delta in physical pixels.
        delta: Vec2,
    },
    /// Change the orbit radius (ignored while zoom is disabled).
    Zoom {
        /// Scroll amount (positive = zoom in).
        delta: f32,
    },
    /// Restore the initial camera orbit.
    RecenterCamera,

    // Field
    /// Rebuild the lattice with an explicit stride.
    SetStride {
        /// Cubes per lattice edge.
        stride: u32,
    },
    /// Add one cube per lattice edge.
    GrowStride,
    /// Remove one cube per lattice edge.
    ShrinkStride,
    /// Pause or resume the group rotation.
    ToggleRotation,
}

impl FieldCommand {
    /// Stride this command asks for, given the current stride and the
    /// configured ceiling. `None` for commands that leave the lattice alone.
    ///
    /// The result is always within `0..=max_stride`.
    #[must_use]
    pub fn target_stride(self, current: u32, max_stride: u32) -> Option<u32> {
        let stride = match self {
            Self::SetStride { stride } => stride,
            Self::GrowStride => current.saturating_add(1),
            Self::ShrinkStride => current.saturating_sub(1),
            _ => return None,
        };
        Some(stride.min(max_stride))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grow_and_shrink_step_by_one() {
        assert_eq!(FieldCommand::GrowStride.target_stride(4, 16), Some(5));
        assert_eq!(FieldCommand::ShrinkStride.target_stride(4, 16), Some(3));
    }

    #[test]
    fn stride_stays_within_bounds() {
        assert_eq!(FieldCommand::GrowStride.target_stride(16, 16), Some(16));
        assert_eq!(FieldCommand::ShrinkStride.target_stride(0, 16), Some(0));
        assert_eq!(
            FieldCommand::SetStride { stride: 40 }.target_stride(4, 16),
            Some(16)
        );
        assert_eq!(FieldCommand::GrowStride.target_stride(u32::MAX, u32::MAX), Some(u32::MAX));
    }

    #[test]
    fn camera_commands_leave_stride_alone() {
        assert_eq!(FieldCommand::RecenterCamera.target_stride(4, 16), None);
        assert_eq!(FieldCommand::ToggleRotation.target_stride(4, 16), None);
        assert_eq!(
            FieldCommand::Zoom { delta: 1.0 }.target_stride(4, 16),
            None
        );
    }
}
