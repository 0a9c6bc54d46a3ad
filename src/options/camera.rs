use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Camera placement, projection and orbit control parameters.
pub struct CameraOptions {
    /// Initial eye position in world space.
    pub position: [f32; 3],
    /// Orbit target.
    pub target: [f32; 3],
    /// Vertical field of view, degrees.
    pub fovy: f32,
    /// Distance to the near plane.
    pub znear: f32,
    /// Distance to the far plane.
    pub zfar: f32,
    /// Scales drag rotation.
    pub rotate_speed: f32,
    /// Scales drag panning.
    pub pan_speed: f32,
    /// Whether scroll input changes the orbit radius.
    pub enable_zoom: bool,
    /// Scales scroll zoom; ignored while zoom is disabled.
    pub zoom_speed: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            position: [15.0, 15.0, 15.0],
            target: [0.0; 3],
            fovy: 20.0,
            znear: 0.1,
            zfar: 1000.0,
            rotate_speed: 1.0,
            pan_speed: 1.0,
            enable_zoom: false,
            zoom_speed: 0.1,
        }
    }
}
