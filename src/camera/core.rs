use glam::{Mat4, Vec3, Vec4Swizzles};

/// Right-handed perspective camera looking from `eye` at `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World-space position.
    pub eye: Vec3,
    /// Point the view is centred on.
    pub target: Vec3,
    /// World up, normally +Y.
    pub up: Vec3,
    /// Width over height.
    pub aspect: f32,
    /// Vertical field of view, degrees.
    pub fovy: f32,
    /// Distance to the near plane.
    pub znear: f32,
    /// Distance to the far plane.
    pub zfar: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
/// Camera state as the shaders see it (`CameraUniform` in `camera.wgsl`).
pub struct CameraUniform {
    /// World → clip matrix.
    pub view_proj: [[f32; 4]; 4],
    /// World → view matrix.
    pub view: [[f32; 4]; 4],
    /// View → clip matrix.
    pub proj: [[f32; 4]; 4],
    /// Clip → view matrix, used to rebuild view positions from depth.
    pub inv_proj: [[f32; 4]; 4],
    /// Eye position.
    pub position: [f32; 3],
    /// Width over height.
    pub aspect: f32,
    /// Near plane distance.
    pub znear: f32,
    /// Far plane distance.
    pub zfar: f32,
    _pad: [f32; 2],
}

impl Camera {
    /// World → view matrix.
    #[must_use]
    pub fn build_view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// View → clip matrix with wgpu's [0, 1] depth range.
    #[must_use]
    pub fn build_projection(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fovy.to_radians(),
            self.aspect,
            self.znear,
            self.zfar,
        )
    }

    /// World → clip matrix.
    #[must_use]
    pub fn build_matrix(&self) -> Mat4 {
        self.build_projection() * self.build_view()
    }

    /// Map a point in normalized device coordinates back to world space.
    ///
    /// `ndc.z` follows the OpenGL convention (near = -1, far = 1) so that a
    /// depth of 0.5 lands at the same place a WebGL scene graph would put
    /// it. Only the cursor ray uses this; rasterization keeps the wgpu
    /// projection.
    #[must_use]
    pub fn unproject(&self, ndc: Vec3) -> Vec3 {
        let gl_proj = Mat4::perspective_rh_gl(
            self.fovy.to_radians(),
            self.aspect,
            self.znear,
            self.zfar,
        );
        let inverse = self.build_view().inverse() * gl_proj.inverse();
        let world = inverse * ndc.extend(1.0);
        world.xyz() / world.w
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraUniform {
    /// Identity matrices until the first [`update_view_proj`](Self::update_view_proj).
    #[must_use]
    pub fn new() -> Self {
        let identity = Mat4::IDENTITY.to_cols_array_2d();
        Self {
            view_proj: identity,
            view: identity,
            proj: identity,
            inv_proj: identity,
            position: [0.0; 3],
            aspect: 1.6,
            znear: 0.1,
            zfar: 1000.0,
            _pad: [0.0; 2],
        }
    }

    /// Copy `camera` into the uniform.
    pub fn update_view_proj(&mut self, camera: &Camera) {
        let proj = camera.build_projection();
        *self = Self {
            view_proj: camera.build_matrix().to_cols_array_2d(),
            view: camera.build_view().to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            inv_proj: proj.inverse().to_cols_array_2d(),
            position: camera.eye.to_array(),
            aspect: camera.aspect,
            znear: camera.znear,
            zfar: camera.zfar,
            _pad: [0.0; 2],
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera {
            eye: Vec3::new(15.0, 15.0, 15.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 1.5,
            fovy: 20.0,
            znear: 0.1,
            zfar: 1000.0,
        }
    }

    #[test]
    fn unproject_center_lies_on_view_axis() {
        let cam = camera();
        let p = cam.unproject(Vec3::new(0.0, 0.0, 0.5));
        let forward = (cam.target - cam.eye).normalize();
        let along = (p - cam.eye).normalize();
        assert!(along.dot(forward) > 0.9999);
        // Half-way in GL depth sits just past the near plane.
        let dist = p.distance(cam.eye);
        assert!(dist > cam.znear && dist < 1.0, "{dist}");
    }

    #[test]
    fn unproject_gl_near_plane() {
        let cam = camera();
        let p = cam.unproject(Vec3::new(0.0, 0.0, -1.0));
        assert!((p.distance(cam.eye) - cam.znear).abs() < 1e-3);
    }

    #[test]
    fn pointer_right_unprojects_to_camera_right() {
        let cam = camera();
        let center = cam.unproject(Vec3::new(0.0, 0.0, 0.5));
        let right = cam.unproject(Vec3::new(1.0, 0.0, 0.5));
        let cam_right = (cam.target - cam.eye).cross(cam.up).normalize();
        assert!((right - center).dot(cam_right) > 0.0);
    }

    #[test]
    fn wgpu_projection_maps_near_to_zero_depth() {
        let cam = camera();
        let clip = cam.build_projection() * Vec3::new(0.0, 0.0, -cam.znear).extend(1.0);
        assert!((clip.z / clip.w).abs() < 1e-5);
    }

    #[test]
    fn uniform_tracks_camera() {
        let cam = camera();
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&cam);
        assert_eq!(uniform.position, [15.0, 15.0, 15.0]);
        assert_eq!(uniform.aspect, 1.5);
        assert_eq!(size_of::<CameraUniform>() % 16, 0);
    }
}
