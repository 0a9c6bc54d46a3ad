use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};
use wgpu::util::DeviceExt;

use crate::camera::core::{Camera, CameraUniform};
use crate::options::CameraOptions;

/// Keeps the polar angle off the poles so `look_at` stays well defined.
const POLAR_EPSILON: f32 = 1e-4;

/// Orbit radius limits when zoom is enabled.
const MIN_RADIUS: f32 = 1.0;
const MAX_RADIUS: f32 = 500.0;

/// Spherical orbit around a target point.
///
/// `theta` is the azimuth measured from +Z toward +X, `phi` the polar angle
/// from +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitState {
    /// Point the camera orbits and looks at.
    pub target: Vec3,
    /// Distance from the target to the eye.
    pub radius: f32,
    /// Azimuth in radians.
    pub theta: f32,
    /// Polar angle in radians, in `(0, π)`.
    pub phi: f32,
}

impl OrbitState {
    /// Derive the orbit that places the eye at `eye` looking at `target`.
    #[must_use]
    pub fn from_eye(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return Self {
                target,
                radius: MIN_RADIUS,
                theta: 0.0,
                phi: PI / 2.0,
            };
        }
        Self {
            target,
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius)
                .clamp(-1.0, 1.0)
                .acos()
                .clamp(POLAR_EPSILON, PI - POLAR_EPSILON),
        }
    }

    /// Current eye position.
    #[must_use]
    pub fn eye(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        self.target
            + self.radius
                * Vec3::new(sin_phi * sin_theta, cos_phi, sin_phi * cos_theta)
    }

    /// Orbit by a pixel drag. A drag across the full viewport height turns
    /// one full revolution at unit speed.
    pub fn rotate(&mut self, delta: Vec2, viewport_height: f32, speed: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        self.theta -= TAU * delta.x / viewport_height * speed;
        self.phi = (self.phi - TAU * delta.y / viewport_height * speed)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
    }

    /// Translate the target in the view plane so the scene follows the
    /// cursor.
    pub fn pan(
        &mut self,
        delta: Vec2,
        viewport_height: f32,
        fovy_degrees: f32,
        speed: f32,
    ) {
        if viewport_height <= 0.0 {
            return;
        }
        let eye = self.eye();
        let forward = (self.target - eye).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);

        let target_distance =
            self.radius * (fovy_degrees.to_radians() / 2.0).tan();
        let scale = 2.0 * target_distance / viewport_height * speed;
        self.target += -right * delta.x * scale + up * delta.y * scale;
    }

    /// Scale the radius; positive `delta` moves closer.
    pub fn zoom(&mut self, delta: f32, speed: f32) {
        self.radius =
            (self.radius * (1.0 - delta * speed)).clamp(MIN_RADIUS, MAX_RADIUS);
    }
}

/// Orbit camera controller owning the camera and its GPU uniform.
pub struct CameraController {
    orbit: OrbitState,
    initial: OrbitState,

    /// Projection and view state derived from the orbit.
    pub camera: Camera,
    /// CPU copy of the uniform.
    pub uniform: CameraUniform,
    /// Uniform buffer bound at group 0 by the scene passes.
    pub buffer: wgpu::Buffer,
    /// Bind group layout for [`Self::bind_group`].
    pub layout: wgpu::BindGroupLayout,
    /// Bind group exposing the camera uniform.
    pub bind_group: wgpu::BindGroup,

    viewport_height: f32,
    rotate_speed: f32,
    pan_speed: f32,
    zoom_speed: f32,
    zoom_enabled: bool,
}

impl CameraController {
    /// Create the controller and its uniform buffer.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        size: (u32, u32),
        options: &CameraOptions,
    ) -> Self {
        let target = Vec3::from_array(options.target);
        let orbit = OrbitState::from_eye(Vec3::from_array(options.position), target);

        let camera = Camera {
            eye: orbit.eye(),
            target,
            up: Vec3::Y,
            aspect: aspect_ratio(size.0, size.1),
            fovy: options.fovy,
            znear: options.znear,
            zfar: options.zfar,
        };

        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera);

        let buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Buffer"),
                contents: bytemuck::cast_slice(&[uniform]),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });

        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX
                        | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("Camera Bind Group"),
        });

        Self {
            orbit,
            initial: orbit,
            camera,
            uniform,
            buffer,
            layout,
            bind_group,
            viewport_height: size.1.max(1) as f32,
            rotate_speed: options.rotate_speed,
            pan_speed: options.pan_speed,
            zoom_speed: options.zoom_speed,
            zoom_enabled: options.enable_zoom,
        }
    }

    /// Current orbit parameters.
    #[must_use]
    pub fn orbit(&self) -> &OrbitState {
        &self.orbit
    }

    /// Push the current camera state to the GPU.
    pub fn update_gpu(&mut self, queue: &wgpu::Queue) {
        self.uniform.update_view_proj(&self.camera);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }

    /// Track a new viewport size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.aspect = aspect_ratio(width, height);
        self.viewport_height = height.max(1) as f32;
    }

    /// Orbit by a pixel drag delta.
    pub fn rotate(&mut self, delta: Vec2) {
        self.orbit
            .rotate(delta, self.viewport_height, self.rotate_speed);
        self.sync_camera();
    }

    /// Pan the orbit target by a pixel drag delta.
    pub fn pan(&mut self, delta: Vec2) {
        self.orbit.pan(
            delta,
            self.viewport_height,
            self.camera.fovy,
            self.pan_speed,
        );
        self.sync_camera();
    }

    /// Change the orbit radius. Returns `false` without touching the camera
    /// when zoom is disabled.
    pub fn zoom(&mut self, delta: f32) -> bool {
        if !self.zoom_enabled {
            return false;
        }
        self.orbit.zoom(delta, self.zoom_speed);
        self.sync_camera();
        true
    }

    /// Return to the orbit the controller was created with.
    pub fn reset(&mut self) {
        self.orbit = self.initial;
        self.sync_camera();
    }

    /// Apply new projection and control settings, restarting the orbit from
    /// the configured eye position.
    pub fn apply_options(&mut self, options: &CameraOptions) {
        let target = Vec3::from_array(options.target);
        self.initial =
            OrbitState::from_eye(Vec3::from_array(options.position), target);
        self.orbit = self.initial;
        self.camera.fovy = options.fovy;
        self.camera.znear = options.znear;
        self.camera.zfar = options.zfar;
        self.rotate_speed = options.rotate_speed;
        self.pan_speed = options.pan_speed;
        self.zoom_speed = options.zoom_speed;
        self.zoom_enabled = options.enable_zoom;
        self.sync_camera();
    }

    fn sync_camera(&mut self) {
        self.camera.eye = self.orbit.eye();
        self.camera.target = self.orbit.target;
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_orbit() -> OrbitState {
        OrbitState::from_eye(Vec3::new(15.0, 15.0, 15.0), Vec3::ZERO)
    }

    #[test]
    fn spherical_round_trip() {
        let orbit = default_orbit();
        assert!((orbit.radius - 15.0 * 3f32.sqrt()).abs() < 1e-4);
        assert!(orbit.eye().distance(Vec3::new(15.0, 15.0, 15.0)) < 1e-3);
    }

    #[test]
    fn rotate_keeps_radius_and_target() {
        let mut orbit = default_orbit();
        orbit.rotate(Vec2::new(120.0, -40.0), 800.0, 1.0);
        assert!((orbit.eye().distance(orbit.target) - orbit.radius).abs() < 1e-3);
        assert_eq!(orbit.target, Vec3::ZERO);
    }

    #[test]
    fn full_height_drag_is_one_revolution() {
        let mut orbit = default_orbit();
        let before = orbit.eye();
        orbit.rotate(Vec2::new(600.0, 0.0), 600.0, 1.0);
        assert!(orbit.eye().distance(before) < 1e-3);
    }

    #[test]
    fn polar_angle_is_clamped() {
        let mut orbit = default_orbit();
        orbit.rotate(Vec2::new(0.0, 10_000.0), 100.0, 1.0);
        assert!(orbit.phi > 0.0 && orbit.phi < PI);
        assert!(orbit.eye().is_finite());
    }

    #[test]
    fn pan_moves_target_in_view_plane() {
        let mut orbit = default_orbit();
        let forward = (orbit.target - orbit.eye()).normalize();
        orbit.pan(Vec2::new(30.0, 10.0), 600.0, 20.0, 1.0);
        assert_ne!(orbit.target, Vec3::ZERO);
        assert!(orbit.target.dot(forward).abs() < 1e-4);
    }

    #[test]
    fn zoom_scales_radius_within_limits() {
        let mut orbit = default_orbit();
        let before = orbit.radius;
        orbit.zoom(1.0, 0.1);
        assert!(orbit.radius < before);
        orbit.zoom(-1000.0, 0.1);
        assert_eq!(orbit.radius, MAX_RADIUS);
    }
}
