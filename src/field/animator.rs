//! Per-frame cursor response of the cube field.

use glam::{Mat4, Vec2, Vec3};

use super::lattice::lattice_positions;
use crate::camera::core::Camera;
use crate::options::FieldOptions;
use crate::util::damping::{damp3, damp_color};

/// Smooth time for color changes, in seconds.
pub const COLOR_SMOOTH_TIME: f32 = 0.1;
/// Smooth time for position changes, in seconds.
pub const POSITION_SMOOTH_TIME: f32 = 0.2;
/// Color instances return to when the cursor is far away.
pub const REST_COLOR: Vec3 = Vec3::ONE;

/// Depth at which the pointer is unprojected (OpenGL NDC).
const POINTER_DEPTH: f32 = 0.5;

/// Host state handed to the animator once per frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    /// Pointer position in normalized device coordinates. Not clamped.
    pub pointer: Vec2,
    /// Camera the pointer is unprojected through.
    pub camera: &'a Camera,
    /// Seconds since the clock started.
    pub elapsed: f32,
}

/// Mutable per-instance state, stored contiguously in lattice order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceState {
    /// Rest position from the lattice.
    pub base_position: Vec3,
    /// Smoothed position.
    pub position: Vec3,
    /// Smoothed linear RGB color.
    pub color: Vec3,
    /// Damping velocity of `position`.
    pub position_velocity: Vec3,
    /// Damping velocity of `color`.
    pub color_velocity: Vec3,
}

impl InstanceState {
    fn at_rest(base_position: Vec3) -> Self {
        Self {
            base_position,
            position: base_position,
            color: REST_COLOR,
            position_velocity: Vec3::ZERO,
            color_velocity: Vec3::ZERO,
        }
    }
}

/// Where one instance is heading this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceTarget {
    /// Target position.
    pub position: Vec3,
    /// Target linear RGB color.
    pub color: Vec3,
}

impl InstanceTarget {
    /// Evaluate the cursor response for instance `index` at `base`.
    ///
    /// Inside `displacement` the instance is pushed radially away from the
    /// cursor by `(displacement − dist)·intensity` plus a per-instance
    /// shimmer. The tint starts slightly outside that radius.
    #[must_use]
    pub fn compute(
        index: usize,
        base: Vec3,
        cursor: Vec3,
        elapsed: f32,
        displacement: f32,
        intensity: f32,
    ) -> Self {
        let dist = base.distance(cursor);
        let dist_inv = displacement - dist;

        let color = if dist > displacement * 1.1 {
            REST_COLOR
        } else {
            let col = dist_inv.max(0.5) / 1.5;
            Vec3::new(col / 2.0, col * 2.0, col * 4.0)
        };

        let position = if dist > displacement {
            base
        } else {
            let wobble = 1.0 + (elapsed * 2.0 + 1000.0 * index as f32).sin();
            let dir = (base - cursor).normalize_or_zero();
            base + dir * (dist_inv * intensity + wobble / 4.0)
        };

        Self { position, color }
    }
}

/// World-space point under the pointer, at the camera's distance from the
/// origin beyond the unprojected point.
#[must_use]
pub fn cursor_target(pointer: Vec2, camera: &Camera) -> Vec3 {
    let point = camera.unproject(pointer.extend(POINTER_DEPTH));
    let dir = (point - camera.eye).normalize_or_zero();
    point + dir * camera.eye.length()
}

/// Owns the instance arena and advances it every frame.
#[derive(Debug, Clone)]
pub struct FieldAnimator {
    gap: f32,
    stride: u32,
    displacement: f32,
    intensity: f32,
    rotation_speed: f32,
    rotating: bool,
    rotation_y: f32,
    cursor: Vec3,
    positions: Vec<Vec3>,
    instances: Vec<InstanceState>,
}

impl FieldAnimator {
    /// Build the lattice described by `options` with every instance at rest.
    /// The stride is clamped to the options' stride limit.
    #[must_use]
    pub fn new(options: &FieldOptions) -> Self {
        let stride = options.clamped_stride();
        let mut animator = Self {
            gap: options.gap,
            stride,
            displacement: options.displacement,
            intensity: options.intensity,
            rotation_speed: options.rotation_speed,
            rotating: true,
            rotation_y: 0.0,
            cursor: Vec3::ZERO,
            positions: Vec::new(),
            instances: Vec::new(),
        };
        animator.rebuild(stride, options.gap);
        animator
    }

    /// Replace the lattice and reset every instance to its base position,
    /// white, with zero velocity.
    pub fn rebuild(&mut self, stride: u32, gap: f32) {
        self.stride = stride;
        self.gap = gap;
        self.positions = lattice_positions(stride, gap);
        self.instances = self
            .positions
            .iter()
            .copied()
            .map(InstanceState::at_rest)
            .collect();
        log::info!(
            "cube field rebuilt: stride {stride}, gap {gap}, {} instances",
            self.instances.len()
        );
    }

    /// Apply new field options. Returns `true` when the lattice was rebuilt.
    pub fn set_options(&mut self, options: &FieldOptions) -> bool {
        self.displacement = options.displacement;
        self.intensity = options.intensity;
        self.rotation_speed = options.rotation_speed;
        let stride = options.clamped_stride();
        if stride != options.stride {
            log::warn!(
                "stride {} exceeds limit {}, using {stride}",
                options.stride,
                options.stride_limit()
            );
        }
        if stride != self.stride || options.gap != self.gap {
            self.rebuild(stride, options.gap);
            return true;
        }
        false
    }

    /// Advance one frame using host-provided pointer, camera and clock.
    pub fn update(&mut self, frame: &FrameContext<'_>, dt: f32) {
        let cursor = cursor_target(frame.pointer, frame.camera);
        self.step(cursor, frame.elapsed, dt);
    }

    /// Advance one frame against an already computed cursor target.
    pub fn step(&mut self, cursor: Vec3, elapsed: f32, dt: f32) {
        debug_assert_eq!(self.positions.len(), self.instances.len());
        self.cursor = cursor;
        if self.rotating {
            self.rotation_y += self.rotation_speed * dt;
        }

        for (index, instance) in self.instances.iter_mut().enumerate() {
            let target = InstanceTarget::compute(
                index,
                instance.base_position,
                cursor,
                elapsed,
                self.displacement,
                self.intensity,
            );
            let _ = damp_color(
                &mut instance.color,
                &mut instance.color_velocity,
                target.color,
                COLOR_SMOOTH_TIME,
                dt,
            );
            let _ = damp3(
                &mut instance.position,
                &mut instance.position_velocity,
                target.position,
                POSITION_SMOOTH_TIME,
                dt,
            );
        }
    }

    /// Pause or resume the group rotation. Returns the new state.
    pub fn toggle_rotation(&mut self) -> bool {
        self.rotating = !self.rotating;
        self.rotating
    }

    /// Parent transform applied to every instance.
    #[must_use]
    pub fn group_transform(&self) -> Mat4 {
        Mat4::from_rotation_y(self.rotation_y)
    }

    /// Group rotation about +Y in radians.
    #[must_use]
    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    /// Cursor target used by the most recent frame.
    #[must_use]
    pub fn cursor(&self) -> Vec3 {
        self.cursor
    }

    /// Instance state in lattice order.
    #[must_use]
    pub fn instances(&self) -> &[InstanceState] {
        &self.instances
    }

    /// Base positions in lattice order.
    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Cubes per lattice edge.
    #[must_use]
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Spacing between cubes.
    #[must_use]
    pub fn gap(&self) -> f32 {
        self.gap
    }

    /// Number of instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether the field holds no instances (`stride == 0`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::lattice::lattice_index;
    use crate::options::STRIDE_CEILING;

    const DT: f32 = 1.0 / 60.0;

    fn options(stride: u32) -> FieldOptions {
        FieldOptions {
            stride,
            ..FieldOptions::default()
        }
    }

    fn far_away() -> Vec3 {
        Vec3::splat(1000.0)
    }

    fn default_camera() -> Camera {
        Camera {
            eye: Vec3::new(15.0, 15.0, 15.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 1.6,
            fovy: 20.0,
            znear: 0.1,
            zfar: 1000.0,
        }
    }

    #[test]
    fn stride_four_matches_closed_form() {
        let animator = FieldAnimator::new(&options(4));
        assert_eq!(animator.len(), 64);
        let pitch = 1.1_f32;
        let offset = 3.0 * pitch / 2.0;
        for x in 0..4 {
            for y in 0..4 {
                for z in 0..4 {
                    let expected = Vec3::new(
                        x as f32 * pitch - offset,
                        y as f32 * pitch - offset,
                        z as f32 * pitch - offset,
                    );
                    let got = animator.positions()[lattice_index(4, x, y, z)];
                    assert!(got.distance(expected) < 1e-5);
                }
            }
        }
    }

    #[test]
    fn nearest_instance_gets_largest_push() {
        let animator = FieldAnimator::new(&options(4));
        let cursor = Vec3::ZERO;
        let pushes: Vec<(f32, f32)> = animator
            .positions()
            .iter()
            .enumerate()
            .map(|(i, &base)| {
                let target = InstanceTarget::compute(i, base, cursor, 0.0, 3.0, 1.0);
                (base.distance(cursor), target.position.distance(base))
            })
            .collect();
        let nearest = pushes.iter().map(|p| p.0).fold(f32::INFINITY, f32::min);
        let (dist_of_max, _) = pushes
            .iter()
            .copied()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();
        assert!((dist_of_max - nearest).abs() < 1e-5);
    }

    #[test]
    fn far_instances_are_white_and_unpushed() {
        let displacement = 3.0;
        let cursor = Vec3::new(0.3, -0.2, 0.1);
        for (i, base) in lattice_positions(6, 0.1)
            .into_iter()
            .enumerate()
        {
            let target =
                InstanceTarget::compute(i, base, cursor, 1.7, displacement, 1.0);
            let dist = base.distance(cursor);
            if dist > displacement * 1.1 {
                assert_eq!(target.color, REST_COLOR);
            }
            if dist > displacement {
                assert_eq!(target.position, base);
            } else {
                assert_ne!(target.color, REST_COLOR);
            }
        }
    }

    #[test]
    fn tint_floor_is_one_third() {
        // dist inside 1.1·displacement but with dist_inv below 0.5
        let target =
            InstanceTarget::compute(0, Vec3::new(3.2, 0.0, 0.0), Vec3::ZERO, 0.0, 3.0, 1.0);
        let col = 0.5 / 1.5;
        assert!(target.color.distance(Vec3::new(col / 2.0, col * 2.0, col * 4.0)) < 1e-6);
    }

    #[test]
    fn zero_displacement_is_not_special_cased() {
        let at_cursor = InstanceTarget::compute(0, Vec3::ZERO, Vec3::ZERO, 0.0, 0.0, 1.0);
        assert_eq!(at_cursor.position, Vec3::ZERO);
        let col = 0.5 / 1.5;
        assert_eq!(at_cursor.color, Vec3::new(col / 2.0, col * 2.0, col * 4.0));

        let elsewhere =
            InstanceTarget::compute(1, Vec3::X, Vec3::ZERO, 0.0, 0.0, 1.0);
        assert_eq!(elsewhere.color, REST_COLOR);
        assert_eq!(elsewhere.position, Vec3::X);
    }

    #[test]
    fn fixed_point_is_idempotent() {
        let mut animator = FieldAnimator::new(&options(4));
        let before = animator.instances().to_vec();
        animator.step(far_away(), 0.0, DT);
        for (a, b) in before.iter().zip(animator.instances()) {
            assert!(a.position.distance(b.position) < 1e-6);
            assert!(a.color.distance(b.color) < 1e-6);
        }
    }

    #[test]
    fn damping_contracts_toward_targets() {
        let mut animator = FieldAnimator::new(&options(4));
        let cursor = Vec3::new(0.2, 0.1, 0.0);
        let elapsed = 0.5;
        let targets: Vec<InstanceTarget> = animator
            .positions()
            .iter()
            .enumerate()
            .map(|(i, &b)| InstanceTarget::compute(i, b, cursor, elapsed, 3.0, 1.0))
            .collect();
        let gaps = |a: &FieldAnimator| -> Vec<(f32, f32)> {
            a.instances()
                .iter()
                .zip(&targets)
                .map(|(s, t)| (s.position.distance(t.position), s.color.distance(t.color)))
                .collect()
        };

        let mut last = gaps(&animator);
        for _ in 0..30 {
            animator.step(cursor, elapsed, DT);
            let now = gaps(&animator);
            for (before, after) in last.iter().zip(&now) {
                assert!(after.0 < before.0 || after.0 == 0.0);
                assert!(after.1 < before.1 || after.1 == 0.0);
            }
            last = now;
        }
    }

    #[test]
    fn zero_dt_leaves_state_unchanged() {
        let mut animator = FieldAnimator::new(&options(4));
        animator.step(Vec3::ZERO, 0.3, DT);
        let before = animator.instances().to_vec();
        let rotation = animator.rotation_y();
        animator.step(Vec3::new(1.0, 2.0, 3.0), 0.9, 0.0);
        assert_eq!(animator.instances(), before.as_slice());
        assert_eq!(animator.rotation_y(), rotation);
        assert!(animator
            .instances()
            .iter()
            .all(|s| s.position.is_finite() && s.color.is_finite()));
    }

    #[test]
    fn rebuild_resets_state() {
        let mut animator = FieldAnimator::new(&options(4));
        for _ in 0..10 {
            animator.step(Vec3::ZERO, 0.1, DT);
        }
        assert!(animator.instances().iter().any(|s| s.color != REST_COLOR));

        let rebuilt = animator.set_options(&options(5));
        assert!(rebuilt);
        assert_eq!(animator.len(), 125);
        assert_eq!(animator.positions().len(), 125);
        for state in animator.instances() {
            assert_eq!(state.position, state.base_position);
            assert_eq!(state.color, REST_COLOR);
            assert_eq!(state.position_velocity, Vec3::ZERO);
            assert_eq!(state.color_velocity, Vec3::ZERO);
        }
    }

    #[test]
    fn non_structural_options_keep_state() {
        let mut animator = FieldAnimator::new(&options(3));
        animator.step(Vec3::ZERO, 0.0, DT);
        let before = animator.instances().to_vec();
        let mut opts = options(3);
        opts.intensity = 2.0;
        assert!(!animator.set_options(&opts));
        assert_eq!(animator.instances(), before.as_slice());
    }

    #[test]
    fn oversized_stride_is_clamped_to_limit() {
        let huge = FieldOptions {
            stride: 5000,
            max_stride: 6,
            ..FieldOptions::default()
        };
        let mut animator = FieldAnimator::new(&huge);
        assert_eq!(animator.stride(), 6);
        assert_eq!(animator.len(), 216);

        let mut grown = huge.clone();
        grown.max_stride = 10_000;
        assert!(animator.set_options(&grown));
        assert_eq!(animator.stride(), STRIDE_CEILING);
    }

    #[test]
    fn empty_field_is_valid() {
        let mut animator = FieldAnimator::new(&options(0));
        assert!(animator.is_empty());
        animator.step(Vec3::ZERO, 0.0, DT);
        assert!(animator.is_empty());
    }

    #[test]
    fn group_rotates_at_configured_rate() {
        let mut animator = FieldAnimator::new(&options(2));
        animator.step(far_away(), 0.0, 0.5);
        assert!((animator.rotation_y() - 0.1).abs() < 1e-6);
        assert!(!animator.toggle_rotation());
        animator.step(far_away(), 0.0, 0.5);
        assert!((animator.rotation_y() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn cursor_ray_lands_past_origin() {
        let camera = default_camera();
        let cursor = cursor_target(Vec2::ZERO, &camera);
        let eye_dist = camera.eye.length();
        let from_eye = cursor.distance(camera.eye);
        assert!(from_eye > eye_dist && from_eye < eye_dist + 1.0);
        let forward = -camera.eye.normalize();
        assert!((cursor - camera.eye).normalize().dot(forward) > 0.9999);
    }

    #[test]
    fn pointer_outside_viewport_still_resolves() {
        let camera = default_camera();
        let cursor = cursor_target(Vec2::new(4.0, -3.0), &camera);
        assert!(cursor.is_finite());
        assert!(cursor.distance(Vec3::ZERO) > 3.0);
    }

    #[test]
    fn update_uses_frame_context() {
        let camera = default_camera();
        let mut animator = FieldAnimator::new(&options(4));
        let frame = FrameContext {
            pointer: Vec2::ZERO,
            camera: &camera,
            elapsed: 0.0,
        };
        animator.update(&frame, DT);
        assert!(animator.cursor().distance(cursor_target(Vec2::ZERO, &camera)) < 1e-6);
        assert!(animator.instances().iter().any(|s| s.color != REST_COLOR));
    }
}
