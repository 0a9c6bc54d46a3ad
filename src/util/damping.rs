//! Frame-rate independent critically damped smoothing.
//!
//! Each channel carries its own velocity so repeated calls converge on a
//! moving target without overshoot. The integrator is the usual
//! "smooth damp" approximation of a critically damped spring:
//!
//! ```text
//! ω = 2 / smooth_time
//! x = ω·dt
//! t = 1 / (1 + x + 0.48x² + 0.235x³)
//! ```

use glam::Vec3;

/// Distance below which a channel snaps onto its target.
pub const SNAP_EPSILON: f32 = 0.001;

/// Smallest smooth time accepted; keeps `ω` finite.
const MIN_SMOOTH_TIME: f32 = 0.0001;

/// Damp a single scalar channel toward `target`.
///
/// Returns `true` while the channel is still moving. A non-positive `dt`
/// leaves both `current` and `velocity` untouched.
#[inline]
pub fn damp(
    current: &mut f32,
    velocity: &mut f32,
    target: f32,
    smooth_time: f32,
    dt: f32,
) -> bool {
    if dt <= 0.0 || !dt.is_finite() {
        return false;
    }
    if (*current - target).abs() <= SNAP_EPSILON {
        *current = target;
        return false;
    }

    let omega = 2.0 / smooth_time.max(MIN_SMOOTH_TIME);
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = *current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    // Never step past the target.
    if (target - *current > 0.0) == (output > target) {
        output = target;
        *velocity = 0.0;
    }

    *current = output;
    true
}

/// Damp each component of a vector independently.
///
/// Returns `true` if any component is still moving.
#[inline]
pub fn damp3(
    current: &mut Vec3,
    velocity: &mut Vec3,
    target: Vec3,
    smooth_time: f32,
    dt: f32,
) -> bool {
    let x = damp(&mut current.x, &mut velocity.x, target.x, smooth_time, dt);
    let y = damp(&mut current.y, &mut velocity.y, target.y, smooth_time, dt);
    let z = damp(&mut current.z, &mut velocity.z, target.z, smooth_time, dt);
    x || y || z
}

/// Damp a linear RGB color stored as a vector.
///
/// Channels are damped independently, identical to [`damp3`].
#[inline]
pub fn damp_color(
    current: &mut Vec3,
    velocity: &mut Vec3,
    target: Vec3,
    smooth_time: f32,
    dt: f32,
) -> bool {
    damp3(current, velocity, target, smooth_time, dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dt_leaves_state_untouched() {
        let mut value = 3.0;
        let mut velocity = 1.5;
        assert!(!damp(&mut value, &mut velocity, 10.0, 0.2, 0.0));
        assert_eq!(value, 3.0);
        assert_eq!(velocity, 1.5);
    }

    #[test]
    fn negative_dt_is_ignored() {
        let mut value = Vec3::ONE;
        let mut velocity = Vec3::ZERO;
        let _ = damp3(&mut value, &mut velocity, Vec3::ZERO, 0.1, -0.016);
        assert_eq!(value, Vec3::ONE);
        assert_eq!(velocity, Vec3::ZERO);
    }

    #[test]
    fn fixed_point_is_stable() {
        let mut value = Vec3::new(1.0, -2.0, 0.5);
        let mut velocity = Vec3::ZERO;
        let moving =
            damp3(&mut value, &mut velocity, Vec3::new(1.0, -2.0, 0.5), 0.2, 0.016);
        assert!(!moving);
        assert_eq!(value, Vec3::new(1.0, -2.0, 0.5));
        assert_eq!(velocity, Vec3::ZERO);
    }

    #[test]
    fn distance_strictly_decreases() {
        let target = Vec3::new(4.0, -1.0, 2.0);
        let mut value = Vec3::ZERO;
        let mut velocity = Vec3::ZERO;
        let mut last = value.distance(target);
        for _ in 0..120 {
            let _ = damp3(&mut value, &mut velocity, target, 0.2, 1.0 / 60.0);
            let now = value.distance(target);
            assert!(now < last || now == 0.0, "{now} !< {last}");
            last = now;
        }
        assert!(last < 0.01);
    }

    #[test]
    fn color_channels_converge_without_overshoot() {
        let target = Vec3::new(0.25, 1.0, 2.0);
        let mut color = Vec3::ONE;
        let mut velocity = Vec3::ZERO;
        for _ in 0..240 {
            let _ = damp_color(&mut color, &mut velocity, target, 0.1, 1.0 / 60.0);
            assert!(color.x >= target.x - 1e-6);
            assert!(color.z <= target.z + 1e-6);
        }
        assert!(color.distance(target) < 1e-3);
    }

    #[test]
    fn large_step_clamps_to_target() {
        let mut value = 0.0;
        let mut velocity = 0.0;
        let _ = damp(&mut value, &mut velocity, 1.0, 0.1, 10.0);
        assert!(value <= 1.0);
        assert!(value.is_finite());
    }

    #[test]
    fn snaps_inside_epsilon() {
        let mut value = 1.0005;
        let mut velocity = 0.3;
        assert!(!damp(&mut value, &mut velocity, 1.0, 0.2, 0.016));
        assert_eq!(value, 1.0);
    }
}
