/// Per-frame motion of the star layers
use std::f64::consts::TAU;

use nalgebra::Vector3;

use crate::transform::RotationState;

/// Tilt amplitude of the sky, in radians
pub const SKY_SWAY: f32 = 0.1;

/// Spin rate of the shooting star layer around z, in radians per second
pub const SHOOTING_STAR_SPIN_RATE: f32 = 0.5;

/// Radius of the shooting star orbit
pub const SHOOTING_STAR_ORBIT: f32 = 500.0;

/// Accumulated animation time
///
/// Both clocks advance by the same delta and never go backwards. They are
/// summed in `f64` so a frame delta still registers after days of running.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeState {
    elapsed: f64,
    shooting_star_elapsed: f64,
}

impl TimeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn shooting_star_elapsed(&self) -> f64 {
        self.shooting_star_elapsed
    }

    /// Advance both clocks, returning the delta actually applied
    ///
    /// Negative and non-finite deltas are applied as zero.
    pub fn advance(&mut self, delta: f32) -> f32 {
        let delta = sanitize_delta(delta);
        self.elapsed += f64::from(delta);
        self.shooting_star_elapsed += f64::from(delta);
        delta
    }
}

pub(crate) fn sanitize_delta(delta: f32) -> f32 {
    if delta.is_finite() && delta > 0.0 {
        delta
    } else {
        0.0
    }
}

/// Sky rotation at `elapsed` seconds
pub fn sky_rotation(elapsed: f64) -> RotationState {
    RotationState::new(
        (elapsed * 0.1).sin() as f32 * SKY_SWAY,
        (elapsed * 0.15).sin() as f32 * SKY_SWAY,
        0.0,
    )
}

/// Shooting star layer offset at `elapsed` seconds of its own clock
pub fn shooting_star_position(elapsed: f64) -> Vector3<f32> {
    Vector3::new(
        (elapsed * 0.5).sin() as f32 * SHOOTING_STAR_ORBIT,
        (elapsed * 0.3).cos() as f32 * SHOOTING_STAR_ORBIT,
        0.0,
    )
}

/// Transforms computed for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransforms {
    pub sky_rotation: RotationState,
    pub shooting_star_rotation: RotationState,
    pub shooting_star_position: Vector3<f32>,
}

/// Computes layer transforms from accumulated time
///
/// Everything is a pure function of time except the shooting star spin,
/// which sums every delta it has been given.
#[derive(Debug, Clone, Default)]
pub struct FrameAnimator {
    spin: f64,
}

impl FrameAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total shooting star rotation around z, unwrapped
    pub fn spin(&self) -> f64 {
        self.spin
    }

    pub fn tick(&mut self, time: &TimeState, delta: f32) -> FrameTransforms {
        self.spin += f64::from(sanitize_delta(delta) * SHOOTING_STAR_SPIN_RATE);
        // Wrapped to one turn so the f32 angle keeps full precision
        let spin = self.spin.rem_euclid(TAU) as f32;

        FrameTransforms {
            sky_rotation: sky_rotation(time.elapsed()),
            shooting_star_rotation: RotationState::new(0.0, 0.0, spin),
            shooting_star_position: shooting_star_position(time.shooting_star_elapsed()),
        }
    }

    /// Drop the accumulated spin
    pub fn reset(&mut self) {
        self.spin = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn run(animator: &mut FrameAnimator, time: &mut TimeState, deltas: &[f32]) -> FrameTransforms {
        let mut last = animator.tick(time, 0.0);
        for &delta in deltas {
            let delta = time.advance(delta);
            last = animator.tick(time, delta);
        }
        last
    }

    #[test]
    fn test_time_state_is_monotonic() {
        let mut time = TimeState::new();
        time.advance(0.5);
        time.advance(-3.0);
        time.advance(f32::NAN);
        time.advance(f32::INFINITY);
        assert!((time.elapsed() - 0.5).abs() < 1e-9);
        assert!((time.shooting_star_elapsed() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_clocks_keep_advancing_after_a_week() {
        let step = 1.0f32 / 60.0;
        let mut time = TimeState::new();
        time.advance(604_800.0);
        let before = time;
        time.advance(step);

        assert!((time.elapsed() - before.elapsed() - f64::from(step)).abs() < 1e-6);
        assert!(
            (time.shooting_star_elapsed() - before.shooting_star_elapsed() - f64::from(step)).abs()
                < 1e-6
        );

        let mut animator = FrameAnimator::new();
        animator.tick(&time, 1_048_576.0);
        let first = animator.tick(&time, step);
        let spin = animator.spin();
        let second = animator.tick(&time, step);

        assert!((animator.spin() - spin - 0.5 * f64::from(step)).abs() < 1e-6);
        assert_ne!(first.shooting_star_rotation.z, second.shooting_star_rotation.z);
    }

    #[test]
    fn test_rendered_spin_stays_within_one_turn() {
        let mut animator = FrameAnimator::new();
        let frame = animator.tick(&TimeState::new(), 40.0);

        assert!((animator.spin() - 20.0).abs() < 1e-9);
        let expected = (20.0f64).rem_euclid(TAU) as f32;
        assert!((frame.shooting_star_rotation.z - expected).abs() < EPS);
    }

    #[test]
    fn test_sky_rotation_formula() {
        for t in [0.0f64, 1.0, 12.5, 100.0, 4321.0] {
            let rotation = sky_rotation(t);
            assert!((rotation.x - ((0.1 * t).sin() * 0.1) as f32).abs() < EPS);
            assert!((rotation.y - ((0.15 * t).sin() * 0.1) as f32).abs() < EPS);
            assert_eq!(rotation.z, 0.0);
        }
    }

    #[test]
    fn test_shooting_star_position_formula() {
        for s in [0.0f64, 0.25, 3.0, 77.7] {
            let position = shooting_star_position(s);
            assert!((position.x - ((0.5 * s).sin() * 500.0) as f32).abs() < 1e-3);
            assert!((position.y - ((0.3 * s).cos() * 500.0) as f32).abs() < 1e-3);
        }
        assert!((shooting_star_position(0.0).y - 500.0).abs() < EPS);
    }

    #[test]
    fn test_time_pure_fields_ignore_history() {
        let mut a = FrameAnimator::new();
        let mut time_a = TimeState::new();
        let from_steps = run(&mut a, &mut time_a, &[0.016; 100]);

        let mut b = FrameAnimator::new();
        let mut time_b = TimeState::new();
        let from_jump = run(&mut b, &mut time_b, &[1.6]);

        assert!((from_steps.sky_rotation.x - from_jump.sky_rotation.x).abs() < EPS);
        assert!((from_steps.sky_rotation.y - from_jump.sky_rotation.y).abs() < EPS);
        assert!((from_steps.shooting_star_position - from_jump.shooting_star_position).norm() < 1e-2);
    }

    #[test]
    fn test_repeated_tick_only_changes_spin() {
        let mut animator = FrameAnimator::new();
        let mut time = TimeState::new();
        time.advance(2.0);

        let first = animator.tick(&time, 0.1);
        let second = animator.tick(&time, 0.1);

        assert_eq!(first.sky_rotation, second.sky_rotation);
        assert_eq!(first.shooting_star_position, second.shooting_star_position);
        assert!((second.shooting_star_rotation.z - first.shooting_star_rotation.z - 0.05).abs() < EPS);
    }

    #[test]
    fn test_spin_is_half_the_delta_sum() {
        let deltas = [0.016, 0.033, 0.1, 0.008, 0.25];
        let mut animator = FrameAnimator::new();
        let frame = run(&mut animator, &mut TimeState::new(), &deltas);

        let sum: f32 = deltas.iter().sum();
        assert!((frame.shooting_star_rotation.z - 0.5 * sum).abs() < EPS);
        assert_eq!(frame.shooting_star_rotation.x, 0.0);
        assert_eq!(frame.shooting_star_rotation.y, 0.0);
    }

    #[test]
    fn test_spin_ignores_delta_order() {
        let mut forward = FrameAnimator::new();
        let a = run(&mut forward, &mut TimeState::new(), &[0.1, 0.2, 0.3]);

        let mut reversed = FrameAnimator::new();
        let b = run(&mut reversed, &mut TimeState::new(), &[0.3, 0.2, 0.1]);

        assert!((a.shooting_star_rotation.z - b.shooting_star_rotation.z).abs() < EPS);
    }

    #[test]
    fn test_spin_depends_on_resets() {
        let mut plain = FrameAnimator::new();
        let mut time = TimeState::new();
        let a = run(&mut plain, &mut time, &[0.2, 0.2]);

        let mut interrupted = FrameAnimator::new();
        let mut time = TimeState::new();
        run(&mut interrupted, &mut time, &[0.2]);
        interrupted.reset();
        let b = run(&mut interrupted, &mut time, &[0.2]);

        assert!((a.shooting_star_rotation.z - 0.2).abs() < EPS);
        assert!((b.shooting_star_rotation.z - 0.1).abs() < EPS);
        // Sky rotation still follows elapsed time, which a reset does not touch
        assert_eq!(a.sky_rotation, b.sky_rotation);
    }
}
