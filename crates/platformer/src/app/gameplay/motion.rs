use engine::Vec2;
use serde::{Deserialize, Serialize};

/// Kickboard acceleration is this fraction of the on-foot acceleration.
pub(crate) const VEHICLE_ACCEL_SCALE: f32 = 0.8;
/// Kickboard coasting friction is this fraction of the on-foot slide friction.
pub(crate) const VEHICLE_DECEL_SCALE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MotionTuning {
    pub acceleration: f32,
    /// Kept for configuration compatibility; stopping uses `slide_friction`.
    pub deceleration: f32,
    pub max_speed: f32,
    pub vehicle_max_speed: f32,
    pub jump_impulse: f32,
    pub slide_friction: f32,
    /// Knock-back applied by a hurt signal. The x component is pushed away from the facing side.
    pub hurt_impulse: Vec2,
    pub moving_animation_threshold: f32,
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            acceleration: 15.0,
            deceleration: 3.0,
            max_speed: 12.0,
            vehicle_max_speed: 15.0,
            jump_impulse: 20.0,
            slide_friction: 1.5,
            hurt_impulse: Vec2::new(5.0, 1.0),
            moving_animation_threshold: 0.5,
        }
    }
}

impl MotionTuning {
    pub(crate) fn rates(&self, mode: MovementMode) -> BlendRates {
        match mode {
            MovementMode::OnFoot => BlendRates {
                target_speed: self.max_speed,
                accel_rate: self.acceleration,
                decel_rate: self.slide_friction,
            },
            MovementMode::Vehicle => BlendRates {
                target_speed: self.vehicle_max_speed,
                accel_rate: self.acceleration * VEHICLE_ACCEL_SCALE,
                decel_rate: self.slide_friction * VEHICLE_DECEL_SCALE,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum MovementMode {
    #[default]
    OnFoot,
    Vehicle,
}

impl MovementMode {
    pub(crate) fn toggled(self) -> Self {
        match self {
            MovementMode::OnFoot => MovementMode::Vehicle,
            MovementMode::Vehicle => MovementMode::OnFoot,
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            MovementMode::OnFoot => "foot",
            MovementMode::Vehicle => "kickboard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub(crate) fn from_input(input_x: f32) -> Option<Self> {
        if input_x > 0.0 {
            Some(Facing::Right)
        } else if input_x < 0.0 {
            Some(Facing::Left)
        } else {
            None
        }
    }

    pub(crate) fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BlendRates {
    pub target_speed: f32,
    pub accel_rate: f32,
    pub decel_rate: f32,
}

/// Velocity after one step of accelerating toward full speed in the input direction, or of
/// coasting toward rest when there is no input. The change never exceeds `rate * dt`.
pub(crate) fn blend_velocity(current: Vec2, input_x: f32, dt: f32, rates: BlendRates) -> Vec2 {
    let dt = dt.max(0.0);
    if input_x != 0.0 {
        let target = Vec2::new(input_x.signum() * rates.target_speed, 0.0);
        current.move_towards(target, rates.accel_rate * dt)
    } else {
        current.move_towards(Vec2::ZERO, rates.decel_rate * dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_foot() -> BlendRates {
        MotionTuning::default().rates(MovementMode::OnFoot)
    }

    #[test]
    fn vehicle_rates_scale_from_on_foot_tuning() {
        let rates = MotionTuning::default().rates(MovementMode::Vehicle);
        assert_eq!(rates.target_speed, 15.0);
        assert!((rates.accel_rate - 12.0).abs() < 1e-6);
        assert!((rates.decel_rate - 0.75).abs() < 1e-6);
    }

    #[test]
    fn on_foot_stops_with_slide_friction() {
        let rates = on_foot();
        assert_eq!(rates.decel_rate, 1.5);
        let next = blend_velocity(Vec2::new(6.0, 0.0), 0.0, 0.1, rates);
        assert!((next.x - 5.85).abs() < 1e-5);
    }

    #[test]
    fn one_second_of_input_reaches_twelve() {
        let mut velocity = Vec2::ZERO;
        for _ in 0..100 {
            velocity = blend_velocity(velocity, 1.0, 0.01, on_foot());
        }
        assert!((velocity.x - 12.0).abs() < 1e-3);

        let velocity = blend_velocity(Vec2::ZERO, 1.0, 1.0, on_foot());
        assert_eq!(velocity, Vec2::new(12.0, 0.0));
    }

    #[test]
    fn coasting_decreases_speed_without_crossing_zero() {
        let mut velocity = Vec2::new(-3.0, 0.0);
        let mut previous = velocity.length();
        for _ in 0..400 {
            velocity = blend_velocity(velocity, 0.0, 1.0 / 60.0, on_foot());
            let speed = velocity.length();
            assert!(speed <= previous);
            assert!(velocity.x <= 0.0);
            previous = speed;
        }
        assert_eq!(velocity, Vec2::ZERO);
    }

    #[test]
    fn held_input_converges_and_stays_at_target_speed() {
        let mut velocity = Vec2::new(5.0, 0.0);
        for _ in 0..600 {
            velocity = blend_velocity(velocity, -0.3, 1.0 / 60.0, on_foot());
        }
        assert_eq!(velocity, Vec2::new(-12.0, 0.0));
    }

    #[test]
    fn zero_dt_leaves_velocity_unchanged() {
        let velocity = Vec2::new(4.0, 0.0);
        assert_eq!(blend_velocity(velocity, 1.0, 0.0, on_foot()), velocity);
        assert_eq!(blend_velocity(velocity, 0.0, -1.0, on_foot()), velocity);
    }

    #[test]
    fn facing_follows_sign_of_input() {
        assert_eq!(Facing::from_input(0.2), Some(Facing::Right));
        assert_eq!(Facing::from_input(-1.0), Some(Facing::Left));
        assert_eq!(Facing::from_input(0.0), None);
        assert_eq!(MovementMode::OnFoot.toggled(), MovementMode::Vehicle);
    }
}
