use engine::Vec2;
use serde::{Deserialize, Serialize};

const GROUND_CONTACT_EPSILON: f32 = 1.0e-4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct BodyTuning {
    pub mass: f32,
    pub gravity: f32,
    pub gravity_scale: f32,
    pub ground_y: f32,
    pub ground_friction: f32,
}

impl Default for BodyTuning {
    fn default() -> Self {
        Self {
            mass: 1.0,
            gravity: 9.81,
            gravity_scale: 5.0,
            ground_y: 0.0,
            ground_friction: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct StepOutcome {
    /// The body touched the ground this step after being off it.
    pub landed: bool,
}

/// Kinematic body over a flat floor at `ground_y`. Positions are entity centers; `foot_offset` is
/// the distance from center to feet.
#[derive(Debug, Clone)]
pub(crate) struct RigidBody2D {
    velocity: Vec2,
    mass: f32,
    gravity: f32,
    gravity_scale: f32,
    ground_y: f32,
    ground_friction: f32,
    foot_offset: f32,
    grounded: bool,
}

impl RigidBody2D {
    pub(crate) fn new(tuning: &BodyTuning, foot_offset: f32) -> Self {
        Self {
            velocity: Vec2::ZERO,
            mass: tuning.mass,
            gravity: tuning.gravity,
            gravity_scale: tuning.gravity_scale,
            ground_y: tuning.ground_y,
            ground_friction: tuning.ground_friction.max(0.0),
            foot_offset,
            grounded: false,
        }
    }

    pub(crate) fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub(crate) fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    pub(crate) fn add_impulse(&mut self, impulse: Vec2) {
        if self.mass <= f32::EPSILON {
            return;
        }
        self.velocity += impulse * (1.0 / self.mass);
    }

    pub(crate) fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub(crate) fn resting_center_y(&self) -> f32 {
        self.ground_y + self.foot_offset
    }

    pub(crate) fn step(&mut self, dt: f32, position: &mut Vec2) -> StepOutcome {
        if dt <= 0.0 {
            return StepOutcome::default();
        }
        let was_grounded = self.grounded;

        self.velocity.y -= self.gravity * self.gravity_scale * dt;
        *position += self.velocity * dt;

        let rest_y = self.resting_center_y();
        let touching = position.y <= rest_y + GROUND_CONTACT_EPSILON && self.velocity.y <= 0.0;
        if !touching {
            self.grounded = false;
            return StepOutcome::default();
        }

        position.y = rest_y;
        self.velocity.y = 0.0;
        self.velocity.x = Vec2::new(self.velocity.x, 0.0)
            .move_towards(Vec2::ZERO, self.ground_friction * dt)
            .x;
        self.grounded = true;
        StepOutcome {
            landed: !was_grounded,
        }
    }
}
