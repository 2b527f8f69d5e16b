use engine::{InputAction, InputSnapshot, Transform, Vec2};
use tracing::info;

use super::animator::{
    AnimatorParams, IS_JUMP, IS_KICK_BOARD, IS_RUN, TRIGGER_ATTACK, TRIGGER_DIE, TRIGGER_HURT,
    TRIGGER_IDLE,
};
use super::body::RigidBody2D;
use super::motion::{blend_velocity, Facing, MotionTuning, MovementMode};

/// One tick of player-relevant input. Signals other than the axes are press edges.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct PlayerInput {
    pub horizontal: f32,
    pub vertical: f32,
    pub jump_pressed: bool,
    pub attack_pressed: bool,
    pub hurt_pressed: bool,
    pub die_pressed: bool,
    pub restart_pressed: bool,
    pub toggle_mode_pressed: bool,
}

impl PlayerInput {
    pub(crate) fn from_snapshot(input: &InputSnapshot) -> Self {
        Self {
            horizontal: input.horizontal_axis(),
            vertical: input.vertical_axis(),
            jump_pressed: input.pressed(InputAction::Jump),
            attack_pressed: input.pressed(InputAction::Attack),
            hurt_pressed: input.pressed(InputAction::Hurt),
            die_pressed: input.pressed(InputAction::Die),
            restart_pressed: input.pressed(InputAction::Restart),
            toggle_mode_pressed: input.pressed(InputAction::ToggleKickBoard),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MotionState {
    pub current_velocity: Vec2,
    pub facing: Facing,
    pub is_airborne: bool,
    pub mode: MovementMode,
    pub is_alive: bool,
}

impl Default for MotionState {
    fn default() -> Self {
        Self {
            current_velocity: Vec2::ZERO,
            facing: Facing::Right,
            is_airborne: false,
            mode: MovementMode::OnFoot,
            is_alive: true,
        }
    }
}

#[derive(Debug)]
pub(crate) struct PlayerController {
    tuning: MotionTuning,
    state: MotionState,
    vertical_was_positive: bool,
    animator: AnimatorParams,
}

impl PlayerController {
    pub(crate) fn new(tuning: MotionTuning) -> Self {
        Self {
            tuning,
            state: MotionState::default(),
            vertical_was_positive: false,
            animator: AnimatorParams::default(),
        }
    }

    pub(crate) fn state(&self) -> &MotionState {
        &self.state
    }

    pub(crate) fn animator(&self) -> &AnimatorParams {
        &self.animator
    }

    pub(crate) fn animator_mut(&mut self) -> &mut AnimatorParams {
        &mut self.animator
    }

    /// Runs the per-frame checks in order: restart, then (if alive at that point) hurt, die,
    /// attack, jump, mode toggle and horizontal motion. The alive gate is read once per frame.
    pub(crate) fn update(
        &mut self,
        input: &PlayerInput,
        dt: f32,
        transform: &mut Transform,
        body: &mut RigidBody2D,
    ) {
        let vertical_rising = input.vertical > 0.0 && !self.vertical_was_positive;
        self.vertical_was_positive = input.vertical > 0.0;

        if input.restart_pressed {
            self.restart();
        }
        if !self.state.is_alive {
            return;
        }

        if input.hurt_pressed {
            self.hurt(body);
        }
        if input.die_pressed {
            self.die();
        }
        if input.attack_pressed {
            self.animator.set_trigger(TRIGGER_ATTACK);
        }
        if (input.jump_pressed || vertical_rising) && !self.state.is_airborne {
            self.jump(body);
        }
        if input.toggle_mode_pressed {
            self.toggle_mode();
        }
        self.run(input.horizontal, dt, transform);
    }

    /// Landing signal from the physics collaborator.
    pub(crate) fn on_landed(&mut self) {
        self.state.is_airborne = false;
        self.animator.set_bool(IS_JUMP, false);
    }

    fn restart(&mut self) {
        self.state.mode = MovementMode::OnFoot;
        self.animator.set_bool(IS_KICK_BOARD, false);
        self.animator.set_trigger(TRIGGER_IDLE);
        self.state.is_alive = true;
        info!("player_restarted");
    }

    fn hurt(&mut self, body: &mut RigidBody2D) {
        self.animator.set_trigger(TRIGGER_HURT);
        let knock_back = self.tuning.hurt_impulse;
        let push_x = -self.state.facing.sign() * knock_back.x.abs();
        body.add_impulse(Vec2::new(push_x, knock_back.y));
    }

    fn die(&mut self) {
        self.state.mode = MovementMode::OnFoot;
        self.animator.set_bool(IS_KICK_BOARD, false);
        self.animator.set_trigger(TRIGGER_DIE);
        self.state.is_alive = false;
        info!("player_died");
    }

    fn jump(&mut self, body: &mut RigidBody2D) {
        body.set_velocity(Vec2::ZERO);
        body.add_impulse(Vec2::new(0.0, self.tuning.jump_impulse));
        self.state.is_airborne = true;
        self.animator.set_bool(IS_JUMP, true);
    }

    fn toggle_mode(&mut self) {
        self.state.mode = self.state.mode.toggled();
        let on_vehicle = self.state.mode == MovementMode::Vehicle;
        self.animator.set_bool(IS_KICK_BOARD, on_vehicle);
        info!(mode = self.state.mode.label(), "player_mode_changed");
    }

    fn run(&mut self, input_x: f32, dt: f32, transform: &mut Transform) {
        let on_foot = self.state.mode == MovementMode::OnFoot;
        if on_foot {
            self.animator.set_bool(IS_RUN, false);
        }

        let rates = self.tuning.rates(self.state.mode);
        self.state.current_velocity =
            blend_velocity(self.state.current_velocity, input_x, dt, rates);
        transform.position += self.state.current_velocity * dt.max(0.0);

        if let Some(facing) = Facing::from_input(input_x) {
            self.state.facing = facing;
        }
        transform.scale_x = self.state.facing.sign();

        if on_foot && !self.state.is_airborne {
            let is_moving =
                self.state.current_velocity.length() > self.tuning.moving_animation_threshold;
            if input_x != 0.0 || is_moving {
                self.animator.set_bool(IS_RUN, true);
            }
        }
    }
}
