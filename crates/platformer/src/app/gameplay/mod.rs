mod animator;
mod body;
mod camera_follow;
mod motion;
mod player;
mod popup;
mod sprite_flip;
mod waypoint;

use engine::{
    EntityId, InputAction, InputSnapshot, RenderableDesc, Scene, SceneCommand, SceneWorld,
    Transform, Vec2,
};
use tracing::{debug, error, info};

pub(crate) use body::BodyTuning;
pub(crate) use camera_follow::CameraFollowSettings;
pub(crate) use motion::MotionTuning;
pub(crate) use popup::PopupSettings;

use self::animator::{IS_JUMP, IS_KICK_BOARD, IS_RUN};
use self::body::RigidBody2D;
use self::camera_follow::CameraFollower;
use self::motion::MovementMode;
use self::player::{PlayerController, PlayerInput};
use self::popup::{PopupManager, PopupSampler, RandomSampler};
use self::sprite_flip::SpriteFlip;
use self::waypoint::WaypointCycler;
use super::config::GameplayConfig;

const PLAYER_HALF_EXTENTS: Vec2 = Vec2::new(0.4, 0.9);
const PLATFORM_HALF_EXTENTS: Vec2 = Vec2::new(1.5, 0.25);
const GROUND_THICKNESS: f32 = 1.0;
const LOAD_ASPECT_RATIO: f32 = 16.0 / 9.0;

const PLAYER_COLOR: [u8; 4] = [70, 150, 235, 255];
const PLAYER_VEHICLE_COLOR: [u8; 4] = [240, 160, 60, 255];
const PLAYER_DEAD_COLOR: [u8; 4] = [110, 110, 110, 255];
const PLATFORM_COLOR: [u8; 4] = [120, 200, 120, 255];
const GROUND_COLOR: [u8; 4] = [80, 60, 45, 255];

pub(crate) fn build_scene(config: GameplayConfig) -> Box<dyn Scene> {
    let sampler = RandomSampler::new(config.popup.seed);
    Box::new(GameplayScene::new(config, Box::new(sampler)))
}

struct PlatformMover {
    entity: EntityId,
    cycler: WaypointCycler,
    flip: SpriteFlip,
}

pub(crate) struct GameplayScene {
    config: GameplayConfig,
    player: PlayerController,
    body: RigidBody2D,
    camera: CameraFollower,
    popup: PopupManager,
    player_id: Option<EntityId>,
    platforms: Vec<PlatformMover>,
    last_triggers: Vec<&'static str>,
}

impl GameplayScene {
    pub(crate) fn new(config: GameplayConfig, sampler: Box<dyn PopupSampler>) -> Self {
        Self {
            player: PlayerController::new(config.motion),
            body: RigidBody2D::new(&config.body, PLAYER_HALF_EXTENTS.y),
            camera: CameraFollower::new(config.camera),
            popup: PopupManager::new(config.popup, sampler),
            player_id: None,
            platforms: Vec::new(),
            last_triggers: Vec::new(),
            config,
        }
    }

    fn player_spawn(&self) -> Vec2 {
        Vec2::new(0.0, self.body.resting_center_y())
    }

    fn spawn_ground(&self, world: &mut SceneWorld) {
        let boundary = &self.config.camera.boundary;
        let top = self.config.body.ground_y;
        world.spawn(
            Transform::at(Vec2::new(boundary.center().x, top - GROUND_THICKNESS / 2.0)),
            RenderableDesc {
                debug_name: "ground",
                color: GROUND_COLOR,
                half_extents: Vec2::new(boundary.width() / 2.0, GROUND_THICKNESS / 2.0),
                flip_x: false,
            },
        );
    }

    fn spawn_platforms(&mut self, world: &mut SceneWorld) {
        for (index, platform) in self.config.platforms.iter().enumerate() {
            let cycler = match WaypointCycler::new(platform.waypoints.clone(), platform.speed) {
                Ok(cycler) => cycler,
                Err(err) => {
                    error!(index, error = %err, "platform_skipped");
                    continue;
                }
            };
            let start = cycler.first_point();
            let entity = world.spawn(
                Transform::at(start),
                RenderableDesc {
                    debug_name: "platform",
                    color: PLATFORM_COLOR,
                    half_extents: PLATFORM_HALF_EXTENTS,
                    flip_x: false,
                },
            );
            self.platforms.push(PlatformMover {
                entity,
                cycler,
                flip: SpriteFlip::new(start.x),
            });
        }
    }

    fn update_player(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) {
        let Some(entity) = self.player_id.and_then(|id| world.find_entity_mut(id)) else {
            return;
        };
        let player_input = PlayerInput::from_snapshot(input);
        self.player.update(
            &player_input,
            fixed_dt_seconds,
            &mut entity.transform,
            &mut self.body,
        );
        if self
            .body
            .step(fixed_dt_seconds, &mut entity.transform.position)
            .landed
        {
            self.player.on_landed();
        }
        let state = self.player.state();
        entity.renderable.color = player_color(state.is_alive, state.mode);

        let fired = self.player.animator_mut().take_triggers();
        if !fired.is_empty() {
            for &trigger in &fired {
                debug!(trigger, "animator_trigger");
            }
            self.last_triggers = fired;
        }
    }

    fn update_platforms(&mut self, fixed_dt_seconds: f32, world: &mut SceneWorld) {
        for mover in &mut self.platforms {
            let Some(entity) = world.find_entity_mut(mover.entity) else {
                continue;
            };
            let next = mover.cycler.step(entity.transform.position, fixed_dt_seconds);
            entity.transform.position = next;
            mover.flip.update(next.x, &mut entity.renderable.flip_x);
        }
    }

    fn player_position(&self, world: &SceneWorld) -> Option<Vec2> {
        self.player_id
            .and_then(|id| world.find_entity(id))
            .map(|entity| entity.transform.position)
    }
}

fn player_color(is_alive: bool, mode: MovementMode) -> [u8; 4] {
    match (is_alive, mode) {
        (false, _) => PLAYER_DEAD_COLOR,
        (true, MovementMode::OnFoot) => PLAYER_COLOR,
        (true, MovementMode::Vehicle) => PLAYER_VEHICLE_COLOR,
    }
}

impl Scene for GameplayScene {
    fn load(&mut self, world: &mut SceneWorld) {
        self.player = PlayerController::new(self.config.motion);
        self.body = RigidBody2D::new(&self.config.body, PLAYER_HALF_EXTENTS.y);
        self.camera = CameraFollower::new(self.config.camera);
        let boundary = self.config.camera.boundary;
        self.camera
            .set_boundary(boundary.min_x, boundary.max_x, boundary.min_y, boundary.max_y);
        self.platforms.clear();
        self.last_triggers.clear();
        self.spawn_ground(world);
        let spawn = self.player_spawn();
        self.player_id = Some(world.spawn(
            Transform::at(spawn),
            RenderableDesc {
                debug_name: "player",
                color: PLAYER_COLOR,
                half_extents: PLAYER_HALF_EXTENTS,
                flip_x: false,
            },
        ));
        self.spawn_platforms(world);
        self.camera.snap(world.camera_mut(), spawn, LOAD_ASPECT_RATIO);
        world.set_boundary_gizmo(self.camera.boundary_gizmo());
        self.popup.start();
        info!(
            platforms = self.platforms.len(),
            spawn_x = spawn.x,
            spawn_y = spawn.y,
            "gameplay_scene_loaded"
        );
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        if input.quit_requested() {
            return SceneCommand::Quit;
        }

        self.update_player(fixed_dt_seconds, input, world);
        self.update_platforms(fixed_dt_seconds, world);

        if input.pressed(InputAction::ToggleCameraBoundary) {
            let enabled = !self.camera.settings().use_boundary;
            self.camera.set_boundary_enabled(enabled);
        }

        let target = self.player_position(world);
        self.camera.follow(
            world.camera_mut(),
            target,
            fixed_dt_seconds,
            input.aspect_ratio(),
        );
        world.set_boundary_gizmo(self.camera.boundary_gizmo());

        if input.pressed(InputAction::DismissPopup) {
            self.popup.dismiss();
        }
        self.popup.tick(fixed_dt_seconds);
        *world.popup_view_mut() = self.popup.view();

        SceneCommand::None
    }

    fn render(&mut self, _world: &SceneWorld) {}

    fn unload(&mut self, _world: &mut SceneWorld) {
        self.popup.stop();
        self.platforms.clear();
        self.player_id = None;
        info!("gameplay_scene_unloaded");
    }

    fn debug_title(&self, world: &SceneWorld) -> Option<String> {
        let player = self.player_position(world)?;
        let camera = world.camera();
        Some(format!(
            "Platformer | Player ({:.2}, {:.2}) | Camera ({:.2}, {:.2}) | Entities {}",
            player.x,
            player.y,
            camera.position.x,
            camera.position.y,
            world.entity_count()
        ))
    }

    fn debug_lines(&self, _world: &SceneWorld) -> Vec<String> {
        let state = self.player.state();
        let animator = self.player.animator();
        let body_velocity = self.body.velocity();
        let mut lines = vec![
            format!(
                "Velocity: {:.2}, {:.2} | Body: {:.2}, {:.2}",
                state.current_velocity.x,
                state.current_velocity.y,
                body_velocity.x,
                body_velocity.y
            ),
            format!(
                "Mode: {} | Alive: {} | Airborne: {} | Grounded: {}",
                state.mode.label(),
                state.is_alive,
                state.is_airborne,
                self.body.is_grounded()
            ),
            format!(
                "Anim: run={} jump={} kickboard={} last={}",
                animator.get_bool(IS_RUN),
                animator.get_bool(IS_JUMP),
                animator.get_bool(IS_KICK_BOARD),
                self.last_triggers.join(",")
            ),
            format!(
                "Platforms: {} | Targets: {}",
                self.platforms.len(),
                self.platforms
                    .iter()
                    .map(|mover| mover.cycler.current_index().to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            ),
        ];
        match self.popup.auto_close_remaining() {
            Some(remaining) => {
                lines.push(format!("Popup: {} ({remaining:.1}s)", self.popup.text()));
            }
            None if self.popup.is_visible() => {
                lines.push(format!("Popup: {}", self.popup.text()));
            }
            None => lines.push("Popup: hidden".to_string()),
        }
        lines
    }
}
