use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use super::input::{axis_value, ActionStates, InputAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

const DEFAULT_ASPECT_RATIO: f32 = 16.0 / 9.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    held: ActionStates,
    pressed: ActionStates,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        held: ActionStates,
        pressed: ActionStates,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            held,
            pressed,
            window_width,
            window_height,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.held.get(action)
    }

    /// True only on the tick the action transitioned from released to pressed.
    pub fn pressed(&self, action: InputAction) -> bool {
        self.pressed.get(action)
    }

    /// Raw horizontal axis in `[-1, 1]`; left is negative.
    pub fn horizontal_axis(&self) -> f32 {
        axis_value(&self.held, InputAction::MoveLeft, InputAction::MoveRight)
    }

    /// Raw vertical axis in `[-1, 1]`; up is positive.
    pub fn vertical_axis(&self) -> f32 {
        axis_value(&self.held, InputAction::MoveDown, InputAction::MoveUp)
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.window_width == 0 || self.window_height == 0 {
            return DEFAULT_ASPECT_RATIO;
        }
        self.window_width as f32 / self.window_height as f32
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.held.set(action, is_down);
        self
    }

    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.held.set(action, true);
        self.pressed.set(action, true);
        self
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Steps toward `target` by at most `max_delta`, landing exactly on it instead of overshooting.
    pub fn move_towards(self, target: Vec2, max_delta: f32) -> Vec2 {
        let delta = target - self;
        let distance = delta.length();
        if distance <= max_delta || distance == 0.0 {
            return target;
        }
        self + delta * (max_delta / distance)
    }

    /// Linear interpolation with `t` clamped to `[0, 1]`.
    pub fn lerp(self, target: Vec2, t: f32) -> Vec2 {
        let t = t.clamp(0.0, 1.0);
        self + (target - self) * t
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Axis-aligned world rectangle. Used as a camera boundary and drawn as a debug gizmo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryRect {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl BoundaryRect {
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn contains_rect(&self, other: &BoundaryRect, epsilon: f32) -> bool {
        other.min_x >= self.min_x - epsilon
            && other.max_x <= self.max_x + epsilon
            && other.min_y >= self.min_y - epsilon
            && other.max_y <= self.max_y + epsilon
    }
}

pub const CAMERA_DEFAULT_DEPTH: f32 = -10.0;
pub const CAMERA_DEFAULT_HALF_HEIGHT: f32 = 5.0;

/// Orthographic 2D camera. `depth` is carried for hosts that need it and is never written by
/// followers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
    pub depth: f32,
    pub orthographic_half_height: f32,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            depth: CAMERA_DEFAULT_DEPTH,
            orthographic_half_height: CAMERA_DEFAULT_HALF_HEIGHT,
        }
    }
}

impl Camera2D {
    /// Half width and half height of the visible rectangle for the given aspect ratio.
    pub fn visible_half_extents(&self, aspect_ratio: f32) -> Vec2 {
        let half_height = self.orthographic_half_height;
        Vec2::new(half_height * aspect_ratio, half_height)
    }

    pub fn visible_rect(&self, aspect_ratio: f32) -> BoundaryRect {
        let half = self.visible_half_extents(aspect_ratio);
        BoundaryRect {
            min_x: self.position.x - half.x,
            max_x: self.position.x + half.x,
            min_y: self.position.y - half.y,
            max_y: self.position.y + half.y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    /// Horizontal scale sign; `-1.0` mirrors the entity.
    pub scale_x: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale_x: 1.0,
        }
    }
}

impl Transform {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderableDesc {
    pub debug_name: &'static str,
    pub color: [u8; 4],
    pub half_extents: Vec2,
    pub flip_x: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub transform: Transform,
    pub renderable: RenderableDesc,
}

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiPopupView {
    pub visible: bool,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct SceneWorld {
    allocator: EntityIdAllocator,
    entities: Vec<Entity>,
    pending_spawns: Vec<Entity>,
    pending_despawns: Vec<EntityId>,
    camera: Camera2D,
    boundary_gizmo: Option<BoundaryRect>,
    popup: UiPopupView,
}

impl SceneWorld {
    /// Queues an entity; it becomes visible to queries after [`SceneWorld::apply_pending`].
    pub fn spawn(&mut self, transform: Transform, renderable: RenderableDesc) -> EntityId {
        let id = self.allocator.allocate();
        self.pending_spawns.push(Entity {
            id,
            transform,
            renderable,
        });
        id
    }

    pub fn despawn(&mut self, id: EntityId) -> bool {
        let exists_now = self.entities.iter().any(|entity| entity.id == id);
        let pending_spawn = self.pending_spawns.iter().any(|entity| entity.id == id);
        if !exists_now && !pending_spawn {
            return false;
        }
        self.pending_despawns.push(id);
        true
    }

    pub fn apply_pending(&mut self) {
        if !self.pending_spawns.is_empty() {
            self.entities.append(&mut self.pending_spawns);
        }

        if !self.pending_despawns.is_empty() {
            self.pending_despawns.sort_by_key(|id| id.0);
            self.pending_despawns.dedup();
            let pending = &self.pending_despawns;
            self.entities.retain(|entity| {
                pending
                    .binary_search_by_key(&entity.id.0, |id| id.0)
                    .is_err()
            });
            self.pending_despawns.clear();
        }
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.pending_spawns.clear();
        self.pending_despawns.clear();
        self.camera = Camera2D::default();
        self.boundary_gizmo = None;
        self.popup = UiPopupView::default();
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn find_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn find_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }

    pub fn set_boundary_gizmo(&mut self, boundary: Option<BoundaryRect>) {
        self.boundary_gizmo = boundary;
    }

    pub fn boundary_gizmo(&self) -> Option<&BoundaryRect> {
        self.boundary_gizmo.as_ref()
    }

    pub fn popup_view(&self) -> &UiPopupView {
        &self.popup
    }

    pub fn popup_view_mut(&mut self) -> &mut UiPopupView {
        &mut self.popup
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn render(&mut self, world: &SceneWorld);
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        None
    }
    fn debug_lines(&self, _world: &SceneWorld) -> Vec<String> {
        Vec::new()
    }
}

/// Owns the active scene and its world for the frame loop.
pub(crate) struct SceneRuntime {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
}

impl SceneRuntime {
    pub(crate) fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            world: SceneWorld::default(),
            is_loaded: false,
        }
    }

    pub(crate) fn load(&mut self) {
        if self.is_loaded {
            return;
        }
        self.scene.load(&mut self.world);
        self.world.apply_pending();
        self.is_loaded = true;
    }

    pub(crate) fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        if !self.is_loaded {
            return SceneCommand::None;
        }
        let command = self.scene.update(fixed_dt_seconds, input, &mut self.world);
        self.world.apply_pending();
        command
    }

    pub(crate) fn render(&mut self) {
        self.scene.render(&self.world);
    }

    pub(crate) fn world(&self) -> &SceneWorld {
        &self.world
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.scene.debug_title(&self.world)
    }

    pub(crate) fn debug_lines(&self) -> Vec<String> {
        self.scene.debug_lines(&self.world)
    }

    pub(crate) fn shutdown(&mut self) {
        if !self.is_loaded {
            return;
        }
        self.scene.unload(&mut self.world);
        self.world.clear();
        self.is_loaded = false;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    fn placeholder(name: &'static str) -> RenderableDesc {
        RenderableDesc {
            debug_name: name,
            color: [255, 255, 255, 255],
            half_extents: Vec2::new(0.5, 0.5),
            flip_x: false,
        }
    }

    #[derive(Default)]
    struct CountingScene {
        loads: Rc<Cell<u32>>,
        updates: Rc<Cell<u32>>,
        unloads: Rc<Cell<u32>>,
    }

    impl Scene for CountingScene {
        fn load(&mut self, world: &mut SceneWorld) {
            self.loads.set(self.loads.get() + 1);
            world.spawn(Transform::default(), placeholder("counted"));
        }

        fn update(
            &mut self,
            _fixed_dt_seconds: f32,
            input: &InputSnapshot,
            world: &mut SceneWorld,
        ) -> SceneCommand {
            self.updates.set(self.updates.get() + 1);
            world.spawn(Transform::default(), placeholder("per_tick"));
            if input.quit_requested() {
                SceneCommand::Quit
            } else {
                SceneCommand::None
            }
        }

        fn render(&mut self, _world: &SceneWorld) {}

        fn unload(&mut self, _world: &mut SceneWorld) {
            self.unloads.set(self.unloads.get() + 1);
        }
    }

    #[test]
    fn allocator_never_reuses_ids() {
        let mut allocator = EntityIdAllocator::default();
        let a = allocator.allocate();
        let b = allocator.allocate();
        let c = allocator.allocate();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(c.0, 2);
    }

    #[test]
    fn spawn_is_deferred_until_apply_pending() {
        let mut world = SceneWorld::default();
        let id = world.spawn(Transform::default(), placeholder("a"));
        assert_eq!(world.entity_count(), 0);
        assert!(world.find_entity(id).is_none());

        world.apply_pending();
        assert_eq!(world.entity_count(), 1);
        assert!(world.find_entity(id).is_some());
    }

    #[test]
    fn duplicate_despawns_are_idempotent() {
        let mut world = SceneWorld::default();
        let a = world.spawn(Transform::default(), placeholder("a"));
        let b = world.spawn(Transform::default(), placeholder("b"));
        world.apply_pending();

        assert!(world.despawn(a));
        assert!(world.despawn(a));
        world.apply_pending();

        assert_eq!(world.entity_count(), 1);
        assert!(world.find_entity(b).is_some());
        assert!(!world.despawn(a));
    }

    #[test]
    fn despawn_of_pending_spawn_removes_it_on_apply() {
        let mut world = SceneWorld::default();
        let a = world.spawn(Transform::default(), placeholder("a"));
        assert!(world.despawn(a));
        world.apply_pending();
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn clear_resets_camera_and_popup() {
        let mut world = SceneWorld::default();
        world.camera_mut().position = Vec2::new(3.0, 4.0);
        world.popup_view_mut().visible = true;
        world.set_boundary_gizmo(Some(BoundaryRect {
            min_x: 0.0,
            max_x: 1.0,
            min_y: 0.0,
            max_y: 1.0,
        }));
        world.clear();
        assert_eq!(world.camera().position, Vec2::ZERO);
        assert!(!world.popup_view().visible);
        assert!(world.boundary_gizmo().is_none());
    }

    #[test]
    fn move_towards_never_overshoots() {
        let start = Vec2::new(0.0, 0.0);
        let target = Vec2::new(3.0, 4.0);

        let step = start.move_towards(target, 1.0);
        assert!((step.length() - 1.0).abs() < 1e-5);

        let arrived = start.move_towards(target, 10.0);
        assert_eq!(arrived, target);

        let same = target.move_towards(target, 0.0);
        assert_eq!(same, target);
    }

    #[test]
    fn lerp_clamps_interpolant() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, -10.0);
        assert_eq!(a.lerp(b, 0.5), Vec2::new(5.0, -5.0));
        assert_eq!(a.lerp(b, 2.0), b);
        assert_eq!(a.lerp(b, -1.0), a);
    }

    #[test]
    fn snapshot_axes_follow_held_actions() {
        let snapshot = InputSnapshot::empty()
            .with_action_down(InputAction::MoveLeft, true)
            .with_action_down(InputAction::MoveUp, true);
        assert_eq!(snapshot.horizontal_axis(), -1.0);
        assert_eq!(snapshot.vertical_axis(), 1.0);
        assert!(!snapshot.pressed(InputAction::MoveLeft));
    }

    #[test]
    fn with_action_pressed_sets_edge_and_held() {
        let snapshot = InputSnapshot::empty().with_action_pressed(InputAction::Jump);
        assert!(snapshot.pressed(InputAction::Jump));
        assert!(snapshot.is_down(InputAction::Jump));
    }

    #[test]
    fn aspect_ratio_falls_back_for_zero_sized_window() {
        assert!((InputSnapshot::empty().aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
        let snapshot = InputSnapshot::empty().with_window_size((800, 400));
        assert!((snapshot.aspect_ratio() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn camera_visible_rect_uses_aspect_for_width() {
        let camera = Camera2D {
            position: Vec2::new(10.0, 2.0),
            ..Camera2D::default()
        };
        let rect = camera.visible_rect(2.0);
        assert_eq!(rect.min_x, 0.0);
        assert_eq!(rect.max_x, 20.0);
        assert_eq!(rect.min_y, -3.0);
        assert_eq!(rect.max_y, 7.0);
    }

    #[test]
    fn runtime_loads_once_and_unloads_on_shutdown() {
        let scene = CountingScene::default();
        let loads = Rc::clone(&scene.loads);
        let updates = Rc::clone(&scene.updates);
        let unloads = Rc::clone(&scene.unloads);
        let mut runtime = SceneRuntime::new(Box::new(scene));

        runtime.load();
        runtime.load();
        assert_eq!(loads.get(), 1);
        assert_eq!(runtime.world().entity_count(), 1);

        let command = runtime.update(1.0 / 60.0, &InputSnapshot::empty());
        assert_eq!(command, SceneCommand::None);
        assert_eq!(updates.get(), 1);
        assert_eq!(runtime.world().entity_count(), 2);

        runtime.shutdown();
        runtime.shutdown();
        assert_eq!(unloads.get(), 1);
        assert_eq!(runtime.world().entity_count(), 0);
    }

    #[test]
    fn runtime_ignores_updates_before_load() {
        let scene = CountingScene::default();
        let updates = Rc::clone(&scene.updates);
        let mut runtime = SceneRuntime::new(Box::new(scene));
        runtime.update(1.0 / 60.0, &InputSnapshot::empty());
        assert_eq!(updates.get(), 0);
    }
}
