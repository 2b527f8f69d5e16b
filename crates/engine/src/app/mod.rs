mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;
mod timers;
mod tools;

pub use input::InputAction;
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{pixels_per_world, world_to_screen_px, Renderer};
pub use scene::{
    BoundaryRect, Camera2D, Entity, EntityId, InputSnapshot, RenderableDesc, Scene, SceneCommand,
    SceneWorld, Transform, UiPopupView, Vec2,
};
pub use timers::{TimerId, TimerQueue};
pub(crate) use tools::OverlayData;
