mod renderer;
mod transform;

pub use renderer::Renderer;
pub use transform::{pixels_per_world, world_to_screen_px, FALLBACK_PIXELS_PER_WORLD};
