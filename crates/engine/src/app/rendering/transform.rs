use crate::app::{Camera2D, Vec2};

/// Used when the camera's half height is zero, negative or not finite.
pub const FALLBACK_PIXELS_PER_WORLD: f32 = 32.0;

/// Scale that fits `2 * orthographic_half_height` world units into the window height.
pub fn pixels_per_world(camera: &Camera2D, window_height: u32) -> f32 {
    let half_height = camera.orthographic_half_height;
    if !half_height.is_finite() || half_height <= f32::EPSILON || window_height == 0 {
        return FALLBACK_PIXELS_PER_WORLD;
    }
    window_height as f32 / (2.0 * half_height)
}

/// World units grow upward; screen rows grow downward.
pub fn world_to_screen_px(camera: &Camera2D, window_size: (u32, u32), world: Vec2) -> (i32, i32) {
    let (width, height) = window_size;
    let scale = pixels_per_world(camera, height);
    let x = (world.x - camera.position.x) * scale + width as f32 * 0.5;
    let y = height as f32 * 0.5 - (world.y - camera.position.y) * scale;
    (x.round() as i32, y.round() as i32)
}
