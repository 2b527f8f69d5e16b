/// Mirrors a sprite from the sign of its per-frame horizontal displacement.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SpriteFlip {
    last_x: f32,
}

impl SpriteFlip {
    pub(crate) fn new(initial_x: f32) -> Self {
        Self { last_x: initial_x }
    }

    pub(crate) fn update(&mut self, x: f32, flip_x: &mut bool) {
        let dx = x - self.last_x;
        if dx > 0.0 {
            *flip_x = true;
        } else if dx < 0.0 {
            *flip_x = false;
        }
        self.last_x = x;
    }
}
