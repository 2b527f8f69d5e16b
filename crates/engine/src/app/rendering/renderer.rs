use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::tools::text::{draw_filled_rect, draw_rect_outline, write_pixel_rgba_clipped};
use crate::app::tools::{draw_overlay, draw_popup_panel, OverlayData};
use crate::app::{BoundaryRect, Camera2D, Entity, SceneWorld, Vec2};

use super::transform::{pixels_per_world, world_to_screen_px};

const CLEAR_COLOR: [u8; 4] = [20, 22, 28, 255];
const GRID_CELL_WORLD: f32 = 1.0;
const GRID_MAJOR_EVERY: i32 = 5;
const GRID_MINOR_COLOR: [u8; 4] = [35, 39, 46, 255];
const GRID_MAJOR_COLOR: [u8; 4] = [52, 58, 70, 255];
const BOUNDARY_GIZMO_COLOR: [u8; 4] = [80, 220, 120, 255];
const VALID_RANGE_GIZMO_COLOR: [u8; 4] = [255, 210, 70, 255];
const VALID_RANGE_MARKER_HALF_SIZE_PX: i32 = 6;
const FACING_NOTCH_COLOR: [u8; 4] = [16, 16, 20, 255];
const MAX_GRID_LINES_PER_AXIS: i32 = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScreenRectPx {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl ScreenRectPx {
    fn width(&self) -> i32 {
        self.right - self.left
    }

    fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            width: size.width,
            height: size.height,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render_world(
        &mut self,
        world: &SceneWorld,
        overlay_data: Option<&OverlayData>,
    ) -> Result<(), Error> {
        if self.width == 0 || self.height == 0 {
            return Ok(());
        }

        let (width, height) = (self.width, self.height);
        let frame = self.pixels.frame_mut();
        draw_scene(frame, width, height, world);
        if let Some(data) = overlay_data {
            draw_overlay(frame, width, height, data);
        }

        self.pixels.render()
    }
}

fn draw_scene(frame: &mut [u8], width: u32, height: u32, world: &SceneWorld) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&CLEAR_COLOR);
    }
    draw_world_grid(frame, width, height, world.camera());

    for entity in world.entities() {
        draw_entity(frame, width, height, world.camera(), entity);
    }

    if let Some(boundary) = world.boundary_gizmo() {
        draw_boundary_gizmos(frame, width, height, world.camera(), boundary);
    }

    draw_popup_panel(frame, width, height, world.popup_view());
}

fn world_rect_to_screen(
    camera: &Camera2D,
    window_size: (u32, u32),
    rect: &BoundaryRect,
) -> ScreenRectPx {
    let (left, top) = world_to_screen_px(camera, window_size, Vec2::new(rect.min_x, rect.max_y));
    let (right, bottom) =
        world_to_screen_px(camera, window_size, Vec2::new(rect.max_x, rect.min_y));
    ScreenRectPx {
        left,
        top,
        right,
        bottom,
    }
}

fn entity_screen_rect(camera: &Camera2D, window_size: (u32, u32), entity: &Entity) -> ScreenRectPx {
    let center = entity.transform.position;
    let half = entity.renderable.half_extents;
    world_rect_to_screen(
        camera,
        window_size,
        &BoundaryRect {
            min_x: center.x - half.x,
            max_x: center.x + half.x,
            min_y: center.y - half.y,
            max_y: center.y + half.y,
        },
    )
}

/// The art faces +x until mirrored by a negative scale or a flip.
fn faces_right(entity: &Entity) -> bool {
    let mirrored_by_scale = entity.transform.scale_x < 0.0;
    mirrored_by_scale == entity.renderable.flip_x
}

fn draw_entity(frame: &mut [u8], width: u32, height: u32, camera: &Camera2D, entity: &Entity) {
    let rect = entity_screen_rect(camera, (width, height), entity);
    let rect_width = rect.width().max(1);
    let rect_height = rect.height().max(1);
    draw_filled_rect(
        frame,
        width,
        height,
        rect.left,
        rect.top,
        rect_width,
        rect_height,
        entity.renderable.color,
    );

    let notch_width = (rect_width / 4).max(1);
    let notch_height = (rect_height / 4).max(1);
    let notch_left = if faces_right(entity) {
        rect.left + rect_width - notch_width
    } else {
        rect.left
    };
    draw_filled_rect(
        frame,
        width,
        height,
        notch_left,
        rect.top + notch_height,
        notch_width,
        notch_height,
        FACING_NOTCH_COLOR,
    );
}

/// Range the camera center may occupy so the visible rectangle stays inside `boundary`. Collapses
/// to the boundary center on an axis where the view is larger than the boundary.
pub(crate) fn camera_valid_range(boundary: &BoundaryRect, half_extents: Vec2) -> BoundaryRect {
    let center = boundary.center();
    let (min_x, max_x) = if boundary.min_x + half_extents.x > boundary.max_x - half_extents.x {
        (center.x, center.x)
    } else {
        (
            boundary.min_x + half_extents.x,
            boundary.max_x - half_extents.x,
        )
    };
    let (min_y, max_y) = if boundary.min_y + half_extents.y > boundary.max_y - half_extents.y {
        (center.y, center.y)
    } else {
        (
            boundary.min_y + half_extents.y,
            boundary.max_y - half_extents.y,
        )
    };
    BoundaryRect {
        min_x,
        max_x,
        min_y,
        max_y,
    }
}

fn draw_boundary_gizmos(
    frame: &mut [u8],
    width: u32,
    height: u32,
    camera: &Camera2D,
    boundary: &BoundaryRect,
) {
    let window_size = (width, height);
    let outer = world_rect_to_screen(camera, window_size, boundary);
    draw_rect_outline(
        frame,
        width,
        height,
        outer.left,
        outer.top,
        outer.width() + 1,
        outer.height() + 1,
        BOUNDARY_GIZMO_COLOR,
    );

    let aspect_ratio = width as f32 / height as f32;
    let valid = camera_valid_range(boundary, camera.visible_half_extents(aspect_ratio));
    let inner = world_rect_to_screen(camera, window_size, &valid);
    if inner.width() <= 1 || inner.height() <= 1 {
        let (cx, cy) = world_to_screen_px(camera, window_size, valid.center());
        draw_cross(
            frame,
            width,
            height,
            cx,
            cy,
            VALID_RANGE_MARKER_HALF_SIZE_PX,
            VALID_RANGE_GIZMO_COLOR,
        );
        return;
    }
    draw_rect_outline(
        frame,
        width,
        height,
        inner.left,
        inner.top,
        inner.width() + 1,
        inner.height() + 1,
        VALID_RANGE_GIZMO_COLOR,
    );
}

fn draw_cross(
    frame: &mut [u8],
    width: u32,
    height: u32,
    cx: i32,
    cy: i32,
    half_size: i32,
    color: [u8; 4],
) {
    for offset in -half_size..=half_size {
        write_pixel_rgba_clipped(frame, width, height, cx + offset, cy, color);
        write_pixel_rgba_clipped(frame, width, height, cx, cy + offset, color);
    }
}

fn draw_world_grid(frame: &mut [u8], width: u32, height: u32, camera: &Camera2D) {
    let scale = pixels_per_world(camera, height);
    let half_w_world = width as f32 / (2.0 * scale);
    let half_h_world = height as f32 / (2.0 * scale);
    let (ix_start, ix_end) = grid_index_range(camera.position.x, half_w_world);
    let (iy_start, iy_end) = grid_index_range(camera.position.y, half_h_world);

    for ix in ix_start..=ix_end {
        let (screen_x, _) = world_to_screen_px(
            camera,
            (width, height),
            Vec2::new(ix as f32 * GRID_CELL_WORLD, camera.position.y),
        );
        draw_filled_rect(frame, width, height, screen_x, 0, 1, height as i32, grid_color(ix));
    }
    for iy in iy_start..=iy_end {
        let (_, screen_y) = world_to_screen_px(
            camera,
            (width, height),
            Vec2::new(camera.position.x, iy as f32 * GRID_CELL_WORLD),
        );
        draw_filled_rect(frame, width, height, 0, screen_y, width as i32, 1, grid_color(iy));
    }
}

fn grid_index_range(center: f32, half_extent_world: f32) -> (i32, i32) {
    let start = ((center - half_extent_world) / GRID_CELL_WORLD).floor() as i32;
    let end = ((center + half_extent_world) / GRID_CELL_WORLD).ceil() as i32;
    let end = end.min(start.saturating_add(MAX_GRID_LINES_PER_AXIS));
    (start, end)
}

fn grid_color(index: i32) -> [u8; 4] {
    if index.rem_euclid(GRID_MAJOR_EVERY) == 0 {
        GRID_MAJOR_COLOR
    } else {
        GRID_MINOR_COLOR
    }
}
