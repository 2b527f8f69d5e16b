use crate::app::LoopMetricsSnapshot;

use super::text::{
    draw_filled_rect, draw_rect_outline, draw_text_clipped, text_width_px, LINE_ADVANCE,
    TEXT_SCALE,
};

const OVERLAY_PADDING: i32 = 6 * TEXT_SCALE;
const OVERLAY_PANEL_INSET_X: i32 = 4 * TEXT_SCALE;
const OVERLAY_PANEL_INSET_Y: i32 = 3 * TEXT_SCALE;
const OVERLAY_TEXT_PRIMARY_COLOR: [u8; 4] = [244, 248, 252, 255];
const OVERLAY_TEXT_DIM_COLOR: [u8; 4] = [176, 198, 220, 255];
const OVERLAY_PANEL_BG_COLOR: [u8; 4] = [10, 12, 16, 210];
const OVERLAY_PANEL_BORDER_COLOR: [u8; 4] = [92, 106, 126, 255];
const LOOP_SECTION_LABEL: &str = "Loop";
const SCENE_SECTION_LABEL: &str = "Scene";

/// Everything the F3 overlay shows for one frame.
#[derive(Debug, Clone, Default)]
pub(crate) struct OverlayData {
    pub metrics: LoopMetricsSnapshot,
    pub render_fps_cap: Option<u32>,
    pub entity_count: usize,
    pub scene_lines: Vec<String>,
}

pub(crate) fn draw_overlay(frame: &mut [u8], width: u32, height: u32, data: &OverlayData) {
    if width == 0 || height == 0 {
        return;
    }

    let lines = build_overlay_lines(data);
    let panel_width = lines
        .iter()
        .map(|line| text_width_px(line))
        .max()
        .unwrap_or(0)
        + OVERLAY_PANEL_INSET_X * 2;
    let panel_height = lines.len() as i32 * LINE_ADVANCE + OVERLAY_PANEL_INSET_Y * 2;
    let panel_left = OVERLAY_PADDING - OVERLAY_PANEL_INSET_X;
    let panel_top = OVERLAY_PADDING - OVERLAY_PANEL_INSET_Y;
    draw_filled_rect(
        frame,
        width,
        height,
        panel_left,
        panel_top,
        panel_width,
        panel_height,
        OVERLAY_PANEL_BG_COLOR,
    );
    draw_rect_outline(
        frame,
        width,
        height,
        panel_left,
        panel_top,
        panel_width,
        panel_height,
        OVERLAY_PANEL_BORDER_COLOR,
    );

    let mut y = OVERLAY_PADDING;
    for line in &lines {
        draw_text_clipped(
            frame,
            width,
            height,
            OVERLAY_PADDING,
            y,
            line,
            overlay_line_color(line),
        );
        y += LINE_ADVANCE;
    }
}

fn build_overlay_lines(data: &OverlayData) -> Vec<String> {
    let mut lines = vec![
        LOOP_SECTION_LABEL.to_string(),
        format_fps_line(data.metrics.fps, data.render_fps_cap),
        format!("TPS: {:.1}", data.metrics.tps),
        format!("Frame: {:.2} ms", data.metrics.frame_time_ms),
        format!("Worst tick: {:.2} ms", data.metrics.worst_tick_ms),
        String::new(),
        SCENE_SECTION_LABEL.to_string(),
        format!("Entities: {}", data.entity_count),
    ];
    lines.extend(data.scene_lines.iter().cloned());
    lines
}

fn overlay_line_color(line: &str) -> [u8; 4] {
    if matches!(line, LOOP_SECTION_LABEL | SCENE_SECTION_LABEL) {
        OVERLAY_TEXT_DIM_COLOR
    } else {
        OVERLAY_TEXT_PRIMARY_COLOR
    }
}

fn format_fps_line(current_fps: f32, cap: Option<u32>) -> String {
    let cap_text = match cap {
        Some(value) => value.to_string(),
        None => "inf".to_string(),
    };
    format!("FPS: [{:.0} / {}]", current_fps, cap_text)
}
