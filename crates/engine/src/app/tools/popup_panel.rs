use crate::app::UiPopupView;

use super::text::{
    draw_filled_rect, draw_rect_outline, draw_text_clipped, text_width_px, wrap_text,
    GLYPH_ADVANCE, LINE_ADVANCE, TEXT_SCALE,
};

const PANEL_MAX_CHARS_PER_LINE: usize = 28;
const PANEL_INSET: i32 = 5 * TEXT_SCALE;
const PANEL_BG_COLOR: [u8; 4] = [28, 30, 44, 235];
const PANEL_BORDER_COLOR: [u8; 4] = [236, 196, 92, 255];
const PANEL_TEXT_COLOR: [u8; 4] = [250, 250, 250, 255];
const PANEL_HINT_COLOR: [u8; 4] = [176, 198, 220, 255];
const CLOSE_HINT: &str = "[Enter] close";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PanelRect {
    left: i32,
    top: i32,
    width: i32,
    height: i32,
}

/// Draws the popup window centered on screen when the view is visible.
pub(crate) fn draw_popup_panel(frame: &mut [u8], width: u32, height: u32, view: &UiPopupView) {
    if !view.visible || width == 0 || height == 0 {
        return;
    }

    let max_chars = max_chars_for_width(width);
    let mut lines = wrap_text(&view.text, max_chars);
    lines.push(String::new());
    lines.push(CLOSE_HINT.to_string());
    let rect = panel_rect(width, height, &lines);

    draw_filled_rect(
        frame,
        width,
        height,
        rect.left,
        rect.top,
        rect.width,
        rect.height,
        PANEL_BG_COLOR,
    );
    draw_rect_outline(
        frame,
        width,
        height,
        rect.left,
        rect.top,
        rect.width,
        rect.height,
        PANEL_BORDER_COLOR,
    );

    let hint_index = lines.len() - 1;
    let mut y = rect.top + PANEL_INSET;
    for (index, line) in lines.iter().enumerate() {
        let color = if index == hint_index {
            PANEL_HINT_COLOR
        } else {
            PANEL_TEXT_COLOR
        };
        draw_text_clipped(frame, width, height, rect.left + PANEL_INSET, y, line, color);
        y += LINE_ADVANCE;
    }
}

fn max_chars_for_width(width: u32) -> usize {
    let usable = width as i32 - PANEL_INSET * 4;
    let fits = (usable / GLYPH_ADVANCE).max(1) as usize;
    fits.min(PANEL_MAX_CHARS_PER_LINE)
}

fn panel_rect(width: u32, height: u32, lines: &[String]) -> PanelRect {
    let text_width = lines
        .iter()
        .map(|line| text_width_px(line))
        .max()
        .unwrap_or(0);
    let panel_width = text_width + PANEL_INSET * 2;
    let panel_height = lines.len() as i32 * LINE_ADVANCE + PANEL_INSET * 2;
    PanelRect {
        left: (width as i32 - panel_width) / 2,
        top: (height as i32 - panel_height) / 2,
        width: panel_width,
        height: panel_height,
    }
}
