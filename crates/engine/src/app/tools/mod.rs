mod overlay;
mod popup_panel;
pub(crate) mod text;

pub(crate) use overlay::{draw_overlay, OverlayData};
pub(crate) use popup_panel::draw_popup_panel;
